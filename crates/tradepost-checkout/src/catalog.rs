//! # Catalog Snapshot Cache
//!
//! Holds the latest search-filtered item list: the "last known truth" the
//! cart manager and the submit machine validate stock against.
//!
//! ## Refresh Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Refresh Discipline                          │
//! │                                                                         │
//! │  Keystroke "t" ──► schedule_search ──► timer (300ms) ─┐                │
//! │  Keystroke "te" ─► schedule_search ──► cancels above, │ new timer      │
//! │  Keystroke "ten" ► schedule_search ──► cancels above, │ new timer      │
//! │                                                       ▼                 │
//! │                                          timer fires: seq=N, fetch     │
//! │                                          (detached - no longer         │
//! │                                           cancellable)                 │
//! │                                                       │                 │
//! │  Workflow entry / post-commit ──► refresh ──► seq=M, fetch immediately │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │                              apply only if seq > applied_seq           │
//! │                              (last-write-wins; stale responses         │
//! │                               discarded with a debug diagnostic)       │
//! │                                                                         │
//! │  Failed fetch: keep the previous snapshot, warn, carry on.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Atomicity
//! Only the cache writes the snapshot, and every write is a wholesale
//! replacement: readers never observe a half-updated item list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use tradepost_core::Item;

use crate::api::TransactionApi;

// =============================================================================
// Catalog Configuration
// =============================================================================

/// Configuration for the catalog snapshot cache.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Quiet window after the last keystroke before a search fires.
    pub debounce: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            debounce: Duration::from_millis(300),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The cached item list plus the sequence number of the request that
/// produced it.
#[derive(Debug, Default)]
struct Snapshot {
    items: Vec<Item>,
    applied_seq: u64,
}

// =============================================================================
// Catalog Cache
// =============================================================================

/// The catalog snapshot cache.
///
/// All methods that schedule or perform fetches must run inside a Tokio
/// runtime. Lock sections are short and never held across an await.
pub struct CatalogCache {
    api: Arc<dyn TransactionApi>,
    snapshot: Arc<RwLock<Snapshot>>,
    /// Monotonic sequence, one per outgoing request. The network layer
    /// provides no ordering guarantee; this does.
    next_seq: Arc<AtomicU64>,
    /// Term of the most recently issued fetch; the post-commit refresh
    /// reuses it.
    last_term: Arc<Mutex<String>>,
    /// The not-yet-fired debounce timer, if any.
    pending: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
}

impl CatalogCache {
    /// Creates an empty cache over the given API.
    pub fn new(api: Arc<dyn TransactionApi>, config: CatalogConfig) -> Self {
        CatalogCache {
            api,
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
            next_seq: Arc::new(AtomicU64::new(0)),
            last_term: Arc::new(Mutex::new(String::new())),
            pending: Mutex::new(None),
            debounce: config.debounce,
        }
    }

    // =========================================================================
    // Refresh Paths
    // =========================================================================

    /// Fetches and applies immediately. Used on workflow entry (empty
    /// filter) and after a successful commit, when the local stock view is
    /// known stale.
    pub async fn refresh(&self, term: &str) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_term.lock().expect("catalog term lock poisoned") = term.to_string();

        Self::fetch_and_apply(
            Arc::clone(&self.api),
            Arc::clone(&self.snapshot),
            seq,
            term.to_string(),
        )
        .await;
    }

    /// Schedules a debounced search for a changed term.
    ///
    /// Cancels any not-yet-fired timer from an earlier keystroke; only the
    /// last keystroke in a burst produces a network call. Clearing the
    /// search box cancels the pending refresh without refetching.
    pub fn schedule_search(&self, term: &str) {
        self.cancel_pending();

        let term = term.trim().to_string();
        if term.is_empty() {
            debug!("search cleared; pending refresh cancelled");
            return;
        }

        let api = Arc::clone(&self.api);
        let snapshot = Arc::clone(&self.snapshot);
        let next_seq = Arc::clone(&self.next_seq);
        let last_term = Arc::clone(&self.last_term);
        let debounce = self.debounce;

        debug!(%term, "catalog search scheduled");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let seq = next_seq.fetch_add(1, Ordering::SeqCst) + 1;
            *last_term.lock().expect("catalog term lock poisoned") = term.clone();

            // Once the timer has fired, the fetch detaches onto its own task:
            // a superseding keystroke can no longer abort an in-flight
            // request, and ordering falls to the sequence discipline.
            tokio::spawn(Self::fetch_and_apply(api, snapshot, seq, term));
        });

        *self.pending.lock().expect("catalog pending lock poisoned") = Some(handle);
    }

    /// Cancels any pending scheduled refresh. Called on superseding
    /// keystrokes and on workflow teardown, so a stale timer cannot fire
    /// after the workflow is gone.
    pub fn cancel_pending(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .expect("catalog pending lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    async fn fetch_and_apply(
        api: Arc<dyn TransactionApi>,
        snapshot: Arc<RwLock<Snapshot>>,
        seq: u64,
        term: String,
    ) {
        match api.search_items(&term).await {
            Ok(items) => {
                let mut snap = snapshot.write().expect("catalog snapshot lock poisoned");
                if seq > snap.applied_seq {
                    debug!(seq, count = items.len(), %term, "catalog snapshot applied");
                    snap.items = items;
                    snap.applied_seq = seq;
                } else {
                    debug!(seq, applied = snap.applied_seq, "stale catalog response discarded");
                }
            }
            // The one silently-degraded failure mode: keep showing the last
            // good snapshot.
            Err(err) => warn!(%err, %term, "catalog refresh failed; keeping last snapshot"),
        }
    }

    // =========================================================================
    // Read Side
    // =========================================================================

    /// Returns a clone of the current item list.
    pub fn snapshot(&self) -> Vec<Item> {
        self.snapshot
            .read()
            .expect("catalog snapshot lock poisoned")
            .items
            .clone()
    }

    /// Returns the known stock for an item, or `None` if the item is not in
    /// the current (search-filtered) snapshot.
    pub fn stock_for(&self, item_id: i64) -> Option<i64> {
        self.snapshot
            .read()
            .expect("catalog snapshot lock poisoned")
            .items
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.quantity)
    }

    /// Number of items in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot
            .read()
            .expect("catalog snapshot lock poisoned")
            .items
            .len()
    }

    /// Checks if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Term of the most recently issued fetch.
    pub fn last_term(&self) -> String {
        self.last_term
            .lock()
            .expect("catalog term lock poisoned")
            .clone()
    }
}

impl Drop for CatalogCache {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    use tradepost_core::{Money, OutstandingRental, TransactionRecord, TransactionRequest};

    use crate::api::{ApiError, ApiResult};

    struct StubApi {
        items: Vec<Item>,
        fail: AtomicBool,
    }

    impl StubApi {
        fn with_items(items: Vec<Item>) -> Arc<Self> {
            Arc::new(StubApi {
                items,
                fail: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl TransactionApi for StubApi {
        async fn search_items(&self, _term: &str) -> ApiResult<Vec<Item>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Transport {
                    message: "connection refused".into(),
                });
            }
            Ok(self.items.clone())
        }

        async fn commit(&self, _request: &TransactionRequest) -> ApiResult<TransactionRecord> {
            unreachable!("catalog tests never commit")
        }

        async fn outstanding_rentals(&self, _phone: &str) -> ApiResult<Vec<OutstandingRental>> {
            unreachable!("catalog tests never look up rentals")
        }
    }

    fn item(id: i64, quantity: i64) -> Item {
        Item {
            id,
            legacy_item_id: 1000 + id,
            name: format!("Item {}", id),
            price: Money::from_cents(1000),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_refresh_applies_snapshot() {
        let cache = CatalogCache::new(
            StubApi::with_items(vec![item(1, 3), item(2, 0)]),
            CatalogConfig::default(),
        );

        cache.refresh("").await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stock_for(1), Some(3));
        assert_eq!(cache.stock_for(2), Some(0));
        assert_eq!(cache.stock_for(9), None);
    }

    #[tokio::test]
    async fn test_failed_refresh_preserves_previous_snapshot() {
        let api = StubApi::with_items(vec![item(1, 3)]);
        let cache = CatalogCache::new(Arc::clone(&api) as Arc<dyn TransactionApi>, CatalogConfig::default());

        cache.refresh("").await;
        assert_eq!(cache.len(), 1);

        api.fail.store(true, Ordering::SeqCst);
        cache.refresh("tent").await;

        // last good snapshot survives the transient error
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stock_for(1), Some(3));
    }

    #[tokio::test]
    async fn test_stale_response_discarded_by_sequence() {
        let api = StubApi::with_items(vec![item(2, 7)]);
        let cache = CatalogCache::new(Arc::clone(&api) as Arc<dyn TransactionApi>, CatalogConfig::default());

        // The newer request (seq 2) lands first; the older one (seq 1)
        // arrives late and must not overwrite it.
        CatalogCache::fetch_and_apply(
            Arc::clone(&api) as Arc<dyn TransactionApi>,
            Arc::clone(&cache.snapshot),
            2,
            "newer".to_string(),
        )
        .await;

        let older = StubApi::with_items(vec![item(1, 1)]);
        CatalogCache::fetch_and_apply(
            older as Arc<dyn TransactionApi>,
            Arc::clone(&cache.snapshot),
            1,
            "older".to_string(),
        )
        .await;

        assert_eq!(cache.stock_for(2), Some(7));
        assert_eq!(cache.stock_for(1), None);
    }

    #[tokio::test]
    async fn test_refresh_records_last_term() {
        let cache = CatalogCache::new(StubApi::with_items(vec![]), CatalogConfig::default());
        cache.refresh("skis").await;
        assert_eq!(cache.last_term(), "skis");
    }
}
