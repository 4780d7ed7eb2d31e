//! # HTTP Transport
//!
//! The reqwest-backed [`TransactionApi`] implementation.
//!
//! ## Behavior
//! - JSON request/response bodies
//! - Cookie store enabled: the auth collaborator's session cookie rides on
//!   every request
//! - Every response is routed through [`classify_status`]; request-level
//!   failures (connect, timeout) become [`ApiError::Transport`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use tradepost_core::{Item, OutstandingRental, TransactionRecord, TransactionRequest};

use crate::api::{classify_status, ApiError, ApiResult, TransactionApi};

// =============================================================================
// Api Configuration
// =============================================================================

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the inventory/transaction service, without a trailing
    /// slash.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8000/api".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Http Api
// =============================================================================

/// Production [`TransactionApi`] over REST.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Builds the client. Fails only on TLS backend initialization problems,
    /// reported as a transport fault.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(transport)?;

        Ok(HttpApi {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reads a response: non-2xx goes through classification, a 2xx body
    /// that fails to decode is a transport fault.
    async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|err| ApiError::Transport {
            message: format!("malformed response body: {err}"),
        })
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        message: err.to_string(),
    }
}

#[async_trait]
impl TransactionApi for HttpApi {
    async fn search_items(&self, term: &str) -> ApiResult<Vec<Item>> {
        debug!(term, "fetching catalog snapshot");
        let response = self
            .client
            .get(format!("{}/items/", self.base_url))
            .query(&[("search", term)])
            .send()
            .await
            .map_err(transport)?;

        Self::read_json(response).await
    }

    async fn commit(&self, request: &TransactionRequest) -> ApiResult<TransactionRecord> {
        let url = format!(
            "{}/transactions/{}/",
            self.base_url,
            request.kind().endpoint()
        );
        debug!(kind = %request.kind(), "posting transaction");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        Self::read_json(response).await
    }

    async fn outstanding_rentals(&self, phone: &str) -> ApiResult<Vec<OutstandingRental>> {
        let response = self
            .client
            .get(format!("{}/transactions/outstanding-rentals/", self.base_url))
            .query(&[("customer_phone", phone)])
            .send()
            .await
            .map_err(transport)?;

        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let api = HttpApi::new(&ApiConfig {
            base_url: "http://pos.example/api/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(api.base_url, "http://pos.example/api");
    }
}
