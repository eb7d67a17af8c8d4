//! Remote HTTP Stock Provider
//!
//! Batch [`StockService`] that fetches `GET {api_url}/{identifier}` and
//! decodes a JSON array of [`StockPrice`] objects.
//!
//! Cancelling while the request is in flight drops it and returns an empty
//! result.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::ports::StockService;
use crate::domain::stock_price::StockPrice;
use crate::error::LoadError;
use crate::infrastructure::config::HttpSettings;

/// Batch source backed by a remote HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStockService {
    client: reqwest::Client,
    api_url: String,
}

impl HttpStockService {
    /// Create a provider client.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &HttpSettings) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LoadError::http(e.to_string()))?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are made against.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn fetch(&self, identifier: &str) -> Result<Vec<StockPrice>, LoadError> {
        let url = format!("{}/{}", self.api_url, identifier);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::http(format!("status {}: {body}", status.as_u16())));
        }

        let records: Vec<StockPrice> = response
            .json()
            .await
            .map_err(|e| LoadError::http(format!("invalid response body: {e}")))?;

        if records.iter().any(|price| price.identifier.trim().is_empty()) {
            return Err(LoadError::http("response contains a record without identifier"));
        }

        Ok(records)
    }
}

#[async_trait]
impl StockService for HttpStockService {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get_stock_prices_for(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StockPrice>, LoadError> {
        let records = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(identifier, "HTTP request cancelled");
                return Ok(Vec::new());
            }
            result = self.fetch(identifier) => result?,
        };

        tracing::debug!(identifier, records = records.len(), "HTTP records received");
        Ok(records
            .into_iter()
            .filter(|price| price.is_for(identifier))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn trailing_slash_is_trimmed() {
        let settings = HttpSettings {
            api_url: "http://localhost:9999/api/stocks/".to_string(),
            timeout: Duration::from_secs(1),
        };
        let service = HttpStockService::new(&settings).unwrap();
        assert_eq!(service.api_url(), "http://localhost:9999/api/stocks");
    }

    #[tokio::test]
    async fn cancelled_before_request_is_empty() {
        let settings = HttpSettings {
            api_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(1),
        };
        let service = HttpStockService::new(&settings).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let records = service.get_stock_prices_for("MSFT", &cancel).await.unwrap();
        assert!(records.is_empty());
    }
}
