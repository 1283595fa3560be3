//! HTTP catalog client
//!
//! Talks JSON to the catalog service:
//!
//! - `GET {base}/api/banks`
//! - `GET {base}/api/banks/{bank}/branches`
//! - `GET {base}/api/banks/{bank}/branches/{branch}`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::{CatalogClient, CatalogResult};
use crate::config::{parse_http_url, CatalogConfig};
use crate::error::{CatalogError, Result};
use crate::types::{Bank, Branch};

pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    /// Build a client for the configured catalog service.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an http(s) URL.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let base_url = parse_http_url(&config.base_url)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url) -> CatalogResult<reqwest::Response> {
        let start = Instant::now();
        tracing::debug!(%url, "Catalog request");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "Catalog network error");
            CatalogError::Unavailable(format!("Network error: {}", e))
        })?;

        tracing::debug!(
            %url,
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Catalog response"
        );
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> CatalogResult<T> {
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!("Catalog returned {}", status)));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_banks(&self) -> CatalogResult<Vec<Bank>> {
        let url = self.endpoint(&["api", "banks"]);
        // The service answers `null` for an empty table
        let banks: Option<Vec<Bank>> = self.get_json(url).await?;
        Ok(banks.unwrap_or_default())
    }

    async fn list_branches(&self, bank_code: &str) -> CatalogResult<Vec<Branch>> {
        let url = self.endpoint(&["api", "banks", bank_code, "branches"]);
        let branches: Option<Vec<Branch>> = self.get_json(url).await?;
        Ok(branches.unwrap_or_default())
    }

    async fn get_branch(&self, bank_code: &str, branch_code: &str) -> CatalogResult<Branch> {
        let url = self.endpoint(&["api", "banks", bank_code, "branches", branch_code]);
        let not_found = || CatalogError::NotFound(format!("{}/{}", bank_code, branch_code));

        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !response.status().is_success() {
            return Err(CatalogError::Unavailable(format!(
                "Catalog returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("Failed to parse response: {}", e)))?;

        // Accept a bare record, a one-element list, or null
        let record = match body {
            serde_json::Value::Null => return Err(not_found()),
            serde_json::Value::Array(items) => match items.into_iter().next() {
                Some(item) => item,
                None => return Err(not_found()),
            },
            other => other,
        };

        serde_json::from_value(record)
            .map_err(|e| CatalogError::Unavailable(format!("Failed to parse branch: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpCatalogClient {
        HttpCatalogClient::new(&CatalogConfig {
            base_url: base.to_string(),
            timeout_secs: Some(2),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("http://localhost:8080");
        let url = client.endpoint(&["api", "banks", "004", "branches"]);
        assert_eq!(url.as_str(), "http://localhost:8080/api/banks/004/branches");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = client("https://example.tw/catalog/");
        let url = client.endpoint(&["api", "banks"]);
        assert_eq!(url.as_str(), "https://example.tw/catalog/api/banks");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("http://localhost:8080");
        let url = client.endpoint(&["api", "banks", "00 4/x", "branches"]);
        assert_eq!(url.as_str(), "http://localhost:8080/api/banks/00%204%2Fx/branches");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpCatalogClient::new(&CatalogConfig {
            base_url: "localhost:8080".to_string(),
            timeout_secs: None,
        });
        assert!(result.is_err());
    }
}
