use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{ProductCatalog, StockService};
use crate::models::{BackendError, BackendResult, Product, ProductId, Stock};

/// REST client for the storefront backend.
///
/// Serves both lookups:
/// - `GET {base_url}/products/{id}`
/// - `GET {base_url}/stock/{id}`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client with the given per-request timeout
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a backend client from an existing reqwest client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Sending backend request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                resource: path.to_string(),
            });
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), resource = %path, "Backend returned an error status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                resource: path.to_string(),
            });
        }

        response.json::<T>().await.map_err(|e| BackendError::Decode {
            resource: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ProductCatalog for HttpBackend {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn get_product(&self, product_id: ProductId) -> BackendResult<Product> {
        self.fetch_json(&format!("/products/{}", product_id)).await
    }
}

#[async_trait]
impl StockService for HttpBackend {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn get_stock(&self, product_id: ProductId) -> BackendResult<Stock> {
        self.fetch_json(&format!("/stock/{}", product_id)).await
    }
}
