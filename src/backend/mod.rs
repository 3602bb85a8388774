// Backend module - product catalog and stock lookups

pub mod http;

use async_trait::async_trait;

use crate::models::{BackendResult, Product, ProductId, Stock};

pub use http::HttpBackend;

/// Read access to product metadata
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch product metadata by id. Fails if the product is unknown or the
    /// catalog is unreachable.
    async fn get_product(&self, product_id: ProductId) -> BackendResult<Product>;
}

/// Read access to per-product stock levels
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the currently available quantity for a product
    async fn get_stock(&self, product_id: ProductId) -> BackendResult<Stock>;
}
