use thiserror::Error;

use super::ProductId;

/// Cart-level errors returned by store operations
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Lookup failed for product {product_id}: {source}")]
    LookupFailed {
        product_id: ProductId,
        #[source]
        source: BackendError,
    },

    #[error("Out of stock: product_id={product_id}, requested={requested}, available={available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Product not in cart: {product_id}")]
    ProductNotInCart { product_id: ProductId },

    #[error("Persisted cart is malformed: {source}")]
    MalformedPersistedState {
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },
}

impl CartError {
    pub fn is_out_of_stock(&self) -> bool {
        matches!(self, CartError::OutOfStock { .. })
    }
}

/// Errors raised by the product catalog and stock backends
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unexpected status {status} from {resource}")]
    Status { status: u16, resource: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Failed to decode response from {resource}: {message}")]
    Decode { resource: String, message: String },
}

/// Errors raised by the key-value store backing the cart
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;

/// Result type alias for backend lookups
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
