#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use cart_store::backend::{ProductCatalog, StockService};
use cart_store::models::{BackendError, BackendResult, Product, ProductId, Stock};
use cart_store::services::{CartStore, Notifier};
use cart_store::storage::{KeyValueStore, MemoryStore};

/// Backend double serving both the catalog and the stock lookups from memory
#[derive(Default)]
pub struct InMemoryBackend {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, u32>>,
    lookup_delay: Option<Duration>,
    lookups: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup sleeps for `delay` before answering
    pub fn with_lookup_delay(delay: Duration) -> Self {
        Self {
            lookup_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn with_product(self, id: u64, stock: u32) -> Self {
        self.set_product(id, stock);
        self
    }

    pub fn set_product(&self, id: u64, stock: u32) {
        let product_id = ProductId::new(id);
        self.products
            .lock()
            .unwrap()
            .insert(product_id, test_product(id));
        self.stock.lock().unwrap().insert(product_id, stock);
    }

    pub fn set_stock(&self, id: u64, amount: u32) {
        self.stock
            .lock()
            .unwrap()
            .insert(ProductId::new(id), amount);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    async fn before_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryBackend {
    async fn get_product(&self, product_id: ProductId) -> BackendResult<Product> {
        self.before_lookup().await;
        self.products
            .lock()
            .unwrap()
            .get(&product_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                resource: format!("/products/{}", product_id),
            })
    }
}

#[async_trait]
impl StockService for InMemoryBackend {
    async fn get_stock(&self, product_id: ProductId) -> BackendResult<Stock> {
        self.before_lookup().await;
        self.stock
            .lock()
            .unwrap()
            .get(&product_id)
            .map(|amount| Stock {
                id: product_id,
                amount: *amount,
            })
            .ok_or_else(|| BackendError::NotFound {
                resource: format!("/stock/{}", product_id),
            })
    }
}

/// Notifier that records every message it is given
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub fn test_product(id: u64) -> Product {
    Product::new(
        ProductId::new(id),
        format!("Tênis de Caminhada {}", id),
        dec!(139.90),
        format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{}.jpg", id),
    )
}

/// A store over `backend` with fresh in-memory storage
pub fn memory_store(backend: Arc<InMemoryBackend>) -> (Arc<CartStore>, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let store = store_with_storage(backend, storage.clone());
    (store, storage)
}

pub fn store_with_storage(
    backend: Arc<InMemoryBackend>,
    storage: Arc<dyn KeyValueStore>,
) -> Arc<CartStore> {
    Arc::new(CartStore::load(backend.clone(), backend, storage).expect("cart should load"))
}
