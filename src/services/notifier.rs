use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::models::{Cart, CartError, ProductId};
use crate::services::CartStore;

pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";
pub const ADD_PRODUCT_FAILED_MESSAGE: &str = "Error adding product";
pub const REMOVE_PRODUCT_FAILED_MESSAGE: &str = "Error removing product";
pub const UPDATE_AMOUNT_FAILED_MESSAGE: &str = "Error updating product quantity";
pub const CLEAR_CART_FAILED_MESSAGE: &str = "Error clearing cart";

/// Cart operation a user-facing message refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    AddProduct,
    RemoveProduct,
    UpdateAmount,
    Clear,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartOperation::AddProduct => write!(f, "add_product"),
            CartOperation::RemoveProduct => write!(f, "remove_product"),
            CartOperation::UpdateAmount => write!(f, "update_product_amount"),
            CartOperation::Clear => write!(f, "clear"),
        }
    }
}

/// The single message shown to a shopper when an operation fails.
///
/// Out-of-stock gets its own message; every other cause collapses into the
/// operation's generic failure message.
pub fn failure_message(operation: CartOperation, error: &CartError) -> &'static str {
    if error.is_out_of_stock() {
        return OUT_OF_STOCK_MESSAGE;
    }

    match operation {
        CartOperation::AddProduct => ADD_PRODUCT_FAILED_MESSAGE,
        CartOperation::RemoveProduct => REMOVE_PRODUCT_FAILED_MESSAGE,
        CartOperation::UpdateAmount => UPDATE_AMOUNT_FAILED_MESSAGE,
        CartOperation::Clear => CLEAR_CART_FAILED_MESSAGE,
    }
}

/// Sink for user-facing error messages (toasts, status lines, ...)
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// UI-facing wrapper around [`CartStore`] that never returns errors.
///
/// Each failure is reported to the notifier as exactly one fixed message and
/// the cart is left as it was.
#[derive(Clone)]
pub struct NotifyingCart {
    store: Arc<CartStore>,
    notifier: Arc<dyn Notifier>,
}

impl NotifyingCart {
    pub fn new(store: Arc<CartStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn cart(&self) -> Cart {
        self.store.get_cart()
    }

    pub fn store(&self) -> &Arc<CartStore> {
        &self.store
    }

    pub async fn add_product(&self, product_id: ProductId) {
        let result = self.store.add_product(product_id).await;
        self.report(CartOperation::AddProduct, result);
    }

    pub async fn remove_product(&self, product_id: ProductId) {
        let result = self.store.remove_product(product_id).await;
        self.report(CartOperation::RemoveProduct, result);
    }

    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) {
        let result = self.store.update_product_amount(product_id, amount).await;
        self.report(CartOperation::UpdateAmount, result);
    }

    pub async fn clear(&self) {
        let result = self.store.clear().await;
        self.report(CartOperation::Clear, result);
    }

    fn report(&self, operation: CartOperation, result: Result<(), CartError>) {
        if let Err(error) = result {
            debug!(operation = %operation, error = %error, "Reporting cart failure to shopper");
            self.notifier.error(failure_message(operation, &error));
        }
    }
}
