// Services module - cart state and its UI-facing adapter

pub mod cart_store;
pub mod notifier;

pub use cart_store::CartStore;
pub use notifier::{failure_message, CartOperation, Notifier, NotifyingCart};
