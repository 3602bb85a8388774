//! Shopper cart state for a storefront client.
//!
//! [`services::CartStore`] keeps the selected products and their amounts,
//! checks every mutation against the backend's stock levels and persists the
//! cart in a [`storage::KeyValueStore`] so it survives restarts.
//! [`services::NotifyingCart`] wraps it for UI callers that only want one
//! message per failure.

pub mod backend;
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::{Config, ConfigError};
pub use observability::init_observability;
