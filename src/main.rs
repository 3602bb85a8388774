//! `cart` - manage the storefront shopping cart from the command line
//!
//! Usage: cart <COMMAND>
//!
//! Commands:
//!   show    Print the cart
//!   add     Add one unit of a product
//!   remove  Remove a product entirely
//!   update  Set a product's amount
//!   clear   Empty the cart

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use cart_store::{
    backend::HttpBackend,
    init_observability,
    models::{Cart, ProductId},
    services::{CartStore, Notifier, NotifyingCart},
    storage::FileStore,
    Config,
};

/// Storefront shopping cart
#[derive(Parser, Debug)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the cart
    Show,

    /// Add one unit of a product
    Add {
        /// Product id
        product_id: u64,
    },

    /// Remove a product entirely
    Remove {
        /// Product id
        product_id: u64,
    },

    /// Set a product's amount (zero or below is ignored)
    Update {
        /// Product id
        product_id: u64,

        /// New amount
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Empty the cart
    Clear,
}

/// Prints failure messages to stderr and remembers that one was shown
#[derive(Default)]
struct StderrNotifier {
    failed: AtomicBool,
}

impl StderrNotifier {
    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

impl Notifier for StderrNotifier {
    fn error(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        eprintln!("error: {}", message);
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::from_environment().context("Failed to load configuration")?;

    init_observability(
        &config.observability.service_name,
        &config.observability.log_level,
        config.observability.enable_json_logging,
    )?;

    let backend = Arc::new(
        HttpBackend::new(
            config.backend.api_base_url.clone(),
            config.backend.request_timeout(),
        )
        .context("Failed to build backend client")?,
    );
    let storage = Arc::new(FileStore::new(config.storage.storage_path.clone()));
    info!(
        api_base_url = %config.backend.api_base_url,
        storage_path = %config.storage.storage_path.display(),
        "Cart backend and storage configured"
    );

    let store = if config.storage.discard_malformed_state {
        CartStore::load_or_reset(backend.clone(), backend, storage)
    } else {
        CartStore::load(backend.clone(), backend, storage)
    }
    .context("Failed to load cart")?;
    let store = Arc::new(store);

    let notifier = Arc::new(StderrNotifier::default());
    let cart = NotifyingCart::new(store.clone(), notifier.clone());

    let mut changes = store.subscribe();
    match cli.command {
        Commands::Show => {}
        Commands::Add { product_id } => cart.add_product(ProductId::new(product_id)).await,
        Commands::Remove { product_id } => cart.remove_product(ProductId::new(product_id)).await,
        Commands::Update { product_id, amount } => {
            cart.update_product_amount(ProductId::new(product_id), amount)
                .await
        }
        Commands::Clear => cart.clear().await,
    }

    if changes.has_changed().unwrap_or(false) {
        info!("Cart changed");
    }
    render(&changes.borrow_and_update());

    if notifier.failed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn render(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for entry in cart {
        println!(
            "{:>6}  x{:<4} {:>10}  {}",
            entry.product_id(),
            entry.amount,
            entry
                .product
                .price
                .map(|price| price.to_string())
                .unwrap_or_default(),
            entry.product.title()
        );
    }
    println!(
        "{} product(s), {} item(s)",
        cart.len(),
        cart.total_amount()
    );
}
