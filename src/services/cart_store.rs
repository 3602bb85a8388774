use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::backend::{ProductCatalog, StockService};
use crate::models::{
    BackendError, Cart, CartError, CartResult, Product, ProductId, Stock, StorageError,
};
use crate::storage::{KeyValueStore, CART_STORAGE_KEY};

/// Shopper cart state with stock-checked mutations and durable persistence.
///
/// Mutations are serialized through a single writer lock that is held across
/// the backend lookups, so concurrent callers never lose an update. Readers
/// see the last committed cart and never wait on the writer.
pub struct CartStore {
    catalog: Arc<dyn ProductCatalog>,
    stock: Arc<dyn StockService>,
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<Cart>,
    writer: Mutex<()>,
}

impl CartStore {
    /// Load the cart from storage, failing on a malformed persisted blob
    pub fn load(
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockService>,
        storage: Arc<dyn KeyValueStore>,
    ) -> CartResult<Self> {
        let cart = read_persisted_cart(storage.as_ref())?;
        info!(entries = cart.len(), "Cart loaded from storage");
        Ok(Self::with_cart(catalog, stock, storage, cart))
    }

    /// Load the cart from storage, starting empty if the persisted state is malformed.
    ///
    /// A bad cart blob is left in place until the next successful mutation
    /// overwrites it. A storage document that cannot be parsed at all is
    /// cleared, since no key in it can be read or written.
    pub fn load_or_reset(
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockService>,
        storage: Arc<dyn KeyValueStore>,
    ) -> CartResult<Self> {
        let cart = match read_persisted_cart(storage.as_ref()) {
            Ok(cart) => cart,
            Err(CartError::MalformedPersistedState { source }) => {
                warn!(error = %source, "Discarding malformed persisted cart");
                Cart::new()
            }
            Err(CartError::Storage {
                source: StorageError::Serialization { source },
            }) => {
                warn!(error = %source, "Storage document is unreadable, clearing it");
                storage.clear()?;
                Cart::new()
            }
            Err(e) => return Err(e),
        };
        info!(entries = cart.len(), "Cart loaded from storage");
        Ok(Self::with_cart(catalog, stock, storage, cart))
    }

    fn with_cart(
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockService>,
        storage: Arc<dyn KeyValueStore>,
        cart: Cart,
    ) -> Self {
        let (state, _) = watch::channel(cart);
        Self {
            catalog,
            stock,
            storage,
            state,
            writer: Mutex::new(()),
        }
    }

    /// Snapshot of the current cart
    pub fn get_cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Receiver that observes every committed cart.
    ///
    /// The receiver is woken once per successful mutation; failed and no-op
    /// operations do not notify.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    /// Add one unit of a product, appending it when absent
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> CartResult<()> {
        let _writer = self.writer.lock().await;
        info!("Adding product to cart");

        let product = self.fetch_product(product_id).await?;
        let stock = self.fetch_stock(product_id).await?;

        let previous = self.get_cart();
        let current = previous.amount_of(product_id);

        if current >= stock.amount {
            warn!(
                current_amount = current,
                available = stock.amount,
                "Requested quantity is out of stock"
            );
            return Err(CartError::OutOfStock {
                product_id,
                requested: current.saturating_add(1),
                available: stock.amount,
            });
        }

        let mut cart = previous.clone();
        if current == 0 {
            cart.push(product);
        } else {
            cart.increment(product_id);
        }

        self.commit(&previous, cart)?;

        info!(amount = current + 1, "Product added to cart");
        Ok(())
    }

    /// Remove a product from the cart regardless of its amount
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> CartResult<()> {
        let _writer = self.writer.lock().await;
        info!("Removing product from cart");

        let previous = self.get_cart();
        let mut cart = previous.clone();

        if !cart.remove(product_id) {
            warn!("Product not in cart");
            return Err(CartError::ProductNotInCart { product_id });
        }

        self.commit(&previous, cart)?;

        info!("Product removed from cart");
        Ok(())
    }

    /// Set the amount of a product already in the cart.
    ///
    /// Amounts of zero or below are ignored without a lookup.
    #[instrument(skip(self), fields(product_id = %product_id, amount = amount))]
    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) -> CartResult<()> {
        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(());
        }
        let requested = u32::try_from(amount).unwrap_or(u32::MAX);

        let _writer = self.writer.lock().await;
        info!("Updating product amount");

        let stock = self.fetch_stock(product_id).await?;

        if requested > stock.amount {
            warn!(available = stock.amount, "Requested quantity is out of stock");
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let previous = self.get_cart();
        let mut cart = previous.clone();

        if !cart.set_amount(product_id, requested) {
            warn!("Product not in cart");
            return Err(CartError::ProductNotInCart { product_id });
        }

        self.commit(&previous, cart)?;

        info!("Product amount updated");
        Ok(())
    }

    /// Empty the cart
    #[instrument(skip(self))]
    pub async fn clear(&self) -> CartResult<()> {
        let _writer = self.writer.lock().await;
        info!("Clearing cart");

        let previous = self.get_cart();
        let mut cart = previous.clone();
        cart.clear();

        self.commit(&previous, cart)?;

        info!("Cart cleared");
        Ok(())
    }

    async fn fetch_product(&self, product_id: ProductId) -> CartResult<Product> {
        let product = self
            .catalog
            .get_product(product_id)
            .await
            .map_err(|source| lookup_failed(product_id, source))?;
        if product.id != product_id {
            return Err(mismatched_id("/products", product_id, product.id));
        }
        Ok(product)
    }

    async fn fetch_stock(&self, product_id: ProductId) -> CartResult<Stock> {
        let stock = self
            .stock
            .get_stock(product_id)
            .await
            .map_err(|source| lookup_failed(product_id, source))?;
        if stock.id != product_id {
            return Err(mismatched_id("/stock", product_id, stock.id));
        }
        Ok(stock)
    }

    /// Persist `next` and publish it to subscribers.
    ///
    /// Skipped entirely when `next` equals `previous`. Persistence happens
    /// first so a failed write leaves the in-memory cart untouched.
    fn commit(&self, previous: &Cart, next: Cart) -> CartResult<()> {
        if *previous == next {
            debug!("Cart unchanged, skipping persistence");
            return Ok(());
        }

        let blob = serde_json::to_string(&next).map_err(StorageError::from)?;
        if let Err(e) = self.storage.set(CART_STORAGE_KEY, &blob) {
            error!(error = %e, "Failed to persist cart");
            return Err(e.into());
        }

        self.state.send_replace(next);
        Ok(())
    }
}

fn lookup_failed(product_id: ProductId, source: BackendError) -> CartError {
    warn!(product_id = %product_id, error = %source, "Backend lookup failed");
    CartError::LookupFailed { product_id, source }
}

fn mismatched_id(collection: &str, requested: ProductId, returned: ProductId) -> CartError {
    lookup_failed(
        requested,
        BackendError::Decode {
            resource: format!("{}/{}", collection, requested),
            message: format!("backend returned product {}", returned),
        },
    )
}

fn read_persisted_cart(storage: &dyn KeyValueStore) -> CartResult<Cart> {
    let Some(blob) = storage.get(CART_STORAGE_KEY)? else {
        return Ok(Cart::new());
    };

    let cart: Cart = serde_json::from_str(&blob)
        .map_err(|source| CartError::MalformedPersistedState { source })?;

    if let Err(message) = cart.check_invariants() {
        return Err(CartError::MalformedPersistedState {
            source: <serde_json::Error as serde::de::Error>::custom(message),
        });
    }

    Ok(cart)
}
