use serde::{Deserialize, Serialize};

use super::{Product, ProductId};

/// One product line in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl CartEntry {
    /// Create a new entry with an amount of one
    pub fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    pub fn product_id(&self) -> ProductId {
        self.product.id
    }
}

/// Ordered list of cart entries, unique by product id.
///
/// Serialized as a bare JSON array so the persisted blob is just the entry
/// list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries
            .iter()
            .find(|entry| entry.product_id() == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Amount of a product in the cart, zero when absent
    pub fn amount_of(&self, product_id: ProductId) -> u32 {
        self.get(product_id).map(|entry| entry.amount).unwrap_or(0)
    }

    /// Number of distinct products
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry amounts
    pub fn total_amount(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.amount)).sum()
    }

    /// Check the entry invariants: unique product ids and amounts of at least one
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.amount == 0 {
                return Err(format!("product {} has an amount of zero", entry.product_id()));
            }
            if !seen.insert(entry.product_id()) {
                return Err(format!("product {} appears more than once", entry.product_id()));
            }
        }
        Ok(())
    }

    /// Append a product with an amount of one.
    ///
    /// Returns `false` without touching the cart if the product is already present.
    pub(crate) fn push(&mut self, product: Product) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.entries.push(CartEntry::new(product));
        true
    }

    /// Increment an existing entry by one
    pub(crate) fn increment(&mut self, product_id: ProductId) -> bool {
        match self.entry_mut(product_id) {
            Some(entry) => {
                entry.amount = entry.amount.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Set an existing entry's amount. Zero is rejected so no entry ever drops below one.
    pub(crate) fn set_amount(&mut self, product_id: ProductId, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        match self.entry_mut(product_id) {
            Some(entry) => {
                entry.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove an entry regardless of its amount
    pub(crate) fn remove(&mut self, product_id: ProductId) -> bool {
        let original_len = self.entries.len();
        self.entries
            .retain(|entry| entry.product_id() != product_id);
        self.entries.len() != original_len
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut CartEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.product_id() == product_id)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
