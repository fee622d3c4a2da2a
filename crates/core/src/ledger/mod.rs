use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::domain::product::{Product, ProductId};
use crate::errors::LedgerError;
use crate::snapshot::{
    decode_products, encode_products, SnapshotStore, StoreError, DEFAULT_SNAPSHOT_KEY,
};

/// Result of feeding one barcode into the ledger. Callers use the variant to
/// drive notification text ("added as new product" vs "count increased").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Created(Product),
    Incremented(Product),
    /// Returned instead of auto-creating when `require_name_on_create` is set.
    /// Nothing was mutated; the caller follows up with `create_product`.
    NameRequired { barcode: String },
}

impl ScanOutcome {
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Created(product) | Self::Incremented(product) => Some(product),
            Self::NameRequired { .. } => None,
        }
    }

    pub fn notification(&self) -> String {
        match self {
            Self::Created(product) => format!("{} added as a new product", product.barcode),
            Self::Incremented(product) => {
                format!("{} count increased to {}", product.barcode, product.quantity)
            }
            Self::NameRequired { barcode } => {
                format!("{barcode} is not in the ledger yet; a name is required to add it")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdjustOutcome {
    Updated(Product),
    /// The adjustment drove the quantity to zero and the product was removed.
    Removed(Product),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    /// Distinct barcodes tracked.
    pub distinct: usize,
    /// Sum of all quantities.
    pub units: u64,
}

#[derive(Clone, Debug)]
pub struct LedgerOptions {
    pub snapshot_key: String,
    /// Policy switch for unknown barcodes: `false` auto-creates with the
    /// barcode as name, `true` defers to a two-phase `create_product` flow.
    pub require_name_on_create: bool,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self { snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(), require_name_on_create: false }
    }
}

struct Inner {
    /// `None` until hydrated; every operation hydrates implicitly.
    products: Option<Vec<Product>>,
    store: Box<dyn SnapshotStore>,
}

impl Inner {
    fn hydrated(&mut self, key: &str) -> &mut Vec<Product> {
        if self.products.is_none() {
            let initial = self.load_initial(key);
            self.products = Some(initial);
        }
        self.products.get_or_insert_with(Vec::new)
    }

    fn load_initial(&self, key: &str) -> Vec<Product> {
        match self.store.load(key) {
            Ok(Some(payload)) => decode_products(&payload).unwrap_or_else(|| {
                warn!(
                    event_name = "ledger.hydrate.malformed_snapshot",
                    snapshot_key = %key,
                    "discarding snapshot payload that failed to parse; starting empty"
                );
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(
                    event_name = "ledger.hydrate.store_read_failed",
                    snapshot_key = %key,
                    error = %error,
                    "snapshot store read failed; starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Persists `next`, then swaps it in. On persist failure the in-memory
    /// collection is untouched, so persisted and in-memory state never diverge.
    fn commit(&mut self, key: &str, next: Vec<Product>) -> Result<(), StoreError> {
        let payload = encode_products(&next)?;
        self.store.save(key, &payload)?;
        self.products = Some(next);
        Ok(())
    }
}

/// The aggregate root: owns the deduplicated, quantity-tracked product
/// collection and keeps it in lockstep with a persisted snapshot.
///
/// A single mutex covers the collection and the store handle. Operations are
/// short and synchronous, so the whole-ledger lock is the simplest design that
/// stays correct under a multi-threaded host.
pub struct Ledger {
    options: LedgerOptions,
    inner: Mutex<Inner>,
}

impl Ledger {
    pub fn new(store: Box<dyn SnapshotStore>, options: LedgerOptions) -> Self {
        Self { options, inner: Mutex::new(Inner { products: None, store }) }
    }

    pub fn with_default_options(store: Box<dyn SnapshotStore>) -> Self {
        Self::new(store, LedgerOptions::default())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // A panic mid-operation leaves the collection unmodified (commits
            // are a single swap), so the poisoned state is still consistent.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Loads the persisted snapshot. Missing or malformed snapshots degrade to
    /// the empty collection; hydrate never fails.
    pub fn hydrate(&self) {
        let mut inner = self.lock();
        inner.hydrated(&self.options.snapshot_key);
    }

    /// The central reconciliation step: one decoded or typed barcode in,
    /// one create-or-increment out, persisted before returning.
    pub fn record_scan(&self, barcode: &str) -> Result<ScanOutcome, LedgerError> {
        let trimmed = barcode.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidInput("barcode must not be empty".to_string()));
        }

        let mut inner = self.lock();
        let key = &self.options.snapshot_key;
        let mut next = inner.hydrated(key).clone();

        if let Some(existing) = next.iter_mut().find(|product| product.barcode == trimmed) {
            existing.quantity = existing.quantity.saturating_add(1);
            let updated = existing.clone();
            inner.commit(key, next)?;
            return Ok(ScanOutcome::Incremented(updated));
        }

        if self.options.require_name_on_create {
            return Ok(ScanOutcome::NameRequired { barcode: trimmed.to_string() });
        }

        let product = Product::new(trimmed, trimmed);
        next.push(product.clone());
        inner.commit(key, next)?;
        Ok(ScanOutcome::Created(product))
    }

    /// Second phase of the name-on-create flow. If the barcode raced into the
    /// ledger between the scan and the name entry, this increments instead of
    /// duplicating.
    pub fn create_product(&self, barcode: &str, name: &str) -> Result<ScanOutcome, LedgerError> {
        let trimmed = barcode.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidInput("barcode must not be empty".to_string()));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput("product name must not be empty".to_string()));
        }

        let mut inner = self.lock();
        let key = &self.options.snapshot_key;
        let mut next = inner.hydrated(key).clone();

        if let Some(existing) = next.iter_mut().find(|product| product.barcode == trimmed) {
            existing.quantity = existing.quantity.saturating_add(1);
            let updated = existing.clone();
            inner.commit(key, next)?;
            return Ok(ScanOutcome::Incremented(updated));
        }

        let product = Product::new(trimmed, name);
        next.push(product.clone());
        inner.commit(key, next)?;
        Ok(ScanOutcome::Created(product))
    }

    /// Applies a signed delta to a product's quantity. The result floors at
    /// zero, and a product at zero is removed rather than kept around.
    pub fn adjust_quantity(
        &self,
        id: &ProductId,
        delta: i64,
    ) -> Result<AdjustOutcome, LedgerError> {
        let mut inner = self.lock();
        let key = &self.options.snapshot_key;
        let mut next = inner.hydrated(key).clone();

        let index = next
            .iter()
            .position(|product| &product.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        let current = i64::from(next[index].quantity);
        let adjusted = current.saturating_add(delta).max(0);

        if adjusted == 0 {
            let removed = next.remove(index);
            inner.commit(key, next)?;
            return Ok(AdjustOutcome::Removed(removed));
        }

        next[index].quantity = u32::try_from(adjusted).unwrap_or(u32::MAX);
        let updated = next[index].clone();
        inner.commit(key, next)?;
        Ok(AdjustOutcome::Updated(updated))
    }

    /// Unconditional removal. Confirmation prompts belong to the presentation
    /// layer, not here.
    pub fn delete_product(&self, id: &ProductId) -> Result<Product, LedgerError> {
        let mut inner = self.lock();
        let key = &self.options.snapshot_key;
        let mut next = inner.hydrated(key).clone();

        let index = next
            .iter()
            .position(|product| &product.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        let removed = next.remove(index);
        inner.commit(key, next)?;
        Ok(removed)
    }

    /// Empties the collection and deletes the snapshot key. Idempotent.
    pub fn clear_all(&self) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        let key = &self.options.snapshot_key;
        inner.hydrated(key);
        inner.store.delete(key)?;
        inner.products = Some(Vec::new());
        Ok(())
    }

    /// Case-insensitive substring filter over barcode and name. Empty filter
    /// matches everything. Insertion order is preserved, not match relevance.
    /// The returned Vec is a detached, restartable view of the collection.
    pub fn query(&self, filter: &str) -> Vec<Product> {
        let mut inner = self.lock();
        let products = inner.hydrated(&self.options.snapshot_key);
        let needle = filter.to_lowercase();
        products
            .iter()
            .filter(|product| {
                needle.is_empty()
                    || product.barcode.to_lowercase().contains(&needle)
                    || product.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn totals(&self) -> LedgerTotals {
        let mut inner = self.lock();
        let products = inner.hydrated(&self.options.snapshot_key);
        LedgerTotals {
            distinct: products.len(),
            units: products.iter().map(|product| u64::from(product.quantity)).sum(),
        }
    }
}
