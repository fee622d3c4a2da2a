use std::path::PathBuf;

use thiserror::Error;

use crate::domain::product::Product;

/// Key the ledger persists under when no other key is configured. Kept from
/// the original deployment so existing snapshots stay readable.
pub const DEFAULT_SNAPSHOT_KEY: &str = "stok-products";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io failure at `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("store payload could not be serialized: {0}")]
    Serialize(String),
}

/// Key-value persistence surface for ledger snapshots. Values are opaque
/// strings; the ledger owns the (de)serialization so malformed payloads can be
/// discarded on hydrate instead of failing the store.
///
/// The ledger treats itself as sole owner of its key. Implementations do not
/// need to coordinate concurrent writers.
pub trait SnapshotStore: Send {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, payload: &str) -> Result<(), StoreError>;
    /// Removing an absent key is a success.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

pub fn encode_products(products: &[Product]) -> Result<String, StoreError> {
    serde_json::to_string(products).map_err(|error| StoreError::Serialize(error.to_string()))
}

/// Lenient decode: any payload that fails to parse as a product array is
/// reported as `None` and treated by callers as "no prior data".
pub fn decode_products(payload: &str) -> Option<Vec<Product>> {
    serde_json::from_str(payload).ok()
}
