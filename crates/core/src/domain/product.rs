use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked stock item. `barcode` is the natural unique key of the ledger;
/// `added_date` is captured at first insertion and never changes afterwards.
///
/// The serde form uses camelCase field names so snapshots written by earlier
/// deployments of the counting tool keep parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub barcode: String,
    pub name: String,
    pub quantity: u32,
    pub added_date: DateTime<Utc>,
}

impl Product {
    /// Creates a fresh product with quantity 1, stamped with the current time.
    pub fn new(barcode: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProductId::generate(),
            barcode: barcode.into(),
            name: name.into(),
            quantity: 1,
            added_date: Utc::now(),
        }
    }
}
