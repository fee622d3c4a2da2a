pub mod config;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod snapshot;
pub mod source;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::product::{Product, ProductId};
pub use errors::LedgerError;
pub use ledger::{AdjustOutcome, Ledger, LedgerOptions, LedgerTotals, ScanOutcome};
pub use snapshot::{SnapshotStore, StoreError, DEFAULT_SNAPSHOT_KEY};
pub use source::{LineSource, ScanSource, ScanSourceError};
