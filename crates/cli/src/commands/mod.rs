pub mod adjust;
pub mod clear;
pub mod config;
pub mod count;
pub mod list;
pub mod remove;
pub mod scan;

use stokr_core::config::{AppConfig, LoadOptions};
use stokr_core::{Ledger, LedgerOptions};
use stokr_relay::RelayClient;
use stokr_store::JsonFileStore;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(output: impl Into<String>, exit_code: u8) -> Self {
        Self { exit_code, output: output.into() }
    }
}

/// Exit codes: 0 success, 1 ledger-level refusal (invalid input, not found,
/// missing confirmation), 2 configuration problems, 3 persistence failures.
pub(crate) fn load_config() -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default())
        .map_err(|error| CommandResult::failure(format!("configuration issue: {error}"), 2))
}

pub(crate) fn open_ledger(config: &AppConfig) -> Ledger {
    let store = JsonFileStore::new(config.store.data_dir.clone());
    let options = LedgerOptions {
        snapshot_key: config.store.snapshot_key.clone(),
        require_name_on_create: config.ledger.require_name_on_create,
    };
    Ledger::new(Box::new(store), options)
}

/// Mirrors recorded barcodes to the relay endpoint when one is configured.
/// Best effort by contract: failures never change the command outcome.
pub(crate) fn relay_barcodes(config: &AppConfig, barcodes: &[String]) {
    if barcodes.is_empty() {
        return;
    }
    let client = match RelayClient::from_config(&config.relay) {
        Ok(Some(client)) => client,
        Ok(None) => return,
        Err(_) => return,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(_) => return,
    };

    runtime.block_on(async {
        for barcode in barcodes {
            client.forward_best_effort(barcode).await;
        }
    });
}
