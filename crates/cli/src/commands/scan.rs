use stokr_core::{LedgerError, ScanOutcome};

use super::{load_config, open_ledger, relay_barcodes, CommandResult};

pub fn run(barcode: &str, name: Option<&str>) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let ledger = open_ledger(&config);

    let outcome = match name {
        Some(name) => ledger.create_product(barcode, name),
        None => ledger.record_scan(barcode),
    };

    match outcome {
        Ok(ScanOutcome::NameRequired { barcode }) => CommandResult::failure(
            format!(
                "{barcode} is not in the ledger yet and this ledger requires a name.\n\
                 Re-run with: stokr scan {barcode} --name <NAME>"
            ),
            1,
        ),
        Ok(outcome) => {
            if let Some(product) = outcome.product() {
                relay_barcodes(&config, &[product.barcode.clone()]);
            }
            CommandResult::success(outcome.notification())
        }
        Err(error @ LedgerError::Persistence(_)) => {
            CommandResult::failure(error.user_message(), 3)
        }
        Err(error) => CommandResult::failure(error.user_message(), 1),
    }
}
