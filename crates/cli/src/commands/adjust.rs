use stokr_core::{AdjustOutcome, LedgerError, ProductId};

use super::{load_config, open_ledger, CommandResult};

pub fn run(id: &str, delta: i64) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let ledger = open_ledger(&config);

    match ledger.adjust_quantity(&ProductId(id.to_string()), delta) {
        Ok(AdjustOutcome::Updated(product)) => CommandResult::success(format!(
            "{} quantity is now {}",
            product.barcode, product.quantity
        )),
        Ok(AdjustOutcome::Removed(product)) => CommandResult::success(format!(
            "{} reached zero and was removed",
            product.barcode
        )),
        Err(error @ LedgerError::Persistence(_)) => {
            CommandResult::failure(error.user_message(), 3)
        }
        Err(error) => CommandResult::failure(error.user_message(), 1),
    }
}
