use stokr_core::{LedgerError, ProductId};

use super::{load_config, open_ledger, CommandResult};

pub fn run(id: &str, confirmed: bool) -> CommandResult {
    if !confirmed {
        return CommandResult::failure(
            "removal deletes the product regardless of its count; re-run with --yes to confirm",
            1,
        );
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let ledger = open_ledger(&config);

    match ledger.delete_product(&ProductId(id.to_string())) {
        Ok(product) => CommandResult::success(format!(
            "{} removed ({} units dropped)",
            product.barcode, product.quantity
        )),
        Err(error @ LedgerError::Persistence(_)) => {
            CommandResult::failure(error.user_message(), 3)
        }
        Err(error) => CommandResult::failure(error.user_message(), 1),
    }
}
