use std::io::BufRead;

use stokr_core::{LedgerError, LineSource, ScanOutcome, ScanSource};

use super::{load_config, open_ledger, relay_barcodes, CommandResult};

/// Counting session: one barcode per input line, one RecordScan per barcode.
/// Per-line notifications accumulate into the output, followed by totals.
pub fn run(input: &mut dyn BufRead) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let ledger = open_ledger(&config);

    let mut lines = Vec::new();
    let mut recorded = Vec::new();
    let mut source = LineSource::new(input);

    loop {
        let barcode = match source.next_scan() {
            Ok(Some(barcode)) => barcode,
            Ok(None) => break,
            Err(error) => {
                lines.push(error.user_message().to_string());
                break;
            }
        };

        match ledger.record_scan(&barcode) {
            Ok(ScanOutcome::NameRequired { barcode }) => {
                lines.push(format!("{barcode} skipped: a name is required to add it"));
            }
            Ok(outcome) => {
                if let Some(product) = outcome.product() {
                    recorded.push(product.barcode.clone());
                }
                lines.push(outcome.notification());
            }
            Err(error @ LedgerError::Persistence(_)) => {
                lines.push(error.user_message().to_string());
                relay_barcodes(&config, &recorded);
                return CommandResult::failure(lines.join("\n"), 3);
            }
            Err(error) => lines.push(error.user_message().to_string()),
        }
    }

    relay_barcodes(&config, &recorded);

    let totals = ledger.totals();
    lines.push(format!(
        "session done: {} distinct products, {} units in total",
        totals.distinct, totals.units
    ));
    CommandResult::success(lines.join("\n"))
}
