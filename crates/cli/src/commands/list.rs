use super::{load_config, open_ledger, CommandResult};

pub fn run(filter: &str) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let ledger = open_ledger(&config);

    let products = ledger.query(filter);
    if products.is_empty() {
        let message = if filter.is_empty() {
            "no products recorded yet".to_string()
        } else {
            format!("no products match `{filter}`")
        };
        return CommandResult::success(message);
    }

    let mut lines = Vec::with_capacity(products.len() + 1);
    for product in &products {
        lines.push(format!(
            "{:<16} {:<24} qty {:>5}  added {}  id {}",
            product.barcode,
            product.name,
            product.quantity,
            product.added_date.format("%Y-%m-%d %H:%M"),
            product.id,
        ));
    }

    let totals = ledger.totals();
    lines.push(format!("{} distinct products, {} units in total", totals.distinct, totals.units));
    CommandResult::success(lines.join("\n"))
}
