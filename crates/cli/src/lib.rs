pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "stokr",
    about = "Barcode stock-counting ledger",
    long_about = "Track stock counts by scanning or typing barcodes. Products are deduplicated \
                  by barcode, counts persist between runs, and scans can optionally be mirrored \
                  to a relay endpoint.",
    after_help = "Examples:\n  stokr scan 8690000000001\n  stokr count < barcodes.txt\n  stokr list --filter 11\n  stokr clear --yes"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Record one scanned or typed barcode")]
    Scan {
        barcode: String,
        #[arg(long, help = "Product name, for ledgers that require a name on first scan")]
        name: Option<String>,
    },
    #[command(about = "Read barcodes from stdin, one per line, until EOF")]
    Count,
    #[command(about = "List tracked products in insertion order")]
    List {
        #[arg(long, help = "Case-insensitive substring match on barcode or name")]
        filter: Option<String>,
    },
    #[command(about = "Apply a signed delta to a product's quantity (floors at zero)")]
    Adjust {
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        delta: i64,
    },
    #[command(about = "Remove a product regardless of its quantity")]
    Remove {
        id: String,
        #[arg(long, help = "Confirm the removal")]
        yes: bool,
    },
    #[command(about = "Delete every product and the persisted snapshot")]
    Clear {
        #[arg(long, help = "Confirm the wipe")]
        yes: bool,
    },
    #[command(about = "Show the effective configuration with secrets redacted")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Scan { barcode, name } => commands::scan::run(&barcode, name.as_deref()),
        Command::Count => commands::count::run(&mut std::io::stdin().lock()),
        Command::List { filter } => commands::list::run(filter.as_deref().unwrap_or("")),
        Command::Adjust { id, delta } => commands::adjust::run(&id, delta),
        Command::Remove { id, yes } => commands::remove::run(&id, yes),
        Command::Clear { yes } => commands::clear::run(yes),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
