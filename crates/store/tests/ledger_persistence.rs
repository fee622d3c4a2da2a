//! Cross-crate contract: a ledger backed by the JSON file store must survive
//! a process restart with an identical collection.

use stokr_core::{Ledger, LedgerOptions, ScanOutcome};
use stokr_store::JsonFileStore;
use tempfile::TempDir;

fn file_ledger(dir: &TempDir) -> Ledger {
    Ledger::new(Box::new(JsonFileStore::new(dir.path())), LedgerOptions::default())
}

#[test]
fn restart_reproduces_the_identical_collection() {
    let dir = TempDir::new().expect("temp dir");

    let before = {
        let ledger = file_ledger(&dir);
        ledger.record_scan("111").expect("scan succeeds");
        ledger.record_scan("222").expect("scan succeeds");
        ledger.record_scan("111").expect("scan succeeds");
        ledger.create_product("333", "Bottled Water").expect("create succeeds");
        ledger.query("")
    };

    // Fresh ledger over the same directory, as after a restart.
    let ledger = file_ledger(&dir);
    ledger.hydrate();
    let after = ledger.query("");

    assert_eq!(after, before);
    let barcodes: Vec<&str> = after.iter().map(|p| p.barcode.as_str()).collect();
    assert_eq!(barcodes, vec!["111", "222", "333"]);
}

#[test]
fn clear_all_deletes_the_snapshot_file() {
    let dir = TempDir::new().expect("temp dir");

    let ledger = file_ledger(&dir);
    ledger.record_scan("111").expect("scan succeeds");
    assert!(dir.path().join("stok-products.json").exists());

    ledger.clear_all().expect("clear succeeds");
    assert!(!dir.path().join("stok-products.json").exists());

    let restarted = file_ledger(&dir);
    restarted.hydrate();
    assert!(restarted.query("").is_empty());
}

#[test]
fn corrupt_snapshot_file_degrades_to_an_empty_ledger() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("stok-products.json"), "]][[").expect("write fixture");

    let ledger = file_ledger(&dir);
    ledger.hydrate();
    assert!(ledger.query("").is_empty());

    // The ledger stays usable; the next scan replaces the corrupt payload.
    let outcome = ledger.record_scan("111").expect("scan succeeds");
    assert!(matches!(outcome, ScanOutcome::Created(_)));
}
