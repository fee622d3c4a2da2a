//! Snapshot store implementations for the stock ledger, plus the append-only
//! seen-barcode log used by the relay server.

mod seen_log;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use stokr_core::snapshot::{SnapshotStore, StoreError};

pub use seen_log::{SeenLog, SeenLogError};

/// One JSON file per key under a data directory. Writes land in a sibling
/// temp file first and are moved into place with a rename, so readers never
/// observe a half-written snapshot.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io { path: path.to_path_buf(), source }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(payload) => Ok(Some(payload)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Self::io_error(&path, error)),
        }
    }

    fn save(&mut self, key: &str, payload: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|error| Self::io_error(&self.data_dir, error))?;

        let path = self.key_path(key);
        let tmp_path = self.data_dir.join(format!("{key}.json.tmp"));

        let mut tmp = fs::File::create(&tmp_path).map_err(|error| Self::io_error(&tmp_path, error))?;
        tmp.write_all(payload.as_bytes()).map_err(|error| Self::io_error(&tmp_path, error))?;
        tmp.sync_all().map_err(|error| Self::io_error(&tmp_path, error))?;
        drop(tmp);

        fs::rename(&tmp_path, &path).map_err(|error| Self::io_error(&path, error))
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(Self::io_error(&path, error)),
        }
    }
}

/// HashMap-backed store for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(key: &str, payload: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), payload.to_string());
        Self { entries }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, payload: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stokr_core::snapshot::SnapshotStore;
    use tempfile::TempDir;

    use super::{JsonFileStore, MemoryStore};

    #[test]
    fn file_store_round_trips_a_payload() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = JsonFileStore::new(dir.path());

        store.save("stok-products", "[{\"x\":1}]").expect("save succeeds");
        let loaded = store.load("stok-products").expect("load succeeds");
        assert_eq!(loaded.as_deref(), Some("[{\"x\":1}]"));
    }

    #[test]
    fn missing_key_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = JsonFileStore::new(dir.path());
        assert_eq!(store.load("absent").expect("load succeeds"), None);
    }

    #[test]
    fn save_overwrites_wholesale() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = JsonFileStore::new(dir.path());

        store.save("k", "first").expect("save succeeds");
        store.save("k", "second").expect("save succeeds");
        assert_eq!(store.load("k").expect("load succeeds").as_deref(), Some("second"));
    }

    #[test]
    fn delete_of_missing_key_is_a_success() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = JsonFileStore::new(dir.path());

        store.delete("never-saved").expect("delete succeeds");
        store.save("k", "v").expect("save succeeds");
        store.delete("k").expect("delete succeeds");
        assert_eq!(store.load("k").expect("load succeeds"), None);
    }

    #[test]
    fn save_creates_the_data_directory() {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("data").join("counts");
        let mut store = JsonFileStore::new(&nested);

        store.save("k", "v").expect("save creates parents");
        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn memory_store_behaves_like_a_map() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("k").expect("load succeeds"), None);

        store.save("k", "v").expect("save succeeds");
        assert_eq!(store.load("k").expect("load succeeds").as_deref(), Some("v"));

        store.delete("k").expect("delete succeeds");
        store.delete("k").expect("repeat delete succeeds");
        assert_eq!(store.load("k").expect("load succeeds"), None);
    }
}
