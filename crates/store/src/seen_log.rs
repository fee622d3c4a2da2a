use std::fs;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeenLogError {
    #[error("seen log io failure at `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("seen log at `{0}` could not be parsed: {1}")]
    Corrupt(String, #[source] serde_json::Error),
}

/// Append-only, deduplicated list of every barcode the relay has ever seen,
/// kept as a single JSON string array on disk. First-seen order is preserved.
pub struct SeenLog {
    path: PathBuf,
}

impl SeenLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SeenLogError {
        SeenLogError::Io { path: self.path.clone(), source }
    }

    pub fn entries(&self) -> Result<Vec<String>, SeenLogError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(self.io_error(error)),
        };

        serde_json::from_str(&raw)
            .map_err(|error| SeenLogError::Corrupt(self.path.display().to_string(), error))
    }

    /// Records a barcode. Returns `true` when it was new, `false` when it had
    /// been seen before (in which case nothing is written).
    pub fn record(&mut self, barcode: &str) -> Result<bool, SeenLogError> {
        let mut entries = self.entries()?;
        if entries.iter().any(|entry| entry == barcode) {
            return Ok(false);
        }
        entries.push(barcode.to_string());
        self.write(&entries)?;
        Ok(true)
    }

    fn write(&self, entries: &[String]) -> Result<(), SeenLogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| SeenLogError::Io { path: parent.to_path_buf(), source })?;
        }

        let payload = serde_json::to_string_pretty(entries)
            .map_err(|error| SeenLogError::Corrupt(self.path.display().to_string(), error))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = fs::File::create(&tmp_path)
            .map_err(|source| SeenLogError::Io { path: tmp_path.clone(), source })?;
        tmp.write_all(payload.as_bytes())
            .map_err(|source| SeenLogError::Io { path: tmp_path.clone(), source })?;
        tmp.sync_all().map_err(|source| SeenLogError::Io { path: tmp_path.clone(), source })?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).map_err(|source| self.io_error(source))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::SeenLog;

    #[test]
    fn record_appends_in_first_seen_order() {
        let dir = TempDir::new().expect("temp dir");
        let mut log = SeenLog::new(dir.path().join("barcodes.json"));

        assert!(log.record("111").expect("record succeeds"));
        assert!(log.record("222").expect("record succeeds"));
        assert!(log.record("333").expect("record succeeds"));

        assert_eq!(log.entries().expect("entries load"), vec!["111", "222", "333"]);
    }

    #[test]
    fn recording_a_seen_barcode_is_a_no_op() {
        let dir = TempDir::new().expect("temp dir");
        let mut log = SeenLog::new(dir.path().join("barcodes.json"));

        assert!(log.record("111").expect("record succeeds"));
        assert!(!log.record("111").expect("repeat record succeeds"));
        assert_eq!(log.entries().expect("entries load"), vec!["111"]);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().expect("temp dir");
        let log = SeenLog::new(dir.path().join("never-written.json"));
        assert!(log.entries().expect("entries load").is_empty());
    }

    #[test]
    fn corrupt_file_is_reported_not_silently_dropped() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("barcodes.json");
        std::fs::write(&path, "{not a list").expect("write fixture");

        let log = SeenLog::new(&path);
        assert!(log.entries().is_err());
    }
}
