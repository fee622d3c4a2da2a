use std::io::BufRead;

use thiserror::Error;

/// Failure taxonomy for external scan producers (camera pipelines, capture
/// devices). The ledger never inspects these; hosts translate them into user
/// messages. Mirrors the browser capture failures the tool originally handled
/// by string-matching error names.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScanSourceError {
    #[error("camera permission was denied")]
    PermissionDenied,
    #[error("no capture device was found")]
    DeviceNotFound,
    #[error("capture device is already in use")]
    DeviceBusy,
    #[error("no capture configuration satisfied the requested constraints")]
    ConstraintUnsatisfiable,
    #[error("capture requires a secure context")]
    InsecureContext,
    #[error("scan source failure: {0}")]
    Unknown(String),
}

impl ScanSourceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera access was denied. Allow camera access in the browser or device settings."
            }
            Self::DeviceNotFound => "No camera was found on this device.",
            Self::DeviceBusy => "The camera is in use by another application.",
            Self::ConstraintUnsatisfiable => {
                "The camera does not support the requested capture settings."
            }
            Self::InsecureContext => "Camera capture needs an HTTPS connection.",
            Self::Unknown(_) => "Scanning failed. Enter the barcode manually instead.",
        }
    }
}

/// A producer of decoded barcode strings. Implementations emit at most one
/// barcode per physical scan event and own their debounce; the ledger is fed
/// one call at a time.
pub trait ScanSource {
    /// `Ok(None)` means the source is exhausted.
    fn next_scan(&mut self) -> Result<Option<String>, ScanSourceError>;
}

/// Manual-entry source: one barcode per line from any reader. Blank lines are
/// skipped rather than surfaced as invalid scans.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> ScanSource for LineSource<R> {
    fn next_scan(&mut self) -> Result<Option<String>, ScanSourceError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|error| ScanSourceError::Unknown(error.to_string()))?;
            if read == 0 {
                return Ok(None);
            }
            let barcode = line.trim();
            if !barcode.is_empty() {
                return Ok(Some(barcode.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{LineSource, ScanSource, ScanSourceError};

    #[test]
    fn line_source_yields_trimmed_barcodes_until_eof() {
        let input = Cursor::new("111\n  222  \n\n333\n");
        let mut source = LineSource::new(input);

        assert_eq!(source.next_scan().unwrap(), Some("111".to_string()));
        assert_eq!(source.next_scan().unwrap(), Some("222".to_string()));
        assert_eq!(source.next_scan().unwrap(), Some("333".to_string()));
        assert_eq!(source.next_scan().unwrap(), None);
    }

    #[test]
    fn blank_only_input_is_just_exhausted() {
        let input = Cursor::new("\n   \n\n");
        let mut source = LineSource::new(input);
        assert_eq!(source.next_scan().unwrap(), None);
    }

    #[test]
    fn every_variant_has_a_user_message() {
        let variants = [
            ScanSourceError::PermissionDenied,
            ScanSourceError::DeviceNotFound,
            ScanSourceError::DeviceBusy,
            ScanSourceError::ConstraintUnsatisfiable,
            ScanSourceError::InsecureContext,
            ScanSourceError::Unknown("boom".to_string()),
        ];
        for variant in variants {
            assert!(!variant.user_message().is_empty());
        }
    }
}
