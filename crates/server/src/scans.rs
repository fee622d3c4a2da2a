use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use stokr_store::SeenLog;
use tracing::{error, info};

pub type SharedSeenLog = Arc<Mutex<SeenLog>>;

#[derive(Debug, Deserialize)]
pub struct ScanReport {
    pub barcode: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router(seen_log: SharedSeenLog) -> Router {
    Router::new().route("/api/scans", post(record_scan)).with_state(seen_log)
}

/// Appends the reported barcode to the seen log unless it is already there.
/// This endpoint is a best-effort mirror; clients treat any failure here as
/// non-fatal.
pub async fn record_scan(
    State(seen_log): State<SharedSeenLog>,
    Json(report): Json<ScanReport>,
) -> (StatusCode, Json<ScanResponse>) {
    let barcode = report.barcode.trim().to_string();
    if barcode.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ScanResponse {
                success: false,
                new: None,
                error: Some("barcode must not be empty".to_string()),
            }),
        );
    }

    let result = {
        let mut log = match seen_log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        log.record(&barcode)
    };

    match result {
        Ok(new) => {
            info!(
                event_name = "server.scans.recorded",
                barcode = %barcode,
                new = new,
                "scan report processed"
            );
            (StatusCode::OK, Json(ScanResponse { success: true, new: Some(new), error: None }))
        }
        Err(err) => {
            error!(
                event_name = "server.scans.store_failed",
                barcode = %barcode,
                error = %err,
                "seen log write failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ScanResponse { success: false, new: None, error: Some(err.to_string()) }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;
    use stokr_store::SeenLog;
    use tempfile::TempDir;

    use super::{record_scan, ScanReport};

    fn shared_log(dir: &TempDir) -> super::SharedSeenLog {
        Arc::new(Mutex::new(SeenLog::new(dir.path().join("barcodes.json"))))
    }

    #[tokio::test]
    async fn first_report_is_new_repeat_is_not() {
        let dir = TempDir::new().expect("temp dir");
        let log = shared_log(&dir);

        let (status, Json(body)) =
            record_scan(State(Arc::clone(&log)), Json(ScanReport { barcode: "111".into() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.new, Some(true));

        let (status, Json(body)) =
            record_scan(State(log), Json(ScanReport { barcode: " 111 ".into() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.new, Some(false));
    }

    #[tokio::test]
    async fn blank_barcode_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let log = shared_log(&dir);

        let (status, Json(body)) =
            record_scan(State(log), Json(ScanReport { barcode: "   ".into() })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }
}
