use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::scans::SharedSeenLog;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub seen_log: HealthCheck,
    pub checked_at: String,
}

pub fn router(seen_log: SharedSeenLog) -> Router {
    Router::new().route("/health", get(health)).with_state(seen_log)
}

pub async fn health(State(seen_log): State<SharedSeenLog>) -> (StatusCode, Json<HealthResponse>) {
    let seen_log_check = seen_log_check(&seen_log);

    let healthy = seen_log_check.status == "ok";
    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        service: HealthCheck { status: "ok", detail: "accepting requests".to_string() },
        seen_log: seen_log_check,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(response))
}

fn seen_log_check(seen_log: &SharedSeenLog) -> HealthCheck {
    let log = match seen_log.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    match log.entries() {
        Ok(entries) => HealthCheck {
            status: "ok",
            detail: format!("{} barcodes recorded", entries.len()),
        },
        Err(error) => HealthCheck { status: "fail", detail: error.to_string() },
    }
}
