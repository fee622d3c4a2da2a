mod health;
mod scans;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::Router;
use stokr_core::config::{AppConfig, LoadOptions};
use stokr_store::SeenLog;

fn init_logging(config: &AppConfig) {
    use stokr_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn router(seen_log: SeenLog) -> Router {
    let shared = Arc::new(Mutex::new(seen_log));
    Router::new()
        .merge(health::router(Arc::clone(&shared)))
        .merge(scans::router(shared))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let seen_log = SeenLog::new(config.store.data_dir.join("barcodes.json"));
    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "server.start",
        bind_address = %address,
        seen_log = %seen_log.path().display(),
        "relay server listening"
    );

    axum::serve(listener, router(seen_log))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!(event_name = "server.shutdown", "shutdown signal received");
        })
        .await?;

    Ok(())
}
