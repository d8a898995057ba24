//! Lunara: Local-first menstrual cycle insights engine.
//!
//! Main entry point for the command-line summary tool.

#![allow(non_snake_case)]

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use Lunara::adapters::sanitize::SanitizingMakeWriter;
use Lunara::adapters::sqlite::SqliteStore;
use Lunara::application::InsightsService;
use Lunara::domain::UserMetrics;

fn main() -> Result<()> {
    // Initialize logging.
    //
    // Results print to stdout, so logs default to stderr; set
    // LUNARA_LOG_MODE=file to append to LUNARA_LOG_FILE instead.
    let log_mode = std::env::var("LUNARA_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, _guard) = if log_mode == "file" {
        let log_file =
            std::env::var("LUNARA_LOG_FILE").unwrap_or_else(|_| "lunara.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Lunara...");

    let user_id = std::env::args().nth(1).unwrap_or_else(|| "local".to_string());
    let db_path = std::env::var("LUNARA_DB").unwrap_or_else(|_| "lunara.db".to_string());

    let storage = Arc::new(SqliteStore::new(&db_path)?);
    let service = InsightsService::new(storage);

    let assessment = service.refresh_assessment(&user_id, &UserMetrics::default())?;
    println!("Risk assessment:");
    println!("{}", serde_json::to_string_pretty(&assessment)?);

    let detection = service.refresh_anomalies(&user_id)?;
    println!("Anomaly scan:");
    println!("{}", serde_json::to_string_pretty(&detection)?);

    if let Some(forecast) = service.forecast(&user_id)? {
        println!("Cycle forecast:");
        println!("{}", serde_json::to_string_pretty(&forecast)?);
    }

    let alerts = service.alerts().active(&user_id)?;
    println!("Active alerts:");
    println!("{}", serde_json::to_string_pretty(&alerts)?);

    tracing::info!("Lunara summary complete.");
    Ok(())
}
