// SymptoWise - health companion core
// Entry point: opens the data directory and prints the dashboard summary

use anyhow::Context;
use std::path::PathBuf;
use symptowise::app::AppState;
use symptowise::config::{DATA_DIR_ENV, DEFAULT_DATA_DIR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "symptowise=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting SymptoWise");

    let data_dir = std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let state = AppState::initialize(data_dir.clone())
        .await
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;

    let summary = state.summary().await.context("failed to build summary")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
