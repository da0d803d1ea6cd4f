//! Vibration Analysis Server - Main Entry Point
//!
//! Usage: `vibra-server [config.toml]`. The path may also be given in
//! `VIBRA_CONFIG`.

use analyzer::AnalysisConfig;
use anyhow::Context;
use api::{init_logging, run_server};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("VIBRA_CONFIG"))
        .map(PathBuf::from);

    let config = AnalysisConfig::load(path.as_deref()).context("loading configuration")?;
    init_logging(config.server.json_logs).map_err(anyhow::Error::msg)?;

    info!("=== Vibration Analysis Server v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await.context("serving HTTP")?;
    Ok(())
}
