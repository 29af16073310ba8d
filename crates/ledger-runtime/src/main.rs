//! Ledger ingest node entry point.

use anyhow::{Context, Result};
use tracing::info;

use ledger_runtime::{LedgerRuntime, RuntimeConfig};
use ledger_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env();
    let runtime = LedgerRuntime::new(config).context("Invalid runtime configuration")?;
    runtime.start();

    info!("Press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown();
    Ok(())
}
