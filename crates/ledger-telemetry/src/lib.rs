//! # Ledger Telemetry
//!
//! Structured logging and Prometheus metrics for the ingestion pipeline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `ledger-ingest` | Service name in logs |
//! | `RUST_LOG` / `LI_LOG_LEVEL` | `info` | Log level filter |
//! | `LI_JSON_LOGS` | `false` (`true` in containers) | JSON log output |
//! | `LI_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, BATCHES_CREATED, BATCHES_FAILED, DEBOUNCE_COALESCED,
    EVENTS_LOST, EVENTS_PUBLISHED, HANDLER_ERRORS, STATS_RECOMPUTATIONS, TRANSACTIONS_SYNCED,
    VERSION_CONFLICTS_RAISED, VERSION_CONFLICTS_RETRACTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Registers the metrics and installs the global tracing subscriber.
///
/// Call once, at process start.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    logging::init_logging(&config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
