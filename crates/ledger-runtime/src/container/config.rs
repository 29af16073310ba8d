//! # Runtime Configuration
//!
//! Defaults for every subsystem, overridable from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LI_BATCH_STATS_DEBOUNCE_MS` | `5000` |
//! | `LI_REPROCESS_DEBOUNCE_MS` | `0` |
//! | `LI_STATUS_UPDATER_INITIAL_DELAY_SECS` | `30` |
//! | `LI_STATUS_UPDATER_DELAY_SECS` | `30` |
//! | `LI_STATUS_UPDATER_MAX_MAP_SIZE` | `1000` |
//! | `LI_BUS_CAPACITY` | `1000` |
//!
//! An unparsable value is ignored with a warning and the default is kept.

use li_02_batch_lifecycle::BatchConfig;
use li_04_ingestion::{IngestionConfig, StatusUpdaterConfig};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub batch: BatchConfig,
    pub ingestion: IngestionConfig,
    pub status_updater: StatusUpdaterConfig,
    pub bus: BusConfig,
}

#[derive(Debug, Clone)]
pub struct BusConfig {
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Event bus capacity must be greater than zero")]
    ZeroBusCapacity,

    #[error("Status updater delay must be greater than zero")]
    ZeroUpdaterDelay,
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "LI_BATCH_STATS_DEBOUNCE_MS") {
            config.batch.stats_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "LI_REPROCESS_DEBOUNCE_MS") {
            config.ingestion.reprocess_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "LI_STATUS_UPDATER_INITIAL_DELAY_SECS") {
            config.status_updater.initial_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "LI_STATUS_UPDATER_DELAY_SECS") {
            config.status_updater.fixed_delay = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var::<usize>(&lookup, "LI_STATUS_UPDATER_MAX_MAP_SIZE") {
            config.status_updater.max_map_size = size;
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, "LI_BUS_CAPACITY") {
            config.bus.capacity = capacity;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // tokio's broadcast channel panics on zero capacity
        if self.bus.capacity == 0 {
            return Err(ConfigError::ZeroBusCapacity);
        }
        // A zero delay would spin the updater loop.
        if self.status_updater.fixed_delay.is_zero() {
            return Err(ConfigError::ZeroUpdaterDelay);
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring invalid configuration value");
            None
        }
    }
}
