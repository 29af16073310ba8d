//! # Subsystem Container
//!
//! Runtime configuration and the wired subsystem instances.

pub mod config;
pub mod subsystems;

pub use config::{BusConfig, ConfigError, RuntimeConfig};
pub use subsystems::SubsystemContainer;
