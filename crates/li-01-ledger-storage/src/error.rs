//! Error types for the storage subsystem

use thiserror::Error;

/// Storage subsystem errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend cannot be reached
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// A write was rejected by the backend (constraint, serialisation)
    #[error("Write rejected for {entity} {id}: {reason}")]
    WriteRejected {
        entity: &'static str,
        id: String,
        reason: String,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
