//! Error types for the batch lifecycle subsystem

use li_01_ledger_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid batch id: {reason}")]
    InvalidBatchId { reason: String },
}

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;
