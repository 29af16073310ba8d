//! Error types for the transaction sync subsystem

use li_01_ledger_storage::StorageError;
use li_02_batch_lifecycle::LifecycleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Batch lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

pub type SyncResult<T> = Result<T, SyncError>;
