//! Error types for the ingestion subsystem

use li_01_ledger_storage::StorageError;
use li_02_batch_lifecycle::LifecycleError;
use li_03_transaction_sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Transaction batch with id: {batch_id} not found")]
    BatchNotFound { batch_id: String },

    #[error("Reconciliation with id: {reconciliation_id} not found")]
    ReconciliationNotFound { reconciliation_id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Batch lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

impl IngestionError {
    /// Stable problem title for the not-found variants.
    pub fn title(&self) -> &'static str {
        match self {
            Self::BatchNotFound { .. } => "TX_BATCH_NOT_FOUND",
            Self::ReconciliationNotFound { .. } => "RECONCILIATION_NOT_FOUND",
            Self::Storage(_) | Self::Lifecycle(_) | Self::Sync(_) => "INTERNAL_ERROR",
        }
    }
}

pub type IngestionResult<T> = Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_carries_id() {
        let err = IngestionError::BatchNotFound {
            batch_id: "b-42".to_string(),
        };
        assert_eq!(err.title(), "TX_BATCH_NOT_FOUND");
        assert_eq!(err.to_string(), "Transaction batch with id: b-42 not found");
    }
}
