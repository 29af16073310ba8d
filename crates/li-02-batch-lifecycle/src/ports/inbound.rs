//! Driving Ports (API - Inbound)

use crate::error::LifecycleResult;
use async_trait::async_trait;
use shared_types::{ExtractionParameters, FatalError, TransactionBatch, TransactionId, TxStatusUpdate};
use std::collections::HashMap;

/// Primary Batch Lifecycle API
#[async_trait]
pub trait BatchLifecycleApi: Send + Sync {
    /// Persists a new batch in `CREATED` and announces it.
    ///
    /// Idempotent: a batch id that already exists is left untouched and no
    /// event is published.
    async fn create_transaction_batch(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
    ) -> LifecycleResult<()>;

    /// Marks a batch `FAILED`, building it from the parameters if it was never created.
    async fn fail_transaction_batch(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
        error: FatalError,
    ) -> LifecycleResult<()>;

    /// Registers a debounced recomputation of the batch's statistics and status.
    ///
    /// Returns immediately. Within one debounce window only the last call's
    /// parameters are used. `tx_ids` name transactions whose processing
    /// status must be refreshed first; they are reloaded when the window
    /// closes, so writes made meanwhile are kept.
    fn update_transaction_batch_status_and_stats(
        &self,
        batch_id: &str,
        total_transactions_count: Option<u64>,
        tx_ids: Option<Vec<TransactionId>>,
    );

    /// Schedules recomputation for every batch associated with a changed transaction.
    async fn update_batches_per_transactions(
        &self,
        tx_status_updates: &HashMap<TransactionId, TxStatusUpdate>,
    ) -> LifecycleResult<()>;

    async fn find_by_id(&self, batch_id: &str) -> LifecycleResult<Option<TransactionBatch>>;

    async fn find_all(&self) -> LifecycleResult<Vec<TransactionBatch>>;
}
