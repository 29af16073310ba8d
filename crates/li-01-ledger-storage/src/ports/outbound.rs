//! Driven Ports (SPI - repositories used by the ingestion subsystems)
//!
//! Every call is one atomic unit: a `save_all` either stores every entity or
//! none of them.

use crate::domain::BatchStatisticsProjection;
use crate::error::StorageResult;
use async_trait::async_trait;
use shared_types::{BatchAssoc, Transaction, TransactionBatch, TransactionId};

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_id(&self, tx_id: &str) -> StorageResult<Option<Transaction>>;

    /// Bulk fetch. Unknown ids are skipped.
    async fn find_all_by_ids(&self, tx_ids: &[TransactionId]) -> StorageResult<Vec<Transaction>>;

    async fn save(&self, tx: Transaction) -> StorageResult<()>;

    async fn save_all(&self, txs: Vec<Transaction>) -> StorageResult<()>;
}

#[async_trait]
pub trait BatchRepository: Send + Sync {
    async fn find_by_id(&self, batch_id: &str) -> StorageResult<Option<TransactionBatch>>;

    async fn find_all(&self) -> StorageResult<Vec<TransactionBatch>>;

    async fn save(&self, batch: TransactionBatch) -> StorageResult<()>;

    /// Counts over the transactions whose owning `batch_id` is `batch_id`.
    async fn statistics_projection(&self, batch_id: &str)
        -> StorageResult<BatchStatisticsProjection>;
}

#[async_trait]
pub trait BatchAssocRepository: Send + Sync {
    /// Returns the existing row or stores and returns `assoc`.
    async fn find_or_create(&self, assoc: BatchAssoc) -> StorageResult<BatchAssoc>;

    async fn find_by_transaction_ids(
        &self,
        tx_ids: &[TransactionId],
    ) -> StorageResult<Vec<BatchAssoc>>;

    async fn find_by_batch_id(&self, batch_id: &str) -> StorageResult<Vec<BatchAssoc>>;
}
