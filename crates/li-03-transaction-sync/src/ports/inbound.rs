//! Driving Ports (API - Inbound)

use crate::error::SyncResult;
use async_trait::async_trait;
use shared_types::{OrganisationTransactions, ProcessorFlags};

#[async_trait]
pub trait TransactionSyncApi: Send + Sync {
    /// Merges one chunk of a batch into the persisted transaction set.
    ///
    /// Version conflicts never fail the call; they are recorded as
    /// violations on the stored transaction. A storage failure aborts the
    /// chunk and is safe to retry.
    async fn execute(
        &self,
        batch_id: &str,
        incoming: OrganisationTransactions,
        total_transactions_count: Option<u64>,
        flags: ProcessorFlags,
    ) -> SyncResult<()>;
}
