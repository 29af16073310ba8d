//! Ordered per-run processing: chunks, then the run's failure.

use async_trait::async_trait;
use li_04_ingestion::IngestionApi;
use shared_bus::{LedgerEvent, PartitionHandler};
use shared_types::ProcessorFlags;
use std::sync::Arc;
use tracing::warn;

use super::report_failure;

/// Runs partitioned events one at a time for their batch or reconciliation.
pub struct ChunkWorker {
    ingestion: Arc<dyn IngestionApi>,
}

impl ChunkWorker {
    pub fn new(ingestion: Arc<dyn IngestionApi>) -> Self {
        Self { ingestion }
    }
}

#[async_trait]
impl PartitionHandler<LedgerEvent> for ChunkWorker {
    async fn handle(&self, event: LedgerEvent) {
        match event {
            LedgerEvent::TransactionBatchChunk {
                batch_id,
                organisation_id,
                total_transactions_count,
                transactions,
            } => {
                if let Err(e) = self
                    .ingestion
                    .continue_ingestion(
                        &organisation_id,
                        &batch_id,
                        total_transactions_count,
                        transactions,
                        ProcessorFlags::import(),
                    )
                    .await
                {
                    report_failure("batch_chunk", &batch_id, e);
                }
            }
            LedgerEvent::ReconciliationChunk {
                reconciliation_id,
                organisation_id,
                from,
                to,
                total_transactions_count,
                transactions,
            } => {
                if let Err(e) = self
                    .ingestion
                    .continue_reconciliation(
                        &reconciliation_id,
                        &organisation_id,
                        from,
                        to,
                        total_transactions_count,
                        transactions,
                    )
                    .await
                {
                    report_failure("reconciliation_chunk", &reconciliation_id, e);
                }
            }
            LedgerEvent::TransactionBatchFailed {
                batch_id,
                organisation_id,
                user_id,
                extraction_parameters,
                error,
            } => {
                if let Err(e) = self
                    .ingestion
                    .fail_ingestion(
                        &batch_id,
                        &organisation_id,
                        &extraction_parameters,
                        &user_id,
                        error,
                    )
                    .await
                {
                    report_failure("batch_failed", &batch_id, e);
                }
            }
            LedgerEvent::ReconciliationFailed {
                reconciliation_id,
                organisation_id,
                error,
            } => {
                if let Err(e) = self
                    .ingestion
                    .fail_reconciliation(&reconciliation_id, &organisation_id, error)
                    .await
                {
                    report_failure("reconciliation_failed", &reconciliation_id, e);
                }
            }
            other => warn!(event = ?other.topic(), "Unpartitioned event routed to chunk worker"),
        }
    }
}
