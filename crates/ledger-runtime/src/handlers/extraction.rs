//! Extraction events: batch start, chunks, failure.

use li_04_ingestion::IngestionApi;
use shared_bus::{LedgerEvent, PartitionedDispatcher, Subscription};
use std::sync::Arc;
use tracing::{debug, info};

use super::{report_failure, ChunkWorker};

pub struct ExtractionHandler {
    subscription: Subscription,
    ingestion: Arc<dyn IngestionApi>,
    chunks: PartitionedDispatcher<LedgerEvent>,
}

impl ExtractionHandler {
    pub fn new(subscription: Subscription, ingestion: Arc<dyn IngestionApi>) -> Self {
        let chunks = PartitionedDispatcher::new(Arc::new(ChunkWorker::new(ingestion.clone())));
        Self {
            subscription,
            ingestion,
            chunks,
        }
    }

    /// Consumes events until the bus closes.
    pub async fn run(mut self) {
        info!("Extraction handler started");

        while let Some(event) = self.subscription.recv().await {
            self.handle(event).await;
        }

        info!("Extraction handler stopped: bus closed");
    }

    async fn handle(&self, event: LedgerEvent) {
        match event {
            LedgerEvent::TransactionBatchStarted {
                batch_id,
                organisation_id,
                user_id,
                extraction_parameters,
            } => {
                if let Err(e) = self
                    .ingestion
                    .initiate_ingestion(&batch_id, &organisation_id, &extraction_parameters, &user_id)
                    .await
                {
                    report_failure("batch_started", &batch_id, e);
                }
            }
            // A failure is queued behind the batch's pending chunks.
            event @ (LedgerEvent::TransactionBatchChunk { .. }
            | LedgerEvent::TransactionBatchFailed { .. }) => {
                if let Some(key) = event.partition_key().map(str::to_string) {
                    self.chunks.dispatch(&key, event);
                }
            }
            // Outbound to the ERP adapter.
            other => debug!(source = other.source(), "Ignoring extraction event"),
        }
    }
}
