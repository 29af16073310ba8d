//! Reconciliation events: start, chunks, finalisation candidates, failure.

use li_04_ingestion::IngestionApi;
use shared_bus::{LedgerEvent, PartitionedDispatcher, Subscription};
use std::sync::Arc;
use tracing::{debug, info};

use super::{report_failure, ChunkWorker};

pub struct ReconciliationHandler {
    subscription: Subscription,
    ingestion: Arc<dyn IngestionApi>,
    chunks: PartitionedDispatcher<LedgerEvent>,
}

impl ReconciliationHandler {
    pub fn new(subscription: Subscription, ingestion: Arc<dyn IngestionApi>) -> Self {
        let chunks = PartitionedDispatcher::new(Arc::new(ChunkWorker::new(ingestion.clone())));
        Self {
            subscription,
            ingestion,
            chunks,
        }
    }

    pub async fn run(mut self) {
        info!("Reconciliation handler started");

        while let Some(event) = self.subscription.recv().await {
            self.handle(event).await;
        }

        info!("Reconciliation handler stopped: bus closed");
    }

    async fn handle(&self, event: LedgerEvent) {
        match event {
            LedgerEvent::ReconciliationStarted {
                reconciliation_id,
                organisation_id,
                from,
                to,
            } => {
                if let Err(e) = self
                    .ingestion
                    .initiate_reconciliation(&reconciliation_id, &organisation_id, from, to)
                    .await
                {
                    report_failure("reconciliation_started", &reconciliation_id, e);
                }
            }
            event @ (LedgerEvent::ReconciliationChunk { .. }
            | LedgerEvent::ReconciliationFailed { .. }) => {
                if let Some(key) = event.partition_key().map(str::to_string) {
                    self.chunks.dispatch(&key, event);
                }
            }
            LedgerEvent::ReconciliationFinalisation {
                reconciliation_id,
                organisation_id,
                total_prediction,
            } => {
                match self
                    .ingestion
                    .finalise_reconciliation(&reconciliation_id, &organisation_id, total_prediction)
                    .await
                {
                    Ok(completed) => debug!(
                        reconciliation_id = %reconciliation_id,
                        completed,
                        "Finalisation candidate handled"
                    ),
                    Err(e) => report_failure("reconciliation_finalisation", &reconciliation_id, e),
                }
            }
            other => debug!(source = other.source(), "Ignoring non-reconciliation event"),
        }
    }
}
