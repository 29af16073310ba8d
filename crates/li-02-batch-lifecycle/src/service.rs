//! Batch Lifecycle Service
//!
//! Owns batch creation and failure, and turns "something in this batch
//! changed" signals into debounced statistics/status recomputations.

use crate::domain::{calculate_batch_status, BatchStatisticsView, DebounceCoordinator};
use crate::error::{LifecycleError, LifecycleResult};
use crate::ports::inbound::BatchLifecycleApi;
use async_trait::async_trait;
use chrono::Utc;
use ledger_telemetry::{BATCHES_CREATED, BATCHES_FAILED, STATS_RECOMPUTATIONS};
use li_01_ledger_storage::{BatchAssocRepository, BatchRepository, TransactionRepository};
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{
    ExtractionParameters, FatalError, TransactionBatch, TransactionBatchStatus, TransactionId,
    TxStatusUpdate,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Batch lifecycle configuration
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Coalescing window for statistics recomputation
    pub stats_debounce: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stats_debounce: Duration::from_secs(5),
        }
    }
}

/// The expensive part: reload the batch projection and persist fresh
/// statistics and status. Cloned into every debounced task.
#[derive(Clone)]
struct StatsRecomputation {
    batches: Arc<dyn BatchRepository>,
    transactions: Arc<dyn TransactionRepository>,
}

impl StatsRecomputation {
    async fn run(
        &self,
        batch_id: &str,
        total_transactions_count: Option<u64>,
        tx_ids: Option<Vec<TransactionId>>,
    ) -> LifecycleResult<()> {
        info!(batch_id, "EXPENSIVE::Updating transaction batch status and statistics");
        STATS_RECOMPUTATIONS.inc();

        if let Some(tx_ids) = tx_ids.filter(|ids| !ids.is_empty()) {
            let mut current = self.transactions.find_all_by_ids(&tx_ids).await?;
            for tx in current.iter_mut() {
                tx.update_processing_status();
            }
            self.transactions.save_all(current).await?;
        }

        let Some(mut batch) = self.batches.find_by_id(batch_id).await? else {
            warn!(batch_id, "Transaction batch not found");
            return Ok(());
        };

        let projection = self.batches.statistics_projection(batch_id).await?;
        let mut view = BatchStatisticsView::new(batch_id);
        view.merge(&projection);

        if batch.status == TransactionBatchStatus::Finalized {
            warn!(batch_id, "Transaction batch already finalized, statistics are frozen");
            return Ok(());
        }

        let total = total_transactions_count.unwrap_or(view.total);
        let mut statistics = view.to_batch_statistics(total);
        let status = calculate_batch_status(&view);

        if status == TransactionBatchStatus::Finalized {
            // Duplicates dropped during ingestion never reach storage.
            let retained = view.retained();
            statistics.total = retained;
            statistics.processed = retained;
        }

        batch.statistics = statistics;
        batch.status = status;
        batch.updated_at = Utc::now();
        self.batches.save(batch).await?;

        info!(
            batch_id,
            status = status.as_str(),
            "EXPENSIVE::Transaction batch status and statistics updated"
        );
        Ok(())
    }
}

pub struct BatchLifecycleService {
    config: BatchConfig,
    batches: Arc<dyn BatchRepository>,
    assocs: Arc<dyn BatchAssocRepository>,
    publisher: Arc<dyn EventPublisher>,
    recomputation: StatsRecomputation,
    debouncer: DebounceCoordinator,
}

impl BatchLifecycleService {
    pub fn new(
        config: BatchConfig,
        batches: Arc<dyn BatchRepository>,
        transactions: Arc<dyn TransactionRepository>,
        assocs: Arc<dyn BatchAssocRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            recomputation: StatsRecomputation {
                batches: batches.clone(),
                transactions,
            },
            batches,
            assocs,
            publisher,
            debouncer: DebounceCoordinator::new(),
        }
    }

    /// Runs the recomputation immediately, bypassing the debounce window.
    pub async fn invoke_update_transaction_batch_status_and_stats(
        &self,
        batch_id: &str,
        total_transactions_count: Option<u64>,
        tx_ids: Option<Vec<TransactionId>>,
    ) -> LifecycleResult<()> {
        self.recomputation
            .run(batch_id, total_transactions_count, tx_ids)
            .await
    }

    /// Number of batches with a recomputation waiting for its window.
    pub fn pending_recomputations(&self) -> usize {
        self.debouncer.pending_count()
    }

    /// Drops pending recomputations. Used on shutdown.
    pub fn shutdown(&self) {
        self.debouncer.shutdown();
    }
}

#[async_trait]
impl BatchLifecycleApi for BatchLifecycleService {
    async fn create_transaction_batch(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
    ) -> LifecycleResult<()> {
        if batch_id.is_empty() {
            return Err(LifecycleError::InvalidBatchId {
                reason: "empty".to_string(),
            });
        }
        info!(batch_id, organisation_id, "Creating transaction batch");

        if self.batches.find_by_id(batch_id).await?.is_some() {
            info!(batch_id, "Transaction batch already exists, skipping");
            return Ok(());
        }

        let batch = TransactionBatch::new(batch_id, organisation_id, extraction_parameters, user_id);
        self.batches.save(batch).await?;
        BATCHES_CREATED.inc();

        info!(batch_id, "Transaction batch created");

        self.publisher
            .publish(LedgerEvent::TransactionBatchCreated {
                batch_id: batch_id.to_string(),
                organisation_id: organisation_id.to_string(),
                extraction_parameters: extraction_parameters.clone(),
            })
            .await;

        Ok(())
    }

    async fn fail_transaction_batch(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
        error: FatalError,
    ) -> LifecycleResult<()> {
        let mut batch = match self.batches.find_by_id(batch_id).await? {
            Some(batch) => batch,
            None => {
                TransactionBatch::new(batch_id, organisation_id, extraction_parameters, user_id)
            }
        };

        warn!(batch_id, error = %error, "Failing transaction batch");
        if self.debouncer.cancel(batch_id) {
            debug!(batch_id, "Dropped pending recomputation of failed batch");
        }
        batch.fail(error);
        self.batches.save(batch).await?;
        BATCHES_FAILED.inc();

        info!(batch_id, "Transaction batch status updated");
        Ok(())
    }

    fn update_transaction_batch_status_and_stats(
        &self,
        batch_id: &str,
        total_transactions_count: Option<u64>,
        tx_ids: Option<Vec<TransactionId>>,
    ) {
        let recomputation = self.recomputation.clone();
        let id = batch_id.to_string();

        self.debouncer
            .trigger(batch_id, self.config.stats_debounce, async move {
                if let Err(e) = recomputation
                    .run(&id, total_transactions_count, tx_ids)
                    .await
                {
                    warn!(batch_id = %id, error = %e, "Batch statistics recomputation failed");
                }
            });
    }

    async fn update_batches_per_transactions(
        &self,
        tx_status_updates: &HashMap<TransactionId, TxStatusUpdate>,
    ) -> LifecycleResult<()> {
        let tx_ids: Vec<TransactionId> = tx_status_updates.keys().cloned().collect();
        let assocs = self.assocs.find_by_transaction_ids(&tx_ids).await?;

        for tx_id in &tx_ids {
            if !assocs.iter().any(|a| &a.transaction_id == tx_id) {
                warn!(tx_id = %tx_id, "Transaction batch assoc not found");
            }
        }

        let batch_ids: BTreeSet<&str> = assocs.iter().map(|a| a.batch_id.as_str()).collect();

        for batch_id in batch_ids {
            let Some(batch) = self.batches.find_by_id(batch_id).await? else {
                continue;
            };
            // Keep the last known expected total, if one was ever recorded.
            let total = Some(batch.statistics.total).filter(|t| *t > 0);
            self.update_transaction_batch_status_and_stats(batch_id, total, None);
        }

        Ok(())
    }

    async fn find_by_id(&self, batch_id: &str) -> LifecycleResult<Option<TransactionBatch>> {
        Ok(self.batches.find_by_id(batch_id).await?)
    }

    async fn find_all(&self) -> LifecycleResult<Vec<TransactionBatch>> {
        Ok(self.batches.find_all().await?)
    }
}
