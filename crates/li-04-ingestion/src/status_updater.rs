//! Ledger status updater job.
//!
//! Ledger-follower events arrive far more often than batch statistics need
//! refreshing, so status updates are collected in a map keyed by transaction
//! id (last update wins) and applied on a fixed delay.

use crate::error::IngestionResult;
use ledger_telemetry::HANDLER_ERRORS;
use li_01_ledger_storage::TransactionRepository;
use li_02_batch_lifecycle::BatchLifecycleApi;
use parking_lot::Mutex;
use shared_types::{TransactionId, TxStatusUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug)]
pub struct StatusUpdaterConfig {
    pub initial_delay: Duration,
    pub fixed_delay: Duration,
    /// Size above which a warning is logged. Updates are never dropped.
    pub max_map_size: usize,
}

impl Default for StatusUpdaterConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            fixed_delay: Duration::from_secs(30),
            max_map_size: 1000,
        }
    }
}

pub struct TxStatusUpdaterJob {
    config: StatusUpdaterConfig,
    pending: Mutex<HashMap<TransactionId, TxStatusUpdate>>,
    transactions: Arc<dyn TransactionRepository>,
    lifecycle: Arc<dyn BatchLifecycleApi>,
}

impl TxStatusUpdaterJob {
    pub fn new(
        config: StatusUpdaterConfig,
        transactions: Arc<dyn TransactionRepository>,
        lifecycle: Arc<dyn BatchLifecycleApi>,
    ) -> Self {
        Self {
            config,
            pending: Mutex::new(HashMap::new()),
            transactions,
            lifecycle,
        }
    }

    pub fn add_to_status_update_map(&self, updates: impl IntoIterator<Item = TxStatusUpdate>) {
        let size = {
            let mut pending = self.pending.lock();
            for update in updates {
                pending.insert(update.tx_id.clone(), update);
            }
            pending.len()
        };

        if size > self.config.max_map_size {
            warn!(
                max_map_size = self.config.max_map_size,
                current_size = size,
                "TxStatusUpdate map size exceeded the limit"
            );
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Applies a snapshot of the collected updates.
    ///
    /// Entries are removed only after the transactions were saved and the
    /// affected batches were scheduled for recomputation; on failure they
    /// stay for the next run. An entry replaced while the run was in flight
    /// is kept as well. Returns the number of updates applied.
    pub async fn execute(&self) -> IngestionResult<usize> {
        let updates = self.pending.lock().clone();
        if updates.is_empty() {
            debug!("No TxStatusUpdate events to process");
            return Ok(0);
        }
        info!(tx_count = updates.len(), "Updating status of transactions");

        let tx_ids: Vec<TransactionId> = updates.keys().cloned().collect();
        let mut stored = self.transactions.find_all_by_ids(&tx_ids).await?;
        for tx in stored.iter_mut() {
            if let Some(update) = updates.get(&tx.id) {
                tx.ledger_dispatch_status = update.status;
                tx.update_processing_status();
            }
        }
        if stored.len() < updates.len() {
            warn!(
                missing = updates.len() - stored.len(),
                "Status updates for unknown transactions"
            );
        }
        self.transactions.save_all(stored).await?;
        self.lifecycle.update_batches_per_transactions(&updates).await?;

        let mut pending = self.pending.lock();
        for (tx_id, applied) in &updates {
            if pending.get(tx_id) == Some(applied) {
                pending.remove(tx_id);
            }
        }
        Ok(updates.len())
    }

    /// Runs the job forever: `initial_delay`, then one run every `fixed_delay`
    /// after the previous run ended.
    pub async fn run(self: Arc<Self>) {
        tokio::time::sleep(self.config.initial_delay).await;
        loop {
            if let Err(e) = self.execute().await {
                HANDLER_ERRORS.with_label_values(&["status_updater"]).inc();
                error!(
                    error = %e,
                    "Failed to process TxStatusUpdates - entries will be retained in the map"
                );
            }
            tokio::time::sleep(self.config.fixed_delay).await;
        }
    }
}
