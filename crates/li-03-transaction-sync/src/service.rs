//! Transaction Sync Service
//!
//! Merges an incoming chunk of detached ERP transactions into the persisted
//! set. See [`crate::domain::classification`] for the per-transaction rule.
//!
//! Violations are normally raised by the rules engine only; the version
//! conflict flag is the one exception and lives here.

use crate::domain::{classify, version_conflict_violation, SyncOutcome};
use crate::error::SyncResult;
use crate::ports::{TransactionSyncApi, VersionFingerprinter};
use async_trait::async_trait;
use ledger_telemetry::{TRANSACTIONS_SYNCED, VERSION_CONFLICTS_RAISED, VERSION_CONFLICTS_RETRACTED};
use li_01_ledger_storage::{BatchAssocRepository, TransactionRepository};
use li_02_batch_lifecycle::BatchLifecycleApi;
use shared_types::{
    BatchAssoc, BatchId, OrganisationTransactions, ProcessorFlags, Source, Transaction,
    TransactionId, Trigger, ViolationCode,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct SyncTally {
    applied: usize,
    conflicts: usize,
    retracted: usize,
    skipped: usize,
}

impl SyncTally {
    fn record(&self) {
        for (outcome, count) in [
            ("applied", self.applied),
            ("conflict", self.conflicts),
            ("retracted", self.retracted),
            ("skipped", self.skipped),
        ] {
            if count > 0 {
                TRANSACTIONS_SYNCED
                    .with_label_values(&[outcome])
                    .inc_by(count as f64);
            }
        }
    }
}

pub struct TransactionSyncService {
    transactions: Arc<dyn TransactionRepository>,
    assocs: Arc<dyn BatchAssocRepository>,
    lifecycle: Arc<dyn BatchLifecycleApi>,
    fingerprinter: Arc<dyn VersionFingerprinter>,
}

impl TransactionSyncService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        assocs: Arc<dyn BatchAssocRepository>,
        lifecycle: Arc<dyn BatchLifecycleApi>,
        fingerprinter: Arc<dyn VersionFingerprinter>,
    ) -> Self {
        Self {
            transactions,
            assocs,
            lifecycle,
            fingerprinter,
        }
    }

    /// Merge path for `IMPORT` and `RECONCILIATION` chunks.
    pub async fn process_transactions_for_the_first_time(
        &self,
        batch_id: &str,
        incoming: OrganisationTransactions,
        total_transactions_count: Option<u64>,
        flags: ProcessorFlags,
    ) -> SyncResult<()> {
        let ids = incoming.ids();
        let mut stored: HashMap<TransactionId, Transaction> = self
            .transactions
            .find_all_by_ids(&ids)
            .await?
            .into_iter()
            .map(|tx| (tx.id.clone(), tx))
            .collect();

        let mut already_stored = Vec::new();
        let mut to_process = Vec::new();
        let mut previous_owners: BTreeSet<BatchId> = BTreeSet::new();
        let mut tally = SyncTally::default();

        for incoming_tx in incoming.transactions {
            let persisted = stored.remove(&incoming_tx.id);
            let outcome = classify(persisted.as_ref(), &incoming_tx, self.fingerprinter.as_ref());

            match (outcome, persisted) {
                (SyncOutcome::Conflict, Some(mut tx)) => {
                    warn!(
                        tx_id = %tx.id,
                        transaction_number = %tx.internal_number,
                        "Transaction cannot be altered, it is already marked as dispatched"
                    );
                    if tx.add_violation(version_conflict_violation(&tx.internal_number)) {
                        VERSION_CONFLICTS_RAISED.inc();
                    }
                    if tx.batch_id != batch_id {
                        previous_owners.insert(std::mem::replace(&mut tx.batch_id, batch_id.to_string()));
                    }
                    tx.update_processing_status();
                    tally.conflicts += 1;
                    already_stored.push(tx);
                }
                (SyncOutcome::Unchanged, Some(mut tx)) => {
                    if tx.remove_violations_with_code(ViolationCode::TxVersionConflictTxNotModifiable) {
                        info!(tx_id = %tx.id, "Version conflict resolved, retracting violation");
                        VERSION_CONFLICTS_RETRACTED.inc();
                        tx.update_automated_validation_status();
                        tx.update_processing_status();
                        tally.retracted += 1;
                        already_stored.push(tx);
                    } else {
                        tally.skipped += 1;
                    }
                }
                (SyncOutcome::Apply, Some(mut tx)) => {
                    if tx.batch_id != batch_id {
                        previous_owners.insert(tx.batch_id.clone());
                    }
                    tx.copy_erp_fields_from(incoming_tx);
                    tx.batch_id = batch_id.to_string();
                    tally.applied += 1;
                    to_process.push(tx);
                }
                (SyncOutcome::Apply, None) => {
                    let mut tx = incoming_tx;
                    tx.batch_id = batch_id.to_string();
                    tally.applied += 1;
                    to_process.push(tx);
                }
                _ => tally.skipped += 1,
            }
        }

        debug!(
            batch_id,
            applied = tally.applied,
            conflicts = tally.conflicts,
            retracted = tally.retracted,
            skipped = tally.skipped,
            "Chunk classified"
        );

        let mut touched: Vec<TransactionId> = already_stored.iter().map(|tx| tx.id.clone()).collect();
        if !already_stored.is_empty() {
            info!(batch_id, tx_count = already_stored.len(), "Saving already stored transactions");
            self.transactions.save_all(already_stored).await?;
        }

        let processed = self.store_transactions(batch_id, to_process, flags).await?;
        touched.extend(processed.into_iter().map(|tx| tx.id));
        self.associate(batch_id, &touched).await?;

        tally.record();

        self.lifecycle
            .update_transaction_batch_status_and_stats(batch_id, total_transactions_count, None);
        for previous in previous_owners.iter().filter(|b| b.as_str() != batch_id) {
            debug!(batch_id = %previous, "Scheduling recomputation for previous owner");
            self.lifecycle
                .update_transaction_batch_status_and_stats(previous, None, None);
        }

        Ok(())
    }

    /// Straight overwrite. Callers only select transactions that have not
    /// passed dispatch approval, so no conflict detection happens here.
    async fn process_reprocessing(
        &self,
        batch_id: &str,
        incoming: OrganisationTransactions,
        flags: ProcessorFlags,
    ) -> SyncResult<()> {
        let saved = self
            .store_transactions(batch_id, incoming.transactions, flags)
            .await?;
        let ids: Vec<TransactionId> = saved.iter().map(|tx| tx.id.clone()).collect();
        self.associate(batch_id, &ids).await?;

        let batch_ids: BTreeSet<BatchId> = self
            .assocs
            .find_by_transaction_ids(&ids)
            .await?
            .into_iter()
            .map(|assoc| assoc.batch_id)
            .collect();

        info!(
            batch_id,
            tx_count = saved.len(),
            affected_batches = batch_ids.len(),
            "Reprocessed transactions stored"
        );
        TRANSACTIONS_SYNCED
            .with_label_values(&["reprocessed"])
            .inc_by(saved.len() as f64);

        for affected in &batch_ids {
            self.lifecycle
                .update_transaction_batch_status_and_stats(affected, None, Some(ids.clone()));
        }

        Ok(())
    }

    /// Clears the rejections the trigger's authority is correcting,
    /// refreshes derived state and saves. Returns what was saved.
    async fn store_transactions(
        &self,
        batch_id: &str,
        mut txs: Vec<Transaction>,
        flags: ProcessorFlags,
    ) -> SyncResult<Vec<Transaction>> {
        if txs.is_empty() {
            return Ok(txs);
        }
        info!(batch_id, tx_count = txs.len(), "Updating transaction batch");

        let cleared_source = match flags.trigger {
            Trigger::Import => Some(Source::Erp),
            Trigger::Reprocessing => Some(Source::Lob),
            Trigger::Reconciliation => None,
        };

        for tx in txs.iter_mut() {
            if let Some(source) = cleared_source {
                tx.clear_all_items_rejections_source(source);
            }
            tx.update_processing_status();
        }

        self.transactions.save_all(txs.clone()).await?;
        Ok(txs)
    }

    async fn associate(&self, batch_id: &str, tx_ids: &[TransactionId]) -> SyncResult<()> {
        for tx_id in tx_ids {
            self.assocs
                .find_or_create(BatchAssoc::new(batch_id, tx_id.as_str()))
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionSyncApi for TransactionSyncService {
    async fn execute(
        &self,
        batch_id: &str,
        incoming: OrganisationTransactions,
        total_transactions_count: Option<u64>,
        flags: ProcessorFlags,
    ) -> SyncResult<()> {
        if incoming.is_empty() {
            info!(batch_id, "No transactions to process");
            self.lifecycle
                .update_transaction_batch_status_and_stats(batch_id, total_transactions_count, None);
            return Ok(());
        }

        if flags.is_reprocessing() {
            return self.process_reprocessing(batch_id, incoming, flags).await;
        }

        self.process_transactions_for_the_first_time(batch_id, incoming, total_transactions_count, flags)
            .await
    }
}
