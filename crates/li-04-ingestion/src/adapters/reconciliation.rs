//! In-memory reconciliation matcher.
//!
//! A transaction reconciles when the stored copy has the same ERP content
//! (source side) and is already on the ledger (sink side).

use crate::domain::{Reconciliation, ReconciliationStatus};
use crate::error::{IngestionError, IngestionResult};
use crate::ports::ReconciliationMatcher;
use async_trait::async_trait;
use chrono::NaiveDate;
use li_01_ledger_storage::TransactionRepository;
use li_03_transaction_sync::VersionFingerprinter;
use parking_lot::RwLock;
use shared_types::{
    FatalError, ReconciliationCode, ReconciliationResult, Transaction, TransactionId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct InMemoryReconciliationMatcher {
    transactions: Arc<dyn TransactionRepository>,
    fingerprinter: Arc<dyn VersionFingerprinter>,
    reconciliations: RwLock<HashMap<String, Reconciliation>>,
}

impl InMemoryReconciliationMatcher {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        fingerprinter: Arc<dyn VersionFingerprinter>,
    ) -> Self {
        Self {
            transactions,
            fingerprinter,
            reconciliations: RwLock::new(HashMap::new()),
        }
    }

    fn code(ok: bool) -> ReconciliationCode {
        if ok {
            ReconciliationCode::Ok
        } else {
            ReconciliationCode::Nok
        }
    }

    /// (source, sink) outcome for one incoming transaction.
    fn match_one(
        &self,
        stored: Option<&Transaction>,
        incoming: &Transaction,
    ) -> (ReconciliationCode, ReconciliationCode) {
        match stored {
            None => (ReconciliationCode::Nok, ReconciliationCode::Nok),
            Some(stored) => {
                let same_content =
                    self.fingerprinter.compute(stored) == self.fingerprinter.compute(incoming);
                (
                    Self::code(same_content),
                    Self::code(stored.ledger_dispatch_status.is_on_ledger()),
                )
            }
        }
    }

    fn not_found(reconciliation_id: &str) -> IngestionError {
        IngestionError::ReconciliationNotFound {
            reconciliation_id: reconciliation_id.to_string(),
        }
    }
}

#[async_trait]
impl ReconciliationMatcher for InMemoryReconciliationMatcher {
    async fn create_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> IngestionResult<()> {
        let mut reconciliations = self.reconciliations.write();
        if reconciliations.contains_key(reconciliation_id) {
            warn!(reconciliation_id, "Reconciliation already exists, skipping creation");
            return Ok(());
        }
        reconciliations.insert(
            reconciliation_id.to_string(),
            Reconciliation::new(reconciliation_id, organisation_id, Some(from), Some(to)),
        );
        info!(reconciliation_id, organisation_id, %from, %to, "Reconciliation created");
        Ok(())
    }

    async fn reconcile_chunk(
        &self,
        reconciliation_id: &str,
        _organisation_id: &str,
        _from: NaiveDate,
        _to: NaiveDate,
        transactions: &[Transaction],
    ) -> IngestionResult<()> {
        if !self.reconciliations.read().contains_key(reconciliation_id) {
            return Err(Self::not_found(reconciliation_id));
        }

        let ids: Vec<TransactionId> = transactions.iter().map(|tx| tx.id.clone()).collect();
        let mut stored: HashMap<TransactionId, Transaction> = self
            .transactions
            .find_all_by_ids(&ids)
            .await?
            .into_iter()
            .map(|tx| (tx.id.clone(), tx))
            .collect();

        let mut outcomes = Vec::with_capacity(transactions.len());
        let mut to_save = Vec::new();
        for incoming in transactions {
            let (source, sink) = self.match_one(stored.get(&incoming.id), incoming);
            let reconciled = source == ReconciliationCode::Ok && sink == ReconciliationCode::Ok;
            outcomes.push((incoming.id.clone(), Self::code(reconciled)));

            if let Some(mut tx) = stored.remove(&incoming.id) {
                tx.reconciliation = Some(ReconciliationResult {
                    reconciliation_id: reconciliation_id.to_string(),
                    source: Some(source),
                    sink: Some(sink),
                });
                to_save.push(tx);
            }
        }

        if !to_save.is_empty() {
            self.transactions.save_all(to_save).await?;
        }

        let mut reconciliations = self.reconciliations.write();
        let reconciliation = reconciliations
            .get_mut(reconciliation_id)
            .ok_or_else(|| Self::not_found(reconciliation_id))?;
        for (tx_id, code) in outcomes {
            reconciliation.record(tx_id, code);
        }
        info!(
            reconciliation_id,
            processed = reconciliation.processed_count(),
            "Reconciliation chunk matched"
        );
        Ok(())
    }

    async fn wrap_up_reconciliation(
        &self,
        reconciliation_id: &str,
        _organisation_id: &str,
        total_prediction: u64,
    ) -> IngestionResult<bool> {
        let mut reconciliations = self.reconciliations.write();
        let reconciliation = reconciliations
            .get_mut(reconciliation_id)
            .ok_or_else(|| Self::not_found(reconciliation_id))?;

        let was_completed = reconciliation.status == ReconciliationStatus::Completed;
        let completed = reconciliation.try_complete(total_prediction);
        if completed && !was_completed {
            info!(
                reconciliation_id,
                ok = reconciliation.count(ReconciliationCode::Ok),
                nok = reconciliation.count(ReconciliationCode::Nok),
                "Reconciliation completed"
            );
        }
        Ok(completed)
    }

    async fn fail_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        error: FatalError,
    ) -> IngestionResult<()> {
        warn!(reconciliation_id, error = %error, "Reconciliation failed");
        self.reconciliations
            .write()
            .entry(reconciliation_id.to_string())
            .or_insert_with(|| Reconciliation::new(reconciliation_id, organisation_id, from, to))
            .fail(error);
        Ok(())
    }

    async fn find_reconciliation(
        &self,
        reconciliation_id: &str,
    ) -> IngestionResult<Option<Reconciliation>> {
        Ok(self.reconciliations.read().get(reconciliation_id).cloned())
    }
}
