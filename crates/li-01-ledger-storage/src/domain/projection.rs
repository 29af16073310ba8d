//! Aggregate counts over the transactions owned by one batch.
//!
//! This is what a relational backend would compute with a single
//! `GROUP BY`-style query; the in-memory adapter folds over the rows.

use shared_types::{
    AutomatedValidationStatus, LedgerDispatchStatus, Transaction, TransactionProcessingStatus,
};

/// Raw counts read from storage for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStatisticsProjection {
    pub total: u64,
    pub invalid: u64,
    pub pending: u64,
    pub ready_to_approve: u64,
    pub approved: u64,
    pub published: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub finalized: u64,
    pub validated: u64,
    pub failed: u64,
}

impl BatchStatisticsProjection {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        transactions
            .into_iter()
            .fold(Self::default(), |mut acc, tx| {
                acc.add(tx);
                acc
            })
    }

    fn add(&mut self, tx: &Transaction) {
        self.total += 1;

        match tx.processing_status {
            Some(TransactionProcessingStatus::Invalid) => self.invalid += 1,
            Some(TransactionProcessingStatus::Pending) => self.pending += 1,
            Some(TransactionProcessingStatus::Approve) => self.ready_to_approve += 1,
            Some(TransactionProcessingStatus::Publish | TransactionProcessingStatus::Published) => {
                self.published += 1
            }
            Some(TransactionProcessingStatus::Dispatched) | None => {}
        }

        if tx.all_approvals_passed_for_dispatch() {
            self.approved += 1;
        }

        match tx.ledger_dispatch_status {
            LedgerDispatchStatus::Dispatched => self.dispatched += 1,
            LedgerDispatchStatus::Completed => self.completed += 1,
            LedgerDispatchStatus::Finalized => self.finalized += 1,
            _ => {}
        }

        match tx.automated_validation_status {
            AutomatedValidationStatus::Validated => self.validated += 1,
            AutomatedValidationStatus::Failed => self.failed += 1,
        }
    }
}
