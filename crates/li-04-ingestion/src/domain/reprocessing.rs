//! Failed-batch reprocessing selection.
//!
//! Reprocessing overwrites without version-conflict detection, so only
//! transactions that never passed dispatch approval may be selected.

use shared_types::{Transaction, TransactionProcessingStatus};

/// Not dispatch-approved, and either `PENDING` or never given a processing status.
pub fn is_reprocessing_candidate(tx: &Transaction) -> bool {
    if tx.all_approvals_passed_for_dispatch() {
        return false;
    }
    matches!(
        tx.processing_status,
        None | Some(TransactionProcessingStatus::Pending)
    )
}

pub fn select_reprocessing_candidates(txs: Vec<Transaction>) -> Vec<Transaction> {
    txs.into_iter().filter(is_reprocessing_candidate).collect()
}
