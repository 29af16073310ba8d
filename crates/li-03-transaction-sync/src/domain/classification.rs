//! Per-transaction merge decision.
//!
//! | dispatch-approved | changed | outcome |
//! |---|---|---|
//! | yes | yes | `Conflict`: keep stored data, flag it |
//! | yes | no  | `Unchanged`: retract a stale conflict flag if present |
//! | no  | yes | `Apply`: incoming content wins |
//! | no  | no  | `Skip` |
//!
//! "Changed" is true when nothing is stored yet or the fingerprints differ.

use crate::ports::VersionFingerprinter;
use shared_types::{Severity, Source, Transaction, TransactionViolation, ViolationCode};

/// Processor module recorded on the violations raised during sync.
pub const SYNC_PROCESSOR_MODULE: &str = "TransactionSyncService";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Conflict,
    Unchanged,
    Apply,
    Skip,
}

pub fn classify(
    persisted: Option<&Transaction>,
    incoming: &Transaction,
    fingerprinter: &dyn VersionFingerprinter,
) -> SyncOutcome {
    let dispatch_marked = persisted.is_some_and(Transaction::all_approvals_passed_for_dispatch);
    let changed = match persisted {
        None => true,
        Some(stored) => fingerprinter.compute(stored) != fingerprinter.compute(incoming),
    };

    match (dispatch_marked, changed) {
        (true, true) => SyncOutcome::Conflict,
        (true, false) => SyncOutcome::Unchanged,
        (false, true) => SyncOutcome::Apply,
        (false, false) => SyncOutcome::Skip,
    }
}

pub fn version_conflict_violation(internal_number: &str) -> TransactionViolation {
    TransactionViolation::new(
        ViolationCode::TxVersionConflictTxNotModifiable,
        Severity::Warn,
        Source::Erp,
        SYNC_PROCESSOR_MODULE,
    )
    .with_bag_entry("transactionNumber", internal_number)
}
