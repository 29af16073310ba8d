//! Batch Status Calculator
//!
//! Checks are evaluated in a fixed order; the first match wins:
//!
//! ```text
//! dispatched == validated  → FINISHED
//! completed  == validated  → COMPLETE
//! finalized  == validated  → FINALIZED
//! otherwise                → PROCESSING
//! ```
//!
//! An empty batch (all counts zero) is therefore FINISHED.

use crate::domain::BatchStatisticsView;
use shared_types::TransactionBatchStatus;

pub fn calculate_batch_status(view: &BatchStatisticsView) -> TransactionBatchStatus {
    let validated = view.validated;

    if view.dispatched == validated {
        TransactionBatchStatus::Finished
    } else if view.completed == validated {
        TransactionBatchStatus::Complete
    } else if view.finalized == validated {
        TransactionBatchStatus::Finalized
    } else {
        TransactionBatchStatus::Processing
    }
}
