pub mod reconciliation;
pub mod reprocessing;

pub use reconciliation::{Reconciliation, ReconciliationStatus};
pub use reprocessing::{is_reprocessing_candidate, select_reprocessing_candidates};
