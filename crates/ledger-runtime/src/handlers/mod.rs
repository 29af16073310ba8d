//! # Event Handlers
//!
//! One handler per event class. Each owns a bus subscription and forwards
//! to the ingestion API; chunk events go through a [`PartitionedDispatcher`]
//! so that chunks of one batch (or reconciliation) are merged in order.
//!
//! [`PartitionedDispatcher`]: shared_bus::PartitionedDispatcher

pub mod chunks;
pub mod extraction;
pub mod ledger;
pub mod reconciliation;

pub use chunks::ChunkWorker;
pub use extraction::ExtractionHandler;
pub use ledger::LedgerUpdateHandler;
pub use reconciliation::ReconciliationHandler;

use ledger_telemetry::HANDLER_ERRORS;
use std::fmt::Display;
use tracing::error;

/// Logs a failed event and counts it against `handler`. The event is dropped.
pub(crate) fn report_failure(handler: &'static str, event: &str, err: impl Display) {
    HANDLER_ERRORS.with_label_values(&[handler]).inc();
    error!(handler, event, error = %err, "Event handling failed");
}
