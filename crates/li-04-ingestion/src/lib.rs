//! # li-04-ingestion
//!
//! Entry point for extraction and reconciliation traffic.
//!
//! ```text
//! TransactionBatchStarted ──→ initiate_ingestion ──→ batch CREATED
//! TransactionBatchChunk   ──→ continue_ingestion ──→ rules ──→ transaction sync
//! ReconciliationChunk     ──→ continue_reconciliation ──→ rules ──→ matcher
//!                                   └──→ ReconciliationFinalisation ──→ finalise_reconciliation
//! TxsLedgerUpdated        ──→ TxStatusUpdaterJob ──(fixed delay)──→ batch fan-out
//! ```
//!
//! Failed batches can be reprocessed: only transactions that never passed
//! dispatch approval and are `PENDING` (or have no processing status) are
//! selected, because reprocessing overwrites without conflict detection.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod status_updater;

pub use adapters::{BasicRulesEngine, InMemoryReconciliationMatcher, NoopRulesEngine};
pub use domain::{
    is_reprocessing_candidate, select_reprocessing_candidates, Reconciliation,
    ReconciliationStatus,
};
pub use error::{IngestionError, IngestionResult};
pub use ports::{IngestionApi, ReconciliationMatcher, RulesEngine};
pub use service::{IngestionConfig, IngestionDependencies, IngestionService};
pub use status_updater::{StatusUpdaterConfig, TxStatusUpdaterJob};
