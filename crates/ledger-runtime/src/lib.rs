//! # Ledger Runtime
//!
//! Wires the ingestion subsystems to the shared bus.
//!
//! ```text
//! ERP adapter ──→ [Extraction]     ──→ ExtractionHandler     ──→ IngestionService
//!             ──→ [Reconciliation] ──→ ReconciliationHandler ──→ IngestionService
//! Ledger      ──→ [Ledger]         ──→ LedgerUpdateHandler   ──→ TxStatusUpdaterJob
//! ```
//!
//! Exposed as a library so the wiring can be exercised from tests.

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use container::{RuntimeConfig, SubsystemContainer};
pub use runtime::LedgerRuntime;
