//! # li-01-ledger-storage
//!
//! Persistence ports for the ingestion pipeline and an in-memory adapter.
//!
//! ## Repositories
//!
//! | Port | Entity |
//! |------|--------|
//! | `TransactionRepository` | `Transaction` |
//! | `BatchRepository` | `TransactionBatch` + statistics projection |
//! | `BatchAssocRepository` | `BatchAssoc` (batch, transaction) |
//!
//! Batch statistics are a projection over transactions, never the source of
//! truth: `BatchRepository::statistics_projection` recounts them on demand.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

pub use adapters::InMemoryLedgerStore;
pub use domain::BatchStatisticsProjection;
pub use error::{StorageError, StorageResult};
pub use ports::{BatchAssocRepository, BatchRepository, TransactionRepository};
