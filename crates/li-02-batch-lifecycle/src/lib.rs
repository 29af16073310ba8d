//! # li-02-batch-lifecycle
//!
//! Batch creation, failure and status/statistics recomputation.
//!
//! ## Status state machine
//!
//! ```text
//! CREATED ──recompute──→ PROCESSING ──→ COMPLETE / FINALIZED / FINISHED
//!    │
//!    └──upstream extraction error──→ FAILED
//! ```
//!
//! Statistics are recomputed from storage, never incremented in place, and
//! recomputation is debounced per batch: a burst of triggers for one batch
//! runs once, after the window, with the last trigger's parameters.
//!
//! ## Example
//!
//! ```rust,ignore
//! let service = BatchLifecycleService::new(BatchConfig::default(), store.clone(), store.clone(), store, bus);
//! service.create_transaction_batch("b1", "org-1", &params, "user").await?;
//! service.update_transaction_batch_status_and_stats("b1", Some(120), None);
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{calculate_batch_status, BatchStatisticsView, DebounceCoordinator};
pub use error::{LifecycleError, LifecycleResult};
pub use ports::BatchLifecycleApi;
pub use service::{BatchConfig, BatchLifecycleService};
