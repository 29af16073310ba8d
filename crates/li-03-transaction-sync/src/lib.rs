//! # li-03-transaction-sync
//!
//! Merges chunks of ERP transactions into the persisted ledger.
//!
//! Each incoming transaction is compared with its stored counterpart by a
//! version fingerprint over the ERP-origin fields:
//!
//! - new or changed and not yet dispatch-approved: the incoming content wins
//! - changed after dispatch approval: stored data is kept and a
//!   `TX_VERSION_CONFLICT_TX_NOT_MODIFIABLE` warning is attached
//! - unchanged after dispatch approval: a stale conflict warning is retracted
//!
//! `REPROCESSING` chunks skip the comparison and overwrite.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::Sha256Fingerprinter;
pub use domain::{classify, version_conflict_violation, SyncOutcome};
pub use error::{SyncError, SyncResult};
pub use ports::{TransactionSyncApi, VersionFingerprinter};
pub use service::TransactionSyncService;
