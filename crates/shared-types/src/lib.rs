//! # Shared Types Crate
//!
//! This crate contains the ledger entities exchanged between the ingestion,
//! synchronisation and batch lifecycle subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Derived State Is Derived**: processing status and automated validation
//!   status are recomputed from violations, rejections and approvals; callers
//!   never set them by hand.
//! - **Identity Is Immutable**: a transaction's `id` never changes once it has
//!   been extracted from the ERP.

pub mod batch;
pub mod entities;
pub mod errors;
pub mod flags;

pub use batch::*;
pub use entities::*;
pub use errors::*;
pub use flags::*;
