//! Port definitions (Hexagonal Architecture)
//!
//! Outbound dependencies are the storage repositories of
//! `li-01-ledger-storage` and the shared bus `EventPublisher`.

pub mod inbound;

pub use inbound::BatchLifecycleApi;
