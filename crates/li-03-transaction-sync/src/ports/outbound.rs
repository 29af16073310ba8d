//! Driven Ports (SPI)

use shared_types::Transaction;

/// Deterministic digest of the ERP-origin content of a transaction.
///
/// Two transactions with equal fingerprints carry the same ERP data; fields
/// owned by this system (approvals, violations, dispatch state) are ignored.
pub trait VersionFingerprinter: Send + Sync {
    fn compute(&self, tx: &Transaction) -> String;
}
