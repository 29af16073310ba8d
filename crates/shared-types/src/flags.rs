//! Processor flags: why a set of transactions is being evaluated.

use serde::{Deserialize, Serialize};

/// The trigger for an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trigger {
    /// Fresh extraction from the ERP.
    #[default]
    Import,
    /// Re-evaluation of stored transactions after LOB-side fixes.
    Reprocessing,
    /// Comparison against the ledger of record.
    Reconciliation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ProcessorFlags {
    pub trigger: Trigger,
}

impl ProcessorFlags {
    pub fn new(trigger: Trigger) -> Self {
        Self { trigger }
    }

    pub fn import() -> Self {
        Self::new(Trigger::Import)
    }

    pub fn reprocessing() -> Self {
        Self::new(Trigger::Reprocessing)
    }

    pub fn is_reprocessing(&self) -> bool {
        self.trigger == Trigger::Reprocessing
    }
}
