//! # Ledger Events
//!
//! Defines all event types that flow through the shared bus.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{
    BatchId, ExtractionParameters, FatalError, OrganisationId, Transaction, TxStatusUpdate,
};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // EXTRACTION (ERP adapter -> ingestion)
    // =========================================================================
    /// A user requested an extraction. Triggers batch creation.
    TransactionBatchStarted {
        batch_id: BatchId,
        organisation_id: OrganisationId,
        user_id: String,
        extraction_parameters: ExtractionParameters,
    },

    /// A batch was persisted for the first time.
    /// Source: ingestion | Target: ERP adapter
    TransactionBatchCreated {
        batch_id: BatchId,
        organisation_id: OrganisationId,
        extraction_parameters: ExtractionParameters,
    },

    /// One chunk of an extraction. Must be consumed in publication order per batch.
    TransactionBatchChunk {
        batch_id: BatchId,
        organisation_id: OrganisationId,
        /// Total number of transactions the adapter expects to deliver.
        total_transactions_count: Option<u64>,
        transactions: Vec<Transaction>,
    },

    /// The ERP adapter gave up on an extraction.
    TransactionBatchFailed {
        batch_id: BatchId,
        organisation_id: OrganisationId,
        user_id: String,
        extraction_parameters: ExtractionParameters,
        error: FatalError,
    },

    // =========================================================================
    // RECONCILIATION
    // =========================================================================
    ReconciliationStarted {
        reconciliation_id: String,
        organisation_id: OrganisationId,
        from: NaiveDate,
        to: NaiveDate,
    },

    /// One chunk of a reconciliation. Must be consumed in publication order per reconciliation.
    ReconciliationChunk {
        reconciliation_id: String,
        organisation_id: OrganisationId,
        from: NaiveDate,
        to: NaiveDate,
        total_transactions_count: u64,
        transactions: Vec<Transaction>,
    },

    /// A finalisation candidate. Harmless if the reconciliation has not seen
    /// every transaction yet.
    ReconciliationFinalisation {
        reconciliation_id: String,
        organisation_id: OrganisationId,
        total_prediction: u64,
    },

    ReconciliationFailed {
        reconciliation_id: String,
        organisation_id: OrganisationId,
        error: FatalError,
    },

    // =========================================================================
    // LEDGER FOLLOWER
    // =========================================================================
    /// Ledger dispatch status changes for a set of transactions.
    TxsLedgerUpdated {
        organisation_id: OrganisationId,
        statuses: Vec<TxStatusUpdate>,
    },
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TransactionBatchStarted { .. }
            | Self::TransactionBatchCreated { .. }
            | Self::TransactionBatchChunk { .. }
            | Self::TransactionBatchFailed { .. } => EventTopic::Extraction,
            Self::ReconciliationStarted { .. }
            | Self::ReconciliationChunk { .. }
            | Self::ReconciliationFinalisation { .. }
            | Self::ReconciliationFailed { .. } => EventTopic::Reconciliation,
            Self::TxsLedgerUpdated { .. } => EventTopic::Ledger,
        }
    }

    /// Name of the component that emits this event.
    #[must_use]
    pub fn source(&self) -> &'static str {
        match self {
            Self::TransactionBatchCreated { .. } | Self::ReconciliationFinalisation { .. } => {
                "ingestion"
            }
            Self::TxsLedgerUpdated { .. } => "ledger-follower",
            _ => "erp-adapter",
        }
    }

    /// Key that chunk events, and the failure of their run, are serialised on.
    #[must_use]
    pub fn partition_key(&self) -> Option<&str> {
        match self {
            Self::TransactionBatchChunk { batch_id, .. }
            | Self::TransactionBatchFailed { batch_id, .. } => Some(batch_id),
            Self::ReconciliationChunk {
                reconciliation_id, ..
            }
            | Self::ReconciliationFailed {
                reconciliation_id, ..
            } => Some(reconciliation_id),
            _ => None,
        }
    }

    /// Organisation the event belongs to.
    #[must_use]
    pub fn organisation_id(&self) -> &str {
        match self {
            Self::TransactionBatchStarted {
                organisation_id, ..
            }
            | Self::TransactionBatchCreated {
                organisation_id, ..
            }
            | Self::TransactionBatchChunk {
                organisation_id, ..
            }
            | Self::TransactionBatchFailed {
                organisation_id, ..
            }
            | Self::ReconciliationStarted {
                organisation_id, ..
            }
            | Self::ReconciliationChunk {
                organisation_id, ..
            }
            | Self::ReconciliationFinalisation {
                organisation_id, ..
            }
            | Self::ReconciliationFailed {
                organisation_id, ..
            }
            | Self::TxsLedgerUpdated {
                organisation_id, ..
            } => organisation_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Batch extraction events.
    Extraction,
    /// Reconciliation events.
    Reconciliation,
    /// Ledger follower events.
    Ledger,
    /// All events (no filtering).
    All,
}

impl EventTopic {
    /// Lowercase name, used as a metric label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Reconciliation => "reconciliation",
            Self::Ledger => "ledger",
            Self::All => "all",
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Organisations to include. Empty means all organisations.
    pub organisations: Vec<OrganisationId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            organisations: Vec::new(),
        }
    }

    /// Create a filter for events of specific organisations.
    #[must_use]
    pub fn for_organisations(organisations: Vec<OrganisationId>) -> Self {
        Self {
            topics: Vec::new(),
            organisations,
        }
    }

    /// Topics joined with `+`, or `all` when unrestricted.
    #[must_use]
    pub fn label(&self) -> String {
        if self.topics.is_empty() {
            return EventTopic::All.as_str().to_string();
        }
        self.topics
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let organisation_match = self.organisations.is_empty()
            || self
                .organisations
                .iter()
                .any(|o| o == event.organisation_id());

        topic_match && organisation_match
    }
}
