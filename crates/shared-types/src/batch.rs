//! Batch entities: the grouping unit of one extraction request.

use crate::entities::{BatchId, OrganisationId, TransactionId, TransactionType};
use crate::errors::FatalError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a transaction batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionBatchStatus {
    #[default]
    Created,
    Processing,
    Complete,
    Finished,
    Finalized,
    Failed,
}

impl TransactionBatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionBatchStatus::Created => "CREATED",
            TransactionBatchStatus::Processing => "PROCESSING",
            TransactionBatchStatus::Complete => "COMPLETE",
            TransactionBatchStatus::Finished => "FINISHED",
            TransactionBatchStatus::Finalized => "FINALIZED",
            TransactionBatchStatus::Failed => "FAILED",
        }
    }
}

/// Persisted per-batch counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BatchStatistics {
    pub total: u64,
    pub processed: u64,
    pub approved: u64,
    pub published: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub finalized: u64,
    pub failed: u64,
    pub invalid: u64,
    pub pending: u64,
    pub ready_to_approve: u64,
}

/// What the user asked the ERP adapter to extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractionParameters {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub transaction_types: Vec<TransactionType>,
    pub transaction_numbers: Vec<String>,
}

/// Extraction parameters bound to an organisation, as stored on the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteringParameters {
    pub organisation_id: OrganisationId,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub transaction_types: Vec<TransactionType>,
    pub transaction_numbers: Vec<String>,
}

impl FilteringParameters {
    pub fn from_extraction(
        organisation_id: impl Into<OrganisationId>,
        params: &ExtractionParameters,
    ) -> Self {
        Self {
            organisation_id: organisation_id.into(),
            from: params.from,
            to: params.to,
            transaction_types: params.transaction_types.clone(),
            transaction_numbers: params.transaction_numbers.clone(),
        }
    }
}

/// A transaction batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBatch {
    pub id: BatchId,
    pub organisation_id: OrganisationId,
    pub status: TransactionBatchStatus,
    pub statistics: BatchStatistics,
    pub filtering_parameters: FilteringParameters,
    /// Set when the batch failed.
    pub details: Option<FatalError>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionBatch {
    pub fn new(
        id: impl Into<BatchId>,
        organisation_id: impl Into<OrganisationId>,
        params: &ExtractionParameters,
        created_by: impl Into<String>,
    ) -> Self {
        let organisation_id = organisation_id.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            filtering_parameters: FilteringParameters::from_extraction(
                organisation_id.clone(),
                params,
            ),
            organisation_id,
            status: TransactionBatchStatus::Created,
            statistics: BatchStatistics::default(),
            details: None,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status == TransactionBatchStatus::Finalized
    }

    /// Marks the batch failed with the given details.
    pub fn fail(&mut self, details: FatalError) {
        self.status = TransactionBatchStatus::Failed;
        self.details = Some(details);
        self.updated_at = Utc::now();
    }
}

/// Association row linking a batch to a transaction it touched.
///
/// A transaction may be associated with several batches over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchAssoc {
    pub batch_id: BatchId,
    pub transaction_id: TransactionId,
}

impl BatchAssoc {
    pub fn new(batch_id: impl Into<BatchId>, transaction_id: impl Into<TransactionId>) -> Self {
        Self {
            batch_id: batch_id.into(),
            transaction_id: transaction_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FatalErrorCode;

    #[test]
    fn test_new_batch_is_created_with_empty_statistics() {
        let params = ExtractionParameters {
            transaction_types: vec![TransactionType::Journal],
            ..Default::default()
        };
        let batch = TransactionBatch::new("b1", "org-1", &params, "system");

        assert_eq!(batch.status, TransactionBatchStatus::Created);
        assert_eq!(batch.statistics, BatchStatistics::default());
        assert_eq!(batch.filtering_parameters.organisation_id, "org-1");
        assert_eq!(
            batch.filtering_parameters.transaction_types,
            vec![TransactionType::Journal]
        );
    }

    #[test]
    fn test_fail_sets_status_and_details() {
        let mut batch = TransactionBatch::new("b1", "org-1", &ExtractionParameters::default(), "u");
        batch.fail(FatalError::new(FatalErrorCode::AdapterError, "ORGANISATION_NOT_FOUND"));

        assert_eq!(batch.status, TransactionBatchStatus::Failed);
        assert_eq!(
            batch.details.as_ref().map(|d| d.sub_code.as_str()),
            Some("ORGANISATION_NOT_FOUND")
        );
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&TransactionBatchStatus::Finalized).unwrap();
        assert_eq!(json, "\"FINALIZED\"");
    }
}
