//! Driving Ports (API - Inbound)

use crate::error::IngestionResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{ExtractionParameters, FatalError, ProcessorFlags, Transaction};

/// Primary Ingestion API, driven by extraction and reconciliation events.
#[async_trait]
pub trait IngestionApi: Send + Sync {
    /// Creates the batch for a started extraction.
    async fn initiate_ingestion(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
    ) -> IngestionResult<()>;

    /// Runs the business rules over one chunk, then merges it.
    async fn continue_ingestion(
        &self,
        organisation_id: &str,
        batch_id: &str,
        total_transactions_count: Option<u64>,
        transactions: Vec<Transaction>,
        flags: ProcessorFlags,
    ) -> IngestionResult<()>;

    async fn fail_ingestion(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
        error: FatalError,
    ) -> IngestionResult<()>;

    async fn initiate_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> IngestionResult<()>;

    /// Runs the business rules with the `RECONCILIATION` trigger, matches the
    /// chunk and publishes a finalisation candidate carrying `total_transactions_count`.
    async fn continue_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        total_transactions_count: u64,
        transactions: Vec<Transaction>,
    ) -> IngestionResult<()>;

    /// Returns `true` once the reconciliation is completed.
    async fn finalise_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        total_prediction: u64,
    ) -> IngestionResult<bool>;

    async fn fail_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        error: FatalError,
    ) -> IngestionResult<()>;

    /// Schedules reprocessing of a batch's failed transactions and returns
    /// immediately. Fails with `BatchNotFound` for an unknown batch.
    async fn schedule_reingestion_for_failed(&self, batch_id: &str) -> IngestionResult<()>;
}
