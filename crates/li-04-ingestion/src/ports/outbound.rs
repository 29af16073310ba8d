//! Driven Ports (SPI)

use crate::domain::Reconciliation;
use crate::error::IngestionResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{FatalError, OrganisationTransactions, ProcessorFlags, Transaction};

/// Business rules evaluation.
///
/// Mutates the transactions in place: attaches violations and item
/// rejections and refreshes the automated validation status. Stateless per
/// call, so re-running it on the same input is safe.
pub trait RulesEngine: Send + Sync {
    fn run(&self, transactions: &mut OrganisationTransactions, flags: ProcessorFlags);
}

/// Matches ERP transactions against the ledger-of-record.
#[async_trait]
pub trait ReconciliationMatcher: Send + Sync {
    /// Idempotent: an existing reconciliation is left untouched.
    async fn create_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> IngestionResult<()>;

    async fn reconcile_chunk(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        transactions: &[Transaction],
    ) -> IngestionResult<()>;

    /// Returns `true` once the reconciliation is completed.
    async fn wrap_up_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        total_prediction: u64,
    ) -> IngestionResult<bool>;

    async fn fail_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        error: FatalError,
    ) -> IngestionResult<()>;

    async fn find_reconciliation(
        &self,
        reconciliation_id: &str,
    ) -> IngestionResult<Option<Reconciliation>>;
}
