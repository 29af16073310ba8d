//! Ingestion Service
//!
//! Drives a chunk through the business rules and into the transaction sync,
//! matches reconciliation chunks, and schedules reprocessing of failed
//! batches.

use crate::domain::select_reprocessing_candidates;
use crate::error::{IngestionError, IngestionResult};
use crate::ports::{IngestionApi, ReconciliationMatcher, RulesEngine};
use async_trait::async_trait;
use chrono::NaiveDate;
use ledger_telemetry::HANDLER_ERRORS;
use li_01_ledger_storage::{BatchAssocRepository, TransactionRepository};
use li_02_batch_lifecycle::{BatchLifecycleApi, DebounceCoordinator};
use li_03_transaction_sync::TransactionSyncApi;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{
    ExtractionParameters, FatalError, OrganisationTransactions, ProcessorFlags, Transaction,
    TransactionId, Trigger,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone, Debug, Default)]
pub struct IngestionConfig {
    /// Delay before a scheduled reprocessing runs. Zero runs it on the next
    /// scheduler turn, still off the caller's task.
    pub reprocess_debounce: Duration,
}

/// Collaborators of the ingestion service.
pub struct IngestionDependencies {
    pub rules: Arc<dyn RulesEngine>,
    pub sync: Arc<dyn TransactionSyncApi>,
    pub lifecycle: Arc<dyn BatchLifecycleApi>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub assocs: Arc<dyn BatchAssocRepository>,
    pub matcher: Arc<dyn ReconciliationMatcher>,
    pub publisher: Arc<dyn EventPublisher>,
}

/// Rules evaluation followed by the merge.
#[derive(Clone)]
struct IngestionPipeline {
    rules: Arc<dyn RulesEngine>,
    sync: Arc<dyn TransactionSyncApi>,
}

impl IngestionPipeline {
    async fn run(
        &self,
        organisation_id: &str,
        batch_id: &str,
        total_transactions_count: Option<u64>,
        transactions: Vec<Transaction>,
        flags: ProcessorFlags,
    ) -> IngestionResult<()> {
        info!(
            batch_id,
            tx_count = transactions.len(),
            trigger = ?flags.trigger,
            "Processing transaction batch chunk"
        );

        let mut organisation_transactions = OrganisationTransactions::new(organisation_id, transactions);
        self.rules.run(&mut organisation_transactions, flags);

        self.sync
            .execute(batch_id, organisation_transactions, total_transactions_count, flags)
            .await?;
        Ok(())
    }
}

/// Reprocessing of a batch's failed transactions. Cloned into the scheduled task.
#[derive(Clone)]
struct Reingestion {
    pipeline: IngestionPipeline,
    lifecycle: Arc<dyn BatchLifecycleApi>,
    transactions: Arc<dyn TransactionRepository>,
    assocs: Arc<dyn BatchAssocRepository>,
}

impl Reingestion {
    async fn run(&self, batch_id: &str) -> IngestionResult<usize> {
        let batch = self
            .lifecycle
            .find_by_id(batch_id)
            .await?
            .ok_or_else(|| IngestionError::BatchNotFound {
                batch_id: batch_id.to_string(),
            })?;

        let member_ids: Vec<TransactionId> = self
            .assocs
            .find_by_batch_id(batch_id)
            .await?
            .into_iter()
            .map(|assoc| assoc.transaction_id)
            .collect();
        let members = self.transactions.find_all_by_ids(&member_ids).await?;

        let candidates = select_reprocessing_candidates(members);
        if candidates.is_empty() {
            info!(batch_id, "No transactions eligible for reprocessing");
            return Ok(0);
        }

        let count = candidates.len();
        info!(batch_id, tx_count = count, "Reprocessing failed transactions");
        self.pipeline
            .run(
                &batch.organisation_id,
                batch_id,
                Some(count as u64),
                candidates,
                ProcessorFlags::reprocessing(),
            )
            .await?;
        Ok(count)
    }
}

pub struct IngestionService {
    config: IngestionConfig,
    pipeline: IngestionPipeline,
    reingestion: Reingestion,
    lifecycle: Arc<dyn BatchLifecycleApi>,
    matcher: Arc<dyn ReconciliationMatcher>,
    publisher: Arc<dyn EventPublisher>,
    debouncer: DebounceCoordinator,
}

impl IngestionService {
    pub fn new(config: IngestionConfig, deps: IngestionDependencies) -> Self {
        let pipeline = IngestionPipeline {
            rules: deps.rules,
            sync: deps.sync,
        };
        let reingestion = Reingestion {
            pipeline: pipeline.clone(),
            lifecycle: deps.lifecycle.clone(),
            transactions: deps.transactions,
            assocs: deps.assocs,
        };

        Self {
            config,
            pipeline,
            reingestion,
            lifecycle: deps.lifecycle,
            matcher: deps.matcher,
            publisher: deps.publisher,
            debouncer: DebounceCoordinator::new(),
        }
    }

    /// Reprocesses the failed transactions of a batch now.
    ///
    /// Returns how many transactions were selected.
    pub async fn process_reingestion_for_failed(&self, batch_id: &str) -> IngestionResult<usize> {
        self.reingestion.run(batch_id).await
    }

    pub fn pending_reingestions(&self) -> usize {
        self.debouncer.pending_count()
    }

    pub fn shutdown(&self) {
        self.debouncer.shutdown();
    }
}

#[async_trait]
impl IngestionApi for IngestionService {
    async fn initiate_ingestion(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
    ) -> IngestionResult<()> {
        self.lifecycle
            .create_transaction_batch(batch_id, organisation_id, extraction_parameters, user_id)
            .await?;
        Ok(())
    }

    async fn continue_ingestion(
        &self,
        organisation_id: &str,
        batch_id: &str,
        total_transactions_count: Option<u64>,
        transactions: Vec<Transaction>,
        flags: ProcessorFlags,
    ) -> IngestionResult<()> {
        self.pipeline
            .run(organisation_id, batch_id, total_transactions_count, transactions, flags)
            .await
    }

    async fn fail_ingestion(
        &self,
        batch_id: &str,
        organisation_id: &str,
        extraction_parameters: &ExtractionParameters,
        user_id: &str,
        error: FatalError,
    ) -> IngestionResult<()> {
        self.lifecycle
            .fail_transaction_batch(batch_id, organisation_id, extraction_parameters, user_id, error)
            .await?;
        Ok(())
    }

    async fn initiate_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> IngestionResult<()> {
        self.matcher
            .create_reconciliation(reconciliation_id, organisation_id, from, to)
            .await
    }

    async fn continue_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        total_transactions_count: u64,
        transactions: Vec<Transaction>,
    ) -> IngestionResult<()> {
        info!(
            reconciliation_id,
            tx_count = transactions.len(),
            "Processing reconciliation chunk"
        );

        let mut organisation_transactions = OrganisationTransactions::new(organisation_id, transactions);
        self.pipeline
            .rules
            .run(&mut organisation_transactions, ProcessorFlags::new(Trigger::Reconciliation));

        self.matcher
            .reconcile_chunk(
                reconciliation_id,
                organisation_id,
                from,
                to,
                &organisation_transactions.transactions,
            )
            .await?;

        self.publisher
            .publish(LedgerEvent::ReconciliationFinalisation {
                reconciliation_id: reconciliation_id.to_string(),
                organisation_id: organisation_id.to_string(),
                total_prediction: total_transactions_count,
            })
            .await;
        Ok(())
    }

    async fn finalise_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        total_prediction: u64,
    ) -> IngestionResult<bool> {
        self.matcher
            .wrap_up_reconciliation(reconciliation_id, organisation_id, total_prediction)
            .await
    }

    async fn fail_reconciliation(
        &self,
        reconciliation_id: &str,
        organisation_id: &str,
        error: FatalError,
    ) -> IngestionResult<()> {
        self.matcher
            .fail_reconciliation(reconciliation_id, organisation_id, None, None, error)
            .await
    }

    async fn schedule_reingestion_for_failed(&self, batch_id: &str) -> IngestionResult<()> {
        info!(batch_id, "Scheduling reprocessing of failed transactions");

        if self.lifecycle.find_by_id(batch_id).await?.is_none() {
            return Err(IngestionError::BatchNotFound {
                batch_id: batch_id.to_string(),
            });
        }

        let reingestion = self.reingestion.clone();
        let id = batch_id.to_string();
        self.debouncer.trigger(
            format!("{batch_id}reprocess"),
            self.config.reprocess_debounce,
            async move {
                if let Err(e) = reingestion.run(&id).await {
                    HANDLER_ERRORS.with_label_values(&["reprocess"]).inc();
                    error!(batch_id = %id, error = %e, "Reprocessing failed transactions failed");
                }
            },
        );
        Ok(())
    }
}
