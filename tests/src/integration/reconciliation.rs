//! # Reconciliation Flow
//!
//! ```text
//! ReconciliationStarted ──→ reconciliation CREATED
//! ReconciliationChunk   ──→ rules ──→ matcher ──→ ReconciliationFinalisation
//!                                                        └──→ COMPLETED once every transaction is seen
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{batch_id, date, fast_config, settle, stored, tx, ORG};
    use li_04_ingestion::{IngestionApi, ReconciliationMatcher, ReconciliationStatus};
    use ledger_runtime::LedgerRuntime;
    use li_01_ledger_storage::TransactionRepository;
    use rust_decimal_macros::dec;
    use shared_bus::{EventPublisher, LedgerEvent};
    use shared_types::{
        ExtractionParameters, FatalError, FatalErrorCode, LedgerDispatchStatus, ProcessorFlags,
        ReconciliationCode, Transaction,
    };

    fn started(id: &str) -> LedgerEvent {
        LedgerEvent::ReconciliationStarted {
            reconciliation_id: id.to_string(),
            organisation_id: ORG.to_string(),
            from: date(1),
            to: date(30),
        }
    }

    fn chunk(id: &str, total: u64, transactions: Vec<Transaction>) -> LedgerEvent {
        LedgerEvent::ReconciliationChunk {
            reconciliation_id: id.to_string(),
            organisation_id: ORG.to_string(),
            from: date(1),
            to: date(30),
            total_transactions_count: total,
            transactions,
        }
    }

    /// Stores t1 (on the ledger) and t2 (not dispatched) through a regular extraction.
    async fn seed(runtime: &LedgerRuntime) {
        let c = runtime.container();
        let b = batch_id();
        c.ingestion
            .initiate_ingestion(&b, ORG, &ExtractionParameters::default(), "user-1")
            .await
            .unwrap();
        c.ingestion
            .continue_ingestion(
                ORG,
                &b,
                Some(2),
                vec![tx("t1", &b, dec!(10)), tx("t2", &b, dec!(20))],
                ProcessorFlags::import(),
            )
            .await
            .unwrap();

        let mut on_ledger = stored(&c.store, "t1").await.unwrap();
        on_ledger.ledger_dispatch_status = LedgerDispatchStatus::Finalized;
        TransactionRepository::save(c.store.as_ref(), on_ledger).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconciliation_completes_through_bus() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        seed(&runtime).await;
        let c = runtime.container();

        c.publisher.publish(started("r1")).await;
        c.publisher
            .publish(chunk("r1", 3, vec![tx("t1", "", dec!(10)), tx("t2", "", dec!(20))]))
            .await;
        settle().await;

        let partial = c.matcher.find_reconciliation("r1").await.unwrap().unwrap();
        assert_eq!(partial.status, ReconciliationStatus::Created);
        assert_eq!(partial.processed_count(), 2);

        c.publisher
            .publish(chunk("r1", 3, vec![tx("t9", "", dec!(90))]))
            .await;
        settle().await;

        let done = c.matcher.find_reconciliation("r1").await.unwrap().unwrap();
        assert_eq!(done.status, ReconciliationStatus::Completed);
        assert_eq!(done.results.get("t1"), Some(&ReconciliationCode::Ok));
        // t2 matches the ERP but never reached the ledger; t9 is unknown.
        assert_eq!(done.results.get("t2"), Some(&ReconciliationCode::Nok));
        assert_eq!(done.results.get("t9"), Some(&ReconciliationCode::Nok));

        let annotated = stored(&c.store, "t1").await.unwrap();
        let result = annotated.reconciliation.unwrap();
        assert_eq!(result.source, Some(ReconciliationCode::Ok));
        assert_eq!(result.sink, Some(ReconciliationCode::Ok));
        assert!(stored(&c.store, "t9").await.is_none());
        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_before_start_is_dropped() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        let c = runtime.container();

        c.publisher.publish(chunk("r2", 1, vec![tx("t1", "", dec!(10))])).await;
        settle().await;

        assert!(c.matcher.find_reconciliation("r2").await.unwrap().is_none());
        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reconciliation_never_completes() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        let c = runtime.container();

        c.publisher.publish(started("r3")).await;
        c.publisher
            .publish(LedgerEvent::ReconciliationFailed {
                reconciliation_id: "r3".to_string(),
                organisation_id: ORG.to_string(),
                error: FatalError::new(FatalErrorCode::AdapterError, "CLIENT_ERROR"),
            })
            .await;
        settle().await;

        assert!(!c.ingestion.finalise_reconciliation("r3", ORG, 0).await.unwrap());
        let failed = c.matcher.find_reconciliation("r3").await.unwrap().unwrap();
        assert_eq!(failed.status, ReconciliationStatus::Failed);
        assert!(failed.details.is_some());
        runtime.shutdown();
    }
}
