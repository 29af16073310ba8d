//! # Extraction Flow
//!
//! ```text
//! TransactionBatchStarted ──→ batch CREATED ──→ TransactionBatchCreated
//! TransactionBatchChunk×N ──→ rules ──→ sync ──→ debounced stats ──→ PROCESSING
//! TxsLedgerUpdated        ──→ status updater ──→ batch fan-out ──→ FINISHED / FINALIZED
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{batch, batch_id, fast_config, settle, stored, tx, ORG};
    use ledger_runtime::LedgerRuntime;
    use rust_decimal_macros::dec;
    use shared_bus::{EventFilter, EventPublisher, EventTopic, LedgerEvent};
    use shared_types::{
        ExtractionParameters, FatalError, FatalErrorCode, LedgerDispatchStatus, Transaction,
        TransactionBatchStatus, TxStatusUpdate,
    };
    use std::time::Duration;

    fn started(batch_id: &str) -> LedgerEvent {
        LedgerEvent::TransactionBatchStarted {
            batch_id: batch_id.to_string(),
            organisation_id: ORG.to_string(),
            user_id: "user-1".to_string(),
            extraction_parameters: ExtractionParameters::default(),
        }
    }

    fn chunk(batch_id: &str, total: u64, transactions: Vec<Transaction>) -> LedgerEvent {
        LedgerEvent::TransactionBatchChunk {
            batch_id: batch_id.to_string(),
            organisation_id: ORG.to_string(),
            total_transactions_count: Some(total),
            transactions,
        }
    }

    fn ledger_update(ids: &[&str], status: LedgerDispatchStatus) -> LedgerEvent {
        LedgerEvent::TxsLedgerUpdated {
            organisation_id: ORG.to_string(),
            statuses: ids.iter().map(|id| TxStatusUpdate::new(*id, status)).collect(),
        }
    }

    async fn ingest_three(runtime: &LedgerRuntime, b: &str) {
        let publisher = runtime.container().publisher.clone();
        publisher.publish(started(b)).await;
        publisher
            .publish(chunk(b, 3, vec![tx("t1", b, dec!(10)), tx("t2", b, dec!(20))]))
            .await;
        publisher.publish(chunk(b, 3, vec![tx("t3", b, dec!(30))])).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_created_is_announced() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        let mut outbound = runtime
            .container()
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Extraction]));
        runtime.start();
        let b = batch_id();

        runtime.container().publisher.publish(started(&b)).await;
        settle().await;

        let mut announced = false;
        while let Ok(Some(event)) = outbound.try_recv() {
            if let LedgerEvent::TransactionBatchCreated { batch_id, .. } = event {
                assert_eq!(batch_id, b);
                announced = true;
            }
        }
        assert!(announced);
        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunks_then_dispatch_finishes_batch() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        let container = runtime.container();
        let b = batch_id();

        ingest_three(&runtime, &b).await;

        let created = batch(&container, &b).await.unwrap();
        assert_eq!(created.status, TransactionBatchStatus::Processing);
        assert_eq!(created.statistics.total, 3);
        assert_eq!(created.statistics.processed, 3);
        assert_eq!(created.statistics.ready_to_approve, 3);

        container
            .publisher
            .publish(ledger_update(&["t1", "t2", "t3"], LedgerDispatchStatus::Dispatched))
            .await;
        // Status updater runs on a one second cadence.
        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;

        let finished = batch(&container, &b).await.unwrap();
        assert_eq!(finished.status, TransactionBatchStatus::Finished);
        assert_eq!(finished.statistics.dispatched, 3);
        assert_eq!(
            stored(&container.store, "t2").await.unwrap().ledger_dispatch_status,
            LedgerDispatchStatus::Dispatched
        );
        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalized_batch_freezes_statistics() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        let container = runtime.container();
        let b = batch_id();

        ingest_three(&runtime, &b).await;
        container
            .publisher
            .publish(ledger_update(&["t1", "t2", "t3"], LedgerDispatchStatus::Finalized))
            .await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;

        let finalized = batch(&container, &b).await.unwrap();
        assert_eq!(finalized.status, TransactionBatchStatus::Finalized);
        assert_eq!(finalized.statistics.finalized, 3);

        // Statistics of a finalized batch are frozen.
        container
            .publisher
            .publish(ledger_update(&["t1"], LedgerDispatchStatus::Completed))
            .await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;

        let frozen = batch(&container, &b).await.unwrap();
        assert_eq!(frozen.status, TransactionBatchStatus::Finalized);
        assert_eq!(frozen.statistics.finalized, 3);
        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_queued_chunks_stays_failed() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        let container = runtime.container();
        let b = batch_id();

        container.publisher.publish(started(&b)).await;
        for i in 0..5 {
            let id = format!("t{i}");
            container
                .publisher
                .publish(chunk(&b, 5, vec![tx(&id, &b, dec!(10))]))
                .await;
        }
        container
            .publisher
            .publish(LedgerEvent::TransactionBatchFailed {
                batch_id: b.clone(),
                organisation_id: ORG.to_string(),
                user_id: "user-1".to_string(),
                extraction_parameters: ExtractionParameters::default(),
                error: FatalError::new(FatalErrorCode::AdapterError, "CLIENT_ERROR"),
            })
            .await;
        settle().await;

        let failed = batch(&container, &b).await.unwrap();
        assert_eq!(failed.status, TransactionBatchStatus::Failed);
        assert!(failed.details.is_some());
        // Chunks queued ahead of the failure were still applied.
        assert!(stored(&container.store, "t4").await.is_some());
        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunks_of_one_batch_merge_in_order() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        let container = runtime.container();
        let b = batch_id();

        container.publisher.publish(started(&b)).await;
        // The same transaction changes in every chunk; the last one must win.
        for amount in 1..=20u32 {
            container
                .publisher
                .publish(chunk(&b, 1, vec![tx("t1", &b, amount.into())]))
                .await;
        }
        settle().await;

        let merged = stored(&container.store, "t1").await.unwrap();
        assert_eq!(merged.items[0].amount_fcy, dec!(20));
        assert_eq!(batch(&container, &b).await.unwrap().statistics.total, 1);
        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_extraction_finishes_immediately() {
        let runtime = LedgerRuntime::new(fast_config()).unwrap();
        runtime.start();
        let container = runtime.container();
        let b = batch_id();

        container.publisher.publish(started(&b)).await;
        container.publisher.publish(chunk(&b, 0, Vec::new())).await;
        settle().await;

        let empty = batch(&container, &b).await.unwrap();
        assert_eq!(empty.status, TransactionBatchStatus::Finished);
        assert_eq!(empty.statistics.total, 0);
        runtime.shutdown();
    }
}
