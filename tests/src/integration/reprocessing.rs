//! # Failed-Batch Reprocessing
//!
//! Only transactions that never passed dispatch approval and are `PENDING`
//! are re-run; the reprocessing trigger clears LOB rejections.

#[cfg(test)]
mod tests {
    use crate::fixtures::{batch, batch_id, container, settle, stored, tx, ORG};
    use li_04_ingestion::{IngestionApi, IngestionError};
    use ledger_runtime::SubsystemContainer;
    use li_01_ledger_storage::TransactionRepository;
    use rust_decimal_macros::dec;
    use shared_types::{
        ExtractionParameters, ProcessorFlags, Rejection, Source, Transaction,
        TransactionProcessingStatus,
    };

    fn lob_rejected(id: &str, b: &str) -> Transaction {
        let mut rejected = tx(id, b, dec!(15));
        rejected.items[0].rejection = Some(Rejection::new("Cost center blocked", Source::Lob));
        rejected
    }

    async fn seed(c: &SubsystemContainer, b: &str) {
        c.ingestion
            .initiate_ingestion(b, ORG, &ExtractionParameters::default(), "user-1")
            .await
            .unwrap();
        c.ingestion
            .continue_ingestion(
                ORG,
                b,
                Some(3),
                vec![lob_rejected("t1", b), tx("t2", b, dec!(20)), lob_rejected("t3", b)],
                ProcessorFlags::import(),
            )
            .await
            .unwrap();

        let mut approved = stored(&c.store, "t3").await.unwrap().approved_for_dispatch();
        approved.update_processing_status();
        TransactionRepository::save(c.store.as_ref(), approved).await.unwrap();
        settle().await;
    }

    async fn status(c: &SubsystemContainer, id: &str) -> Option<TransactionProcessingStatus> {
        stored(&c.store, id).await.unwrap().processing_status
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_reprocessing_clears_lob_rejections() {
        let c = container();
        let b = batch_id();
        seed(&c, &b).await;

        assert_eq!(status(&c, "t1").await, Some(TransactionProcessingStatus::Pending));
        assert_eq!(batch(&c, &b).await.unwrap().statistics.pending, 1);

        c.ingestion.schedule_reingestion_for_failed(&b).await.unwrap();
        settle().await;

        assert_eq!(status(&c, "t1").await, Some(TransactionProcessingStatus::Approve));
        assert!(!stored(&c.store, "t1").await.unwrap().has_any_rejection(Source::Lob));
        // Dispatch-approved transactions are left alone.
        assert!(stored(&c.store, "t3").await.unwrap().has_any_rejection(Source::Lob));

        let reprocessed = batch(&c, &b).await.unwrap();
        assert_eq!(reprocessed.statistics.pending, 0);
        assert_eq!(reprocessed.statistics.ready_to_approve, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_reprocessing_reports_candidates() {
        let c = container();
        let b = batch_id();
        seed(&c, &b).await;

        assert_eq!(c.ingestion.process_reingestion_for_failed(&b).await.unwrap(), 1);
        // Nothing left to reprocess.
        assert_eq!(c.ingestion.process_reingestion_for_failed(&b).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_batch_is_rejected() {
        let c = container();

        let err = c
            .ingestion
            .schedule_reingestion_for_failed("missing")
            .await
            .unwrap_err();

        assert!(matches!(err, IngestionError::BatchNotFound { .. }));
        assert_eq!(err.title(), "TX_BATCH_NOT_FOUND");
        assert_eq!(c.ingestion.pending_reingestions(), 0);
    }
}
