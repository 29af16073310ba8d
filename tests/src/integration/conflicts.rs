//! # Version Conflicts Across Batches
//!
//! A dispatch-approved transaction keeps its stored content. A changed
//! re-extraction flags it; an extraction that matches the stored content
//! again removes the flag.

#[cfg(test)]
mod tests {
    use crate::fixtures::{batch, batch_id, container, settle, stored, tx, ORG};
    use li_01_ledger_storage::{BatchAssocRepository, TransactionRepository};
    use li_04_ingestion::IngestionApi;
    use ledger_runtime::SubsystemContainer;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use shared_types::{
        ExtractionParameters, ProcessorFlags, TransactionProcessingStatus, ViolationCode,
    };

    async fn extract(c: &SubsystemContainer, b: &str, amount: Decimal) {
        c.ingestion
            .initiate_ingestion(b, ORG, &ExtractionParameters::default(), "user-1")
            .await
            .unwrap();
        c.ingestion
            .continue_ingestion(ORG, b, Some(1), vec![tx("t1", b, amount)], ProcessorFlags::import())
            .await
            .unwrap();
    }

    async fn approve(c: &SubsystemContainer, id: &str) {
        let mut approved = stored(&c.store, id).await.unwrap().approved_for_dispatch();
        approved.update_processing_status();
        TransactionRepository::save(c.store.as_ref(), approved).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_raised_then_retracted_across_batches() {
        let c = container();
        let (b1, b2, b3) = (batch_id(), batch_id(), batch_id());

        extract(&c, &b1, dec!(10)).await;
        approve(&c, "t1").await;
        settle().await;

        extract(&c, &b2, dec!(99)).await;
        let flagged = stored(&c.store, "t1").await.unwrap();
        assert!(flagged.has_violation(ViolationCode::TxVersionConflictTxNotModifiable));
        assert_eq!(flagged.items[0].amount_fcy, dec!(10));
        assert_eq!(flagged.batch_id, b2);

        settle().await;
        assert_eq!(batch(&c, &b1).await.unwrap().statistics.processed, 0);
        assert_eq!(batch(&c, &b2).await.unwrap().statistics.processed, 1);

        extract(&c, &b3, dec!(10)).await;
        let resolved = stored(&c.store, "t1").await.unwrap();
        assert!(!resolved.has_violation(ViolationCode::TxVersionConflictTxNotModifiable));
        assert!(resolved.all_approvals_passed_for_dispatch());
        assert_eq!(resolved.processing_status, Some(TransactionProcessingStatus::Publish));

        let assoc_batches: Vec<String> = c
            .store
            .find_by_transaction_ids(&["t1".to_string()])
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.batch_id)
            .collect();
        assert_eq!(assoc_batches.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unapproved_transaction_follows_latest_extraction() {
        let c = container();
        let (b1, b2) = (batch_id(), batch_id());

        extract(&c, &b1, dec!(10)).await;
        extract(&c, &b2, dec!(25)).await;
        settle().await;

        let latest = stored(&c.store, "t1").await.unwrap();
        assert_eq!(latest.items[0].amount_fcy, dec!(25));
        assert_eq!(latest.batch_id, b2);
        assert!(latest.violations.is_empty());
        assert_eq!(batch(&c, &b1).await.unwrap().statistics.processed, 0);
        assert_eq!(batch(&c, &b2).await.unwrap().statistics.processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_content_twice_leaves_record_untouched() {
        let c = container();
        let b = batch_id();

        extract(&c, &b, dec!(10)).await;
        let first = stored(&c.store, "t1").await.unwrap();

        c.ingestion
            .continue_ingestion(ORG, &b, Some(1), vec![tx("t1", &b, dec!(10))], ProcessorFlags::import())
            .await
            .unwrap();

        assert_eq!(stored(&c.store, "t1").await.unwrap(), first);
        assert_eq!(c.store.transaction_count(), 1);
    }
}
