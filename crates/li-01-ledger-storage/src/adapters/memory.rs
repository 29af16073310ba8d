//! In-memory storage adapter.
//!
//! Implements all three repositories behind one lock so that every call is
//! atomic with respect to every other call.

use crate::domain::BatchStatisticsProjection;
use crate::error::{StorageError, StorageResult};
use crate::ports::{BatchAssocRepository, BatchRepository, TransactionRepository};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{BatchAssoc, Transaction, TransactionBatch, TransactionId};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::trace;

#[derive(Default)]
struct StoreState {
    transactions: HashMap<TransactionId, Transaction>,
    batches: HashMap<String, TransactionBatch>,
    assocs: BTreeSet<BatchAssoc>,
}

/// In-memory ledger store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<StoreState>,
    unavailable: AtomicBool,
    writes: AtomicU64,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a backend outage: every subsequent call fails until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of write calls that succeeded.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn transaction_count(&self) -> usize {
        self.state.read().transactions.len()
    }

    pub fn assoc_count(&self) -> usize {
        self.state.read().assocs.len()
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "in-memory store switched off".to_string(),
            });
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn validate_transaction(tx: &Transaction) -> StorageResult<()> {
    if tx.id.is_empty() {
        return Err(StorageError::WriteRejected {
            entity: "transaction",
            id: tx.internal_number.clone(),
            reason: "empty id".to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl TransactionRepository for InMemoryLedgerStore {
    async fn find_by_id(&self, tx_id: &str) -> StorageResult<Option<Transaction>> {
        self.check_available()?;
        Ok(self.state.read().transactions.get(tx_id).cloned())
    }

    async fn find_all_by_ids(&self, tx_ids: &[TransactionId]) -> StorageResult<Vec<Transaction>> {
        self.check_available()?;
        let state = self.state.read();
        Ok(tx_ids
            .iter()
            .filter_map(|id| state.transactions.get(id).cloned())
            .collect())
    }

    async fn save(&self, tx: Transaction) -> StorageResult<()> {
        self.save_all(vec![tx]).await
    }

    async fn save_all(&self, txs: Vec<Transaction>) -> StorageResult<()> {
        self.check_available()?;
        // Validate everything before touching the map.
        for tx in &txs {
            validate_transaction(tx)?;
        }

        let count = txs.len();
        let mut state = self.state.write();
        for tx in txs {
            state.transactions.insert(tx.id.clone(), tx);
        }
        drop(state);

        self.record_write();
        trace!(tx_count = count, "Transactions saved");
        Ok(())
    }
}

#[async_trait]
impl BatchRepository for InMemoryLedgerStore {
    async fn find_by_id(&self, batch_id: &str) -> StorageResult<Option<TransactionBatch>> {
        self.check_available()?;
        Ok(self.state.read().batches.get(batch_id).cloned())
    }

    async fn find_all(&self) -> StorageResult<Vec<TransactionBatch>> {
        self.check_available()?;
        let mut batches: Vec<_> = self.state.read().batches.values().cloned().collect();
        batches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(batches)
    }

    async fn save(&self, batch: TransactionBatch) -> StorageResult<()> {
        self.check_available()?;
        if batch.id.is_empty() {
            return Err(StorageError::WriteRejected {
                entity: "batch",
                id: String::new(),
                reason: "empty id".to_string(),
            });
        }
        self.state.write().batches.insert(batch.id.clone(), batch);
        self.record_write();
        Ok(())
    }

    async fn statistics_projection(
        &self,
        batch_id: &str,
    ) -> StorageResult<BatchStatisticsProjection> {
        self.check_available()?;
        let state = self.state.read();
        Ok(BatchStatisticsProjection::from_transactions(
            state.transactions.values().filter(|tx| tx.batch_id == batch_id),
        ))
    }
}

#[async_trait]
impl BatchAssocRepository for InMemoryLedgerStore {
    async fn find_or_create(&self, assoc: BatchAssoc) -> StorageResult<BatchAssoc> {
        self.check_available()?;
        let mut state = self.state.write();
        if !state.assocs.contains(&assoc) {
            state.assocs.insert(assoc.clone());
            drop(state);
            self.record_write();
        }
        Ok(assoc)
    }

    async fn find_by_transaction_ids(
        &self,
        tx_ids: &[TransactionId],
    ) -> StorageResult<Vec<BatchAssoc>> {
        self.check_available()?;
        let state = self.state.read();
        Ok(state
            .assocs
            .iter()
            .filter(|a| tx_ids.contains(&a.transaction_id))
            .cloned()
            .collect())
    }

    async fn find_by_batch_id(&self, batch_id: &str) -> StorageResult<Vec<BatchAssoc>> {
        self.check_available()?;
        let state = self.state.read();
        Ok(state
            .assocs
            .iter()
            .filter(|a| a.batch_id == batch_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared_types::{ExtractionParameters, TransactionType};

    fn tx(id: &str, batch_id: &str) -> Transaction {
        Transaction::new(
            id,
            "org-1",
            id,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            TransactionType::Journal,
            batch_id,
        )
    }

    #[tokio::test]
    async fn test_save_all_and_find_all_by_ids() {
        let store = InMemoryLedgerStore::new();
        store
            .save_all(vec![tx("1", "b1"), tx("2", "b1")])
            .await
            .unwrap();

        let found = store
            .find_all_by_ids(&["1".to_string(), "3".to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_save_all_is_all_or_nothing() {
        let store = InMemoryLedgerStore::new();

        let result = store.save_all(vec![tx("1", "b1"), tx("", "b1")]).await;

        assert!(matches!(result, Err(StorageError::WriteRejected { .. })));
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = InMemoryLedgerStore::new();
        store.set_unavailable(true);

        assert!(TransactionRepository::find_by_id(&store, "1").await.is_err());
        assert!(store.find_all().await.is_err());

        store.set_unavailable(false);
        assert!(store.find_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = InMemoryLedgerStore::new();

        store.find_or_create(BatchAssoc::new("b1", "1")).await.unwrap();
        store.find_or_create(BatchAssoc::new("b1", "1")).await.unwrap();
        store.find_or_create(BatchAssoc::new("b2", "1")).await.unwrap();

        assert_eq!(store.assoc_count(), 2);
        assert_eq!(
            store
                .find_by_transaction_ids(&["1".to_string()])
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(store.find_by_batch_id("b2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_statistics_projection_uses_owning_batch() {
        let store = InMemoryLedgerStore::new();
        store
            .save_all(vec![tx("1", "b1"), tx("2", "b1"), tx("3", "b2")])
            .await
            .unwrap();
        // An assoc row alone does not make a transaction count for a batch.
        store.find_or_create(BatchAssoc::new("b1", "3")).await.unwrap();

        let projection = store.statistics_projection("b1").await.unwrap();

        assert_eq!(projection.total, 2);
    }

    #[tokio::test]
    async fn test_batch_roundtrip() {
        let store = InMemoryLedgerStore::new();
        let batch = TransactionBatch::new("b1", "org-1", &ExtractionParameters::default(), "u");

        BatchRepository::save(&store, batch.clone()).await.unwrap();

        assert_eq!(
            BatchRepository::find_by_id(&store, "b1").await.unwrap(),
            Some(batch)
        );
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }
}
