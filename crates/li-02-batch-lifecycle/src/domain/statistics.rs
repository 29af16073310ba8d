//! In-memory view of a batch's statistics, built from the storage projection.

use li_01_ledger_storage::BatchStatisticsProjection;
use shared_types::{BatchId, BatchStatistics};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchStatisticsView {
    pub batch_id: BatchId,
    pub invalid: u64,
    pub pending: u64,
    pub ready_to_approve: u64,
    pub approved: u64,
    pub published: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub finalized: u64,
    pub validated: u64,
    pub failed: u64,
    /// Transactions actually retained for the batch.
    pub total: u64,
}

impl BatchStatisticsView {
    pub fn new(batch_id: impl Into<BatchId>) -> Self {
        Self {
            batch_id: batch_id.into(),
            ..Default::default()
        }
    }

    pub fn merge(&mut self, p: &BatchStatisticsProjection) {
        self.invalid += p.invalid;
        self.pending += p.pending;
        self.ready_to_approve += p.ready_to_approve;
        self.approved += p.approved;
        self.published += p.published;
        self.dispatched += p.dispatched;
        self.completed += p.completed;
        self.finalized += p.finalized;
        self.validated += p.validated;
        self.failed += p.failed;
        self.total += p.total;
    }

    /// Sum of transactions in a non-terminal, non-dispatched bucket plus the approved ones.
    pub fn retained(&self) -> u64 {
        self.invalid + self.approved + self.pending + self.ready_to_approve
    }

    /// `total` is the expected count; `processed` is what storage holds.
    pub fn to_batch_statistics(&self, total: u64) -> BatchStatistics {
        BatchStatistics {
            total,
            processed: self.total,
            approved: self.approved,
            published: self.published,
            dispatched: self.dispatched,
            completed: self.completed,
            finalized: self.finalized,
            failed: self.failed,
            invalid: self.invalid,
            pending: self.pending,
            ready_to_approve: self.ready_to_approve,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_convert() {
        let projection = BatchStatisticsProjection {
            total: 7,
            invalid: 1,
            pending: 2,
            ready_to_approve: 3,
            approved: 1,
            validated: 6,
            failed: 1,
            ..Default::default()
        };

        let mut view = BatchStatisticsView::new("b1");
        view.merge(&projection);

        let stats = view.to_batch_statistics(10);
        assert_eq!(stats.total, 10);
        assert_eq!(stats.processed, 7);
        assert_eq!(stats.failed, 1);
        assert_eq!(view.retained(), 7);
    }
}
