//! Reconciliation run state.
//!
//! Chunks may arrive in any order and each chunk is followed by a
//! finalisation candidate. The run completes only once the number of
//! distinct transactions seen reaches the predicted total, so early
//! candidates leave it untouched.

use chrono::{DateTime, NaiveDate, Utc};
use shared_types::{FatalError, OrganisationId, ReconciliationCode, TransactionId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconciliationStatus {
    #[default]
    Created,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub id: String,
    pub organisation_id: OrganisationId,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: ReconciliationStatus,
    /// Outcome per transaction id; a repeated id overwrites its earlier outcome.
    pub results: BTreeMap<TransactionId, ReconciliationCode>,
    pub details: Option<FatalError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reconciliation {
    pub fn new(
        id: impl Into<String>,
        organisation_id: impl Into<OrganisationId>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            organisation_id: organisation_id.into(),
            from,
            to,
            status: ReconciliationStatus::Created,
            results: BTreeMap::new(),
            details: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record(&mut self, tx_id: impl Into<TransactionId>, code: ReconciliationCode) {
        self.results.insert(tx_id.into(), code);
        self.updated_at = Utc::now();
    }

    pub fn processed_count(&self) -> u64 {
        self.results.len() as u64
    }

    pub fn count(&self, code: ReconciliationCode) -> u64 {
        self.results.values().filter(|c| **c == code).count() as u64
    }

    /// Completes the run once every predicted transaction was seen.
    ///
    /// Returns `true` if the run is completed after the call.
    pub fn try_complete(&mut self, total_prediction: u64) -> bool {
        match self.status {
            ReconciliationStatus::Completed => true,
            ReconciliationStatus::Failed => false,
            ReconciliationStatus::Created => {
                if self.processed_count() < total_prediction {
                    return false;
                }
                self.status = ReconciliationStatus::Completed;
                self.updated_at = Utc::now();
                true
            }
        }
    }

    pub fn fail(&mut self, error: FatalError) {
        self.status = ReconciliationStatus::Failed;
        self.details = Some(error);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::FatalErrorCode;

    fn reconciliation() -> Reconciliation {
        Reconciliation::new("r1", "org-1", None, None)
    }

    #[test]
    fn test_completes_only_when_prediction_reached() {
        let mut r = reconciliation();
        r.record("t1", ReconciliationCode::Ok);

        assert!(!r.try_complete(3));
        assert_eq!(r.status, ReconciliationStatus::Created);

        r.record("t2", ReconciliationCode::Nok);
        r.record("t2", ReconciliationCode::Ok);
        assert!(!r.try_complete(3));

        r.record("t3", ReconciliationCode::Nok);
        assert!(r.try_complete(3));
        assert_eq!(r.status, ReconciliationStatus::Completed);
        assert_eq!(r.count(ReconciliationCode::Ok), 2);
        assert_eq!(r.count(ReconciliationCode::Nok), 1);
    }

    #[test]
    fn test_failed_run_never_completes() {
        let mut r = reconciliation();
        r.fail(FatalError::new(FatalErrorCode::AdapterError, "CLIENT_ERROR"));

        assert!(!r.try_complete(0));
        assert_eq!(r.status, ReconciliationStatus::Failed);
        assert!(r.details.is_some());
    }
}
