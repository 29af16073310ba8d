//! Ledger follower updates feed the status updater job.

use li_04_ingestion::TxStatusUpdaterJob;
use shared_bus::{LedgerEvent, Subscription};
use std::sync::Arc;
use tracing::{debug, info};

pub struct LedgerUpdateHandler {
    subscription: Subscription,
    job: Arc<TxStatusUpdaterJob>,
}

impl LedgerUpdateHandler {
    pub fn new(subscription: Subscription, job: Arc<TxStatusUpdaterJob>) -> Self {
        Self { subscription, job }
    }

    pub async fn run(mut self) {
        info!("Ledger update handler started");

        while let Some(event) = self.subscription.recv().await {
            if let LedgerEvent::TxsLedgerUpdated {
                organisation_id,
                statuses,
            } = event
            {
                debug!(
                    organisation_id = %organisation_id,
                    updates = statuses.len(),
                    "Queueing ledger status updates"
                );
                self.job.add_to_status_update_map(statuses);
            }
        }

        info!("Ledger update handler stopped: bus closed");
    }
}
