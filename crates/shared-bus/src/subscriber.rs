//! # Ledger Subscription
//!
//! Receiving end of the bus. Events outside the filter are skipped. A
//! subscription that falls more than the bus capacity behind loses the oldest
//! events; every loss is logged at error level and counted in
//! `li_eventbus_events_lost_total`, because a lost chunk leaves its batch
//! short of transactions.

use crate::events::{EventFilter, LedgerEvent};
use ledger_telemetry::EVENTS_LOST;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Event bus closed")]
    Closed,
}

pub struct Subscription {
    receiver: broadcast::Receiver<LedgerEvent>,
    filter: EventFilter,
    label: String,
    lost: u64,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<LedgerEvent>, filter: EventFilter) -> Self {
        let label = filter.label();
        Self {
            receiver,
            filter,
            label,
            lost: 0,
        }
    }

    /// Next matching event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<LedgerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => self.record_loss(skipped),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking [`recv`](Self::recv). `Ok(None)` means nothing matching is queued.
    pub fn try_recv(&mut self) -> Result<Option<LedgerEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => self.record_loss(skipped),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
            }
        }
    }

    /// Events this subscription lost by falling behind.
    #[must_use]
    pub fn lost_events(&self) -> u64 {
        self.lost
    }

    fn record_loss(&mut self, skipped: u64) {
        self.lost += skipped;
        EVENTS_LOST
            .with_label_values(&[self.label.as_str()])
            .inc_by(skipped as f64);
        error!(
            topics = %self.label,
            skipped,
            total_lost = self.lost,
            "Subscription fell behind the bus, ledger events lost"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use crate::publisher::InMemoryEventBus;
    use crate::EventPublisher;
    use shared_types::{FatalError, FatalErrorCode, LedgerDispatchStatus, TxStatusUpdate};

    fn ledger_updated(tx_id: &str) -> LedgerEvent {
        LedgerEvent::TxsLedgerUpdated {
            organisation_id: "org-1".to_string(),
            statuses: vec![TxStatusUpdate::new(tx_id, LedgerDispatchStatus::Dispatched)],
        }
    }

    fn updated_tx(event: LedgerEvent) -> String {
        match event {
            LedgerEvent::TxsLedgerUpdated { statuses, .. } => statuses[0].tx_id.clone(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recv_skips_other_topics() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Ledger]));

        bus.publish(LedgerEvent::ReconciliationFailed {
            reconciliation_id: "r1".to_string(),
            organisation_id: "org-1".to_string(),
            error: FatalError::new(FatalErrorCode::AdapterError, "CLIENT_ERROR"),
        })
        .await;
        bus.publish(ledger_updated("t1")).await;

        assert_eq!(updated_tx(sub.recv().await.unwrap()), "t1");
    }

    #[tokio::test]
    async fn test_lagging_subscription_counts_lost_events() {
        let bus = InMemoryEventBus::with_capacity(2);
        let mut sub = bus.subscribe(EventFilter::all());

        for id in ["t1", "t2", "t3", "t4"] {
            bus.publish(ledger_updated(id)).await;
        }

        assert_eq!(updated_tx(sub.try_recv().unwrap().unwrap()), "t3");
        assert_eq!(sub.lost_events(), 2);
        assert_eq!(updated_tx(sub.try_recv().unwrap().unwrap()), "t4");
        assert!(matches!(sub.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_closed_bus_ends_subscription() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        let mut polled = bus.subscribe(EventFilter::all());
        drop(bus);

        assert!(sub.recv().await.is_none());
        assert!(matches!(polled.try_recv(), Err(SubscriptionError::Closed)));
    }
}
