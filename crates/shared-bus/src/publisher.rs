//! # Ledger Event Bus
//!
//! One broadcast lane shared by the ERP adapter, the ingestion handlers and
//! the ledger follower. Every subscription sees every event in publication
//! order and filters on receipt. Per-topic counting is done by the runtime's
//! metered publisher, not here.

use crate::events::{EventFilter, LedgerEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Anything that can put a [`LedgerEvent`] on the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Returns the number of subscriptions the event was delivered to.
    async fn publish(&self, event: LedgerEvent) -> usize;
}

pub struct InMemoryEventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// `capacity` bounds how far a subscription may fall behind before it
    /// starts losing events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Opens a subscription. Events published earlier are not replayed.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(
            topics = %filter.label(),
            organisations = ?filter.organisations,
            "Ledger subscription opened"
        );
        Subscription::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        let topic = event.topic().as_str();
        let organisation_id = event.organisation_id().to_string();
        let run = event.partition_key().map(str::to_string);

        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(topic, organisation_id, run = ?run, receivers, "Ledger event published");
                receivers
            }
            // No open subscription: the event is discarded.
            Err(_) => {
                debug!(topic, organisation_id, run = ?run, "Ledger event had no subscribers");
                0
            }
        }
    }
}
