//! Publisher decorator that counts published events per topic.

use async_trait::async_trait;
use ledger_telemetry::EVENTS_PUBLISHED;
use shared_bus::{EventPublisher, LedgerEvent};
use std::sync::Arc;

pub struct MeteredPublisher {
    inner: Arc<dyn EventPublisher>,
}

impl MeteredPublisher {
    pub fn new(inner: Arc<dyn EventPublisher>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl EventPublisher for MeteredPublisher {
    async fn publish(&self, event: LedgerEvent) -> usize {
        EVENTS_PUBLISHED
            .with_label_values(&[event.topic().as_str()])
            .inc();
        self.inner.publish(event).await
    }
}
