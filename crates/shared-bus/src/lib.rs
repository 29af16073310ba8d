//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! Subsystems never call each other's handlers directly: the ERP adapter,
//! the ingestion pipeline and the ledger follower exchange `LedgerEvent`s
//! through the bus.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ ERP adapter  │                    │  Ingestion   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Ordering
//!
//! The broadcast bus preserves publication order per subscriber. Chunk events
//! are additionally routed through a [`PartitionedDispatcher`] so that chunks
//! of one batch are merged strictly one after another while different batches
//! progress in parallel.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod dispatcher;
pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use dispatcher::{PartitionHandler, PartitionedDispatcher};
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
