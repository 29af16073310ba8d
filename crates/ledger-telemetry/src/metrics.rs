//! Prometheus metrics for the ingestion pipeline.
//!
//! All metrics follow the naming convention: `li_<subsystem>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SYNCHRONISATION
    // =========================================================================

    /// Transactions merged into storage, by outcome
    pub static ref TRANSACTIONS_SYNCED: CounterVec = CounterVec::new(
        Opts::new("li_sync_transactions_total", "Transactions handled by the synchronisation use-case"),
        &["outcome"]  // outcome: processed/conflict/retracted/unchanged/reprocessed
    ).expect("metric creation failed");

    /// Version conflicts raised against dispatch-approved transactions
    pub static ref VERSION_CONFLICTS_RAISED: Counter = Counter::new(
        "li_sync_version_conflicts_raised_total",
        "Version conflict violations added to dispatch-approved transactions"
    ).expect("metric creation failed");

    /// Version conflicts retracted after the ERP data reverted
    pub static ref VERSION_CONFLICTS_RETRACTED: Counter = Counter::new(
        "li_sync_version_conflicts_retracted_total",
        "Stale version conflict violations removed"
    ).expect("metric creation failed");

    // =========================================================================
    // BATCH LIFECYCLE
    // =========================================================================

    pub static ref BATCHES_CREATED: Counter = Counter::new(
        "li_batch_created_total",
        "Transaction batches persisted for the first time"
    ).expect("metric creation failed");

    pub static ref BATCHES_FAILED: Counter = Counter::new(
        "li_batch_failed_total",
        "Transaction batches marked FAILED"
    ).expect("metric creation failed");

    /// Statistics recomputations actually executed
    pub static ref STATS_RECOMPUTATIONS: Counter = Counter::new(
        "li_batch_stats_recomputations_total",
        "Batch statistics recomputations executed"
    ).expect("metric creation failed");

    /// Triggers that replaced a pending recomputation
    pub static ref DEBOUNCE_COALESCED: Counter = Counter::new(
        "li_batch_debounce_coalesced_total",
        "Debounced triggers that superseded a pending one"
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS
    // =========================================================================

    pub static ref EVENTS_PUBLISHED: CounterVec = CounterVec::new(
        Opts::new("li_eventbus_events_published_total", "Events published to the bus"),
        &["topic"]
    ).expect("metric creation failed");

    /// Events a lagging subscription never saw, by subscribed topics
    pub static ref EVENTS_LOST: CounterVec = CounterVec::new(
        Opts::new("li_eventbus_events_lost_total", "Events dropped for subscriptions that fell behind"),
        &["topics"]
    ).expect("metric creation failed");

    pub static ref HANDLER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("li_handler_errors_total", "Event handler failures"),
        &["handler"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Synchronisation
        Box::new(TRANSACTIONS_SYNCED.clone()),
        Box::new(VERSION_CONFLICTS_RAISED.clone()),
        Box::new(VERSION_CONFLICTS_RETRACTED.clone()),
        // Batch lifecycle
        Box::new(BATCHES_CREATED.clone()),
        Box::new(BATCHES_FAILED.clone()),
        Box::new(STATS_RECOMPUTATIONS.clone()),
        Box::new(DEBOUNCE_COALESCED.clone()),
        // Event bus
        Box::new(EVENTS_PUBLISHED.clone()),
        Box::new(EVENTS_LOST.clone()),
        Box::new(HANDLER_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increment() {
        BATCHES_CREATED.inc();
        assert!(BATCHES_CREATED.get() >= 1.0);
    }

    #[test]
    fn test_counter_vec_labels() {
        TRANSACTIONS_SYNCED.with_label_values(&["conflict"]).inc();
        assert!(TRANSACTIONS_SYNCED.with_label_values(&["conflict"]).get() >= 1.0);
    }

    #[test]
    fn test_register_then_encode() {
        // May already be registered by another test in this binary.
        let _ = register_metrics();
        STATS_RECOMPUTATIONS.inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("li_batch_stats_recomputations_total"));
    }
}
