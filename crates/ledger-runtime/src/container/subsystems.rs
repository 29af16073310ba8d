//! # Subsystem Container
//!
//! Holds every subsystem instance, wired to its adapters.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: ledger store, event bus (no dependencies)
//! Level 1: batch lifecycle (store, bus)
//! Level 2: transaction sync, reconciliation matcher (store, lifecycle)
//! Level 3: ingestion, status updater job (everything above)
//! ```

use std::sync::Arc;

use tracing::{info, instrument};

use li_01_ledger_storage::InMemoryLedgerStore;
use li_02_batch_lifecycle::BatchLifecycleService;
use li_03_transaction_sync::{Sha256Fingerprinter, TransactionSyncService};
use li_04_ingestion::{
    BasicRulesEngine, InMemoryReconciliationMatcher, IngestionDependencies, IngestionService,
    TxStatusUpdaterJob,
};
use shared_bus::{EventPublisher, InMemoryEventBus};

use crate::adapters::MeteredPublisher;
use crate::container::config::RuntimeConfig;

pub struct SubsystemContainer {
    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// Backs all three repositories.
    pub store: Arc<InMemoryLedgerStore>,

    pub event_bus: Arc<InMemoryEventBus>,

    /// Metered view of `event_bus` handed to the subsystems.
    pub publisher: Arc<dyn EventPublisher>,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    pub lifecycle: Arc<BatchLifecycleService>,

    pub sync: Arc<TransactionSyncService>,

    pub matcher: Arc<InMemoryReconciliationMatcher>,

    pub ingestion: Arc<IngestionService>,

    pub status_updater: Arc<TxStatusUpdaterJob>,

    pub config: RuntimeConfig,
}

impl SubsystemContainer {
    #[instrument(name = "subsystem_init", skip(config))]
    pub fn new(config: RuntimeConfig) -> Self {
        info!("Initializing ledger ingest subsystem container");

        let store = Arc::new(InMemoryLedgerStore::new());
        let event_bus = Arc::new(InMemoryEventBus::with_capacity(config.bus.capacity));
        let publisher: Arc<dyn EventPublisher> =
            Arc::new(MeteredPublisher::new(event_bus.clone()));
        info!(bus_capacity = config.bus.capacity, "Shared infrastructure ready");

        let lifecycle = Arc::new(BatchLifecycleService::new(
            config.batch.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            publisher.clone(),
        ));

        let fingerprinter = Arc::new(Sha256Fingerprinter::new());
        let sync = Arc::new(TransactionSyncService::new(
            store.clone(),
            store.clone(),
            lifecycle.clone(),
            fingerprinter.clone(),
        ));
        let matcher = Arc::new(InMemoryReconciliationMatcher::new(
            store.clone(),
            fingerprinter,
        ));

        let ingestion = Arc::new(IngestionService::new(
            config.ingestion.clone(),
            IngestionDependencies {
                rules: Arc::new(BasicRulesEngine),
                sync: sync.clone(),
                lifecycle: lifecycle.clone(),
                transactions: store.clone(),
                assocs: store.clone(),
                matcher: matcher.clone(),
                publisher: publisher.clone(),
            },
        ));

        let status_updater = Arc::new(TxStatusUpdaterJob::new(
            config.status_updater.clone(),
            store.clone(),
            lifecycle.clone(),
        ));

        info!("All subsystems initialized");

        Self {
            store,
            event_bus,
            publisher,
            lifecycle,
            sync,
            matcher,
            ingestion,
            status_updater,
            config,
        }
    }
}
