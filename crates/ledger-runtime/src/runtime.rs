//! # Ledger Runtime
//!
//! Starts one task per event handler plus the status updater job. Every
//! task stops on the shared shutdown signal.

use std::sync::Arc;

use tracing::{error, info};

use li_04_ingestion::IngestionApi;
use shared_bus::{EventFilter, EventTopic};

use crate::container::{ConfigError, RuntimeConfig, SubsystemContainer};
use crate::handlers::{ExtractionHandler, LedgerUpdateHandler, ReconciliationHandler};

pub struct LedgerRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl LedgerRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!("Creating ledger ingest runtime");

        let container = Arc::new(SubsystemContainer::new(config));
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Subscribes every handler to the bus and spawns it.
    ///
    /// Subscriptions exist when this returns, so nothing published afterwards
    /// is missed.
    pub fn start(&self) {
        let container = &self.container;
        let ingestion: Arc<dyn IngestionApi> = container.ingestion.clone();

        let extraction = ExtractionHandler::new(
            container
                .event_bus
                .subscribe(EventFilter::topics(vec![EventTopic::Extraction])),
            ingestion.clone(),
        );
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = extraction.run() => {}
                _ = shutdown.changed() => {
                    info!("[extraction] Shutdown signal received");
                }
            }
        });

        let reconciliation = ReconciliationHandler::new(
            container
                .event_bus
                .subscribe(EventFilter::topics(vec![EventTopic::Reconciliation])),
            ingestion,
        );
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = reconciliation.run() => {}
                _ = shutdown.changed() => {
                    info!("[reconciliation] Shutdown signal received");
                }
            }
        });

        let ledger = LedgerUpdateHandler::new(
            container
                .event_bus
                .subscribe(EventFilter::topics(vec![EventTopic::Ledger])),
            container.status_updater.clone(),
        );
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = ledger.run() => {}
                _ = shutdown.changed() => {
                    info!("[ledger] Shutdown signal received");
                }
            }
        });

        let job = container.status_updater.clone();
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = job.run() => {}
                _ = shutdown.changed() => {
                    info!("[status-updater] Shutdown signal received");
                }
            }
        });

        info!(
            stats_debounce_ms = container.config.batch.stats_debounce.as_millis() as u64,
            status_updater_delay_secs = container.config.status_updater.fixed_delay.as_secs(),
            "Ledger ingest runtime started"
        );
    }

    /// Stops every handler and drops pending debounced work.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        self.container.lifecycle.shutdown();
        self.container.ingestion.shutdown();

        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
