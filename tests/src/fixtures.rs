//! Shared fixtures for the integration flows.

use chrono::NaiveDate;
use li_01_ledger_storage::{InMemoryLedgerStore, TransactionRepository};
use li_02_batch_lifecycle::BatchLifecycleApi;
use ledger_runtime::{RuntimeConfig, SubsystemContainer};
use rust_decimal::Decimal;
use shared_types::{Transaction, TransactionBatch, TransactionItem, TransactionType};
use std::time::Duration;

pub const ORG: &str = "org-1";

pub const STATS_DEBOUNCE: Duration = Duration::from_millis(200);

/// Short windows so flows settle quickly under a paused clock.
pub fn fast_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.batch.stats_debounce = STATS_DEBOUNCE;
    config.status_updater.initial_delay = Duration::from_secs(1);
    config.status_updater.fixed_delay = Duration::from_secs(1);
    config
}

pub fn container() -> SubsystemContainer {
    SubsystemContainer::new(fast_config())
}

pub fn batch_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or_default()
}

/// A transaction with one balanced item that passes the basic rules.
pub fn tx(id: &str, batch_id: &str, amount: Decimal) -> Transaction {
    Transaction::new(
        id,
        ORG,
        format!("INV-{id}"),
        date(3),
        TransactionType::VendorBill,
        batch_id,
    )
    .with_item(TransactionItem::new(format!("{id}-1"), amount, amount).with_accounts("6000", "4000"))
}

/// Lets spawned tasks and debounced work run.
pub async fn settle() {
    tokio::time::sleep(STATS_DEBOUNCE * 3).await;
}

pub async fn stored(store: &InMemoryLedgerStore, id: &str) -> Option<Transaction> {
    TransactionRepository::find_by_id(store, id).await.ok().flatten()
}

pub async fn batch(container: &SubsystemContainer, id: &str) -> Option<TransactionBatch> {
    container.lifecycle.find_by_id(id).await.ok().flatten()
}
