//! Debounce Coordinator
//!
//! Coalesces repeated requests for the same key into one delayed execution.
//!
//! ## Entry lifecycle
//!
//! ```text
//! trigger(k) ──→ [pending: gen N, sleeping] ──window elapsed──→ removed ──→ action runs
//!                        │
//!                trigger(k) again
//!                        ↓
//!               [pending: gen N+1] (gen N aborted, its action never runs)
//! ```
//!
//! A burst of triggers for one key runs exactly one action: the one supplied
//! last. A trigger that arrives while an action is already running schedules
//! a new execution.

use ledger_telemetry::DEBOUNCE_COALESCED;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

struct PendingEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

type Entries = Arc<Mutex<HashMap<String, PendingEntry>>>;

#[derive(Default)]
pub struct DebounceCoordinator {
    entries: Entries,
    next_generation: AtomicU64,
}

impl DebounceCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to run once `window` has passed without another
    /// trigger for `key`. Returns `true` if a pending action was replaced.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger<F>(&self, key: impl Into<String>, window: Duration, action: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // The lock is held until the entry is inserted, so the spawned task
        // always finds its own entry (or a newer one) after sleeping.
        let mut entries = self.entries.lock();

        let handle = tokio::spawn(run_after(
            self.entries.clone(),
            key.clone(),
            generation,
            window,
            action,
        ));

        let replaced = entries.insert(key.clone(), PendingEntry { generation, handle });

        match replaced {
            Some(previous) => {
                previous.handle.abort();
                DEBOUNCE_COALESCED.inc();
                debug!(key = %key, "Debounced trigger replaced a pending one");
                true
            }
            None => false,
        }
    }

    /// Keys with an action waiting for its window to elapse.
    pub fn pending_count(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Drops the pending action for `key`, if any. Returns whether one was dropped.
    pub fn cancel(&self, key: &str) -> bool {
        match self.entries.lock().remove(key) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Drops every pending action without running it.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.entries.lock().drain().collect();
        for (_, entry) in drained {
            entry.handle.abort();
        }
    }
}

async fn run_after<F>(entries: Entries, key: String, generation: u64, window: Duration, action: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::time::sleep(window).await;

    {
        let mut map = entries.lock();
        match map.get(&key) {
            Some(entry) if entry.generation == generation => {
                map.remove(&key);
            }
            // Superseded by a newer trigger.
            _ => return,
        }
    }

    action.await;
}
