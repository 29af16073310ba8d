//! # Partitioned Dispatcher
//!
//! Single-consumer FIFO delivery per partition key.
//!
//! Chunk events of one batch must be merged in the order they were published,
//! while chunks of different batches may run concurrently. Each key gets its
//! own worker task draining an unbounded queue; a worker exits after
//! `idle_timeout` without work and is recreated on the next item for its key.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Default time a partition worker waits for more work before exiting.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Processes items of one partition, one at a time.
#[async_trait]
pub trait PartitionHandler<T>: Send + Sync + 'static {
    async fn handle(&self, item: T);
}

type Workers<T> = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<T>>>>;

pub struct PartitionedDispatcher<T: Send + 'static> {
    workers: Workers<T>,
    handler: Arc<dyn PartitionHandler<T>>,
    idle_timeout: Duration,
}

impl<T: Send + 'static> PartitionedDispatcher<T> {
    pub fn new(handler: Arc<dyn PartitionHandler<T>>) -> Self {
        Self::with_idle_timeout(handler, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(handler: Arc<dyn PartitionHandler<T>>, idle_timeout: Duration) -> Self {
        Self {
            workers: Arc::new(Mutex::new(HashMap::new())),
            handler,
            idle_timeout,
        }
    }

    /// Queues `item` behind every earlier item with the same key.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, key: &str, item: T) {
        let mut workers = self.workers.lock();

        let item = match workers.get(key) {
            Some(sender) => match sender.send(item) {
                Ok(()) => return,
                // Worker is gone; fall through and start a new one.
                Err(mpsc::error::SendError(item)) => item,
            },
            None => item,
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        // A fresh receiver is alive, so the send cannot fail.
        let _ = sender.send(item);
        workers.insert(key.to_string(), sender);

        debug!(partition = key, "Starting partition worker");
        tokio::spawn(run_worker(
            key.to_string(),
            receiver,
            self.handler.clone(),
            self.workers.clone(),
            self.idle_timeout,
        ));
    }

    /// Number of partitions with a live worker.
    pub fn active_partitions(&self) -> usize {
        self.workers.lock().len()
    }
}

async fn run_worker<T: Send + 'static>(
    key: String,
    mut receiver: mpsc::UnboundedReceiver<T>,
    handler: Arc<dyn PartitionHandler<T>>,
    workers: Workers<T>,
    idle_timeout: Duration,
) {
    loop {
        match tokio::time::timeout(idle_timeout, receiver.recv()).await {
            Ok(Some(item)) => handler.handle(item).await,
            Ok(None) => break,
            Err(_) => {
                // Dispatch holds the same lock while sending, so nothing can
                // arrive between the final check and the removal.
                let next = {
                    let mut guard = workers.lock();
                    match receiver.try_recv() {
                        Ok(item) => Some(item),
                        Err(_) => {
                            guard.remove(&key);
                            None
                        }
                    }
                };
                match next {
                    Some(item) => handler.handle(item).await,
                    None => break,
                }
            }
        }
    }
    debug!(partition = %key, "Partition worker stopped");
}
