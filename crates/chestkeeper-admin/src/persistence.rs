//! Background persistence of closed views
//!
//! Saves run as tokio tasks that hand the blocking store call to
//! `spawn_blocking`. A semaphore bounds how many run at once and a task
//! tracker lets shutdown wait for every queued save. Saves for the same
//! target are chained so they reach the store in enqueue order; saves for
//! different targets are unordered.

use chestkeeper_core::{Identity, InventoryRecord, RecordStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Semaphore};
use tokio_util::task::TaskTracker;

use crate::{AdminError, Result};

/// Completion signal of the latest save queued for a target
#[derive(Debug)]
struct ChainLink {
    seq: u64,
    done: oneshot::Receiver<()>,
}

/// Counters of finished saves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Bounded background execution context for record saves
pub struct SaveQueue {
    store: Arc<dyn RecordStore>,
    handle: Handle,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    chains: Arc<Mutex<HashMap<Identity, ChainLink>>>,
    next_seq: AtomicU64,
    counters: Arc<Counters>,
}

impl SaveQueue {
    /// Create a queue that spawns onto `handle`
    pub fn new(store: Arc<dyn RecordStore>, handle: Handle, max_in_flight: usize) -> Result<Self> {
        if max_in_flight == 0 {
            return Err(AdminError::InvalidConfig(
                "max_in_flight_saves must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store,
            handle,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            tracker: TaskTracker::new(),
            chains: Arc::new(Mutex::new(HashMap::new())),
            next_seq: AtomicU64::new(0),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Create a queue on the runtime of the calling task
    pub fn on_current_runtime(store: Arc<dyn RecordStore>, max_in_flight: usize) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| AdminError::Runtime(e.to_string()))?;
        Self::new(store, handle, max_in_flight)
    }

    /// Queue a save of `record` for `target`. Never blocks.
    pub fn enqueue(&self, target: Identity, record: InventoryRecord) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (done_tx, done_rx) = oneshot::channel();

        let previous = self.chains.lock().insert(
            target,
            ChainLink {
                seq,
                done: done_rx,
            },
        );

        let store = self.store.clone();
        let permits = self.permits.clone();
        let chains = self.chains.clone();
        let counters = self.counters.clone();

        tracing::debug!("Save #{} queued for {}", seq, target);

        self.tracker.spawn_on(
            async move {
                if let Some(previous) = previous {
                    // Err means the previous save task died; nothing left to wait for.
                    let _ = previous.done.await;
                }

                let _permit = permits.acquire_owned().await.ok();
                let slots = record.into_slots();
                let outcome =
                    tokio::task::spawn_blocking(move || store.save(target, &slots)).await;

                match outcome {
                    Ok(Ok(())) => {
                        counters.completed.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("Save #{} for {} completed", seq, target);
                    }
                    Ok(Err(e)) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::error!("Error saving record for {}: {}", target, e);
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::error!("Save task for {} aborted: {}", target, e);
                    }
                }

                let _ = done_tx.send(());

                let mut chains = chains.lock();
                if chains.get(&target).is_some_and(|link| link.seq == seq) {
                    chains.remove(&target);
                }
            },
            &self.handle,
        );
    }

    /// Wait until every save queued so far has finished
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Number of saves queued or running
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Snapshot of finished save counters
    pub fn stats(&self) -> SaveStats {
        SaveStats {
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for SaveQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveQueue")
            .field("pending", &self.pending())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
