// ABOUTME: Scheduler backed by tokio tasks - each timer is a spawned sleep that
// ABOUTME: runs its callback unless it was aborted through cancel().

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::{Callback, Scheduler, TimerId};

/// Scheduler that runs callbacks on a tokio runtime.
///
/// Dropping the scheduler aborts every timer that has not fired yet.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    timers: Arc<Mutex<HashMap<TimerId, JoinHandle<()>>>>,
}

impl Default for TokioScheduler {
    /// Same as [`TokioScheduler::new`], including its panic outside a runtime.
    fn default() -> Self {
        Self::new()
    }
}

impl TokioScheduler {
    /// Create a scheduler on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Create a scheduler that spawns its timers on `runtime`.
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.timers.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: Callback) -> TimerId {
        let id = TimerId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let timers = Arc::clone(&self.timers);

        // Hold the map while spawning so a zero delay cannot fire before
        // the handle is registered.
        let mut guard = self.timers.lock();
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_pending = timers.lock().remove(&id).is_some();
            if still_pending {
                callback();
            }
        });
        guard.insert(id, handle);

        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        match self.timers.lock().remove(&id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.lock().drain() {
            handle.abort();
        }
    }
}
