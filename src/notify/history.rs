// ABOUTME: Notifier implementations - one that logs through tracing and one
// ABOUTME: that keeps a bounded per-topic history for late-arriving viewers.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tracing::{info, warn};

use super::{Notice, Notifier};

/// Entries kept per topic by default.
pub const DEFAULT_HISTORY: usize = 80;

/// Logs every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::NewVersion { id, title, version } => {
                let version = version.as_ref().map(ToString::to_string);
                info!(app_id = %id, title = %title, version = ?version, "application updated");
            }
            Notice::Unresponsive { id, title } => {
                warn!(app_id = %id, title = %title, "application unresponsive");
            }
            Notice::PollStarted { version } => {
                info!(version = %version, "polling applications");
            }
            Notice::PollProgress {
                version,
                iteration,
                pending,
            } => {
                info!(version = %version, iteration, pending = ?pending, "still polling applications");
            }
            Notice::PollConverged { version } => {
                info!(version = %version, "all applications updated");
            }
            Notice::PollExpired { version } => {
                warn!(version = %version, "poll watchdog expired before convergence");
            }
        }
    }
}

/// Keeps the most recent notices per topic.
///
/// A topic holds at most `capacity` notices; the oldest is evicted first.
#[derive(Debug)]
pub struct HistoryNotifier {
    capacity: usize,
    topics: Mutex<HashMap<&'static str, VecDeque<Notice>>>,
}

impl Default for HistoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryNotifier {
    /// Create a history keeping [`DEFAULT_HISTORY`] notices per topic.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY)
    }

    /// Create a history keeping `capacity` notices per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Notices recorded for `topic`, oldest first.
    pub fn history(&self, topic: &str) -> Vec<Notice> {
        self.topics
            .lock()
            .get(topic)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All recorded notices, grouped by topic in name order.
    pub fn all(&self) -> Vec<Notice> {
        let topics = self.topics.lock();
        let mut names: Vec<_> = topics.keys().copied().collect();
        names.sort_unstable();
        names
            .into_iter()
            .flat_map(|name| topics[name].iter().cloned())
            .collect()
    }

    /// Drop every recorded notice.
    pub fn purge(&self) {
        info!("purging notice history");
        for queue in self.topics.lock().values_mut() {
            queue.clear();
        }
    }
}

impl Notifier for HistoryNotifier {
    fn notify(&self, notice: Notice) {
        if self.capacity == 0 {
            return;
        }
        let mut topics = self.topics.lock();
        let queue = topics.entry(notice.topic()).or_default();
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(notice);
    }
}
