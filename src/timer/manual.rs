// ABOUTME: Virtual-clock scheduler - time only moves when advance() is called,
// ABOUTME: firing due callbacks in deadline order. Used to drive tests.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::{Callback, Clock, Scheduler, TimerId};

struct ManualState {
    elapsed: Duration,
    next_id: u64,
    timers: BTreeMap<(Duration, TimerId), Callback>,
}

/// A scheduler and clock driven by hand.
///
/// Callbacks run on the thread that calls [`ManualScheduler::advance`],
/// with the scheduler unlocked, so a callback may schedule or cancel
/// further timers. Timers due at the same instant fire in scheduling order.
pub struct ManualScheduler {
    origin: DateTime<Utc>,
    state: Mutex<ManualState>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    /// Create a scheduler whose clock starts at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Create a scheduler whose clock starts at `origin`.
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            state: Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                next_id: 1,
                timers: BTreeMap::new(),
            }),
        }
    }

    /// Virtual time elapsed since the origin.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.state.lock().timers.len()
    }

    /// Move the clock forward by `by`, firing every timer that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.state.lock().elapsed + by;

        loop {
            let callback = {
                let mut state = self.state.lock();
                let key = match state.timers.keys().next() {
                    Some(key) if key.0 <= target => *key,
                    _ => break,
                };
                state.elapsed = key.0;
                state.timers.remove(&key)
            };
            if let Some(callback) = callback {
                callback();
            }
        }

        self.state.lock().elapsed = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: Callback) -> TimerId {
        let mut state = self.state.lock();
        let id = TimerId::new(state.next_id);
        state.next_id += 1;
        let due = state.elapsed + delay;
        state.timers.insert((due, id), callback);
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut state = self.state.lock();
        let key = state.timers.keys().find(|(_, tid)| *tid == id).copied();
        match key {
            Some(key) => state.timers.remove(&key).is_some(),
            None => false,
        }
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.state.lock().elapsed;
        self.origin + chrono::Duration::milliseconds(elapsed.as_millis() as i64)
    }
}
