// ABOUTME: Defines the Scheduler and Clock traits - deferred callbacks that can
// ABOUTME: be cancelled by token, and the time source the coordinator reads.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token identifying one scheduled callback.
///
/// Serialized as a bare integer, which is how liveness pings carry it to
/// embedded frames and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(u64);

impl TimerId {
    /// Wrap a raw token.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw token.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A deferred callback.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Schedules callbacks after a delay and cancels them by token.
pub trait Scheduler: Send + Sync {
    /// Run `callback` once after `delay`.
    fn schedule(&self, delay: Duration, callback: Callback) -> TimerId;

    /// Cancel a pending callback.
    ///
    /// Returns `true` if the callback was still pending. Cancelling an
    /// unknown or already-fired token is a no-op that returns `false`.
    fn cancel(&self, id: TimerId) -> bool;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
