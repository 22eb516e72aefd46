// ABOUTME: Defines Notice - state changes the coordinator reports to the
// ABOUTME: presentation layer - and the Notifier trait that receives them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::app::Version;

/// Topic for notices about a single application.
pub const APP_TOPIC: &str = "app";

/// Topic for notices about the convergence poll.
pub const POLL_TOPIC: &str = "poll";

/// A state change worth showing to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// An application reported a version different from its previous one.
    NewVersion {
        id: String,
        title: String,
        version: Option<Version>,
    },

    /// An application did not answer a liveness ping in time.
    Unresponsive { id: String, title: String },

    /// A convergence poll started.
    PollStarted { version: Version },

    /// A poll iteration reloaded every frame; `pending` lists the
    /// applications not yet on the target version.
    PollProgress {
        version: Version,
        iteration: u32,
        pending: Vec<String>,
    },

    /// Every application reports the target version.
    PollConverged { version: Version },

    /// The poll watchdog stopped the loop before convergence.
    PollExpired { version: Version },
}

impl Notice {
    /// The history topic this notice belongs to.
    pub fn topic(&self) -> &'static str {
        match self {
            Notice::NewVersion { .. } | Notice::Unresponsive { .. } => APP_TOPIC,
            _ => POLL_TOPIC,
        }
    }
}

/// Receives notices from the coordinator.
///
/// Called with no coordinator locks held, so implementations may call back
/// into the coordinator.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards each notice to several notifiers in order.
#[derive(Default, Clone)]
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target.
    pub fn with(mut self, target: Arc<dyn Notifier>) -> Self {
        self.targets.push(target);
        self
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notice: Notice) {
        if let Some((last, rest)) = self.targets.split_last() {
            for target in rest {
                target.notify(notice.clone());
            }
            last.notify(notice);
        }
    }
}
