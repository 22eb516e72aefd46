// ABOUTME: Defines the Channel trait for host-to-frame messaging, and an
// ABOUTME: in-memory channel that records what was sent.

use parking_lot::Mutex;

use super::PingMessage;

/// Delivers messages from the host to an embedded frame.
pub trait Channel: Send + Sync {
    /// Send `message` to the frame of `app_id`, scoped to `origin`.
    ///
    /// Implementations must not deliver to any other origin.
    fn post(&self, app_id: &str, origin: &str, message: &PingMessage) -> Result<(), anyhow::Error>;
}

/// A message captured by [`MemoryChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub app_id: String,
    pub origin: String,
    pub message: PingMessage,
}

/// Channel that stores outbound messages instead of delivering them.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    sent: Mutex<Vec<Posted>>,
    failure: Mutex<Option<String>>,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message posted so far, oldest first.
    pub fn sent(&self) -> Vec<Posted> {
        self.sent.lock().clone()
    }

    /// The most recent message posted to `app_id`.
    pub fn last_for(&self, app_id: &str) -> Option<Posted> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|p| p.app_id == app_id)
            .cloned()
    }

    /// Make every following post fail with `reason`, or succeed again with `None`.
    pub fn fail_with(&self, reason: Option<&str>) {
        *self.failure.lock() = reason.map(str::to_string);
    }
}

impl Channel for MemoryChannel {
    fn post(&self, app_id: &str, origin: &str, message: &PingMessage) -> Result<(), anyhow::Error> {
        if let Some(reason) = self.failure.lock().as_ref() {
            return Err(anyhow::anyhow!("{}", reason));
        }
        self.sent.lock().push(Posted {
            app_id: app_id.to_string(),
            origin: origin.to_string(),
            message: *message,
        });
        Ok(())
    }
}
