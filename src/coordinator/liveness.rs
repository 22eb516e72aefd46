// ABOUTME: Liveness handshake - ping a frame after it loads, mark it unresponsive
// ABOUTME: if no reply cancels the timeout, and apply the replies that come back.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use super::Coordinator;
use crate::channel::{FrameMessage, PingMessage, origin_of};
use crate::notify::Notice;
use crate::timer::TimerId;

impl Coordinator {
    /// Handle a frame's load-completion event by sending it a liveness ping.
    ///
    /// Any ping still pending for `id` is cancelled first, so each
    /// application has at most one armed timeout. If the frame does not
    /// answer within the liveness timeout, the application is marked
    /// unresponsive. The timeout stays armed even when the ping cannot be
    /// delivered.
    ///
    /// Returns the timeout token, or `None` for untracked ids.
    pub fn frame_loaded(&self, id: &str) -> Option<TimerId> {
        let weak = Arc::downgrade(&self.inner);

        let (timer, frame) = {
            let mut state = self.inner.state.lock();
            let Some(tracked) = state.apps.get_mut(id) else {
                warn!(app_id = %id, "load event for untracked application");
                return None;
            };

            if let Some(previous) = tracked.pending_ping.take() {
                self.inner.scheduler.cancel(previous);
            }

            let app_id = id.to_string();
            let timer = self.inner.scheduler.schedule(
                self.inner.config.liveness_timeout(),
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        Coordinator::from_inner(inner).expire_ping(&app_id);
                    }
                }),
            );
            tracked.pending_ping = Some(timer);
            (timer, Arc::clone(&tracked.mount.frame))
        };

        let src = frame.src();
        let Some(origin) = origin_of(&src) else {
            warn!(app_id = %id, src = %src, "frame address has no origin, liveness ping not sent");
            return Some(timer);
        };

        debug!(app_id = %id, timer_id = %timer, origin = %origin, "pinging frame");
        let ping = PingMessage { timeout_id: timer };
        if let Err(e) = self.inner.channel.post(id, &origin, &ping) {
            warn!(app_id = %id, error = %e, "failed to send liveness ping");
        }

        Some(timer)
    }

    /// Apply a message from an embedded frame.
    ///
    /// A `timeoutID` cancels that liveness timeout; unknown or already
    /// fired tokens are ignored. An `app` payload is merged as with
    /// [`Coordinator::update`].
    pub fn handle_message(&self, message: FrameMessage) {
        if let Some(timer) = message.timeout_id {
            let cancelled = self.inner.scheduler.cancel(timer);
            {
                let mut state = self.inner.state.lock();
                for tracked in state.apps.values_mut() {
                    if tracked.pending_ping == Some(timer) {
                        tracked.pending_ping = None;
                    }
                }
            }
            debug!(timer_id = %timer, cancelled, "liveness reply received");
        }

        if let Some(app) = message.app {
            self.update(app);
        }
    }

    /// Apply a raw JSON message.
    ///
    /// Non-object payloads are dropped. Otherwise the liveness reply and
    /// the state report are decoded independently and each applied if valid.
    pub fn handle_raw_message(&self, message: &serde_json::Value) {
        match FrameMessage::from_value(message) {
            Some(message) => self.handle_message(message),
            None => debug!("ignoring frame message that is not an object"),
        }
    }

    /// Apply every message from `messages` until the stream ends.
    pub async fn listen<S>(&self, messages: S)
    where
        S: Stream<Item = FrameMessage>,
    {
        futures::pin_mut!(messages);
        while let Some(message) = messages.next().await {
            self.handle_message(message);
        }
        debug!("frame message stream closed");
    }

    /// Liveness timeout callback: mark `id` unresponsive.
    fn expire_ping(&self, id: &str) {
        let (container, notice) = {
            let mut state = self.inner.state.lock();
            let Some(tracked) = state.apps.get_mut(id) else {
                return;
            };
            tracked.pending_ping = None;
            tracked.error = true;
            let notice = Notice::Unresponsive {
                id: tracked.record.id.clone(),
                title: tracked.record.title.clone(),
            };
            (Arc::clone(&tracked.mount.container), notice)
        };
        container.set_error(true);
        self.inner.notifier.notify(notice);
    }
}
