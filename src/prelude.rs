// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use frameboard::prelude::*;` to get started quickly.

pub use crate::app::{AppPatch, ApplicationRecord, Timestamp, Version, merge, reload_url};
pub use crate::channel::{Channel, FrameMessage, MemoryChannel, PingMessage, Posted, origin_of};
pub use crate::client::{AppSource, ClientConfig, DashboardClient};
pub use crate::coordinator::{Coordinator, CoordinatorBuilder, CoordinatorConfig, PollStatus};
pub use crate::error::{ConfigError, FetchError, FrameboardError, SetupError};
pub use crate::notify::{
    FanoutNotifier, HistoryNotifier, Notice, Notifier, TracingNotifier, APP_TOPIC, POLL_TOPIC,
};
pub use crate::surface::{
    Container, Frame, MemoryContainer, MemoryFrame, MemorySurface, Mount, Surface,
};
pub use crate::timer::{Callback, Clock, ManualScheduler, Scheduler, SystemClock, TimerId, TokioScheduler};
