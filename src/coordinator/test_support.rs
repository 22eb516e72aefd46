// ABOUTME: Shared fixture for coordinator tests - a coordinator wired to an
// ABOUTME: in-memory surface, channel and notice history on a virtual clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use super::{Coordinator, CoordinatorConfig};
use crate::app::AppPatch;
use crate::channel::MemoryChannel;
use crate::notify::HistoryNotifier;
use crate::surface::{MemoryContainer, MemoryFrame, MemorySurface};
use crate::timer::ManualScheduler;

/// Epoch millis the virtual clock starts at.
pub(super) const START_MS: i64 = 1_600_000_000_000;

pub(super) struct Fixture {
    pub(super) coordinator: Coordinator,
    pub(super) surface: MemorySurface,
    pub(super) channel: Arc<MemoryChannel>,
    pub(super) scheduler: Arc<ManualScheduler>,
    pub(super) history: Arc<HistoryNotifier>,
}

impl Fixture {
    pub(super) fn new(apps: &[(&str, &str)]) -> Self {
        Self::with_config(apps, CoordinatorConfig::default())
    }

    pub(super) fn with_config(apps: &[(&str, &str)], config: CoordinatorConfig) -> Self {
        let surface = MemorySurface::with_apps(apps.iter().map(|(id, _)| *id));
        let channel = Arc::new(MemoryChannel::new());
        let scheduler = Arc::new(ManualScheduler::starting_at(start()));
        let history = Arc::new(HistoryNotifier::new());

        let coordinator = Coordinator::builder(
            Arc::new(surface.clone()),
            channel.clone(),
            scheduler.clone(),
        )
        .clock(scheduler.clone())
        .notifier(history.clone())
        .config(config)
        .apps(apps.iter().map(|(id, version)| app(id, version)))
        .build()
        .unwrap();

        Self {
            coordinator,
            surface,
            channel,
            scheduler,
            history,
        }
    }

    pub(super) fn advance_ms(&self, ms: u64) {
        self.scheduler.advance(Duration::from_millis(ms));
    }

    pub(super) fn container(&self, id: &str) -> Arc<MemoryContainer> {
        self.surface.container(id).unwrap()
    }

    pub(super) fn frame(&self, id: &str) -> Arc<MemoryFrame> {
        self.surface.frame(id).unwrap()
    }

    pub(super) fn loads(&self, id: &str) -> usize {
        self.frame(id).load_count()
    }
}

pub(super) fn start() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(START_MS).unwrap()
}

pub(super) fn app(id: &str, version: &str) -> AppPatch {
    AppPatch::new(id)
        .title(format!("App {}", id))
        .url(format!("https://{}.example.com/", id))
        .version(version)
}
