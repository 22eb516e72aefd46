// ABOUTME: The application coordinator - owns the registry of embedded apps,
// ABOUTME: applies partial updates and reflects them onto the rendering surface.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::CoordinatorConfig;
use super::poll::PollState;
use crate::app::{AppPatch, ApplicationRecord, merge};
use crate::channel::Channel;
use crate::client::AppSource;
use crate::error::{FetchError, SetupError};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::surface::{Frame, Mount, Surface};
use crate::timer::{Clock, Scheduler, SystemClock, TimerId};

/// Registry entry for one embedded application.
pub(super) struct TrackedApp {
    pub(super) record: ApplicationRecord,
    pub(super) mount: Mount,
    pub(super) error: bool,
    pub(super) pending_ping: Option<TimerId>,
}

/// Point `frame` at the record's current version.
fn reload(frame: &dyn Frame, record: &ApplicationRecord) {
    frame.set_name(&record.frame_name());
    frame.set_src(&record.reload_url());
}

/// Mutable coordinator state, guarded by a single lock.
pub(super) struct State {
    pub(super) apps: HashMap<String, TrackedApp>,
    /// Ids in the order the applications were registered.
    pub(super) order: Vec<String>,
    pub(super) poll: PollState,
    pub(super) next_generation: u64,
}

pub(super) struct Inner {
    pub(super) config: CoordinatorConfig,
    pub(super) scheduler: Arc<dyn Scheduler>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) channel: Arc<dyn Channel>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) state: Mutex<State>,
}

/// Coordinates a dashboard of embedded applications.
///
/// The coordinator tracks every application's last reported state, reloads
/// frames whose version changes, checks that frames answer a liveness ping
/// after loading, and can poll the fleet until it converges on a version.
///
/// Cloning is cheap; clones share the same registry. Scheduled callbacks
/// hold only a weak reference, so dropping the last clone disarms them.
#[derive(Clone)]
pub struct Coordinator {
    pub(super) inner: Arc<Inner>,
}

impl Coordinator {
    /// Start building a coordinator.
    pub fn builder(
        surface: Arc<dyn Surface>,
        channel: Arc<dyn Channel>,
        scheduler: Arc<dyn Scheduler>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder::new(surface, channel, scheduler)
    }

    pub(super) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// Merge a partial update into the registry.
    ///
    /// Fields absent from `patch` keep their previous values. The container
    /// shows the merged version and loses any unresponsive indicator. When
    /// the version changed, the frame is reloaded under a new name, the
    /// container gets the new-version marker for the configured window, and
    /// a [`Notice::NewVersion`] is emitted.
    ///
    /// Returns the merged record, or `None` when the patch has no id or
    /// names an application this coordinator does not track.
    pub fn update(&self, patch: AppPatch) -> Option<ApplicationRecord> {
        let Some(id) = patch.id.clone() else {
            warn!("ignoring application update without an id");
            return None;
        };
        let now = self.inner.clock.now();

        let (merged, changed, mount) = {
            let mut state = self.inner.state.lock();
            let Some(tracked) = state.apps.get_mut(&id) else {
                warn!(app_id = %id, "ignoring update for untracked application");
                return None;
            };

            let merged = merge(Some(&tracked.record), patch, now)?;
            let changed = merged.version != tracked.record.version;
            tracked.record = merged.clone();
            tracked.error = false;
            (merged, changed, tracked.mount.clone())
        };

        debug!(app_id = %id, version = ?merged.version, "merged application state");

        // Surface calls happen outside the lock; adapters may call back in.
        let container = mount.container;
        container.set_version(merged.version.as_ref());
        container.set_error(false);

        if changed {
            reload(mount.frame.as_ref(), &merged);
            container.set_new_version_marker(true);
            self.inner.scheduler.schedule(
                self.inner.config.marker_window(),
                Box::new(move || container.set_new_version_marker(false)),
            );
            self.inner.notifier.notify(Notice::NewVersion {
                id: merged.id.clone(),
                title: merged.title.clone(),
                version: merged.version.clone(),
            });
        }

        Some(merged)
    }

    /// Fetch an application's self-reported configuration and merge it.
    ///
    /// The embedded application does not report its own id, so the
    /// coordinator fills it in. Returns `Ok(None)` for untracked ids.
    pub async fn refresh(
        &self,
        id: &str,
        source: &dyn AppSource,
    ) -> Result<Option<ApplicationRecord>, FetchError> {
        let Some(url) = self.get(id).map(|record| record.url) else {
            warn!(app_id = %id, "cannot refresh untracked application");
            return Ok(None);
        };

        let mut patch = source.fetch_app(&url).await?;
        patch.id = Some(id.to_string());
        Ok(self.update(patch))
    }

    /// The current record for `id`.
    pub fn get(&self, id: &str) -> Option<ApplicationRecord> {
        let state = self.inner.state.lock();
        state.apps.get(id).map(|tracked| tracked.record.clone())
    }

    /// All records, in registration order.
    pub fn records(&self) -> Vec<ApplicationRecord> {
        let state = self.inner.state.lock();
        state
            .order
            .iter()
            .filter_map(|id| state.apps.get(id))
            .map(|tracked| tracked.record.clone())
            .collect()
    }

    /// Whether `id` missed its last liveness deadline and has not reported since.
    pub fn is_unresponsive(&self, id: &str) -> Option<bool> {
        let state = self.inner.state.lock();
        state.apps.get(id).map(|tracked| tracked.error)
    }

    /// Number of tracked applications.
    pub fn len(&self) -> usize {
        self.inner.state.lock().apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for [`Coordinator`].
pub struct CoordinatorBuilder {
    surface: Arc<dyn Surface>,
    channel: Arc<dyn Channel>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    config: CoordinatorConfig,
    apps: Vec<AppPatch>,
}

impl CoordinatorBuilder {
    pub fn new(
        surface: Arc<dyn Surface>,
        channel: Arc<dyn Channel>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            surface,
            channel,
            scheduler,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TracingNotifier),
            config: CoordinatorConfig::default(),
            apps: Vec::new(),
        }
    }

    /// Use `clock` instead of wall-clock time.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send notices to `notifier` instead of the log.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Track an application. The patch must carry an id.
    pub fn app(mut self, app: AppPatch) -> Self {
        self.apps.push(app);
        self
    }

    /// Track several applications.
    pub fn apps(mut self, apps: impl IntoIterator<Item = AppPatch>) -> Self {
        self.apps.extend(apps);
        self
    }

    /// Seed the registry and load every frame.
    ///
    /// Fails if an application has no id, is listed twice, or has no
    /// container and frame on the surface.
    pub fn build(self) -> Result<Coordinator, SetupError> {
        let now = self.clock.now();
        let mut apps = HashMap::new();
        let mut order = Vec::new();

        for patch in self.apps {
            let Some(record) = merge(None, patch, now) else {
                return Err(SetupError::MissingId);
            };
            if apps.contains_key(&record.id) {
                return Err(SetupError::DuplicateApp(record.id));
            }
            let Some(mount) = self.surface.mount(&record) else {
                return Err(SetupError::MissingMount(record.id));
            };

            order.push(record.id.clone());
            apps.insert(
                record.id.clone(),
                TrackedApp {
                    record,
                    mount,
                    error: false,
                    pending_ping: None,
                },
            );
        }

        // Nothing is rendered until every application has been validated.
        for tracked in order.iter().filter_map(|id| apps.get(id)) {
            tracked.mount.container.set_version(tracked.record.version.as_ref());
            tracked.mount.container.set_error(false);
            reload(tracked.mount.frame.as_ref(), &tracked.record);
            debug!(app_id = %tracked.record.id, url = %tracked.record.url, "tracking application");
        }

        let inner = Inner {
            config: self.config,
            scheduler: self.scheduler,
            clock: self.clock,
            channel: self.channel,
            notifier: self.notifier,
            state: Mutex::new(State {
                apps,
                order,
                poll: PollState::Inactive,
                next_generation: 0,
            }),
        };
        Ok(Coordinator::from_inner(Arc::new(inner)))
    }
}
