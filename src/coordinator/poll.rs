// ABOUTME: Convergence poller - after a fleet deployment, reload every frame on a
// ABOUTME: fixed interval until all apps report the target version or a watchdog fires.

use std::sync::Arc;

use tracing::{debug, info};

use super::Coordinator;
use crate::app::{Version, reload_url};
use crate::notify::Notice;
use crate::surface::Frame;
use crate::timer::TimerId;

/// Whether a convergence poll is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Inactive,
    Active,
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollStatus::Inactive => write!(f, "inactive"),
            PollStatus::Active => write!(f, "active"),
        }
    }
}

pub(super) struct ActivePoll {
    target: Version,
    /// Distinguishes this poll from earlier ones whose timers may still fire.
    generation: u64,
    iteration: u32,
    watchdog: TimerId,
    tick: Option<TimerId>,
}

pub(super) enum PollState {
    Inactive,
    Active(ActivePoll),
}

enum TickOutcome {
    Converged(Version),
    Progress {
        target: Version,
        iteration: u32,
        pending: Vec<String>,
        frames: Vec<Arc<dyn Frame>>,
    },
}

impl Coordinator {
    /// Reload the fleet until every application reports `target`.
    ///
    /// The first pass runs immediately. Each pass that finds an application
    /// on another version reloads every frame and waits the poll interval
    /// before checking again. The poll ends on convergence, or when the
    /// watchdog armed here fires, whichever comes first.
    ///
    /// Returns `false` without side effects if a poll is already running.
    pub fn start_poll(&self, target: impl Into<Version>) -> bool {
        let target = target.into();

        let generation = {
            let mut state = self.inner.state.lock();
            if let PollState::Active(active) = &state.poll {
                debug!(
                    version = %active.target,
                    requested = %target,
                    "application poll already in progress"
                );
                return false;
            }

            state.next_generation += 1;
            let generation = state.next_generation;

            let weak = Arc::downgrade(&self.inner);
            let watchdog = self.inner.scheduler.schedule(
                self.inner.config.poll_watchdog(),
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        Coordinator::from_inner(inner).expire_poll(generation);
                    }
                }),
            );

            state.poll = PollState::Active(ActivePoll {
                target: target.clone(),
                generation,
                iteration: 0,
                watchdog,
                tick: None,
            });
            generation
        };

        info!(version = %target, "starting application poll");
        self.inner
            .notifier
            .notify(Notice::PollStarted { version: target });
        self.poll_tick(generation);
        true
    }

    /// Whether a convergence poll is running.
    pub fn poll_status(&self) -> PollStatus {
        match self.inner.state.lock().poll {
            PollState::Inactive => PollStatus::Inactive,
            PollState::Active(_) => PollStatus::Active,
        }
    }

    /// The version the running poll is waiting for.
    pub fn poll_target(&self) -> Option<Version> {
        match &self.inner.state.lock().poll {
            PollState::Inactive => None,
            PollState::Active(active) => Some(active.target.clone()),
        }
    }

    /// One pass of the poll loop.
    fn poll_tick(&self, generation: u64) {
        let now = self.inner.clock.now();

        let outcome = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;

            let active = match &mut state.poll {
                PollState::Active(active) if active.generation == generation => active,
                _ => return,
            };
            active.tick = None;

            let pending: Vec<String> = state
                .order
                .iter()
                .filter(|id| {
                    state
                        .apps
                        .get(*id)
                        .is_some_and(|t| t.record.version.as_ref() != Some(&active.target))
                })
                .cloned()
                .collect();

            if pending.is_empty() {
                let target = active.target.clone();
                self.inner.scheduler.cancel(active.watchdog);
                state.poll = PollState::Inactive;
                TickOutcome::Converged(target)
            } else {
                // Every frame reloads, not only the stale ones: a reload is
                // what prompts an application to report its version again.
                let frames = state
                    .order
                    .iter()
                    .filter_map(|id| state.apps.get(id))
                    .map(|tracked| Arc::clone(&tracked.mount.frame))
                    .collect();

                active.iteration += 1;
                let weak = Arc::downgrade(&self.inner);
                active.tick = Some(self.inner.scheduler.schedule(
                    self.inner.config.poll_interval(),
                    Box::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            Coordinator::from_inner(inner).poll_tick(generation);
                        }
                    }),
                ));

                TickOutcome::Progress {
                    target: active.target.clone(),
                    iteration: active.iteration,
                    pending,
                    frames,
                }
            }
        };

        match outcome {
            TickOutcome::Converged(version) => {
                info!(version = %version, "poll converged");
                self.inner.notifier.notify(Notice::PollConverged { version });
            }
            TickOutcome::Progress {
                target,
                iteration,
                pending,
                frames,
            } => {
                for frame in &frames {
                    frame.set_src(&reload_url(&frame.src(), now));
                }
                info!(version = %target, iteration, pending = pending.len(), "reloaded all frames");
                self.inner.notifier.notify(Notice::PollProgress {
                    version: target,
                    iteration,
                    pending,
                });
            }
        }
    }

    /// Watchdog callback: stop poll `generation` if it is still running.
    fn expire_poll(&self, generation: u64) {
        let target = {
            let mut state = self.inner.state.lock();
            let active = match std::mem::replace(&mut state.poll, PollState::Inactive) {
                PollState::Active(active) if active.generation == generation => active,
                other => {
                    state.poll = other;
                    return;
                }
            };
            if let Some(tick) = active.tick {
                self.inner.scheduler.cancel(tick);
            }
            active.target
        };

        info!(version = %target, "poll watchdog fired");
        self.inner
            .notifier
            .notify(Notice::PollExpired { version: target });
    }
}
