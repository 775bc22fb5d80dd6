//! Tick scheduler
//!
//! Hosts the edit animation on the tokio runtime. Every cadence it moves
//! the run's simulated clock forward and applies one tick, addressing both
//! to the run that was current when scheduling began. Once progress
//! completes it keeps advancing the clock until the last marker expires.
//!
//! The controller is shared behind a mutex that is never held across an
//! await point, so another task may reset or restart the session at any
//! time; the scheduler then sees its run go stale and stops.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::animator::{RunId, TickOutcome};
use crate::catalog::AnimationPhase;
use crate::session::{StageController, Stage};

/// Controller shared between the scheduler and whoever drives the session.
pub type SharedController = Arc<Mutex<StageController>>;

/// Wraps a controller for sharing with the scheduler.
#[must_use]
pub fn share(controller: StageController) -> SharedController {
    Arc::new(Mutex::new(controller))
}

fn lock(controller: &SharedController) -> MutexGuard<'_, StageController> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How the scheduler paces the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Interval between ticks, also the simulated clock step per tick.
    pub cadence: Duration,
    /// Skip real sleeping and run the simulated timeline as fast as possible.
    pub fast: bool,
}

impl ScheduleOptions {
    /// Real-time pacing at `cadence`.
    #[must_use]
    pub const fn paced(cadence: Duration) -> Self {
        Self {
            cadence,
            fast: false,
        }
    }
}

/// Progress notification sent while a run is hosted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerUpdate {
    /// A tick landed.
    Tick {
        /// Run the tick was applied to
        run: RunId,
        /// Progress after the tick
        progress: f64,
        /// Phase after the tick
        phase: AnimationPhase,
        /// Whether the tick entered a new phase
        phase_changed: bool,
        /// Live markers after the tick
        markers: usize,
    },
    /// Markers expired on a clock update.
    MarkersExpired {
        /// Run whose markers expired
        run: RunId,
        /// How many expired
        count: usize,
        /// Live markers remaining
        remaining: usize,
    },
    /// Progress reached 100.
    Completed {
        /// Completed run
        run: RunId,
    },
}

/// Why hosting ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The session was not in Edit when hosting began.
    NotEditing,
    /// The run completed and all its markers expired.
    Completed(RunId),
    /// Another run replaced this one, or the session was reset.
    Superseded(RunId),
    /// The cancellation token fired.
    Cancelled(RunId),
}

/// Hosts the animation of the current edit run.
#[derive(Debug)]
pub struct EditScheduler {
    controller: SharedController,
    cancel: CancellationToken,
    updates: Option<mpsc::UnboundedSender<SchedulerUpdate>>,
}

impl EditScheduler {
    /// Creates a scheduler over a shared controller.
    #[must_use]
    pub const fn new(controller: SharedController, cancel: CancellationToken) -> Self {
        Self {
            controller,
            cancel,
            updates: None,
        }
    }

    /// Sends progress notifications to `updates`.
    #[must_use]
    pub fn with_updates(mut self, updates: mpsc::UnboundedSender<SchedulerUpdate>) -> Self {
        self.updates = Some(updates);
        self
    }

    /// Stops hosting at the next opportunity.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Drives the current run until it completes and its markers drain,
    /// it goes stale, or hosting is cancelled.
    pub async fn run(&self, options: ScheduleOptions) -> RunEnd {
        let Some(run) = self.current_edit_run() else {
            debug!("no edit in progress, nothing to schedule");
            return RunEnd::NotEditing;
        };
        info!(%run, cadence_ms = options.cadence.as_millis(), fast = options.fast, "hosting edit run");

        let mut interval = tokio::time::interval_at(Instant::now() + options.cadence, options.cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if options.fast {
                if self.cancel.is_cancelled() {
                    return RunEnd::Cancelled(run);
                }
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    () = self.cancel.cancelled() => return RunEnd::Cancelled(run),
                    _ = interval.tick() => {}
                }
            }

            match self.step(run, options.cadence) {
                Step::Continue => {}
                Step::Completed => break,
                Step::Stale => return RunEnd::Superseded(run),
            }
        }

        self.drain(run, options).await
    }

    /// Spawns [`EditScheduler::run`] onto the runtime.
    pub fn spawn(self, options: ScheduleOptions) -> tokio::task::JoinHandle<RunEnd> {
        tokio::spawn(async move { self.run(options).await })
    }

    fn current_edit_run(&self) -> Option<RunId> {
        let ctl = lock(&self.controller);
        let session = ctl.session();
        (session.stage() == Stage::Edit)
            .then(|| session.run_id())
            .flatten()
    }

    fn step(&self, run: RunId, cadence: Duration) -> Step {
        let mut ctl = lock(&self.controller);
        if ctl.session().run_id() != Some(run) {
            debug!(%run, "run superseded");
            return Step::Stale;
        }

        let expired = ctl.elapse_run(run, cadence);
        if !expired.is_empty() {
            self.send(SchedulerUpdate::MarkersExpired {
                run,
                count: expired.len(),
                remaining: ctl.session().marker_count(),
            });
        }

        match ctl.tick_run(run) {
            Some(TickOutcome::Advanced(report)) => {
                self.send(SchedulerUpdate::Tick {
                    run,
                    progress: report.progress,
                    phase: report.phase,
                    phase_changed: report.phase_changed,
                    markers: ctl.session().marker_count(),
                });
                Step::Continue
            }
            Some(TickOutcome::Completed(report)) => {
                self.send(SchedulerUpdate::Tick {
                    run,
                    progress: report.progress,
                    phase: report.phase,
                    phase_changed: report.phase_changed,
                    markers: ctl.session().marker_count(),
                });
                self.send(SchedulerUpdate::Completed { run });
                Step::Completed
            }
            Some(TickOutcome::Idle) | None => Step::Completed,
        }
    }

    /// Advances the clock to each pending expiry in turn.
    async fn drain(&self, run: RunId, options: ScheduleOptions) -> RunEnd {
        loop {
            let wait = {
                let ctl = lock(&self.controller);
                if ctl.session().run_id() != Some(run) {
                    return RunEnd::Superseded(run);
                }
                let ttl = ctl.animator_config().marker_ttl();
                let Some(animation) = ctl.session().animation() else {
                    return RunEnd::Superseded(run);
                };
                match animation.next_expiry(ttl) {
                    Some(at) => at.saturating_sub(animation.clock()),
                    None => break,
                }
            };

            if options.fast {
                if self.cancel.is_cancelled() {
                    return RunEnd::Cancelled(run);
                }
            } else {
                tokio::select! {
                    () = self.cancel.cancelled() => return RunEnd::Cancelled(run),
                    () = tokio::time::sleep(wait) => {}
                }
            }

            let mut ctl = lock(&self.controller);
            let expired = ctl.elapse_run(run, wait);
            if !expired.is_empty() {
                self.send(SchedulerUpdate::MarkersExpired {
                    run,
                    count: expired.len(),
                    remaining: ctl.session().marker_count(),
                });
            }
        }

        debug!(%run, "markers drained");
        RunEnd::Completed(run)
    }

    fn send(&self, update: SchedulerUpdate) {
        if let Some(tx) = &self.updates {
            let _ = tx.send(update);
        }
    }
}

enum Step {
    Continue,
    Completed,
    Stale,
}
