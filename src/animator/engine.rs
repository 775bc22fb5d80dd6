//! Pure animation step functions
//!
//! [`advance`] applies one host tick to a run and [`elapse`] moves the
//! run's simulated clock, expiring markers. Neither touches wall-clock
//! time, so a test can replay an entire edit by calling them in a loop.

use std::time::Duration;

use tracing::{debug, trace};

use crate::catalog::AnimationPhase;

use super::state::{AnimatorConfig, AnimatorRun, Marker};

/// Highest phase index.
const LAST_PHASE: u8 = AnimationPhase::COUNT - 1;

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Progress after the tick
    pub progress: f64,
    /// Phase after the tick
    pub phase: AnimationPhase,
    /// Whether the tick moved the run into a new phase
    pub phase_changed: bool,
    /// Marker emitted on this tick, if any
    pub marker: Option<Marker>,
}

/// Result of applying a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The run had already completed; nothing changed.
    Idle,
    /// Progress moved but has not reached 100.
    Advanced(TickReport),
    /// Progress reached 100 on this tick. Emitted once per run.
    Completed(TickReport),
}

/// Maps progress to a phase index: `floor(progress / 100 × 6)` in `0..=5`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn phase_for(progress: f64) -> u8 {
    let raw = (progress.clamp(0.0, 100.0) / 100.0 * f64::from(AnimationPhase::COUNT)).floor();
    (raw as u8).min(LAST_PHASE)
}

/// Applies one tick to `run`.
///
/// Progress grows by the configured increment and is clamped at 100.
/// The phase is derived from the new progress and never moves backwards.
/// A marker is emitted with the configured probability, stamped with the
/// run's current simulated clock. Once the run has completed every
/// further call returns [`TickOutcome::Idle`] and the run unchanged.
#[must_use]
pub fn advance(run: &AnimatorRun, config: &AnimatorConfig) -> (AnimatorRun, TickOutcome) {
    if run.completed {
        return (run.clone(), TickOutcome::Idle);
    }

    let mut next = run.clone();
    next.ticks = next.ticks.saturating_add(1);
    next.progress = (next.progress + config.progress_increment).min(100.0);

    let phase = phase_for(next.progress).max(run.phase);
    next.phase = phase;

    let marker = if next.source.next_unit() < config.marker_probability {
        let marker = Marker {
            id: next.next_marker_id,
            emitted_at: next.clock,
            offset: next.source.next_unit(),
        };
        next.next_marker_id += 1;
        next.markers.push_back(marker);
        trace!(run = %next.run_id, marker = marker.id, "marker emitted");
        Some(marker)
    } else {
        None
    };

    let report = TickReport {
        progress: next.progress,
        phase: AnimationPhase::from_index(phase),
        phase_changed: phase != run.phase,
        marker,
    };

    if next.progress >= 100.0 {
        next.phase = LAST_PHASE;
        next.completed = true;
        debug!(run = %next.run_id, ticks = next.ticks, "animation complete");
        let report = TickReport {
            phase: AnimationPhase::Repair,
            phase_changed: run.phase != LAST_PHASE,
            ..report
        };
        return (next, TickOutcome::Completed(report));
    }

    (next, TickOutcome::Advanced(report))
}

/// Advances the run's simulated clock by `delta` and removes every marker
/// whose lifetime has run out, oldest first.
///
/// Returns the updated run and the markers that expired.
#[must_use]
pub fn elapse(
    run: &AnimatorRun,
    delta: Duration,
    config: &AnimatorConfig,
) -> (AnimatorRun, Vec<Marker>) {
    let mut next = run.clone();
    next.clock = next.clock.saturating_add(delta);

    let ttl = config.marker_ttl();
    let mut expired = Vec::new();
    while let Some(front) = next.markers.front() {
        if front.expires_at(ttl) > next.clock {
            break;
        }
        if let Some(marker) = next.markers.pop_front() {
            expired.push(marker);
        }
    }
    next.expired += expired.len() as u64;

    (next, expired)
}
