//! Animator run state
//!
//! Plain values describing one activation of the edit animation. A run
//! is created when the session enters the Edit stage and is replaced,
//! never mutated in place, on every tick.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalog::AnimationPhase;

// ============================================================================
// Configuration
// ============================================================================

/// Default progress gained per tick, in percentage points.
pub const DEFAULT_PROGRESS_INCREMENT: f64 = 1.5;

/// Default probability that a tick emits a marker.
pub const DEFAULT_MARKER_PROBABILITY: f64 = 0.3;

/// Default marker lifetime in milliseconds.
pub const DEFAULT_MARKER_TTL_MS: u64 = 2000;

/// Default host tick cadence in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 80;

/// Tunables for the edit animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Progress gained per tick, in percentage points
    pub progress_increment: f64,
    /// Probability in `0.0..=1.0` that a tick emits a marker
    pub marker_probability: f64,
    /// How long a marker stays live after emission
    pub marker_ttl_ms: u64,
    /// Cadence at which the host calls `tick()`
    pub tick_interval_ms: u64,
    /// Seed for the marker pseudo-random source
    pub seed: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            progress_increment: DEFAULT_PROGRESS_INCREMENT,
            marker_probability: DEFAULT_MARKER_PROBABILITY,
            marker_ttl_ms: DEFAULT_MARKER_TTL_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: 0,
        }
    }
}

impl AnimatorConfig {
    /// Marker lifetime as a [`Duration`].
    #[must_use]
    pub const fn marker_ttl(&self) -> Duration {
        Duration::from_millis(self.marker_ttl_ms)
    }

    /// Host tick cadence as a [`Duration`].
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

// ============================================================================
// Run identity
// ============================================================================

/// Identifies one animator activation.
///
/// Host callbacks carry the id of the run they were scheduled for, so a
/// callback that outlives its run can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

// ============================================================================
// Markers
// ============================================================================

/// Ephemeral, effect-free visual event token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    /// Sequence number within the run, starting at 0
    pub id: u64,
    /// Simulated time since the run started at which the marker appeared
    #[serde(with = "duration_ms")]
    pub emitted_at: Duration,
    /// Decorative position in `0.0..1.0`
    pub offset: f64,
}

impl Marker {
    /// Simulated time at which the marker must be removed.
    #[must_use]
    pub fn expires_at(&self, ttl: Duration) -> Duration {
        self.emitted_at.saturating_add(ttl)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Seeded pseudo-random source scoped to one run.
///
/// Two sources are equal when they share a seed and have produced the
/// same number of draws, which pins their internal state.
#[derive(Clone)]
pub struct MarkerSource {
    seed: u64,
    draws: u64,
    rng: StdRng,
}

impl MarkerSource {
    /// Creates a source for the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Derives the source for a run from the session seed.
    #[must_use]
    pub fn for_run(session_seed: u64, run: RunId) -> Self {
        Self::new(session_seed ^ run.0.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Draws a uniform value in `0.0..1.0`.
    pub fn next_unit(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }

    /// Seed the source was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl PartialEq for MarkerSource {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed && self.draws == other.draws
    }
}

impl fmt::Debug for MarkerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerSource")
            .field("seed", &self.seed)
            .field("draws", &self.draws)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Run
// ============================================================================

/// State of one animator activation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorRun {
    pub(crate) run_id: RunId,
    pub(crate) progress: f64,
    pub(crate) phase: u8,
    pub(crate) ticks: u32,
    pub(crate) clock: Duration,
    pub(crate) markers: VecDeque<Marker>,
    pub(crate) next_marker_id: u64,
    pub(crate) expired: u64,
    pub(crate) completed: bool,
    pub(crate) source: MarkerSource,
}

impl AnimatorRun {
    /// Starts a fresh run at progress 0, phase 0, with no markers.
    #[must_use]
    pub fn start(run_id: RunId, session_seed: u64) -> Self {
        Self {
            run_id,
            progress: 0.0,
            phase: 0,
            ticks: 0,
            clock: Duration::ZERO,
            markers: VecDeque::new(),
            next_marker_id: 0,
            expired: 0,
            completed: false,
            source: MarkerSource::for_run(session_seed, run_id),
        }
    }

    /// Identity of this run.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Progress percentage in `0.0..=100.0`.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Phase index in `0..=5`.
    #[must_use]
    pub const fn phase_index(&self) -> u8 {
        self.phase
    }

    /// Current animation phase.
    #[must_use]
    pub const fn phase(&self) -> AnimationPhase {
        AnimationPhase::from_index(self.phase)
    }

    /// Number of ticks applied since the run started.
    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Simulated time elapsed since the run started.
    #[must_use]
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    /// Live markers, oldest first.
    #[must_use]
    pub const fn markers(&self) -> &VecDeque<Marker> {
        &self.markers
    }

    /// Total markers emitted by this run.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.next_marker_id
    }

    /// Total markers removed by expiry.
    #[must_use]
    pub const fn expired(&self) -> u64 {
        self.expired
    }

    /// Whether progress has reached 100 and completion was signalled.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Simulated time at which the oldest live marker expires.
    #[must_use]
    pub fn next_expiry(&self, ttl: Duration) -> Option<Duration> {
        self.markers.front().map(|m| m.expires_at(ttl))
    }

    /// Marker pseudo-random source.
    #[must_use]
    pub const fn source(&self) -> &MarkerSource {
        &self.source
    }
}
