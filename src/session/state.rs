//! Session value
//!
//! The whole of a user's progress through the lab lives in one
//! [`Session`] value. Transitions never mutate a session; they build the
//! next one and the controller swaps it in.

use std::fmt;

use serde::Serialize;

use crate::animator::{AnimatorRun, Marker, RunId};
use crate::catalog::{AnimationPhase, Metrics};
use crate::risk::RiskPrompt;

/// Top-level stage of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Choosing a trait from the catalog
    #[default]
    Select,
    /// Reviewing predicted metrics
    Analyze,
    /// Stepping through the mechanism explainer
    Mechanism,
    /// Watching the timed edit
    Edit,
    /// Reading the graded outcome
    Result,
}

impl Stage {
    /// Lowercase stage name, used in logs, events and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Analyze => "analyze",
            Self::Mechanism => "mechanism",
            Self::Edit => "edit",
            Self::Result => "result",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of one user's session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub(crate) stage: Stage,
    pub(crate) trait_id: Option<String>,
    pub(crate) metrics: Metrics,
    pub(crate) mechanism_step: usize,
    pub(crate) pending_confirmation: Option<RiskPrompt>,
    pub(crate) risk_acknowledged: bool,
    pub(crate) animation: Option<AnimatorRun>,
}

impl Session {
    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Selected trait id.
    #[must_use]
    pub fn trait_id(&self) -> Option<&str> {
        self.trait_id.as_deref()
    }

    /// Metrics copied from the selected trait (all zero before selection).
    #[must_use]
    pub const fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Current page of the mechanism explainer.
    #[must_use]
    pub const fn mechanism_step(&self) -> usize {
        self.mechanism_step
    }

    /// The risk prompt awaiting a proceed/redesign decision, if any.
    #[must_use]
    pub const fn pending_confirmation(&self) -> Option<&RiskPrompt> {
        self.pending_confirmation.as_ref()
    }

    /// Whether the user chose to proceed despite the risk prompt for the
    /// current trait selection.
    #[must_use]
    pub const fn risk_acknowledged(&self) -> bool {
        self.risk_acknowledged
    }

    /// Animator run, present from entering Edit until reset.
    #[must_use]
    pub const fn animation(&self) -> Option<&AnimatorRun> {
        self.animation.as_ref()
    }

    /// Id of the current animator run.
    #[must_use]
    pub fn run_id(&self) -> Option<RunId> {
        self.animation.as_ref().map(AnimatorRun::run_id)
    }

    /// Edit progress in percent.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.animation.as_ref().map_or(0.0, AnimatorRun::progress)
    }

    /// Animation phase index in `0..=5`.
    #[must_use]
    pub fn phase_index(&self) -> u8 {
        self.animation.as_ref().map_or(0, AnimatorRun::phase_index)
    }

    /// Animation phase.
    #[must_use]
    pub fn phase(&self) -> AnimationPhase {
        AnimationPhase::from_index(self.phase_index())
    }

    /// Live markers, oldest first.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.animation.iter().flat_map(|run| run.markers().iter())
    }

    /// Number of live markers.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.animation.as_ref().map_or(0, |run| run.markers().len())
    }

    /// Serializable summary of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stage: self.stage,
            trait_id: self.trait_id.clone(),
            metrics: self.metrics,
            mechanism_step: self.mechanism_step,
            progress: self.progress(),
            phase: self.phase_index(),
            phase_name: self.phase().to_string(),
            markers: self.marker_count(),
            pending_confirmation: self.pending_confirmation.is_some(),
            risk_acknowledged: self.risk_acknowledged,
        }
    }
}

/// Flat, serializable view of a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Current stage
    pub stage: Stage,
    /// Selected trait id
    pub trait_id: Option<String>,
    /// Metrics of the selected trait
    pub metrics: Metrics,
    /// Mechanism explainer page
    pub mechanism_step: usize,
    /// Edit progress in percent
    pub progress: f64,
    /// Animation phase index
    pub phase: u8,
    /// Animation phase label
    pub phase_name: String,
    /// Number of live markers
    pub markers: usize,
    /// Whether a risk prompt awaits a decision
    pub pending_confirmation: bool,
    /// Whether the risk prompt was overridden
    pub risk_acknowledged: bool,
}
