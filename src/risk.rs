//! Risk gate
//!
//! Decides whether an edit may start without an explicit confirmation.
//! The gate is a pure function of the two risk metrics; the stage
//! controller turns a [`GateDecision::Blocked`] into a [`RiskPrompt`].

use serde::{Deserialize, Serialize};

use crate::catalog::Metrics;

/// Default off-target risk ceiling, in percent.
pub const DEFAULT_MAX_OFF_TARGET: u8 = 20;

/// Default mutation rate ceiling, in percent.
pub const DEFAULT_MAX_MUTATION_RATE: u8 = 15;

/// Thresholds above which an edit needs confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Off-target risk strictly above this blocks the edit
    pub max_off_target: u8,
    /// Mutation rate strictly above this blocks the edit
    pub max_mutation_rate: u8,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            max_off_target: DEFAULT_MAX_OFF_TARGET,
            max_mutation_rate: DEFAULT_MAX_MUTATION_RATE,
        }
    }
}

/// Outcome of consulting the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// The edit may start straight away.
    Allowed,
    /// The edit needs an explicit proceed/redesign decision.
    Blocked,
}

/// Which thresholds a blocked edit exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskPrompt {
    /// Off-target risk of the selected trait
    pub off_target_risk: u8,
    /// Mutation rate of the selected trait
    pub mutation_rate: u8,
    /// Whether the off-target ceiling was exceeded
    pub off_target_exceeded: bool,
    /// Whether the mutation rate ceiling was exceeded
    pub mutation_exceeded: bool,
}

impl RiskPolicy {
    /// Evaluates the gate for the given metrics.
    #[must_use]
    pub const fn evaluate(&self, off_target_risk: u8, mutation_rate: u8) -> GateDecision {
        if off_target_risk > self.max_off_target || mutation_rate > self.max_mutation_rate {
            GateDecision::Blocked
        } else {
            GateDecision::Allowed
        }
    }

    /// Builds the confirmation prompt for a trait's metrics, or `None` if
    /// the gate lets it through.
    #[must_use]
    pub const fn prompt_for(&self, metrics: &Metrics) -> Option<RiskPrompt> {
        match self.evaluate(metrics.off_target_risk, metrics.mutation_rate) {
            GateDecision::Allowed => None,
            GateDecision::Blocked => Some(RiskPrompt {
                off_target_risk: metrics.off_target_risk,
                mutation_rate: metrics.mutation_rate,
                off_target_exceeded: metrics.off_target_risk > self.max_off_target,
                mutation_exceeded: metrics.mutation_rate > self.max_mutation_rate,
            }),
        }
    }
}

/// Evaluates the gate with the default thresholds (20 % / 15 %).
#[must_use]
pub const fn risk_gate(off_target_risk: u8, mutation_rate: u8) -> GateDecision {
    RiskPolicy {
        max_off_target: DEFAULT_MAX_OFF_TARGET,
        max_mutation_rate: DEFAULT_MAX_MUTATION_RATE,
    }
    .evaluate(off_target_risk, mutation_rate)
}
