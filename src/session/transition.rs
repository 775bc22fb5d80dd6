//! Pure stage transitions
//!
//! Each function takes the current [`Session`] and returns the next one
//! (or an error), leaving its input untouched. Stage checks live here so
//! that an action invoked from the wrong stage is rejected no matter
//! which surface called it.

use std::time::Duration;

use crate::animator::{self, AnimatorConfig, AnimatorRun, Marker, RunId, TickOutcome};
use crate::catalog::{MECHANISM_STEPS, TraitCatalog};
use crate::error::SessionError;
use crate::risk::RiskPolicy;

use super::state::{Session, Stage};

/// Index of the last mechanism explainer page.
pub const LAST_MECHANISM_STEP: usize = MECHANISM_STEPS.len() - 1;

fn require(session: &Session, action: &'static str, allowed: &[Stage]) -> Result<(), SessionError> {
    if allowed.contains(&session.stage) {
        return Ok(());
    }
    Err(SessionError::InvalidTransition {
        action,
        stage: session.stage,
    })
}

/// Selects a trait and moves to Analyze.
///
/// Valid from Select, and from Analyze to change the selection. Any
/// earlier risk decision is discarded.
///
/// # Errors
///
/// - [`SessionError::InvalidTransition`] outside Select/Analyze
/// - [`SessionError::UnknownTrait`] if the id is not in the catalog
pub fn select_trait(
    session: &Session,
    catalog: &TraitCatalog,
    id: &str,
) -> Result<Session, SessionError> {
    require(session, "select_trait", &[Stage::Select, Stage::Analyze])?;
    let selected = catalog.get(id).ok_or_else(|| SessionError::UnknownTrait {
        id: id.to_string(),
        suggestion: catalog.suggest(id),
    })?;

    Ok(Session {
        stage: Stage::Analyze,
        trait_id: Some(id.to_string()),
        metrics: selected.metrics,
        mechanism_step: 0,
        pending_confirmation: None,
        risk_acknowledged: false,
        animation: None,
    })
}

/// Opens the mechanism explainer.
///
/// # Errors
///
/// Returns [`SessionError::InvalidTransition`] outside Analyze.
pub fn request_mechanism_view(session: &Session) -> Result<Session, SessionError> {
    require(session, "request_mechanism_view", &[Stage::Analyze])?;
    Ok(Session {
        stage: Stage::Mechanism,
        ..session.clone()
    })
}

/// Moves the mechanism explainer to `step`, clamped to the last page.
///
/// # Errors
///
/// Returns [`SessionError::InvalidTransition`] outside Mechanism.
pub fn goto_mechanism_step(session: &Session, step: usize) -> Result<Session, SessionError> {
    require(session, "goto_mechanism_step", &[Stage::Mechanism])?;
    Ok(Session {
        mechanism_step: step.min(LAST_MECHANISM_STEP),
        ..session.clone()
    })
}

/// Starts a new animator run and enters Edit.
///
/// Whatever run the session held before is dropped.
fn enter_edit(session: &Session, run: RunId, seed: u64) -> Session {
    Session {
        stage: Stage::Edit,
        pending_confirmation: None,
        animation: Some(AnimatorRun::start(run, seed)),
        ..session.clone()
    }
}

/// Attempts to enter Edit, consulting the risk gate.
///
/// If the selected trait's metrics exceed the policy and the user has not
/// already chosen to proceed, the returned session stays in its stage and
/// carries a pending [`RiskPrompt`](crate::risk::RiskPrompt).
///
/// # Errors
///
/// Returns [`SessionError::InvalidTransition`] outside Analyze/Mechanism.
pub fn request_edit(
    session: &Session,
    policy: &RiskPolicy,
    run: RunId,
    seed: u64,
) -> Result<Session, SessionError> {
    require(session, "request_edit", &[Stage::Analyze, Stage::Mechanism])?;

    let prompt = policy.prompt_for(&session.metrics);
    match prompt {
        Some(prompt) if !session.risk_acknowledged => Ok(Session {
            pending_confirmation: Some(prompt),
            ..session.clone()
        }),
        _ => Ok(enter_edit(session, run, seed)),
    }
}

fn require_pending(session: &Session, action: &'static str) -> Result<(), SessionError> {
    if session.pending_confirmation.is_none() {
        return Err(SessionError::InvalidTransition {
            action,
            stage: session.stage,
        });
    }
    Ok(())
}

/// Resolves a pending risk prompt by proceeding into Edit.
///
/// The decision sticks until the next trait selection.
///
/// # Errors
///
/// Returns [`SessionError::InvalidTransition`] if no prompt is pending.
pub fn confirm_proceed(session: &Session, run: RunId, seed: u64) -> Result<Session, SessionError> {
    require_pending(session, "confirm_proceed")?;
    let acknowledged = Session {
        risk_acknowledged: true,
        ..session.clone()
    };
    Ok(enter_edit(&acknowledged, run, seed))
}

/// Resolves a pending risk prompt by going back to Analyze.
///
/// # Errors
///
/// Returns [`SessionError::InvalidTransition`] if no prompt is pending.
pub fn confirm_redesign(session: &Session) -> Result<Session, SessionError> {
    require_pending(session, "confirm_redesign")?;
    Ok(Session {
        stage: Stage::Analyze,
        pending_confirmation: None,
        ..session.clone()
    })
}

/// Applies one animator tick.
///
/// Outside Edit the session is returned unchanged with no outcome. When
/// the tick completes the animation the returned session is in Result.
#[must_use]
pub fn tick(session: &Session, config: &AnimatorConfig) -> (Session, Option<TickOutcome>) {
    let Some(run) = session.animation.as_ref().filter(|_| session.stage == Stage::Edit) else {
        return (session.clone(), None);
    };

    let (run, outcome) = animator::advance(run, config);
    let stage = if matches!(outcome, TickOutcome::Completed(_)) {
        Stage::Result
    } else {
        session.stage
    };

    (
        Session {
            stage,
            animation: Some(run),
            ..session.clone()
        },
        Some(outcome),
    )
}

/// Advances the marker-expiry clock of the current run.
///
/// Works in Edit and Result alike so that markers emitted near the end
/// of the animation still expire. Without a run this is a no-op.
#[must_use]
pub fn elapse(session: &Session, delta: Duration, config: &AnimatorConfig) -> (Session, Vec<Marker>) {
    let Some(run) = session.animation.as_ref() else {
        return (session.clone(), Vec::new());
    };
    let (run, expired) = animator::elapse(run, delta, config);
    (
        Session {
            animation: Some(run),
            ..session.clone()
        },
        expired,
    )
}

/// Returns the fresh Select-stage session.
#[must_use]
pub fn reset() -> Session {
    Session::default()
}
