//! Stage controller
//!
//! Owns the current [`Session`] together with everything the transitions
//! need: the catalog, risk policy, animator settings and quiz. Each
//! operation computes the next session with a pure transition, swaps it
//! in, and reports what happened to logs, metrics and the event stream.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, trace, warn};

use crate::animator::{AnimatorConfig, Marker, RunId, TickOutcome, TickReport};
use crate::catalog::{MECHANISM_STEPS, MechanismStep, Trait, TraitCatalog, builtin_catalog};
use crate::error::{QuizError, SessionError};
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};
use crate::quiz::{QuestionBank, QuizEngine, QuizState, Score, builtin_bank};
use crate::risk::{RiskPolicy, RiskPrompt};

use super::outcome::EditReport;
use super::state::{Session, Stage};
use super::transition;

/// Result of asking to start the edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditRequest {
    /// The edit started; the session is now in Edit.
    Started(Session),
    /// The risk gate held the edit back. Resolve with
    /// [`StageController::confirm_proceed`] or
    /// [`StageController::confirm_redesign`].
    Blocked(RiskPrompt),
}

/// Drives a single user's session through the lab.
#[derive(Debug)]
pub struct StageController {
    catalog: Arc<TraitCatalog>,
    policy: RiskPolicy,
    animator: AnimatorConfig,
    session: Session,
    quiz: QuizEngine,
    last_run: u64,
    events: Option<Arc<EventEmitter>>,
}

impl StageController {
    /// Creates a controller in the Select stage.
    #[must_use]
    pub fn new(
        catalog: Arc<TraitCatalog>,
        bank: QuestionBank,
        policy: RiskPolicy,
        animator: AnimatorConfig,
    ) -> Self {
        debug!(
            traits = catalog.len(),
            questions = bank.len(),
            seed = animator.seed,
            "stage controller created"
        );
        Self {
            catalog,
            policy,
            animator,
            session: Session::default(),
            quiz: QuizEngine::new(bank),
            last_run: 0,
            events: None,
        }
    }

    /// Controller over the built-in catalog and question bank with
    /// default policy and animator settings.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(builtin_catalog()),
            builtin_bank(),
            RiskPolicy::default(),
            AnimatorConfig::default(),
        )
    }

    /// Attaches an event stream and announces the session on it.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        events.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            catalog_size: self.catalog.len(),
            seed: self.animator.seed,
        });
        self.events = Some(events);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The trait catalog.
    #[must_use]
    pub fn catalog(&self) -> &TraitCatalog {
        &self.catalog
    }

    /// Risk thresholds in force.
    #[must_use]
    pub const fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Animator settings in force.
    #[must_use]
    pub const fn animator_config(&self) -> &AnimatorConfig {
        &self.animator
    }

    /// The selected trait, if any.
    #[must_use]
    pub fn selected_trait(&self) -> Option<&Trait> {
        self.session.trait_id().and_then(|id| self.catalog.get(id))
    }

    /// The mechanism explainer page on show, while in Mechanism.
    #[must_use]
    pub fn current_mechanism_step(&self) -> Option<&'static MechanismStep> {
        (self.session.stage() == Stage::Mechanism)
            .then(|| MECHANISM_STEPS.get(self.session.mechanism_step()))
            .flatten()
    }

    /// The graded report, once the session has reached Result.
    #[must_use]
    pub fn outcome(&self) -> Option<EditReport> {
        if self.session.stage() != Stage::Result {
            return None;
        }
        let id = self.session.trait_id()?;
        let edited = self.catalog.get(id)?;
        Some(EditReport::new(id, edited, self.session.risk_acknowledged()))
    }

    /// The quiz engine.
    #[must_use]
    pub const fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    // ========================================================================
    // Stage transitions
    // ========================================================================

    /// Selects a trait and moves to Analyze.
    ///
    /// # Errors
    ///
    /// See [`transition::select_trait`].
    pub fn select_trait(&mut self, id: &str) -> Result<Session, SessionError> {
        let next = transition::select_trait(&self.session, &self.catalog, id)
            .inspect_err(|e| rejected("select_trait", e))?;
        info!(trait_id = id, "trait selected");
        Ok(self.replace(next))
    }

    /// Opens the mechanism explainer.
    ///
    /// # Errors
    ///
    /// See [`transition::request_mechanism_view`].
    pub fn request_mechanism_view(&mut self) -> Result<Session, SessionError> {
        let next = transition::request_mechanism_view(&self.session)
            .inspect_err(|e| rejected("request_mechanism_view", e))?;
        Ok(self.replace(next))
    }

    /// Asks to start the edit, consulting the risk gate.
    ///
    /// # Errors
    ///
    /// See [`transition::request_edit`].
    pub fn request_edit(&mut self) -> Result<EditRequest, SessionError> {
        let run = self.peek_run();
        let next = transition::request_edit(&self.session, &self.policy, run, self.animator.seed)
            .inspect_err(|e| rejected("request_edit", e))?;

        if next.stage() == Stage::Edit {
            return Ok(EditRequest::Started(self.start_run(next)));
        }

        let Some(prompt) = next.pending_confirmation().copied() else {
            return Ok(EditRequest::Started(self.replace(next)));
        };
        let trait_id = next.trait_id().unwrap_or_default().to_string();
        warn!(
            trait_id = %trait_id,
            off_target_risk = prompt.off_target_risk,
            mutation_rate = prompt.mutation_rate,
            "edit held back by risk gate"
        );
        metrics::record_risk_prompt();
        self.emit(Event::RiskPromptRaised {
            timestamp: Utc::now(),
            trait_id,
            off_target_risk: prompt.off_target_risk,
            mutation_rate: prompt.mutation_rate,
        });
        self.replace(next);
        Ok(EditRequest::Blocked(prompt))
    }

    /// Proceeds past a pending risk prompt into Edit.
    ///
    /// # Errors
    ///
    /// See [`transition::confirm_proceed`].
    pub fn confirm_proceed(&mut self) -> Result<Session, SessionError> {
        let run = self.peek_run();
        let next = transition::confirm_proceed(&self.session, run, self.animator.seed)
            .inspect_err(|e| rejected("confirm_proceed", e))?;
        self.risk_resolved("proceed");
        Ok(self.start_run(next))
    }

    /// Abandons the edit at a pending risk prompt and returns to Analyze.
    ///
    /// # Errors
    ///
    /// See [`transition::confirm_redesign`].
    pub fn confirm_redesign(&mut self) -> Result<Session, SessionError> {
        let next = transition::confirm_redesign(&self.session)
            .inspect_err(|e| rejected("confirm_redesign", e))?;
        self.risk_resolved("redesign");
        Ok(self.replace(next))
    }

    /// Returns to a fresh Select-stage session and clears the quiz.
    ///
    /// Any in-flight animator run becomes stale. Valid from every stage.
    pub fn reset(&mut self) -> Session {
        let from = self.session.stage();
        info!(from = %from, "session reset");
        self.emit(Event::SessionReset {
            timestamp: Utc::now(),
            from: from.to_string(),
        });
        self.quiz.retake();
        self.replace(transition::reset())
    }

    // ========================================================================
    // Mechanism explainer
    // ========================================================================

    /// Moves to the next explainer page, stopping at the last.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside Mechanism.
    pub fn next_mechanism_step(&mut self) -> Result<Session, SessionError> {
        self.goto_mechanism_step(self.session.mechanism_step().saturating_add(1))
    }

    /// Moves to the previous explainer page, stopping at the first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside Mechanism.
    pub fn previous_mechanism_step(&mut self) -> Result<Session, SessionError> {
        self.goto_mechanism_step(self.session.mechanism_step().saturating_sub(1))
    }

    /// Jumps to an explainer page, clamped to the last.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside Mechanism.
    pub fn goto_mechanism_step(&mut self, step: usize) -> Result<Session, SessionError> {
        let next = transition::goto_mechanism_step(&self.session, step)
            .inspect_err(|e| rejected("goto_mechanism_step", e))?;
        debug!(step = next.mechanism_step(), "mechanism step");
        Ok(self.replace(next))
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Applies one animator tick to the current run.
    ///
    /// Returns `None` when the session is not in Edit.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        let (next, outcome) = transition::tick(&self.session, &self.animator);
        let run = next.run_id()?;
        if let Some(outcome) = &outcome {
            self.observe_tick(run, outcome);
        }
        self.replace(next);
        outcome
    }

    /// Applies a tick scheduled for `run`.
    ///
    /// A tick addressed to any run other than the current one is dropped.
    pub fn tick_run(&mut self, run: RunId) -> Option<TickOutcome> {
        if self.session.run_id() != Some(run) {
            trace!(%run, "stale tick dropped");
            return None;
        }
        self.tick()
    }

    /// Advances the current run's marker clock and expires markers.
    pub fn elapse(&mut self, delta: Duration) -> Vec<Marker> {
        let (next, expired) = transition::elapse(&self.session, delta, &self.animator);
        if let Some(run) = next.run_id() {
            for marker in &expired {
                trace!(%run, marker = marker.id, "marker expired");
                self.emit(Event::MarkerExpired {
                    timestamp: Utc::now(),
                    run: run.0,
                    marker_id: marker.id,
                });
            }
            metrics::record_markers_expired(expired.len() as u64);
        }
        self.session = next;
        expired
    }

    /// Advances the clock of `run`, dropping the call if `run` is stale.
    pub fn elapse_run(&mut self, run: RunId, delta: Duration) -> Vec<Marker> {
        if self.session.run_id() != Some(run) {
            trace!(%run, "stale clock update dropped");
            return Vec::new();
        }
        self.elapse(delta)
    }

    // ========================================================================
    // Quiz
    // ========================================================================

    /// Records an answer.
    ///
    /// # Errors
    ///
    /// See [`QuizEngine::record_answer`].
    pub fn record_quiz_answer(
        &mut self,
        question: u32,
        index: usize,
    ) -> Result<QuizState, QuizError> {
        self.quiz
            .record_answer(question, index)
            .cloned()
            .inspect_err(|e| {
                warn!(error = %e, "quiz answer rejected");
                metrics::record_error("quiz");
            })
    }

    /// Scores the quiz.
    ///
    /// # Errors
    ///
    /// See [`QuizEngine::submit`].
    pub fn submit_quiz(&mut self) -> Result<Score, QuizError> {
        let already = self.quiz.state().score().is_some();
        let score = self.quiz.submit().inspect_err(|e| {
            warn!(error = %e, "quiz submission rejected");
            metrics::record_error("quiz");
        })?;
        if !already {
            metrics::record_quiz_score(score.percent());
            self.emit(Event::QuizSubmitted {
                timestamp: Utc::now(),
                correct: score.correct,
                total: score.total,
            });
        }
        Ok(score)
    }

    /// Clears quiz answers and score.
    pub fn retake_quiz(&mut self) -> QuizState {
        self.quiz.retake().clone()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    const fn peek_run(&self) -> RunId {
        RunId(self.last_run + 1)
    }

    fn start_run(&mut self, next: Session) -> Session {
        if let Some(run) = next.run_id() {
            self.last_run = run.0;
            info!(%run, trait_id = next.trait_id().unwrap_or_default(), "edit started");
            self.emit(Event::PhaseEntered {
                timestamp: Utc::now(),
                run: run.0,
                phase_name: next.phase().to_string(),
                phase_index: next.phase_index(),
            });
        }
        self.replace(next)
    }

    fn risk_resolved(&self, decision: &'static str) {
        let trait_id = self.session.trait_id().unwrap_or_default().to_string();
        info!(trait_id = %trait_id, decision, "risk prompt resolved");
        metrics::record_risk_decision(decision);
        self.emit(Event::RiskResolved {
            timestamp: Utc::now(),
            trait_id,
            decision: decision.to_string(),
        });
    }

    fn observe_tick(&self, run: RunId, outcome: &TickOutcome) {
        let report: &TickReport = match outcome {
            TickOutcome::Idle => return,
            TickOutcome::Advanced(report) | TickOutcome::Completed(report) => report,
        };
        metrics::record_tick(report.progress);

        if let Some(marker) = report.marker {
            metrics::record_marker_emitted();
            self.emit(Event::MarkerEmitted {
                timestamp: Utc::now(),
                run: run.0,
                marker_id: marker.id,
                at_ms: u64::try_from(marker.emitted_at.as_millis()).unwrap_or(u64::MAX),
            });
        }

        if report.phase_changed {
            debug!(%run, phase = %report.phase, "phase entered");
            metrics::record_phase_entered(report.phase.label());
            self.emit(Event::PhaseEntered {
                timestamp: Utc::now(),
                run: run.0,
                phase_name: report.phase.to_string(),
                phase_index: report.phase.index(),
            });
        }

        if matches!(outcome, TickOutcome::Completed(_)) {
            let ticks = self.session.animation().map_or(0, |a| a.ticks()) + 1;
            let trait_id = self.session.trait_id().unwrap_or_default().to_string();
            info!(%run, trait_id = %trait_id, ticks, "edit completed");
            metrics::record_edit_completed();
            self.emit(Event::EditCompleted {
                timestamp: Utc::now(),
                run: run.0,
                trait_id,
                ticks,
            });
        }
    }

    /// Swaps in `next`, reporting a stage change, and returns a copy.
    fn replace(&mut self, next: Session) -> Session {
        let from = self.session.stage();
        let to = next.stage();
        if from != to {
            info!(from = %from, to = %to, "stage changed");
            metrics::record_stage_transition(from.as_str(), to.as_str());
            self.emit(Event::StageEntered {
                timestamp: Utc::now(),
                from: from.to_string(),
                stage: to.to_string(),
                trait_id: next.trait_id().map(str::to_string),
            });
        }
        self.session = next;
        self.session.clone()
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

fn rejected(action: &str, err: &SessionError) {
    warn!(action, error = %err, "transition rejected");
    metrics::record_error("session");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::events::tests::TestWriter;

    fn controller_with_events() -> (StageController, TestWriter) {
        let tw = TestWriter::default();
        let emitter = Arc::new(EventEmitter::new(Box::new(tw.clone())));
        (StageController::builtin().with_events(emitter), tw)
    }

    fn run_to_result(ctl: &mut StageController) {
        while ctl.session().stage() == Stage::Edit {
            ctl.elapse(ctl.animator_config().tick_interval());
            ctl.tick();
        }
    }

    #[test]
    fn low_risk_edit_starts_immediately() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("protein-production").unwrap();
        let EditRequest::Started(session) = ctl.request_edit().unwrap() else {
            panic!("expected edit to start");
        };
        assert_eq!(session.stage(), Stage::Edit);
        assert_eq!(session.run_id(), Some(RunId(1)));
    }

    #[test]
    fn high_risk_edit_is_blocked_then_proceeds() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("nitrogen-fixation").unwrap();
        let EditRequest::Blocked(prompt) = ctl.request_edit().unwrap() else {
            panic!("expected risk prompt");
        };
        assert!(prompt.off_target_exceeded);
        assert!(prompt.mutation_exceeded);
        assert_eq!(ctl.session().stage(), Stage::Analyze);

        let session = ctl.confirm_proceed().unwrap();
        assert_eq!(session.stage(), Stage::Edit);
        assert!(session.risk_acknowledged());
        assert_eq!(session.run_id(), Some(RunId(1)));
    }

    #[test]
    fn run_ids_increase_across_edits() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("bacterial-resistance").unwrap();
        ctl.request_edit().unwrap();
        ctl.reset();
        ctl.select_trait("bacterial-resistance").unwrap();
        let EditRequest::Started(session) = ctl.request_edit().unwrap() else {
            panic!("expected edit to start");
        };
        assert_eq!(session.run_id(), Some(RunId(2)));
    }

    #[test]
    fn stale_tick_is_dropped() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("bacterial-resistance").unwrap();
        ctl.request_edit().unwrap();
        let old = ctl.session().run_id().unwrap();
        ctl.reset();
        ctl.select_trait("bacterial-resistance").unwrap();
        ctl.request_edit().unwrap();

        let before = ctl.session().clone();
        assert!(ctl.tick_run(old).is_none());
        assert!(ctl.elapse_run(old, Duration::from_secs(5)).is_empty());
        assert_eq!(ctl.session(), &before);
    }

    #[test]
    fn full_run_reaches_result_with_report() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("bacterial-resistance").unwrap();
        ctl.request_edit().unwrap();
        run_to_result(&mut ctl);

        assert_eq!(ctl.session().stage(), Stage::Result);
        assert!((ctl.session().progress() - 100.0).abs() < f64::EPSILON);
        assert_eq!(ctl.session().phase_index(), 5);
        let report = ctl.outcome().unwrap();
        assert_eq!(report.trait_id, "bacterial-resistance");
        assert_eq!(report.insertion.as_deref(), Some("Xa21-INSERTION"));
        assert!(ctl.tick().is_none());
    }

    #[test]
    fn markers_drain_after_completion() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("bacterial-resistance").unwrap();
        ctl.request_edit().unwrap();
        run_to_result(&mut ctl);
        ctl.elapse(ctl.animator_config().marker_ttl());
        assert_eq!(ctl.session().marker_count(), 0);
        assert_eq!(ctl.session().stage(), Stage::Result);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("drought-tolerance").unwrap();
        let once = ctl.reset();
        let twice = ctl.reset();
        assert_eq!(once, twice);
        assert_eq!(once, Session::default());
    }

    #[test]
    fn reset_clears_quiz() {
        let mut ctl = StageController::builtin();
        ctl.record_quiz_answer(1, 1).unwrap();
        ctl.reset();
        assert_eq!(ctl.quiz().state().answered(), 0);
    }

    #[test]
    fn mechanism_navigation() {
        let mut ctl = StageController::builtin();
        assert!(ctl.next_mechanism_step().is_err());
        ctl.select_trait("drought-tolerance").unwrap();
        ctl.request_mechanism_view().unwrap();
        assert_eq!(ctl.current_mechanism_step().unwrap().title, MECHANISM_STEPS[0].title);
        assert_eq!(ctl.previous_mechanism_step().unwrap().mechanism_step(), 0);
        for _ in 0..20 {
            ctl.next_mechanism_step().unwrap();
        }
        assert_eq!(ctl.session().mechanism_step(), MECHANISM_STEPS.len() - 1);
    }

    #[test]
    fn outcome_absent_before_result() {
        let mut ctl = StageController::builtin();
        ctl.select_trait("protein-production").unwrap();
        assert!(ctl.outcome().is_none());
    }

    #[test]
    fn events_trace_the_session() {
        let (mut ctl, tw) = controller_with_events();
        ctl.select_trait("drought-tolerance").unwrap();
        ctl.request_edit().unwrap();
        ctl.confirm_redesign().unwrap();
        ctl.reset();

        let types: Vec<String> = tw
            .lines()
            .iter()
            .map(|l| l["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            types,
            vec![
                "SessionStarted",
                "StageEntered",
                "RiskPromptRaised",
                "RiskResolved",
                "SessionReset",
                "StageEntered",
            ]
        );
    }

    #[test]
    fn completed_run_emits_edit_completed_once() {
        let (mut ctl, tw) = controller_with_events();
        ctl.select_trait("protein-production").unwrap();
        ctl.request_edit().unwrap();
        run_to_result(&mut ctl);
        ctl.tick();

        let completed: Vec<_> = tw
            .lines()
            .into_iter()
            .filter(|l| l["type"] == "EditCompleted")
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0]["ticks"], 67);
    }

    #[test]
    fn quiz_submission_emits_once() {
        let (mut ctl, tw) = controller_with_events();
        for (q, a) in [(1, 1), (2, 1), (3, 2), (4, 2), (5, 1)] {
            ctl.record_quiz_answer(q, a).unwrap();
        }
        assert_eq!(ctl.submit_quiz().unwrap().correct, 5);
        assert_eq!(ctl.submit_quiz().unwrap().correct, 5);
        let submitted = tw
            .lines()
            .iter()
            .filter(|l| l["type"] == "QuizSubmitted")
            .count();
        assert_eq!(submitted, 1);
    }
}
