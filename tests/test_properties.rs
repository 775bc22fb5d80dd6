//! Property tests for the animator and the stage controller.

use std::time::Duration;

use crispr_lab::animator::{
    self, AnimatorConfig, AnimatorRun, RunId, TickOutcome, phase_for,
};
use crispr_lab::session::{EditRequest, Stage, StageController};
use proptest::prelude::*;

fn config(increment: f64, probability: f64, ttl_ms: u64, seed: u64) -> AnimatorConfig {
    AnimatorConfig {
        progress_increment: increment,
        marker_probability: probability,
        marker_ttl_ms: ttl_ms,
        seed,
        ..AnimatorConfig::default()
    }
}

#[derive(Debug, Clone)]
enum Action {
    Select(usize),
    Mechanism,
    Step(usize),
    Next,
    Previous,
    Edit,
    Proceed,
    Redesign,
    Tick,
    Elapse(u64),
    Reset,
}

const TRAIT_IDS: [&str; 5] = [
    "bacterial-resistance",
    "protein-production",
    "drought-tolerance",
    "nitrogen-fixation",
    "not-a-trait",
];

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..TRAIT_IDS.len()).prop_map(Action::Select),
        Just(Action::Mechanism),
        (0..12usize).prop_map(Action::Step),
        Just(Action::Next),
        Just(Action::Previous),
        Just(Action::Edit),
        Just(Action::Proceed),
        Just(Action::Redesign),
        Just(Action::Tick),
        (0..3000u64).prop_map(Action::Elapse),
        Just(Action::Reset),
    ]
}

fn apply(ctl: &mut StageController, action: &Action) {
    let _ = match action {
        Action::Select(i) => ctl.select_trait(TRAIT_IDS[*i]).map(|_| ()),
        Action::Mechanism => ctl.request_mechanism_view().map(|_| ()),
        Action::Step(n) => ctl.goto_mechanism_step(*n).map(|_| ()),
        Action::Next => ctl.next_mechanism_step().map(|_| ()),
        Action::Previous => ctl.previous_mechanism_step().map(|_| ()),
        Action::Edit => ctl.request_edit().map(|_| ()),
        Action::Proceed => ctl.confirm_proceed().map(|_| ()),
        Action::Redesign => ctl.confirm_redesign().map(|_| ()),
        Action::Tick => {
            ctl.tick();
            Ok(())
        }
        Action::Elapse(ms) => {
            ctl.elapse(Duration::from_millis(*ms));
            Ok(())
        }
        Action::Reset => {
            ctl.reset();
            Ok(())
        }
    };
}

proptest! {
    #[test]
    fn prop_progress_monotone_and_bounded(
        increment in 0.1f64..=100.0,
        probability in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let cfg = config(increment, probability, 2000, seed);
        let mut run = AnimatorRun::start(RunId(1), seed);
        let mut completions = 0;
        let expected_ticks = (100.0 / increment).ceil() as u32;

        for _ in 0..expected_ticks + 5 {
            let before = (run.progress(), run.phase_index());
            let (next, outcome) = animator::advance(&run, &cfg);
            prop_assert!(next.progress() >= before.0);
            prop_assert!(next.progress() <= 100.0);
            prop_assert!(next.phase_index() >= before.1);
            prop_assert!(next.phase_index() <= 5);
            if matches!(outcome, TickOutcome::Completed(_)) {
                completions += 1;
                prop_assert_eq!(next.phase_index(), 5);
            }
            run = next;
        }

        prop_assert_eq!(completions, 1);
        prop_assert!(run.is_completed());
        prop_assert!(run.ticks() <= expected_ticks + 1);
    }

    #[test]
    fn prop_phase_matches_progress(progress in 0.0f64..=100.0) {
        let phase = phase_for(progress);
        prop_assert!(phase <= 5);
        let lower = f64::from(phase) * 100.0 / 6.0;
        prop_assert!(progress + 1e-9 >= lower);
    }

    #[test]
    fn prop_same_seed_same_timeline(seed in any::<u64>(), ticks in 1usize..80) {
        let cfg = config(1.5, 0.3, 2000, seed);
        let replay = || {
            let mut run = AnimatorRun::start(RunId(3), seed);
            for _ in 0..ticks {
                run = animator::elapse(&run, cfg.tick_interval(), &cfg).0;
                run = animator::advance(&run, &cfg).0;
            }
            run
        };
        let first = replay();
        // one draw per tick, plus one offset draw per emitted marker
        prop_assert_eq!(
            first.source().draws(),
            first.ticks() as u64 + first.emitted()
        );
        prop_assert_eq!(first, replay());
    }

    #[test]
    fn prop_markers_expire_oldest_first(
        seed in any::<u64>(),
        ttl_ms in 1u64..3000,
        steps in proptest::collection::vec(0u64..500, 1..120),
    ) {
        let cfg = config(1.5, 0.5, ttl_ms, seed);
        let ttl = cfg.marker_ttl();
        let mut run = AnimatorRun::start(RunId(1), seed);
        let mut last_expired: Option<u64> = None;

        for ms in steps {
            run = animator::advance(&run, &cfg).0;
            let (next, expired) = animator::elapse(&run, Duration::from_millis(ms), &cfg);
            for marker in &expired {
                if let Some(prev) = last_expired {
                    prop_assert!(marker.id > prev);
                }
                last_expired = Some(marker.id);
                prop_assert!(marker.expires_at(ttl) <= next.clock());
            }
            for live in next.markers() {
                prop_assert!(live.expires_at(ttl) > next.clock());
            }
            run = next;
        }
        prop_assert_eq!(run.emitted(), run.expired() + run.markers().len() as u64);
    }

    #[test]
    fn prop_controller_invariants_hold(actions in proptest::collection::vec(action(), 0..200)) {
        let mut ctl = StageController::builtin();
        let mut highest_run = 0;

        for action in &actions {
            apply(&mut ctl, action);
            let s = ctl.session();

            prop_assert!(s.mechanism_step() <= 7);
            prop_assert!(s.progress() >= 0.0 && s.progress() <= 100.0);
            if s.pending_confirmation().is_some() {
                prop_assert!(matches!(s.stage(), Stage::Analyze | Stage::Mechanism));
            }
            match s.stage() {
                Stage::Select => {
                    prop_assert!(s.trait_id().is_none());
                    prop_assert!(s.animation().is_none());
                }
                Stage::Analyze | Stage::Mechanism => {
                    prop_assert!(s.trait_id().is_some());
                    prop_assert!(s.animation().is_none());
                }
                Stage::Edit => prop_assert!(s.animation().is_some()),
                Stage::Result => {
                    prop_assert!(s.animation().is_some_and(AnimatorRun::is_completed));
                    prop_assert!(ctl.outcome().is_some());
                }
            }
            if let Some(run) = s.run_id() {
                prop_assert!(run.0 >= highest_run);
                highest_run = run.0;
            }
        }
    }

    #[test]
    fn prop_reset_is_idempotent(actions in proptest::collection::vec(action(), 0..60)) {
        let mut ctl = StageController::builtin();
        for action in &actions {
            apply(&mut ctl, action);
        }
        let once = ctl.reset();
        let twice = ctl.reset();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.stage(), Stage::Select);
    }

    #[test]
    fn prop_stale_run_is_ignored(ticks in 0usize..60, late in 1usize..20) {
        let mut ctl = StageController::builtin();
        ctl.select_trait("bacterial-resistance").unwrap();
        prop_assert!(matches!(ctl.request_edit().unwrap(), EditRequest::Started(_)));
        for _ in 0..ticks {
            ctl.tick();
        }
        ctl.reset();
        ctl.select_trait("protein-production").unwrap();
        ctl.request_edit().unwrap();

        let before = ctl.session().clone();
        for _ in 0..late {
            prop_assert!(ctl.tick_run(RunId(1)).is_none());
            prop_assert!(ctl.elapse_run(RunId(1), Duration::from_millis(80)).is_empty());
        }
        prop_assert_eq!(ctl.session(), &before);
    }
}
