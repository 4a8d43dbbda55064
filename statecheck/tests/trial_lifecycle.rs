//! Trial-level tests driving `repeat` end to end with real entropy sources.
//!
//! These cover the behaviors a user of the library sees: determinism per
//! seed, group bookkeeping, engine exhaustion, the costly-retry bound, and
//! failures surfacing with the actions that led to them.

use statecheck::core::action::{Action, ActionCatalog, ActionFn, StateMachine};
use statecheck::core::error::{CatalogError, FailureKind, Origin, TrialError};
use statecheck::core::outcome::ActionResult;
use statecheck::demo::QueueMachine;
use statecheck::io::replay::ReplaySource;
use statecheck::io::seeded::SeededSource;
use statecheck::repeat::{StepBudget, repeat, repeat_machine};
use statecheck::step::RetryPolicy;
use statecheck::test_support::FixtureMachine;
use statecheck::trial::Trial;

/// Counter that must never pass `limit`; `bump` fails to respect it.
#[derive(Debug, Default)]
struct Bounded {
    value: u32,
    limit: u32,
}

impl Bounded {
    fn inc(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        trial.assume(self.value < self.limit)?;
        self.value += 1;
        Ok(())
    }

    fn dec(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        trial.assume(self.value > 0)?;
        self.value -= 1;
        Ok(())
    }

    fn bump(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        let by = trial.draw_range("by", 1, 3)?;
        self.value += by as u32;
        Ok(())
    }
}

impl StateMachine for Bounded {
    fn actions() -> Vec<Action<Self>> {
        vec![
            Action::new("inc", Self::inc),
            Action::new("dec", Self::dec),
        ]
    }

    fn check(&self, trial: &mut Trial<'_>) -> ActionResult {
        trial.ensure(self.value <= self.limit, format!("value {} over limit", self.value))
    }
}

fn run_seeded(seed: u64, steps: u32) -> (Result<u32, TrialError>, Vec<String>, Vec<u64>) {
    let catalog = ActionCatalog::<QueueMachine>::from_machine().expect("catalog");
    let mut source = SeededSource::new(seed);
    let mut machine = QueueMachine::new(3, true);
    let mut trial = Trial::new(&mut source);
    let result = repeat_machine(&mut trial, &mut machine, &catalog, StepBudget::new(steps, false))
        .map(|summary| summary.steps);
    let trace = trial.trace().to_vec();
    assert_eq!(source.log().open_groups().count(), 0, "every group closed");
    (result, trace, source.log().choices())
}

#[test]
fn same_seed_runs_the_same_trial() {
    for seed in 0..20 {
        assert_eq!(run_seeded(seed, 30), run_seeded(seed, 30));
    }
}

#[test]
fn recorded_choices_replay_the_same_actions() {
    let (result, trace, choices) = run_seeded(11, 30);

    let catalog = ActionCatalog::<QueueMachine>::from_machine().expect("catalog");
    let mut source = ReplaySource::new(choices);
    let mut machine = QueueMachine::new(3, true);
    let mut trial = Trial::new(&mut source);
    let replayed = repeat_machine(&mut trial, &mut machine, &catalog, StepBudget::new(30, false))
        .map(|summary| summary.steps);

    assert_eq!(replayed, result);
    assert_eq!(trial.trace(), trace.as_slice());
    assert_eq!(source.remaining(), 0);
}

#[test]
fn correct_machine_keeps_invariant_over_long_trials() {
    let catalog = ActionCatalog::<Bounded>::from_machine().expect("catalog");
    for seed in 0..25 {
        let mut source = SeededSource::new(seed);
        let mut machine = Bounded {
            value: 0,
            limit: 2,
        };
        let mut trial = Trial::new(&mut source);
        let summary =
            repeat_machine(&mut trial, &mut machine, &catalog, StepBudget::new(100, false))
                .expect("trial passes");
        assert_eq!(summary.steps, 100);
        assert_eq!(summary.trace.len(), 100);
        assert!(machine.value <= 2);
    }
}

#[test]
fn invariant_violation_names_the_check() {
    let catalog = ActionCatalog::from_pairs([
        ("inc", Bounded::inc as ActionFn<Bounded>),
        ("bump", Bounded::bump as ActionFn<Bounded>),
    ])
    .expect("catalog");
    let mut source = SeededSource::new(5);
    let mut machine = Bounded {
        value: 0,
        limit: 4,
    };
    let mut trial = Trial::new(&mut source);

    let err = repeat_machine(&mut trial, &mut machine, &catalog, StepBudget::new(50, false))
        .expect_err("bump overshoots the limit");

    assert_eq!(err.kind(), FailureKind::Assertion);
    assert!(err.is_bug());
    match err {
        TrialError::Assertion { origin, message } => {
            assert_eq!(origin, Origin::Check);
            assert!(message.contains("over limit"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!trial.trace().is_empty());
}

#[test]
fn free_skips_run_until_the_engine_is_exhausted() {
    let catalog = ActionCatalog::new(vec![Action::new("free_skip", FixtureMachine::free_skip)])
        .expect("catalog");
    let mut source = SeededSource::with_max_draws(3, 50);
    let mut machine = FixtureMachine::default();
    let mut trial = Trial::new(&mut source);

    let err = repeat(&mut trial, &mut machine, &catalog, None, StepBudget::new(1, false))
        .expect_err("exhausted");

    assert_eq!(err, TrialError::Exhausted { draws: 50 });
    assert!(!err.is_bug());
    assert_eq!(machine.skipped, 50);
    assert_eq!(source.log().open_groups().count(), 0);
}

#[test]
fn costly_skips_stop_at_the_retry_bound() {
    let catalog = ActionCatalog::new(vec![Action::new("costly_skip", FixtureMachine::costly_skip)])
        .expect("catalog");
    let mut source = SeededSource::new(9);
    let mut machine = FixtureMachine::default();
    let mut trial = Trial::new(&mut source);
    let budget = StepBudget::new(4, false).with_retry(RetryPolicy {
        max_costly_attempts: 7,
    });

    let err = repeat(&mut trial, &mut machine, &catalog, None, budget).expect_err("no action");

    assert_eq!(err, TrialError::NoValidAction { attempts: 7 });
    assert_eq!(
        err.to_string(),
        "can't find a valid (non-skipped) action after 7 attempts"
    );
    assert!(err.is_bug());
    assert_eq!(machine.skipped, 7);
    // one selection draw plus one payload draw per attempt
    assert_eq!(source.log().len(), 14);
}

#[test]
fn machine_without_actions_is_rejected_up_front() {
    #[derive(Debug)]
    struct Empty;

    impl StateMachine for Empty {
        fn actions() -> Vec<Action<Self>> {
            Vec::new()
        }
    }

    let err = ActionCatalog::<Empty>::from_machine().expect_err("empty");
    assert!(matches!(err, CatalogError::Empty { .. }));
    assert!(err.to_string().contains("has no actions specified"));
}
