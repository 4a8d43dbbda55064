//! Repeat driver: interleaves invariant checks with executed steps.

use serde::Serialize;
use tracing::info;

use crate::core::action::{ActionCatalog, StateMachine};
use crate::core::error::{Origin, TrialError};
use crate::core::outcome::ActionResult;
use crate::step::{RetryPolicy, execute_step};
use crate::trial::Trial;

/// Invariant check signature.
pub type CheckFn<'c, M> = dyn Fn(&M, &mut Trial<'_>) -> ActionResult + 'c;

/// How many steps a trial runs and how each step retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBudget {
    pub steps: u32,
    pub retry: RetryPolicy,
}

impl StepBudget {
    /// Budget of `steps` steps, halved in short mode.
    pub fn new(steps: u32, short: bool) -> Self {
        Self {
            steps: if short { steps / 2 } else { steps },
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Summary of a trial that ran its whole budget without a fatal error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrialSummary {
    pub steps: u32,
    pub free_retries: u64,
    pub costly_retries: u64,
    pub draws: u64,
    /// Completed actions, in execution order.
    pub trace: Vec<String>,
}

/// Run `budget.steps` steps against `machine`.
///
/// `check`, when present, runs once before the first step and once after every
/// completed step. The first fatal error stops the trial; the actions executed
/// so far stay available through [`Trial::trace`].
pub fn repeat<M>(
    trial: &mut Trial<'_>,
    machine: &mut M,
    catalog: &ActionCatalog<M>,
    check: Option<&CheckFn<'_, M>>,
    budget: StepBudget,
) -> Result<TrialSummary, TrialError> {
    info!(
        steps = budget.steps,
        actions = catalog.len(),
        max_costly_attempts = budget.retry.max_costly_attempts,
        "starting trial"
    );

    run_check(trial, machine, check)?;

    let mut summary = TrialSummary::default();
    while summary.steps < budget.steps {
        let report = execute_step(trial, machine, catalog, budget.retry)?;
        summary.steps += 1;
        summary.free_retries += u64::from(report.free_retries);
        summary.costly_retries += u64::from(report.costly_retries);
        run_check(trial, machine, check)?;
    }

    summary.draws = trial.draws();
    summary.trace = trial.trace().to_vec();
    info!(
        steps = summary.steps,
        draws = summary.draws,
        free_retries = summary.free_retries,
        costly_retries = summary.costly_retries,
        "trial finished"
    );
    Ok(summary)
}

/// [`repeat`] using the machine's own [`StateMachine::check`].
pub fn repeat_machine<M: StateMachine>(
    trial: &mut Trial<'_>,
    machine: &mut M,
    catalog: &ActionCatalog<M>,
    budget: StepBudget,
) -> Result<TrialSummary, TrialError> {
    let check: &CheckFn<'_, M> = &M::check;
    repeat(trial, machine, catalog, Some(check), budget)
}

fn run_check<M>(
    trial: &mut Trial<'_>,
    machine: &M,
    check: Option<&CheckFn<'_, M>>,
) -> Result<(), TrialError> {
    trial.enter(Origin::Check);
    if let Some(check) = check {
        check(machine, trial).map_err(|err| TrialError::from_action(Origin::Check, err))?;
    }
    trial.surface_deferred()
}
