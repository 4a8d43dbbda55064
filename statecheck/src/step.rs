//! Orchestration for a single step: draw an action, run it, classify, retry.

use tracing::{debug, warn};

use crate::core::action::ActionCatalog;
use crate::core::error::{Origin, TrialError};
use crate::core::outcome::Outcome;
use crate::trial::Trial;

/// Label of the draw group wrapping each "pick an action" choice.
pub const ACTION_LABEL: &str = "action";

/// Default bound on costly inapplicable attempts per step.
pub const DEFAULT_MAX_COSTLY_ATTEMPTS: u32 = 100;

/// Retry policy for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Inapplicable attempts that consumed entropy before the step fails with
    /// [`TrialError::NoValidAction`]. Free attempts never count.
    pub max_costly_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_costly_attempts: DEFAULT_MAX_COSTLY_ATTEMPTS,
        }
    }
}

/// Result of a step that ran one action to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Name of the action that completed.
    pub action: String,
    /// Inapplicable attempts that consumed no entropy.
    pub free_retries: u32,
    /// Inapplicable attempts that consumed entropy.
    pub costly_retries: u32,
}

/// Execute one step of a trial.
///
/// Draws actions from `catalog` until one runs to completion. Inapplicable
/// attempts are retried: free ones (no draw between action start and the
/// signal) without limit, costly ones up to `policy.max_costly_attempts`.
/// Every other error is fatal and is returned without retrying.
pub fn execute_step<M>(
    trial: &mut Trial<'_>,
    machine: &mut M,
    catalog: &ActionCatalog<M>,
    policy: RetryPolicy,
) -> Result<StepReport, TrialError> {
    let mut free_retries = 0u32;
    let mut costly_retries = 0u32;

    loop {
        let group = trial.source_mut().begin_group(ACTION_LABEL, false);
        let index = match trial.source_mut().sample_index(ACTION_LABEL, catalog.len()) {
            Ok(index) => index,
            Err(exhausted) => {
                trial.source_mut().end_group(group, false);
                return Err(exhausted.into());
            }
        };
        let action = catalog.pick(index);

        trial.enter(Origin::action(action.name()));
        let draws_before = trial.draws();
        let result = action.run(machine, trial);
        let outcome = Outcome::classify(result, draws_before, trial.draws());
        trial.source_mut().end_group(group, false);

        match outcome {
            Outcome::Completed => {
                debug!(action = action.name(), free_retries, costly_retries, "action completed");
                trial.record_step(action.name());
                trial.surface_deferred()?;
                return Ok(StepReport {
                    action: action.name().to_string(),
                    free_retries,
                    costly_retries,
                });
            }
            Outcome::Inapplicable {
                consumed_entropy: false,
            } => {
                free_retries += 1;
                debug!(action = action.name(), "action inapplicable, free retry");
            }
            Outcome::Inapplicable {
                consumed_entropy: true,
            } => {
                costly_retries += 1;
                debug!(
                    action = action.name(),
                    attempt = costly_retries,
                    "action inapplicable after drawing, costly retry"
                );
                if costly_retries >= policy.max_costly_attempts {
                    warn!(attempts = costly_retries, "no valid action found for step");
                    return Err(TrialError::NoValidAction {
                        attempts: costly_retries,
                    });
                }
            }
            Outcome::Fatal(err) => {
                return Err(TrialError::from_action(Origin::action(action.name()), err));
            }
        }
    }
}
