//! Action results and their classification.

use thiserror::Error;

use crate::io::entropy::Exhausted;

/// Signal an action (or invariant check) returns instead of completing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Not valid in the current state; the executor tries another action.
    #[error("action is not applicable in the current state")]
    Inapplicable,
    /// The entropy engine ran out of draws mid-action.
    #[error(transparent)]
    Exhausted(#[from] Exhausted),
    /// A correctness assertion failed.
    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result type every action body and invariant check returns.
pub type ActionResult = Result<(), ActionError>;

/// Classification of one action run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// `consumed_entropy` is true when any draw happened between the start of
    /// the action and the inapplicable signal.
    Inapplicable { consumed_entropy: bool },
    Fatal(ActionError),
}

impl Outcome {
    /// Classify `result` given the draw counter before and after the run.
    pub fn classify(result: ActionResult, draws_before: u64, draws_after: u64) -> Self {
        debug_assert!(
            draws_after >= draws_before,
            "draw counter went backwards ({draws_before} -> {draws_after})"
        );
        match result {
            Ok(()) => Self::Completed,
            Err(ActionError::Inapplicable) => Self::Inapplicable {
                consumed_entropy: draws_after != draws_before,
            },
            Err(err) => Self::Fatal(err),
        }
    }
}
