//! Trial-level and configuration errors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::core::outcome::ActionError;
use crate::io::entropy::Exhausted;

/// Which part of a trial raised a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Check,
    Action(String),
}

impl Origin {
    pub fn action(name: &str) -> Self {
        Self::Action(name.to_string())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check => f.write_str("invariant check"),
            Self::Action(name) => write!(f, "action {name:?}"),
        }
    }
}

/// Fatal error that ends a trial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrialError {
    /// Every attempt for one step was inapplicable after consuming entropy.
    #[error("can't find a valid (non-skipped) action after {attempts} attempts")]
    NoValidAction { attempts: u32 },
    #[error("{origin} failed: {message}")]
    Assertion { origin: Origin, message: String },
    #[error("entropy source exhausted after {draws} draws")]
    Exhausted { draws: u64 },
    /// Inapplicable raised outside action selection; the trial is discarded.
    #[error("trial rejected: {origin} signaled inapplicable outside action selection")]
    Rejected { origin: Origin },
}

/// Reporting category of a [`TrialError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoValidAction,
    Assertion,
    Exhausted,
    Rejected,
}

impl TrialError {
    /// Map a signal raised by `origin` to the trial error it causes.
    ///
    /// Callers that handle `Inapplicable` themselves (the executor) must do so
    /// before calling this.
    pub fn from_action(origin: Origin, err: ActionError) -> Self {
        match err {
            ActionError::Inapplicable => Self::Rejected { origin },
            ActionError::Exhausted(exhausted) => Self::Exhausted {
                draws: exhausted.draws,
            },
            ActionError::Failed(message) => Self::Assertion { origin, message },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoValidAction { .. } => FailureKind::NoValidAction,
            Self::Assertion { .. } => FailureKind::Assertion,
            Self::Exhausted { .. } => FailureKind::Exhausted,
            Self::Rejected { .. } => FailureKind::Rejected,
        }
    }

    /// True for failures that point at a bug rather than an invalid trial.
    pub fn is_bug(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::NoValidAction | FailureKind::Assertion
        )
    }
}

impl From<Exhausted> for TrialError {
    fn from(exhausted: Exhausted) -> Self {
        Self::Exhausted {
            draws: exhausted.draws,
        }
    }
}

/// Invalid action catalog, detected before any trial runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("state machine of type {machine} has no actions specified")]
    Empty { machine: &'static str },
    #[error("action #{index} of state machine {machine} has an empty name")]
    BlankName { machine: &'static str, index: usize },
}
