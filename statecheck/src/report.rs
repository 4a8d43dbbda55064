//! Serializable trial and run reports.

use serde::Serialize;

use crate::core::error::{FailureKind, TrialError};
use crate::exit_codes;
use crate::io::entropy::DrawLog;
use crate::repeat::TrialSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Passed,
    /// A bug was found.
    Failed,
    /// The trial was aborted without finding a bug (exhausted or rejected).
    Invalid,
}

/// Outcome of one trial, with everything needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialReport {
    pub status: TrialStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Completed actions, in order.
    pub trace: Vec<String>,
    /// Raw choices consumed; feed to `statecheck replay` to reproduce.
    pub choices: Vec<u64>,
}

impl TrialReport {
    pub fn new(
        seed: Option<u64>,
        result: &Result<TrialSummary, TrialError>,
        trace: &[String],
        log: &DrawLog,
    ) -> Self {
        let (status, kind, message) = match result {
            Ok(_) => (TrialStatus::Passed, None, None),
            Err(err) => {
                let status = if err.is_bug() {
                    TrialStatus::Failed
                } else {
                    TrialStatus::Invalid
                };
                (status, Some(err.kind()), Some(err.to_string()))
            }
        };
        Self {
            status,
            seed,
            kind,
            message,
            trace: trace.to_vec(),
            choices: log.choices(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.status {
            TrialStatus::Failed => exit_codes::FAILED,
            TrialStatus::Passed | TrialStatus::Invalid => exit_codes::OK,
        }
    }
}

/// Outcome of a multi-trial run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub trials: u32,
    pub passed: u32,
    pub invalid: u32,
    /// First trial that found a bug; the run stops there.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TrialReport>,
}

impl RunReport {
    pub fn record(&mut self, report: TrialReport) {
        self.trials += 1;
        match report.status {
            TrialStatus::Passed => self.passed += 1,
            TrialStatus::Invalid => self.invalid += 1,
            TrialStatus::Failed => self.failure = Some(report),
        }
    }

    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed() {
            exit_codes::FAILED
        } else {
            exit_codes::OK
        }
    }
}
