//! Per-trial context handed to actions and invariant checks.

use std::fmt::Debug;

use crate::core::error::{Origin, TrialError};
use crate::core::outcome::{ActionError, ActionResult};
use crate::io::entropy::EntropySource;

/// Mutable state owned by one trial.
///
/// Holds the exclusive borrow of the entropy engine, so two trials can never
/// draw from the same engine at once.
pub struct Trial<'s> {
    source: &'s mut dyn EntropySource,
    phase: Origin,
    deferred: Vec<(Origin, String)>,
    trace: Vec<String>,
}

impl<'s> Trial<'s> {
    pub fn new(source: &'s mut dyn EntropySource) -> Self {
        Self {
            source,
            phase: Origin::Check,
            deferred: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Draws consumed so far by the whole trial.
    pub fn draws(&self) -> u64 {
        self.source.draws()
    }

    /// Names of the actions that ran to completion, in order.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Draw a value in `0..bound`.
    pub fn draw(&mut self, label: &str, bound: u64) -> Result<u64, ActionError> {
        Ok(self.source.draw(label, bound)?)
    }

    /// Draw a value in `lo..=hi`.
    pub fn draw_range(&mut self, label: &str, lo: u64, hi: u64) -> Result<u64, ActionError> {
        if lo > hi {
            return Err(ActionError::failed(format!(
                "{label}: empty range {lo}..={hi}"
            )));
        }
        match (hi - lo).checked_add(1) {
            Some(span) => Ok(lo + self.draw(label, span)?),
            // Full u64 range: two halves.
            None => {
                let high = self.draw(label, 1 << 32)?;
                let low = self.draw(label, 1 << 32)?;
                Ok((high << 32) | low)
            }
        }
    }

    pub fn draw_bool(&mut self, label: &str) -> Result<bool, ActionError> {
        Ok(self.draw(label, 2)? == 1)
    }

    /// Pick one element of `items`. An empty slice is inapplicable.
    pub fn pick<'a, T>(&mut self, label: &str, items: &'a [T]) -> Result<&'a T, ActionError> {
        if items.is_empty() {
            return Err(ActionError::Inapplicable);
        }
        let index = self.source.sample_index(label, items.len())?;
        Ok(&items[index % items.len()])
    }

    /// Declare the running action inapplicable unless `condition` holds.
    pub fn assume(&self, condition: bool) -> ActionResult {
        if condition {
            Ok(())
        } else {
            Err(ActionError::Inapplicable)
        }
    }

    pub fn ensure(&self, condition: bool, message: impl Into<String>) -> ActionResult {
        if condition {
            Ok(())
        } else {
            Err(ActionError::failed(message))
        }
    }

    pub fn ensure_eq<T: PartialEq + Debug>(&self, left: T, right: T, what: &str) -> ActionResult {
        if left == right {
            return Ok(());
        }
        Err(ActionError::failed(format!(
            "{what}: {left:?} != {right:?}"
        )))
    }

    /// Record a failure without stopping the current action.
    ///
    /// Surfaced as fatal once the action completes or the check returns.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(origin = %self.phase, message = %message, "deferred failure recorded");
        self.deferred.push((self.phase.clone(), message));
    }

    pub fn has_failed(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub(crate) fn source_mut(&mut self) -> &mut dyn EntropySource {
        &mut *self.source
    }

    pub(crate) fn enter(&mut self, phase: Origin) {
        self.phase = phase;
    }

    pub(crate) fn record_step(&mut self, action: &str) {
        self.trace.push(action.to_string());
    }

    /// Turn recorded deferred failures into a fatal error.
    pub(crate) fn surface_deferred(&mut self) -> Result<(), TrialError> {
        if self.deferred.is_empty() {
            return Ok(());
        }
        let deferred = std::mem::take(&mut self.deferred);
        let origin = deferred[0].0.clone();
        let message = deferred
            .into_iter()
            .map(|(_, message)| message)
            .collect::<Vec<_>>()
            .join("; ");
        Err(TrialError::Assertion { origin, message })
    }
}
