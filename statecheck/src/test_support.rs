//! Test-only entropy sources and fixture machines.

use std::collections::VecDeque;

use crate::core::action::{Action, StateMachine};
use crate::core::outcome::ActionResult;
use crate::io::entropy::{EntropySource, Exhausted, GroupId};
use crate::trial::Trial;

/// Entropy source that returns predetermined draws.
///
/// Each scripted value is reduced modulo the requested bound. Running out of
/// script yields [`Exhausted`] unless the source was built with
/// [`ScriptedSource::repeating`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: VecDeque<u64>,
    repeat: Option<u64>,
    draws: u64,
    open: Vec<GroupId>,
    next_group: usize,
    closed: usize,
}

impl ScriptedSource {
    pub fn new(script: Vec<u64>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    /// Source that returns `value` forever.
    pub fn repeating(value: u64) -> Self {
        Self {
            repeat: Some(value),
            ..Self::default()
        }
    }

    pub fn open_groups(&self) -> usize {
        self.open.len()
    }

    pub fn groups_closed(&self) -> usize {
        self.closed
    }

    /// Fail unless every scripted value was consumed.
    pub fn assert_drained(&self) -> Result<(), String> {
        if self.script.is_empty() {
            Ok(())
        } else {
            Err(format!("{} scripted draws unused", self.script.len()))
        }
    }
}

impl EntropySource for ScriptedSource {
    fn begin_group(&mut self, _label: &str, _user_facing: bool) -> GroupId {
        let group = GroupId(self.next_group);
        self.next_group += 1;
        self.open.push(group);
        group
    }

    fn end_group(&mut self, group: GroupId, _discard: bool) {
        if let Some(position) = self.open.iter().rposition(|open| *open == group) {
            self.open.remove(position);
            self.closed += 1;
        }
    }

    fn draws(&self) -> u64 {
        self.draws
    }

    fn draw(&mut self, _label: &str, bound: u64) -> Result<u64, Exhausted> {
        let raw = match self.script.pop_front().or(self.repeat) {
            Some(raw) => raw,
            None => return Err(Exhausted { draws: self.draws }),
        };
        self.draws += 1;
        Ok(raw % bound.max(1))
    }
}

/// Machine whose behavior is fixed per action, for driver tests.
///
/// `free_skip` is inapplicable before drawing, `costly_skip` after one draw,
/// `succeed` always completes and bumps `completed`.
#[derive(Debug, Default)]
pub struct FixtureMachine {
    pub completed: u32,
    pub skipped: u32,
}

impl FixtureMachine {
    pub fn free_skip(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        self.skipped += 1;
        trial.assume(false)
    }

    pub fn costly_skip(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        self.skipped += 1;
        trial.draw("payload", 4)?;
        trial.assume(false)
    }

    pub fn succeed(&mut self, _trial: &mut Trial<'_>) -> ActionResult {
        self.completed += 1;
        Ok(())
    }
}

impl StateMachine for FixtureMachine {
    fn actions() -> Vec<Action<Self>> {
        vec![
            Action::new("free_skip", Self::free_skip),
            Action::new("succeed", Self::succeed),
        ]
    }
}
