//! Bundled demo machine: a fixed-capacity ring queue checked against a
//! `VecDeque` model.
//!
//! The `buggy` variant derives its length from the head/tail indices alone,
//! which reads as empty once the ring is full. Running it long enough finds
//! the bug through the invariant check.

use std::collections::VecDeque;

use tracing::debug;

use crate::core::action::{Action, ActionCatalog, StateMachine};
use crate::core::error::CatalogError;
use crate::core::outcome::ActionResult;
use crate::io::config::RepeatConfig;
use crate::io::replay::ReplaySource;
use crate::io::seeded::SeededSource;
use crate::repeat::{StepBudget, repeat_machine};
use crate::report::{RunReport, TrialReport};
use crate::trial::Trial;

pub const DEFAULT_CAPACITY: usize = 4;

/// Largest value pushed by the demo.
const MAX_VALUE: u64 = 99;

/// Fixed-capacity FIFO over a ring buffer.
#[derive(Debug, Clone)]
pub struct RingQueue {
    slots: Vec<u64>,
    head: usize,
    tail: usize,
    len: usize,
    buggy: bool,
}

impl RingQueue {
    pub fn new(capacity: usize, buggy: bool) -> Self {
        Self {
            slots: vec![0; capacity.max(1)],
            head: 0,
            tail: 0,
            len: 0,
            buggy,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        if self.buggy {
            (self.tail + self.capacity() - self.head) % self.capacity()
        } else {
            self.len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns false when full.
    pub fn push(&mut self, value: u64) -> bool {
        if self.len == self.capacity() {
            return false;
        }
        self.slots[self.tail] = value;
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;
        true
    }

    pub fn pop(&mut self) -> Option<u64> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(value)
    }

    /// Element `offset` positions behind the head.
    pub fn get(&self, offset: usize) -> Option<u64> {
        if offset >= self.len {
            return None;
        }
        Some(self.slots[(self.head + offset) % self.capacity()])
    }
}

/// Ring queue paired with its reference model.
#[derive(Debug, Clone)]
pub struct QueueMachine {
    queue: RingQueue,
    model: VecDeque<u64>,
}

impl QueueMachine {
    pub fn new(capacity: usize, buggy: bool) -> Self {
        let queue = RingQueue::new(capacity, buggy);
        let model = VecDeque::with_capacity(queue.capacity());
        Self { queue, model }
    }

    fn push(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        trial.assume(self.model.len() < self.queue.capacity())?;
        let value = trial.draw_range("value", 0, MAX_VALUE)?;
        trial.ensure(self.queue.push(value), "push rejected below capacity")?;
        self.model.push_back(value);
        Ok(())
    }

    fn pop(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        trial.assume(!self.model.is_empty())?;
        let got = self.queue.pop();
        let want = self.model.pop_front();
        trial.ensure_eq(got, want, "popped value")
    }

    /// Draws an offset first, so a miss costs entropy.
    fn peek(&mut self, trial: &mut Trial<'_>) -> ActionResult {
        let offset = trial.draw("offset", self.queue.capacity() as u64)? as usize;
        trial.assume(offset < self.model.len())?;
        trial.ensure_eq(
            self.queue.get(offset),
            self.model.get(offset).copied(),
            "peeked value",
        )
    }
}

impl Default for QueueMachine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, false)
    }
}

impl StateMachine for QueueMachine {
    fn actions() -> Vec<Action<Self>> {
        vec![
            Action::new("push", Self::push),
            Action::new("pop", Self::pop),
            Action::new("peek", Self::peek),
        ]
    }

    fn check(&self, trial: &mut Trial<'_>) -> ActionResult {
        trial.ensure_eq(self.queue.len(), self.model.len(), "queue length")?;
        trial.ensure(
            self.queue.len() <= self.queue.capacity(),
            "queue length exceeds capacity",
        )
    }
}

/// Run up to `trials` seeded trials of the demo machine, stopping at the
/// first one that finds a bug. Seeds count up from `config.seed` (random
/// when unset).
pub fn run_trials(
    config: &RepeatConfig,
    trials: u32,
    capacity: usize,
    buggy: bool,
) -> Result<RunReport, CatalogError> {
    let catalog = ActionCatalog::<QueueMachine>::from_machine()?;
    let base_seed = config.seed.unwrap_or_else(rand::random);
    let budget = config.budget();

    let mut run = RunReport::default();
    for offset in 0..trials {
        let seed = base_seed.wrapping_add(u64::from(offset));
        let mut source = SeededSource::with_max_draws(seed, config.max_draws);
        let mut machine = QueueMachine::new(capacity, buggy);
        let mut trial = Trial::new(&mut source);
        let result = repeat_machine(&mut trial, &mut machine, &catalog, budget);
        let trace = trial.trace().to_vec();

        let report = TrialReport::new(Some(seed), &result, &trace, source.log());
        debug!(seed, status = ?report.status, steps = trace.len(), "trial done");
        run.record(report);
        if run.failed() {
            break;
        }
    }
    Ok(run)
}

/// Re-run the demo machine on a recorded choice sequence.
pub fn replay(
    choices: Vec<u64>,
    budget: StepBudget,
    capacity: usize,
    buggy: bool,
) -> Result<TrialReport, CatalogError> {
    let catalog = ActionCatalog::<QueueMachine>::from_machine()?;
    let mut source = ReplaySource::new(choices);
    let mut machine = QueueMachine::new(capacity, buggy);
    let mut trial = Trial::new(&mut source);
    let result = repeat_machine(&mut trial, &mut machine, &catalog, budget);
    let trace = trial.trace().to_vec();
    Ok(TrialReport::new(None, &result, &trace, source.log()))
}
