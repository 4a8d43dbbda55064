//! Engine that replays a recorded choice sequence.
//!
//! Feeding the choices of a failing trial back through the same machine
//! reproduces it exactly, independent of the RNG that produced them.

use crate::io::entropy::{DrawLog, EntropySource, Exhausted, GroupId};

#[derive(Debug, Clone)]
pub struct ReplaySource {
    choices: Vec<u64>,
    log: DrawLog,
}

impl ReplaySource {
    pub fn new(choices: Vec<u64>) -> Self {
        Self {
            choices,
            log: DrawLog::default(),
        }
    }

    /// Choices not consumed yet.
    pub fn remaining(&self) -> usize {
        self.choices.len().saturating_sub(self.log.len())
    }

    pub fn log(&self) -> &DrawLog {
        &self.log
    }
}

impl EntropySource for ReplaySource {
    fn begin_group(&mut self, label: &str, user_facing: bool) -> GroupId {
        self.log.begin(label, user_facing)
    }

    fn end_group(&mut self, group: GroupId, discard: bool) {
        self.log.end(group, discard);
    }

    fn draws(&self) -> u64 {
        self.log.len() as u64
    }

    fn draw(&mut self, label: &str, bound: u64) -> Result<u64, Exhausted> {
        let Some(&raw) = self.choices.get(self.log.len()) else {
            return Err(Exhausted {
                draws: self.draws(),
            });
        };
        let bound = bound.max(1);
        // Edited or truncated recordings may not fit the bound asked for now.
        let value = raw % bound;
        self.log.record(label, bound, value);
        Ok(value)
    }
}
