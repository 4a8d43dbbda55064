//! Deterministic pseudo-random engine seeded from a `u64`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::io::entropy::{DrawLog, EntropySource, Exhausted, GroupId};

/// Default cap on draws per trial.
pub const DEFAULT_MAX_DRAWS: u64 = 100_000;

/// Engine backed by `StdRng`.
///
/// Every draw and group is recorded in a [`DrawLog`]; once `max_draws` draws
/// have been made every further draw returns [`Exhausted`].
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
    max_draws: u64,
    log: DrawLog,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self::with_max_draws(seed, DEFAULT_MAX_DRAWS)
    }

    pub fn with_max_draws(seed: u64, max_draws: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_draws,
            log: DrawLog::default(),
        }
    }

    pub fn log(&self) -> &DrawLog {
        &self.log
    }
}

impl EntropySource for SeededSource {
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
        let draws = self.draws();
        if draws >= self.max_draws {
            return Err(Exhausted { draws });
        }
        let bound = bound.max(1);
        let value = self.rng.gen_range(0..bound);
        self.log.record(label, bound, value);
        Ok(value)
    }
}
