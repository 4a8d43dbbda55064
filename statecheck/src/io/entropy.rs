//! Entropy engine abstraction consumed by the action executor.
//!
//! The [`EntropySource`] trait decouples action selection from the engine that
//! produces (and later shrinks) random choices. Tests use scripted sources that
//! return predetermined draws without any randomness.

use serde::Serialize;
use thiserror::Error;

/// Signal raised by an engine that cannot supply another draw.
///
/// This aborts the current trial; it is never a bug in the system under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("entropy source exhausted after {draws} draws")]
pub struct Exhausted {
    pub draws: u64,
}

/// Handle for an open draw group, returned by [`EntropySource::begin_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub usize);

/// Source of draws for a single trial.
///
/// Implementations must keep [`EntropySource::draws`] monotonically
/// non-decreasing for the lifetime of a trial.
pub trait EntropySource {
    /// Open a labeled group. Draws made until the matching `end_group` belong to it.
    fn begin_group(&mut self, label: &str, user_facing: bool) -> GroupId;

    /// Close a group opened by `begin_group`. `discard` marks its draws as irrelevant
    /// to the final result.
    fn end_group(&mut self, group: GroupId, discard: bool);

    /// Number of draws consumed so far. Pure query.
    fn draws(&self) -> u64;

    /// Draw a value in `0..bound`. A `bound` of zero is treated as one.
    fn draw(&mut self, label: &str, bound: u64) -> Result<u64, Exhausted>;

    /// Choose an index into a collection of `len` elements.
    ///
    /// Selection policy (uniform, weighted, shrink-biased) belongs to the engine.
    fn sample_index(&mut self, label: &str, len: usize) -> Result<usize, Exhausted> {
        let value = self.draw(label, len as u64)?;
        Ok(value as usize)
    }
}

/// One recorded draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRecord {
    pub label: String,
    pub bound: u64,
    pub value: u64,
}

/// One recorded group, spanning draw indices `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRecord {
    pub label: String,
    pub user_facing: bool,
    pub start: usize,
    /// `None` while the group is still open.
    pub end: Option<usize>,
    pub discarded: bool,
}

/// Shared draw/group bookkeeping for the bundled engines.
///
/// Keeps the choice sequence and its grouping so an external shrinker can
/// attribute draws to logical units (for example, one "pick an action" choice).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawLog {
    pub draws: Vec<DrawRecord>,
    pub groups: Vec<GroupRecord>,
}

impl DrawLog {
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn begin(&mut self, label: &str, user_facing: bool) -> GroupId {
        self.groups.push(GroupRecord {
            label: label.to_string(),
            user_facing,
            start: self.draws.len(),
            end: None,
            discarded: false,
        });
        GroupId(self.groups.len() - 1)
    }

    pub fn end(&mut self, group: GroupId, discard: bool) {
        let end = self.draws.len();
        match self.groups.get_mut(group.0) {
            Some(record) if record.end.is_none() => {
                record.end = Some(end);
                record.discarded = discard;
            }
            Some(_) => tracing::warn!(group = group.0, "draw group closed twice"),
            None => tracing::warn!(group = group.0, "unknown draw group closed"),
        }
    }

    pub fn record(&mut self, label: &str, bound: u64, value: u64) {
        self.draws.push(DrawRecord {
            label: label.to_string(),
            bound,
            value,
        });
    }

    /// Raw choice values in draw order, suitable for `ReplaySource`.
    pub fn choices(&self) -> Vec<u64> {
        self.draws.iter().map(|draw| draw.value).collect()
    }

    /// Groups that are still open.
    pub fn open_groups(&self) -> impl Iterator<Item = &GroupRecord> {
        self.groups.iter().filter(|group| group.end.is_none())
    }
}
