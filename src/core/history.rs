//! Phase change history.
//!
//! Keeps the ordered record of every phase change the sequencer went
//! through, so the ordering of a transition can be inspected after the fact.

use super::state::State;
use crate::table::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single phase change.
///
/// # Example
///
/// ```rust
/// use reelpath::core::{Phase, PhaseChange};
/// use chrono::Utc;
///
/// let change = PhaseChange {
///     from: Phase::Idle,
///     to: Phase::Loading,
///     node: Some("walk1".into()),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(change.to, Phase::Loading);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PhaseChange<S: State> {
    /// The phase being left
    pub from: S,
    /// The phase being entered
    pub to: S,
    /// Node the sequencer had loaded (or was loading) at the time
    pub node: Option<NodeId>,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of phase changes.
///
/// A history built with [`PhaseHistory::bounded`] keeps only the most recent
/// `limit` changes; older ones are dropped as new ones arrive.
///
/// # Example
///
/// ```rust
/// use reelpath::core::{Phase, PhaseChange, PhaseHistory};
/// use chrono::Utc;
///
/// let mut history = PhaseHistory::new();
/// history.record(PhaseChange {
///     from: Phase::Idle,
///     to: Phase::Loading,
///     node: Some("walk1".into()),
///     timestamp: Utc::now(),
/// });
/// history.record(PhaseChange {
///     from: Phase::Loading,
///     to: Phase::Playing,
///     node: Some("walk1".into()),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&Phase::Idle, &Phase::Loading, &Phase::Playing]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PhaseHistory<S: State> {
    changes: Vec<PhaseChange<S>>,
    #[serde(default)]
    limit: Option<usize>,
}

impl<S: State> Default for PhaseHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> PhaseHistory<S> {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
            limit: None,
        }
    }

    /// History that retains at most `limit` changes.
    pub fn bounded(limit: usize) -> Self {
        Self::new().with_limit(limit)
    }

    /// Cap this history at `limit` changes, dropping the oldest if needed.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self.trim();
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Append a change.
    pub fn record(&mut self, change: PhaseChange<S>) {
        self.changes.push(change);
        self.trim();
    }

    fn trim(&mut self) {
        if let Some(limit) = self.limit {
            let excess = self.changes.len().saturating_sub(limit);
            self.changes.drain(..excess);
        }
    }

    /// Phases traversed: the first `from`, then every `to` in order.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.changes.first() {
            path.push(&first.from);
        }
        for change in &self.changes {
            path.push(&change.to);
        }
        path
    }

    /// Time between the first and the last recorded change.
    ///
    /// Returns `None` if nothing was recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.changes.first(), self.changes.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// Index of the first change that entered `phase`.
    pub fn position_of(&self, phase: &S) -> Option<usize> {
        self.changes.iter().position(|change| &change.to == phase)
    }

    /// Index of the last change that entered `phase`.
    pub fn last_position_of(&self, phase: &S) -> Option<usize> {
        self.changes.iter().rposition(|change| &change.to == phase)
    }

    pub fn last(&self) -> Option<&PhaseChange<S>> {
        self.changes.last()
    }

    pub fn changes(&self) -> &[PhaseChange<S>] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
