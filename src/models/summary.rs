//! Per-category count summaries.

use crate::models::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-category tally of entities processed by one export or import run.
///
/// Produced exactly once per successful run; the sole observable success
/// artifact returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSummary {
    counts: BTreeMap<EntityKind, u64>,
}

impl CountSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one processed entity of the given kind.
    pub fn record(&mut self, kind: EntityKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    /// Returns the count for one kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Returns the total across all kinds.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Returns whether nothing was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: &Self) {
        for (kind, count) in &other.counts {
            *self.counts.entry(*kind).or_insert(0) += count;
        }
    }
}

impl fmt::Display for CountSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, count) in &self.counts {
            write!(f, "{kind}={count} ")?;
        }
        write!(f, "total={}", self.total())
    }
}
