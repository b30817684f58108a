//! Temporal export windows.

use crate::ConfigError;
use std::fmt;

/// A half-open time range `[from, to)` restricting which entity versions
/// an export includes.
///
/// Both bounds are epoch milliseconds in the same monotonic domain as
/// entity version stamps. A window is immutable once constructed and is
/// owned solely by the export call that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemporalWindow {
    /// Start (inclusive), epoch milliseconds.
    from_ms: i64,
    /// End (exclusive), epoch milliseconds.
    to_ms: i64,
}

impl TemporalWindow {
    /// Validates an optional pair of window bounds.
    ///
    /// Neither bound given means "no window": the export is a full
    /// export. Both bounds given yields a window. A half-specified
    /// window is a configuration error, as is an inverted one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompleteWindow`] if exactly one bound is
    /// given, and [`ConfigError::InvertedWindow`] if both are given with
    /// `from >= to`.
    pub const fn validate(
        from_ms: Option<i64>,
        to_ms: Option<i64>,
    ) -> Result<Option<Self>, ConfigError> {
        match (from_ms, to_ms) {
            (None, None) => Ok(None),
            (Some(from), Some(to)) => {
                if from < to {
                    Ok(Some(Self {
                        from_ms: from,
                        to_ms: to,
                    }))
                } else {
                    Err(ConfigError::InvertedWindow { from, to })
                }
            },
            _ => Err(ConfigError::IncompleteWindow),
        }
    }

    /// Returns the window start (inclusive), epoch milliseconds.
    #[must_use]
    pub const fn from_ms(&self) -> i64 {
        self.from_ms
    }

    /// Returns the window end (exclusive), epoch milliseconds.
    #[must_use]
    pub const fn to_ms(&self) -> i64 {
        self.to_ms
    }

    /// Checks whether a version stamp falls within the window.
    #[must_use]
    pub const fn contains(&self, stamp_ms: i64) -> bool {
        stamp_ms >= self.from_ms && stamp_ms < self.to_ms
    }
}

impl fmt::Display for TemporalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from_ms, self.to_ms)
    }
}
