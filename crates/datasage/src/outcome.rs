//! Per-column results for steps that may fail one column at a time.

use serde::Serialize;

/// Result of processing a single column.
///
/// A skipped column is left untouched (or left out of a result map) while the
/// rest of the table is still processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ColumnOutcome<T> {
    /// The column was processed.
    Completed(T),
    /// The column was left alone.
    Skipped { reason: String },
}

impl<T> ColumnOutcome<T> {
    /// Build a skipped outcome.
    pub fn skipped(reason: impl Into<String>) -> Self {
        ColumnOutcome::Skipped {
            reason: reason.into(),
        }
    }

    /// The completed value, if any.
    pub fn completed(&self) -> Option<&T> {
        match self {
            ColumnOutcome::Completed(value) => Some(value),
            ColumnOutcome::Skipped { .. } => None,
        }
    }

    /// The skip reason, if any.
    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            ColumnOutcome::Completed(_) => None,
            ColumnOutcome::Skipped { reason } => Some(reason),
        }
    }

    /// Whether the column was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, ColumnOutcome::Skipped { .. })
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ColumnOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => ColumnOutcome::Completed(value),
            Err(e) => ColumnOutcome::skipped(e.to_string()),
        }
    }
}
