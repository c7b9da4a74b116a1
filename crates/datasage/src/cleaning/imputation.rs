//! Filling missing values column by column.

use serde::Serialize;

use crate::config::ImputeStrategy;
use crate::schema::{Column, Value};
use crate::stats::{StreamingStats, median};

/// Fill value for missing cells in non-numeric columns.
pub const MISSING_TEXT_SENTINEL: &str = "Unknown";

/// What was done to one column's missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imputation {
    /// `mean`, `median` or `sentinel`.
    pub method: &'static str,
    /// The fill value. `null` when the column had nothing to average.
    pub value: Value,
    /// Number of cells filled.
    pub filled: usize,
}

/// Chooses and applies a fill value per column.
#[derive(Debug, Clone, Copy)]
pub struct ImputationPolicy {
    strategy: ImputeStrategy,
}

impl ImputationPolicy {
    /// Create a policy using `strategy` for numeric columns.
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    /// The value missing cells of `column` would be filled with.
    ///
    /// Numeric columns get the mean or median of their present values, or
    /// [`Value::Missing`] when there are none. Other columns get the sentinel.
    pub fn fill_value(&self, column: &Column) -> Value {
        if !column.dtype.is_numeric() {
            return Value::text(MISSING_TEXT_SENTINEL);
        }

        let statistic = match self.strategy {
            ImputeStrategy::Mean => column.numbers().collect::<StreamingStats>().mean(),
            ImputeStrategy::Median => median(column.numbers()),
        };
        statistic.map_or(Value::Missing, Value::Number)
    }

    /// Fill the missing cells of `column`. Returns `None` if nothing was missing.
    pub fn apply(&self, column: &mut Column) -> Option<Imputation> {
        if !column.has_missing() {
            return None;
        }

        let method = if column.dtype.is_numeric() {
            self.strategy.label()
        } else {
            "sentinel"
        };

        let value = self.fill_value(column);
        let mut filled = 0;
        if !value.is_missing() {
            for cell in column.values.iter_mut().filter(|v| v.is_missing()) {
                *cell = value.clone();
                filled += 1;
            }
        }

        Some(Imputation {
            method,
            value,
            filled,
        })
    }
}
