//! Validation rules and the checks they compile to.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DataSageError, Result};
use crate::schema::Column;

/// Constraints on a single column. Every present constraint is checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Column the rule applies to. Rules naming absent columns are skipped.
    pub column: String,
    /// Numeric values must be at least this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Numeric values must be at most this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Every value must fully match this pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    /// Values must not repeat.
    #[serde(default)]
    pub unique: bool,
}

impl ValidationRule {
    /// Create a rule with no constraints.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ..Default::default()
        }
    }

    /// Set the lower bound.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the pattern.
    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// Require unique values.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Check that the rule can be compiled.
    pub fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }

    /// Lower the rule into its checks, in the order min, max, regex, unique.
    pub fn compile(&self) -> Result<CompiledRule> {
        let mut checks = Vec::new();

        if let Some(min) = self.min {
            checks.push(Check::Min(finite_bound(&self.column, "min", min)?));
        }
        if let Some(max) = self.max {
            checks.push(Check::Max(finite_bound(&self.column, "max", max)?));
        }
        if let Some(ref pattern) = self.regex {
            let anchored = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                DataSageError::Config(format!(
                    "invalid regex for column '{}': {}",
                    self.column, e
                ))
            })?;
            checks.push(Check::Pattern {
                source: pattern.clone(),
                regex: anchored,
            });
        }
        if self.unique {
            checks.push(Check::Unique);
        }

        Ok(CompiledRule {
            column: self.column.clone(),
            checks,
        })
    }
}

fn finite_bound(column: &str, key: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataSageError::Config(format!(
            "{} for column '{}' must be a finite number",
            key, column
        )))
    }
}

/// A rule ready to run against a table.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Target column.
    pub column: String,
    /// Checks in evaluation order.
    pub checks: Vec<Check>,
}

/// One constraint kind.
#[derive(Debug, Clone)]
pub enum Check {
    /// Count numeric values strictly below the bound.
    Min(f64),
    /// Count numeric values strictly above the bound.
    Max(f64),
    /// Count values whose text form does not fully match.
    Pattern { source: String, regex: Regex },
    /// Count rows sharing their value with another row.
    Unique,
}

impl Check {
    /// Evaluate against a column, returning an issue description when violated.
    pub fn evaluate(&self, column: &Column) -> Option<String> {
        let count = self.violations(column);
        if count == 0 {
            return None;
        }

        Some(match self {
            Check::Min(min) => format!("{} values below {}", count, min),
            Check::Max(max) => format!("{} values above {}", count, max),
            Check::Pattern { source, .. } => {
                format!("{} values do not match regex {}", count, source)
            }
            Check::Unique => format!("{} duplicate values found", count),
        })
    }

    /// Number of offending values (or rows, for uniqueness).
    pub fn violations(&self, column: &Column) -> usize {
        match self {
            Check::Min(min) => column.numbers().filter(|n| n < min).count(),
            Check::Max(max) => column.numbers().filter(|n| n > max).count(),
            Check::Pattern { regex, .. } => column
                .values
                .iter()
                .filter(|v| !regex.is_match(&v.to_string()))
                .count(),
            Check::Unique => {
                let mut counts = HashMap::new();
                for value in &column.values {
                    *counts.entry(value.key()).or_insert(0usize) += 1;
                }
                counts.values().filter(|&&c| c > 1).sum()
            }
        }
    }
}
