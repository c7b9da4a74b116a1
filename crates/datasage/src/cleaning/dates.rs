//! Date column detection, parsing and canonical formatting.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

use crate::config::CleaningConfig;
use crate::schema::{Column, ColumnType, Value};

/// Whether a column is treated as a date column (its name contains "date").
pub fn is_date_column(name: &str) -> bool {
    name.to_lowercase().contains("date")
}

/// Why a date column was left unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The format string has unknown or malformed specifiers.
    #[error("invalid date format '{0}'")]
    InvalidFormat(String),
    /// A parsed value cannot be rendered with the output format.
    #[error("cannot render a date with format '{0}'")]
    Unrenderable(String),
}

/// Input format per column, with one global fallback that is also the
/// output format.
#[derive(Debug, Clone)]
pub struct DateFormats {
    global: String,
    overrides: HashMap<String, String>,
}

impl DateFormats {
    /// Create a lookup with only a global format.
    pub fn new(global: impl Into<String>) -> Self {
        Self {
            global: global.into(),
            overrides: HashMap::new(),
        }
    }

    /// Build the lookup from cleaning settings. The first override for a
    /// column wins; overrides without a format fall back to the global one.
    pub fn from_config(config: &CleaningConfig) -> Self {
        let mut formats = Self::new(config.date_format.clone());
        for column in &config.date_columns {
            if let Some(ref format) = column.format {
                formats
                    .overrides
                    .entry(column.name.clone())
                    .or_insert_with(|| format.clone());
            }
        }
        formats
    }

    /// Add an override.
    pub fn with_override(mut self, column: impl Into<String>, format: impl Into<String>) -> Self {
        self.overrides.insert(column.into(), format.into());
        self
    }

    /// Format used to read `column`.
    pub fn input_format(&self, column: &str) -> &str {
        self.overrides.get(column).map_or(self.global.as_str(), String::as_str)
    }

    /// Canonical output format.
    pub fn output_format(&self) -> &str {
        &self.global
    }
}

/// Counts for one normalized date column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    /// Format the column was read with.
    pub input_format: String,
    /// Values successfully rewritten.
    pub parsed: usize,
    /// Present values that failed to parse and are now missing.
    pub coerced_to_missing: usize,
}

/// Rewrites date columns into the canonical format.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    formats: DateFormats,
}

impl DateNormalizer {
    /// Create a normalizer from a format lookup.
    pub fn new(formats: DateFormats) -> Self {
        Self { formats }
    }

    /// The format lookup in use.
    pub fn formats(&self) -> &DateFormats {
        &self.formats
    }

    /// Normalize every value of `column`.
    ///
    /// Present values that do not parse become missing. On error the column
    /// is returned untouched.
    pub fn normalize(&self, column: &mut Column) -> Result<DateSummary, DateError> {
        let input_format = self.formats.input_format(&column.name);
        let output_format = self.formats.output_format();
        check_format(input_format)?;
        check_format(output_format)?;

        let mut rewritten = Vec::with_capacity(column.len());
        let mut parsed = 0;
        let mut coerced_to_missing = 0;

        for value in &column.values {
            let timestamp = match value {
                Value::Missing => {
                    rewritten.push(Value::Missing);
                    continue;
                }
                Value::Timestamp(ts) => Some(*ts),
                Value::Text(s) => self.parse(s, input_format),
                Value::Number(n) => self.parse(&n.to_string(), input_format),
            };

            match timestamp {
                Some(ts) => {
                    let rendered = render(&ts, output_format)
                        .ok_or_else(|| DateError::Unrenderable(output_format.to_string()))?;
                    rewritten.push(Value::Text(rendered));
                    parsed += 1;
                }
                None => {
                    rewritten.push(Value::Missing);
                    coerced_to_missing += 1;
                }
            }
        }

        column.values = rewritten;
        column.dtype = ColumnType::Text;

        Ok(DateSummary {
            input_format: input_format.to_string(),
            parsed,
            coerced_to_missing,
        })
    }

    /// Parse with the column's format, then accept values already in the
    /// canonical format so a second pass leaves the column unchanged.
    ///
    /// A value that fails its column's format but matches the canonical one
    /// is kept rather than coerced to missing.
    fn parse(&self, raw: &str, input_format: &str) -> Option<NaiveDateTime> {
        parse_with(raw, input_format).or_else(|| {
            let canonical = self.formats.output_format();
            if canonical != input_format {
                parse_with(raw, canonical)
            } else {
                None
            }
        })
    }
}

fn check_format(format: &str) -> Result<(), DateError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(DateError::InvalidFormat(format.to_string()));
    }
    Ok(())
}

/// Parse a date-time, or a date at midnight.
fn parse_with(raw: &str, format: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, format).ok().or_else(|| {
        NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

fn render(ts: &NaiveDateTime, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", ts.format(format)).ok()?;
    Some(out)
}
