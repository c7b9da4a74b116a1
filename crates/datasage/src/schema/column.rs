//! Column definition and dtype inference.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::types::{ColumnType, Value, is_null_token};

// ISO-looking prefix; only these values are handed to chrono during inference.
static ISO_DATE_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").ok());

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A named column of values aligned by row index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Inferred data type.
    pub dtype: ColumnType,
    /// Cell values, one per row.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from already-typed values.
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Create a numeric column; `None` and non-finite entries become missing.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(
            name,
            ColumnType::Numeric,
            values.into_iter().map(Value::from).collect(),
        )
    }

    /// Create a text column; `None` entries become missing.
    pub fn text<'a>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Self {
        Self::new(
            name,
            ColumnType::Text,
            values.into_iter().map(Value::from).collect(),
        )
    }

    /// Infer a typed column from raw cell strings.
    ///
    /// Every non-null cell must parse as a finite number for a numeric column,
    /// or as an ISO date / date-time for a temporal one. Anything else is text.
    /// A column with no values at all is numeric.
    pub fn infer<S: AsRef<str>>(name: impl Into<String>, raw: &[S]) -> Self {
        let cells: Vec<Option<&str>> = raw
            .iter()
            .map(|s| {
                let s = s.as_ref();
                if is_null_token(s) { None } else { Some(s.trim()) }
            })
            .collect();

        let present = || cells.iter().flatten();

        if present().all(|s| parse_number(s).is_some()) {
            let values = cells
                .iter()
                .map(|c| c.and_then(parse_number).map_or(Value::Missing, Value::Number))
                .collect();
            return Self::new(name, ColumnType::Numeric, values);
        }

        if present().all(|s| parse_iso_timestamp(s).is_some()) {
            let values = cells
                .iter()
                .map(|c| {
                    c.and_then(parse_iso_timestamp)
                        .map_or(Value::Missing, Value::Timestamp)
                })
                .collect();
            return Self::new(name, ColumnType::Temporal, values);
        }

        let values = cells
            .iter()
            .map(|c| c.map_or(Value::Missing, Value::text))
            .collect();
        Self::new(name, ColumnType::Text, values)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Whether any value is missing.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Value::is_missing)
    }

    /// Iterate the non-missing numeric values in row order.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(Value::as_number)
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_iso_timestamp(s: &str) -> Option<NaiveDateTime> {
    let prefix = ISO_DATE_PREFIX.as_ref()?;
    if !prefix.is_match(s) {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
