//! The cleaning stage orchestrator.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::dates::{DateFormats, DateNormalizer, DateSummary, is_date_column};
use super::imputation::{Imputation, ImputationPolicy};
use super::text::TextNormalizer;
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::outcome::ColumnOutcome;
use crate::schema::Table;

/// What the cleaning stage did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    /// Rows on entry.
    pub rows_before: usize,
    /// Column count captured on entry.
    pub column_count: usize,
    /// Rows removed as exact duplicates.
    pub duplicates_removed: usize,
    /// Minimum present values a row needed to survive.
    pub row_threshold: usize,
    /// Rows removed for being too sparse.
    pub sparse_rows_dropped: usize,
    /// Rows on exit.
    pub rows_after: usize,
    /// Columns that had missing values, and how they were filled.
    pub imputations: IndexMap<String, Imputation>,
    /// Text columns whose casing was rewritten, with changed-value counts.
    pub text_columns: IndexMap<String, usize>,
    /// Outcome for each date column.
    pub dates: IndexMap<String, ColumnOutcome<DateSummary>>,
}

/// Cleaned table plus the report describing it.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    pub table: Table,
    pub report: CleaningReport,
}

/// Applies a [`CleaningConfig`] to tables.
#[derive(Debug, Clone)]
pub struct Cleaner {
    drop_duplicates: bool,
    threshold: f64,
    imputation: ImputationPolicy,
    text: TextNormalizer,
    dates: DateNormalizer,
}

impl Cleaner {
    /// Create a cleaner, rejecting invalid settings up front.
    pub fn new(config: &CleaningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            drop_duplicates: config.drop_duplicates,
            threshold: config.fill_missing.threshold,
            imputation: ImputationPolicy::new(config.fill_missing.strategy),
            text: TextNormalizer::new(config.text_standardization),
            dates: DateNormalizer::new(DateFormats::from_config(config)),
        })
    }

    /// Run the five steps in order on `table`.
    pub fn clean(&self, mut table: Table) -> CleaningResult {
        let mut report = CleaningReport {
            rows_before: table.row_count(),
            column_count: table.column_count(),
            ..Default::default()
        };

        if self.drop_duplicates {
            report.duplicates_removed = remove_duplicate_rows(&mut table);
            info!(removed = report.duplicates_removed, "Removed duplicate rows");
        }

        report.row_threshold = row_threshold(self.threshold, report.column_count);
        report.sparse_rows_dropped = drop_sparse_rows(&mut table, report.row_threshold);
        info!(
            dropped = report.sparse_rows_dropped,
            threshold = report.row_threshold,
            "Dropped rows with too many missing values"
        );

        for column in table.columns_mut() {
            if let Some(imputation) = self.imputation.apply(column) {
                if imputation.value.is_missing() {
                    warn!(
                        column = %column.name,
                        "No values to compute {}, column left missing",
                        imputation.method
                    );
                } else {
                    debug!(
                        column = %column.name,
                        method = imputation.method,
                        value = %imputation.value,
                        filled = imputation.filled,
                        "Filled missing values"
                    );
                }
                report.imputations.insert(column.name.clone(), imputation);
            }
        }

        if !self.text.is_noop() {
            for column in table.columns_mut().iter_mut().filter(|c| c.dtype.is_text()) {
                let changed = self.text.apply(column);
                report.text_columns.insert(column.name.clone(), changed);
            }
        }

        for column in table.columns_mut() {
            if !is_date_column(&column.name) {
                continue;
            }
            let outcome = ColumnOutcome::from(self.dates.normalize(column));
            match &outcome {
                ColumnOutcome::Completed(summary) => debug!(
                    column = %column.name,
                    parsed = summary.parsed,
                    coerced = summary.coerced_to_missing,
                    "Standardized to {}",
                    self.dates.formats().output_format()
                ),
                ColumnOutcome::Skipped { reason } => {
                    warn!(column = %column.name, "Could not standardize dates: {}", reason)
                }
            }
            report.dates.insert(column.name.clone(), outcome);
        }

        report.rows_after = table.row_count();
        info!(
            rows_before = report.rows_before,
            rows_after = report.rows_after,
            "Cleaning complete"
        );

        CleaningResult { table, report }
    }
}

/// Clean `table` with `config` in one call.
pub fn clean(table: Table, config: &CleaningConfig) -> Result<CleaningResult> {
    Ok(Cleaner::new(config)?.clean(table))
}

/// `floor(threshold * column_count)`.
fn row_threshold(threshold: f64, column_count: usize) -> usize {
    (threshold * column_count as f64).floor() as usize
}

/// Drop rows identical to an earlier row, keeping the first. Returns the count removed.
fn remove_duplicate_rows(table: &mut Table) -> usize {
    let keep: Vec<bool> = {
        let mut seen = HashSet::new();
        (0..table.row_count())
            .map(|row| seen.insert(table.row_key(row)))
            .collect()
    };
    let removed = keep.iter().filter(|k| !**k).count();
    table.retain_rows(&keep);
    removed
}

/// Drop rows with fewer than `row_threshold` present values. Returns the count removed.
fn drop_sparse_rows(table: &mut Table, row_threshold: usize) -> usize {
    let keep: Vec<bool> = (0..table.row_count())
        .map(|row| table.non_missing_in_row(row) >= row_threshold)
        .collect();
    let removed = keep.iter().filter(|k| !**k).count();
    table.retain_rows(&keep);
    removed
}
