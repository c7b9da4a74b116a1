//! Per-column z-score scan.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_Z_THRESHOLD;
use crate::outcome::ColumnOutcome;
use crate::schema::{Column, Table};
use crate::stats::StreamingStats;

/// Column name → outlier values in row order.
pub type AnomalyMap = IndexMap<String, Vec<f64>>;

/// Statistics and outliers for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnScan {
    /// Population mean of the present values.
    pub mean: f64,
    /// Population standard deviation of the present values.
    pub std: f64,
    /// Values whose `|z|` exceeds the threshold, in row order.
    pub outliers: Vec<f64>,
}

/// Outcome of scanning every numeric column, in table column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// Threshold the scan used.
    pub z_threshold: f64,
    /// One entry per numeric column.
    pub columns: IndexMap<String, ColumnOutcome<ColumnScan>>,
}

impl AnomalyReport {
    /// Columns with at least one outlier.
    pub fn anomalies(&self) -> AnomalyMap {
        self.columns
            .iter()
            .filter_map(|(name, outcome)| {
                outcome
                    .completed()
                    .filter(|scan| !scan.outliers.is_empty())
                    .map(|scan| (name.clone(), scan.outliers.clone()))
            })
            .collect()
    }

    /// Columns that could not be scanned, with the reason.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .filter_map(|(name, outcome)| outcome.skip_reason().map(|r| (name.as_str(), r)))
    }
}

/// Flags values far from their column's mean.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    z_threshold: f64,
}

impl AnomalyDetector {
    /// Create a detector with the given `|z|` threshold.
    pub fn new(z_threshold: f64) -> Self {
        Self { z_threshold }
    }

    /// Scan every numeric column of `table`.
    pub fn scan(&self, table: &Table) -> AnomalyReport {
        let columns: IndexMap<String, ColumnOutcome<ColumnScan>> = table
            .columns()
            .iter()
            .filter(|c| c.dtype.is_numeric())
            .map(|column| {
                let outcome = self.scan_column(column);
                match &outcome {
                    ColumnOutcome::Completed(scan) => debug!(
                        column = %column.name,
                        mean = scan.mean,
                        std = scan.std,
                        outliers = scan.outliers.len(),
                        "Scanned column"
                    ),
                    ColumnOutcome::Skipped { reason } => {
                        warn!(column = %column.name, "Could not compute anomalies: {}", reason)
                    }
                }
                (column.name.clone(), outcome)
            })
            .collect();

        let report = AnomalyReport {
            z_threshold: self.z_threshold,
            columns,
        };
        info!(
            columns = report.columns.len(),
            anomalous_columns = report.anomalies().len(),
            "Anomaly detection complete"
        );
        report
    }

    /// Scan one column. Columns with no values or no spread are skipped.
    pub fn scan_column(&self, column: &Column) -> ColumnOutcome<ColumnScan> {
        let stats: StreamingStats = column.numbers().collect();
        let (Some(mean), Some(std)) = (stats.mean(), stats.std()) else {
            return ColumnOutcome::skipped("no numeric values");
        };
        if !mean.is_finite() || !std.is_finite() {
            return ColumnOutcome::skipped("standard deviation is not finite");
        }
        if std == 0.0 {
            return ColumnOutcome::skipped("standard deviation is zero");
        }

        let outliers = column
            .numbers()
            .filter(|value| ((value - mean) / std).abs() > self.z_threshold)
            .collect();

        ColumnOutcome::Completed(ColumnScan {
            mean,
            std,
            outliers,
        })
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_Z_THRESHOLD)
    }
}

/// Scan `table` and return only the columns with anomalies.
pub fn detect_anomalies(table: &Table, z_threshold: f64) -> AnomalyMap {
    AnomalyDetector::new(z_threshold).scan(table).anomalies()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(base_count: usize) -> Column {
        let mut values: Vec<Option<f64>> = (0..base_count)
            .map(|i| Some([10.0, 11.0, 9.0, 10.0][i % 4]))
            .collect();
        values.push(Some(1000.0));
        Column::numeric("X", values)
    }

    #[test]
    fn test_spike_reported() {
        let table = Table::new(vec![spike(12)]).unwrap();
        let anomalies = detect_anomalies(&table, 3.0);
        assert_eq!(anomalies["X"], vec![1000.0]);
    }

    #[test]
    fn test_five_values_cannot_exceed_two_sigma() {
        // With n values the largest possible |z| is sqrt(n - 1): 2.0 here.
        let table = Table::new(vec![spike(4)]).unwrap();
        let report = AnomalyDetector::default().scan(&table);

        let scan = report.columns["X"].completed().unwrap();
        assert!((scan.std - 396.0).abs() < 0.1);
        assert!(report.anomalies().is_empty());
        assert_eq!(detect_anomalies(&table, 1.5)["X"], vec![1000.0]);
    }

    #[test]
    fn test_constant_column_skipped() {
        let table = Table::new(vec![
            Column::numeric("flat", [Some(5.0), Some(5.0), Some(5.0)]),
            spike(12),
        ])
        .unwrap();
        let report = AnomalyDetector::default().scan(&table);

        assert!(report.columns["flat"].is_skipped());
        assert_eq!(report.skipped().count(), 1);
        assert_eq!(report.anomalies().keys().collect::<Vec<_>>(), vec!["X"]);
    }

    #[test]
    fn test_missing_values_ignored() {
        let mut column = spike(12);
        column.values.insert(3, crate::schema::Value::Missing);
        let table = Table::new(vec![column]).unwrap();

        assert_eq!(detect_anomalies(&table, 3.0)["X"], vec![1000.0]);
    }

    #[test]
    fn test_all_missing_column_skipped() {
        let table = Table::new(vec![Column::numeric("empty", [None, None])]).unwrap();
        let report = AnomalyDetector::default().scan(&table);
        assert_eq!(report.columns["empty"].skip_reason(), Some("no numeric values"));
    }

    #[test]
    fn test_overflowing_spread_skipped() {
        let table = Table::new(vec![Column::numeric(
            "huge",
            [Some(1e308), Some(-1e308), Some(0.0)],
        )])
        .unwrap();
        let report = AnomalyDetector::default().scan(&table);
        assert_eq!(
            report.columns["huge"].skip_reason(),
            Some("standard deviation is not finite")
        );
    }

    #[test]
    fn test_text_columns_not_scanned() {
        let table = Table::new(vec![Column::text("t", [Some("a")])]).unwrap();
        assert!(AnomalyDetector::default().scan(&table).columns.is_empty());
    }

    #[test]
    fn test_key_order_follows_table() {
        let mut second = spike(12);
        second.name = "A".to_string();
        let table = Table::new(vec![spike(12), second]).unwrap();

        let keys: Vec<String> = detect_anomalies(&table, 3.0).into_keys().collect();
        assert_eq!(keys, vec!["X".to_string(), "A".to_string()]);
    }
}
