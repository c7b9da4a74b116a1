//! Z-score outlier detection over numeric columns.

mod detector;

pub use detector::{AnomalyDetector, AnomalyMap, AnomalyReport, ColumnScan, detect_anomalies};
