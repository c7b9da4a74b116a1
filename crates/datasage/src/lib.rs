//! DataSage: batch data-quality pipeline for tabular data.
//!
//! A raw table goes through three stages:
//!
//! - **Cleaning**: deduplication, sparse-row removal, imputation, text casing
//!   and date normalization, in that order
//! - **Validation**: declarative per-column rules producing issue strings
//! - **Anomaly detection**: z-score outliers per numeric column
//!
//! Validation and anomaly detection both read the cleaned table and never
//! modify it.
//!
//! # Example
//!
//! ```no_run
//! use datasage::{DataSage, PipelineConfig};
//!
//! let config = PipelineConfig::load("pipeline.yaml").unwrap();
//! let result = DataSage::new(config).unwrap().analyze("survey.csv").unwrap();
//!
//! println!("Rows after cleaning: {}", result.summary.cleaned_rows);
//! for (column, issues) in &result.issues {
//!     println!("{}: {}", column, issues.join("; "));
//! }
//! ```

pub mod anomaly;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod input;
pub mod outcome;
pub mod schema;
pub mod stats;
pub mod validation;

mod pipeline;

pub use crate::pipeline::{DataSage, PipelineReport, PipelineResult, PipelineSummary, run_pipeline};
pub use anomaly::{AnomalyDetector, AnomalyMap, detect_anomalies};
pub use cleaning::{CleaningReport, clean};
pub use config::{AnomalyConfig, CleaningConfig, ImputeStrategy, PipelineConfig, TextCase};
pub use error::{DataSageError, Result};
pub use input::{Parser, SourceMetadata, TableWriter};
pub use outcome::ColumnOutcome;
pub use schema::{Column, ColumnType, Table, Value};
pub use validation::{IssueMap, ValidationRule, validate};
