//! Main DataSage struct and public API.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::anomaly::{AnomalyDetector, AnomalyMap, AnomalyReport};
use crate::cleaning::{Cleaner, CleaningReport};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::schema::Table;
use crate::validation::{IssueMap, ValidationEngine};

/// Result of running the pipeline on one table.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Metadata about the source file, when the table was loaded from disk.
    pub source: Option<SourceMetadata>,
    /// The cleaned table.
    pub cleaned: Table,
    /// What each cleaning step did.
    pub cleaning: CleaningReport,
    /// Column → issue strings, in rule order.
    pub issues: IssueMap,
    /// Column → outlier values, only for columns that have any.
    pub anomalies: AnomalyMap,
    /// Per-column detector outcomes, including skipped columns.
    pub anomaly_report: AnomalyReport,
    /// Summary counts.
    pub summary: PipelineSummary,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub original_rows: usize,
    pub original_columns: usize,
    pub cleaned_rows: usize,
    pub cleaned_columns: usize,
    /// Total number of issue strings.
    pub validation_issues: usize,
    /// Number of columns with at least one issue.
    pub columns_with_issues: usize,
    /// Number of columns with at least one anomaly.
    pub anomalies_detected: usize,
    /// Total number of anomalous values.
    pub anomalous_values: usize,
}

/// Serializable view of a [`PipelineResult`], without the table itself.
#[derive(Debug, Serialize)]
pub struct PipelineReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a SourceMetadata>,
    pub summary: &'a PipelineSummary,
    pub issues: &'a IssueMap,
    pub anomalies: &'a AnomalyMap,
    pub anomaly_details: &'a AnomalyReport,
    pub cleaning: &'a CleaningReport,
}

impl PipelineResult {
    /// Borrow the parts that go into `report.json`.
    pub fn report(&self) -> PipelineReport<'_> {
        PipelineReport {
            source: self.source.as_ref(),
            summary: &self.summary,
            issues: &self.issues,
            anomalies: &self.anomalies,
            anomaly_details: &self.anomaly_report,
            cleaning: &self.cleaning,
        }
    }

    /// Pretty-printed JSON report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }
}

/// The cleaning, validation and anomaly detection pipeline.
///
/// Construction validates the whole configuration, so a `DataSage` value can
/// only fail on input it cannot load.
#[derive(Debug, Clone)]
pub struct DataSage {
    parser: Parser,
    cleaner: Cleaner,
    validation: ValidationEngine,
    detector: AnomalyDetector,
}

impl DataSage {
    /// Create a pipeline from a configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_parser(config, ParserConfig::default())
    }

    /// Create a pipeline with custom loader settings.
    ///
    /// The cleaner and rule engine check their own sections of `config`.
    pub fn with_parser(config: PipelineConfig, parser: ParserConfig) -> Result<Self> {
        config.anomalies.validate()?;
        Ok(Self {
            parser: Parser::with_config(parser),
            cleaner: Cleaner::new(&config.cleaning)?,
            validation: ValidationEngine::new(&config.validation)?,
            detector: AnomalyDetector::new(config.anomalies.z_threshold),
        })
    }

    /// Load a delimited file or workbook and run the pipeline on it.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<PipelineResult> {
        let (table, source) = self.parser.parse_file(path)?;
        let mut result = self.run(table);
        result.source = Some(source);
        Ok(result)
    }

    /// Clean `table`, then validate and scan the cleaned table.
    pub fn run(&self, table: Table) -> PipelineResult {
        let original_rows = table.row_count();
        let original_columns = table.column_count();

        let cleaned = self.cleaner.clean(table);
        let table = cleaned.table;

        // Both passes only read the cleaned table.
        let (issues, anomaly_report) = std::thread::scope(|scope| {
            let validation = scope.spawn(|| self.validation.validate(&table));
            let anomalies = self.detector.scan(&table);
            let issues = validation
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
            (issues, anomalies)
        });
        let anomalies = anomaly_report.anomalies();

        let summary = PipelineSummary {
            original_rows,
            original_columns,
            cleaned_rows: table.row_count(),
            cleaned_columns: table.column_count(),
            validation_issues: issues.values().map(Vec::len).sum(),
            columns_with_issues: issues.len(),
            anomalies_detected: anomalies.len(),
            anomalous_values: anomalies.values().map(Vec::len).sum(),
        };
        info!(
            rows = summary.cleaned_rows,
            issues = summary.validation_issues,
            anomalies = summary.anomalous_values,
            "Pipeline complete"
        );

        PipelineResult {
            source: None,
            cleaned: table,
            cleaning: cleaned.report,
            issues,
            anomalies,
            anomaly_report,
            summary,
        }
    }
}

/// Run the pipeline once with `config`.
pub fn run_pipeline(table: Table, config: &PipelineConfig) -> Result<PipelineResult> {
    Ok(DataSage::new(config.clone())?.run(table))
}
