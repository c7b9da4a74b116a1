//! Pipeline configuration.
//!
//! Every key is optional; absent keys take the documented defaults. A config
//! is read-only for the duration of a run and is checked by
//! [`PipelineConfig::validate`] before any data is touched.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataSageError, Result};
use crate::validation::ValidationRule;

/// Default output format for date columns.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default z-score magnitude above which a value is an anomaly.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cleaning stage settings.
    pub cleaning: CleaningConfig,
    /// Validation rules, evaluated in order.
    pub validation: Vec<ValidationRule>,
    /// Anomaly detector settings.
    pub anomalies: AnomalyConfig,
}

/// How the cleaning stage treats the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Remove rows that exactly repeat an earlier row.
    pub drop_duplicates: bool,
    /// Sparse-row threshold and imputation strategy.
    pub fill_missing: FillMissing,
    /// Casing applied to text columns.
    pub text_standardization: TextCase,
    /// Canonical output format for date columns (strftime syntax).
    pub date_format: String,
    /// Per-column input format overrides.
    pub date_columns: Vec<DateColumn>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            drop_duplicates: true,
            fill_missing: FillMissing::default(),
            text_standardization: TextCase::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_columns: Vec::new(),
        }
    }
}

/// Missing-data policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillMissing {
    /// Statistic used to fill numeric columns.
    pub strategy: ImputeStrategy,
    /// Fraction of columns (0.0-1.0) a row must populate to survive.
    pub threshold: f64,
}

impl Default for FillMissing {
    fn default() -> Self {
        Self {
            strategy: ImputeStrategy::default(),
            threshold: 0.3,
        }
    }
}

/// Statistic used to impute numeric columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    Mean,
    #[default]
    Median,
}

impl ImputeStrategy {
    /// Lowercase name.
    pub fn label(&self) -> &'static str {
        match self {
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
        }
    }
}

/// Casing applied to text columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    Lower,
    Upper,
    #[default]
    Title,
    None,
}

/// An input format override for one date column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateColumn {
    /// Exact column name.
    pub name: String,
    /// Input format; falls back to the global format when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Anomaly detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Values with `|z|` strictly above this are reported.
    pub z_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        // An empty document means "all defaults".
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|e| DataSageError::Config(e.to_string()))
    }

    /// Parse a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| DataSageError::Config(e.to_string()))
    }

    /// Load from a `.yaml`/`.yml` or `.json` file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| DataSageError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&source)?,
            other => {
                return Err(DataSageError::UnsupportedFormat(format!(
                    "config file extension {:?} (expected yaml, yml or json)",
                    other.unwrap_or("")
                )));
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check every setting that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<()> {
        self.cleaning.validate()?;
        self.anomalies.validate()?;
        for rule in &self.validation {
            rule.validate()?;
        }
        Ok(())
    }
}

impl CleaningConfig {
    /// Check the cleaning settings.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.fill_missing.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DataSageError::Config(format!(
                "fill_missing.threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.date_format.is_empty() {
            return Err(DataSageError::Config("date_format must not be empty".to_string()));
        }
        Ok(())
    }
}

impl AnomalyConfig {
    /// Check the detector settings.
    pub fn validate(&self) -> Result<()> {
        if !self.z_threshold.is_finite() || self.z_threshold <= 0.0 {
            return Err(DataSageError::Config(format!(
                "anomalies.z_threshold must be a positive number, got {}",
                self.z_threshold
            )));
        }
        Ok(())
    }
}
