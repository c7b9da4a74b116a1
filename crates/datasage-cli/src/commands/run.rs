//! Run command - clean, validate and scan a data file.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use datasage::{DataSage, PipelineConfig, PipelineResult, TableWriter};

/// Name of the cleaned table inside the output directory.
pub const CLEANED_FILE: &str = "cleaned.csv";
/// Name of the JSON report inside the output directory.
pub const REPORT_FILE: &str = "report.json";

pub fn run(
    input: PathBuf,
    outdir: PathBuf,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("File not found: {}", input.display()).into());
    }

    // Configuration problems abort before anything is written.
    let config = match config {
        Some(ref path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = DataSage::new(config)?;

    println!(
        "{} {}",
        "Processing".cyan().bold(),
        input.display().to_string().white()
    );

    let result = pipeline.analyze(&input)?;
    let (cleaned_path, report_path) = write_outputs(&result, &outdir)?;

    print_summary(&result);

    println!();
    println!(
        "{} {}",
        "Cleaned data".green().bold(),
        cleaned_path.display().to_string().white()
    );
    println!(
        "{} {}",
        "Report".green().bold(),
        report_path.display().to_string().white()
    );

    Ok(())
}

/// Write `cleaned.csv` and `report.json` into `outdir`, creating it if needed.
pub fn write_outputs(
    result: &PipelineResult,
    outdir: &Path,
) -> Result<(PathBuf, PathBuf), Box<dyn std::error::Error>> {
    fs::create_dir_all(outdir)
        .map_err(|e| format!("Cannot create {}: {}", outdir.display(), e))?;

    let cleaned_path = outdir.join(CLEANED_FILE);
    TableWriter::new().write_file(&result.cleaned, &cleaned_path)?;

    let report_path = outdir.join(REPORT_FILE);
    fs::write(&report_path, result.to_json()?)
        .map_err(|e| format!("Cannot write {}: {}", report_path.display(), e))?;

    Ok((cleaned_path, report_path))
}

fn print_summary(result: &PipelineResult) {
    let summary = &result.summary;
    let cleaning = &result.cleaning;

    println!();
    println!("{}", "Cleaning:".yellow().bold());
    println!(
        "  Rows: {} -> {} ({} duplicates, {} sparse rows below {} values)",
        summary.original_rows,
        summary.cleaned_rows.to_string().white().bold(),
        cleaning.duplicates_removed,
        cleaning.sparse_rows_dropped,
        cleaning.row_threshold
    );
    for (column, imputation) in &cleaning.imputations {
        if imputation.filled > 0 {
            println!(
                "  {:20} filled {} with {} ({})",
                column, imputation.filled, imputation.value, imputation.method
            );
        }
    }
    for (column, outcome) in &cleaning.dates {
        match outcome.completed() {
            Some(dates) if dates.coerced_to_missing > 0 => println!(
                "  {:20} {} unparseable dates set to missing",
                column,
                dates.coerced_to_missing.to_string().yellow()
            ),
            Some(_) => {}
            None => println!(
                "  {:20} {} {}",
                column,
                "skipped:".red(),
                outcome.skip_reason().unwrap_or_default()
            ),
        }
    }

    println!();
    if result.issues.is_empty() {
        println!("{}", "Validation: no issues".green());
    } else {
        println!(
            "{} {} issues in {} columns",
            "Validation:".yellow().bold(),
            summary.validation_issues.to_string().red(),
            summary.columns_with_issues
        );
        for (column, issues) in &result.issues {
            for issue in issues {
                println!("  {:20} {}", column, issue);
            }
        }
    }

    println!();
    if result.anomalies.is_empty() {
        println!("{}", "Anomalies: none".green());
    } else {
        println!(
            "{} {} values in {} columns",
            "Anomalies:".yellow().bold(),
            summary.anomalous_values.to_string().red(),
            summary.anomalies_detected
        );
        for (column, values) in &result.anomalies {
            let shown: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            println!("  {:20} {}", column, shown.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_run_writes_outputs() {
        let data = create_test_file("name,age\nann,30\nbob,\nann,30\n");
        let dir = TempDir::new().unwrap();
        let outdir = dir.path().join("nested").join("out");

        run(data.path().to_path_buf(), outdir.clone(), None).unwrap();

        let cleaned = fs::read_to_string(outdir.join(CLEANED_FILE)).unwrap();
        assert_eq!(cleaned, "name,age\nAnn,30\nBob,30\n");

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(outdir.join(REPORT_FILE)).unwrap()).unwrap();
        assert_eq!(report["summary"]["original_rows"], 3);
        assert_eq!(report["cleaning"]["duplicates_removed"], 1);
    }

    #[test]
    fn test_bad_config_writes_nothing() {
        let data = create_test_file("a\n1\n");
        let mut config = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        config
            .write_all(b"anomalies:\n  z_threshold: -1\n")
            .unwrap();
        let dir = TempDir::new().unwrap();
        let outdir = dir.path().join("out");

        let err = run(
            data.path().to_path_buf(),
            outdir.clone(),
            Some(config.path().to_path_buf()),
        );

        assert!(err.is_err());
        assert!(!outdir.exists());
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        assert!(run(dir.path().join("absent.csv"), dir.path().join("out"), None).is_err());
    }
}
