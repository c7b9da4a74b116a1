//! Inspect command - show how a file loads.

use std::path::PathBuf;

use colored::Colorize;
use datasage::{Parser, Table};
use serde::Serialize;

/// One line of the inspection output.
#[derive(Debug, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: &'static str,
    pub missing: usize,
}

pub fn describe(table: &Table) -> Vec<ColumnInfo> {
    table
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            dtype: c.dtype.label(),
            missing: c.missing_count(),
        })
        .collect()
}

pub fn run(file: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (table, source) = Parser::new().parse_file(&file)?;
    let columns = describe(&table);

    if json {
        let output = serde_json::json!({ "source": source, "columns": columns });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({}, {} rows, {} columns)",
        "File".cyan().bold(),
        file.display().to_string().white(),
        source.format,
        source.row_count,
        source.column_count
    );
    println!();
    println!("{}", "Columns:".yellow().bold());
    for column in &columns {
        let missing = if column.missing > 0 {
            format!("{} missing", column.missing).yellow()
        } else {
            "complete".green()
        };
        println!("  {:20} {:10} {}", column.name, column.dtype, missing);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasage::Column;

    #[test]
    fn test_describe() {
        let table = Table::new(vec![
            Column::numeric("age", [Some(1.0), None]),
            Column::text("name", [Some("a"), Some("b")]),
        ])
        .unwrap();

        let info = describe(&table);
        assert_eq!(info[0].dtype, "numeric");
        assert_eq!(info[0].missing, 1);
        assert_eq!(info[1].dtype, "text");
        assert_eq!(info[1].missing, 0);
    }
}
