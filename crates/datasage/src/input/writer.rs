//! Writes tables back out as delimited text.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{DataSageError, Result};
use crate::schema::Table;

/// Writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Serializes a [`Table`] as a header row followed by one record per row.
///
/// Missing values become empty cells.
pub struct TableWriter {
    config: WriterConfig,
}

impl TableWriter {
    /// Create a writer with default configuration.
    pub fn new() -> Self {
        Self::with_config(WriterConfig::default())
    }

    /// Create a writer with custom configuration.
    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Write a table to any sink.
    pub fn write<W: Write>(&self, table: &Table, sink: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .from_writer(sink);

        writer.write_record(table.column_names())?;
        for row in 0..table.row_count() {
            writer.write_record(table.row(row).iter().map(|v| v.to_string()))?;
        }

        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write a table to a file.
    pub fn write_file(&self, table: &Table, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| DataSageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write(table, file)?;

        info!(path = %path.display(), rows = table.row_count(), "Wrote table");
        Ok(())
    }

    /// Render a table to a string.
    pub fn render(&self, table: &Table) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(table, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| DataSageError::UnsupportedFormat(e.to_string()))
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;
    use crate::schema::Column;

    #[test]
    fn test_write_csv() {
        let table = Table::new(vec![
            Column::text("name", [Some("Alice"), None]),
            Column::numeric("age", [Some(30.0), Some(41.5)]),
        ])
        .unwrap();

        let out = TableWriter::new().render(&table).unwrap();
        assert_eq!(out, "name,age\nAlice,30\n,41.5\n");
    }

    #[test]
    fn test_write_then_load_keeps_shape() {
        let table = Parser::new()
            .parse_bytes(b"id,joined,score\n1,2024-01-15,3.5\n2,,4\n")
            .unwrap();

        let out = TableWriter::new().render(&table).unwrap();
        let reloaded = Parser::new().parse_bytes(out.as_bytes()).unwrap();

        assert_eq!(reloaded, table);
    }
}
