//! Spreadsheet loader for Excel and OpenDocument workbooks.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::error::{DataSageError, Result};
use crate::schema::Value;

/// Extensions read as workbooks rather than delimited text.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// The lowercased workbook extension of `path`, if it has one.
pub(crate) fn workbook_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    WORKBOOK_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Read the first sheet of a workbook as rows of cell text.
///
/// Cells are rendered the way the delimited loader would see them, so the
/// usual inference applies: numbers print without a trailing `.0`, dates as
/// ISO text and errors or blanks as empty cells.
pub(crate) fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataSageError::EmptyData("Workbook has no sheets".to_string()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(n) => Value::from(*n).to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ts| Value::Timestamp(ts).to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_extension() {
        assert_eq!(workbook_extension(Path::new("data.xlsx")).as_deref(), Some("xlsx"));
        assert_eq!(workbook_extension(Path::new("DATA.XLS")).as_deref(), Some("xls"));
        assert_eq!(workbook_extension(Path::new("sheet.ods")).as_deref(), Some("ods"));
        assert_eq!(workbook_extension(Path::new("data.csv")), None);
        assert_eq!(workbook_extension(Path::new("data")), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(30.0)), "30");
        assert_eq!(cell_text(&Data::Float(41.5)), "41.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String("Ann".to_string())), "Ann");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = read_first_sheet(b"name,age\nAnn,30\n").unwrap_err();
        assert!(matches!(err, DataSageError::Spreadsheet(_)));
    }
}
