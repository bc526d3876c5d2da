//! Spreadsheet (`.xlsx` / `.xls`) text extraction.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use docdigest_core::BackendError;

/// Flatten every row of every worksheet into one line of space-joined
/// cell values. Sheets are visited in workbook order.
pub fn extract_spreadsheet(data: &[u8]) -> Result<String, BackendError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
        .map_err(|e| BackendError::OpenError(format!("not a readable workbook: {}", e)))?;

    let mut lines = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            BackendError::ExtractionError(format!("failed to read sheet {:?}: {}", name, e))
        })?;
        tracing::debug!(sheet = %name, rows = range.height(), "reading worksheet");

        for row in range.rows() {
            lines.push(row.iter().map(cell_text).collect::<Vec<_>>().join(" "));
        }
    }

    Ok(lines.join("\n"))
}

/// Cached cell value as text. Integral floats print without a fraction.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
