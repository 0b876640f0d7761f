//! CSV writer for export operations
//!
//! Rows are joined with `\n`; a cell is quoted only when it contains a comma,
//! a double quote or a line break, and embedded quotes are doubled.

use tracing::debug;

use crate::error::Result;
use crate::export::types::ExportData;

use super::FormatWriter;

/// Writer for CSV format
#[derive(Debug, Default)]
pub struct CsvWriter {
    /// Finished lines, header first
    lines: Vec<String>,
}

impl CsvWriter {
    /// Create a new CSV writer
    pub fn new() -> Self {
        Self::default()
    }

    fn push_line(&mut self, cells: &[String]) {
        let line: Vec<String> = cells.iter().map(|cell| escape_csv_value(cell)).collect();
        self.lines.push(line.join(","));
    }
}

impl FormatWriter for CsvWriter {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        self.push_line(headers);
        debug!("Wrote CSV headers: {} fields", headers.len());
        Ok(())
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        self.push_line(cells);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<ExportData> {
        debug!("Finalized CSV document ({} lines)", self.lines.len());
        Ok(ExportData::Text(self.lines.join("\n")))
    }
}

/// Escape a CSV value if necessary
///
/// # Arguments
/// * `value` - Value to escape
///
/// # Returns
/// * `String` - Escaped value
pub fn escape_csv_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        // Wrap in quotes and escape internal quotes by doubling them
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
