//! Format writers for export operations
//!
//! This module provides a unified interface for turning header and row cells
//! into a finished document: CSV text, an Office Open XML workbook, or a
//! SpreadsheetML document for pages that still ship `.xls` files.

use crate::error::Result;

use super::types::{ExcelMode, ExportConfig, ExportData, ExportFormat};

pub mod csv;
pub mod spreadsheet_ml;
pub mod xlsx;

pub use csv::CsvWriter;
pub use spreadsheet_ml::SpreadsheetMlWriter;
pub use xlsx::XlsxWriter;

/// Trait for writing rendered rows to a document format
pub trait FormatWriter: Send {
    /// Write the header row
    ///
    /// # Arguments
    /// * `headers` - Column header labels in output order
    fn write_header(&mut self, headers: &[String]) -> Result<()>;

    /// Write one data row
    ///
    /// # Arguments
    /// * `cells` - Formatted cells, one per column
    fn write_row(&mut self, cells: &[String]) -> Result<()>;

    /// Finalize the document and hand back its payload
    ///
    /// # Returns
    /// * `Result<ExportData>` - Text or binary payload
    fn finish(self: Box<Self>) -> Result<ExportData>;
}

/// Create the writer for a format under the given configuration
///
/// # Arguments
/// * `format` - Requested export format
/// * `config` - Document settings (title, author, sheet name, Excel mode)
/// * `widths` - Optional fixed width per column
pub fn create_writer(
    format: ExportFormat,
    config: &ExportConfig,
    widths: &[Option<f64>],
) -> Result<Box<dyn FormatWriter>> {
    let writer: Box<dyn FormatWriter> = match (format, config.excel_mode) {
        (ExportFormat::Csv, _) => Box::new(CsvWriter::new()),
        (ExportFormat::Excel, ExcelMode::Workbook) => Box::new(XlsxWriter::new(config, widths)?),
        (ExportFormat::Excel, ExcelMode::SpreadsheetMl) => {
            Box::new(SpreadsheetMlWriter::new(config))
        }
    };
    Ok(writer)
}
