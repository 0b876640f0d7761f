//! Excel workbook writer (Office Open XML, `.xlsx`)
//!
//! Produces a single-sheet workbook with a bold, filled header row, fixed
//! column widths and document properties taken from the export settings.

use rust_xlsxwriter::{Color, DocProperties, Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::export::types::{ExportConfig, ExportData};

use super::FormatWriter;

/// Width applied to columns without a fixed width
pub const DEFAULT_COLUMN_WIDTH: f64 = 15.0;

/// Header fill colour
const HEADER_FILL: u32 = 0xD9E1F2;

/// Writer for `.xlsx` workbooks
pub struct XlsxWriter {
    worksheet: Worksheet,
    header_format: Format,
    properties: DocProperties,
    /// Next row to write
    row: u32,
}

impl XlsxWriter {
    /// Create a workbook writer
    ///
    /// # Arguments
    /// * `config` - Export settings providing sheet name and document properties
    /// * `widths` - Optional fixed width per column
    pub fn new(config: &ExportConfig, widths: &[Option<f64>]) -> Result<Self> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(config.sheet_name()).map_err(xlsx_error)?;

        for (index, width) in widths.iter().enumerate() {
            let col = u16::try_from(index)
                .map_err(|_| ExportError::Generic(format!("Too many columns: {}", widths.len())))?;
            worksheet
                .set_column_width(col, width.unwrap_or(DEFAULT_COLUMN_WIDTH))
                .map_err(xlsx_error)?;
        }

        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(HEADER_FILL));

        let mut properties = DocProperties::new();
        if let Some(title) = config.title.as_deref() {
            properties = properties.set_title(title);
        }
        if let Some(subject) = config.subject.as_deref() {
            properties = properties.set_subject(subject);
        }
        if let Some(author) = config.author.as_deref() {
            properties = properties.set_author(author);
        }

        Ok(Self {
            worksheet,
            header_format,
            properties,
            row: 0,
        })
    }
}

impl FormatWriter for XlsxWriter {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        for (col, header) in headers.iter().enumerate() {
            let format = &self.header_format;
            self.worksheet
                .write_string_with_format(self.row, col as u16, header.as_str(), format)
                .map_err(xlsx_error)?;
        }
        self.row += 1;
        debug!("Wrote workbook header: {} columns", headers.len());
        Ok(())
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        for (col, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            self.worksheet
                .write_string(self.row, col as u16, cell.as_str())
                .map_err(xlsx_error)?;
        }
        self.row += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<ExportData> {
        let XlsxWriter {
            worksheet,
            properties,
            row,
            ..
        } = *self;

        // Creation date defaults to the time the workbook is saved
        let mut workbook = Workbook::new();
        workbook.set_properties(&properties);
        workbook.push_worksheet(worksheet);

        let buffer = workbook.save_to_buffer().map_err(xlsx_error)?;
        debug!("Finalized workbook: {} rows, {} bytes", row, buffer.len());
        Ok(ExportData::Binary(buffer))
    }
}

fn xlsx_error(err: XlsxError) -> ExportError {
    ExportError::Generic(format!("Workbook error: {}", err))
}
