//! Table formatting for page listings and export previews using tabled
//!
//! This module renders terminal tables:
//! - Builder pattern for columns known only at runtime
//! - Long cells truncated to a configurable width
//! - Configurable styles and colored headers

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Rows},
};

use crate::pages::{ExportPage, PagePreview};
use crate::utils::string::truncate;

/// Maximum width for a single cell (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 32;

/// Table formatter for terminal output
pub struct TableFormatter {
    /// Maximum cell width
    max_column_width: usize,

    /// Table style
    style: TableStyle,

    /// Enable colored output
    use_colors: bool,
}

/// Available table styles
#[derive(Debug, Clone, Copy)]
pub enum TableStyle {
    /// Modern style with box-drawing characters
    Modern,
    /// ASCII style with basic characters
    Ascii,
    /// Rounded style
    Rounded,
    /// Psql style
    Psql,
}

impl TableFormatter {
    /// Create a new table formatter with default settings
    pub fn new() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            style: TableStyle::Rounded,
            use_colors: false,
        }
    }

    /// Create a new table formatter with color support
    ///
    /// # Arguments
    /// * `use_colors` - Enable colored output
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Set the table style
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Set maximum cell width
    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Format the list of exportable pages
    ///
    /// # Arguments
    /// * `pages` - Pages to list
    ///
    /// # Returns
    /// * `String` - Rendered table
    pub fn format_pages(&self, pages: &[ExportPage]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Page", "Title", "Records", "Excel", "Filters"]);

        for page in pages {
            let config = page.export_config();
            builder.push_record([
                page.name().to_string(),
                page.title().to_string(),
                page.record_count().to_string(),
                format!(".{}", config.excel_mode.extension()),
                page.filter_keys().join(", "),
            ]);
        }

        self.finish(builder.build())
    }

    /// Format the filtered rows of a page
    ///
    /// # Arguments
    /// * `preview` - Headers and rendered rows
    ///
    /// # Returns
    /// * `String` - Rendered table followed by a row count line
    pub fn format_preview(&self, preview: &PagePreview) -> String {
        if preview.rows.is_empty() {
            return format!("(no rows match; {} records in page)", preview.total);
        }

        let mut builder = Builder::default();
        builder.push_record(preview.headers.clone());
        for row in &preview.rows {
            builder.push_record(
                row.iter()
                    .map(|cell| truncate(&cell.replace('\n', " "), self.max_column_width)),
            );
        }

        format!(
            "{}\n{} of {} records",
            self.finish(builder.build()),
            preview.rows.len(),
            preview.total
        )
    }

    fn finish(&self, mut table: Table) -> String {
        self.apply_style(&mut table);
        table.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }

        table.to_string()
    }

    /// Apply table style
    fn apply_style(&self, table: &mut Table) {
        match self.style {
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Psql => table.with(Style::psql()),
        };
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}
