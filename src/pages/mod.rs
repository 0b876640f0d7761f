//! Exportable back-office pages
//!
//! Each page owns a fixed sample dataset, its column layout and a filter chain
//! matching the page's query parameters. [`ExportPage`] is the registry used by
//! the command line; [`PageAction`] adapts a page to the client's
//! [`ExportAction`] boundary.

pub mod agents;
pub mod history_booking_log;
pub mod hotels;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::debug;

use crate::client::ExportAction;
use crate::error::{ExportError, Result, ValidationError};
use crate::export::column::{headers, render_row};
use crate::export::{
    Column, ExcelMode, ExportConfig, ExportFormat, ExportResult, QueryParams, RecordFilter,
};

/// Rows of a page as shown in the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Records before filtering
    pub total: usize,
}

/// Filter and render records for display; rows that fail to render are blank
pub fn preview_rows<T>(
    records: &[T],
    columns: &[Column<T>],
    filter: &dyn RecordFilter<T>,
    params: &QueryParams,
) -> PagePreview {
    let selected = filter.apply(records.iter().collect(), params);
    let rows = selected
        .into_iter()
        .map(|record| {
            render_row(columns, record).unwrap_or_else(|err| {
                debug!("Preview row left blank: {}", err);
                vec![String::new(); columns.len()]
            })
        })
        .collect();

    PagePreview {
        headers: headers(columns),
        rows,
        total: records.len(),
    }
}

/// Pages that can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportPage {
    HistoryBookingLog,
    Hotels,
    Agents,
}

impl ExportPage {
    pub const ALL: [ExportPage; 3] = [
        ExportPage::HistoryBookingLog,
        ExportPage::Hotels,
        ExportPage::Agents,
    ];

    /// Command-line name
    pub fn name(&self) -> &'static str {
        match self {
            ExportPage::HistoryBookingLog => history_booking_log::NAME,
            ExportPage::Hotels => hotels::NAME,
            ExportPage::Agents => agents::NAME,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ExportPage::HistoryBookingLog => history_booking_log::TITLE,
            ExportPage::Hotels => hotels::TITLE,
            ExportPage::Agents => agents::TITLE,
        }
    }

    /// Query parameters the page's filters read
    pub fn filter_keys(&self) -> &'static [&'static str] {
        match self {
            ExportPage::HistoryBookingLog => &[
                "booking_id",
                "search",
                "booking_status",
                "payment_status",
                "confirm_date",
                "date_in",
                "date_out",
            ],
            ExportPage::Hotels => &["search", "city", "status", "listed_on"],
            ExportPage::Agents => &["search", "tier", "status", "registered_at"],
        }
    }

    /// Number of records in the page's dataset
    pub fn record_count(&self) -> usize {
        match self {
            ExportPage::HistoryBookingLog => history_booking_log::sample_records().len(),
            ExportPage::Hotels => hotels::sample_records().len(),
            ExportPage::Agents => agents::sample_records().len(),
        }
    }

    /// Document settings the page exports with
    pub fn export_config(&self) -> ExportConfig {
        match self {
            ExportPage::HistoryBookingLog => history_booking_log::export_config(),
            ExportPage::Hotels => hotels::export_config(),
            ExportPage::Agents => agents::export_config(),
        }
    }

    /// Export the page with its own settings
    ///
    /// # Arguments
    /// * `params` - Page query parameters
    /// * `format` - Wire format name (`"csv"` or `"excel"`)
    pub fn export(&self, params: &QueryParams, format: &str) -> ExportResult {
        self.export_with_config(params, format, self.export_config())
    }

    /// Export the page with adjusted settings
    pub fn export_with_config(
        &self,
        params: &QueryParams,
        format: &str,
        config: ExportConfig,
    ) -> ExportResult {
        match self {
            ExportPage::HistoryBookingLog => {
                history_booking_log::export_with_config(params, format, config)
            }
            ExportPage::Hotels => hotels::export_with_config(params, format, config),
            ExportPage::Agents => agents::export_with_config(params, format, config),
        }
    }

    /// Filtered rows for display
    pub fn preview(&self, params: &QueryParams) -> PagePreview {
        match self {
            ExportPage::HistoryBookingLog => history_booking_log::preview(params),
            ExportPage::Hotels => hotels::preview(params),
            ExportPage::Agents => agents::preview(params),
        }
    }
}

impl FromStr for ExportPage {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        ExportPage::ALL
            .into_iter()
            .find(|page| page.name() == s)
            .ok_or_else(|| ValidationError::UnknownPage(s.to_string()).into())
    }
}

impl fmt::Display for ExportPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A page bound to user settings, callable through the client
#[derive(Debug, Clone)]
pub struct PageAction {
    page: ExportPage,
    author: Option<String>,
    sheet_name: Option<String>,
    filename_prefix: Option<String>,
    include_timestamp: bool,
}

impl PageAction {
    pub fn new(page: ExportPage) -> Self {
        Self {
            page,
            author: None,
            sheet_name: None,
            filename_prefix: None,
            include_timestamp: true,
        }
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: Option<String>) -> Self {
        self.sheet_name = sheet_name;
        self
    }

    pub fn with_filename_prefix(mut self, prefix: Option<String>) -> Self {
        self.filename_prefix = prefix;
        self
    }

    /// Only honored by pages exporting through the workbook mode;
    /// legacy pages are always timestamped
    pub fn with_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn page(&self) -> ExportPage {
        self.page
    }

    /// Page settings with the user's adjustments applied
    pub fn config(&self) -> ExportConfig {
        let mut config = self.page.export_config();
        if let Some(author) = &self.author {
            config = config.with_author(author.clone());
        }
        if let Some(sheet_name) = &self.sheet_name {
            config = config.with_sheet_name(sheet_name.clone());
        }
        if let Some(prefix) = &self.filename_prefix {
            config = config.with_filename_prefix(prefix.clone());
        }
        if config.excel_mode == ExcelMode::Workbook {
            config = config.with_timestamp(self.include_timestamp);
        }
        config
    }
}

#[async_trait]
impl ExportAction for PageAction {
    async fn export(&self, params: QueryParams, format: ExportFormat) -> Result<ExportResult> {
        debug!("Running export action for page {}", self.page);
        Ok(self
            .page
            .export_with_config(&params, format.as_str(), self.config()))
    }
}
