//! Tabular data export
//!
//! The export core turns a slice of page records into a downloadable CSV or
//! Excel document:
//!
//! - [`column`]: how one record becomes one row
//! - [`filters`]: composable record filters driven by query parameters
//! - [`service`]: validation, filtering and serialization pipeline
//! - [`writers`]: CSV, `.xlsx` workbook and SpreadsheetML writers
//! - [`filename`]: download file names
//! - [`types`]: formats, configuration, results and query parameters
//!
//! # Examples
//!
//! ```
//! use booking_export::export::{CellValue, Column, ExportConfig, ExportService};
//!
//! struct Room { name: &'static str, beds: i64 }
//!
//! let rooms = vec![Room { name: "Deluxe, Ocean", beds: 2 }];
//! let columns = vec![
//!     Column::new("name", "Room", |r: &Room| CellValue::from(r.name)),
//!     Column::new("beds", "Beds", |r: &Room| CellValue::from(r.beds)),
//! ];
//! let config = ExportConfig::new().with_filename_prefix("rooms").with_timestamp(false);
//!
//! let result = ExportService::new().export_data(&rooms, &columns, &config, "csv", None, None);
//! assert!(result.success);
//! assert_eq!(result.filename.as_deref(), Some("rooms.csv"));
//! assert_eq!(result.data.unwrap().as_text(), Some("Room,Beds\n\"Deluxe, Ocean\",2"));
//! ```

pub mod column;
pub mod filename;
pub mod filters;
pub mod service;
pub mod types;
pub mod writers;


pub use column::{CellValue, Column, format_value};
pub use filename::{generate_filename, sanitize_filename};
pub use filters::{
    CombinedFilter, DateRange, DateRangeFilter, Field, GlobalSearchFilter, MultiSelectFilter,
    RecordFilter, combine_filters, date_range, global_search, multi_select,
};
pub use service::ExportService;
pub use types::{
    CSV_MIME_TYPE, ExcelMode, ExportConfig, ExportData, ExportFormat, ExportResult, ParamValue,
    QueryParams, XLS_MIME_TYPE, XLSX_MIME_TYPE,
};
