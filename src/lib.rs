//! Booking back-office export library
//!
//! This library provides the tabular export engine behind the `booking-export`
//! command: column-driven CSV and Excel serialization, query-parameter filters,
//! the per-page export actions and the client that saves their results.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `client`: Export request coordination, downloads and notifications
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Export service, columns, filters and format writers
//! - `formatter`: Terminal tables and JSON rendering
//! - `pages`: Exportable back-office pages
//! - `utils`: Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use booking_export::export::QueryParams;
//! use booking_export::pages::ExportPage;
//!
//! let params = QueryParams::from_query_str("booking_status=confirmed");
//! let result = ExportPage::HistoryBookingLog.export(&params, "csv");
//!
//! assert!(result.success);
//! assert_eq!(result.total_records, Some(2));
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod formatter;
pub mod pages;
pub mod utils;

// Re-export commonly used types
pub use client::{ExportAction, ExportClient, ExportOutcome, ExportState};
pub use config::Config;
pub use error::{ExportError, Result};
pub use export::{ExportConfig, ExportFormat, ExportResult, ExportService, QueryParams};
pub use pages::{ExportPage, PageAction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
