//! Terminal output formatting for booking-export
//!
//! Tables for the page listing and filtered previews, plus the JSON rendering
//! of export results.

pub mod table;

pub use table::{TableFormatter, TableStyle};

use crate::error::Result;
use crate::export::ExportResult;

/// Render an export result in its wire form
///
/// # Arguments
/// * `result` - Export result
/// * `pretty` - Indent the JSON
pub fn format_result_json(result: &ExportResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}
