//! Export service orchestrating validation, filtering and serialization
//!
//! This module brings together the column model, the filter chain and the
//! format writers. Every failure is converted into an unsuccessful
//! [`ExportResult`]; nothing propagates past [`ExportService::export_data`].

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::error::{ExportError, Result, SerializationError, ValidationError};
use crate::utils::time::format_duration;

use super::column::{Column, headers, render_row};
use super::filename::generate_filename;
use super::filters::RecordFilter;
use super::types::{ExportConfig, ExportFormat, ExportResult, QueryParams};
use super::writers::{FormatWriter, create_writer};

/// Generic column-driven exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportService;

impl ExportService {
    /// Create a new export service
    pub fn new() -> Self {
        Self
    }

    /// Export records to CSV or Excel
    ///
    /// Validation runs in order and stops at the first failure: format,
    /// records, columns, duplicate column keys. The filter is applied only
    /// when both a filter and parameters are supplied, and an empty filtered
    /// set fails the export.
    ///
    /// # Arguments
    /// * `records` - Records to export
    /// * `columns` - Column definitions in output order
    /// * `config` - Document and filename settings
    /// * `format` - Wire format name (`"csv"` or `"excel"`)
    /// * `filter` - Optional filter chain
    /// * `params` - Optional query parameters driving the filter
    ///
    /// # Returns
    /// * `ExportResult` - Payload on success, error message otherwise
    pub fn export_data<T>(
        &self,
        records: &[T],
        columns: &[Column<T>],
        config: &ExportConfig,
        format: &str,
        filter: Option<&dyn RecordFilter<T>>,
        params: Option<&QueryParams>,
    ) -> ExportResult {
        let start_time = Instant::now();

        match self.try_export(records, columns, config, format, filter, params) {
            Ok(result) => {
                info!(
                    "Export completed: {} records as {} ({}) in {}",
                    result.total_records.unwrap_or(0),
                    format,
                    result.filename.as_deref().unwrap_or_default(),
                    format_duration(start_time.elapsed())
                );
                result
            }
            Err(err) => {
                match &err {
                    ExportError::Validation(_) | ExportError::EmptyResult => {
                        debug!("Export rejected: {}", err)
                    }
                    _ => error!("Export failed: {}", err),
                }
                ExportResult::from_error(&err)
            }
        }
    }

    fn try_export<T>(
        &self,
        records: &[T],
        columns: &[Column<T>],
        config: &ExportConfig,
        format: &str,
        filter: Option<&dyn RecordFilter<T>>,
        params: Option<&QueryParams>,
    ) -> Result<ExportResult> {
        // Step 1: Validate input
        let format: ExportFormat = format.parse()?;
        validate_input(records, columns)?;

        // Step 2: Filter
        let mut selected: Vec<&T> = records.iter().collect();
        if let (Some(filter), Some(params)) = (filter, params) {
            debug!("Applying filter: {}", filter.describe());
            selected = filter.apply(selected, params);
            debug!("{} of {} records left after filtering", selected.len(), records.len());
            if selected.is_empty() {
                return Err(ExportError::EmptyResult);
            }
        }

        // Step 3: Serialize
        let data = write_document(format, config, columns, &selected).map_err(|err| {
            error!("Error generating {} document: {}", format, err);
            ExportError::from(SerializationError::new(format.as_str(), err))
        })?;

        // Step 4: Name the download
        let filename = generate_filename(
            config.filename_prefix(),
            config.extension(format),
            config.include_timestamp,
        );
        debug!("Generated filename: {}", filename);

        Ok(ExportResult::success(
            data,
            filename,
            selected.len(),
            config.mime_type(format),
        ))
    }
}

/// Check records and columns, in that order
fn validate_input<T>(records: &[T], columns: &[Column<T>]) -> Result<()> {
    if records.is_empty() {
        return Err(ValidationError::NoData.into());
    }
    if columns.is_empty() {
        return Err(ValidationError::NoColumns.into());
    }

    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            return Err(ValidationError::DuplicateColumn(column.key.clone()).into());
        }
    }
    Ok(())
}

/// Render records through a writer, blanking rows that fail
fn write_document<T>(
    format: ExportFormat,
    config: &ExportConfig,
    columns: &[Column<T>],
    records: &[&T],
) -> Result<super::types::ExportData> {
    let widths: Vec<Option<f64>> = columns.iter().map(|column| column.width).collect();
    let mut writer: Box<dyn FormatWriter> = create_writer(format, config, &widths)?;

    writer.write_header(&headers(columns))?;

    let mut failed_rows = 0usize;
    for (index, record) in records.iter().enumerate() {
        let cells = match render_row(columns, *record) {
            Ok(cells) => cells,
            Err(err) => {
                warn!("Error processing row {}: {}", index, err);
                failed_rows += 1;
                vec![String::new(); columns.len()]
            }
        };
        writer.write_row(&cells)?;
    }

    if failed_rows > 0 {
        warn!("{} of {} rows were exported blank", failed_rows, records.len());
    }

    writer.finish()
}
