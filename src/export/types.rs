//! Export types shared by the service, the page actions and the client.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ValidationError};

/// MIME type of CSV output
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// MIME type of Office Open XML workbooks
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of legacy SpreadsheetML documents saved as `.xls`
pub const XLS_MIME_TYPE: &str = "application/vnd.ms-excel";

/// Export format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// Excel spreadsheet (rendition chosen by [`ExcelMode`])
    Excel,
}

impl ExportFormat {
    /// Every supported format, in display order
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Excel];

    /// Wire name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        }
    }

    /// Upper-case label used in notifications
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// File name used when an export result carries none
    pub fn fallback_filename(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "export.csv",
            ExportFormat::Excel => "export.xlsx",
        }
    }

    /// MIME type used when an export result carries none
    pub fn fallback_mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME_TYPE,
            ExportFormat::Excel => XLSX_MIME_TYPE,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "excel" => Ok(ExportFormat::Excel),
            other => Err(ValidationError::InvalidFormat(other.to_string()).into()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which document the `excel` format produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExcelMode {
    /// Binary Office Open XML workbook (`.xlsx`)
    #[default]
    Workbook,
    /// SpreadsheetML XML text saved as `.xls`, kept for pages that still ship it
    SpreadsheetMl,
}

impl ExcelMode {
    /// File extension (without dot)
    pub fn extension(&self) -> &'static str {
        match self {
            ExcelMode::Workbook => "xlsx",
            ExcelMode::SpreadsheetMl => "xls",
        }
    }

    /// MIME type of the produced document
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExcelMode::Workbook => XLSX_MIME_TYPE,
            ExcelMode::SpreadsheetMl => XLS_MIME_TYPE,
        }
    }
}

/// Document-level export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub sheet_name: Option<String>,

    #[serde(default)]
    pub filename_prefix: Option<String>,

    /// Append `-YYYY-MM-DD-HHMM` to the file name
    #[serde(default = "default_include_timestamp")]
    pub include_timestamp: bool,

    #[serde(default)]
    pub excel_mode: ExcelMode,
}

fn default_include_timestamp() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: None,
            subject: None,
            author: None,
            sheet_name: None,
            filename_prefix: None,
            include_timestamp: default_include_timestamp(),
            excel_mode: ExcelMode::default(),
        }
    }
}

impl ExportConfig {
    /// Worksheet name used when none is configured
    pub const DEFAULT_SHEET_NAME: &'static str = "Sheet1";

    /// File name prefix used when none is configured
    pub const DEFAULT_FILENAME_PREFIX: &'static str = "export";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    pub fn with_filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = Some(prefix.into());
        self
    }

    pub fn with_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn with_excel_mode(mut self, mode: ExcelMode) -> Self {
        self.excel_mode = mode;
        self
    }

    /// Effective worksheet name
    pub fn sheet_name(&self) -> &str {
        self.sheet_name
            .as_deref()
            .unwrap_or(Self::DEFAULT_SHEET_NAME)
    }

    /// Effective file name prefix
    pub fn filename_prefix(&self) -> &str {
        self.filename_prefix
            .as_deref()
            .unwrap_or(Self::DEFAULT_FILENAME_PREFIX)
    }

    /// File extension for a format under this configuration
    pub fn extension(&self, format: ExportFormat) -> &'static str {
        match format {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => self.excel_mode.extension(),
        }
    }

    /// MIME type for a format under this configuration
    pub fn mime_type(&self, format: ExportFormat) -> &'static str {
        match format {
            ExportFormat::Csv => CSV_MIME_TYPE,
            ExportFormat::Excel => self.excel_mode.mime_type(),
        }
    }
}

/// Export payload: CSV and SpreadsheetML are text, workbooks are binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportData {
    Text(String),
    Binary(Vec<u8>),
}

impl ExportData {
    /// Raw bytes of the payload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ExportData::Text(text) => text.as_bytes(),
            ExportData::Binary(bytes) => bytes,
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text view of the payload, if it is textual
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExportData::Text(text) => Some(text),
            ExportData::Binary(_) => None,
        }
    }
}

/// Value of `dataEncoding` for base64-encoded binary payloads
pub const BASE64_ENCODING: &str = "base64";

/// Outcome of one export call.
///
/// Built once per request and consumed once by the download step. On the wire
/// `data` is always a string: text payloads travel as-is, binary payloads are
/// base64-encoded and flagged with `dataEncoding: "base64"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireExportResult", try_from = "WireExportResult")]
pub struct ExportResult {
    pub success: bool,
    pub data: Option<ExportData>,
    pub filename: Option<String>,
    pub total_records: Option<usize>,
    pub mime_type: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireExportResult {
    success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_encoding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_records: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ExportResult> for WireExportResult {
    fn from(result: ExportResult) -> Self {
        let (data, data_encoding) = match result.data {
            Some(ExportData::Text(text)) => (Some(text), None),
            Some(ExportData::Binary(bytes)) => (
                Some(STANDARD.encode(bytes)),
                Some(BASE64_ENCODING.to_string()),
            ),
            None => (None, None),
        };

        Self {
            success: result.success,
            data,
            data_encoding,
            filename: result.filename,
            total_records: result.total_records,
            mime_type: result.mime_type,
            error: result.error,
        }
    }
}

impl TryFrom<WireExportResult> for ExportResult {
    type Error = String;

    fn try_from(wire: WireExportResult) -> std::result::Result<Self, Self::Error> {
        let data = match (wire.data, wire.data_encoding.as_deref()) {
            (None, _) => None,
            (Some(text), None) => Some(ExportData::Text(text)),
            (Some(encoded), Some(BASE64_ENCODING)) => Some(ExportData::Binary(
                STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| format!("Invalid base64 data: {}", e))?,
            )),
            (Some(_), Some(other)) => return Err(format!("Unknown data encoding: {}", other)),
        };

        Ok(Self {
            success: wire.success,
            data,
            filename: wire.filename,
            total_records: wire.total_records,
            mime_type: wire.mime_type,
            error: wire.error,
        })
    }
}

impl ExportResult {
    /// Successful result carrying a payload
    pub fn success(
        data: ExportData,
        filename: impl Into<String>,
        total_records: usize,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            data: Some(data),
            filename: Some(filename.into()),
            total_records: Some(total_records),
            mime_type: Some(mime_type.into()),
            error: None,
        }
    }

    /// Failed result with a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Failed result describing an error
    pub fn from_error(err: &ExportError) -> Self {
        Self::failure(err.to_string())
    }
}

/// A decoded query parameter: one value, or several for a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ParamValue {
    /// First value (the value itself for a single parameter)
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// All values in order
    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::Single(value) => vec![value.as_str()],
            ParamValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// True for an empty string or an empty sequence
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Single(value) => value.is_empty(),
            ParamValue::Multiple(values) => values.is_empty(),
        }
    }

    /// Append a value, promoting a single value to a sequence
    pub fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = ParamValue::Multiple(vec![first, value]);
            }
            ParamValue::Multiple(values) => values.push(value),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Multiple(values)
    }
}

/// Page query parameters, keyed by filter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a URL query string (leading `?` optional).
    ///
    /// The first occurrence of a key becomes a single value; every further
    /// occurrence promotes it to a sequence in first-seen order.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.append(key.into_owned(), value.into_owned());
        }
        params
    }

    /// Add a value under `key`, following the repeated-key promotion rule
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
            Entry::Vacant(entry) => {
                entry.insert(ParamValue::Single(value));
            }
        }
    }

    /// Replace the value stored under `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`QueryParams::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// First value of `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(ParamValue::first)
    }

    /// All values of `key` (empty when absent)
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.0.get(key).map(ParamValue::values).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);

        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert!(err.to_string().contains("\"pdf\""));
    }

    #[test]
    fn test_config_defaults() {
        let config = ExportConfig::default();
        assert!(config.include_timestamp);
        assert_eq!(config.sheet_name(), "Sheet1");
        assert_eq!(config.filename_prefix(), "export");
        assert_eq!(config.extension(ExportFormat::Excel), "xlsx");
        assert_eq!(config.mime_type(ExportFormat::Csv), CSV_MIME_TYPE);
    }

    #[test]
    fn test_spreadsheet_ml_mode() {
        let config = ExportConfig::new().with_excel_mode(ExcelMode::SpreadsheetMl);
        assert_eq!(config.extension(ExportFormat::Excel), "xls");
        assert_eq!(config.mime_type(ExportFormat::Excel), XLS_MIME_TYPE);
        assert_eq!(config.extension(ExportFormat::Csv), "csv");
    }

    #[test]
    fn test_query_string_promotes_repeated_keys() {
        let params = QueryParams::from_query_str(
            "?booking_status=confirmed&search=bali&booking_status=rejected",
        );

        assert_eq!(
            params.get("booking_status"),
            Some(&ParamValue::Multiple(vec![
                "confirmed".to_string(),
                "rejected".to_string()
            ]))
        );
        assert_eq!(
            params.get("search"),
            Some(&ParamValue::Single("bali".to_string()))
        );
    }

    #[test]
    fn test_query_string_decoding() {
        let params = QueryParams::from_query_str("date_in=2024-01-01+to+2024-01-31&q=a%2Cb");
        assert_eq!(params.first("date_in"), Some("2024-01-01 to 2024-01-31"));
        assert_eq!(params.first("q"), Some("a,b"));
    }

    #[test]
    fn test_param_value_views() {
        let multi = ParamValue::from(vec!["a", "b"]);
        assert_eq!(multi.first(), Some("a"));
        assert_eq!(multi.values(), vec!["a", "b"]);
        assert!(ParamValue::Multiple(Vec::new()).is_empty());
        assert!(ParamValue::from("").is_empty());
    }

    #[test]
    fn test_result_wire_shape() {
        let result = ExportResult::success(
            ExportData::Binary(vec![1, 2, 3]),
            "hotels.xlsx",
            3,
            XLSX_MIME_TYPE,
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["totalRecords"], 3);
        assert_eq!(json["mimeType"], XLSX_MIME_TYPE);
        assert_eq!(json["data"], "AQID");
        assert_eq!(json["dataEncoding"], "base64");
        assert!(json.get("error").is_none());

        let back: ExportResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_failure_result() {
        let result = ExportResult::from_error(&ExportError::EmptyResult);
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("No data found matching the specified filters")
        );
    }
}
