//! Column model: how one record becomes one exported row.
//!
//! A [`Column`] pairs a unique key and a header label with a typed accessor,
//! an optional value formatter and an optional display width. Accessors return
//! [`CellValue`]s; formatting to text happens in one place ([`format_value`])
//! unless a column supplies its own formatter.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::{ExportError, Result, RowError};

/// A typed cell value produced by a column accessor
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl CellValue {
    /// Plain string conversion used for filtering.
    ///
    /// Unlike [`format_value`] this keeps machine-readable forms:
    /// `true`/`false` for booleans and ISO 8601 for dates.
    pub fn as_plain_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::Text(value.clone())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Integer(i64::from(value))
    }
}

impl From<u8> for CellValue {
    fn from(value: u8) -> Self {
        CellValue::Integer(i64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Default display formatting of a cell value.
///
/// Null becomes an empty string, booleans become `Yes`/`No`, dates are rendered
/// like `Jan 15, 2024`. Everything else uses its plain string form.
pub fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Bool(true) => "Yes".to_string(),
        CellValue::Bool(false) => "No".to_string(),
        CellValue::Date(date) => format_date(*date),
        CellValue::DateTime(dt) => format_date(dt.date_naive()),
        other => other.as_plain_text(),
    }
}

/// Human-readable date with a short month name
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Fallible accessor extracting a cell value from a record
pub type Accessor<T> = Arc<dyn Fn(&T) -> Result<CellValue> + Send + Sync>;

/// Formatter overriding [`format_value`] for one column; may fail for some values
pub type ValueFormatter = Arc<dyn Fn(&CellValue) -> Result<String> + Send + Sync>;

/// One exported column
pub struct Column<T> {
    /// Unique key within one export
    pub key: String,
    /// Header label; column order defines output order
    pub header: String,
    /// Display width in characters, if fixed
    pub width: Option<f64>,
    accessor: Accessor<T>,
    formatter: Option<ValueFormatter>,
}

impl<T> Column<T> {
    /// Create a column with an infallible accessor
    pub fn new<F>(key: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        Self::try_new(key, header, move |record: &T| Ok(accessor(record)))
    }

    /// Create a column whose accessor may fail for some records
    pub fn try_new<F>(key: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Result<CellValue> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            header: header.into(),
            width: None,
            accessor: Arc::new(accessor),
            formatter: None,
        }
    }

    pub fn with_formatter<F>(self, formatter: F) -> Self
    where
        F: Fn(&CellValue) -> String + Send + Sync + 'static,
    {
        self.try_with_formatter(move |value: &CellValue| Ok(formatter(value)))
    }

    /// Use a formatter that may reject some values
    pub fn try_with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&CellValue) -> Result<String> + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Extract the raw value of this column from a record
    pub fn value(&self, record: &T) -> Result<CellValue> {
        (self.accessor)(record).map_err(|err| self.row_error(err))
    }

    /// Extract and format the cell text of this column for a record
    pub fn render(&self, record: &T) -> Result<String> {
        let value = self.value(record)?;
        match &self.formatter {
            Some(formatter) => formatter(&value).map_err(|err| self.row_error(err)),
            None => Ok(format_value(&value)),
        }
    }

    fn row_error(&self, err: ExportError) -> ExportError {
        match err {
            ExportError::Row(row) => ExportError::Row(row),
            other => RowError::for_column(self.key.clone(), other.to_string()).into(),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            width: self.width,
            accessor: Arc::clone(&self.accessor),
            formatter: self.formatter.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("has_formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Render one record into cells, one per column.
///
/// Fails on the first column whose accessor fails; callers decide how to
/// recover (the service blanks the whole row).
pub fn render_row<T>(columns: &[Column<T>], record: &T) -> Result<Vec<String>> {
    columns.iter().map(|column| column.render(record)).collect()
}

/// Header labels in column order
pub fn headers<T>(columns: &[Column<T>]) -> Vec<String> {
    columns.iter().map(|column| column.header.clone()).collect()
}
