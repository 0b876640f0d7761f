use std::{fmt, io};

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Message reported when filtering removes every record.
pub const NO_MATCHING_DATA: &str = "No data found matching the specified filters";

/// Top-level error type for export operations.
///
/// Every failure path of an export ends up here before it is turned into an
/// unsuccessful `ExportResult`.
#[derive(Debug)]
pub enum ExportError {
    /// Input rejected before any work was attempted.
    Validation(ValidationError),

    /// Filters removed every record.
    EmptyResult,

    /// A single row could not be rendered.
    Row(RowError),

    /// The output document could not be produced.
    Serialization(SerializationError),

    /// Configuration errors.
    Config(ConfigError),

    /// Errors raised on the client side of an export request.
    Client(ClientError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Validation errors, detected before filtering or serialization.
#[derive(Debug)]
pub enum ValidationError {
    /// Requested format is not one of the supported formats.
    InvalidFormat(String),

    /// No records were handed to the exporter.
    NoData,

    /// No columns were defined.
    NoColumns,

    /// Two columns share the same key.
    DuplicateColumn(String),

    /// Unknown export page.
    UnknownPage(String),
}

/// Row-level processing error.
#[derive(Debug)]
pub struct RowError {
    /// Column key whose accessor failed, if known.
    pub column: Option<String>,
    /// Failure description.
    pub message: String,
}

/// Serialization-level errors.
#[derive(Debug)]
pub struct SerializationError {
    /// Wire name of the format that failed (`csv`, `excel`).
    pub format: String,
    /// Underlying writer error.
    pub source: String,
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Client-side errors.
#[derive(Debug)]
pub enum ClientError {
    /// The export action could not be invoked or failed while running.
    ActionFailed(String),

    /// The action reported success but returned no payload.
    MissingData,

    /// Saving the downloaded file failed.
    DownloadFailed(String),
}

impl RowError {
    /// Create a row error for a specific column
    pub fn for_column(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            message: message.into(),
        }
    }
}

impl SerializationError {
    /// Create a serialization error for a format
    pub fn new(format: impl Into<String>, source: impl fmt::Display) -> Self {
        Self {
            format: format.into(),
            source: source.to_string(),
        }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Validation(e) => write!(f, "{e}"),
            ExportError::EmptyResult => write!(f, "{NO_MATCHING_DATA}"),
            ExportError::Row(e) => write!(f, "Row error: {e}"),
            ExportError::Serialization(e) => write!(f, "{e}"),
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Client(e) => write!(f, "{e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidFormat(value) => write!(
                f,
                "Invalid export format: \"{value}\". Supported formats: csv, excel"
            ),
            ValidationError::NoData => write!(f, "No data provided for export"),
            ValidationError::NoColumns => write!(f, "No columns defined for export"),
            ValidationError::DuplicateColumn(key) => {
                write!(f, "Duplicate column key in export: {key}")
            }
            ValidationError::UnknownPage(name) => write!(f, "Unknown export page: {name}"),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "column '{column}': {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to generate {} format", self.format)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::ActionFailed(msg) => write!(f, "Export request failed: {msg}"),
            ClientError::MissingData => write!(f, "Export returned no data"),
            ClientError::DownloadFailed(msg) => write!(f, "Failed to save export: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for RowError {}
impl std::error::Error for SerializationError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ClientError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<ValidationError> for ExportError {
    fn from(err: ValidationError) -> Self {
        ExportError::Validation(err)
    }
}

impl From<RowError> for ExportError {
    fn from(err: RowError) -> Self {
        ExportError::Row(err)
    }
}

impl From<SerializationError> for ExportError {
    fn from(err: SerializationError) -> Self {
        ExportError::Serialization(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<ClientError> for ExportError {
    fn from(err: ClientError) -> Self {
        ExportError::Client(err)
    }
}

impl From<String> for ExportError {
    fn from(msg: String) -> Self {
        ExportError::Generic(msg)
    }
}

impl From<&str> for ExportError {
    fn from(msg: &str) -> Self {
        ExportError::Generic(msg.to_owned())
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for ExportError {
    fn from(err: toml::ser::Error) -> Self {
        ExportError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Generic(format!("JSON error: {err}"))
    }
}
