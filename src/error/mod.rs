//! Error handling for export operations.
//!
//! Errors fall into the groups an export can fail in:
//! - Validation errors (bad format, no records, no columns)
//! - Empty results after filtering
//! - Row-level failures, which are isolated and never abort an export
//! - Serialization failures of the output document
//! - Client-side failures (action invocation, saving the file)
//!
//! Every group ends in an unsuccessful `ExportResult` at the action boundary.
//!
//! # Example
//!
//! ```rust
//! use booking_export::error::{ExportError, Result, ValidationError};
//!
//! fn require_columns(count: usize) -> Result<()> {
//!     if count == 0 {
//!         return Err(ValidationError::NoColumns.into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(require_columns(0), Err(ExportError::Validation(_))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{
    ClientError, ConfigError, ExportError, NO_MATCHING_DATA, Result, RowError,
    SerializationError, ValidationError,
};
