//! # Error Types
//!
//! Structured error types for rv_core. Errors fall into two practical groups:
//!
//! - **Block and prompt**: the user skipped a wizard step
//!   ([`SizingError::MissingUpstreamInput`]) or typed an out-of-range value.
//! - **Recoverable**: persisted state that can't be read. These are usually
//!   swallowed by [`crate::file_io::load_session_or_default`] and replaced
//!   with defaults, so callers rarely see them.
//!
//! ## Example
//!
//! ```rust
//! use rv_core::errors::{SizingError, SizingResult};
//!
//! fn validate_hours(hours: f64) -> SizingResult<()> {
//!     if !(0.0..=24.0).contains(&hours) {
//!         return Err(SizingError::invalid_input(
//!             "hours_per_day",
//!             hours.to_string(),
//!             "Hours per day must be between 0 and 24",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rv_core operations
pub type SizingResult<T> = Result<T, SizingError>;

/// Structured error type for sizing operations.
///
/// Serializes with a `type` tag so front ends can switch on it without
/// parsing messages.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SizingError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Appliance id not present in the catalog
    #[error("Appliance not found: {appliance_id}")]
    ApplianceNotFound { appliance_id: String },

    /// Region key not present in the sun-hour table
    #[error("Region not found: {region}")]
    RegionNotFound { region: String },

    /// An earlier wizard step has not been completed
    #[error("{message} (redo step: {step})")]
    MissingUpstreamInput { step: String, message: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Session file is locked by another process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// PDF report could not be produced
    #[error("Report failed: {reason}")]
    ReportFailed { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SizingError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SizingError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        SizingError::MissingField {
            field: field.into(),
        }
    }

    /// Create an ApplianceNotFound error
    pub fn appliance_not_found(appliance_id: impl Into<String>) -> Self {
        SizingError::ApplianceNotFound {
            appliance_id: appliance_id.into(),
        }
    }

    /// Create a RegionNotFound error
    pub fn region_not_found(region: impl Into<String>) -> Self {
        SizingError::RegionNotFound {
            region: region.into(),
        }
    }

    /// Create a MissingUpstreamInput error
    pub fn missing_upstream(step: impl Into<String>, message: impl Into<String>) -> Self {
        SizingError::MissingUpstreamInput {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SizingError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        SizingError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from anything displayable
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        SizingError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (retry later, or fall back to defaults)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SizingError::FileLocked { .. }
                | SizingError::SerializationError { .. }
                | SizingError::VersionMismatch { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SizingError::InvalidInput { .. } => "INVALID_INPUT",
            SizingError::MissingField { .. } => "MISSING_FIELD",
            SizingError::ApplianceNotFound { .. } => "APPLIANCE_NOT_FOUND",
            SizingError::RegionNotFound { .. } => "REGION_NOT_FOUND",
            SizingError::MissingUpstreamInput { .. } => "MISSING_UPSTREAM_INPUT",
            SizingError::FileError { .. } => "FILE_ERROR",
            SizingError::FileLocked { .. } => "FILE_LOCKED",
            SizingError::SerializationError { .. } => "SERIALIZATION_ERROR",
            SizingError::VersionMismatch { .. } => "VERSION_MISMATCH",
            SizingError::ReportFailed { .. } => "REPORT_FAILED",
            SizingError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
