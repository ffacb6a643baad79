//! Error types for the binding engine
//!
//! Value-level failures (type mismatches, incomplete rows, conversion
//! failures) are local to a single parameter or column and carry a
//! [`Location`] for diagnostics. Nothing raised by this layer is retryable.

use std::fmt;
use thiserror::Error;

use crate::constants::{RemoteType, ValueKind};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Where a value-level error happened
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Location {
    /// Not yet attributed to a parameter or column
    #[default]
    Unknown,
    /// 1-based bind parameter position
    Parameter(usize),
    /// Result column name
    Column(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unknown => Ok(()),
            Location::Parameter(pos) => write!(f, " at parameter {}", pos),
            Location::Column(name) => write!(f, " at column {}", name),
        }
    }
}

/// Main error type for the binding engine
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Value Errors
    // =========================================================================
    /// Native value kind is not accepted by the target remote type
    #[error("type mismatch{location}: {actual} cannot be bound as {expected}")]
    TypeMismatch {
        location: Location,
        expected: RemoteType,
        actual: ValueKind,
    },

    /// A batch row is missing one or more parameter values
    #[error("incomplete binding: parameter(s) {missing:?} not set")]
    IncompleteBinding { missing: Vec<usize> },

    /// A wire value cannot be read as the requested kind
    #[error("conversion failure{location}: cannot read {actual} as {expected}: {reason}")]
    ConversionFailure {
        location: Location,
        expected: ValueKind,
        actual: String,
        reason: String,
    },

    /// A numeric value does not fit the declared precision/scale
    #[error("value out of range{location}: {value} does not fit {remote_type}")]
    ValueOutOfRange {
        location: Location,
        remote_type: RemoteType,
        value: String,
    },

    // =========================================================================
    // Statement Errors
    // =========================================================================
    /// Bind position outside the statement's parameter range
    #[error("invalid parameter index {position} (statement has {count} parameters)")]
    InvalidParameterIndex { position: usize, count: usize },

    /// Parameter marker beyond the supported parameter count
    #[error("parameter marker {marker} exceeds the maximum of {max} parameters")]
    ParameterLimitExceeded { marker: String, max: usize },

    /// Column name not present in the result set
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Read attempted without a current row
    #[error("no current row")]
    NoCurrentRow,

    /// Batch execution requested with no accumulated rows
    #[error("batch has no rows")]
    EmptyBatch,

    // =========================================================================
    // Type Tag Errors
    // =========================================================================
    /// Unknown generic SQL type code
    #[error("invalid SQL type code: {0}")]
    InvalidTypeCode(i32),

    /// Unknown remote type tag in a wire frame
    #[error("invalid remote type tag: {0:#04x}")]
    InvalidTypeTag(u8),

    // =========================================================================
    // Buffer Errors
    // =========================================================================
    /// Buffer underflow - not enough data to read
    #[error("buffer underflow: need {needed} bytes but only {available} available")]
    BufferUnderflow { needed: usize, available: usize },

    /// Buffer overflow - not enough space to write
    #[error("buffer overflow: need {needed} bytes but only {available} available")]
    BufferOverflow { needed: usize, available: usize },

    /// Invalid length indicator
    #[error("invalid length indicator: {0}")]
    InvalidLengthIndicator(u8),

    /// Structurally invalid frame
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    // =========================================================================
    // Configuration and Transport Errors
    // =========================================================================
    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by the execution layer
    #[error("execution failed: {0}")]
    Execution(String),
}

impl Error {
    /// Create a conversion failure with no location attached yet
    pub fn conversion(
        expected: ValueKind,
        actual: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::ConversionFailure {
            location: Location::Unknown,
            expected,
            actual: actual.into(),
            reason: reason.into(),
        }
    }

    /// Attach a location to a value-level error
    ///
    /// Errors that do not carry a location are returned unchanged.
    pub fn at(mut self, at: Location) -> Self {
        match &mut self {
            Error::TypeMismatch { location, .. }
            | Error::ConversionFailure { location, .. }
            | Error::ValueOutOfRange { location, .. } => *location = at,
            _ => {}
        }
        self
    }

    /// Location of a value-level error, if any
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::TypeMismatch { location, .. }
            | Error::ConversionFailure { location, .. }
            | Error::ValueOutOfRange { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Check if this is a value-level error (mismatch, incomplete row, conversion)
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Error::TypeMismatch { .. }
                | Error::IncompleteBinding { .. }
                | Error::ConversionFailure { .. }
                | Error::ValueOutOfRange { .. }
        )
    }

    /// Check if this error is recoverable (can retry)
    ///
    /// Only failures surfaced by the execution layer may be transient.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Execution(_))
    }
}
