//! Type tags and wire constants
//!
//! Remote column types, generic SQL type codes, native value kinds, and the
//! length indicators used by the frame format.

use std::fmt;

use crate::error::{Error, Result};

// =============================================================================
// Remote Types
// =============================================================================

/// Maximum precision of a remote NUMBER column
pub const MAX_NUMBER_PRECISION: u8 = 38;

/// Maximum fractional-second digits of a remote TIME column
pub const MAX_TIME_SCALE: u8 = 9;

/// Maximum number of parameters in one statement (the UB2 column count of a frame)
pub const MAX_PARAMETERS: usize = u16::MAX as usize;

/// Column or parameter type as known to the remote engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteType {
    /// Fixed-point NUMBER(precision, scale); scale 0 is an integer column
    Fixed {
        /// Total significant digits
        precision: u8,
        /// Digits after the decimal point
        scale: u8,
    },
    /// Time of day with `scale` fractional-second digits
    Time {
        /// Fractional-second digits (0-9)
        scale: u8,
    },
}

impl RemoteType {
    /// NUMBER(38, 0), the remote representation of every integer kind
    pub const NUMBER: RemoteType = RemoteType::Fixed {
        precision: MAX_NUMBER_PRECISION,
        scale: 0,
    };

    /// TIME(9)
    pub const TIME: RemoteType = RemoteType::Time {
        scale: MAX_TIME_SCALE,
    };

    /// Create a validated NUMBER(precision, scale)
    pub fn fixed(precision: u8, scale: u8) -> Result<Self> {
        if precision == 0 || precision > MAX_NUMBER_PRECISION || scale > precision {
            return Err(Error::InvalidConfig(format!(
                "NUMBER({}, {}) is not a valid remote type",
                precision, scale
            )));
        }
        Ok(RemoteType::Fixed { precision, scale })
    }

    /// Create a validated TIME(scale)
    pub fn time(scale: u8) -> Result<Self> {
        if scale > MAX_TIME_SCALE {
            return Err(Error::InvalidConfig(format!(
                "TIME({}) is not a valid remote type",
                scale
            )));
        }
        Ok(RemoteType::Time { scale })
    }

    /// Broad class used by the coercion table
    pub fn class(&self) -> RemoteTypeClass {
        match self {
            RemoteType::Fixed { .. } => RemoteTypeClass::Fixed,
            RemoteType::Time { .. } => RemoteTypeClass::Time,
        }
    }

    /// Check if this is a NUMBER type
    pub fn is_numeric(&self) -> bool {
        matches!(self, RemoteType::Fixed { .. })
    }

    /// Check if this is a TIME type
    pub fn is_time(&self) -> bool {
        matches!(self, RemoteType::Time { .. })
    }

    /// Scale of the type (decimal digits or fractional-second digits)
    pub fn scale(&self) -> u8 {
        match self {
            RemoteType::Fixed { scale, .. } | RemoteType::Time { scale } => *scale,
        }
    }

    /// Wire tag byte for this type
    pub fn tag(&self) -> u8 {
        match self {
            RemoteType::Fixed { .. } => type_tag::FIXED,
            RemoteType::Time { .. } => type_tag::TIME,
        }
    }

    /// Precision byte as written in a frame (0 for TIME)
    pub fn precision(&self) -> u8 {
        match self {
            RemoteType::Fixed { precision, .. } => *precision,
            RemoteType::Time { .. } => 0,
        }
    }

    /// Rebuild a remote type from its frame header
    pub fn from_tag(tag: u8, precision: u8, scale: u8) -> Result<Self> {
        match tag {
            type_tag::FIXED => RemoteType::fixed(precision, scale),
            type_tag::TIME => RemoteType::time(scale),
            _ => Err(Error::InvalidTypeTag(tag)),
        }
    }
}

impl fmt::Display for RemoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteType::Fixed { precision, scale } => write!(f, "NUMBER({},{})", precision, scale),
            RemoteType::Time { scale } => write!(f, "TIME({})", scale),
        }
    }
}

/// Remote type family, ignoring precision and scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteTypeClass {
    /// NUMBER
    Fixed,
    /// TIME
    Time,
}

/// Wire tags for remote types (first byte of a cell frame)
#[allow(missing_docs)]
pub mod type_tag {
    pub const FIXED: u8 = 0x02;
    pub const TIME: u8 = 0x5C;
}

// =============================================================================
// Native Value Kinds
// =============================================================================

/// Kind of a non-NULL native value, also used as a requested read kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Signed 8-bit integer
    TinyInt,
    /// Signed 16-bit integer
    SmallInt,
    /// Signed 32-bit integer
    Int,
    /// Signed 64-bit integer
    BigInt,
    /// Exact decimal
    Decimal,
    /// Time of day
    Time,
}

impl ValueKind {
    /// Every kind, narrowest integer first
    pub const ALL: [ValueKind; 6] = [
        ValueKind::TinyInt,
        ValueKind::SmallInt,
        ValueKind::Int,
        ValueKind::BigInt,
        ValueKind::Decimal,
        ValueKind::Time,
    ];

    /// Check if this is one of the signed integer kinds
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ValueKind::TinyInt | ValueKind::SmallInt | ValueKind::Int | ValueKind::BigInt
        )
    }

    /// Inclusive range representable by an integer kind
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            ValueKind::TinyInt => Some((i8::MIN as i64, i8::MAX as i64)),
            ValueKind::SmallInt => Some((i16::MIN as i64, i16::MAX as i64)),
            ValueKind::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            ValueKind::BigInt => Some((i64::MIN, i64::MAX)),
            ValueKind::Decimal | ValueKind::Time => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::TinyInt => "TINYINT",
            ValueKind::SmallInt => "SMALLINT",
            ValueKind::Int => "INT",
            ValueKind::BigInt => "BIGINT",
            ValueKind::Decimal => "DECIMAL",
            ValueKind::Time => "TIME",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Generic SQL Type Codes
// =============================================================================

/// Generic SQL type codes accepted by typed-NULL and "set object" binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SqlType {
    /// TINYINT
    TinyInt = -6,
    /// BIGINT
    BigInt = -5,
    /// NUMERIC
    Numeric = 2,
    /// DECIMAL
    Decimal = 3,
    /// INTEGER
    Integer = 4,
    /// SMALLINT
    SmallInt = 5,
    /// TIME
    Time = 92,
}

impl SqlType {
    /// Numeric type code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Remote type a value tagged with this code binds into
    pub fn remote_type(&self) -> RemoteType {
        match self {
            SqlType::Time => RemoteType::TIME,
            _ => RemoteType::NUMBER,
        }
    }

    /// Native kind conventionally associated with this code
    pub fn value_kind(&self) -> ValueKind {
        match self {
            SqlType::TinyInt => ValueKind::TinyInt,
            SqlType::SmallInt => ValueKind::SmallInt,
            SqlType::Integer => ValueKind::Int,
            SqlType::BigInt => ValueKind::BigInt,
            SqlType::Numeric | SqlType::Decimal => ValueKind::Decimal,
            SqlType::Time => ValueKind::Time,
        }
    }
}

impl TryFrom<i32> for SqlType {
    type Error = Error;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            -6 => Ok(SqlType::TinyInt),
            -5 => Ok(SqlType::BigInt),
            2 => Ok(SqlType::Numeric),
            3 => Ok(SqlType::Decimal),
            4 => Ok(SqlType::Integer),
            5 => Ok(SqlType::SmallInt),
            92 => Ok(SqlType::Time),
            _ => Err(Error::InvalidTypeCode(value)),
        }
    }
}

// =============================================================================
// Length Indicators
// =============================================================================

/// Length indicator bytes for length-prefixed payloads
#[allow(missing_docs)]
pub mod length {
    /// Maximum length that fits in a single byte
    pub const MAX_SHORT: u8 = 252;
    /// Indicates a long (chunked) payload follows
    pub const LONG_INDICATOR: u8 = 254;
    /// Indicates NULL value
    pub const NULL_INDICATOR: u8 = 255;
    /// Maximum chunk size for long payloads
    pub const CHUNK_SIZE: usize = 32767;
}
