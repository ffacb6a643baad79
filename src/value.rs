//! Native values crossing the binding boundary
//!
//! [`NativeValue`] is what the application binds and what reads return.
//! NULL is a variant of its own and always carries the remote type it was
//! intended for, so a NULL is never untyped on the wire.

use std::fmt;

use chrono::NaiveTime;

use crate::constants::{RemoteType, ValueKind};
use crate::types::Number;

/// A client-side typed value
///
/// # Example
///
/// ```rust
/// use flakebind::{NativeValue, RemoteType, ValueKind};
///
/// let v: NativeValue = 42i16.into();
/// assert_eq!(v.kind(), Some(ValueKind::SmallInt));
///
/// let null = NativeValue::Null(RemoteType::NUMBER);
/// assert!(null.is_null());
/// assert_eq!(null.kind(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeValue {
    /// Signed 8-bit integer
    TinyInt(i8),
    /// Signed 16-bit integer
    SmallInt(i16),
    /// Signed 32-bit integer
    Int(i32),
    /// Signed 64-bit integer
    BigInt(i64),
    /// Exact decimal
    Decimal(Number),
    /// Time of day (no date, no zone)
    Time(NaiveTime),
    /// NULL tagged with its intended remote type
    Null(RemoteType),
}

impl NativeValue {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null(_))
    }

    /// Kind of the value, `None` for NULL
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            NativeValue::TinyInt(_) => Some(ValueKind::TinyInt),
            NativeValue::SmallInt(_) => Some(ValueKind::SmallInt),
            NativeValue::Int(_) => Some(ValueKind::Int),
            NativeValue::BigInt(_) => Some(ValueKind::BigInt),
            NativeValue::Decimal(_) => Some(ValueKind::Decimal),
            NativeValue::Time(_) => Some(ValueKind::Time),
            NativeValue::Null(_) => None,
        }
    }

    /// Integer kinds widened to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::TinyInt(v) => Some(*v as i64),
            NativeValue::SmallInt(v) => Some(*v as i64),
            NativeValue::Int(v) => Some(*v as i64),
            NativeValue::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer and decimal kinds as an exact decimal
    pub fn to_number(&self) -> Option<Number> {
        match self {
            NativeValue::Decimal(n) => Some(n.clone()),
            other => other.as_i64().map(Number::from),
        }
    }

    /// Try to get as a time of day
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            NativeValue::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<i8> for NativeValue {
    fn from(v: i8) -> Self {
        NativeValue::TinyInt(v)
    }
}

impl From<i16> for NativeValue {
    fn from(v: i16) -> Self {
        NativeValue::SmallInt(v)
    }
}

impl From<i32> for NativeValue {
    fn from(v: i32) -> Self {
        NativeValue::Int(v)
    }
}

impl From<i64> for NativeValue {
    fn from(v: i64) -> Self {
        NativeValue::BigInt(v)
    }
}

impl From<Number> for NativeValue {
    fn from(v: Number) -> Self {
        NativeValue::Decimal(v)
    }
}

impl From<NaiveTime> for NativeValue {
    fn from(v: NaiveTime) -> Self {
        NativeValue::Time(v)
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::TinyInt(v) => write!(f, "{}", v),
            NativeValue::SmallInt(v) => write!(f, "{}", v),
            NativeValue::Int(v) => write!(f, "{}", v),
            NativeValue::BigInt(v) => write!(f, "{}", v),
            NativeValue::Decimal(n) => write!(f, "{}", n),
            NativeValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            NativeValue::Null(_) => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(NativeValue::from(1i8).kind(), Some(ValueKind::TinyInt));
        assert_eq!(NativeValue::from(1i32).kind(), Some(ValueKind::Int));
        assert_eq!(NativeValue::from(1i64).kind(), Some(ValueKind::BigInt));
        assert_eq!(NativeValue::Null(RemoteType::TIME).kind(), None);
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(NativeValue::TinyInt(i8::MIN).as_i64(), Some(-128));
        assert_eq!(NativeValue::Int(i32::MAX).to_number(), Some(Number::from(i32::MAX)));
        assert!(NativeValue::Null(RemoteType::NUMBER).as_i64().is_none());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(NativeValue::SmallInt(-7).to_string(), "-7");
        assert_eq!(NativeValue::Null(RemoteType::NUMBER).to_string(), "NULL");
        let t = NaiveTime::from_hms_opt(12, 34, 56).unwrap();
        assert_eq!(NativeValue::Time(t).to_string(), "12:34:56");
        assert_eq!(NativeValue::Decimal(Number::parse("2.50").unwrap()).to_string(), "2.5");
    }
}
