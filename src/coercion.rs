//! Native-kind to remote-type coercion table
//!
//! The table lists, for every native kind, the remote type families it may
//! bind into and the conversion applied. It is immutable and built once per
//! process; [`CoercionTable::standard`] hands out a shared reference.
//!
//! NULL is accepted by every remote type and is not listed in the table.

use std::sync::OnceLock;

use crate::constants::{RemoteType, RemoteTypeClass, ValueKind};
use crate::error::{Error, Location, Result};
use crate::value::NativeValue;

/// Conversion applied when a native kind binds into a remote type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Integer widened losslessly to an exact decimal
    ExactWiden,
    /// Decimal passed through unchanged, checked against precision and scale
    ExactDecimal,
    /// Time of day passed as wall-clock fields
    WallClockTime,
}

/// One accepted (kind, remote family) pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionRule {
    /// Native kind being bound
    pub kind: ValueKind,
    /// Remote type family accepting it
    pub remote: RemoteTypeClass,
    /// Conversion applied
    pub conversion: Conversion,
}

/// Immutable table of accepted pairings
#[derive(Debug, Clone)]
pub struct CoercionTable {
    rules: Vec<CoercionRule>,
}

static STANDARD: OnceLock<CoercionTable> = OnceLock::new();

impl CoercionTable {
    /// The process-wide table
    pub fn standard() -> &'static CoercionTable {
        STANDARD.get_or_init(CoercionTable::build)
    }

    fn build() -> Self {
        let integer_rules = [
            ValueKind::TinyInt,
            ValueKind::SmallInt,
            ValueKind::Int,
            ValueKind::BigInt,
        ]
        .into_iter()
        .map(|kind| CoercionRule {
            kind,
            remote: RemoteTypeClass::Fixed,
            conversion: Conversion::ExactWiden,
        });

        let rules = integer_rules
            .chain([
                CoercionRule {
                    kind: ValueKind::Decimal,
                    remote: RemoteTypeClass::Fixed,
                    conversion: Conversion::ExactDecimal,
                },
                CoercionRule {
                    kind: ValueKind::Time,
                    remote: RemoteTypeClass::Time,
                    conversion: Conversion::WallClockTime,
                },
            ])
            .collect();

        Self { rules }
    }

    /// All rules, in table order
    pub fn rules(&self) -> &[CoercionRule] {
        &self.rules
    }

    /// Rule for a (kind, remote type) pairing, if accepted
    pub fn rule(&self, kind: ValueKind, remote: RemoteType) -> Option<&CoercionRule> {
        let class = remote.class();
        self.rules
            .iter()
            .find(|r| r.kind == kind && r.remote == class)
    }

    /// Check whether `kind` may bind into `remote`
    pub fn is_compatible(&self, kind: ValueKind, remote: RemoteType) -> bool {
        self.rule(kind, remote).is_some()
    }

    /// Check whether `value` may bind into `remote` (NULL always may)
    pub fn accepts(&self, value: &NativeValue, remote: RemoteType) -> bool {
        match value.kind() {
            None => true,
            Some(kind) => self.is_compatible(kind, remote),
        }
    }

    /// Remote type used when a bind carries no type hint
    pub fn default_remote_type(&self, kind: ValueKind) -> RemoteType {
        match kind {
            ValueKind::Time => RemoteType::TIME,
            _ => RemoteType::NUMBER,
        }
    }

    /// Apply the pairing's conversion to `value`
    ///
    /// Integers become an exact [`Number`](crate::types::Number); decimals and
    /// times pass through; NULL is re-tagged with `remote`.
    pub fn widen(&self, value: &NativeValue, remote: RemoteType) -> Result<NativeValue> {
        let kind = match value.kind() {
            None => return Ok(NativeValue::Null(remote)),
            Some(kind) => kind,
        };

        let rule = self.rule(kind, remote).ok_or(Error::TypeMismatch {
            location: Location::Unknown,
            expected: remote,
            actual: kind,
        })?;

        match rule.conversion {
            Conversion::ExactWiden | Conversion::ExactDecimal => value
                .to_number()
                .map(NativeValue::Decimal)
                .ok_or_else(|| Error::TypeMismatch {
                    location: Location::Unknown,
                    expected: remote,
                    actual: kind,
                }),
            Conversion::WallClockTime => Ok(value.clone()),
        }
    }
}
