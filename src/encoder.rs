//! Native value to wire value encoding
//!
//! The encoder checks the pairing against the coercion table before any
//! bytes are produced, so a [`TypeMismatch`](crate::Error::TypeMismatch)
//! never leaves a partially encoded value behind.

use chrono::NaiveTime;

use crate::coercion::CoercionTable;
use crate::config::{CodecConfig, TimeZoneHandling};
use crate::constants::{RemoteType, ValueKind, MAX_NUMBER_PRECISION};
use crate::error::{Error, Location, Result};
use crate::temporal::{self, CalendarContext};
use crate::types::{encode_time, truncate_to_scale, Number};
use crate::value::NativeValue;
use crate::wire::WireValue;

/// Encodes native values for a target remote type
#[derive(Debug, Clone, Copy)]
pub struct ValueEncoder {
    table: &'static CoercionTable,
    config: CodecConfig,
}

impl ValueEncoder {
    /// Create an encoder over the standard coercion table
    pub fn new(config: CodecConfig) -> Self {
        Self {
            table: CoercionTable::standard(),
            config,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Remote type used when a bind carries no hint
    pub fn default_remote_type(&self, value: &NativeValue) -> RemoteType {
        match value {
            NativeValue::Null(remote_type) => *remote_type,
            NativeValue::Time(_) => self.config.default_time_type(),
            NativeValue::Decimal(number) => decimal_remote_type(number),
            other => other
                .kind()
                .map(|kind| self.table.default_remote_type(kind))
                .unwrap_or(RemoteType::NUMBER),
        }
    }

    /// Encode `value` for `remote_type`
    pub fn encode(
        &self,
        value: &NativeValue,
        remote_type: RemoteType,
        calendar: Option<&CalendarContext>,
    ) -> Result<WireValue> {
        match self.table.widen(value, remote_type)? {
            NativeValue::Null(remote_type) => Ok(WireValue::null(remote_type)),
            NativeValue::Decimal(number) => self.encode_number(&number, remote_type),
            NativeValue::Time(time) => Ok(self.encode_time(time, remote_type, calendar)),
            // widen() maps every integer kind to Decimal
            other => Err(Error::TypeMismatch {
                location: Location::Unknown,
                expected: remote_type,
                actual: other.kind().unwrap_or(ValueKind::Decimal),
            }),
        }
    }

    fn encode_number(&self, number: &Number, remote_type: RemoteType) -> Result<WireValue> {
        check_fits(number, remote_type)?;
        Ok(WireValue::new(remote_type, number.to_bytes()?))
    }

    fn encode_time(
        &self,
        time: NaiveTime,
        remote_type: RemoteType,
        calendar: Option<&CalendarContext>,
    ) -> WireValue {
        let wall_clock = match calendar {
            None => time,
            Some(cal) => {
                let zone = match self.config.time_zone_handling {
                    TimeZoneHandling::UtcNormalized => {
                        tracing::trace!(
                            source_offset = cal.source.local_minus_utc(),
                            "calendar TIME bind normalized through UTC"
                        );
                        temporal::utc()
                    }
                    TimeZoneHandling::HonorCalendar => cal.source,
                };
                temporal::to_absolute(time, zone).utc()
            }
        };

        let truncated = truncate_to_scale(wall_clock, remote_type.scale());
        WireValue::new(remote_type, encode_time(&truncated).to_vec())
    }
}

impl Default for ValueEncoder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

/// NUMBER type with room for the fractional digits of `number`
pub fn decimal_remote_type(number: &Number) -> RemoteType {
    let scale = number.scale().min(MAX_NUMBER_PRECISION as usize) as u8;
    RemoteType::Fixed {
        precision: MAX_NUMBER_PRECISION,
        scale,
    }
}

/// Check that `number` fits NUMBER(precision, scale) without rounding
fn check_fits(number: &Number, remote_type: RemoteType) -> Result<()> {
    if let RemoteType::Fixed { precision, scale } = remote_type {
        let max_integer_digits = precision.saturating_sub(scale) as usize;
        if number.integer_digits() > max_integer_digits || number.scale() > scale as usize {
            return Err(Error::ValueOutOfRange {
                location: Location::Unknown,
                remote_type,
                value: number.to_string(),
            });
        }
    }
    Ok(())
}
