//! Wire value to native value decoding

use chrono::NaiveTime;

use crate::config::{CodecConfig, TimeZoneHandling};
use crate::constants::{RemoteType, ValueKind};
use crate::error::{Error, Result};
use crate::temporal::{self, CalendarContext, InstantOfDay};
use crate::types::{decode_number, decode_time, Number};
use crate::value::NativeValue;
use crate::wire::WireValue;

/// Decodes wire values into native values
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueDecoder {
    config: CodecConfig,
}

impl ValueDecoder {
    /// Create a decoder with the given configuration
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Configuration in effect
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode to the value's natural kind
    ///
    /// Integral numbers that fit i64 become `BigInt`, other numbers become
    /// `Decimal`, and TIME becomes `Time`. NULL decodes to `Null`.
    pub fn decode(
        &self,
        wire: &WireValue,
        calendar: Option<&CalendarContext>,
    ) -> Result<NativeValue> {
        let payload = match wire.payload() {
            None => return Ok(NativeValue::Null(wire.remote_type())),
            Some(payload) => payload,
        };

        match wire.remote_type() {
            RemoteType::Fixed { .. } => {
                let number = decode_number(payload)?;
                if number.is_integer() {
                    if let Ok(v) = number.to_i64() {
                        return Ok(NativeValue::BigInt(v));
                    }
                }
                Ok(NativeValue::Decimal(number))
            }
            RemoteType::Time { .. } => Ok(NativeValue::Time(self.read_time(payload, calendar)?)),
        }
    }

    /// Decode as the caller-requested kind
    ///
    /// Fails with `ConversionFailure` when the stored value does not fit the
    /// requested kind; it never wraps or truncates.
    pub fn decode_as(
        &self,
        wire: &WireValue,
        kind: ValueKind,
        calendar: Option<&CalendarContext>,
    ) -> Result<NativeValue> {
        let remote_type = wire.remote_type();
        let payload = match wire.payload() {
            None => return Ok(NativeValue::Null(remote_type)),
            Some(payload) => payload,
        };

        match (kind, remote_type) {
            (ValueKind::Time, RemoteType::Time { .. }) => {
                Ok(NativeValue::Time(self.read_time(payload, calendar)?))
            }
            (ValueKind::Decimal, RemoteType::Fixed { .. }) => {
                Ok(NativeValue::Decimal(decode_number(payload)?))
            }
            (kind, RemoteType::Fixed { .. }) => {
                let number = decode_number(payload)?;
                narrow_integer(&number, kind)
            }
            (kind, remote_type) => Err(Error::conversion(
                kind,
                remote_type.to_string(),
                "incompatible remote type",
            )),
        }
    }

    fn read_time(&self, payload: &[u8], calendar: Option<&CalendarContext>) -> Result<NaiveTime> {
        let stored = decode_time(payload)?;
        let cal = match calendar {
            None => return Ok(stored),
            Some(cal) => cal,
        };

        let zone = match self.config.time_zone_handling {
            TimeZoneHandling::UtcNormalized => temporal::utc(),
            TimeZoneHandling::HonorCalendar => cal.target,
        };
        Ok(temporal::from_absolute(InstantOfDay::from_utc(stored), zone))
    }
}

/// Convert an exact number to an integer kind, rejecting out-of-range values
fn narrow_integer(number: &Number, kind: ValueKind) -> Result<NativeValue> {
    let (min, max) = kind
        .integer_range()
        .ok_or_else(|| Error::conversion(kind, number.as_str(), "not an integer kind"))?;

    let value = number.to_i64().map_err(|_| {
        let reason = if number.is_integer() {
            "value out of range"
        } else {
            "value has a fractional part"
        };
        Error::conversion(kind, number.as_str(), reason)
    })?;

    if value < min || value > max {
        return Err(Error::conversion(
            kind,
            number.as_str(),
            format!("value out of range [{}, {}]", min, max),
        ));
    }

    Ok(match kind {
        ValueKind::TinyInt => NativeValue::TinyInt(value as i8),
        ValueKind::SmallInt => NativeValue::SmallInt(value as i16),
        ValueKind::Int => NativeValue::Int(value as i32),
        _ => NativeValue::BigInt(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ValueEncoder;
    use chrono::FixedOffset;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn number_wire(text: &str) -> WireValue {
        WireValue::new(RemoteType::NUMBER, Number::parse(text).unwrap().to_bytes().unwrap())
    }

    #[test]
    fn test_decode_natural_kind() {
        let decoder = ValueDecoder::default();
        assert_eq!(decoder.decode(&number_wire("-1"), None).unwrap(), NativeValue::BigInt(-1));
        assert_eq!(
            decoder.decode(&number_wire("12.5"), None).unwrap(),
            NativeValue::Decimal(Number::parse("12.5").unwrap())
        );
        // Larger than i64::MAX stays decimal
        assert!(matches!(
            decoder.decode(&number_wire("99999999999999999999"), None).unwrap(),
            NativeValue::Decimal(_)
        ));
    }

    #[test]
    fn test_decode_null_regardless_of_kind() {
        let decoder = ValueDecoder::default();
        let null = WireValue::null(RemoteType::NUMBER);
        for kind in ValueKind::ALL {
            assert_eq!(
                decoder.decode_as(&null, kind, None).unwrap(),
                NativeValue::Null(RemoteType::NUMBER)
            );
        }
    }

    #[test]
    fn test_decode_as_narrow_kinds() {
        let decoder = ValueDecoder::default();
        assert_eq!(
            decoder.decode_as(&number_wire("-128"), ValueKind::TinyInt, None).unwrap(),
            NativeValue::TinyInt(-128)
        );
        assert_eq!(
            decoder.decode_as(&number_wire("32767"), ValueKind::SmallInt, None).unwrap(),
            NativeValue::SmallInt(32767)
        );
        assert_eq!(
            decoder.decode_as(&number_wire("7"), ValueKind::Decimal, None).unwrap(),
            NativeValue::Decimal(Number::from(7i32))
        );
    }

    #[test]
    fn test_decode_as_too_narrow_fails() {
        let decoder = ValueDecoder::default();
        let err = decoder
            .decode_as(&number_wire("200"), ValueKind::TinyInt, None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ConversionFailure { expected: ValueKind::TinyInt, .. }
        ));
        assert!(decoder
            .decode_as(&number_wire("2147483648"), ValueKind::Int, None)
            .is_err());
        assert!(decoder
            .decode_as(&number_wire("1.5"), ValueKind::BigInt, None)
            .is_err());
    }

    #[test]
    fn test_decode_as_incompatible_family() {
        let decoder = ValueDecoder::default();
        assert!(decoder.decode_as(&number_wire("1"), ValueKind::Time, None).is_err());
        let time = ValueEncoder::default()
            .encode(&NativeValue::Time(hms(1, 2, 3)), RemoteType::TIME, None)
            .unwrap();
        assert!(decoder.decode_as(&time, ValueKind::Int, None).is_err());
    }

    #[test]
    fn test_malformed_payload() {
        let decoder = ValueDecoder::default();
        let wire = WireValue::new(RemoteType::TIME, vec![1u8, 2]);
        assert!(matches!(
            decoder.decode(&wire, None),
            Err(Error::ConversionFailure { expected: ValueKind::Time, .. })
        ));
    }

    #[test]
    fn test_calendar_roundtrip_utc_normalized() {
        let encoder = ValueEncoder::default();
        let decoder = ValueDecoder::default();
        let bind_cal = CalendarContext::zone(FixedOffset::west_opt(8 * 3600).unwrap());
        let fetch_cal = CalendarContext::zone(FixedOffset::east_opt(9 * 3600).unwrap());
        let t = hms(23, 15, 0);

        let wire = encoder
            .encode(&NativeValue::Time(t), RemoteType::TIME, Some(&bind_cal))
            .unwrap();
        assert_eq!(decoder.decode(&wire, Some(&fetch_cal)).unwrap(), NativeValue::Time(t));
    }

    #[test]
    fn test_calendar_roundtrip_honor_calendar() {
        let config = CodecConfig::new().time_zone_handling(TimeZoneHandling::HonorCalendar);
        let encoder = ValueEncoder::new(config);
        let decoder = ValueDecoder::new(config);
        let cal = CalendarContext::zone(FixedOffset::east_opt(5 * 3600 + 45 * 60).unwrap());
        let t = hms(0, 30, 0);

        let wire = encoder.encode(&NativeValue::Time(t), RemoteType::TIME, Some(&cal)).unwrap();
        // Stored as UTC, wrapping into the previous day
        assert_eq!(decode_time(wire.payload().unwrap()).unwrap(), hms(18, 45, 0));
        assert_eq!(decoder.decode(&wire, Some(&cal)).unwrap(), NativeValue::Time(t));
        assert_eq!(decoder.decode(&wire, None).unwrap(), NativeValue::Time(hms(18, 45, 0)));
    }
}
