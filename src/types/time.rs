//! TIME encoding and decoding
//!
//! TIME format (7 bytes):
//! - Byte 0: Hour + 1 (1-24)
//! - Byte 1: Minute + 1 (1-60)
//! - Byte 2: Second + 1 (1-60)
//! - Bytes 3-6: Fractional seconds (nanoseconds as big-endian u32)
//!
//! A 3-byte payload carries whole seconds only.

use chrono::{NaiveTime, Timelike};

use crate::constants::{ValueKind, MAX_TIME_SCALE};
use crate::error::{Error, Result};

/// Length of a TIME payload with fractional seconds
pub const TIME_LENGTH: usize = 7;

/// Length of a TIME payload without fractional seconds
pub const TIME_LENGTH_NO_FRACTION: usize = 3;

fn malformed(data: &[u8], reason: impl Into<String>) -> Error {
    Error::conversion(ValueKind::Time, format!("{:02x?}", data), reason)
}

/// Encode a time of day to wire format (7 bytes)
///
/// Leap-second representations (nanosecond >= 1e9) are folded into the
/// last nanosecond of the minute.
pub fn encode_time(time: &NaiveTime) -> [u8; TIME_LENGTH] {
    let nanos = time.nanosecond().min(999_999_999);
    let nano_bytes = nanos.to_be_bytes();

    [
        time.hour() as u8 + 1,
        time.minute() as u8 + 1,
        time.second() as u8 + 1,
        nano_bytes[0],
        nano_bytes[1],
        nano_bytes[2],
        nano_bytes[3],
    ]
}

/// Decode a time of day from wire format (3 or 7 bytes)
pub fn decode_time(data: &[u8]) -> Result<NaiveTime> {
    if data.len() != TIME_LENGTH && data.len() != TIME_LENGTH_NO_FRACTION {
        return Err(malformed(
            data,
            format!("TIME requires 3 or 7 bytes, got {}", data.len()),
        ));
    }

    let nanos = if data.len() == TIME_LENGTH {
        u32::from_be_bytes([data[3], data[4], data[5], data[6]])
    } else {
        0
    };
    if nanos > 999_999_999 {
        return Err(malformed(data, "fractional seconds out of range"));
    }

    let hour = data[0].checked_sub(1);
    let minute = data[1].checked_sub(1);
    let second = data[2].checked_sub(1);

    match (hour, minute, second) {
        (Some(h), Some(m), Some(s)) => {
            NaiveTime::from_hms_nano_opt(h as u32, m as u32, s as u32, nanos)
                .ok_or_else(|| malformed(data, "time fields out of range"))
        }
        _ => Err(malformed(data, "zero byte in time field")),
    }
}

/// Truncate fractional seconds to `scale` digits
pub fn truncate_to_scale(time: NaiveTime, scale: u8) -> NaiveTime {
    let scale = scale.min(MAX_TIME_SCALE) as u32;
    let unit = 10u32.pow(MAX_TIME_SCALE as u32 - scale);
    let nanos = time.nanosecond().min(999_999_999);
    time.with_nanosecond(nanos - nanos % unit).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_encode_time_layout() {
        let t = NaiveTime::from_hms_nano_opt(14, 30, 45, 123_456_789).unwrap();
        let encoded = encode_time(&t);
        assert_eq!(&encoded[..3], &[15, 31, 46]);
        assert_eq!(
            u32::from_be_bytes([encoded[3], encoded[4], encoded[5], encoded[6]]),
            123_456_789
        );
    }

    #[test]
    fn test_time_roundtrip_samples() {
        for t in [hms(0, 0, 0), hms(12, 34, 56), hms(23, 59, 59)] {
            let decoded = decode_time(&encode_time(&t)).unwrap();
            assert_eq!(decoded, t);
        }
    }

    #[test]
    fn test_decode_short_form() {
        assert_eq!(decode_time(&[13, 1, 1]).unwrap(), hms(12, 0, 0));
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(decode_time(&[1, 1]).is_err());
        assert!(decode_time(&[0, 1, 1]).is_err());
        assert!(decode_time(&[25, 1, 1]).is_err());
        assert!(decode_time(&[1, 1, 1, 0xff, 0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn test_truncate_to_scale() {
        let t = NaiveTime::from_hms_nano_opt(1, 2, 3, 123_456_789).unwrap();
        assert_eq!(truncate_to_scale(t, 9), t);
        assert_eq!(truncate_to_scale(t, 3).nanosecond(), 123_000_000);
        assert_eq!(truncate_to_scale(t, 0).nanosecond(), 0);
    }
}
