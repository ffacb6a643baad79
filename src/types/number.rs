//! Exact decimal values and the NUMBER wire format
//!
//! NUMBER is stored in a variable-length format:
//! - First byte: exponent (with sign encoding)
//! - Subsequent bytes: mantissa digits in base-100
//!
//! For positive numbers: exponent byte has high bit set, mantissa bytes are value + 1
//! For negative numbers: exponent byte is inverted, mantissa bytes are 101 - value,
//!                       and a trailing 102 byte is added (if not at max digits)

use std::fmt;
use std::str::FromStr;

use crate::constants::ValueKind;
use crate::error::{Error, Result};

/// Maximum number of significant digits in a NUMBER
const MAX_DIGITS: usize = 40;

/// Maximum characters in a number string representation
const MAX_STRING_CHARS: usize = 172;

/// Maximum mantissa bytes before the negative terminator is omitted
const MAX_MANTISSA_BYTES: usize = 20;

/// Exact decimal value held in canonical string form
///
/// Canonical means no leading or trailing zeros beyond what the value needs,
/// no exponent, and `0` for zero, so two `Number`s are equal exactly when
/// their values are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number {
    value: String,
    is_integer: bool,
}

impl Number {
    /// Parse a decimal string (optionally signed, optionally with an exponent)
    pub fn parse(text: &str) -> Result<Self> {
        let encoded = encode_number(text)?;
        decode_number(&encoded)
    }

    /// Get the canonical string value
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the value has no fractional part
    pub fn is_integer(&self) -> bool {
        self.is_integer
    }

    /// Whether the value is below zero
    pub fn is_negative(&self) -> bool {
        self.value.starts_with('-')
    }

    /// Number of digits after the decimal point
    pub fn scale(&self) -> usize {
        self.value
            .split_once('.')
            .map(|(_, frac)| frac.len())
            .unwrap_or(0)
    }

    /// Number of significant digits before the decimal point
    pub fn integer_digits(&self) -> usize {
        let unsigned = self.value.trim_start_matches('-');
        let int_part = unsigned.split_once('.').map(|(i, _)| i).unwrap_or(unsigned);
        int_part.trim_start_matches('0').len()
    }

    /// Convert to i64 without rounding
    pub fn to_i64(&self) -> Result<i64> {
        if !self.is_integer {
            return Err(Error::conversion(
                ValueKind::BigInt,
                self.value.as_str(),
                "value has a fractional part",
            ));
        }
        self.value.parse().map_err(|_| {
            Error::conversion(ValueKind::BigInt, self.value.as_str(), "value out of range")
        })
    }

    /// Encode to NUMBER wire format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_number(&self.value)
    }
}

impl FromStr for Number {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Number::parse(s)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(v: $t) -> Self {
                    Number {
                        value: v.to_string(),
                        is_integer: true,
                    }
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64);

fn malformed(data: &[u8], reason: impl Into<String>) -> Error {
    Error::conversion(ValueKind::Decimal, format!("{:02x?}", data), reason)
}

fn invalid(text: &str, reason: impl Into<String>) -> Error {
    Error::conversion(ValueKind::Decimal, text, reason)
}

/// Decode a NUMBER from wire format bytes
///
/// - Byte 0: Exponent byte (with sign encoding)
/// - Bytes 1..n: Mantissa digits in base-100 format
pub fn decode_number(data: &[u8]) -> Result<Number> {
    if data.is_empty() {
        return Err(malformed(data, "empty NUMBER payload"));
    }
    if data.len() > MAX_MANTISSA_BYTES + 2 {
        return Err(malformed(data, "NUMBER payload too long"));
    }

    let exponent_byte = data[0];
    let is_positive = (exponent_byte & 0x80) != 0;

    let exponent = if is_positive {
        (exponent_byte as i16) - 193
    } else {
        (!exponent_byte as i16) - 193
    };

    let mut decimal_point_index = (exponent * 2 + 2) as i32;

    // Single byte: zero when positive, the -1e126 sentinel when negative
    if data.len() == 1 {
        if is_positive {
            return Ok(Number::from(0i64));
        }
        return Err(malformed(data, "negative infinity sentinel is not representable"));
    }

    let mantissa_len = if !is_positive && data[data.len() - 1] == 102 {
        data.len() - 2
    } else {
        data.len() - 1
    };

    let mut digits = Vec::with_capacity(MAX_DIGITS);
    for i in 0..mantissa_len {
        let byte = data[i + 1];
        let value = if is_positive {
            byte.wrapping_sub(1)
        } else {
            101u8.wrapping_sub(byte)
        };
        if value > 99 {
            return Err(malformed(data, format!("invalid base-100 digit byte {}", byte)));
        }

        let digit1 = value / 10;
        if digit1 == 0 && digits.is_empty() {
            decimal_point_index -= 1;
        } else {
            digits.push(digit1);
        }

        let digit2 = value % 10;
        if digit2 != 0 || i < mantissa_len - 1 {
            digits.push(digit2);
        }
    }

    // Remove trailing zeros past the decimal point
    while digits.last() == Some(&0) {
        if (digits.len() as i32) <= decimal_point_index {
            break;
        }
        digits.pop();
    }

    let mut result = String::with_capacity(MAX_STRING_CHARS);
    if !is_positive {
        result.push('-');
    }

    let is_integer;
    if decimal_point_index <= 0 {
        result.push_str("0.");
        is_integer = false;
        for _ in decimal_point_index..0 {
            result.push('0');
        }
        for d in &digits {
            result.push(char::from(b'0' + d));
        }
    } else {
        is_integer = decimal_point_index as usize >= digits.len();
        for (i, d) in digits.iter().enumerate() {
            if i > 0 && i as i32 == decimal_point_index {
                result.push('.');
            }
            result.push(char::from(b'0' + d));
        }
        if decimal_point_index as usize > digits.len() {
            for _ in digits.len()..decimal_point_index as usize {
                result.push('0');
            }
        }
    }

    if digits.is_empty() || result == "-" {
        return Ok(Number::from(0i64));
    }

    Ok(Number {
        value: result,
        is_integer,
    })
}

/// Encode a number string to NUMBER wire format
pub fn encode_number(value: &str) -> Result<Vec<u8>> {
    let value = value.trim();

    if value.is_empty() {
        return Err(invalid(value, "empty string is not a number"));
    }
    if value.len() > MAX_STRING_CHARS {
        return Err(invalid(value, "number string too long"));
    }

    let bytes = value.as_bytes();
    let mut pos = 0;

    let is_negative = bytes.first() == Some(&b'-');
    if is_negative || bytes.first() == Some(&b'+') {
        pos += 1;
    }

    // Digits before the decimal point
    let mut digits = Vec::with_capacity(MAX_DIGITS);
    let mut saw_digit = false;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b'.' || b == b'e' || b == b'E' {
            break;
        }
        if !b.is_ascii_digit() {
            return Err(invalid(value, format!("invalid character '{}'", char::from(b))));
        }
        saw_digit = true;
        let digit = b - b'0';
        if digit != 0 || !digits.is_empty() {
            digits.push(digit);
        }
        pos += 1;
    }
    let mut decimal_point_index = digits.len() as i32;

    // Digits after the decimal point
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() {
            let b = bytes[pos];
            if b == b'e' || b == b'E' {
                break;
            }
            if !b.is_ascii_digit() {
                return Err(invalid(value, format!("invalid character '{}'", char::from(b))));
            }
            saw_digit = true;
            let digit = b - b'0';
            if digit == 0 && digits.is_empty() {
                decimal_point_index -= 1;
            } else {
                digits.push(digit);
            }
            pos += 1;
        }
    }

    if !saw_digit {
        return Err(invalid(value, "no digits"));
    }

    // Exponent
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        let exp_negative = match bytes.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };

        let exp_text = &value[pos..];
        if exp_text.is_empty() || !exp_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(value, "invalid exponent"));
        }
        let exp: i32 = exp_text
            .parse()
            .map_err(|_| invalid(value, "invalid exponent"))?;

        decimal_point_index += if exp_negative { -exp } else { exp };
    }

    while digits.last() == Some(&0) {
        digits.pop();
    }

    if digits.is_empty() {
        return Ok(vec![128]);
    }

    if digits.len() > MAX_DIGITS || decimal_point_index > 126 || decimal_point_index < -129 {
        return Err(invalid(value, "number out of range for NUMBER"));
    }

    // An odd decimal point index means the first base-100 digit holds one decimal digit
    let prepend_zero = decimal_point_index.rem_euclid(2) == 1;
    if prepend_zero {
        digits.push(0);
        decimal_point_index += 1;
    }

    if digits.len() % 2 == 1 {
        digits.push(0);
    }

    let num_pairs = digits.len() / 2;
    let mut result = Vec::with_capacity(num_pairs + 2);

    let exponent_on_wire = (decimal_point_index.div_euclid(2) + 192) as i8;
    let exponent_byte = if is_negative {
        !exponent_on_wire as u8
    } else {
        exponent_on_wire as u8
    };
    result.push(exponent_byte);

    let mut digit_pos = 0;
    for pair_num in 0..num_pairs {
        let pair_value = if pair_num == 0 && prepend_zero {
            let v = digits[digit_pos];
            digit_pos += 1;
            v
        } else {
            let v = digits[digit_pos] * 10 + digits[digit_pos + 1];
            digit_pos += 2;
            v
        };

        let encoded = if is_negative {
            101 - pair_value
        } else {
            pair_value + 1
        };
        result.push(encoded);
    }

    if is_negative && num_pairs < MAX_MANTISSA_BYTES {
        result.push(102);
    }

    Ok(result)
}
