//! Wire codecs for remote column types
//!
//! This module provides functions for encoding native values to the wire
//! format and decoding wire payloads back to native values.

mod number;
mod time;

pub use number::{decode_number, encode_number, Number};
pub use time::{decode_time, encode_time, truncate_to_scale, TIME_LENGTH, TIME_LENGTH_NO_FRACTION};
