//! Codec configuration
//!
//! Controls how calendar-qualified TIME values are normalized and the
//! default fractional-second scale of TIME binds.

use std::fmt;
use std::str::FromStr;

use crate::constants::{RemoteType, MAX_TIME_SCALE};
use crate::error::{Error, Result};

/// Environment variable selecting [`TimeZoneHandling`]
pub const ENV_TIME_ZONE_HANDLING: &str = "FLAKEBIND_TIME_ZONE_HANDLING";

/// Environment variable selecting the default TIME scale
pub const ENV_TIME_SCALE: &str = "FLAKEBIND_TIME_SCALE";

/// How a [`CalendarContext`](crate::temporal::CalendarContext) is applied to TIME values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneHandling {
    /// Normalize through UTC on bind and on fetch, ignoring the context's zones.
    ///
    /// A value bound with any calendar reads back unchanged with any calendar.
    /// This is the behavior existing callers depend on.
    #[default]
    UtcNormalized,
    /// Normalize through the context's source zone on bind and its target
    /// zone on fetch
    HonorCalendar,
}

impl FromStr for TimeZoneHandling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" | "utc_normalized" => Ok(TimeZoneHandling::UtcNormalized),
            "honor" | "honor_calendar" => Ok(TimeZoneHandling::HonorCalendar),
            other => Err(Error::InvalidConfig(format!(
                "unknown time zone handling '{}' (expected 'utc' or 'honor')",
                other
            ))),
        }
    }
}

impl fmt::Display for TimeZoneHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneHandling::UtcNormalized => f.write_str("utc"),
            TimeZoneHandling::HonorCalendar => f.write_str("honor"),
        }
    }
}

/// Encoder/decoder configuration
///
/// # Examples
///
/// ```rust
/// use flakebind::{CodecConfig, TimeZoneHandling};
///
/// let config = CodecConfig::new()
///     .time_zone_handling(TimeZoneHandling::HonorCalendar)
///     .default_time_scale(3)
///     .expect("scale within 0..=9");
/// assert_eq!(config.default_time_type().scale(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Calendar handling for TIME values
    pub time_zone_handling: TimeZoneHandling,
    /// Fractional-second digits of TIME binds without a type hint
    pub default_time_scale: u8,
}

impl CodecConfig {
    /// Default configuration (UTC-normalized calendars, TIME(9))
    pub fn new() -> Self {
        Self {
            time_zone_handling: TimeZoneHandling::default(),
            default_time_scale: MAX_TIME_SCALE,
        }
    }

    /// Load overrides from the environment
    ///
    /// Unset variables keep their defaults; malformed values are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();
        if let Some(handling) = lookup(ENV_TIME_ZONE_HANDLING) {
            config.time_zone_handling = handling.parse()?;
        }
        if let Some(scale) = lookup(ENV_TIME_SCALE) {
            let scale: u8 = scale.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!(
                    "{} must be an integer, got '{}'",
                    ENV_TIME_SCALE, scale
                ))
            })?;
            config = config.default_time_scale(scale)?;
        }
        Ok(config)
    }

    /// Set calendar handling
    pub fn time_zone_handling(mut self, handling: TimeZoneHandling) -> Self {
        self.time_zone_handling = handling;
        self
    }

    /// Set the default TIME scale (0-9)
    pub fn default_time_scale(mut self, scale: u8) -> Result<Self> {
        if scale > MAX_TIME_SCALE {
            return Err(Error::InvalidConfig(format!(
                "TIME scale must be between 0 and {}, got {}",
                MAX_TIME_SCALE, scale
            )));
        }
        self.default_time_scale = scale;
        Ok(self)
    }

    /// Remote type used for TIME binds without a type hint
    pub fn default_time_type(&self) -> RemoteType {
        RemoteType::Time {
            scale: self.default_time_scale,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}
