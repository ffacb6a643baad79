//! Temporal normalization for time-of-day values
//!
//! A time of day carries no date and no zone. When a bind or fetch supplies a
//! [`CalendarContext`], the wall-clock fields are reinterpreted against a zone
//! to produce an [`InstantOfDay`] (the same moment expressed in UTC), and
//! reversed on the way back. Arithmetic wraps within a single nominal day.

use chrono::{FixedOffset, NaiveTime, Offset, TimeDelta, Utc};

/// Source and target zones attached to a single bind or fetch
///
/// On bind the source zone is the zone the wall-clock value was observed in.
/// On fetch the target zone is the zone the caller wants the value expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarContext {
    /// Zone used when binding
    pub source: FixedOffset,
    /// Zone used when fetching
    pub target: FixedOffset,
}

impl CalendarContext {
    /// Create a context with distinct source and target zones
    pub fn new(source: FixedOffset, target: FixedOffset) -> Self {
        Self { source, target }
    }

    /// Create a context that uses the same zone in both directions
    pub fn zone(zone: FixedOffset) -> Self {
        Self::new(zone, zone)
    }

    /// UTC in both directions
    pub fn utc() -> Self {
        Self::zone(utc())
    }

    /// Build a single-zone context from an offset in seconds east of UTC
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::zone)
    }
}

/// A time of day expressed in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstantOfDay(NaiveTime);

impl InstantOfDay {
    /// Wrap a UTC time of day
    pub fn from_utc(time: NaiveTime) -> Self {
        InstantOfDay(time)
    }

    /// The UTC wall-clock fields
    pub fn utc(&self) -> NaiveTime {
        self.0
    }
}

/// The UTC offset
pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Reinterpret wall-clock `time` as observed in `source`
pub fn to_absolute(time: NaiveTime, source: FixedOffset) -> InstantOfDay {
    let offset = TimeDelta::seconds(source.local_minus_utc() as i64);
    let (utc, _days) = time.overflowing_sub_signed(offset);
    InstantOfDay(utc)
}

/// Express `instant` as wall-clock time in `target`
pub fn from_absolute(instant: InstantOfDay, target: FixedOffset) -> NaiveTime {
    let offset = TimeDelta::seconds(target.local_minus_utc() as i64);
    let (local, _days) = instant.0.overflowing_add_signed(offset);
    local
}
