//! Time types for calendar events.
//!
//! This module provides [`EventTime`] for representing a start or end value as
//! reported by a feed (either a wall-clock datetime or an all-day date), and
//! [`Interval`] for the validated span an [`Event`](crate::Event) occupies.
//!
//! All values are naive wall-clock times in the feed's own timezone; the
//! sources already encode local time and no conversion is attempted.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::event::EventError;

/// A start or end value as reported by a calendar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific wall-clock datetime.
    DateTime(NaiveDateTime),
    /// An all-day date (no specific time).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Returns `true` if this is an all-day value.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Converts to a datetime; all-day values become the start of that day.
    pub fn to_datetime(&self) -> NaiveDateTime {
        match self {
            Self::DateTime(dt) => *dt,
            Self::AllDay(date) => date.and_time(NaiveTime::MIN),
        }
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for EventTime {
    fn from(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }
}

/// The span of an event.
///
/// Always satisfies `start <= end`; the only way to build one is through
/// [`Interval::new`], which rejects inverted spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawInterval> for Interval {
    type Error = EventError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Creates a new interval.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::StartAfterEnd`] if `start > end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, EventError> {
        if start > end {
            return Err(EventError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates an interval from two source-reported values.
    pub fn from_event_times(start: EventTime, end: EventTime) -> Result<Self, EventError> {
        Self::new(start.to_datetime(), end.to_datetime())
    }

    /// Start of the interval.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// End of the interval.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if the two intervals share any instant.
    ///
    /// Intervals are half-open, so back-to-back spans do not intersect.
    /// Two spans starting at the same instant always intersect, which also
    /// covers zero-length events reported twice.
    pub fn intersects(&self, other: &Interval) -> bool {
        if self.start == other.start {
            return true;
        }
        self.start < other.end && other.start < self.end
    }

    /// Returns the smallest interval covering both.
    pub fn span(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns true if the interval ended strictly before `now`.
    pub fn has_ended(&self, now: NaiveDateTime) -> bool {
        self.end < now
    }

    /// Returns true if `now` lies inside the interval.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        self.start <= now && now < self.end
    }
}
