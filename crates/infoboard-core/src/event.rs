//! Event types.
//!
//! [`Event`] is the provider-agnostic value every source produces and the
//! aggregator merges. It is cloned between lists, never shared.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::Interval;

/// Errors raised while building or mutating an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The requested span ends before it starts.
    #[error("event start {start} is after its end {end}")]
    StartAfterEnd {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    name: String,
    description: Option<String>,
    location: Option<String>,
    id: Option<String>,
    interval: Interval,
    highlighted: bool,
}

impl Event {
    /// Creates a new event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::StartAfterEnd`] if `start > end`.
    pub fn new(
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, EventError> {
        Ok(Self::with_interval(name, Interval::new(start, end)?))
    }

    /// Creates a new event from an already validated interval.
    pub fn with_interval(name: impl Into<String>, interval: Interval) -> Self {
        Self {
            name: name.into(),
            description: None,
            location: None,
            id: None,
            interval,
            highlighted: false,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the source-provided id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method to set the highlight flag.
    pub fn with_highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn start(&self) -> NaiveDateTime {
        self.interval.start()
    }

    pub fn end(&self) -> NaiveDateTime {
        self.interval.end()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location;
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub fn set_interval(&mut self, interval: Interval) {
        self.interval = interval;
    }

    /// Moves the event to a new span.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::StartAfterEnd`] if `start > end`; the event is
    /// left unchanged in that case.
    pub fn set_times(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> Result<(), EventError> {
        self.interval = Interval::new(start, end)?;
        Ok(())
    }
}
