//! Core types: events, intervals, name similarity, tracing

pub mod event;
pub mod similarity;
pub mod time;
pub mod tracing;

pub use event::{Event, EventError};
pub use similarity::similar;
pub use time::{EventTime, Interval};
pub use tracing::{init_tracing, parse_level, TracingConfig, TracingError, TracingOutputFormat};
