//! Calendar REST API backend.
//!
//! Each update requests the events starting after the current UTC time:
//!
//! ```text
//! {api_base}calendars/{calendar_id}/events?timeMin=...&orderBy=startTime&singleEvents=true&key=...
//! ```
//!
//! and decodes the `calendar#events` JSON list with [`events_from_json`].

mod backend;
mod config;
mod decode;

pub use backend::CalendarApiBackend;
pub use config::CalendarApiConfig;
pub use decode::events_from_json;
