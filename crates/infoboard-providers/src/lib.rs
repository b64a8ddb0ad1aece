//! Event sources: the polling contract and its backends.
//!
//! - [`EventSource`] - what the aggregator polls; owns its [`Cooldown`]
//! - [`Transport`] - injected payload fetcher ([`HttpTransport`] in production)
//! - [`ical`] - hand-rolled iCalendar parser and the [`FeedBackend`]
//! - [`google`] - JSON REST API decoder and the [`CalendarApiBackend`]
//! - [`ProviderError`] - everything that can go wrong during an update
//!
//! ```text
//!   ┌──────────────┐        ┌─────────────────────┐
//!   │ FeedBackend  │        │ CalendarApiBackend  │
//!   └──────┬───────┘        └──────────┬──────────┘
//!          │ Transport::fetch          │
//!          ▼                           ▼
//!   ical::parse + decode        events_from_json
//!          │                           │
//!          └──────── Vec<Event> ───────┘
//! ```

pub mod error;
pub mod google;
pub mod ical;
pub mod source;
pub mod transport;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use google::{CalendarApiBackend, CalendarApiConfig};
pub use ical::{FeedBackend, FeedConfig, FeedSchema};
pub use source::{BoxFuture, Cooldown, CooldownState, EventSource};
pub use transport::Transport;
#[cfg(feature = "http")]
pub use transport::{HttpTransport, HttpTransportConfig};
