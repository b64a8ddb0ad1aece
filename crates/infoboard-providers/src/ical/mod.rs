//! iCalendar feed backend.
//!
//! - [`parser`] turns the text into a [`Node`] tree
//! - [`events_from_ics`] validates the tree and extracts events
//! - [`FeedBackend`] fetches a URL on its own cooldown

mod backend;
mod config;
mod feed;
pub mod parser;

pub use backend::FeedBackend;
pub use config::{FeedConfig, FeedSchema};
pub use feed::events_from_ics;
pub use parser::{Node, ParseError, parse};
