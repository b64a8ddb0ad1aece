//! Board runtime: aggregation, highlighting, the driver loop and the MOTD
//! side channel.
//!
//! - [`EventAggregator`] polls every registered source, merges the batches
//!   and prunes expired events
//! - [`HighlightRule`] marks events by source or by pattern
//! - [`Driver`] ticks the aggregator and feeds a render callback
//! - [`MotdServer`] accepts one-line pushes into a [`MotdMailbox`]
//!
//! # Example
//!
//! ```rust,no_run
//! use infoboard_server::{
//!     Driver, DriverConfig, EventAggregator, MotdMailbox, MotdServer, MotdServerConfig,
//!     SignalHandler,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener()?;
//!
//!     let mailbox = MotdMailbox::new();
//!     let server = MotdServer::bind(MotdServerConfig::new("hunter2"), mailbox.clone()).await?;
//!     let token = signals.token();
//!     tokio::spawn(async move { server.run_until_shutdown(token).await });
//!
//!     let mut driver = Driver::new(DriverConfig::default(), EventAggregator::new(), mailbox);
//!     driver
//!         .run(signals.token(), |frame| println!("{} events", frame.events.len()))
//!         .await;
//!     Ok(())
//! }
//! ```

mod aggregator;
mod config;
mod driver;
mod error;
mod highlight;
mod motd;
mod signals;
mod socket;

pub use aggregator::{EventAggregator, SourceId, SourceStatus, merge_into};
pub use config::MotdServerConfig;
pub use driver::{Driver, DriverConfig, Frame};
pub use error::{ServerError, ServerResult};
pub use highlight::{HighlightRule, SearchFields};
pub use motd::{MotdMailbox, MotdMessage, MotdSnapshot};
pub use signals::SignalHandler;
pub use socket::{Connection, MotdServer};
