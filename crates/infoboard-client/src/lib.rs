//! The `infoboard` binary: CLI, config file, text renderer, MOTD sender.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod secret;

pub use cli::Cli;
pub use config::BoardConfig;
pub use error::{ClientError, ClientResult};
pub use render::{StatusLine, TextRenderer};
