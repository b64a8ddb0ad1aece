//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// infoboard - calendar events and messages on a wall display
#[derive(Debug, Parser)]
#[command(name = "infoboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "INFOBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the board in the foreground (default)
    Run,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Message of the day commands
    Motd {
        #[command(subcommand)]
        action: MotdAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration with plain-text secrets redacted
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// MOTD actions.
#[derive(Debug, Subcommand)]
pub enum MotdAction {
    /// Push a message to a running board
    Send {
        /// The message text
        message: String,

        /// Seconds to show the message; 0 keeps it until replaced
        #[arg(long, default_value = "0")]
        hold: u64,

        /// Board address (defaults to the configured listen address)
        #[arg(long)]
        addr: Option<SocketAddr>,

        /// Shared secret (defaults to the configured one)
        #[arg(long, env = "INFOBOARD_MOTD_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Connection timeout in seconds
        #[arg(long, default_value = "5")]
        timeout: u64,
    },
}
