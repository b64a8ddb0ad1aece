//! Subcommand implementations.

pub mod config;
pub mod motd;
pub mod run;
