//! Configuration commands.

use std::path::Path;

use crate::config::BoardConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the configuration as TOML, plain-text secrets redacted.
pub fn dump(config: &BoardConfig, path: Option<&Path>) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::config(format!("failed to serialize config: {e}")))?;
    println!("# config.toml ({})", display_path(path));
    println!("{toml_str}");
    Ok(())
}

/// Validates the configuration, resolving secret references.
pub fn validate(config: &BoardConfig) -> ClientResult<()> {
    config.validate()?;
    println!(
        "Configuration is valid: {} source(s), {} highlight rule(s){}.",
        config.sources.len(),
        config.highlights.len(),
        if config.motd.is_some() { ", MOTD enabled" } else { "" }
    );
    Ok(())
}

/// Shows the configuration file path.
pub fn path(path: Option<&Path>) -> ClientResult<()> {
    println!("config: {}", display_path(path));
    Ok(())
}

fn display_path(path: Option<&Path>) -> String {
    path.map(Path::to_path_buf)
        .unwrap_or_else(BoardConfig::default_path)
        .display()
        .to_string()
}
