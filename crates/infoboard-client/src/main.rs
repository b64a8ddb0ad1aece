//! infoboard CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use infoboard_client::cli::{Cli, Command, ConfigAction, MotdAction};
use infoboard_client::commands;
use infoboard_client::config::BoardConfig;
use infoboard_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.as_deref();
    let config = BoardConfig::load(config_path)?;

    infoboard_core::init_tracing(config.logging.to_tracing_config(cli.debug)?)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run::run(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(config_path),
        },
        Command::Motd {
            action:
                MotdAction::Send {
                    message,
                    hold,
                    addr,
                    secret,
                    timeout,
                },
        } => commands::motd::send(&config, message, hold, addr, secret, timeout).await,
    }
}
