//! Run command: the board in the foreground.
//!
//! Wires the components together:
//! - sources and highlight rules from config into an aggregator
//! - signal handler (SIGTERM/SIGINT) for shutdown
//! - the MOTD listener, if configured
//! - the driver loop rendering to stdout

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{info, warn};

use infoboard_providers::{HttpTransport, HttpTransportConfig, Transport};
use infoboard_server::{Driver, EventAggregator, MotdMailbox, MotdServer, SignalHandler};

use crate::config::BoardConfig;
use crate::error::{ClientError, ClientResult};
use crate::render::TextRenderer;

/// Builds the aggregator described by `config`.
pub fn build_aggregator(
    config: &BoardConfig,
    transport: Arc<dyn Transport>,
) -> ClientResult<EventAggregator> {
    let mut aggregator = EventAggregator::new();
    for source in config.build_sources(transport)? {
        aggregator.add_source(source);
    }
    if aggregator.source_count() == 0 {
        return Err(ClientError::config(format!(
            "no [[sources]] configured in {}",
            BoardConfig::default_path().display()
        )));
    }
    for rule in config.highlight_rules()? {
        aggregator.add_rule(rule);
    }
    Ok(aggregator)
}

/// Runs until SIGINT/SIGTERM.
pub async fn run(config: &BoardConfig) -> ClientResult<()> {
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new(HttpTransportConfig::default())?);
    let aggregator = build_aggregator(config, transport)?;
    let driver_config = config.driver.to_driver_config()?;

    let signals = SignalHandler::new();
    signals.spawn_listener()?;

    let mailbox = MotdMailbox::new();
    let motd_task = match &config.motd {
        Some(settings) => {
            let server = MotdServer::bind(settings.to_server_config()?, mailbox.clone()).await?;
            let token = signals.token();
            Some(tokio::spawn(async move { server.run_until_shutdown(token).await }))
        }
        None => None,
    };

    let mut renderer = TextRenderer::new(io::stdout());
    let mut driver = Driver::new(driver_config, aggregator, mailbox);
    driver
        .run(signals.token(), |frame| {
            if let Err(e) = renderer.render(frame, Local::now().naive_local()) {
                warn!(error = %e, "Failed to draw frame");
            }
        })
        .await;

    info!("Shutting down...");
    if let Some(task) = motd_task {
        match tokio::time::timeout(Duration::from_secs(5), task).await {
            Ok(Ok(Err(e))) => warn!(error = %e, "MOTD server failed"),
            Ok(Err(e)) => warn!(error = %e, "MOTD server task panicked"),
            Err(_) => warn!("MOTD server did not stop in time"),
            Ok(Ok(Ok(()))) => {}
        }
    }

    Ok(())
}
