//! Event source backed by a static iCalendar feed.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, instrument};

use infoboard_core::Event;

use super::config::FeedConfig;
use super::feed::events_from_ics;
use crate::error::ProviderResult;
use crate::source::{BoxFuture, Cooldown, CooldownState, EventSource};
use crate::transport::Transport;

/// Polls one iCalendar URL.
pub struct FeedBackend {
    config: FeedConfig,
    transport: Arc<dyn Transport>,
    cooldown: Cooldown,
}

impl FeedBackend {
    pub fn new(config: FeedConfig, transport: Arc<dyn Transport>) -> Self {
        let cooldown = Cooldown::new(config.cooldown, config.error_cooldown);
        Self {
            config,
            transport,
            cooldown,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    #[instrument(skip(self), fields(source = %self.config.name))]
    async fn fetch(&mut self) -> ProviderResult<Vec<Event>> {
        let result = self.transport.fetch(self.config.url.as_str()).await;
        self.cooldown.record_attempt();

        let now = Local::now().naive_local();
        let events = result
            .and_then(|body| events_from_ics(&body, &self.config.schema, now))
            .map_err(|e| e.with_provider(&self.config.name))?;

        self.cooldown.record_success();
        debug!(count = events.len(), "feed updated");
        Ok(events)
    }
}

impl EventSource for FeedBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn ready(&self) -> bool {
        self.cooldown.ready()
    }

    fn update(&mut self) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        Box::pin(self.fetch())
    }

    fn lower_cooldown(&mut self) {
        self.cooldown.lower();
    }

    fn state(&self) -> CooldownState {
        self.cooldown.state()
    }
}
