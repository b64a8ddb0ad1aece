//! Event source backed by the calendar REST API.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use infoboard_core::Event;

use super::config::CalendarApiConfig;
use super::decode::events_from_json;
use crate::error::ProviderResult;
use crate::source::{BoxFuture, Cooldown, CooldownState, EventSource};
use crate::transport::Transport;

/// Polls one calendar through the JSON API.
pub struct CalendarApiBackend {
    config: CalendarApiConfig,
    transport: Arc<dyn Transport>,
    cooldown: Cooldown,
}

impl CalendarApiBackend {
    pub fn new(config: CalendarApiConfig, transport: Arc<dyn Transport>) -> Self {
        let cooldown = Cooldown::new(config.cooldown, config.error_cooldown);
        Self {
            config,
            transport,
            cooldown,
        }
    }

    pub fn config(&self) -> &CalendarApiConfig {
        &self.config
    }

    #[instrument(skip(self), fields(source = %self.config.name))]
    async fn fetch(&mut self) -> ProviderResult<Vec<Event>> {
        let result = match self.config.events_url(Utc::now()) {
            Ok(url) => self.transport.fetch(url.as_str()).await,
            Err(e) => Err(e),
        };
        self.cooldown.record_attempt();

        let events = result
            .and_then(|body| events_from_json(&body))
            .map_err(|e| e.with_provider(&self.config.name))?;

        self.cooldown.record_success();
        debug!(count = events.len(), "calendar updated");
        Ok(events)
    }
}

impl EventSource for CalendarApiBackend {
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
