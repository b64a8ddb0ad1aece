//! Calendar API backend configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::source::Cooldown;

/// Configuration for [`CalendarApiBackend`](super::CalendarApiBackend).
#[derive(Clone)]
pub struct CalendarApiConfig {
    /// Display name used in logs.
    pub name: String,
    pub calendar_id: String,
    /// API key appended to every request. Never logged.
    pub api_key: String,
    /// Base of the REST API, ending in `/`.
    pub api_base: String,
    pub cooldown: Duration,
    pub error_cooldown: Duration,
}

impl CalendarApiConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3/";

    pub fn new(calendar_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        let calendar_id = calendar_id.into();
        Self {
            name: calendar_id.clone(),
            calendar_id,
            api_key: api_key.into(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            cooldown: Cooldown::DEFAULT_NORMAL,
            error_cooldown: Cooldown::DEFAULT_ERROR,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Points the backend at another API base (a mirror or a test server).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_api_base(mut self, api_base: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let mut base = api_base.as_ref().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)?;
        self.api_base = base;
        Ok(self)
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_error_cooldown(mut self, error_cooldown: Duration) -> Self {
        self.error_cooldown = error_cooldown;
        self
    }

    /// Builds the request URL for events starting after `time_min`.
    pub fn events_url(&self, time_min: chrono::DateTime<chrono::Utc>) -> ProviderResult<Url> {
        if self.calendar_id.is_empty() {
            return Err(ProviderError::configuration("calendar id is empty"));
        }

        let path = format!(
            "calendars/{}/events",
            urlencoding::encode(&self.calendar_id)
        );
        let mut url = Url::parse(&self.api_base)
            .and_then(|base| base.join(&path))
            .map_err(|e| {
                ProviderError::configuration(format!("invalid events URL: {e}")).with_source(e)
            })?;

        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .append_pair("orderBy", "startTime")
            .append_pair("singleEvents", "true")
            .append_pair("key", &self.api_key);

        Ok(url)
    }
}

impl fmt::Debug for CalendarApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarApiConfig")
            .field("name", &self.name)
            .field("calendar_id", &self.calendar_id)
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("cooldown", &self.cooldown)
            .field("error_cooldown", &self.error_cooldown)
            .finish()
    }
}
