//! Feed backend configuration.

use std::time::Duration;
use url::Url;

use crate::source::Cooldown;

/// What a valid feed must look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSchema {
    /// Required root `PRODID`.
    pub product_id: String,
    /// Timezone parameter on `DTSTART`/`DTEND` keys.
    pub tzid: String,
}

impl FeedSchema {
    pub const DEFAULT_PRODUCT_ID: &'static str = "TUT.FI//POP-CALENDARSERVICE_V1.0//FI";
    pub const DEFAULT_TZID: &'static str = "Europe/Helsinki";

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn with_tzid(mut self, tzid: impl Into<String>) -> Self {
        self.tzid = tzid.into();
        self
    }
}

impl Default for FeedSchema {
    fn default() -> Self {
        Self {
            product_id: Self::DEFAULT_PRODUCT_ID.to_string(),
            tzid: Self::DEFAULT_TZID.to_string(),
        }
    }
}

/// Configuration for the feed backend.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Display name used in logs.
    pub name: String,
    pub url: Url,
    pub schema: FeedSchema,
    pub cooldown: Duration,
    pub error_cooldown: Duration,
}

impl FeedConfig {
    /// Creates a feed configuration for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let url = Url::parse(url.as_ref())?;
        Ok(Self {
            name: url.host_str().unwrap_or("feed").to_string(),
            url,
            schema: FeedSchema::default(),
            cooldown: Cooldown::DEFAULT_NORMAL,
            error_cooldown: Cooldown::DEFAULT_ERROR,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_schema(mut self, schema: FeedSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_error_cooldown(mut self, error_cooldown: Duration) -> Self {
        self.error_cooldown = error_cooldown;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = FeedConfig::new("https://pop.example.fi/calendar/export.ics").unwrap();
        assert_eq!(config.name, "pop.example.fi");
        assert_eq!(config.schema.product_id, FeedSchema::DEFAULT_PRODUCT_ID);
        assert_eq!(config.schema.tzid, "Europe/Helsinki");
        assert_eq!(config.cooldown, Duration::from_secs(3600));
        assert_eq!(config.error_cooldown, Duration::from_secs(600));
    }

    #[test]
    fn config_builder() {
        let config = FeedConfig::new("http://localhost/feed.ics")
            .unwrap()
            .with_name("pop")
            .with_schema(FeedSchema::default().with_tzid("UTC"))
            .with_cooldown(Duration::from_secs(60))
            .with_error_cooldown(Duration::from_secs(5));
        assert_eq!(config.name, "pop");
        assert_eq!(config.schema.tzid, "UTC");
        assert_eq!(config.cooldown, Duration::from_secs(60));
        assert_eq!(config.error_cooldown, Duration::from_secs(5));
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(FeedConfig::new("not a url").is_err());
    }
}
