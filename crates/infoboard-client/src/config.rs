//! Board configuration.
//!
//! Everything lives in one `config.toml`, by default at
//! `~/.config/infoboard/config.toml`:
//!
//! ```toml
//! [[sources]]
//! kind = "feed"
//! url = "https://pop.example.fi/calendar/export.ics"
//!
//! [[sources]]
//! kind = "google"
//! calendar_id = "board@example.com"
//! api_key = "env::INFOBOARD_API_KEY"
//!
//! [[highlights]]
//! kind = "source"
//! index = 1
//!
//! [[highlights]]
//! kind = "pattern"
//! pattern = "exam"
//! fields = "name,description"
//!
//! [motd]
//! listen = "0.0.0.0:4545"
//! secret = "pass::infoboard/motd"
//! ```
//!
//! Source order matters: it is the merge order and the index used by
//! source highlight rules.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use infoboard_core::{TracingConfig, TracingOutputFormat, parse_level};
use infoboard_protocol::DEFAULT_PORT;
use infoboard_providers::{
    CalendarApiBackend, CalendarApiConfig, Cooldown, EventSource, FeedBackend, FeedConfig,
    FeedSchema, Transport,
};
use infoboard_server::{DriverConfig, HighlightRule, MotdServerConfig, SearchFields};

use crate::error::{ClientError, ClientResult};
use crate::secret;

const REDACTED: &str = "<redacted>";

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub sources: Vec<SourceSettings>,
    pub highlights: Vec<HighlightSettings>,
    /// The MOTD listener only runs when this section is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<MotdSettings>,
    pub driver: DriverSettings,
    pub logging: LoggingSettings,
}

impl BoardConfig {
    /// Loads `path`, or the default file if `path` is `None`.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::config(format!("failed to parse config: {e}")))
    }

    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("infoboard")
    }

    /// Checks everything that can be checked without network access.
    ///
    /// Secret references are resolved, so `pass` may be invoked.
    pub fn validate(&self) -> ClientResult<()> {
        if self.sources.is_empty() {
            return Err(ClientError::config("no [[sources]] configured"));
        }
        for (index, source) in self.sources.iter().enumerate() {
            source
                .check()
                .map_err(|e| ClientError::config(format!("sources[{index}]: {e}")))?;
        }
        self.highlight_rules()?;
        if let Some(motd) = &self.motd {
            motd.to_server_config()?;
        }
        self.driver.to_driver_config()?;
        self.logging.to_tracing_config(false)?;
        Ok(())
    }

    /// Builds every source in file order.
    pub fn build_sources(
        &self,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Vec<Box<dyn EventSource>>> {
        self.sources
            .iter()
            .map(|s| s.build(transport.clone()))
            .collect()
    }

    pub fn highlight_rules(&self) -> ClientResult<Vec<HighlightRule>> {
        self.highlights
            .iter()
            .map(|h| h.to_rule(self.sources.len()))
            .collect()
    }

    /// A copy with plain-text credentials replaced; references are kept.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for source in &mut config.sources {
            if let SourceSettings::Google(google) = source
                && !secret::is_reference(&google.api_key)
            {
                google.api_key = REDACTED.to_string();
            }
        }
        if let Some(motd) = &mut config.motd
            && !secret::is_reference(&motd.secret)
        {
            motd.secret = REDACTED.to_string();
        }
        config
    }
}

/// One `[[sources]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSettings {
    Google(GoogleSettings),
    Feed(FeedSettings),
}

impl SourceSettings {
    /// Resolves credentials and creates the backend.
    pub fn build(&self, transport: Arc<dyn Transport>) -> ClientResult<Box<dyn EventSource>> {
        Ok(match self {
            Self::Google(google) => {
                Box::new(CalendarApiBackend::new(google.to_provider_config()?, transport))
            }
            Self::Feed(feed) => Box::new(FeedBackend::new(feed.to_provider_config()?, transport)),
        })
    }

    fn check(&self) -> ClientResult<()> {
        match self {
            Self::Google(google) => google.to_provider_config().map(drop),
            Self::Feed(feed) => feed.to_provider_config().map(drop),
        }
    }
}

fn default_cooldown_secs() -> u64 {
    Cooldown::DEFAULT_NORMAL.as_secs()
}

fn default_error_cooldown_secs() -> u64 {
    Cooldown::DEFAULT_ERROR.as_secs()
}

/// Calendar REST API source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub calendar_id: String,
    /// Supports `pass::` and `env::` references.
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_error_cooldown_secs")]
    pub error_cooldown_secs: u64,
}

impl GoogleSettings {
    pub fn to_provider_config(&self) -> ClientResult<CalendarApiConfig> {
        if self.calendar_id.trim().is_empty() {
            return Err(ClientError::config("calendar_id must not be empty"));
        }
        let api_key = secret::resolve(&self.api_key)?;
        if api_key.is_empty() {
            return Err(ClientError::config("api_key must not be empty"));
        }

        let mut config = CalendarApiConfig::new(&self.calendar_id, api_key)
            .with_cooldown(Duration::from_secs(self.cooldown_secs))
            .with_error_cooldown(Duration::from_secs(self.error_cooldown_secs));
        if let Some(name) = &self.name {
            config = config.with_name(name);
        }
        if let Some(base) = &self.api_base {
            config = config
                .with_api_base(base)
                .map_err(|e| ClientError::config(format!("invalid api_base {base:?}: {e}")))?;
        }
        Ok(config)
    }
}

/// iCalendar feed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    /// Expected `PRODID`; defaults to the university calendar service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Timezone key of `DTSTART;TZID=...`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tzid: Option<String>,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_error_cooldown_secs")]
    pub error_cooldown_secs: u64,
}

impl FeedSettings {
    pub fn to_provider_config(&self) -> ClientResult<FeedConfig> {
        let mut schema = FeedSchema::default();
        if let Some(product_id) = &self.product_id {
            schema = schema.with_product_id(product_id);
        }
        if let Some(tzid) = &self.tzid {
            schema = schema.with_tzid(tzid);
        }

        let mut config = FeedConfig::new(&self.url)
            .map_err(|e| ClientError::config(format!("invalid url {:?}: {e}", self.url)))?
            .with_schema(schema)
            .with_cooldown(Duration::from_secs(self.cooldown_secs))
            .with_error_cooldown(Duration::from_secs(self.error_cooldown_secs));
        if let Some(name) = &self.name {
            config = config.with_name(name);
        }
        Ok(config)
    }
}

fn default_fields() -> String {
    "all".to_string()
}

/// One `[[highlights]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HighlightSettings {
    /// Highlight everything from `sources[index]`.
    Source { index: usize },
    /// Highlight events matching `pattern` in `fields`.
    Pattern {
        pattern: String,
        #[serde(default = "default_fields")]
        fields: String,
    },
}

impl HighlightSettings {
    pub fn to_rule(&self, source_count: usize) -> ClientResult<HighlightRule> {
        match self {
            Self::Source { index } if *index >= source_count => Err(ClientError::config(format!(
                "highlight source index {index} out of range ({source_count} sources)"
            ))),
            Self::Source { index } => Ok(HighlightRule::source(*index)),
            Self::Pattern { pattern, fields } => {
                let fields = fields
                    .parse::<SearchFields>()
                    .map_err(|e| ClientError::config(e.to_string()))?;
                HighlightRule::pattern(pattern, fields)
                    .map_err(|e| ClientError::config(e.to_string()))
            }
        }
    }
}

/// `[motd]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotdSettings {
    pub listen: SocketAddr,
    /// Supports `pass::` and `env::` references.
    pub secret: String,
    pub max_connections: usize,
    pub timeout_secs: u64,
}

impl Default for MotdSettings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            secret: String::new(),
            max_connections: 16,
            timeout_secs: 5,
        }
    }
}

impl MotdSettings {
    pub fn resolve_secret(&self) -> ClientResult<String> {
        let secret = secret::resolve(&self.secret)?;
        if secret.is_empty() {
            return Err(ClientError::config("[motd] secret must not be empty"));
        }
        if secret.contains(':') {
            return Err(ClientError::config("[motd] secret must not contain ':'"));
        }
        Ok(secret)
    }

    pub fn to_server_config(&self) -> ClientResult<MotdServerConfig> {
        if self.max_connections == 0 {
            return Err(ClientError::config("[motd] max_connections must be at least 1"));
        }
        Ok(MotdServerConfig::new(self.resolve_secret()?)
            .with_listen(self.listen)
            .with_connection_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_connections(self.max_connections))
    }

    /// Where a local sender should connect.
    pub fn connect_addr(&self) -> SocketAddr {
        let mut addr = self.listen;
        if addr.ip().is_unspecified() {
            addr.set_ip(Ipv4Addr::LOCALHOST.into());
        }
        addr
    }
}

/// `[driver]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub tick_millis: u64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self { tick_millis: 1000 }
    }
}

impl DriverSettings {
    pub fn to_driver_config(&self) -> ClientResult<DriverConfig> {
        if self.tick_millis == 0 {
            return Err(ClientError::config("[driver] tick_millis must be positive"));
        }
        Ok(DriverConfig::default().with_tick(Duration::from_millis(self.tick_millis)))
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: TracingOutputFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: TracingOutputFormat::Compact,
        }
    }
}

impl LoggingSettings {
    /// `debug` (from `--debug`) overrides the level but keeps the format.
    pub fn to_tracing_config(&self, debug: bool) -> ClientResult<TracingConfig> {
        let config = if debug {
            TracingConfig::debug()
        } else {
            TracingConfig::board().with_level(parse_level(&self.level)?)
        };
        Ok(config.with_format(self.format))
    }
}
