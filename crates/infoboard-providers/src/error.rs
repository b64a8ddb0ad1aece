//! Error types for event source operations.
//!
//! Every failure a source can hit while fetching or decoding a batch ends up
//! as a [`ProviderError`]. The aggregator only logs these and backs off; it
//! never propagates them further.

use std::fmt;
use thiserror::Error;

use infoboard_core::EventError;

use crate::ical::ParseError;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Connection failure, timeout, DNS resolution, empty body.
    NetworkError,
    /// HTTP 429.
    RateLimited,
    /// Non-2xx status other than 404 and 429.
    ServerError,
    /// HTTP 404.
    NotFound,
    /// Body could not be decoded at all (bad JSON, bad UTF-8).
    InvalidResponse,
    /// The iCalendar text does not have the expected structure.
    MalformedFeed,
    /// A required field is absent.
    MissingField,
    /// A field holds a value we do not accept.
    UnexpectedValue,
    /// An event ends before it starts.
    InvalidEvent,
    /// Missing or invalid configuration.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Returns true if a later attempt may succeed without changes on our side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::NotFound => "not_found",
            Self::InvalidResponse => "invalid_response",
            Self::MalformedFeed => "malformed_feed",
            Self::MissingField => "missing_field",
            Self::UnexpectedValue => "unexpected_value",
            Self::InvalidEvent => "invalid_event",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while updating an event source.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Name of the source that failed.
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn malformed_feed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::MalformedFeed, message)
    }

    /// A required field is absent; `context` names where it was expected.
    pub fn missing_field(field: &str, context: &str) -> Self {
        Self::new(
            ProviderErrorCode::MissingField,
            format!("can't find key {field:?} in {context}"),
        )
    }

    pub fn unexpected_value(field: &str, value: &str) -> Self {
        Self::new(
            ProviderErrorCode::UnexpectedValue,
            format!("key {field:?} has an unsupported value {value:?}"),
        )
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<ParseError> for ProviderError {
    fn from(err: ParseError) -> Self {
        Self::malformed_feed(err.to_string()).with_source(err)
    }
}

impl From<EventError> for ProviderError {
    fn from(err: EventError) -> Self {
        Self::new(ProviderErrorCode::InvalidEvent, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_response(format!("failed to parse the event json: {err}")).with_source(err)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn error_code_retryable() {
        assert!(ProviderErrorCode::NetworkError.is_retryable());
        assert!(ProviderErrorCode::RateLimited.is_retryable());
        assert!(ProviderErrorCode::ServerError.is_retryable());
        assert!(!ProviderErrorCode::MalformedFeed.is_retryable());
        assert!(!ProviderErrorCode::MissingField.is_retryable());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::server("status 503").with_provider("pop");
        let display = format!("{}", err);
        assert!(display.contains("[pop]"));
        assert!(display.contains("server_error"));
        assert!(display.contains("status 503"));
    }

    #[test]
    fn missing_field_message() {
        let err = ProviderError::missing_field("summary", "event");
        assert_eq!(err.code(), ProviderErrorCode::MissingField);
        assert_eq!(err.message(), "can't find key \"summary\" in event");
    }

    #[test]
    fn from_event_error_keeps_source() {
        use std::error::Error;

        let t = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let err: ProviderError = EventError::StartAfterEnd {
            start: t,
            end: t - chrono::Duration::hours(1),
        }
        .into();

        assert_eq!(err.code(), ProviderErrorCode::InvalidEvent);
        assert!(err.source().is_some());
    }

    #[test]
    fn from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ProviderError = json_err.into();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }
}
