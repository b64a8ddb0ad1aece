//! Fetching raw payloads.
//!
//! Backends never talk HTTP themselves; they get a [`Transport`] at
//! construction time. Production code uses [`HttpTransport`], tests plug in
//! canned responses.

use crate::error::ProviderResult;
use crate::source::BoxFuture;

/// Fetches the body behind a URL.
pub trait Transport: Send + Sync {
    /// Performs one GET request.
    ///
    /// # Errors
    ///
    /// Fails on connection errors, non-2xx status and empty bodies.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<String>>;
}

#[cfg(feature = "http")]
pub use http::{HttpTransport, HttpTransportConfig};

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::{Client, StatusCode};
    use tracing::{trace, warn};

    use super::Transport;
    use crate::error::{ProviderError, ProviderResult};
    use crate::source::BoxFuture;

    /// Settings for [`HttpTransport`].
    #[derive(Debug, Clone)]
    pub struct HttpTransportConfig {
        pub timeout: Duration,
        pub user_agent: String,
    }

    impl HttpTransportConfig {
        pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = user_agent.into();
            self
        }
    }

    impl Default for HttpTransportConfig {
        fn default() -> Self {
            Self {
                timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
                user_agent: format!("infoboard/{}", env!("CARGO_PKG_VERSION")),
            }
        }
    }

    /// reqwest-backed transport.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        pub fn new(config: HttpTransportConfig) -> ProviderResult<Self> {
            let client = Client::builder()
                .timeout(config.timeout)
                .user_agent(&config.user_agent)
                .build()
                .map_err(|e| {
                    ProviderError::network(format!("Failed to create HTTP client: {}", e))
                        .with_source(e)
                })?;

            Ok(Self { client })
        }

        async fn get(&self, url: &str) -> ProviderResult<String> {
            trace!("Sending request");

            let response = self.client.get(url).send().await.map_err(|e| {
                ProviderError::network(format!("Request failed: {}", without_url(&e)))
                    .with_source(e.without_url())
            })?;

            let status = response.status();
            trace!(status = %status, "Received response");

            match status {
                s if s.is_success() => {
                    let body = response.text().await.map_err(|e| {
                        ProviderError::network(format!(
                            "Failed to read response: {}",
                            without_url(&e)
                        ))
                    })?;
                    if body.is_empty() {
                        return Err(ProviderError::network("Empty response body"));
                    }
                    Ok(body)
                }
                StatusCode::NOT_FOUND => Err(ProviderError::not_found("Calendar not found")),
                StatusCode::TOO_MANY_REQUESTS => {
                    Err(ProviderError::rate_limited("Too many requests to server"))
                }
                s => {
                    let body = response.text().await.unwrap_or_default();
                    warn!(status = %s, body_len = body.len(), "Unexpected response status");
                    Err(ProviderError::server(format!("Server returned {}", s)))
                }
            }
        }
    }

    // The query string may carry an API key.
    fn without_url(err: &reqwest::Error) -> String {
        let mut msg = err.to_string();
        if let Some(url) = err.url() {
            msg = msg.replace(url.as_str(), "<url>");
        }
        msg
    }

    impl Transport for HttpTransport {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
            Box::pin(self.get(url))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn config_defaults() {
            let config = HttpTransportConfig::default();
            assert_eq!(config.timeout, Duration::from_secs(30));
            assert!(config.user_agent.starts_with("infoboard/"));
        }

        #[test]
        fn config_builder() {
            let config = HttpTransportConfig::default()
                .with_timeout(Duration::from_secs(5))
                .with_user_agent("board-test");
            assert_eq!(config.timeout, Duration::from_secs(5));
            assert_eq!(config.user_agent, "board-test");
            assert!(HttpTransport::new(config).is_ok());
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::Transport;
    use crate::error::{ProviderError, ProviderResult};
    use crate::source::BoxFuture;

    /// Replays queued responses and records requested URLs.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        responses: Mutex<VecDeque<ProviderResult<String>>>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub(crate) fn with_body(body: impl Into<String>) -> Self {
            let transport = Self::default();
            transport.push(Ok(body.into()));
            transport
        }

        pub(crate) fn push(&self, response: ProviderResult<String>) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub(crate) fn last_url(&self) -> Option<String> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    impl Transport for MockTransport {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
            self.requests.lock().unwrap().push(url.to_string());
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::network("no response queued")));
            Box::pin(async move { response })
        }
    }
}
