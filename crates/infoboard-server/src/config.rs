//! MOTD listener configuration.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use infoboard_protocol::DEFAULT_PORT;

/// MOTD listener configuration.
#[derive(Clone)]
pub struct MotdServerConfig {
    /// Address to listen on.
    pub listen: SocketAddr,

    /// Shared secret senders must present. Never logged.
    pub secret: String,

    /// Timeout for reading the request and writing the reply.
    pub connection_timeout: Duration,

    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for MotdServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            secret: String::new(),
            connection_timeout: Duration::from_secs(5),
            max_connections: 16,
        }
    }
}

impl MotdServerConfig {
    /// Creates a configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Builder: set listen address.
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    /// Builder: set connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Builder: set max connections.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }
}

impl fmt::Debug for MotdServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotdServerConfig")
            .field("listen", &self.listen)
            .field("secret", &"<redacted>")
            .field("connection_timeout", &self.connection_timeout)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MotdServerConfig::default();
        assert_eq!(config.listen.port(), 4545);
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn custom_config() {
        let addr: SocketAddr = "127.0.0.1:7000".parse().unwrap();
        let config = MotdServerConfig::new("pw")
            .with_listen(addr)
            .with_connection_timeout(Duration::from_secs(1))
            .with_max_connections(2);

        assert_eq!(config.listen, addr);
        assert_eq!(config.secret, "pw");
        assert_eq!(config.connection_timeout, Duration::from_secs(1));
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn debug_hides_secret() {
        let config = MotdServerConfig::new("hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
