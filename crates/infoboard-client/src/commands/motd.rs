//! MOTD sender.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use infoboard_protocol::{DEFAULT_PORT, MotdRequest, Reply, decode_line, encode_line};

use crate::config::BoardConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Longest reply line read back; replies are two bytes.
const MAX_REPLY: u64 = 16;

/// Pushes requests to one board.
#[derive(Debug, Clone)]
pub struct MotdSender {
    addr: SocketAddr,
    timeout: Duration,
}

impl MotdSender {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends one request and returns the board's reply.
    pub async fn send(&self, request: &MotdRequest) -> ClientResult<Reply> {
        request.validate()?;
        let line = encode_line(&request.to_line())?;

        debug!(addr = %self.addr, len = request.payload.len(), "sending motd");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| {
                ClientError::Connection(format!(
                    "connection to {} timed out after {}s",
                    self.addr,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ClientError::Connection(format!("failed to connect to {}: {e}", self.addr)))?;

        tokio::time::timeout(self.timeout, self.exchange(&mut stream, &line))
            .await
            .map_err(|_| ClientError::Connection(format!("no reply from {}", self.addr)))?
    }

    async fn exchange(&self, stream: &mut TcpStream, line: &[u8]) -> ClientResult<Reply> {
        stream.write_all(line).await?;

        let mut buf = Vec::new();
        let mut reader = BufReader::new(stream).take(MAX_REPLY);
        reader.read_until(b'\n', &mut buf).await?;
        if buf.is_empty() {
            return Err(ClientError::Connection(format!(
                "{} closed the connection without replying",
                self.addr
            )));
        }

        Ok(Reply::parse(decode_line(&buf)?)?)
    }
}

/// `infoboard motd send`.
pub async fn send(
    config: &BoardConfig,
    message: String,
    hold: u64,
    addr: Option<SocketAddr>,
    secret: Option<String>,
    timeout: u64,
) -> ClientResult<()> {
    let secret = match (secret, &config.motd) {
        (Some(secret), _) => secret::resolve(&secret)?,
        (None, Some(motd)) => motd.resolve_secret()?,
        (None, None) => {
            return Err(ClientError::config(
                "no MOTD secret: pass --secret or add a [motd] section",
            ));
        }
    };

    let addr = addr
        .or_else(|| config.motd.as_ref().map(|m| m.connect_addr()))
        .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)));

    let sender = MotdSender::new(addr, Duration::from_secs(timeout));
    let request = MotdRequest::new(secret, Duration::from_secs(hold), message);

    match sender.send(&request).await? {
        Reply::Accepted => {
            println!("Message accepted by {addr}.");
            Ok(())
        }
        Reply::Rejected => Err(ClientError::Rejected(addr.to_string())),
    }
}
