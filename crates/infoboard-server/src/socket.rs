//! TCP listener for the MOTD line protocol.
//!
//! Every connection carries exactly one request line and gets exactly one
//! reply line before it is closed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use infoboard_protocol::{MAX_LINE_LENGTH, MotdRequest, ProtocolError, Reply, decode_line};

use crate::config::MotdServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::motd::MotdMailbox;

/// Accepts MOTD pushes and stores them in a [`MotdMailbox`].
pub struct MotdServer {
    config: MotdServerConfig,
    listener: TcpListener,
    connection_semaphore: Arc<Semaphore>,
    mailbox: MotdMailbox,
}

impl MotdServer {
    /// Binds the listener.
    ///
    /// Fails if the secret is empty or the address is unavailable.
    pub async fn bind(config: MotdServerConfig, mailbox: MotdMailbox) -> ServerResult<Self> {
        if config.secret.is_empty() {
            return Err(ServerError::config("motd secret must not be empty"));
        }
        if config.secret.contains(':') {
            return Err(ServerError::config("motd secret must not contain ':'"));
        }

        let listener = TcpListener::bind(config.listen)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.listen,
                source,
            })?;
        info!(addr = %listener.local_addr()?, "MOTD server listening");

        let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            config,
            listener,
            connection_semaphore,
            mailbox,
        })
    }

    /// The bound address; differs from the configured one for port 0.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn mailbox(&self) -> &MotdMailbox {
        &self.mailbox
    }

    /// Accepts a single connection once a connection slot is free.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = self
            .connection_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ServerError::config("connection limit closed"))?;

        let (stream, peer) = self.listener.accept().await?;
        debug!(%peer, "Accepted connection");

        Ok(Connection {
            stream,
            peer,
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Runs the accept loop forever, one task per connection.
    pub async fn run(&self) -> ServerResult<()> {
        let secret: Arc<str> = Arc::from(self.config.secret.as_str());
        loop {
            match self.accept().await {
                Ok(connection) => {
                    tokio::spawn(handle_connection(
                        connection,
                        secret.clone(),
                        self.mailbox.clone(),
                    ));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Runs the accept loop until `shutdown` is cancelled.
    pub async fn run_until_shutdown(&self, shutdown: CancellationToken) -> ServerResult<()> {
        tokio::select! {
            result = self.run() => result,
            _ = shutdown.cancelled() => {
                info!("MOTD server stopping");
                Ok(())
            }
        }
    }
}

/// One sender connection.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
}

impl Connection {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads the request line.
    ///
    /// Returns `Ok(None)` if the peer closed without sending anything.
    pub async fn read_request(&mut self) -> ServerResult<Option<MotdRequest>> {
        let mut buf = Vec::with_capacity(256);
        let limit = MAX_LINE_LENGTH as u64 + 1;
        let mut reader = BufReader::new(&mut self.stream).take(limit);

        match tokio::time::timeout(self.timeout, reader.read_until(b'\n', &mut buf)).await {
            Ok(Ok(0)) => return Ok(None),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(ServerError::Protocol(ProtocolError::Timeout {
                    operation: "read request".to_string(),
                }));
            }
        }

        let line = decode_line(&buf)?;
        Ok(Some(MotdRequest::parse(line)?))
    }

    /// Writes the reply line.
    pub async fn reply(&mut self, reply: Reply) -> ServerResult<()> {
        match tokio::time::timeout(self.timeout, self.stream.write_all(reply.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(ServerError::Protocol(ProtocolError::Timeout {
                    operation: "write reply".to_string(),
                }));
            }
        }
        self.stream.shutdown().await?;
        Ok(())
    }
}

async fn handle_connection(mut connection: Connection, secret: Arc<str>, mailbox: MotdMailbox) {
    let peer = connection.peer();

    let reply = match connection.read_request().await {
        Ok(None) => {
            debug!(%peer, "Connection closed without request");
            return;
        }
        Ok(Some(request)) if request.secret == *secret => {
            info!(%peer, len = request.payload.len(), "Accepted MOTD");
            mailbox.store(request.payload, request.hold).await;
            Reply::Accepted
        }
        Ok(Some(_)) => {
            warn!(%peer, "MOTD rejected: wrong secret");
            Reply::Rejected
        }
        Err(ServerError::Io(e)) => {
            debug!(%peer, error = %e, "Connection failed");
            return;
        }
        Err(e) => {
            warn!(%peer, error = %e, "MOTD rejected");
            Reply::Rejected
        }
    };

    if let Err(e) = connection.reply(reply).await {
        debug!(%peer, error = %e, "Failed to send reply");
    }
}
