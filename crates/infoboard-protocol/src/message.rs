//! Request and reply types.

use std::fmt;
use std::time::Duration;

use crate::MAX_PAYLOAD;
use crate::error::{ProtocolError, ProtocolResult};

/// A message pushed to the board.
#[derive(Clone, PartialEq, Eq)]
pub struct MotdRequest {
    pub secret: String,
    /// How long to show the message; zero keeps it until replaced.
    pub hold: Duration,
    pub payload: String,
}

// The secret must stay out of logs.
impl fmt::Debug for MotdRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotdRequest")
            .field("secret", &"<redacted>")
            .field("hold", &self.hold)
            .field("payload", &self.payload)
            .finish()
    }
}

impl MotdRequest {
    pub fn new(secret: impl Into<String>, hold: Duration, payload: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            hold,
            payload: payload.into(),
        }
    }

    /// Parses a request line (without its newline).
    pub fn parse(line: &str) -> ProtocolResult<Self> {
        let mut fields = line.splitn(3, ':');
        let secret = fields.next().ok_or(ProtocolError::MissingField("secret"))?;
        let hold = fields.next().ok_or(ProtocolError::MissingField("hold"))?;
        let payload = fields.next().ok_or(ProtocolError::MissingField("payload"))?;

        let hold = hold
            .trim()
            .parse::<u64>()
            .map_err(|_| ProtocolError::InvalidHold(hold.to_string()))?;

        check_payload(payload)?;

        Ok(Self {
            secret: secret.to_string(),
            hold: Duration::from_secs(hold),
            payload: payload.to_string(),
        })
    }

    /// Renders the request as a line (without its newline).
    pub fn to_line(&self) -> String {
        format!("{}:{}:{}", self.secret, self.hold.as_secs(), self.payload)
    }

    /// Checks the request can be sent as-is.
    pub fn validate(&self) -> ProtocolResult<()> {
        if self.secret.contains(':') {
            return Err(ProtocolError::ForbiddenCharacter {
                field: "secret",
                found: ':',
            });
        }
        check_payload(&self.payload)
    }
}

fn check_payload(payload: &str) -> ProtocolResult<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    Ok(())
}

/// Server verdict on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Accepted,
    Rejected,
}

impl Reply {
    /// The wire form, newline included.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Accepted => b"+\n",
            Self::Rejected => b"-\n",
        }
    }

    /// Parses a reply line (without its newline).
    pub fn parse(line: &str) -> ProtocolResult<Self> {
        match line.trim() {
            "+" => Ok(Self::Accepted),
            "-" => Ok(Self::Rejected),
            other => Err(ProtocolError::UnexpectedReply(other.to_string())),
        }
    }
}
