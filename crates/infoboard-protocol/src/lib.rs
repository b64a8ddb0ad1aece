//! Line protocol for pushing a "message of the day" to the board.
//!
//! A sender opens a TCP connection, writes exactly one line and reads
//! exactly one reply line before the server closes the connection:
//!
//! ```text
//! <secret>:<hold-seconds>:<payload>\n
//! ```
//!
//! The reply is `+\n` when the message was stored and `-\n` otherwise.
//! The payload may itself contain `:`; only the first two separate fields.
//!
//! ```rust
//! use std::time::Duration;
//! use infoboard_protocol::{decode_line, encode_line, MotdRequest};
//!
//! let request = MotdRequest::new("hunter2", Duration::from_secs(30), "Lunch at 12:30");
//! let bytes = encode_line(&request.to_line()).unwrap();
//! let line = decode_line(&bytes).unwrap();
//! assert_eq!(MotdRequest::parse(line).unwrap(), request);
//! ```

mod error;
mod framing;
mod message;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{decode_line, encode_line};
pub use message::{MotdRequest, Reply};

/// Largest payload accepted, in bytes.
pub const MAX_PAYLOAD: usize = 512;

/// Largest request line accepted, in bytes, including the newline.
pub const MAX_LINE_LENGTH: usize = 2048;

/// Default TCP port of the MOTD listener.
pub const DEFAULT_PORT: u16 = 4545;
