//! Newline framing.
//!
//! One request per connection, terminated by `\n` (an optional `\r` before
//! it is tolerated). A sender that half-closes without a newline still has
//! its bytes accepted as the line.

use crate::MAX_LINE_LENGTH;
use crate::error::{ProtocolError, ProtocolResult};

/// Frames a line for transmission, appending the terminating newline.
pub fn encode_line(line: &str) -> ProtocolResult<Vec<u8>> {
    if let Some(found) = line.chars().find(|c| *c == '\n' || *c == '\r') {
        return Err(ProtocolError::ForbiddenCharacter {
            field: "line",
            found,
        });
    }

    let size = line.len() + 1;
    if size > MAX_LINE_LENGTH {
        return Err(ProtocolError::LineTooLong {
            size,
            max: MAX_LINE_LENGTH,
        });
    }

    let mut buffer = Vec::with_capacity(size);
    buffer.extend_from_slice(line.as_bytes());
    buffer.push(b'\n');
    Ok(buffer)
}

/// Decodes raw bytes read from the wire into a line without terminator.
pub fn decode_line(data: &[u8]) -> ProtocolResult<&str> {
    if data.len() > MAX_LINE_LENGTH {
        return Err(ProtocolError::LineTooLong {
            size: data.len(),
            max: MAX_LINE_LENGTH,
        });
    }

    let data = data.strip_suffix(b"\n").unwrap_or(data);
    let data = data.strip_suffix(b"\r").unwrap_or(data);
    Ok(std::str::from_utf8(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_newline() {
        assert_eq!(encode_line("+").unwrap(), b"+\n");
    }

    #[test]
    fn encode_rejects_embedded_newline() {
        assert!(matches!(
            encode_line("a\nb"),
            Err(ProtocolError::ForbiddenCharacter { found: '\n', .. })
        ));
    }

    #[test]
    fn decode_strips_terminators() {
        assert_eq!(decode_line(b"pw:0:hi\n").unwrap(), "pw:0:hi");
        assert_eq!(decode_line(b"pw:0:hi\r\n").unwrap(), "pw:0:hi");
        // half-closed sender
        assert_eq!(decode_line(b"pw:0:hi").unwrap(), "pw:0:hi");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert!(matches!(
            decode_line(&[0xff, 0xfe, b'\n']),
            Err(ProtocolError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn line_length_limit() {
        let long = "x".repeat(MAX_LINE_LENGTH);
        assert!(matches!(
            encode_line(&long),
            Err(ProtocolError::LineTooLong { .. })
        ));

        let data = vec![b'x'; MAX_LINE_LENGTH + 1];
        assert!(matches!(
            decode_line(&data),
            Err(ProtocolError::LineTooLong { .. })
        ));
    }
}
