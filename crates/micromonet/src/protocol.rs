//! Line framing for the microMONET serial protocol.
//!
//! Every command and every response is one line of ASCII text terminated by
//! `\n`. The firmware prints with `Serial.println`, so responses usually end
//! in `\r\n`; surrounding whitespace is stripped before a line is handed to
//! a response parser.
//!
//! # Frame format
//!
//! ```text
//! <text>\n
//! ```
//!
//! There is no framing beyond the terminator: no length prefix, no checksum,
//! no request identifier. Correlation between a command and its response is
//! purely positional.

use bytes::{BufMut, BytesMut};

use monet_core::error::{Error, Result};

/// Line terminator used in both directions.
pub const TERMINATOR: u8 = b'\n';

pub use monet_core::types::READY_PHRASE;

/// Longest run of bytes without a terminator kept before the receive buffer
/// is discarded. Real responses are well under 64 bytes.
pub const MAX_LINE_LEN: usize = 4096;

/// Result of attempting to decode one line from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete line was decoded.
    Line {
        /// Line content with surrounding whitespace stripped.
        text: String,
        /// Number of bytes consumed from the input buffer, terminator included.
        consumed: usize,
    },

    /// The buffer does not yet contain a terminator. More data is needed.
    Incomplete,
}

/// Encode a command into raw bytes ready for transmission.
///
/// Appends exactly one terminator. A command that already contains a line
/// break would be seen by the firmware as two commands, so it is rejected
/// before any I/O happens.
///
/// # Example
///
/// ```
/// use micromonet::protocol::encode_command;
///
/// assert_eq!(encode_command("LED_ON").unwrap(), b"LED_ON\n");
/// assert!(encode_command("LED_ON\nLED_OFF").is_err());
/// ```
pub fn encode_command(command: &str) -> Result<Vec<u8>> {
    if command.contains(['\n', '\r']) {
        return Err(Error::InvalidParameter(format!(
            "command must be a single line: {command:?}"
        )));
    }
    let mut buf = BytesMut::with_capacity(command.len() + 1);
    buf.put_slice(command.as_bytes());
    buf.put_u8(TERMINATOR);
    Ok(buf.to_vec())
}

/// Decode the first complete line from a byte buffer.
///
/// Non-UTF-8 bytes (line noise at the wrong baud rate, typically) are
/// replaced rather than rejected so that the caller's response parser can
/// report the line as unrecognised.
pub fn decode_line(buf: &[u8]) -> DecodeResult {
    match buf.iter().position(|&b| b == TERMINATOR) {
        Some(pos) => DecodeResult::Line {
            text: String::from_utf8_lossy(&buf[..pos]).trim().to_string(),
            consumed: pos + 1,
        },
        None => DecodeResult::Incomplete,
    }
}

/// Whether a received line is the firmware's readiness announcement.
pub fn is_ready_line(line: &str) -> bool {
    line.contains(READY_PHRASE)
}
