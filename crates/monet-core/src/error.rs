//! Error types for the microMONET controller.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. The variants keep three failure classes
//! apart so callers can tell "fix your input" from "the link is down" from
//! "the mount said something unexpected".

/// The error type for all microMONET operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open, write, or read failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response line did not match the grammar of the command that
    /// elicited it. Carries the raw (stripped) response text.
    #[error("unexpected {expected} response: {response:?}")]
    Parse {
        /// Short name of the response shape that was expected.
        expected: &'static str,
        /// The raw response line as received.
        response: String,
    },

    /// Timed out waiting for a complete response line.
    ///
    /// This typically indicates the mount is powered off, still booting,
    /// or the baud rate is wrong.
    #[error("timeout waiting for response")]
    Timeout,

    /// A caller-supplied argument failed validation. No I/O was attempted.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The transport has no open connection.
    #[error("not connected")]
    NotConnected,

    /// The connection to the mount was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// The client was closed; no further operations are possible.
    #[error("client is closed")]
    Closed,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::Parse`] from the expected shape and the raw response.
    pub fn parse(expected: &'static str, response: impl Into<String>) -> Self {
        Error::Parse {
            expected,
            response: response.into(),
        }
    }

    /// Whether this error originated below the protocol layer.
    ///
    /// Timeouts are excluded: they say nothing about the health of the link.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::NotConnected | Error::ConnectionLost | Error::Io(_)
        )
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
