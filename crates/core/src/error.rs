//! Error types for the session engine and media codec core.

use std::fmt;

/// Errors that can occur in the core crate.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Protocol**: [`Parse`](Self::Parse) — malformed RTSP-dialect messages.
/// - **Transport**: [`Io`](Self::Io) — socket/network failures.
/// - **Media**: [`MalformedPacket`](Self::MalformedPacket) — undersized RTP buffer.
/// - **Server**: [`AlreadyRunning`](Self::AlreadyRunning).
/// - **Source**: [`MissingFile`](Self::MissingFile).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// [`Server::start`](crate::Server::start) was called while already running.
    #[error("server already running")]
    AlreadyRunning,

    /// Failed to parse an RTSP-dialect request message.
    #[error("request parse error: {kind}")]
    Parse { kind: ParseErrorKind },

    /// The media resource named in a SETUP request could not be opened.
    #[error("media resource not found: {0}")]
    MissingFile(String),

    /// A buffer claiming to be an RTP packet was shorter than the 12-byte fixed header.
    #[error("malformed RTP packet: {0} bytes, need at least 12")]
    MalformedPacket(usize),
}

/// Specific kind of request parse failure.
#[derive(Debug)]
pub enum ParseErrorKind {
    /// Input was empty (no request line).
    EmptyRequest,
    /// Request line did not have the expected `Method URI Version` format.
    InvalidRequestLine,
    /// A header line did not contain a colon separator.
    InvalidHeader,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRequest => write!(f, "empty request"),
            Self::InvalidRequestLine => write!(f, "invalid request line"),
            Self::InvalidHeader => write!(f, "invalid header"),
        }
    }
}

/// Convenience alias for `Result<T, CoreError>`.
pub type Result<T> = std::result::Result<T, CoreError>;
