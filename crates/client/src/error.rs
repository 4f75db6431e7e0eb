//! Error types for the media client.

/// Errors surfaced to the caller across the control driver and transport setup.
///
/// Packet-level errors (malformed datagrams, reassembly timeouts) never
/// reach this type — they are local to the receiver and only logged, per
/// the core crate's recovery policy.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Underlying I/O error on the control stream or datagram socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The initial TCP connect to the control server failed.
    #[error("could not connect to control server at {0}")]
    ConnectFailed(String),

    /// The local UDP datagram port could not be bound.
    #[error("unable to bind local datagram port {0}")]
    BindFailed(u16),

    /// A control reply could not be parsed as a valid status line.
    #[error("control reply could not be decoded")]
    DecodeFailed,

    /// A control request received a non-200 reply.
    #[error("control request rejected: status {0}")]
    RequestRejected(u16),

    /// A reply arrived bearing a session id different from the one already latched.
    #[error("control reply session id did not match the latched session")]
    SessionMismatch,

    /// An operation was attempted from a state that does not permit it.
    #[error("invalid client state for this operation")]
    InvalidState,
}

pub type Result<T> = std::result::Result<T, ClientError>;
