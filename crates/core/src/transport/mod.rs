//! Network transport layer for the control protocol.
//!
//! - **TCP** ([`tcp`]): carries control-protocol request/reply signaling.
//!   One TCP connection per client, with a thread per connection.
//!
//! Media datagram delivery is not a shared transport: each playing
//! session's [`emitter`](crate::session::emitter) owns its own ephemeral
//! UDP socket, created fresh on every PLAY per the session engine design.

pub mod tcp;
