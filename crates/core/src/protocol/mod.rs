//! Control-protocol implementation: a simplified RTSP-like text dialect.
//!
//! ## Message format
//!
//! ```text
//! SETUP movie.bin RTSP/1.0\r\n
//! CSeq: 2\r\n
//! Transport: RTP/UDP;client_port=6000\r\n
//! \r\n
//! ```
//!
//! Requests (client to server) are `\r\n`-terminated; replies (server to
//! client) use bare `\n` (see [`response`]).
//!
//! ## Supported methods
//!
//! | Method | Purpose |
//! |--------|---------|
//! | OPTIONS | Capability discovery (ambient courtesy) |
//! | SETUP | Open the Video Source, negotiate transport |
//! | PLAY | Start media delivery |
//! | PAUSE | Suspend media delivery |
//! | TEARDOWN | Destroy session |
//! | REPORT | Log client-reported status |
//! | GET_PARAMETER | Keepalive (ambient courtesy) |

pub mod handler;
pub mod request;
pub mod response;

pub use handler::MethodHandler;
pub use request::RtspRequest;
pub use response::RtspResponse;
