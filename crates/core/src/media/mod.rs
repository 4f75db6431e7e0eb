//! Media codec and RTP packetization.
//!
//! Only one codec is supported: MJPEG over a simplified RTP dialect.
//! [`mjpeg::MjpegPacketizer`] composes two lower-level wire-format
//! modules:
//!
//! - [`rtp`] — the generic 12-byte RTP fixed header (RFC 3550 §5.1),
//!   stateless `encode`/`decode` functions.
//! - [`fragment`] — an 8-byte sub-header carried inside the RTP payload
//!   that lets a frame larger than one datagram be split and
//!   reassembled on the receiving end.

pub mod fragment;
pub mod mjpeg;
pub mod rtp;
