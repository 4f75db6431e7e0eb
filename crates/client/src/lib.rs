//! # mjpegcast-client — control driver, reassembly, jitter buffer, renderer
//!
//! The client half of the two-party MJPEG streaming system: drives the
//! control-protocol state machine, receives and reassembles fragmented
//! RTP/MJPEG datagrams, smooths arrival jitter in a bounded
//! timestamp-ordered buffer, and paces delivery to a [`FrameSink`] at a
//! target frame rate.
//!
//! ## Pipeline
//!
//! ```text
//! ControlDriver ──SETUP/PLAY/PAUSE/TEARDOWN──▶ Session Engine
//!      │
//!      ▼ (200 OK)
//! datagram receiver ──▶ ReassemblyMap ──▶ JitterBuffer ──▶ renderer ──▶ FrameSink
//! ```
//!
//! Reuses [`mjpegcast`]'s RTP/fragment wire codecs and [`CancelToken`]
//! cancellation primitive rather than duplicating them.

pub mod client;
pub mod control;
pub mod error;
pub mod jitter;
pub mod reassembly;
pub mod receiver;
pub mod renderer;
pub mod sink;
pub mod stats;

pub use client::{ClientConfig, ClientState, MediaClient};
pub use error::{ClientError, Result};
pub use sink::{FileFrameSink, FrameSink};
