//! # mjpegcast-core — session engine and media codec core
//!
//! A two-party streaming system that delivers a pre-encoded MJPEG video
//! from a server to a client over a split control/data transport: a
//! text-based, RTSP-like control channel over TCP, and a packetized,
//! RTP-like media channel over UDP.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Adapters (server CLI, client CLI,        │
//! │            packager CLI)                  │
//! ├──────────────────────────────────────────┤
//! │  Server        — public API, orchestrator │
//! │  Protocol      — control parsing, methods │
//! │  Session       — state machine, emitter   │
//! ├──────────────────────────────────────────┤
//! │  Transport     — TCP signaling            │
//! │  Media         — RTP + fragment codecs    │
//! │  Source        — frame packager/reader    │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use mjpegcast::Server;
//!
//! let mut server = Server::new("0.0.0.0:8554");
//! server.start().unwrap();
//! ```
//!
//! ## Crate layout
//!
//! - [`server`] — High-level [`Server`] orchestrator and [`ServerConfig`].
//! - [`protocol`] — Control-protocol request/reply parsing and method handling.
//! - [`session`] — Session state machine, transport negotiation, emitter.
//! - [`transport`] — TCP listener for control-protocol signaling.
//! - [`media`] — RTP header and fragment sub-header codecs, MJPEG packetizer.
//! - [`source`] — Frame Packager and Video Source.
//! - [`cancel`] — Shared [`cancel::CancelToken`] cancellation primitive.
//! - [`error`] — [`CoreError`] enum and [`Result`] alias.

pub mod cancel;
pub mod error;
pub mod media;
pub mod protocol;
pub mod server;
pub mod session;
pub mod source;
pub mod transport;

pub use cancel::CancelToken;
pub use error::{CoreError, Result};
pub use server::{Server, ServerConfig, Viewer};
