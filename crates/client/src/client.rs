//! High-level [`MediaClient`]: wires together the control driver,
//! datagram receiver, reassembler, jitter buffer and paced renderer.

use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use mjpegcast::CancelToken;

use crate::control::ControlDriver;
use crate::error::{ClientError, Result};
use crate::jitter::{DEFAULT_CAPACITY, JitterBuffer};
use crate::reassembly::ReassemblyMap;
use crate::sink::FrameSink;
use crate::stats::ClientStats;
use crate::{receiver, renderer};

/// Client-visible configuration, surfaced as CLI flags on the demo binary.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host:port` of the control server.
    pub server_addr: String,
    /// Requested media resource (SETUP target).
    pub media_file: String,
    /// Local UDP port the datagram receiver binds.
    pub client_datagram_port: u16,
    /// Target prebuffer depth in milliseconds.
    pub jitter_ms: u32,
    /// Target frame rate for the renderer (and declared to the server via `FPS`).
    pub fps: u32,
    /// Jitter buffer capacity before oldest-eviction.
    pub jitter_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: String::new(),
            media_file: String::new(),
            client_datagram_port: 0,
            jitter_ms: 200,
            fps: 25,
            jitter_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Client-side mirror of the session state machine (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Init,
    Ready,
    Playing,
}

/// The media client: control-plane driver plus the datagram
/// receive/reassemble/jitter/render pipeline.
pub struct MediaClient {
    config: ClientConfig,
    control: ControlDriver,
    state: RwLock<ClientState>,
    jitter: Arc<JitterBuffer>,
    reassembly: Arc<Mutex<ReassemblyMap>>,
    datagram_socket: Mutex<Option<Arc<UdpSocket>>>,
    receiver_stop: Mutex<Option<CancelToken>>,
    renderer_stop: Mutex<Option<CancelToken>>,
    stats: Arc<ClientStats>,
}

impl MediaClient {
    /// Connect the control stream. The client starts in [`ClientState::Init`].
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let control = ControlDriver::connect(&config.server_addr, &config.media_file)?;
        let threshold = JitterBuffer::threshold_for(config.jitter_ms, config.fps);

        Ok(Self {
            jitter: Arc::new(JitterBuffer::new(config.jitter_capacity, threshold)),
            reassembly: Arc::new(Mutex::new(ReassemblyMap::new())),
            datagram_socket: Mutex::new(None),
            receiver_stop: Mutex::new(None),
            renderer_stop: Mutex::new(None),
            stats: Arc::new(ClientStats::new()),
            control,
            config,
            state: RwLock::new(ClientState::Init),
        })
    }

    pub fn state(&self) -> ClientState {
        *self.state.read()
    }

    pub fn session_id(&self) -> Option<u32> {
        self.control.session_id()
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// SETUP. On a 200 reply, binds the local datagram socket and starts
    /// the receiver thread.
    pub fn setup(&self) -> Result<()> {
        self.control
            .setup(self.config.client_datagram_port, Some(self.config.fps))?;

        let socket = UdpSocket::bind(("0.0.0.0", self.config.client_datagram_port))
            .map_err(|_| ClientError::BindFailed(self.config.client_datagram_port))?;
        socket.set_read_timeout(Some(Duration::from_millis(500)))?;
        let socket = Arc::new(socket);
        *self.datagram_socket.lock() = Some(socket.clone());

        let stop = CancelToken::new();
        *self.receiver_stop.lock() = Some(stop.clone());

        let reassembly = self.reassembly.clone();
        let jitter = self.jitter.clone();
        let stats = self.stats.clone();
        thread::spawn(move || receiver::run(socket, reassembly, jitter, stop, stats));

        *self.state.write() = ClientState::Ready;
        Ok(())
    }

    /// PLAY. On a 200 reply, ensures the renderer thread is running
    /// against `sink`.
    pub fn play(&self, sink: Arc<dyn FrameSink>) -> Result<()> {
        if *self.state.read() != ClientState::Ready {
            return Err(ClientError::InvalidState);
        }

        self.control.play()?;

        let stop = CancelToken::new();
        *self.renderer_stop.lock() = Some(stop.clone());

        let jitter = self.jitter.clone();
        let fps = self.config.fps;
        thread::spawn(move || renderer::run(jitter, sink, fps, stop));

        *self.state.write() = ClientState::Playing;
        Ok(())
    }

    /// PAUSE. Ends the current renderer epoch; the receiver keeps running.
    pub fn pause(&self) -> Result<()> {
        if *self.state.read() != ClientState::Playing {
            return Err(ClientError::InvalidState);
        }

        self.control.pause()?;

        if let Some(stop) = self.renderer_stop.lock().take() {
            stop.cancel();
        }

        *self.state.write() = ClientState::Ready;
        Ok(())
    }

    /// TEARDOWN. Best-effort: local sockets close and state resets to
    /// [`ClientState::Init`] even if the reply never arrives.
    pub fn teardown(&self) {
        if let Err(e) = self.control.teardown() {
            tracing::warn!(error = %e, "TEARDOWN reply not received, tearing down locally anyway");
        }

        if let Some(stop) = self.renderer_stop.lock().take() {
            stop.cancel();
        }
        if let Some(stop) = self.receiver_stop.lock().take() {
            stop.cancel();
        }
        self.datagram_socket.lock().take();

        *self.state.write() = ClientState::Init;
    }
}

impl Drop for MediaClient {
    fn drop(&mut self) {
        if *self.state.read() != ClientState::Init {
            self.teardown();
        }
    }
}
