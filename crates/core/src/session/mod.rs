//! Session state machine: one instance per connected client.
//!
//! A session is born in [`SessionState::Init`] when a TCP connection
//! accepts its first SETUP, moves to [`SessionState::Ready`] once its
//! Video Source and transport are established, and to
//! [`SessionState::Playing`] while an emitter thread is delivering
//! media. TEARDOWN (or connection loss) removes it.
//!
//! ```text
//! SETUP (file ok)      INIT  -> READY
//! SETUP (file missing)  INIT  -> INIT   (404, no session created)
//! PLAY                 READY -> PLAYING
//! PAUSE                PLAYING -> READY
//! TEARDOWN              READY|PLAYING -> (removed)
//! ```

pub mod emitter;
pub mod transport;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::cancel::CancelToken;
use crate::media::mjpeg::MjpegPacketizer;
use crate::source::VideoSource;
pub use transport::Transport;

/// Default target frame rate when a SETUP omits the optional `FPS` header,
/// or supplies one that is zero or unparseable.
pub const DEFAULT_FPS: u32 = 25;

/// Session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No Video Source open, no transport negotiated.
    Init,
    /// Video Source open and transport negotiated; not playing.
    Ready,
    /// An emitter thread is delivering media datagrams.
    Playing,
}

/// Running packet/byte counters, supplemented from the original
/// implementation's `packets_sent`/`bytes_sent` fields.
#[derive(Debug, Default)]
pub struct SessionStats {
    pub packets_sent: AtomicU64,
    pub bytes_sent: AtomicU64,
}

impl SessionStats {
    fn record(&self, packet_len: usize) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(packet_len as u64, Ordering::Relaxed);
    }
}

/// A single client session.
pub struct Session {
    /// Random 6-digit session identifier.
    pub id: u32,
    /// Requested media filename from the SETUP request.
    pub media_file: String,
    state: RwLock<SessionState>,
    transport: RwLock<Option<Transport>>,
    fps: RwLock<u32>,
    source: Mutex<Option<VideoSource>>,
    packetizer: Mutex<MjpegPacketizer>,
    frame_id: AtomicU64,
    /// Cancellation token for the currently (or most recently) running
    /// emitter thread. Replaced fresh on every PLAY.
    stop: Mutex<CancelToken>,
    pub stats: SessionStats,
}

impl Session {
    fn new(id: u32, media_file: &str) -> Self {
        Session {
            id,
            media_file: media_file.to_string(),
            state: RwLock::new(SessionState::Init),
            transport: RwLock::new(None),
            fps: RwLock::new(DEFAULT_FPS),
            source: Mutex::new(None),
            packetizer: Mutex::new(MjpegPacketizer::new()),
            frame_id: AtomicU64::new(0),
            stop: Mutex::new(CancelToken::new()),
            stats: SessionStats::default(),
        }
    }

    /// Open the Video Source for this session's media file, resolved
    /// against `media_root`. Fails with [`CoreError::MissingFile`](crate::error::CoreError::MissingFile)
    /// if the file cannot be opened.
    pub fn open_source(&self, media_root: &Path) -> crate::error::Result<()> {
        let path = media_root.join(&self.media_file);
        let source = VideoSource::open(&path)?;
        *self.source.lock() = Some(source);
        Ok(())
    }

    pub fn set_transport(&self, transport: Transport) {
        tracing::debug!(session_id = self.id, client_addr = %transport.client_addr, "transport configured");
        *self.transport.write() = Some(transport);
    }

    pub fn get_transport(&self) -> Option<Transport> {
        self.transport.read().clone()
    }

    pub fn set_fps(&self, fps: u32) {
        let fps = if fps == 0 { DEFAULT_FPS } else { fps };
        *self.fps.write() = fps;
    }

    pub fn fps(&self) -> u32 {
        *self.fps.read()
    }

    pub fn set_state(&self, state: SessionState) {
        tracing::debug!(session_id = self.id, old_state = ?*self.state.read(), new_state = ?state, "state transition");
        *self.state.write() = state;
    }

    pub fn get_state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn is_playing(&self) -> bool {
        *self.state.read() == SessionState::Playing
    }

    /// Replace the stop token with a fresh, uncancelled one and return it,
    /// for a new emitter thread to own. Called at the start of PLAY.
    pub fn fresh_cancel_token(&self) -> CancelToken {
        let token = CancelToken::new();
        *self.stop.lock() = token.clone();
        token
    }

    /// Cancel whichever emitter is currently associated with this session.
    pub fn signal_stop(&self) {
        self.stop.lock().cancel();
    }

    pub fn take_source(&self) -> Option<VideoSource> {
        self.source.lock().take()
    }

    pub fn put_source(&self, source: VideoSource) {
        *self.source.lock() = Some(source);
    }

    /// Read the next frame from the Video Source, if one is open.
    pub fn next_source_frame(&self) -> Option<Vec<u8>> {
        self.source.lock().as_mut()?.next_frame()
    }

    pub fn packetizer(&self) -> &Mutex<MjpegPacketizer> {
        &self.packetizer
    }

    /// Reset rtp_seq and frame_id to zero, as done at the start of every PLAY.
    pub fn reset_counters(&self) {
        self.packetizer.lock().reset();
        self.frame_id.store(0, Ordering::SeqCst);
    }

    /// Advance and return the next frame id, starting at 1.
    pub fn next_frame_id(&self) -> u32 {
        self.frame_id.fetch_add(1, Ordering::SeqCst) as u32 + 1
    }

    pub fn record_sent(&self, packet_len: usize) {
        self.stats.record(packet_len);
    }

    /// Formats the `Session` response header value, e.g. `"482913"`.
    pub fn session_header_value(&self) -> String {
        self.id.to_string()
    }
}

/// Thread-safe registry of active sessions, keyed by the random 6-digit
/// session id.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<u32, Arc<Session>>>>,
    media_root: Arc<PathBuf>,
}

impl SessionManager {
    pub fn new(media_root: PathBuf) -> Self {
        SessionManager {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            media_root: Arc::new(media_root),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Allocate a fresh session with a random, currently-unused 6-digit id.
    pub fn create_session(&self, media_file: &str) -> Arc<Session> {
        let mut sessions = self.sessions.write();
        let id = loop {
            let candidate = rand::random_range(100_000..=999_999);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let session = Arc::new(Session::new(id, media_file));
        sessions.insert(id, session.clone());
        tracing::debug!(session_id = id, media_file, total_sessions = sessions.len(), "session created");
        session
    }

    pub fn get_session(&self, id: u32) -> Option<Arc<Session>> {
        self.sessions.read().get(&id).cloned()
    }

    pub fn remove_session(&self, id: u32) -> Option<Arc<Session>> {
        let removed = self.sessions.write().remove(&id);
        if let Some(session) = &removed {
            session.signal_stop();
            tracing::debug!(session_id = id, "session removed");
        }
        removed
    }

    pub fn remove_sessions(&self, ids: &[u32]) -> usize {
        let mut removed = 0;
        for &id in ids {
            if self.remove_session(id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn get_playing_sessions(&self) -> Vec<Arc<Session>> {
        self.sessions
            .read()
            .values()
            .filter(|s| s.is_playing())
            .cloned()
            .collect()
    }
}
