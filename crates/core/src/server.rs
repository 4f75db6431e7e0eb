use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::error::{CoreError, Result};
use crate::session::SessionManager;
use crate::transport::tcp;

/// Server-level configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP address the control listener binds.
    pub bind_addr: String,
    /// Directory prefixed-frame files are resolved against.
    pub media_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8554".to_string(),
            media_root: PathBuf::from("."),
        }
    }
}

/// High-level session engine orchestrator.
///
/// Owns the session manager and the control-protocol TCP listener.
/// Each playing session's emitter thread is spawned by
/// [`MethodHandler::handle`](crate::protocol::MethodHandler) on PLAY and
/// owns its own UDP socket.
pub struct Server {
    session_manager: SessionManager,
    running: Arc<AtomicBool>,
    config: ServerConfig,
}

impl Server {
    pub fn new(bind_addr: &str) -> Self {
        Self::with_config(ServerConfig {
            bind_addr: bind_addr.to_string(),
            ..ServerConfig::default()
        })
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            session_manager: SessionManager::new(config.media_root.clone()),
            running: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CoreError::AlreadyRunning);
        }

        let listener = TcpListener::bind(&self.config.bind_addr)?;
        listener.set_nonblocking(true)?;

        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let session_manager = self.session_manager.clone();

        tracing::info!(addr = %self.config.bind_addr, media_root = %self.config.media_root.display(), "session engine listening");

        thread::spawn(move || {
            tcp::accept_loop(listener, session_manager, running);
        });

        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for session in self.session_manager.get_playing_sessions() {
            session.signal_stop();
        }
        tracing::info!("server stopping");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Currently playing sessions, for observability/diagnostics.
    pub fn viewers(&self) -> Vec<Viewer> {
        self.session_manager
            .get_playing_sessions()
            .iter()
            .filter_map(|session| {
                session.get_transport().map(|transport| Viewer {
                    session_id: session.id,
                    media_file: session.media_file.clone(),
                    client_addr: transport.client_addr.to_string(),
                })
            })
            .collect()
    }
}

/// Information about a connected viewer (a session in the PLAYING state).
#[derive(Debug, Clone)]
pub struct Viewer {
    pub session_id: u32,
    pub media_file: String,
    pub client_addr: String,
}
