use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use crate::protocol::request::RtspRequest;
use crate::protocol::response::RtspResponse;
use crate::session::transport::TransportHeader;
use crate::session::{Session, SessionManager, SessionState, Transport, emitter};

/// Handles control-protocol method requests for a single TCP connection.
///
/// Tracks which sessions were created on this connection so they can be
/// cleaned up when the connection drops.
pub struct MethodHandler {
    session_manager: SessionManager,
    client_addr: SocketAddr,
    /// Session IDs created during this connection, for cleanup on disconnect.
    session_ids: Vec<u32>,
}

impl MethodHandler {
    pub fn new(session_manager: SessionManager, client_addr: SocketAddr) -> Self {
        MethodHandler {
            session_manager,
            client_addr,
            session_ids: Vec::new(),
        }
    }

    /// Returns session IDs owned by this connection (for cleanup on disconnect).
    pub fn session_ids(&self) -> &[u32] {
        &self.session_ids
    }

    pub fn handle(&mut self, request: &RtspRequest) -> RtspResponse {
        let cseq = request.cseq().unwrap_or("0");

        match request.method.as_str() {
            "OPTIONS" => self.handle_options(cseq),
            "SETUP" => self.handle_setup(cseq, request),
            "PLAY" => self.handle_play(cseq, request),
            "PAUSE" => self.handle_pause(cseq, request),
            "TEARDOWN" => self.handle_teardown(cseq, request),
            "REPORT" => self.handle_report(cseq, request),
            "GET_PARAMETER" => self.handle_get_parameter(cseq, request),
            _ => {
                tracing::warn!(method = %request.method, %cseq, "unsupported method");
                RtspResponse::new(501, "Not Implemented").add_header("CSeq", cseq)
            }
        }
    }

    fn handle_options(&self, cseq: &str) -> RtspResponse {
        tracing::debug!(%cseq, "OPTIONS");
        RtspResponse::ok().add_header("CSeq", cseq).add_header(
            "Public",
            "OPTIONS, SETUP, PLAY, PAUSE, TEARDOWN, REPORT, GET_PARAMETER",
        )
    }

    fn handle_setup(&mut self, cseq: &str, request: &RtspRequest) -> RtspResponse {
        let transport_header = match request.get_header("Transport") {
            Some(t) => t,
            None => {
                tracing::warn!(%cseq, "SETUP missing Transport header");
                return RtspResponse::bad_request().add_header("CSeq", cseq);
            }
        };

        let client_transport = match TransportHeader::parse(transport_header) {
            Some(t) => t,
            None => {
                tracing::warn!(%cseq, transport_header, "SETUP invalid Transport header");
                return RtspResponse::bad_request().add_header("CSeq", cseq);
            }
        };

        let session = self.session_manager.create_session(&request.target);

        if let Err(e) = session.open_source(self.session_manager.media_root()) {
            tracing::warn!(target = %request.target, error = %e, "SETUP for missing media file");
            self.session_manager.remove_session(session.id);
            return RtspResponse::not_found().add_header("CSeq", cseq);
        }

        if let Some(fps_header) = request.get_header("FPS") {
            let fps: u32 = fps_header.parse().unwrap_or(0);
            session.set_fps(fps);
        }

        let client_addr = SocketAddr::new(self.client_addr.ip(), client_transport.client_port);
        session.set_transport(Transport {
            client_port: client_transport.client_port,
            client_addr,
        });
        session.set_state(SessionState::Ready);

        self.session_ids.push(session.id);

        tracing::info!(
            session_id = session.id,
            target = %request.target,
            %client_addr,
            "session created via SETUP"
        );

        RtspResponse::ok()
            .add_header("CSeq", cseq)
            .add_header("Session", &session.session_header_value())
    }

    fn handle_play(&mut self, cseq: &str, request: &RtspRequest) -> RtspResponse {
        let session_id = match self.extract_session_id(request) {
            Some(id) => id,
            None => {
                tracing::warn!(%cseq, "PLAY missing Session header");
                return RtspResponse::session_not_found().add_header("CSeq", cseq);
            }
        };

        let Some(session) = self.session_manager.get_session(session_id) else {
            tracing::warn!(session_id, "PLAY for unknown session");
            return RtspResponse::session_not_found().add_header("CSeq", cseq);
        };

        let Some(transport) = session.get_transport() else {
            tracing::warn!(session_id, "PLAY before transport negotiated");
            return RtspResponse::session_not_found().add_header("CSeq", cseq);
        };

        session.reset_counters();
        session.set_state(SessionState::Playing);

        let stop = session.fresh_cancel_token();
        let dest = transport.client_addr;
        spawn_emitter(session.clone(), dest, stop);

        tracing::info!(session_id, "session started playing");

        RtspResponse::ok()
            .add_header("CSeq", cseq)
            .add_header("Session", &session.session_header_value())
    }

    fn handle_pause(&mut self, cseq: &str, request: &RtspRequest) -> RtspResponse {
        let session_id = match self.extract_session_id(request) {
            Some(id) => id,
            None => {
                tracing::warn!(%cseq, "PAUSE missing Session header");
                return RtspResponse::session_not_found().add_header("CSeq", cseq);
            }
        };

        match self.session_manager.get_session(session_id) {
            Some(session) => {
                session.signal_stop();
                session.set_state(SessionState::Ready);
                tracing::info!(session_id, "session paused");
                RtspResponse::ok()
                    .add_header("CSeq", cseq)
                    .add_header("Session", &session.session_header_value())
            }
            None => {
                tracing::warn!(session_id, "PAUSE for unknown session");
                RtspResponse::session_not_found().add_header("CSeq", cseq)
            }
        }
    }

    fn handle_teardown(&mut self, cseq: &str, request: &RtspRequest) -> RtspResponse {
        let session_id = match self.extract_session_id(request) {
            Some(id) => id,
            None => {
                tracing::warn!(%cseq, "TEARDOWN missing Session header");
                return RtspResponse::session_not_found().add_header("CSeq", cseq);
            }
        };

        match self.session_manager.remove_session(session_id) {
            Some(_) => {
                self.session_ids.retain(|id| *id != session_id);
                tracing::info!(session_id, "session terminated via TEARDOWN");
                RtspResponse::ok().add_header("CSeq", cseq)
            }
            None => {
                tracing::warn!(session_id, "TEARDOWN for unknown session");
                RtspResponse::session_not_found().add_header("CSeq", cseq)
            }
        }
    }

    fn handle_report(&self, cseq: &str, request: &RtspRequest) -> RtspResponse {
        tracing::info!(%cseq, target = %request.target, "REPORT received");
        RtspResponse::ok().add_header("CSeq", cseq)
    }

    /// GET_PARAMETER is used by clients as a keepalive.
    fn handle_get_parameter(&self, cseq: &str, request: &RtspRequest) -> RtspResponse {
        tracing::trace!(%cseq, "GET_PARAMETER keepalive");

        let mut resp = RtspResponse::ok().add_header("CSeq", cseq);

        if let Some(id) = self.extract_session_id(request)
            && self.session_manager.get_session(id).is_some()
        {
            resp = resp.add_header("Session", &id.to_string());
        }

        resp
    }

    /// Extract and parse the session ID from the Session header.
    fn extract_session_id(&self, request: &RtspRequest) -> Option<u32> {
        request.get_header("Session")?.trim().parse().ok()
    }
}

fn spawn_emitter(session: Arc<Session>, dest: SocketAddr, stop: crate::cancel::CancelToken) {
    thread::spawn(move || emitter::run(session, dest, stop));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn handler() -> (MethodHandler, SessionManager) {
        let manager = SessionManager::new(PathBuf::from("."));
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        (MethodHandler::new(manager.clone(), addr), manager)
    }

    #[test]
    fn setup_without_transport_is_bad_request() {
        let (mut handler, _manager) = handler();
        let req = RtspRequest::parse("SETUP movie.bin RTSP/1.0\r\nCSeq: 1\r\n\r\n").unwrap();
        let resp = handler.handle(&req);
        assert_eq!(resp.status_code, 400);
    }

    #[test]
    fn setup_missing_file_is_not_found() {
        let (mut handler, _manager) = handler();
        let req = RtspRequest::parse(
            "SETUP nonexistent.bin RTSP/1.0\r\nCSeq: 1\r\nTransport: RTP/UDP;client_port=6000\r\n\r\n",
        )
        .unwrap();
        let resp = handler.handle(&req);
        assert_eq!(resp.status_code, 404);
        assert!(handler.session_ids().is_empty());
    }

    #[test]
    fn play_for_unknown_session_is_session_not_found() {
        let (mut handler, _manager) = handler();
        let req =
            RtspRequest::parse("PLAY movie.bin RTSP/1.0\r\nCSeq: 2\r\nSession: 999999\r\n\r\n")
                .unwrap();
        let resp = handler.handle(&req);
        assert_eq!(resp.status_code, 454);
    }

    #[test]
    fn options_lists_supported_methods() {
        let (mut handler, _manager) = handler();
        let req = RtspRequest::parse("OPTIONS movie.bin RTSP/1.0\r\nCSeq: 1\r\n\r\n").unwrap();
        let resp = handler.handle(&req);
        assert_eq!(resp.status_code, 200);
        assert!(
            resp.headers
                .iter()
                .any(|(k, v)| k == "Public" && v.contains("PLAY"))
        );
    }

    #[test]
    fn report_always_replies_200() {
        let (mut handler, _manager) = handler();
        let req = RtspRequest::parse("REPORT movie.bin RTSP/1.0\r\nCSeq: 9\r\n\r\n").unwrap();
        let resp = handler.handle(&req);
        assert_eq!(resp.status_code, 200);
    }

    #[test]
    fn cseq_is_echoed_in_every_reply() {
        let (mut handler, _manager) = handler();
        for raw in [
            "OPTIONS movie.bin RTSP/1.0\r\nCSeq: 7\r\n\r\n",
            "REPORT movie.bin RTSP/1.0\r\nCSeq: 7\r\n\r\n",
            "PLAY movie.bin RTSP/1.0\r\nCSeq: 7\r\nSession: 111111\r\n\r\n",
        ] {
            let req = RtspRequest::parse(raw).unwrap();
            let resp = handler.handle(&req);
            let cseq = resp
                .headers
                .iter()
                .find(|(k, _)| k == "CSeq")
                .map(|(_, v)| v.as_str());
            assert_eq!(cseq, Some("7"));
        }
    }
}
