//! Per-session emitter thread: pulls frames from the Video Source and
//! sends fragmented RTP/MJPEG datagrams to the client at the session's
//! target frame rate.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::session::Session;

/// Run the emitter loop for `session` until `stop` is cancelled.
///
/// Creates and owns a fresh UDP socket for this PLAY epoch, sending
/// datagrams to `dest`. Intended to run on its own thread, spawned by
/// the SETUP/PLAY handler.
pub fn run(session: Arc<Session>, dest: SocketAddr, stop: CancelToken) {
    let socket = match UdpSocket::bind("0.0.0.0:0") {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(session_id = session.id, error = %e, "emitter failed to bind datagram socket");
            return;
        }
    };

    tracing::info!(session_id = session.id, %dest, "emitter started");

    while !stop.is_cancelled() {
        let fps = session.fps().max(1);
        let frame_interval = Duration::from_secs_f64(1.0 / fps as f64);

        let Some(frame) = session.next_source_frame() else {
            if stop.wait_timeout(Duration::from_millis(20)) {
                break;
            }
            continue;
        };

        if frame.is_empty() {
            // Empty frames are skipped without advancing frame_id (§ Session Engine).
            continue;
        }

        let frame_id = session.next_frame_id();
        let timestamp = (((frame_id - 1) as u64 * 1000) / fps as u64) as u32;

        let packets = session.packetizer().lock().packetize(&frame, frame_id, timestamp);

        for packet in packets {
            if stop.is_cancelled() {
                break;
            }
            match socket.send_to(&packet, dest) {
                Ok(sent) => session.record_sent(sent),
                Err(e) => {
                    tracing::warn!(session_id = session.id, error = %e, "datagram send failed, fragment dropped");
                }
            }
        }

        if stop.wait_timeout(frame_interval) {
            break;
        }
    }

    tracing::info!(session_id = session.id, "emitter stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mjpeg::PAYLOAD_PER_PACKET;
    use crate::session::SessionManager;
    use std::path::PathBuf;

    /// Design note §9: datagrams with payload < 8 bytes are read back as
    /// legacy whole-frame packets. The emitter must never produce one for
    /// a non-empty frame, across every size the MTU fragmentation logic
    /// can hit (1 byte through several multiples of a full packet).
    #[test]
    fn emitter_never_produces_sub_fragment_header_payloads() {
        let manager = SessionManager::new(PathBuf::from("."));
        let session = manager.create_session("video.bin");

        for len in [1, 7, 8, 100, PAYLOAD_PER_PACKET, PAYLOAD_PER_PACKET + 1, PAYLOAD_PER_PACKET * 2 + 3] {
            let frame = vec![0xAAu8; len];
            let packets = session.packetizer().lock().packetize(&frame, 1, 0);
            for packet in &packets {
                assert!(
                    packet.len() >= crate::media::rtp::HEADER_LEN + crate::media::fragment::HEADER_LEN,
                    "packet of {} bytes for frame len {len} is shorter than both headers",
                    packet.len()
                );
            }
        }
    }

    #[test]
    fn emitter_stops_promptly_when_cancelled_with_no_frames() {
        let manager = SessionManager::new(PathBuf::from("."));
        let session = manager.create_session("video.bin");
        let stop = CancelToken::new();
        let dest: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let stop2 = stop.clone();
        let handle = std::thread::spawn(move || run(session, dest, stop2));

        std::thread::sleep(Duration::from_millis(30));
        stop.cancel();
        handle.join().unwrap();
    }
}
