//! Datagram receiver thread: decodes RTP packets, reassembles fragments,
//! and feeds completed frames into the jitter buffer.

use std::net::UdpSocket;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use mjpegcast::CancelToken;
use mjpegcast::media::fragment::FragmentHeader;
use mjpegcast::media::rtp::RtpPacket;

use crate::jitter::JitterBuffer;
use crate::reassembly::ReassemblyMap;
use crate::stats::ClientStats;

/// Largest datagram we'll read — comfortably above the 1400-byte MTU
/// the emitter fragments to, with headroom for non-conforming senders.
const RECV_BUF_LEN: usize = 65536;

/// How often the reassembly map is swept for aged-out entries.
const PURGE_INTERVAL: Duration = Duration::from_millis(500);

/// Run the receiver loop until `stop` is cancelled.
///
/// `socket` must already have a read timeout set (0.5 s per design); the
/// timeout is what lets this loop observe `stop` promptly without a
/// dedicated wakeup mechanism.
pub fn run(
    socket: Arc<UdpSocket>,
    reassembly: Arc<Mutex<ReassemblyMap>>,
    jitter: Arc<JitterBuffer>,
    stop: CancelToken,
    stats: Arc<ClientStats>,
) {
    let mut buf = vec![0u8; RECV_BUF_LEN];
    let mut last_purge = Instant::now();

    tracing::info!("datagram receiver started");

    while !stop.is_cancelled() {
        match socket.recv_from(&mut buf) {
            Ok((n, _addr)) => {
                stats.record_received(n);
                handle_datagram(&buf[..n], &reassembly, &jitter);
            }
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(e) => {
                tracing::warn!(error = %e, "datagram receive error");
            }
        }

        if last_purge.elapsed() >= PURGE_INTERVAL {
            let purged = reassembly.lock().purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "purged aged-out reassembly entries");
            }
            last_purge = Instant::now();
        }
    }

    tracing::info!("datagram receiver stopped");
}

fn handle_datagram(datagram: &[u8], reassembly: &Mutex<ReassemblyMap>, jitter: &JitterBuffer) {
    let packet = match RtpPacket::decode(datagram) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "malformed RTP packet, datagram dropped");
            return;
        }
    };

    let payload = packet.payload();

    // Legacy path: payloads shorter than a fragment sub-header are whole
    // frames, not fragments (design note §9).
    if payload.len() < 8 {
        jitter.push(packet.timestamp(), payload.to_vec());
        return;
    }

    let (frag, chunk) = match FragmentHeader::decode(payload) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "malformed fragment sub-header, datagram dropped");
            return;
        }
    };

    let completed = reassembly.lock().ingest(frag, chunk, packet.timestamp());
    if let Some((timestamp, frame)) = completed {
        jitter.push(timestamp, frame);
    }
}
