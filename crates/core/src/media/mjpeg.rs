//! MJPEG RTP packetizer: turns whole JPEG frames into a sequence of
//! fragmented RTP datagrams sized to fit under the configured MTU.
//!
//! Unlike [`rtp`](super::rtp), which is a stateless wire-format module,
//! [`MjpegPacketizer`] is stateful: it owns the RTP sequence counter and
//! SSRC for a session, the same way the original server keeps a running
//! `rtp_seq` per connection.

use super::fragment::{self, FragmentHeader};
use super::rtp::{self, MJPEG_PAYLOAD_TYPE};

/// Network MTU assumed when sizing fragments.
pub const MTU: usize = 1400;

/// Bytes of JPEG data carried per packet after both headers are
/// subtracted: `MTU - RTP_HEADER_LEN - FRAGMENT_HEADER_LEN`.
pub const PAYLOAD_PER_PACKET: usize = MTU - rtp::HEADER_LEN - fragment::HEADER_LEN;

/// Stateful packetizer producing fragmented RTP/MJPEG datagrams.
///
/// One instance is owned per playing session. `packetize` is called once
/// per frame and returns every datagram needed to deliver it.
pub struct MjpegPacketizer {
    ssrc: u32,
    seq: u16,
}

impl MjpegPacketizer {
    /// Create a packetizer with SSRC fixed at zero and sequence counter
    /// starting at zero, mirroring a fresh PLAY.
    pub fn new() -> Self {
        Self { ssrc: 0, seq: 0 }
    }

    /// Reset the sequence counter, as done on every PLAY. SSRC stays zero.
    pub fn reset(&mut self) {
        self.ssrc = 0;
        self.seq = 0;
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn next_sequence(&self) -> u16 {
        self.seq
    }

    /// Split a complete JPEG frame into one or more RTP datagrams.
    ///
    /// `frame_id` identifies the source frame for reassembly (owned by
    /// the caller — the session's frame_id counter — since it also
    /// feeds the emitter's timestamp formula). `timestamp` is the RTP
    /// timestamp for this access unit; all its fragments share it.
    pub fn packetize(&mut self, jpeg: &[u8], frame_id: u32, timestamp: u32) -> Vec<Vec<u8>> {
        let total_fragments = if jpeg.is_empty() {
            1
        } else {
            jpeg.len().div_ceil(PAYLOAD_PER_PACKET)
        };
        let total = total_fragments as u16;

        let mut packets = Vec::with_capacity(total_fragments);
        let chunks: Vec<&[u8]> = if jpeg.is_empty() {
            vec![jpeg]
        } else {
            jpeg.chunks(PAYLOAD_PER_PACKET).collect()
        };

        for (index, chunk) in chunks.into_iter().enumerate() {
            let frag_hdr = FragmentHeader::new(frame_id, index as u16, total);
            let mut payload = Vec::with_capacity(fragment::HEADER_LEN + chunk.len());
            payload.extend_from_slice(&frag_hdr.encode());
            payload.extend_from_slice(chunk);

            let marker = frag_hdr.is_last();
            let packet = rtp::encode(
                2,
                false,
                false,
                0,
                self.seq,
                marker,
                MJPEG_PAYLOAD_TYPE,
                self.ssrc,
                &payload,
                timestamp,
            );
            self.seq = self.seq.wrapping_add(1);
            packets.push(packet);
        }

        packets
    }
}

impl Default for MjpegPacketizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::rtp::RtpPacket;

    #[test]
    fn small_frame_is_a_single_fragment() {
        let mut p = MjpegPacketizer::new();
        let jpeg = vec![0xAAu8; 100];
        let packets = p.packetize(&jpeg, 1, 0);
        assert_eq!(packets.len(), 1);

        let pkt = RtpPacket::decode(&packets[0]).unwrap();
        assert!(pkt.marker());
        let (frag, payload) = FragmentHeader::decode(pkt.payload()).unwrap();
        assert_eq!(frag.index, 0);
        assert_eq!(frag.total, 1);
        assert_eq!(payload, &jpeg[..]);
    }

    #[test]
    fn large_frame_is_split_across_fragments_with_marker_on_last() {
        let mut p = MjpegPacketizer::new();
        let jpeg = vec![0x42u8; PAYLOAD_PER_PACKET * 3 + 17];
        let packets = p.packetize(&jpeg, 2, 3000);

        let expected = jpeg.len().div_ceil(PAYLOAD_PER_PACKET);
        assert_eq!(packets.len(), expected);

        let mut reassembled = Vec::new();
        for (i, raw) in packets.iter().enumerate() {
            let pkt = RtpPacket::decode(raw).unwrap();
            assert_eq!(pkt.timestamp(), 3000);
            let (frag, payload) = FragmentHeader::decode(pkt.payload()).unwrap();
            assert_eq!(frag.index as usize, i);
            assert_eq!(frag.total as usize, expected);
            assert_eq!(pkt.marker(), i + 1 == expected);
            reassembled.extend_from_slice(payload);
        }
        assert_eq!(reassembled, jpeg);
    }

    #[test]
    fn frame_id_is_passed_through_and_sequence_is_contiguous_across_frames() {
        let mut p = MjpegPacketizer::new();
        let first = p.packetize(&[0u8; 10], 1, 0);
        let second = p.packetize(&[0u8; 10], 2, 3000);

        let first_frag =
            FragmentHeader::decode(RtpPacket::decode(&first[0]).unwrap().payload())
                .unwrap()
                .0;
        let second_frag =
            FragmentHeader::decode(RtpPacket::decode(&second[0]).unwrap().payload())
                .unwrap()
                .0;
        assert_eq!(first_frag.frame_id, 1);
        assert_eq!(second_frag.frame_id, 2);

        let first_seq = RtpPacket::decode(&first[0]).unwrap().seq_num();
        let second_seq = RtpPacket::decode(&second[0]).unwrap().seq_num();
        assert_eq!(second_seq, first_seq.wrapping_add(1));
    }

    #[test]
    fn ssrc_is_always_zero() {
        let mut p = MjpegPacketizer::new();
        assert_eq!(p.ssrc(), 0);
        let a = p.packetize(&[0u8; 10], 1, 0);
        assert_eq!(RtpPacket::decode(&a[0]).unwrap().ssrc(), 0);
        p.reset();
        assert_eq!(p.ssrc(), 0);
        assert_eq!(p.next_sequence(), 0);
    }

    #[test]
    fn empty_frame_still_emits_one_marked_fragment() {
        let mut p = MjpegPacketizer::new();
        let packets = p.packetize(&[], 1, 0);
        assert_eq!(packets.len(), 1);
        assert!(RtpPacket::decode(&packets[0]).unwrap().marker());
    }
}
