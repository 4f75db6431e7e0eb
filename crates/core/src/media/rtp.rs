//! Generic RTP-style fixed header encode/decode (simplified dialect).
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           Timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             SSRC                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Unlike a full RTP stack, this module is deliberately stateless: the
//! caller (the MJPEG packetizer, the emitter) owns sequence/timestamp
//! state and passes it in on every call. `encode`/`decode` only handle
//! wire format.

use crate::error::{CoreError, Result};

/// Size of the fixed RTP header in bytes.
pub const HEADER_LEN: usize = 12;

/// RTP payload type used for MJPEG (static assignment, RFC 3551).
pub const MJPEG_PAYLOAD_TYPE: u8 = 26;

/// Serialize a 12-byte RTP fixed header followed by `payload`.
#[allow(clippy::too_many_arguments)]
pub fn encode(
    version: u8,
    padding: bool,
    extension: bool,
    cc: u8,
    seq: u16,
    marker: bool,
    payload_type: u8,
    ssrc: u32,
    payload: &[u8],
    timestamp: u32,
) -> Vec<u8> {
    let byte0 = (version << 6) | ((padding as u8) << 5) | ((extension as u8) << 4) | (cc & 0x0f);
    let byte1 = ((marker as u8) << 7) | (payload_type & 0x7f);

    let mut packet = Vec::with_capacity(HEADER_LEN + payload.len());
    packet.push(byte0);
    packet.push(byte1);
    packet.extend_from_slice(&seq.to_be_bytes());
    packet.extend_from_slice(&timestamp.to_be_bytes());
    packet.extend_from_slice(&ssrc.to_be_bytes());
    packet.extend_from_slice(payload);
    packet
}

/// A decoded RTP packet borrowing its payload from the source buffer.
#[derive(Debug, Clone, Copy)]
pub struct RtpPacket<'a> {
    version: u8,
    padding: bool,
    extension: bool,
    cc: u8,
    marker: bool,
    payload_type: u8,
    seq: u16,
    timestamp: u32,
    ssrc: u32,
    payload: &'a [u8],
}

impl<'a> RtpPacket<'a> {
    /// Parse the fixed 12-byte header from `buf`; the remainder is the payload.
    ///
    /// Fails with [`CoreError::MalformedPacket`] when `buf` is shorter than
    /// [`HEADER_LEN`].
    pub fn decode(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(CoreError::MalformedPacket(buf.len()));
        }

        let byte0 = buf[0];
        let byte1 = buf[1];
        let seq = u16::from_be_bytes([buf[2], buf[3]]);
        let timestamp = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let ssrc = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]);

        Ok(RtpPacket {
            version: byte0 >> 6,
            padding: (byte0 & 0x20) != 0,
            extension: (byte0 & 0x10) != 0,
            cc: byte0 & 0x0f,
            marker: (byte1 & 0x80) != 0,
            payload_type: byte1 & 0x7f,
            seq,
            timestamp,
            ssrc,
            payload: &buf[HEADER_LEN..],
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn padding(&self) -> bool {
        self.padding
    }

    pub fn extension(&self) -> bool {
        self.extension
    }

    pub fn cc(&self) -> u8 {
        self.cc
    }

    pub fn marker(&self) -> bool {
        self.marker
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// RTP sequence number (RFC 3550 §5.1).
    pub fn seq_num(&self) -> u16 {
        self.seq
    }

    /// RTP timestamp, returned verbatim (unsigned, no epoch interpretation here).
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    /// Bytes following the fixed header.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_2() {
        let buf = encode(2, false, false, 0, 1, false, MJPEG_PAYLOAD_TYPE, 0, b"x", 0);
        assert_eq!(buf[0] >> 6, 2);
    }

    #[test]
    fn marker_bit_set_and_clear() {
        let clear = encode(2, false, false, 0, 1, false, MJPEG_PAYLOAD_TYPE, 0, b"", 0);
        assert_eq!(clear[1] & 0x80, 0);

        let set = encode(2, false, false, 0, 1, true, MJPEG_PAYLOAD_TYPE, 0, b"", 0);
        assert_eq!(set[1] & 0x80, 0x80);
    }

    #[test]
    fn payload_type_is_masked_to_7_bits() {
        let buf = encode(2, false, false, 0, 1, true, MJPEG_PAYLOAD_TYPE, 0, b"", 0);
        assert_eq!(buf[1] & 0x7f, MJPEG_PAYLOAD_TYPE);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let err = RtpPacket::decode(&[0u8; 11]).unwrap_err();
        assert!(matches!(err, CoreError::MalformedPacket(11)));
    }

    #[test]
    fn decode_exposes_payload_seq_and_timestamp() {
        let buf = encode(
            2,
            false,
            false,
            0,
            42,
            true,
            MJPEG_PAYLOAD_TYPE,
            0,
            b"hello",
            1234,
        );
        let pkt = RtpPacket::decode(&buf).unwrap();
        assert_eq!(pkt.seq_num(), 42);
        assert_eq!(pkt.timestamp(), 1234);
        assert_eq!(pkt.payload(), b"hello");
        assert!(pkt.marker());
        assert_eq!(pkt.payload_type(), MJPEG_PAYLOAD_TYPE);
    }

    #[test]
    fn encode_decode_round_trip_is_identity() {
        let cases: &[(u8, bool, bool, u8, u16, bool, u8, u32, u32, &[u8])] = &[
            (2, false, false, 0, 0, false, 26, 0, 0, b""),
            (2, true, false, 3, 65535, true, 26, 0xDEADBEEF, 90000, b"abc"),
            (2, false, true, 0, 1, false, 96, 7, 1, &[0xFFu8; 64]),
        ];

        for &(version, padding, extension, cc, seq, marker, pt, ssrc, ts, payload) in cases {
            let buf = encode(
                version, padding, extension, cc, seq, marker, pt, ssrc, payload, ts,
            );
            let decoded = RtpPacket::decode(&buf).unwrap();
            assert_eq!(decoded.version(), version);
            assert_eq!(decoded.padding(), padding);
            assert_eq!(decoded.extension(), extension);
            assert_eq!(decoded.cc(), cc);
            assert_eq!(decoded.marker(), marker);
            assert_eq!(decoded.payload_type(), pt);
            assert_eq!(decoded.seq_num(), seq);
            assert_eq!(decoded.ssrc(), ssrc);
            assert_eq!(decoded.timestamp(), ts);
            assert_eq!(decoded.payload(), payload);
        }
    }
}
