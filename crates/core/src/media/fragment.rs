//! Fragment sub-header for frames split across multiple datagrams.
//!
//! This sits inside the RTP payload, after the 12-byte fixed header and
//! before the JPEG bytes:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           Frame ID                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |       Fragment Index         |       Fragment Count          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Frame ID identifies which JPEG frame a fragment belongs to; index and
//! count let the receiver reassemble fragments out of order and detect
//! loss (`received.len() == total`).

use crate::error::{CoreError, Result};

/// Size of the fragment sub-header in bytes.
pub const HEADER_LEN: usize = 8;

/// A fragment sub-header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentHeader {
    pub frame_id: u32,
    pub index: u16,
    pub total: u16,
}

impl FragmentHeader {
    pub fn new(frame_id: u32, index: u16, total: u16) -> Self {
        Self {
            frame_id,
            index,
            total,
        }
    }

    /// Whether this is the last fragment of the frame.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }

    /// Serialize to the 8-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.frame_id.to_be_bytes());
        buf[4..6].copy_from_slice(&self.index.to_be_bytes());
        buf[6..8].copy_from_slice(&self.total.to_be_bytes());
        buf
    }

    /// Parse the 8-byte sub-header from the start of `buf`, returning it
    /// along with the remaining bytes (the JPEG fragment payload).
    pub fn decode(buf: &[u8]) -> Result<(Self, &[u8])> {
        if buf.len() < HEADER_LEN {
            return Err(CoreError::MalformedPacket(buf.len()));
        }
        let frame_id = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let index = u16::from_be_bytes([buf[4], buf[5]]);
        let total = u16::from_be_bytes([buf[6], buf[7]]);
        Ok((
            FragmentHeader {
                frame_id,
                index,
                total,
            },
            &buf[HEADER_LEN..],
        ))
    }
}
