//! Fragment reassembly: reconstructs frames from out-of-order datagrams.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use mjpegcast::media::fragment::FragmentHeader;

/// One in-flight frame, keyed by `frame_id` in [`ReassemblyMap`].
struct Entry {
    total: u16,
    chunks: HashMap<u16, Vec<u8>>,
    received: HashSet<u16>,
    first_seen: Instant,
    timestamp: u32,
}

/// Maximum age an incomplete entry is allowed before it's purged and the
/// frame considered lost.
pub const MAX_AGE: Duration = Duration::from_secs(2);

/// Per-connection reassembly state, touched only by the datagram receiver.
#[derive(Default)]
pub struct ReassemblyMap {
    entries: HashMap<u32, Entry>,
}

impl ReassemblyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one fragment. Returns the completed `(timestamp, frame bytes)`
    /// once every index in `[0, total)` has arrived for this frame id.
    ///
    /// Duplicate fragments (an index already in the received set) are
    /// discarded without effect.
    pub fn ingest(
        &mut self,
        frag: FragmentHeader,
        chunk: &[u8],
        timestamp: u32,
    ) -> Option<(u32, Vec<u8>)> {
        let entry = self.entries.entry(frag.frame_id).or_insert_with(|| Entry {
            total: frag.total,
            chunks: HashMap::new(),
            received: HashSet::new(),
            first_seen: Instant::now(),
            timestamp,
        });

        if entry.received.contains(&frag.index) {
            return None;
        }

        entry.chunks.insert(frag.index, chunk.to_vec());
        entry.received.insert(frag.index);

        if entry.received.len() as u16 != entry.total {
            return None;
        }

        let entry = self.entries.remove(&frag.frame_id)?;
        let mut frame = Vec::new();
        for i in 0..entry.total {
            frame.extend_from_slice(entry.chunks.get(&i)?);
        }
        Some((entry.timestamp, frame))
    }

    /// Remove entries older than [`MAX_AGE`]. Returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.first_seen) <= MAX_AGE);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
