//! Bounded, timestamp-ordered jitter buffer.
//!
//! Absorbs network reordering and arrival jitter between the datagram
//! receiver (which pushes completed frames as they're reassembled, in
//! whatever order they finish) and the paced renderer (which pops them
//! in ascending timestamp order at a fixed rate).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use mjpegcast::CancelToken;

/// Default capacity: maximum entries before the oldest (smallest
/// timestamp) is evicted to admit a new one.
pub const DEFAULT_CAPACITY: usize = 30;

/// How long to wait for the prebuffer threshold before giving up and
/// starting playback anyway (design note: "2-5 s timeout").
const PREBUFFER_TIMEOUT: Duration = Duration::from_secs(3);

/// One buffered frame, ordered by ascending timestamp. `seq` breaks ties
/// between same-timestamp entries in arrival order (legacy whole-frame
/// datagrams can repeat a timestamp across identical frames).
struct Entry {
    timestamp: u32,
    seq: u64,
    frame: Vec<u8>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.seq == other.seq
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// Reversed so a max-heap (`BinaryHeap`'s default) pops the
    /// *smallest* timestamp first — the next frame due for playout.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner {
    heap: BinaryHeap<Entry>,
    capacity: usize,
    next_seq: u64,
    prebuffer_threshold: usize,
    prebuffer_ready: bool,
}

/// Shared, thread-safe jitter buffer.
pub struct JitterBuffer {
    inner: Mutex<Inner>,
    condvar: Condvar,
}

impl JitterBuffer {
    /// `prebuffer_threshold` is the entry count the buffer must reach
    /// before signaling "ready" (minimum 1, per design).
    pub fn new(capacity: usize, prebuffer_threshold: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                capacity: capacity.max(1),
                next_seq: 0,
                prebuffer_threshold: prebuffer_threshold.max(1),
                prebuffer_ready: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Compute the prebuffer threshold from the configured jitter depth
    /// and target frame rate: `jitter_ms * fps / 1000`, minimum 1.
    pub fn threshold_for(jitter_ms: u32, fps: u32) -> usize {
        ((jitter_ms as u64 * fps as u64) / 1000).max(1) as usize
    }

    /// Push a completed frame. Evicts the oldest (smallest-timestamp)
    /// entry first if the buffer is already at capacity.
    pub fn push(&self, timestamp: u32, frame: Vec<u8>) {
        let mut inner = self.inner.lock();

        if inner.heap.len() >= inner.capacity {
            inner.heap.pop();
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(Entry {
            timestamp,
            seq,
            frame,
        });

        if !inner.prebuffer_ready && inner.heap.len() >= inner.prebuffer_threshold {
            inner.prebuffer_ready = true;
            self.condvar.notify_all();
        }
    }

    /// Pop the smallest-timestamp entry, if any.
    pub fn pop(&self) -> Option<(u32, Vec<u8>)> {
        let mut inner = self.inner.lock();
        inner.heap.pop().map(|e| (e.timestamp, e.frame))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Polling granularity for [`wait_prebuffer_ready`](Self::wait_prebuffer_ready).
    const POLL_SLICE: Duration = Duration::from_millis(50);

    /// Block until the prebuffer threshold is reached, the timeout
    /// elapses, or `stop` is cancelled. Returns `false` if cancelled.
    ///
    /// Waits in short slices rather than one long sleep so a TEARDOWN
    /// arriving mid-prebuffer is observed promptly instead of only
    /// after the full timeout.
    pub fn wait_prebuffer_ready(&self, stop: &CancelToken) -> bool {
        let deadline = std::time::Instant::now() + PREBUFFER_TIMEOUT;

        loop {
            let mut inner = self.inner.lock();
            if inner.prebuffer_ready {
                return true;
            }
            if stop.is_cancelled() {
                return false;
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                tracing::debug!("prebuffer timeout elapsed, starting playback anyway");
                inner.prebuffer_ready = true;
                return true;
            }
            let slice = Self::POLL_SLICE.min(deadline - now);
            self.condvar.wait_for(&mut inner, slice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_ascending_timestamp_order_regardless_of_push_order() {
        let jb = JitterBuffer::new(DEFAULT_CAPACITY, 1);
        jb.push(300, b"c".to_vec());
        jb.push(100, b"a".to_vec());
        jb.push(200, b"b".to_vec());

        assert_eq!(jb.pop().unwrap().0, 100);
        assert_eq!(jb.pop().unwrap().0, 200);
        assert_eq!(jb.pop().unwrap().0, 300);
        assert!(jb.pop().is_none());
    }

    #[test]
    fn overflow_evicts_the_oldest_entry() {
        let jb = JitterBuffer::new(2, 1);
        jb.push(10, b"a".to_vec());
        jb.push(20, b"b".to_vec());
        jb.push(30, b"c".to_vec());

        assert_eq!(jb.len(), 2);
        assert_eq!(jb.pop().unwrap().0, 20);
        assert_eq!(jb.pop().unwrap().0, 30);
    }

    #[test]
    fn threshold_for_enforces_minimum_one() {
        assert_eq!(JitterBuffer::threshold_for(0, 25), 1);
        assert_eq!(JitterBuffer::threshold_for(200, 25), 5);
    }

    #[test]
    fn prebuffer_ready_signals_once_threshold_reached() {
        let jb = JitterBuffer::new(DEFAULT_CAPACITY, 3);
        let stop = CancelToken::new();

        let jb2 = std::sync::Arc::new(jb);
        let jb_clone = jb2.clone();
        let stop2 = stop.clone();
        let handle = std::thread::spawn(move || jb_clone.wait_prebuffer_ready(&stop2));

        std::thread::sleep(Duration::from_millis(10));
        jb2.push(0, vec![]);
        jb2.push(40, vec![]);
        jb2.push(80, vec![]);

        assert!(handle.join().unwrap());
    }

    #[test]
    fn wait_prebuffer_ready_returns_false_when_cancelled() {
        let jb = JitterBuffer::new(DEFAULT_CAPACITY, 5);
        let stop = CancelToken::new();
        stop.cancel();
        assert!(!jb.wait_prebuffer_ready(&stop));
    }
}
