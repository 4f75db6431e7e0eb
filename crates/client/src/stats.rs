//! Running packet/byte counters, supplemented from the original
//! client's `packets_received`/`bytes_received` fields and `stats_lock`.
//!
//! Unlike the server's per-session counters (plain atomics, since each
//! field is independent), the client groups both counters behind one
//! mutex, matching the original's single `stats_lock` guarding both.

use parking_lot::Mutex;

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    packets_received: u64,
    bytes_received: u64,
}

#[derive(Debug, Default)]
pub struct ClientStats {
    counts: Mutex<Counts>,
}

impl ClientStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self, len: usize) {
        let mut counts = self.counts.lock();
        counts.packets_received += 1;
        counts.bytes_received += len as u64;
    }

    pub fn packets_received(&self) -> u64 {
        self.counts.lock().packets_received
    }

    pub fn bytes_received(&self) -> u64 {
        self.counts.lock().bytes_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_calls() {
        let stats = ClientStats::new();
        stats.record_received(100);
        stats.record_received(200);
        assert_eq!(stats.packets_received(), 2);
        assert_eq!(stats.bytes_received(), 300);
    }
}
