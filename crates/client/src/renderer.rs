//! Paced renderer thread: pops frames from the jitter buffer in
//! timestamp order and delivers them to a [`FrameSink`] at a fixed rate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mjpegcast::CancelToken;

use crate::jitter::JitterBuffer;
use crate::sink::FrameSink;

/// How long to wait before retrying when the buffer is momentarily empty.
const EMPTY_RETRY: Duration = Duration::from_millis(20);

/// Run the paced renderer until `stop` is cancelled.
///
/// Blocks on prebuffer readiness first. Does not accelerate to catch up
/// when the buffer refills after running dry — each tick waits out the
/// full remaining interval computed from the *previous* tick, not from
/// whenever the buffer happened to have data.
pub fn run(jitter: Arc<JitterBuffer>, sink: Arc<dyn FrameSink>, fps: u32, stop: CancelToken) {
    if !jitter.wait_prebuffer_ready(&stop) {
        tracing::info!("renderer cancelled during prebuffer");
        return;
    }

    let frame_interval = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut last_tick = Instant::now();

    tracing::info!(fps, "renderer started");

    while !stop.is_cancelled() {
        let Some((_timestamp, frame)) = jitter.pop() else {
            if stop.wait_timeout(EMPTY_RETRY) {
                break;
            }
            continue;
        };

        if let Err(e) = sink.render(&frame) {
            tracing::warn!(error = %e, "frame sink render failed");
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;

        if elapsed < frame_interval {
            let to_sleep = frame_interval - elapsed;
            if stop.wait_timeout(to_sleep) {
                break;
            }
        }
    }

    tracing::info!("renderer stopped");
}
