use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics_lock_poisoned_recovered");
    }
}

/// Loop health over the last reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub worst_frame_ms: f32,
    pub dropped_steps: u32,
}

impl LoopMetricsSnapshot {
    /// Compact `key:value` form used by the harness `status` reply.
    pub fn status_fields(&self) -> String {
        format!(
            "fps:{:.1} tps:{:.1} frame_ms:{:.2} worst_ms:{:.2} dropped:{}",
            self.fps, self.tps, self.frame_time_ms, self.worst_frame_ms, self.dropped_steps
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                *poisoned.into_inner() = snapshot;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    dropped_steps: u32,
    frame_time_sum: Duration,
    worst_frame: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval_start: start,
            interval,
            frames: 0,
            ticks: 0,
            dropped_steps: 0,
            frame_time_sum: Duration::ZERO,
            worst_frame: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.worst_frame = self.worst_frame.max(frame_dt);
    }

    pub(crate) fn record_ticks(&mut self, ticks: u32) {
        self.ticks = self.ticks.saturating_add(ticks);
    }

    pub(crate) fn record_dropped_steps(&mut self, dropped: u32) {
        self.dropped_steps = self.dropped_steps.saturating_add(dropped);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            worst_frame_ms: self.worst_frame.as_secs_f32() * 1000.0,
            dropped_steps: self.dropped_steps,
        };

        *self = Self::new(self.interval, now);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn poison_lock(lock: &RwLock<LoopMetricsSnapshot>) {
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    #[test]
    fn window_snapshot_averages_frames_and_counts_ticks() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);

        accumulator.record_frame(Duration::from_millis(10));
        accumulator.record_frame(Duration::from_millis(30));
        accumulator.record_ticks(4);
        accumulator.record_dropped_steps(2);

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("snapshot should be emitted");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.001);
        assert!((snapshot.worst_frame_ms - 30.0).abs() < 0.001);
        assert_eq!(snapshot.dropped_steps, 2);
    }

    #[test]
    fn window_resets_after_snapshot() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);
        accumulator.record_frame(Duration::from_millis(16));
        accumulator.record_dropped_steps(1);

        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
        assert!(accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .is_some());

        let next = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second window");
        assert_eq!(next.fps, 0.0);
        assert_eq!(next.dropped_steps, 0);
    }

    #[test]
    fn status_fields_are_key_value_pairs() {
        let snapshot = LoopMetricsSnapshot {
            fps: 59.96,
            tps: 60.0,
            frame_time_ms: 16.5,
            worst_frame_ms: 21.0,
            dropped_steps: 3,
        };
        assert_eq!(
            snapshot.status_fields(),
            "fps:60.0 tps:60.0 frame_ms:16.50 worst_ms:21.00 dropped:3"
        );
    }

    #[test]
    fn handle_recovers_after_poison_without_panic() {
        let handle = MetricsHandle::default();
        poison_lock(handle.snapshot.as_ref());
        assert_eq!(handle.snapshot(), LoopMetricsSnapshot::default());

        let expected = LoopMetricsSnapshot {
            fps: 15.0,
            tps: 60.0,
            ..LoopMetricsSnapshot::default()
        };
        handle.publish(expected);
        assert_eq!(handle.snapshot(), expected);
    }
}
