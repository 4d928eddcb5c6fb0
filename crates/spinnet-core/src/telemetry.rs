//! Step telemetry ring.
//!
//! The engine runs tight numeric steps; diagnostics must not slow the hot
//! path down. Recording a frame is a single lock-free push into a
//! pre-allocated ring (oldest frame dropped on overflow), and a consumer
//! (UI, experiment harness) drains the ring off the hot path.
//!
//! Frames are fixed 32-byte `#[repr(C)]` structs so a full ring stays
//! cache-friendly and can be handed to external consumers without copying
//! field by field.

use chrono::{DateTime, Utc};
use crossbeam_queue::ArrayQueue;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// One telemetry frame per engine step.
#[repr(C, align(32))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepFrame {
    /// Simulation step counter.
    pub step: u64,
    /// Nanoseconds since engine start.
    pub timestamp_ns: u64,
    /// Total edge-weight "energy" Σ w after the step.
    pub total_weight: f32,
    /// Mean edge curvature of the step's curvature pass.
    pub mean_curvature: f32,
    /// Scheduler sweep acceptance rate (accepted/total), 1.0 for plain steps.
    pub acceptance_rate: f32,
    /// Colors used by the active coloring (0 when uncolored).
    pub colors_used: f32,
}

/// Ring health counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryStats {
    /// Total frames pushed since creation.
    pub total_frames: u64,
    /// Frames dropped because the ring was full.
    pub dropped_frames: u64,
    /// Current ring utilization in [0, 1].
    pub buffer_utilization: f32,
}

/// Export record wrapping a drained ring with a wall-clock timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryExport {
    pub recorded_at: DateTime<Utc>,
    pub stats: TelemetryStats,
    pub frames: Vec<StepFrame>,
}

/// Lock-free telemetry ring, one per engine instance.
pub struct TelemetryRing {
    ring: ArrayQueue<StepFrame>,
    total: AtomicU64,
    dropped: AtomicU64,
}

/// Default capacity: 100k steps of history.
const DEFAULT_CAPACITY: usize = 100_000;

impl Default for TelemetryRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl TelemetryRing {
    /// Creates a ring holding at most `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: ArrayQueue::new(capacity.max(1)),
            total: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Records a frame. Lock-free; drops the oldest frame when full.
    pub fn record(&self, frame: StepFrame) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let mut frame = frame;
        while let Err(rejected) = self.ring.push(frame) {
            frame = rejected;
            if self.ring.pop().is_some() {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Drains all buffered frames, oldest first.
    pub fn drain(&self) -> Vec<StepFrame> {
        let mut out = Vec::with_capacity(self.ring.len());
        while let Some(frame) = self.ring.pop() {
            out.push(frame);
        }
        out
    }

    /// Current health counters.
    pub fn stats(&self) -> TelemetryStats {
        TelemetryStats {
            total_frames: self.total.load(Ordering::Relaxed),
            dropped_frames: self.dropped.load(Ordering::Relaxed),
            buffer_utilization: self.ring.len() as f32 / self.ring.capacity() as f32,
        }
    }

    /// Drains the ring into a timestamped export record.
    pub fn export(&self) -> TelemetryExport {
        TelemetryExport {
            recorded_at: Utc::now(),
            stats: self.stats(),
            frames: self.drain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(step: u64) -> StepFrame {
        StepFrame {
            step,
            timestamp_ns: step * 1_000,
            total_weight: 1.0,
            mean_curvature: 0.0,
            acceptance_rate: 1.0,
            colors_used: 0.0,
        }
    }

    #[test]
    fn test_record_and_drain_in_order() {
        let ring = TelemetryRing::with_capacity(16);
        for s in 0..5 {
            ring.record(frame(s));
        }
        let frames = ring.drain();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].step, 0);
        assert_eq!(frames[4].step, 4);
        assert!(ring.drain().is_empty());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let ring = TelemetryRing::with_capacity(4);
        for s in 0..10 {
            ring.record(frame(s));
        }
        let frames = ring.drain();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].step, 6);

        let stats = ring.stats();
        assert_eq!(stats.total_frames, 10);
        assert_eq!(stats.dropped_frames, 6);
    }

    #[test]
    fn test_export_serializes() {
        let ring = TelemetryRing::with_capacity(8);
        ring.record(frame(1));
        let export = ring.export();
        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("recorded_at"));
        assert!(json.contains("total_weight"));
    }
}
