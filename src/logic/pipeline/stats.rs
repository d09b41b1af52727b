//! Pipeline Statistics - lock-free counters updated from the capture thread

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_captured: AtomicU64,
    frames_classified: AtomicU64,
    inference_failures: AtomicU64,
    latency_sum_us: AtomicU64,
}

/// Snapshot for UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatsSnapshot {
    pub frames_captured: u64,
    pub frames_classified: u64,
    pub inference_failures: u64,
    pub avg_latency_ms: f32,
}

impl PipelineStats {
    pub fn record_frame(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, inference_time_us: u64) {
        self.frames_classified.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        let classified = self.frames_classified.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if classified > 0 { (sum as f32 / classified as f32) / 1000.0 } else { 0.0 };

        PipelineStatsSnapshot {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            frames_classified: classified,
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_latency() {
        let stats = PipelineStats::default();
        assert_eq!(stats.snapshot().avg_latency_ms, 0.0);

        stats.record_success(2_000);
        stats.record_success(4_000);
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.frames_classified, 2);
        assert_eq!(snap.inference_failures, 1);
        assert!((snap.avg_latency_ms - 3.0).abs() < 1e-6);
    }
}
