use std::time::Duration;

use crate::minimap::FrameReport;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackingStatsSnapshot {
    pub frames_per_second: f32,
    pub avg_markers_written: f32,
    pub avg_markers_clamped: f32,
    pub entities_skipped: u32,
    pub focal_missing_frames: u32,
    pub scale: f32,
}

/// Aggregates frame reports over an interval of simulated time.
#[derive(Debug)]
pub struct TrackingStatsAccumulator {
    interval: Duration,
    elapsed: Duration,
    frames: u32,
    written: u64,
    clamped: u64,
    skipped: u32,
    focal_missing: u32,
    last_scale: f32,
}

impl TrackingStatsAccumulator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            frames: 0,
            written: 0,
            clamped: 0,
            skipped: 0,
            focal_missing: 0,
            last_scale: 0.0,
        }
    }

    pub fn record_frame(&mut self, frame_dt: Duration, report: &FrameReport) {
        self.elapsed = self.elapsed.saturating_add(frame_dt);
        self.frames = self.frames.saturating_add(1);
        self.written = self.written.saturating_add(u64::from(report.markers_written));
        self.clamped = self.clamped.saturating_add(u64::from(report.markers_clamped));
        self.skipped = self.skipped.saturating_add(report.entities_skipped);
        if report.focal_missing {
            self.focal_missing = self.focal_missing.saturating_add(1);
        }
        self.last_scale = report.scale;
    }

    pub fn maybe_snapshot(&mut self) -> Option<TrackingStatsSnapshot> {
        if self.elapsed < self.interval || self.frames == 0 {
            return None;
        }

        let elapsed_seconds = self.elapsed.as_secs_f32().max(f32::EPSILON);
        let frames = self.frames as f32;
        let snapshot = TrackingStatsSnapshot {
            frames_per_second: frames / elapsed_seconds,
            avg_markers_written: self.written as f32 / frames,
            avg_markers_clamped: self.clamped as f32 / frames,
            entities_skipped: self.skipped,
            focal_missing_frames: self.focal_missing,
            scale: self.last_scale,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.written = 0;
        self.clamped = 0;
        self.skipped = 0;
        self.focal_missing = 0;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(written: u32, clamped: u32, skipped: u32, scale: f32) -> FrameReport {
        FrameReport {
            frame_index: 0,
            scale,
            markers_written: written,
            markers_clamped: clamped,
            entities_skipped: skipped,
            focal_missing: false,
        }
    }

    #[test]
    fn snapshot_computes_expected_values() {
        let mut accumulator = TrackingStatsAccumulator::new(Duration::from_secs(1));
        for _ in 0..2 {
            accumulator.record_frame(Duration::from_millis(500), &report(4, 1, 0, 1.5));
        }

        let snapshot = accumulator
            .maybe_snapshot()
            .expect("snapshot should be emitted");

        assert!((snapshot.frames_per_second - 2.0).abs() < 0.05);
        assert!((snapshot.avg_markers_written - 4.0).abs() < 0.001);
        assert!((snapshot.avg_markers_clamped - 1.0).abs() < 0.001);
        assert!((snapshot.scale - 1.5).abs() < 0.001);
    }

    #[test]
    fn snapshot_not_emitted_before_interval() {
        let mut accumulator = TrackingStatsAccumulator::new(Duration::from_secs(1));
        accumulator.record_frame(Duration::from_millis(16), &report(1, 0, 0, 1.0));
        assert!(accumulator.maybe_snapshot().is_none());
    }

    #[test]
    fn snapshot_resets_interval_counters() {
        let mut accumulator = TrackingStatsAccumulator::new(Duration::from_millis(100));
        accumulator.record_frame(Duration::from_millis(100), &report(2, 2, 3, 1.0));
        let first = accumulator.maybe_snapshot().expect("first snapshot");
        assert_eq!(first.entities_skipped, 3);

        accumulator.record_frame(Duration::from_millis(100), &report(0, 0, 0, 1.0));
        let second = accumulator.maybe_snapshot().expect("second snapshot");
        assert_eq!(second.entities_skipped, 0);
        assert!(second.avg_markers_written.abs() < 0.001);
    }
}
