//! Running posture summary over a practice session

use serde::{Deserialize, Serialize};

use crate::metrics::{PostureMetrics, Severity};
use crate::scoring::PostureSample;

/// Running mean of one metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct RunningMean {
    mean: f64,
    count: u64,
}

impl RunningMean {
    fn push(&mut self, value: f32) {
        self.count += 1;
        self.mean += (value as f64 - self.mean) / self.count as f64;
    }

    fn value(&self) -> Option<f32> {
        (self.count > 0).then_some(self.mean as f32)
    }
}

/// Accumulated posture over the frames of one session.
///
/// Only frames with a detected face count, and each metric only
/// averages frames where it was measured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostureSummary {
    spine: RunningMean,
    proximity: RunningMean,
    head: RunningMean,
    /// Frames with a face
    pub frames: u64,
    pub good_frames: u64,
    pub warning_frames: u64,
    pub critical_frames: u64,
}

impl PostureSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one classified frame
    pub fn record(&mut self, metrics: &PostureMetrics) {
        if !metrics.face_detected {
            return;
        }
        self.frames += 1;
        match metrics.severity {
            Severity::Good => self.good_frames += 1,
            Severity::Warning => self.warning_frames += 1,
            Severity::Critical => self.critical_frames += 1,
        }
        if metrics.measured.spine {
            self.spine.push(metrics.spine_deviation_deg);
        }
        if metrics.measured.proximity {
            self.proximity.push(metrics.proximity_estimate);
        }
        if metrics.measured.head {
            self.head.push(metrics.head_tilt_deg.abs());
        }
    }

    /// Averaged sample, once every metric has at least one measurement
    pub fn sample(&self) -> Option<PostureSample> {
        Some(PostureSample {
            spine_angle: self.spine.value()?,
            eye_distance: self.proximity.value()?,
            head_tilt: self.head.value()?,
        })
    }

    /// Share of face frames graded good (0-1)
    pub fn good_ratio(&self) -> f32 {
        if self.frames == 0 {
            return 0.0;
        }
        self.good_frames as f32 / self.frames as f32
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
