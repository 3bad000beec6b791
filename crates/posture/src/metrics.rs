//! Per-frame posture metrics and severity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal posture severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Good,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Good => "good",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        })
    }
}

/// The three geometric posture checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureCheck {
    Spine,
    Proximity,
    HeadTilt,
}

/// Which metrics had the landmarks they need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Measured {
    pub spine: bool,
    pub proximity: bool,
    pub head: bool,
}

/// Metrics derived from a single landmark frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostureMetrics {
    /// Shoulder-line deviation (degrees, >= 0)
    pub spine_deviation_deg: f32,

    /// Camera distance estimate (distance units)
    pub proximity_estimate: f32,

    /// Signed ear-line tilt (degrees, positive = right ear lower)
    pub head_tilt_deg: f32,

    pub spine_ok: bool,
    pub proximity_ok: bool,
    pub head_ok: bool,

    /// Nose found with enough confidence
    pub face_detected: bool,

    /// A wrist found on the practice surface
    pub hands_visible: bool,

    /// All three geometric checks passed
    pub overall_ok: bool,

    pub severity: Severity,

    /// Metrics whose landmarks were present (missing ones read as 0)
    pub measured: Measured,
}

impl PostureMetrics {
    /// Checks that did not pass, in a fixed order
    pub fn failing_checks(&self) -> Vec<PostureCheck> {
        let mut failing = Vec::with_capacity(3);
        if !self.spine_ok {
            failing.push(PostureCheck::Spine);
        }
        if !self.proximity_ok {
            failing.push(PostureCheck::Proximity);
        }
        if !self.head_ok {
            failing.push(PostureCheck::HeadTilt);
        }
        failing
    }
}
