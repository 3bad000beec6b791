//! Posture classifier configuration

use serde::{Deserialize, Serialize};

use crate::{require_positive, require_unit, PostureError};

/// Posture classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Nose confidence required to count a face as detected
    pub face_confidence: f32,

    /// Wrist confidence required to count a hand as visible
    pub hand_confidence: f32,

    /// Normalized y a wrist must exceed to be on the practice surface
    pub hand_region_y: f32,

    /// Confidence required for eye, ear, and shoulder points used in geometry
    pub landmark_confidence: f32,

    /// Maximum shoulder-line deviation (degrees)
    pub spine_threshold_deg: f32,

    /// Maximum absolute ear-line tilt (degrees)
    pub head_tilt_threshold_deg: f32,

    /// Minimum camera distance estimate (distance units)
    pub proximity_threshold: f32,

    /// Distance at which the eyes are `reference_eye_separation` apart
    pub reference_distance: f32,

    /// Normalized eye separation observed at `reference_distance`
    pub reference_eye_separation: f32,

    /// A single angular failure beyond this multiple of its threshold is critical
    pub critical_factor: f32,

    /// A proximity estimate below this fraction of its threshold is critical
    pub proximity_critical_ratio: f32,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            face_confidence: 0.3,
            hand_confidence: 0.5,
            hand_region_y: 0.6,
            landmark_confidence: 0.3,
            spine_threshold_deg: 15.0,
            head_tilt_threshold_deg: 20.0,
            proximity_threshold: 30.0,
            reference_distance: 40.0,
            reference_eye_separation: 0.1,
            critical_factor: 1.5,
            proximity_critical_ratio: 0.7,
        }
    }
}

impl PostureConfig {
    /// Create strict config (tighter angles, more distance)
    pub fn strict() -> Self {
        Self {
            spine_threshold_deg: 10.0,
            head_tilt_threshold_deg: 15.0,
            proximity_threshold: 35.0,
            ..Default::default()
        }
    }

    /// Create lenient config (looser angles, less distance)
    pub fn lenient() -> Self {
        Self {
            spine_threshold_deg: 20.0,
            head_tilt_threshold_deg: 25.0,
            proximity_threshold: 25.0,
            ..Default::default()
        }
    }

    /// Check every field for programmer errors
    pub fn validate(&self) -> Result<(), PostureError> {
        require_unit("face_confidence", self.face_confidence)?;
        require_unit("hand_confidence", self.hand_confidence)?;
        require_unit("hand_region_y", self.hand_region_y)?;
        require_unit("landmark_confidence", self.landmark_confidence)?;
        require_positive("spine_threshold_deg", self.spine_threshold_deg)?;
        require_positive("head_tilt_threshold_deg", self.head_tilt_threshold_deg)?;
        require_positive("proximity_threshold", self.proximity_threshold)?;
        require_positive("reference_distance", self.reference_distance)?;
        require_positive("reference_eye_separation", self.reference_eye_separation)?;
        require_positive("proximity_critical_ratio", self.proximity_critical_ratio)?;

        if !self.critical_factor.is_finite() || self.critical_factor < 1.0 {
            return Err(PostureError::InvalidConfig {
                field: "critical_factor",
                value: self.critical_factor as f64,
                reason: "must be at least 1",
            });
        }
        if self.proximity_critical_ratio > 1.0 {
            return Err(PostureError::InvalidConfig {
                field: "proximity_critical_ratio",
                value: self.proximity_critical_ratio as f64,
                reason: "must not exceed 1",
            });
        }
        Ok(())
    }
}
