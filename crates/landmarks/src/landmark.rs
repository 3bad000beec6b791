//! Named landmark identifiers and points

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::LandmarkError;

/// Body points the posture pipeline reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkId {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftWrist,
    RightWrist,
}

impl LandmarkId {
    /// Every known landmark, in MediaPipe index order
    pub const ALL: [LandmarkId; 9] = [
        LandmarkId::Nose,
        LandmarkId::LeftEye,
        LandmarkId::RightEye,
        LandmarkId::LeftEar,
        LandmarkId::RightEar,
        LandmarkId::LeftShoulder,
        LandmarkId::RightShoulder,
        LandmarkId::LeftWrist,
        LandmarkId::RightWrist,
    ];

    /// Index of this point in a 33-point MediaPipe pose result
    pub fn mediapipe_index(self) -> usize {
        match self {
            LandmarkId::Nose => 0,
            LandmarkId::LeftEye => 2,
            LandmarkId::RightEye => 5,
            LandmarkId::LeftEar => 7,
            LandmarkId::RightEar => 8,
            LandmarkId::LeftShoulder => 11,
            LandmarkId::RightShoulder => 12,
            LandmarkId::LeftWrist => 15,
            LandmarkId::RightWrist => 16,
        }
    }

    /// Snake-case name used in serialized frames
    pub fn as_str(self) -> &'static str {
        match self {
            LandmarkId::Nose => "nose",
            LandmarkId::LeftEye => "left_eye",
            LandmarkId::RightEye => "right_eye",
            LandmarkId::LeftEar => "left_ear",
            LandmarkId::RightEar => "right_ear",
            LandmarkId::LeftShoulder => "left_shoulder",
            LandmarkId::RightShoulder => "right_shoulder",
            LandmarkId::LeftWrist => "left_wrist",
            LandmarkId::RightWrist => "right_wrist",
        }
    }
}

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkId {
    type Err = LandmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LandmarkId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| LandmarkError::UnknownName(s.to_string()))
    }
}

/// A single detected point (normalized image coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0 = left edge, 1 = right edge
    pub x: f32,
    /// Vertical position, 0 = top edge, 1 = bottom edge
    pub y: f32,
    /// Detector confidence (0-1)
    pub confidence: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Whether the detector is more than `threshold` sure about this point
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }

    /// Euclidean distance to another point in normalized units
    pub fn distance_to(&self, other: &Landmark) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for id in LandmarkId::ALL {
            assert_eq!(id.as_str().parse::<LandmarkId>().unwrap(), id);
        }
        assert!("left_knee".parse::<LandmarkId>().is_err());
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        let json = serde_json::to_string(&LandmarkId::RightShoulder).unwrap();
        assert_eq!(json, "\"right_shoulder\"");
    }

    #[test]
    fn test_confidence_is_strict() {
        let point = Landmark::new(0.5, 0.5, 0.3);
        assert!(!point.is_confident(0.3));
        assert!(point.is_confident(0.29));
    }

    #[test]
    fn test_distance() {
        let a = Landmark::new(0.0, 0.0, 1.0);
        let b = Landmark::new(0.3, 0.4, 1.0);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-6);
    }
}
