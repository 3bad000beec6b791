//! Landmark frame: one observation from the pose estimator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::landmark::{Landmark, LandmarkId};
use crate::LandmarkError;

/// Number of points in a MediaPipe pose result
pub const MEDIAPIPE_POSE_POINTS: usize = 33;

/// Set of named landmarks observed in a single camera frame.
///
/// Any landmark may be missing. Frames are values: once built they are
/// only read by the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<LandmarkId, Landmark>",
    into = "BTreeMap<LandmarkId, Landmark>"
)]
pub struct LandmarkFrame {
    points: BTreeMap<LandmarkId, Landmark>,
}

impl LandmarkFrame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a landmark, rejecting non-finite positions and confidences outside [0, 1]
    pub fn insert(&mut self, id: LandmarkId, landmark: Landmark) -> Result<(), LandmarkError> {
        if !landmark.x.is_finite() || !landmark.y.is_finite() {
            return Err(LandmarkError::NonFinite {
                id,
                x: landmark.x,
                y: landmark.y,
            });
        }
        if !(0.0..=1.0).contains(&landmark.confidence) {
            return Err(LandmarkError::ConfidenceOutOfRange {
                id,
                confidence: landmark.confidence,
            });
        }
        self.points.insert(id, landmark);
        Ok(())
    }

    /// Builder-style insert
    pub fn with(mut self, id: LandmarkId, x: f32, y: f32, confidence: f32) -> Result<Self, LandmarkError> {
        self.insert(id, Landmark::new(x, y, confidence))?;
        Ok(self)
    }

    /// Get a landmark regardless of confidence
    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.points.get(&id)
    }

    /// Get a landmark only if its confidence exceeds `threshold`
    pub fn confident(&self, id: LandmarkId, threshold: f32) -> Option<&Landmark> {
        self.points.get(&id).filter(|p| p.is_confident(threshold))
    }

    /// Get both points of a left/right pair
    pub fn pair(&self, a: LandmarkId, b: LandmarkId) -> Option<(&Landmark, &Landmark)> {
        Some((self.get(a)?, self.get(b)?))
    }

    pub fn contains(&self, id: LandmarkId) -> bool {
        self.points.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LandmarkId, &Landmark)> {
        self.points.iter().map(|(id, p)| (*id, p))
    }

    /// Build a frame from a MediaPipe-layout pose array of `[x, y, visibility]`.
    ///
    /// Short arrays yield only the points they contain. Invalid points
    /// (NaN coordinates, visibility outside [0, 1]) are skipped.
    pub fn from_pose_array(points: &[[f32; 3]]) -> Self {
        let mut frame = Self::new();
        for id in LandmarkId::ALL {
            let Some(&[x, y, visibility]) = points.get(id.mediapipe_index()) else {
                continue;
            };
            if let Err(e) = frame.insert(id, Landmark::new(x, y, visibility)) {
                trace!("Skipping pose point: {}", e);
            }
        }
        frame
    }
}

impl FromIterator<(LandmarkId, Landmark)> for LandmarkFrame {
    /// Collect points, dropping invalid ones
    fn from_iter<T: IntoIterator<Item = (LandmarkId, Landmark)>>(iter: T) -> Self {
        let mut frame = Self::new();
        for (id, landmark) in iter {
            if let Err(e) = frame.insert(id, landmark) {
                trace!("Skipping landmark: {}", e);
            }
        }
        frame
    }
}

/// Strict conversion: the first invalid point fails the whole frame
impl TryFrom<BTreeMap<LandmarkId, Landmark>> for LandmarkFrame {
    type Error = LandmarkError;

    fn try_from(points: BTreeMap<LandmarkId, Landmark>) -> Result<Self, Self::Error> {
        let mut frame = Self::new();
        for (id, landmark) in points {
            frame.insert(id, landmark)?;
        }
        Ok(frame)
    }
}

impl From<LandmarkFrame> for BTreeMap<LandmarkId, Landmark> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.points
    }
}
