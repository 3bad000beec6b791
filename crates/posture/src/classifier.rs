//! Landmark frame to posture metrics

use landmarks::{Landmark, LandmarkFrame, LandmarkId};
use tracing::{info, trace};

use crate::metrics::{Measured, PostureMetrics, Severity};
use crate::{PostureConfig, PostureError};

/// Stateless posture classifier.
///
/// `classify` is a pure function of the frame and the configuration
/// fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct PostureClassifier {
    config: PostureConfig,
}

impl PostureClassifier {
    /// Create a classifier, rejecting invalid thresholds
    pub fn new(config: PostureConfig) -> Result<Self, PostureError> {
        config.validate()?;
        info!("Creating posture classifier with config: {:?}", config);
        Ok(Self { config })
    }

    pub fn config(&self) -> &PostureConfig {
        &self.config
    }

    /// Classify one frame
    pub fn classify(&self, frame: &LandmarkFrame) -> PostureMetrics {
        let cfg = &self.config;

        let face_detected = frame.confident(LandmarkId::Nose, cfg.face_confidence).is_some();
        let hands_visible = [LandmarkId::LeftWrist, LandmarkId::RightWrist]
            .into_iter()
            .filter_map(|id| frame.confident(id, cfg.hand_confidence))
            .any(|wrist| wrist.y > cfg.hand_region_y);

        let spine = self
            .geometry_pair(frame, LandmarkId::LeftShoulder, LandmarkId::RightShoulder)
            .and_then(|(l, r)| line_tilt_deg(l, r))
            .map(f32::abs);
        let head = self
            .geometry_pair(frame, LandmarkId::LeftEar, LandmarkId::RightEar)
            .and_then(|(l, r)| line_tilt_deg(l, r));
        let proximity = self
            .geometry_pair(frame, LandmarkId::LeftEye, LandmarkId::RightEye)
            .and_then(|(l, r)| self.proximity_from_eyes(l, r));

        let spine_ok = spine.is_some_and(|d| d < cfg.spine_threshold_deg);
        let head_ok = head.is_some_and(|t| t.abs() < cfg.head_tilt_threshold_deg);
        let proximity_ok = proximity.is_some_and(|p| p >= cfg.proximity_threshold);
        let overall_ok = spine_ok && proximity_ok && head_ok;

        let mut metrics = PostureMetrics {
            spine_deviation_deg: spine.unwrap_or(0.0),
            proximity_estimate: proximity.unwrap_or(0.0),
            head_tilt_deg: head.unwrap_or(0.0),
            spine_ok,
            proximity_ok,
            head_ok,
            face_detected,
            hands_visible,
            overall_ok,
            severity: Severity::Good,
            measured: Measured {
                spine: spine.is_some(),
                proximity: proximity.is_some(),
                head: head.is_some(),
            },
        };
        metrics.severity = self.grade(&metrics);

        trace!(
            "Classified frame: spine={:.1} proximity={:.1} tilt={:.1} severity={}",
            metrics.spine_deviation_deg,
            metrics.proximity_estimate,
            metrics.head_tilt_deg,
            metrics.severity
        );
        metrics
    }

    /// Grade severity from the failing checks
    fn grade(&self, m: &PostureMetrics) -> Severity {
        let cfg = &self.config;
        let failing = m.failing_checks();

        match failing.len() {
            0 => Severity::Good,
            1 => {
                // Only a measured failure can be "far" beyond its threshold.
                let far = match failing[0] {
                    crate::PostureCheck::Spine => {
                        m.measured.spine
                            && m.spine_deviation_deg > cfg.spine_threshold_deg * cfg.critical_factor
                    }
                    crate::PostureCheck::HeadTilt => {
                        m.measured.head
                            && m.head_tilt_deg.abs() > cfg.head_tilt_threshold_deg * cfg.critical_factor
                    }
                    crate::PostureCheck::Proximity => {
                        m.measured.proximity
                            && m.proximity_estimate < cfg.proximity_threshold * cfg.proximity_critical_ratio
                    }
                };
                if far {
                    Severity::Critical
                } else {
                    Severity::Warning
                }
            }
            _ => Severity::Critical,
        }
    }

    fn geometry_pair<'a>(
        &self,
        frame: &'a LandmarkFrame,
        a: LandmarkId,
        b: LandmarkId,
    ) -> Option<(&'a Landmark, &'a Landmark)> {
        let threshold = self.config.landmark_confidence;
        Some((frame.confident(a, threshold)?, frame.confident(b, threshold)?))
    }

    /// Inverse-proportional distance model: halving the eye separation
    /// doubles the estimated distance.
    fn proximity_from_eyes(&self, left: &Landmark, right: &Landmark) -> Option<f32> {
        let separation = left.distance_to(right);
        if separation <= f32::EPSILON {
            return None;
        }
        Some(self.config.reference_distance * self.config.reference_eye_separation / separation)
    }
}

/// Signed angle of the line a→b from horizontal, in (-90, 90].
///
/// Independent of point order. Positive when the right-hand end is lower
/// (image y grows downward). `None` for coincident points.
pub fn line_tilt_deg(a: &Landmark, b: &Landmark) -> Option<f32> {
    let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
    if dx.abs() <= f32::EPSILON && dy.abs() <= f32::EPSILON {
        return None;
    }
    if dx < 0.0 {
        dx = -dx;
        dy = -dy;
    }
    let deg = dy.atan2(dx).to_degrees();
    // Vertical lines come out as -90; fold onto +90.
    Some(if deg <= -90.0 { 90.0 } else { deg })
}
