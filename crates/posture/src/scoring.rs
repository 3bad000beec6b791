//! Session posture scoring and the combined handwriting + posture grade
//!
//! Scores start at 100 and lose points per metric:
//! - below the warning level: no penalty
//! - between warning and critical: linear, up to half the metric's maximum
//! - at or beyond critical: the full maximum

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::metrics::Severity;
use crate::{require_positive, PostureError};

/// Maximum penalty for spine deviation
pub const SPINE_PENALTY_MAX: f32 = 30.0;
/// Maximum penalty for eye distance
pub const EYE_DISTANCE_PENALTY_MAX: f32 = 40.0;
/// Maximum penalty for head tilt
pub const HEAD_TILT_PENALTY_MAX: f32 = 30.0;

/// Weight of handwriting in the combined score
pub const HANDWRITING_WEIGHT: f32 = 0.7;
/// Weight of posture in the combined score
pub const POSTURE_WEIGHT: f32 = 0.3;

/// Averaged posture over a practice session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureSample {
    /// Spine deviation (degrees)
    pub spine_angle: f32,
    /// Camera distance estimate (distance units)
    pub eye_distance: f32,
    /// Absolute head tilt (degrees)
    pub head_tilt: f32,
}

/// Scoring thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub spine_warning: f32,
    pub spine_critical: f32,
    /// Eye distance at or below which a warning applies
    pub eye_warning: f32,
    /// Eye distance at or below which the full penalty applies
    pub eye_critical: f32,
    pub head_warning: f32,
    pub head_critical: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            spine_warning: 10.0,
            spine_critical: 20.0,
            eye_warning: 35.0,
            eye_critical: 25.0,
            head_warning: 15.0,
            head_critical: 30.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), PostureError> {
        require_positive("spine_warning", self.spine_warning)?;
        require_positive("spine_critical", self.spine_critical)?;
        require_positive("eye_warning", self.eye_warning)?;
        require_positive("eye_critical", self.eye_critical)?;
        require_positive("head_warning", self.head_warning)?;
        require_positive("head_critical", self.head_critical)?;

        if self.spine_critical <= self.spine_warning {
            return Err(PostureError::InvalidConfig {
                field: "spine_critical",
                value: self.spine_critical as f64,
                reason: "must exceed spine_warning",
            });
        }
        if self.head_critical <= self.head_warning {
            return Err(PostureError::InvalidConfig {
                field: "head_critical",
                value: self.head_critical as f64,
                reason: "must exceed head_warning",
            });
        }
        if self.eye_critical >= self.eye_warning {
            return Err(PostureError::InvalidConfig {
                field: "eye_critical",
                value: self.eye_critical as f64,
                reason: "must be below eye_warning",
            });
        }
        Ok(())
    }
}

/// A posture problem severe enough to mention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostureIssue {
    SpineCurved { angle: f32 },
    TooClose { distance: f32 },
    HeadTilted { angle: f32 },
}

impl PostureIssue {
    /// Short corrective instruction
    pub fn hint(&self) -> &'static str {
        match self {
            PostureIssue::SpineCurved { .. } => "sit up straight and keep your back upright",
            PostureIssue::TooClose { .. } => "move back and keep a proper distance from the page",
            PostureIssue::HeadTilted { .. } => "level your head and look straight ahead",
        }
    }
}

impl fmt::Display for PostureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostureIssue::SpineCurved { angle } => write!(f, "spine strongly curved ({:.1}°)", angle),
            PostureIssue::TooClose { distance } => write!(f, "too close to the camera ({:.1})", distance),
            PostureIssue::HeadTilted { angle } => write!(f, "head strongly tilted ({:.1}°)", angle),
        }
    }
}

/// Result of scoring a session's posture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureAssessment {
    pub is_correct: bool,
    /// 0-100
    pub score: f32,
    pub level: Severity,
    pub issues: Vec<PostureIssue>,
    pub feedback: String,
    pub sample: PostureSample,
}

/// Threshold/penalty posture scorer
#[derive(Debug, Clone)]
pub struct PostureScorer {
    config: ScoringConfig,
}

impl PostureScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, PostureError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Score an averaged posture sample
    pub fn score(&self, sample: &PostureSample) -> PostureAssessment {
        let cfg = &self.config;
        let mut issues = Vec::new();

        let spine_penalty = rising_penalty(sample.spine_angle, cfg.spine_warning, cfg.spine_critical, SPINE_PENALTY_MAX);
        if spine_penalty > 0.0 && sample.spine_angle >= cfg.spine_critical {
            issues.push(PostureIssue::SpineCurved { angle: sample.spine_angle });
        }

        let eye_penalty = falling_penalty(sample.eye_distance, cfg.eye_warning, cfg.eye_critical, EYE_DISTANCE_PENALTY_MAX);
        if eye_penalty > 0.0 && sample.eye_distance <= cfg.eye_critical {
            issues.push(PostureIssue::TooClose { distance: sample.eye_distance });
        }

        let head_penalty = rising_penalty(sample.head_tilt, cfg.head_warning, cfg.head_critical, HEAD_TILT_PENALTY_MAX);
        if head_penalty > 0.0 && sample.head_tilt >= cfg.head_critical {
            issues.push(PostureIssue::HeadTilted { angle: sample.head_tilt });
        }

        let score = (100.0 - spine_penalty - eye_penalty - head_penalty).clamp(0.0, 100.0);
        let level = self.level(sample);
        let feedback = feedback_for(&issues, score);

        debug!("Posture scored {:.1} ({}), {} issue(s)", score, level, issues.len());

        PostureAssessment {
            is_correct: level == Severity::Good,
            score,
            level,
            issues,
            feedback,
            sample: *sample,
        }
    }

    fn level(&self, s: &PostureSample) -> Severity {
        let cfg = &self.config;
        let critical = s.spine_angle >= cfg.spine_critical
            || s.eye_distance <= cfg.eye_critical
            || s.head_tilt >= cfg.head_critical;
        if critical {
            return Severity::Critical;
        }
        let warning = s.spine_angle >= cfg.spine_warning
            || s.eye_distance <= cfg.eye_warning
            || s.head_tilt >= cfg.head_warning;
        if warning {
            Severity::Warning
        } else {
            Severity::Good
        }
    }
}

impl Default for PostureScorer {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}

/// Penalty for a metric where larger is worse
fn rising_penalty(value: f32, warning: f32, critical: f32, max: f32) -> f32 {
    if value < warning {
        0.0
    } else if value < critical {
        (value - warning) / (critical - warning) * (max * 0.5)
    } else {
        max
    }
}

/// Penalty for a metric where smaller is worse
fn falling_penalty(value: f32, warning: f32, critical: f32, max: f32) -> f32 {
    if value >= warning {
        0.0
    } else if value > critical {
        (warning - value) / (warning - critical) * (max * 0.5)
    } else {
        max
    }
}

fn feedback_for(issues: &[PostureIssue], score: f32) -> String {
    if issues.is_empty() {
        return if score >= 95.0 {
            "Posture is spot on, keep it up!".to_string()
        } else {
            "Good posture, a small adjustment would make it perfect.".to_string()
        };
    }
    let hints: Vec<&str> = issues.iter().map(PostureIssue::hint).collect();
    let mut text = hints.join(", ");
    if let Some(first) = text.chars().next() {
        let upper = first.to_uppercase().to_string();
        text.replace_range(..first.len_utf8(), &upper);
    }
    text.push('.');
    text
}

/// Overall grade for a practice attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    NeedsPractice,
    Pass,
    Good,
    Excellent,
}

impl Grade {
    pub fn from_score(score: f32) -> Self {
        if score >= 90.0 {
            Grade::Excellent
        } else if score >= 80.0 {
            Grade::Good
        } else if score >= 60.0 {
            Grade::Pass
        } else {
            Grade::NeedsPractice
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Pass => "pass",
            Grade::NeedsPractice => "needs practice",
        })
    }
}

/// Handwriting and posture combined into one result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    pub total_score: f32,
    pub handwriting_score: f32,
    pub posture_score: f32,
    pub grade: Grade,
    pub feedback: String,
}

/// Combine an externally computed handwriting score (0-100) with the
/// session's posture assessment. No assessment means no posture penalty.
pub fn combine(handwriting_score: f32, posture: Option<&PostureAssessment>) -> CombinedScore {
    let handwriting = handwriting_score.clamp(0.0, 100.0);
    let posture_score = posture.map_or(100.0, |p| p.score);
    let total = handwriting * HANDWRITING_WEIGHT + posture_score * POSTURE_WEIGHT;

    let mut feedback = String::from(if handwriting >= 90.0 {
        "Beautiful handwriting"
    } else if handwriting >= 70.0 {
        "Nice handwriting"
    } else if handwriting >= 60.0 {
        "Decent handwriting"
    } else {
        "Your handwriting needs more practice"
    });
    if let Some(p) = posture {
        if p.is_correct {
            feedback.push_str(if p.score >= 90.0 {
                ", and your posture is excellent too"
            } else {
                ", and your posture is good"
            });
        } else {
            feedback.push_str(", but ");
            feedback.push_str(&p.feedback.trim_end_matches('.').to_lowercase());
        }
    }
    feedback.push('!');

    CombinedScore {
        total_score: round1(total),
        handwriting_score: round1(handwriting),
        posture_score: round1(posture_score),
        grade: Grade::from_score(total),
        feedback,
    }
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(spine_angle: f32, eye_distance: f32, head_tilt: f32) -> PostureSample {
        PostureSample {
            spine_angle,
            eye_distance,
            head_tilt,
        }
    }

    #[test]
    fn test_perfect_posture() {
        let result = PostureScorer::default().score(&sample(3.0, 45.0, 5.0));
        assert_eq!(result.score, 100.0);
        assert_eq!(result.level, Severity::Good);
        assert!(result.is_correct);
        assert!(result.issues.is_empty());
        assert_eq!(result.feedback, "Posture is spot on, keep it up!");
    }

    #[test]
    fn test_linear_penalty_between_levels() {
        // spine halfway between 10 and 20 -> 7.5 points
        let result = PostureScorer::default().score(&sample(15.0, 45.0, 0.0));
        assert!((result.score - 92.5).abs() < 1e-4);
        assert_eq!(result.level, Severity::Warning);
        assert!(result.issues.is_empty());
        assert_eq!(result.feedback, "Good posture, a small adjustment would make it perfect.");
    }

    #[test]
    fn test_full_penalties_at_critical() {
        let result = PostureScorer::default().score(&sample(25.0, 20.0, 35.0));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.level, Severity::Critical);
        assert_eq!(result.issues.len(), 3);
        assert!(result.feedback.starts_with("Sit up straight"));
        assert!(result.feedback.ends_with('.'));
    }

    #[test]
    fn test_eye_distance_penalty() {
        // 30 is halfway between 35 and 25 -> 10 points
        let result = PostureScorer::default().score(&sample(0.0, 30.0, 0.0));
        assert!((result.score - 90.0).abs() < 1e-4);

        let result = PostureScorer::default().score(&sample(0.0, 25.0, 0.0));
        assert_eq!(result.score, 60.0);
        assert_eq!(result.issues, vec![PostureIssue::TooClose { distance: 25.0 }]);
    }

    #[test]
    fn test_invalid_scoring_config() {
        let config = ScoringConfig {
            eye_critical: 40.0,
            ..Default::default()
        };
        assert!(PostureScorer::new(config).is_err());
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(95.0), Grade::Excellent);
        assert_eq!(Grade::from_score(80.0), Grade::Good);
        assert_eq!(Grade::from_score(60.0), Grade::Pass);
        assert_eq!(Grade::from_score(59.9), Grade::NeedsPractice);
    }

    #[test]
    fn test_combine_weights() {
        let posture = PostureScorer::default().score(&sample(3.0, 45.0, 5.0));
        let combined = combine(80.0, Some(&posture));
        // 80 * 0.7 + 100 * 0.3
        assert!((combined.total_score - 86.0).abs() < 1e-3);
        assert_eq!(combined.grade, Grade::Good);
        assert_eq!(
            combined.feedback,
            "Nice handwriting, and your posture is excellent too!"
        );
    }

    #[test]
    fn test_combine_without_posture() {
        let combined = combine(90.0, None);
        assert!((combined.total_score - 93.0).abs() < 1e-3);
        assert_eq!(combined.posture_score, 100.0);
        assert_eq!(combined.grade, Grade::Excellent);
    }

    #[test]
    fn test_combine_with_bad_posture_feedback() {
        let posture = PostureScorer::default().score(&sample(25.0, 45.0, 0.0));
        let combined = combine(95.0, Some(&posture));
        assert_eq!(
            combined.feedback,
            "Beautiful handwriting, but sit up straight and keep your back upright!"
        );
    }
}
