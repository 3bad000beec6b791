//! Posture Classification
//!
//! Turns one frame of body landmarks into posture metrics:
//! - Spine deviation from the shoulder line
//! - Camera distance estimate from eye separation
//! - Head tilt from the ear line
//! - Face and hand presence
//! - Severity grading (good / warning / critical)
//!
//! Also provides session-level posture scoring and the combined
//! handwriting + posture grade.

pub mod classifier;
pub mod config;
pub mod metrics;
pub mod scoring;
pub mod summary;

pub use classifier::PostureClassifier;
pub use config::PostureConfig;
pub use metrics::{Measured, PostureCheck, PostureMetrics, Severity};
pub use scoring::{
    combine, CombinedScore, Grade, PostureAssessment, PostureIssue, PostureSample, PostureScorer,
    ScoringConfig,
};
pub use summary::PostureSummary;

use thiserror::Error;

/// Posture error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostureError {
    #[error("Invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Reject non-finite or non-positive values
pub(crate) fn require_positive(field: &'static str, value: f32) -> Result<(), PostureError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PostureError::InvalidConfig {
            field,
            value: value as f64,
            reason: "must be a positive finite number",
        });
    }
    Ok(())
}

/// Reject values outside [0, 1]
pub(crate) fn require_unit(field: &'static str, value: f32) -> Result<(), PostureError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PostureError::InvalidConfig {
            field,
            value: value as f64,
            reason: "must be within [0, 1]",
        });
    }
    Ok(())
}
