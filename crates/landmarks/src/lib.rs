//! Body Landmark Types
//!
//! Data model for pose-estimation output consumed by the posture pipeline:
//! - Closed set of named body points (nose, eyes, ears, shoulders, wrists)
//! - Normalized 2D positions with per-point confidence
//! - Adapter for 33-point MediaPipe pose arrays

pub mod frame;
pub mod landmark;

pub use frame::LandmarkFrame;
pub use landmark::{Landmark, LandmarkId};

use thiserror::Error;

/// Landmark error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("{id} has a non-finite coordinate ({x}, {y})")]
    NonFinite { id: LandmarkId, x: f32, y: f32 },

    #[error("{id} confidence {confidence} is outside [0, 1]")]
    ConfidenceOutOfRange { id: LandmarkId, confidence: f32 },

    #[error("Unknown landmark name: {0}")]
    UnknownName(String),
}
