//! Practice Monitor
//!
//! Wires the posture pipeline for one practice session:
//! - Frame gate (10 Hz rate limit, overlapping frames dropped)
//! - Posture classification
//! - Calibration gate and alert escalator fed from the same metrics
//! - Status feed for presentation, session report on stop

mod clock;
mod config;
mod frame_gate;
mod monitor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use frame_gate::{FrameGate, FrameGateConfig, ProcessingGuard, ProcessingPermit};
pub use monitor::{DropReason, FrameOutcome, FrameReport, MonitorStatus, PracticeMonitor, SessionReport};

use thiserror::Error;

/// Monitor error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Posture error: {0}")]
    Posture(#[from] posture::PostureError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] calibration::CalibrationError),

    #[error("Alert error: {0}")]
    Alert(#[from] alerting::AlertError),
}
