//! Calibration Gate
//!
//! Converts a stream of per-frame posture classifications into a single
//! debounced "ready for practice" signal:
//! - Calibration state machine (no face / no hands / misaligned / bad posture / aligned)
//! - Hand-loss buffer masking brief hand dropouts
//! - Stability dwell before readiness
//! - State-change listeners for narration and display

pub mod config;
pub mod gate;
pub mod listener;
pub mod state;
pub mod timer;

pub use config::CalibrationConfig;
pub use gate::{CalibrationGate, GateStatus};
pub use listener::{CalibrationListener, ListenerError, ListenerId, StateChange};
pub use state::{display_for, CalibrationState, StatusColor, StatusDisplay};
pub use timer::{SingleShotTimer, TimerState};

use thiserror::Error;

/// Calibration error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("Invalid configuration: {field} ({reason})")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}
