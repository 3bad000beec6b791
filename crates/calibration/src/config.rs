//! Calibration gate configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::CalibrationError;

/// Calibration gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Grace window after hands disappear while aligned (milliseconds)
    pub hand_loss_buffer_ms: u64,

    /// Continuous aligned time required before ready (milliseconds)
    pub dwell_ms: u64,

    /// Require good distance and posture, not just face and hands
    pub posture_gate_enabled: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            hand_loss_buffer_ms: 1000,
            dwell_ms: 1000,
            posture_gate_enabled: false,
        }
    }
}

impl CalibrationConfig {
    /// Create strict config (posture gate on, longer dwell)
    pub fn strict() -> Self {
        Self {
            dwell_ms: 2000,
            hand_loss_buffer_ms: 500,
            posture_gate_enabled: true,
        }
    }

    /// Create lenient config (short dwell, long hand-loss buffer)
    pub fn lenient() -> Self {
        Self {
            dwell_ms: 500,
            hand_loss_buffer_ms: 2000,
            ..Default::default()
        }
    }

    pub fn hand_loss_buffer(&self) -> Duration {
        Duration::from_millis(self.hand_loss_buffer_ms)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.dwell_ms == 0 {
            return Err(CalibrationError::InvalidConfig {
                field: "dwell_ms",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}
