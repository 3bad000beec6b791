//! Alert escalator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::AlertError;

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalatorConfig {
    /// Minimum time between two alerts (milliseconds)
    pub cooldown_ms: u64,
    /// Consecutive warning-level frames needed to fire
    pub warning_escalation_count: u32,
    /// Initial master switch
    pub enabled: bool,
    /// Initial audio channel switch
    pub sound_enabled: bool,
    /// Initial haptic channel switch
    pub vibration_enabled: bool,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 5000,
            warning_escalation_count: 3,
            enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

impl EscalatorConfig {
    /// Create strict config (alerts sooner and more often)
    pub fn strict() -> Self {
        Self {
            cooldown_ms: 3000,
            warning_escalation_count: 2,
            ..Default::default()
        }
    }

    /// Create lenient config (alerts later and less often)
    pub fn lenient() -> Self {
        Self {
            cooldown_ms: 10_000,
            warning_escalation_count: 5,
            ..Default::default()
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), AlertError> {
        if self.warning_escalation_count == 0 {
            return Err(AlertError::InvalidConfig {
                field: "warning_escalation_count",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
