//! Actuation channels and per-severity alert patterns

use posture::Severity;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Actuator failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Channel unavailable: {0}")]
    Unavailable(String),

    #[error("Actuation failed: {0}")]
    Failed(String),
}

/// One vibration pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pulse {
    /// Motor on time (milliseconds)
    pub on_ms: u64,
    /// Pause after the pulse (milliseconds)
    pub off_ms: u64,
    /// Motor strength (0-255)
    pub amplitude: u8,
}

/// Haptic pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibrationPattern {
    pub pulses: Vec<Pulse>,
}

impl VibrationPattern {
    /// Three short pulses for warnings, three longer and stronger ones for critical
    pub fn for_severity(severity: Severity) -> Self {
        let pulse = match severity {
            Severity::Good => return Self { pulses: Vec::new() },
            Severity::Warning => Pulse {
                on_ms: 200,
                off_ms: 100,
                amplitude: 128,
            },
            Severity::Critical => Pulse {
                on_ms: 500,
                off_ms: 200,
                amplitude: 255,
            },
        };
        Self {
            pulses: vec![pulse; 3],
        }
    }

    /// Total pattern length (milliseconds)
    pub fn total_ms(&self) -> u64 {
        self.pulses.iter().map(|p| p.on_ms + p.off_ms).sum()
    }
}

/// Audio cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Warning,
    Critical,
}

impl SoundCue {
    pub fn for_severity(severity: Severity) -> Option<Self> {
        match severity {
            Severity::Good => None,
            Severity::Warning => Some(SoundCue::Warning),
            Severity::Critical => Some(SoundCue::Critical),
        }
    }

    /// Asset identifier
    pub fn id(self) -> &'static str {
        match self {
            SoundCue::Warning => "posture_warning",
            SoundCue::Critical => "posture_critical",
        }
    }
}

/// Haptic and audio actuator.
///
/// Called off the frame-processing path; implementations may block.
pub trait AlertChannel: Send + Sync {
    fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), ChannelError>;

    fn play_sound(&self, cue: SoundCue) -> Result<(), ChannelError>;
}

/// Channel that only writes alerts to the log.
///
/// Used where no haptic or audio hardware exists (replays, headless runs).
#[derive(Debug, Clone, Default)]
pub struct TracingChannel;

impl AlertChannel for TracingChannel {
    fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), ChannelError> {
        info!(
            "Vibrate: {} pulse(s), {} ms total",
            pattern.pulses.len(),
            pattern.total_ms()
        );
        Ok(())
    }

    fn play_sound(&self, cue: SoundCue) -> Result<(), ChannelError> {
        match cue {
            SoundCue::Warning => info!("Play sound: {}", cue.id()),
            SoundCue::Critical => warn!("Play sound: {}", cue.id()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_pattern_is_longer_and_stronger() {
        let warning = VibrationPattern::for_severity(Severity::Warning);
        let critical = VibrationPattern::for_severity(Severity::Critical);
        assert_eq!(warning.pulses.len(), 3);
        assert_eq!(critical.pulses.len(), 3);
        assert!(critical.total_ms() > warning.total_ms());
        assert!(critical.pulses[0].amplitude > warning.pulses[0].amplitude);
    }

    #[test]
    fn test_good_has_no_actuation() {
        assert!(VibrationPattern::for_severity(Severity::Good).pulses.is_empty());
        assert!(SoundCue::for_severity(Severity::Good).is_none());
    }
}
