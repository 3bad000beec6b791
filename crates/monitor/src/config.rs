//! Monitor configuration

use alerting::EscalatorConfig;
use calibration::CalibrationConfig;
use posture::{PostureConfig, ScoringConfig};
use serde::{Deserialize, Serialize};

use crate::frame_gate::FrameGateConfig;
use crate::MonitorError;

/// Full pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub frame_gate: FrameGateConfig,
    pub posture: PostureConfig,
    pub calibration: CalibrationConfig,
    pub alerts: EscalatorConfig,
    pub scoring: ScoringConfig,
    /// Run the escalator on frames without a detected face
    pub alert_without_face: bool,
}

impl MonitorConfig {
    /// Create strict config (tighter thresholds, earlier alerts)
    pub fn strict() -> Self {
        Self {
            frame_gate: FrameGateConfig::default(),
            posture: PostureConfig::strict(),
            calibration: CalibrationConfig::strict(),
            alerts: EscalatorConfig::strict(),
            scoring: ScoringConfig::default(),
            alert_without_face: false,
        }
    }

    /// Create lenient config (looser thresholds, fewer alerts)
    pub fn lenient() -> Self {
        Self {
            frame_gate: FrameGateConfig::default(),
            posture: PostureConfig::lenient(),
            calibration: CalibrationConfig::lenient(),
            alerts: EscalatorConfig::lenient(),
            scoring: ScoringConfig::default(),
            alert_without_face: false,
        }
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        self.posture.validate()?;
        self.scoring.validate()?;
        self.calibration.validate()?;
        self.alerts.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(MonitorConfig::default().validate().is_ok());
        assert!(MonitorConfig::strict().validate().is_ok());
        assert!(MonitorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{ "alerts": { "cooldown_ms": 8000 } }"#).unwrap();
        assert_eq!(config.alerts.cooldown_ms, 8000);
        assert_eq!(config.alerts.warning_escalation_count, 3);
        assert_eq!(config.frame_gate.min_interval_ms, 100);
        assert!(!config.alert_without_face);
    }

    #[test]
    fn test_invalid_nested_config_rejected() {
        let mut config = MonitorConfig::default();
        config.alerts.warning_escalation_count = 0;
        assert!(matches!(config.validate(), Err(MonitorError::Alert(_))));
    }
}
