//! Alerting System
//!
//! Escalates sustained bad posture into discrete alerts:
//! - Consecutive-frame threshold for warnings, immediate critical alerts
//! - Cooldown between alerts
//! - Fire-and-forget dispatch to haptic and audio channels

mod channel;
mod config;
mod dispatch;
mod escalator;

pub use channel::{AlertChannel, ChannelError, Pulse, SoundCue, TracingChannel, VibrationPattern};
pub use config::EscalatorConfig;
pub use escalator::{evaluate, AlertEscalator, AlertFired, AlertState};

use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("Invalid configuration: {field} ({reason})")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}
