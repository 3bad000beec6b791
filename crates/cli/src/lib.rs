//! Posture Monitor Tooling
//!
//! Shared pieces of the command-line tools:
//! - Logging setup (plain or JSON)
//! - Layered settings: preset, optional file, `POSTURE__*` environment
//! - Replay of recorded landmark streams through the monitor

pub mod replay;
pub mod settings;

use calibration::{CalibrationListener, ListenerError, StateChange};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr
pub fn init_logging(level: Level, json: bool) -> anyhow::Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Calibration observer that narrates transitions to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl CalibrationListener for LoggingListener {
    fn on_state_change(&self, change: &StateChange) -> Result<(), ListenerError> {
        let shown = calibration::display_for(change.to);
        info!("{}: {}", shown.label, shown.message);
        Ok(())
    }

    fn on_ready_change(&self, ready: bool, _at: Instant) -> Result<(), ListenerError> {
        if ready {
            info!("Ready to practice");
        } else {
            info!("Calibration lost");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibration::CalibrationState;

    #[test]
    fn test_logging_listener_narrates_every_state() {
        let now = Instant::now();
        let listener = LoggingListener;
        for to in [
            CalibrationState::NoFace,
            CalibrationState::NoHands,
            CalibrationState::Misaligned,
            CalibrationState::BadPosture,
            CalibrationState::Aligned,
        ] {
            let change = StateChange {
                from: CalibrationState::NoFace,
                to,
                at: now,
            };
            assert!(listener.on_state_change(&change).is_ok());
        }
        assert!(listener.on_ready_change(true, now).is_ok());
        assert!(listener.on_ready_change(false, now).is_ok());
    }
}
