//! Fire-and-forget actuation

use posture::Severity;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::channel::{AlertChannel, SoundCue, VibrationPattern};

/// Channels to actuate for one alert
#[derive(Debug, Clone, Copy)]
pub(crate) struct Actuation {
    pub severity: Severity,
    pub vibration: bool,
    pub sound: bool,
}

/// Run the actuation off the caller's thread and return immediately.
///
/// Uses the blocking pool of the current tokio runtime when there is
/// one, otherwise a detached thread. Failures are logged, never retried.
pub(crate) fn dispatch(channel: Arc<dyn AlertChannel>, actuation: Actuation) {
    if !actuation.vibration && !actuation.sound {
        debug!("Alert has no enabled channels");
        return;
    }

    let job = move || {
        let outcome = catch_unwind(AssertUnwindSafe(|| actuate(channel.as_ref(), actuation)));
        if outcome.is_err() {
            warn!("Alert channel panicked during {} alert", actuation.severity);
        }
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(job);
        }
        Err(_) => {
            if let Err(e) = std::thread::Builder::new()
                .name("alert-dispatch".to_string())
                .spawn(job)
            {
                warn!("Failed to spawn alert dispatch: {}", e);
            }
        }
    }
}

fn actuate(channel: &dyn AlertChannel, actuation: Actuation) {
    if actuation.vibration {
        let pattern = VibrationPattern::for_severity(actuation.severity);
        if let Err(e) = channel.vibrate(&pattern) {
            warn!("Vibration failed: {}", e);
        }
    }
    if actuation.sound {
        if let Some(cue) = SoundCue::for_severity(actuation.severity) {
            if let Err(e) = channel.play_sound(cue) {
                warn!("Sound failed: {}", e);
            }
        }
    }
}
