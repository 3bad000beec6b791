//! Alert Escalator Implementation

use posture::{PostureMetrics, Severity};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::channel::AlertChannel;
use crate::dispatch::{dispatch, Actuation};
use crate::{AlertError, EscalatorConfig};

/// Outcome of processing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertFired {
    pub fired: bool,
    pub severity: Option<Severity>,
}

impl AlertFired {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fire(severity: Severity) -> Self {
        Self {
            fired: true,
            severity: Some(severity),
        }
    }
}

/// Mutable escalator state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    /// Bad frames since the last good frame or alert
    pub consecutive_bad_count: u32,
    /// Last time an alert fired
    pub last_alert_at: Option<Instant>,
    pub enabled: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    /// Alerts fired since creation
    pub fire_count: u64,
}

impl AlertState {
    fn from_config(config: &EscalatorConfig) -> Self {
        Self {
            consecutive_bad_count: 0,
            last_alert_at: None,
            enabled: config.enabled,
            sound_enabled: config.sound_enabled,
            vibration_enabled: config.vibration_enabled,
            fire_count: 0,
        }
    }
}

/// Decide whether a frame fires an alert.
///
/// Pure: returns the next state instead of mutating, and performs no
/// actuation.
pub fn evaluate(
    state: &AlertState,
    config: &EscalatorConfig,
    metrics: &PostureMetrics,
    now: Instant,
) -> (AlertState, AlertFired) {
    let mut next = state.clone();

    if !state.enabled {
        next.consecutive_bad_count = 0;
        return (next, AlertFired::none());
    }

    if let Some(last) = state.last_alert_at {
        if now.saturating_duration_since(last) < config.cooldown() {
            return (next, AlertFired::none());
        }
    }

    if metrics.overall_ok {
        next.consecutive_bad_count = 0;
        return (next, AlertFired::none());
    }

    next.consecutive_bad_count = state.consecutive_bad_count.saturating_add(1);

    let fire = match metrics.severity {
        Severity::Good => {
            next.consecutive_bad_count = 0;
            false
        }
        Severity::Warning => next.consecutive_bad_count >= config.warning_escalation_count,
        Severity::Critical => true,
    };

    if !fire {
        return (next, AlertFired::none());
    }

    next.last_alert_at = Some(now);
    next.consecutive_bad_count = 0;
    next.fire_count += 1;
    (next, AlertFired::fire(metrics.severity))
}

/// Cooldown/threshold alert state machine with injected actuation
pub struct AlertEscalator {
    config: EscalatorConfig,
    state: AlertState,
    channel: Arc<dyn AlertChannel>,
}

impl AlertEscalator {
    /// Create a new alert escalator
    pub fn new(config: EscalatorConfig, channel: Arc<dyn AlertChannel>) -> Result<Self, AlertError> {
        config.validate()?;
        info!("Creating alert escalator with config: {:?}", config);
        Ok(Self {
            state: AlertState::from_config(&config),
            config,
            channel,
        })
    }

    /// Process one classified frame, dispatching actuation on fire
    pub fn process(&mut self, metrics: &PostureMetrics, now: Instant) -> AlertFired {
        let (next, fired) = evaluate(&self.state, &self.config, metrics, now);
        self.state = next;

        match fired.severity {
            Some(severity) => {
                info!("Posture alert fired: {} (count: {})", severity, self.state.fire_count);
                dispatch(
                    Arc::clone(&self.channel),
                    Actuation {
                        severity,
                        vibration: self.state.vibration_enabled,
                        sound: self.state.sound_enabled,
                    },
                );
            }
            None if !metrics.overall_ok => {
                debug!(
                    "Alert suppressed: {} frame, {} consecutive bad",
                    metrics.severity, self.state.consecutive_bad_count
                );
            }
            None => {}
        }

        fired
    }

    /// Clear the counter and cooldown. Channel switches are kept.
    pub fn reset(&mut self) {
        self.state.consecutive_bad_count = 0;
        self.state.last_alert_at = None;
        debug!("Alert escalator reset");
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled = enabled;
        if !enabled {
            self.state.consecutive_bad_count = 0;
        }
        info!("Posture alerts enabled: {}", enabled);
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.state.sound_enabled = enabled;
    }

    pub fn set_vibration_enabled(&mut self, enabled: bool) {
        self.state.vibration_enabled = enabled;
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn config(&self) -> &EscalatorConfig {
        &self.config
    }

    /// Whether an alert fired less than the cooldown ago
    pub fn in_cooldown(&self, now: Instant) -> bool {
        self.state
            .last_alert_at
            .is_some_and(|last| now.saturating_duration_since(last) < self.config.cooldown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelError, SoundCue, VibrationPattern};
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Actuated {
        Vibrate(VibrationPattern),
        Sound(SoundCue),
    }

    struct RecordingChannel {
        tx: std::sync::Mutex<mpsc::Sender<Actuated>>,
    }

    impl RecordingChannel {
        fn new() -> (Arc<Self>, mpsc::Receiver<Actuated>) {
            let (tx, rx) = mpsc::channel();
            (
                Arc::new(Self {
                    tx: std::sync::Mutex::new(tx),
                }),
                rx,
            )
        }
    }

    impl AlertChannel for RecordingChannel {
        fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), ChannelError> {
            let _ = self.tx.lock().unwrap().send(Actuated::Vibrate(pattern.clone()));
            Ok(())
        }

        fn play_sound(&self, cue: SoundCue) -> Result<(), ChannelError> {
            let _ = self.tx.lock().unwrap().send(Actuated::Sound(cue));
            Ok(())
        }
    }

    struct FailingChannel;

    impl AlertChannel for FailingChannel {
        fn vibrate(&self, _: &VibrationPattern) -> Result<(), ChannelError> {
            Err(ChannelError::Unavailable("no motor".into()))
        }

        fn play_sound(&self, _: SoundCue) -> Result<(), ChannelError> {
            panic!("audio driver crashed")
        }
    }

    /// Actuator that takes a second per alert, then reports completion
    struct SlowChannel {
        done: std::sync::Mutex<mpsc::Sender<()>>,
    }

    impl SlowChannel {
        fn new() -> (Arc<Self>, mpsc::Receiver<()>) {
            let (tx, rx) = mpsc::channel();
            (
                Arc::new(Self {
                    done: std::sync::Mutex::new(tx),
                }),
                rx,
            )
        }

        fn hold(&self) -> Result<(), ChannelError> {
            std::thread::sleep(Duration::from_secs(1));
            let _ = self.done.lock().unwrap().send(());
            Ok(())
        }
    }

    impl AlertChannel for SlowChannel {
        fn vibrate(&self, _: &VibrationPattern) -> Result<(), ChannelError> {
            self.hold()
        }

        fn play_sound(&self, _: SoundCue) -> Result<(), ChannelError> {
            self.hold()
        }
    }

    fn silent() -> EscalatorConfig {
        EscalatorConfig {
            sound_enabled: false,
            vibration_enabled: false,
            ..Default::default()
        }
    }

    fn escalator() -> AlertEscalator {
        AlertEscalator::new(silent(), Arc::new(FailingChannel)).unwrap()
    }

    fn frame(severity: Severity) -> PostureMetrics {
        PostureMetrics {
            face_detected: true,
            hands_visible: true,
            overall_ok: severity == Severity::Good,
            spine_ok: severity == Severity::Good,
            proximity_ok: true,
            head_ok: true,
            severity,
            ..Default::default()
        }
    }

    fn ms(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn test_three_warnings_fire_once() {
        let t0 = Instant::now();
        let mut esc = escalator();
        assert!(!esc.process(&frame(Severity::Warning), t0).fired);
        assert!(!esc.process(&frame(Severity::Warning), ms(t0, 100)).fired);
        let third = esc.process(&frame(Severity::Warning), ms(t0, 200));
        assert_eq!(third, AlertFired::fire(Severity::Warning));
        assert_eq!(esc.state().consecutive_bad_count, 0);
        assert_eq!(esc.state().fire_count, 1);
    }

    #[test]
    fn test_good_frame_resets_count() {
        let t0 = Instant::now();
        let mut esc = escalator();
        esc.process(&frame(Severity::Warning), t0);
        esc.process(&frame(Severity::Warning), ms(t0, 100));
        esc.process(&frame(Severity::Good), ms(t0, 200));
        assert_eq!(esc.state().consecutive_bad_count, 0);

        assert!(!esc.process(&frame(Severity::Warning), ms(t0, 300)).fired);
        assert!(!esc.process(&frame(Severity::Warning), ms(t0, 400)).fired);
        assert!(esc.process(&frame(Severity::Warning), ms(t0, 500)).fired);
    }

    #[test]
    fn test_critical_fires_immediately() {
        let t0 = Instant::now();
        let mut esc = escalator();
        let fired = esc.process(&frame(Severity::Critical), t0);
        assert_eq!(fired, AlertFired::fire(Severity::Critical));
    }

    #[test]
    fn test_cooldown() {
        let t0 = Instant::now();
        let mut esc = escalator();
        assert!(esc.process(&frame(Severity::Critical), t0).fired);
        assert!(!esc.process(&frame(Severity::Critical), ms(t0, 1000)).fired);
        assert!(esc.in_cooldown(ms(t0, 4999)));
        assert!(esc.process(&frame(Severity::Critical), ms(t0, 5001)).fired);
    }

    #[test]
    fn test_cooldown_ignores_bad_frames() {
        let t0 = Instant::now();
        let mut esc = escalator();
        esc.process(&frame(Severity::Critical), t0);
        for i in 1..=5 {
            esc.process(&frame(Severity::Warning), ms(t0, i * 100));
        }
        assert_eq!(esc.state().consecutive_bad_count, 0);
    }

    #[test]
    fn test_disabled_never_fires() {
        let t0 = Instant::now();
        let mut esc = escalator();
        esc.process(&frame(Severity::Warning), t0);
        esc.process(&frame(Severity::Warning), ms(t0, 100));
        esc.set_enabled(false);
        assert_eq!(esc.state().consecutive_bad_count, 0);

        for i in 2..10 {
            assert!(!esc.process(&frame(Severity::Critical), ms(t0, i * 100)).fired);
            assert_eq!(esc.state().consecutive_bad_count, 0);
        }
    }

    #[test]
    fn test_disabled_config_starts_disabled() {
        let config = EscalatorConfig {
            enabled: false,
            ..silent()
        };
        let mut esc = AlertEscalator::new(config, Arc::new(FailingChannel)).unwrap();
        assert!(!esc.process(&frame(Severity::Critical), Instant::now()).fired);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let t0 = Instant::now();
        let config = EscalatorConfig::default();
        let state = AlertState::from_config(&config);
        let (a, fired_a) = evaluate(&state, &config, &frame(Severity::Critical), t0);
        let (b, fired_b) = evaluate(&state, &config, &frame(Severity::Critical), t0);
        assert_eq!(a, b);
        assert_eq!(fired_a, fired_b);
        assert_eq!(state.fire_count, 0);
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let t0 = Instant::now();
        let mut esc = escalator();
        esc.process(&frame(Severity::Critical), t0);
        esc.reset();
        assert!(!esc.in_cooldown(ms(t0, 100)));
        assert!(esc.process(&frame(Severity::Critical), ms(t0, 100)).fired);
    }

    #[test]
    fn test_zero_escalation_count_rejected() {
        let config = EscalatorConfig {
            warning_escalation_count: 0,
            ..Default::default()
        };
        assert!(AlertEscalator::new(config, Arc::new(FailingChannel)).is_err());
    }

    #[test]
    fn test_dispatch_on_thread_without_runtime() {
        let (channel, rx) = RecordingChannel::new();
        let mut esc = AlertEscalator::new(EscalatorConfig::default(), channel).unwrap();
        esc.process(&frame(Severity::Critical), Instant::now());

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, Actuated::Vibrate(VibrationPattern::for_severity(Severity::Critical)));
        assert_eq!(second, Actuated::Sound(SoundCue::Critical));
    }

    #[test]
    fn test_only_enabled_channels_actuate() {
        let (channel, rx) = RecordingChannel::new();
        let mut esc = AlertEscalator::new(EscalatorConfig::default(), channel).unwrap();
        esc.set_vibration_enabled(false);
        esc.process(&frame(Severity::Critical), Instant::now());

        let only = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(only, Actuated::Sound(SoundCue::Critical));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_on_runtime() {
        let (channel, rx) = RecordingChannel::new();
        let mut esc = AlertEscalator::new(EscalatorConfig::default(), channel).unwrap();
        esc.set_sound_enabled(false);
        let fired = esc.process(&frame(Severity::Warning), Instant::now());
        assert!(!fired.fired);

        for i in 1..=2 {
            esc.process(&frame(Severity::Warning), Instant::now() + Duration::from_millis(i));
        }
        let got = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(2)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, Actuated::Vibrate(VibrationPattern::for_severity(Severity::Warning)));
    }

    #[test]
    fn test_failing_channel_does_not_stall() {
        let config = EscalatorConfig::default();
        let mut esc = AlertEscalator::new(config, Arc::new(FailingChannel)).unwrap();
        let t0 = Instant::now();
        assert!(esc.process(&frame(Severity::Critical), t0).fired);
        assert!(esc.process(&frame(Severity::Critical), ms(t0, 5000)).fired);
    }

    #[test]
    fn test_slow_channel_does_not_block_process() {
        let (channel, rx) = SlowChannel::new();
        let mut esc = AlertEscalator::new(EscalatorConfig::default(), channel).unwrap();

        let started = Instant::now();
        let fired = esc.process(&frame(Severity::Critical), started);
        let elapsed = started.elapsed();

        assert!(fired.fired);
        assert!(elapsed < Duration::from_millis(200), "process took {:?}", elapsed);
        assert!(rx.try_recv().is_err());
        // The actuator still runs to completion in the background
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_slow_channel_does_not_block_runtime_process() {
        let (channel, rx) = SlowChannel::new();
        let mut esc = AlertEscalator::new(EscalatorConfig::default(), channel).unwrap();

        let started = Instant::now();
        assert!(esc.process(&frame(Severity::Critical), started).fired);
        assert!(started.elapsed() < Duration::from_millis(200));

        let done = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(done.is_ok());
    }
}
