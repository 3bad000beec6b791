//! Calibration gate state machine

use posture::PostureMetrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::listener::{CalibrationListener, ListenerId, Listeners, StateChange};
use crate::state::CalibrationState;
use crate::timer::SingleShotTimer;
use crate::{CalibrationConfig, CalibrationError};

/// Observed gate output after a frame or tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    pub state: CalibrationState,
    pub ready: bool,
}

/// Debounced readiness gate.
///
/// Per frame, the first matching rule decides the state:
/// 1. no face: `NoFace`
/// 2. no hands: `NoHands`, unless the hand-loss buffer holds `Aligned`
/// 3. posture gate (optional): `Misaligned` / `BadPosture`
/// 4. otherwise `Aligned`
///
/// `ready` turns on once `Aligned` has held for the dwell time and turns
/// off on the first frame that leaves `Aligned`.
#[derive(Debug)]
pub struct CalibrationGate {
    config: CalibrationConfig,
    state: CalibrationState,
    ready: bool,
    stable_state: Option<CalibrationState>,
    hand_loss: SingleShotTimer,
    dwell: SingleShotTimer,
    listeners: Listeners,
}

impl CalibrationGate {
    pub fn new(config: CalibrationConfig) -> Result<Self, CalibrationError> {
        config.validate()?;
        info!("Creating calibration gate with config: {:?}", config);
        Ok(Self::with_config(config))
    }

    fn with_config(config: CalibrationConfig) -> Self {
        Self {
            hand_loss: SingleShotTimer::new(config.hand_loss_buffer()),
            dwell: SingleShotTimer::new(config.dwell()),
            state: CalibrationState::NoFace,
            ready: false,
            stable_state: None,
            listeners: Listeners::default(),
            config,
        }
    }

    /// Feed one classified frame
    pub fn process(&mut self, metrics: &PostureMetrics, now: Instant) -> GateStatus {
        let next = self.resolve(metrics, now);
        self.apply(next, now)
    }

    /// Evaluate pending timers without a new frame
    pub fn tick(&mut self, now: Instant) -> GateStatus {
        let next = if self.hand_loss.is_running() && self.hand_loss.poll(now) {
            debug!("Hand-loss buffer expired");
            CalibrationState::NoHands
        } else {
            self.state
        };
        self.apply(next, now)
    }

    /// Cancel all timers and return to `NoFace`, not ready.
    ///
    /// Listeners are told about the forced transition like any other.
    pub fn reset(&mut self, now: Instant) {
        self.hand_loss.cancel();
        self.dwell.cancel();
        self.apply(CalibrationState::NoFace, now);
        self.stable_state = None;
        debug!("Calibration gate reset");
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// State that satisfied the dwell, while ready
    pub fn stable_state(&self) -> Option<CalibrationState> {
        self.stable_state
    }

    /// Whether a hand dropout is currently being masked
    pub fn hand_loss_active(&self) -> bool {
        self.hand_loss.is_running()
    }

    pub fn status(&self) -> GateStatus {
        GateStatus {
            state: self.state,
            ready: self.ready,
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn subscribe(&mut self, listener: Arc<dyn CalibrationListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn resolve(&mut self, m: &PostureMetrics, now: Instant) -> CalibrationState {
        if !m.face_detected {
            self.hand_loss.cancel();
            return CalibrationState::NoFace;
        }

        if !m.hands_visible {
            if self.state.is_aligned() && self.hand_loss.start(now) {
                debug!("Hands lost while aligned, holding for {:?}", self.hand_loss.duration());
            }
            if self.hand_loss.is_running() && !self.hand_loss.poll(now) {
                return CalibrationState::Aligned;
            }
            return CalibrationState::NoHands;
        }

        if self.hand_loss.is_running() {
            debug!("Hands back within buffer");
        }
        self.hand_loss.cancel();

        if self.config.posture_gate_enabled {
            if !m.proximity_ok {
                return CalibrationState::Misaligned;
            }
            if !m.spine_ok || !m.head_ok {
                return CalibrationState::BadPosture;
            }
        }

        CalibrationState::Aligned
    }

    fn apply(&mut self, next: CalibrationState, now: Instant) -> GateStatus {
        if next != self.state {
            let change = StateChange {
                from: self.state,
                to: next,
                at: now,
            };
            self.state = next;
            info!("Calibration state: {} -> {}", change.from, change.to);
            self.listeners.state_changed(&change);
        }

        if next.is_aligned() {
            self.dwell.start(now);
            if self.dwell.poll(now) {
                self.set_ready(true, now);
            }
        } else {
            self.dwell.cancel();
            self.set_ready(false, now);
        }

        self.status()
    }

    fn set_ready(&mut self, ready: bool, now: Instant) {
        if self.ready == ready {
            return;
        }
        self.ready = ready;
        self.stable_state = ready.then_some(self.state);
        info!("Calibration ready: {}", ready);
        self.listeners.ready_changed(ready, now);
    }
}

impl Default for CalibrationGate {
    fn default() -> Self {
        Self::with_config(CalibrationConfig::default())
    }
}
