//! Cancelable single-shot timers driven by caller-supplied instants

use std::time::{Duration, Instant};

/// Timer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { started_at: Instant },
    Fired,
}

/// Single-shot timer.
///
/// The timer never looks at the wall clock itself: every query takes
/// `now`, so tests can drive it with synthetic instants.
#[derive(Debug, Clone)]
pub struct SingleShotTimer {
    duration: Duration,
    state: TimerState,
}

impl SingleShotTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: TimerState::Idle,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Start the timer if idle. Returns whether it was started.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Idle {
            return false;
        }
        self.state = TimerState::Running { started_at: now };
        true
    }

    /// Return to idle. Canceling an idle timer is a no-op.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    pub fn is_idle(&self) -> bool {
        self.state == TimerState::Idle
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_fired(&self) -> bool {
        self.state == TimerState::Fired
    }

    /// Time since start while running
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Running { started_at } => Some(now.saturating_duration_since(started_at)),
            _ => None,
        }
    }

    /// Time left while running
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.elapsed(now).map(|e| self.duration.saturating_sub(e))
    }

    /// Fire if the duration has elapsed. Returns true only on the call
    /// that fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.elapsed(now) {
            Some(elapsed) if elapsed >= self.duration => {
                self.state = TimerState::Fired;
                true
            }
            _ => false,
        }
    }
}
