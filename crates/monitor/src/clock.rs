//! Time sources

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Monotonic time source for the pipeline
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to (replays and tests)
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            now: Mutex::new(origin),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Jump to `offset` after creation. Never moves backwards.
    pub fn set_elapsed(&self, offset: Duration) {
        let target = self.origin + offset;
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        if target > *now {
            *now = target;
        }
    }

    /// Time since creation
    pub fn elapsed(&self) -> Duration {
        self.now().saturating_duration_since(self.origin)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
