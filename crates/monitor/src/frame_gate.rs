//! Frame admission: minimum-interval rate limiting and re-entrancy guard

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// Frame rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameGateConfig {
    /// Minimum spacing between admitted frames (milliseconds)
    pub min_interval_ms: u64,
}

impl Default for FrameGateConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 100, // 10 Hz
        }
    }
}

impl FrameGateConfig {
    /// Create a strict config for low-power devices
    pub fn strict() -> Self {
        Self {
            min_interval_ms: 200, // 5 Hz
        }
    }

    /// Create a lenient config for fast devices
    pub fn lenient() -> Self {
        Self {
            min_interval_ms: 50, // 20 Hz
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Token-less rate limiter.
///
/// Admits a frame when none was admitted before or at least
/// `min_interval` has passed since the last admitted one. Dropped frames
/// leave no backlog.
#[derive(Debug, Clone)]
pub struct FrameGate {
    min_interval: Duration,
    last_admitted: Option<Instant>,
}

impl FrameGate {
    pub fn new(config: &FrameGateConfig) -> Self {
        Self {
            min_interval: config.min_interval(),
            last_admitted: None,
        }
    }

    pub fn should_process(&mut self, now: Instant) -> bool {
        let admit = match self.last_admitted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
        };
        if admit {
            self.last_admitted = Some(now);
        } else {
            trace!("Frame dropped by rate limit");
        }
        admit
    }

    /// Forget the last admission
    pub fn reset(&mut self) {
        self.last_admitted = None;
    }

    pub fn last_admitted(&self) -> Option<Instant> {
        self.last_admitted
    }
}

/// "Currently processing" flag.
///
/// Overlapping frames are dropped instead of queued.
#[derive(Debug, Default)]
pub struct ProcessingGuard {
    busy: AtomicBool,
}

impl ProcessingGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard, or `None` if a frame is already in flight
    pub fn try_enter(&self) -> Option<ProcessingPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ProcessingPermit { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the guard on drop
#[derive(Debug)]
pub struct ProcessingPermit<'a> {
    guard: &'a ProcessingGuard,
}

impl Drop for ProcessingPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn test_default_config() {
        let config = FrameGateConfig::default();
        assert_eq!(config.min_interval_ms, 100);
        assert!(FrameGateConfig::strict().min_interval_ms > config.min_interval_ms);
    }

    #[test]
    fn test_min_interval() {
        let t0 = Instant::now();
        let mut gate = FrameGate::new(&FrameGateConfig::default());
        assert!(gate.should_process(t0));
        assert!(!gate.should_process(at(t0, 50)));
        assert!(gate.should_process(at(t0, 101)));
    }

    #[test]
    fn test_boundary_is_closed() {
        let t0 = Instant::now();
        let mut gate = FrameGate::new(&FrameGateConfig::default());
        assert!(gate.should_process(t0));
        assert!(gate.should_process(at(t0, 100)));
        assert_eq!(gate.last_admitted(), Some(at(t0, 100)));
    }

    #[test]
    fn test_dropped_frames_do_not_move_window() {
        let t0 = Instant::now();
        let mut gate = FrameGate::new(&FrameGateConfig::default());
        gate.should_process(t0);
        for ms in (10..100).step_by(10) {
            assert!(!gate.should_process(at(t0, ms)));
        }
        assert!(gate.should_process(at(t0, 100)));
    }

    #[test]
    fn test_reset_admits_next_frame() {
        let t0 = Instant::now();
        let mut gate = FrameGate::new(&FrameGateConfig::default());
        gate.should_process(t0);
        gate.reset();
        assert!(gate.should_process(at(t0, 1)));
    }

    #[test]
    fn test_guard_drops_overlap() {
        let guard = ProcessingGuard::new();
        let permit = guard.try_enter();
        assert!(permit.is_some());
        assert!(guard.is_busy());
        assert!(guard.try_enter().is_none());
        drop(permit);
        assert!(!guard.is_busy());
        assert!(guard.try_enter().is_some());
    }

    proptest! {
        #[test]
        fn test_admitted_frames_are_spaced(offsets in proptest::collection::vec(0u64..40, 1..200)) {
            let t0 = Instant::now();
            let mut gate = FrameGate::new(&FrameGateConfig::default());
            let mut now = 0u64;
            let mut admitted: Vec<u64> = Vec::new();
            let first = offsets[0];
            for step in offsets {
                now += step;
                if gate.should_process(at(t0, now)) {
                    admitted.push(now);
                }
            }
            prop_assert_eq!(admitted.first().copied(), Some(first));
            for pair in admitted.windows(2) {
                prop_assert!(pair[1] - pair[0] >= 100);
            }
        }
    }
}
