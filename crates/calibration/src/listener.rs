//! Calibration state-change listeners

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::warn;

use crate::state::CalibrationState;

/// A transition of the observed calibration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: CalibrationState,
    pub to: CalibrationState,
    pub at: Instant,
}

/// Failure reported by a listener
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Listener failed: {0}")]
pub struct ListenerError(pub String);

/// Handle returned on registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Observer of calibration transitions.
///
/// Called synchronously on the frame-processing path. Listeners must not
/// call back into the gate that notifies them.
pub trait CalibrationListener: Send + Sync {
    fn on_state_change(&self, change: &StateChange) -> Result<(), ListenerError>;

    /// Ready flag flipped
    fn on_ready_change(&self, _ready: bool, _at: Instant) -> Result<(), ListenerError> {
        Ok(())
    }
}

impl<F> CalibrationListener for F
where
    F: Fn(&StateChange) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_state_change(&self, change: &StateChange) -> Result<(), ListenerError> {
        self(change)
    }
}

/// Registered listeners
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(ListenerId, Arc<dyn CalibrationListener>)>,
    next_id: u64,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Arc<dyn CalibrationListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn state_changed(&self, change: &StateChange) {
        for (id, listener) in &self.entries {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_state_change(change)));
            report(*id, outcome);
        }
    }

    pub(crate) fn ready_changed(&self, ready: bool, at: Instant) {
        for (id, listener) in &self.entries {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_ready_change(ready, at)));
            report(*id, outcome);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("count", &self.entries.len()).finish()
    }
}

fn report(id: ListenerId, outcome: std::thread::Result<Result<(), ListenerError>>) {
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Calibration listener {:?} failed: {}", id, e),
        Err(_) => warn!("Calibration listener {:?} panicked", id),
    }
}
