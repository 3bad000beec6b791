//! Practice session orchestration

use alerting::{AlertChannel, AlertEscalator, AlertFired};
use calibration::{
    display_for, CalibrationGate, CalibrationListener, CalibrationState, GateStatus, ListenerId,
    StatusDisplay,
};
use landmarks::LandmarkFrame;
use posture::{PostureAssessment, PostureClassifier, PostureMetrics, PostureScorer, PostureSummary, Severity};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, info_span, trace};
use uuid::Uuid;

use crate::clock::Clock;
use crate::frame_gate::{FrameGate, ProcessingGuard};
use crate::{MonitorConfig, MonitorError};

/// Snapshot published to presentation observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub session: Option<Uuid>,
    pub state: CalibrationState,
    pub display: StatusDisplay,
    pub ready: bool,
    /// Metrics of the last processed frame
    pub metrics: Option<PostureMetrics>,
    pub last_alert: Option<Severity>,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            session: None,
            state: CalibrationState::NoFace,
            display: display_for(CalibrationState::NoFace),
            ready: false,
            metrics: None,
            last_alert: None,
        }
    }
}

/// Why a frame was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    NotRunning,
    Busy,
    RateLimited,
}

impl DropReason {
    fn as_str(self) -> &'static str {
        match self {
            DropReason::NotRunning => "not_running",
            DropReason::Busy => "busy",
            DropReason::RateLimited => "rate_limited",
        }
    }
}

/// Result of one processed frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub metrics: PostureMetrics,
    pub gate: GateStatus,
    pub alert: AlertFired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameOutcome {
    Dropped(DropReason),
    Processed(FrameReport),
}

impl FrameOutcome {
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            FrameOutcome::Processed(report) => Some(report),
            FrameOutcome::Dropped(_) => None,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, FrameOutcome::Processed(_))
    }
}

/// Summary returned when a session stops
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub duration_ms: u64,
    pub frames_processed: u64,
    pub frames_rate_limited: u64,
    pub alerts_fired: u64,
    pub ready_transitions: u64,
    pub summary: PostureSummary,
    /// Score over the averaged metrics, absent when a metric was never measured
    pub assessment: Option<PostureAssessment>,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    id: Uuid,
    started_at: Instant,
    frames_processed: u64,
    frames_rate_limited: u64,
    alerts_fired: u64,
    ready_transitions: u64,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            frames_processed: 0,
            frames_rate_limited: 0,
            alerts_fired: 0,
            ready_transitions: 0,
        }
    }
}

/// Session bookkeeping. Held for the whole frame path, so `stop` cannot
/// interleave with a frame in flight.
struct Lifecycle {
    session: Option<Session>,
    frame_gate: FrameGate,
    summary: PostureSummary,
    last_alert: Option<Severity>,
}

/// Posture monitor for practice sessions.
///
/// Frames are pushed from the capture callback on any thread. Each call
/// runs the whole pipeline synchronously; only alert actuation leaves the
/// calling thread. The calibration gate and the escalator each sit behind
/// their own lock, always taken after the lifecycle lock.
pub struct PracticeMonitor {
    config: MonitorConfig,
    classifier: PostureClassifier,
    scorer: PostureScorer,
    clock: Arc<dyn Clock>,
    guard: ProcessingGuard,
    lifecycle: Mutex<Lifecycle>,
    calibration: Mutex<CalibrationGate>,
    escalator: Mutex<AlertEscalator>,
    status: watch::Sender<MonitorStatus>,
}

impl PracticeMonitor {
    /// Create a monitor, validating every component config
    pub fn new(
        config: MonitorConfig,
        channel: Arc<dyn AlertChannel>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        info!("Creating practice monitor with config: {:?}", config);

        let lifecycle = Lifecycle {
            session: None,
            frame_gate: FrameGate::new(&config.frame_gate),
            summary: PostureSummary::new(),
            last_alert: None,
        };
        let (status, _) = watch::channel(MonitorStatus::default());

        Ok(Self {
            classifier: PostureClassifier::new(config.posture.clone())?,
            scorer: PostureScorer::new(config.scoring.clone())?,
            calibration: Mutex::new(CalibrationGate::new(config.calibration.clone())?),
            escalator: Mutex::new(AlertEscalator::new(config.alerts.clone(), channel)?),
            config,
            clock,
            guard: ProcessingGuard::new(),
            lifecycle: Mutex::new(lifecycle),
            status,
        })
    }

    /// Begin a session. Returns the running session's id if already started.
    pub fn start(&self) -> Uuid {
        let now = self.clock.now();
        let mut life = lock(&self.lifecycle);
        if let Some(session) = life.session {
            debug!("Session {} already running", session.id);
            return session.id;
        }

        self.reset(&mut life, now);
        let session = Session::new(now);
        life.session = Some(session);
        info!("Monitoring started: session {}", session.id);
        metrics::counter!("posture_sessions_total").increment(1);

        let gate = lock(&self.calibration).status();
        self.publish(&life, gate, None);
        session.id
    }

    /// End the session, cancel all timers, and report on it
    pub fn stop(&self) -> Option<SessionReport> {
        let now = self.clock.now();
        let mut life = lock(&self.lifecycle);
        let session = life.session.take()?;

        let summary = life.summary.clone();
        let assessment = summary.sample().map(|sample| self.scorer.score(&sample));
        self.reset(&mut life, now);

        let report = SessionReport {
            session_id: session.id,
            duration_ms: now.saturating_duration_since(session.started_at).as_millis() as u64,
            frames_processed: session.frames_processed,
            frames_rate_limited: session.frames_rate_limited,
            alerts_fired: session.alerts_fired,
            ready_transitions: session.ready_transitions,
            summary,
            assessment,
        };
        info!(
            "Monitoring stopped: session {} ({} frames, {} alerts)",
            report.session_id, report.frames_processed, report.alerts_fired
        );

        let gate = lock(&self.calibration).status();
        self.publish(&life, gate, None);
        Some(report)
    }

    /// Push one landmark frame through the pipeline
    pub fn on_frame(&self, frame: &LandmarkFrame) -> FrameOutcome {
        let Some(_permit) = self.guard.try_enter() else {
            return dropped(DropReason::Busy);
        };

        let now = self.clock.now();
        let mut guard = lock(&self.lifecycle);
        let life = &mut *guard;
        let Some(session) = life.session.as_mut() else {
            return dropped(DropReason::NotRunning);
        };
        if !life.frame_gate.should_process(now) {
            session.frames_rate_limited += 1;
            return dropped(DropReason::RateLimited);
        }

        let _span = info_span!("frame", session = %session.id).entered();
        session.frames_processed += 1;
        metrics::counter!("posture_frames_total", "outcome" => "processed").increment(1);

        let metrics = self.classifier.classify(frame);

        let gate = {
            let mut calibration = lock(&self.calibration);
            let was_ready = calibration.is_ready();
            let gate = calibration.process(&metrics, now);
            if gate.ready != was_ready {
                session.ready_transitions += 1;
                metrics::counter!("posture_ready_transitions_total").increment(1);
            }
            gate
        };

        let alert = if metrics.face_detected || self.config.alert_without_face {
            lock(&self.escalator).process(&metrics, now)
        } else {
            trace!("No face, alert evaluation skipped");
            AlertFired::none()
        };
        if let Some(severity) = alert.severity {
            session.alerts_fired += 1;
            life.last_alert = Some(severity);
            metrics::counter!("posture_alerts_total", "severity" => severity.to_string()).increment(1);
        }

        life.summary.record(&metrics);
        self.publish(life, gate, Some(metrics.clone()));

        FrameOutcome::Processed(FrameReport {
            metrics,
            gate,
            alert,
        })
    }

    /// Advance calibration timers between frames
    pub fn tick(&self) -> Option<GateStatus> {
        let now = self.clock.now();
        let mut guard = lock(&self.lifecycle);
        let life = &mut *guard;
        let session = life.session.as_mut()?;

        let gate = {
            let mut calibration = lock(&self.calibration);
            let was_ready = calibration.is_ready();
            let gate = calibration.tick(now);
            if gate.ready != was_ready {
                session.ready_transitions += 1;
                metrics::counter!("posture_ready_transitions_total").increment(1);
            }
            gate
        };

        let last_metrics = self.status.borrow().metrics.clone();
        self.publish(life, gate, last_metrics);
        Some(gate)
    }

    pub fn is_running(&self) -> bool {
        lock(&self.lifecycle).session.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        lock(&self.lifecycle).session.map(|s| s.id)
    }

    /// Latest published status
    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    /// Presentation feed, updated after every processed frame or tick
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.subscribe()
    }

    /// Register a calibration observer. Kept across sessions.
    pub fn add_state_listener(&self, listener: Arc<dyn CalibrationListener>) -> ListenerId {
        lock(&self.calibration).subscribe(listener)
    }

    pub fn remove_state_listener(&self, id: ListenerId) -> bool {
        lock(&self.calibration).unsubscribe(id)
    }

    pub fn set_alerts_enabled(&self, enabled: bool) {
        lock(&self.escalator).set_enabled(enabled);
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        lock(&self.escalator).set_sound_enabled(enabled);
    }

    pub fn set_vibration_enabled(&self, enabled: bool) {
        lock(&self.escalator).set_vibration_enabled(enabled);
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn reset(&self, life: &mut Lifecycle, now: Instant) {
        life.frame_gate.reset();
        life.summary.reset();
        life.last_alert = None;
        lock(&self.calibration).reset(now);
        lock(&self.escalator).reset();
    }

    fn publish(&self, life: &Lifecycle, gate: GateStatus, metrics: Option<PostureMetrics>) {
        self.status.send_replace(MonitorStatus {
            session: life.session.map(|s| s.id),
            state: gate.state,
            display: display_for(gate.state),
            ready: gate.ready,
            metrics,
            last_alert: life.last_alert,
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn dropped(reason: DropReason) -> FrameOutcome {
    trace!("Frame dropped: {}", reason.as_str());
    metrics::counter!("posture_frames_total", "outcome" => reason.as_str()).increment(1);
    FrameOutcome::Dropped(reason)
}
