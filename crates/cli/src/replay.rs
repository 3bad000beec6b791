//! Replay of recorded landmark streams

use anyhow::{bail, Context};
use landmarks::{Landmark, LandmarkFrame, LandmarkId};
use monitor::{FrameOutcome, ManualClock, PracticeMonitor, SessionReport};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One recorded frame, one JSON object per line.
///
/// Either named `landmarks` or a MediaPipe-layout `pose` array of
/// `[x, y, visibility]` triples.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayRecord {
    /// Capture time since recording start (milliseconds)
    pub t_ms: u64,
    #[serde(default)]
    pub landmarks: BTreeMap<LandmarkId, Landmark>,
    #[serde(default)]
    pub pose: Option<Vec<[f32; 3]>>,
}

impl ReplayRecord {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let record: Self = serde_json::from_str(line)?;
        if record.pose.is_some() && !record.landmarks.is_empty() {
            bail!("record has both `landmarks` and `pose`");
        }
        Ok(record)
    }

    /// Validated frame; invalid points are dropped
    pub fn frame(&self) -> LandmarkFrame {
        match &self.pose {
            Some(points) => LandmarkFrame::from_pose_array(points),
            None => self.landmarks.iter().map(|(id, point)| (*id, *point)).collect(),
        }
    }
}

/// Counts for one replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub records: u64,
    pub processed: u64,
    pub dropped: u64,
}

/// Drive `monitor` with the records in `reader`, moving `clock` to each
/// record's timestamp, and return the session report.
///
/// The session is stopped even when the input is malformed.
pub fn replay<R: BufRead>(
    reader: R,
    monitor: &PracticeMonitor,
    clock: &ManualClock,
) -> anyhow::Result<(SessionReport, ReplayStats)> {
    let mut stats = ReplayStats::default();
    monitor.start();

    let fed = feed(reader, monitor, clock, &mut stats);
    let report = monitor.stop().context("Monitor was stopped during replay")?;
    fed?;

    info!(
        "Replayed {} records ({} processed, {} dropped) over {:?}",
        stats.records,
        stats.processed,
        stats.dropped,
        clock.elapsed()
    );
    Ok((report, stats))
}

fn feed<R: BufRead>(
    reader: R,
    monitor: &PracticeMonitor,
    clock: &ManualClock,
    stats: &mut ReplayStats,
) -> anyhow::Result<()> {
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read replay input")?;
        if line.trim().is_empty() {
            continue;
        }
        let record =
            ReplayRecord::parse(&line).with_context(|| format!("Invalid record on line {}", index + 1))?;
        stats.records += 1;

        let target = Duration::from_millis(record.t_ms);
        if target < clock.elapsed() {
            warn!("Line {}: timestamp {} ms goes backwards, using current time", index + 1, record.t_ms);
        }
        clock.set_elapsed(target);
        monitor.tick();

        match monitor.on_frame(&record.frame()) {
            FrameOutcome::Processed(report) => {
                stats.processed += 1;
                debug!(
                    "t={} ms state={} severity={}",
                    record.t_ms, report.gate.state, report.metrics.severity
                );
            }
            FrameOutcome::Dropped(reason) => {
                stats.dropped += 1;
                debug!("t={} ms dropped: {:?}", record.t_ms, reason);
            }
        }
    }
    Ok(())
}
