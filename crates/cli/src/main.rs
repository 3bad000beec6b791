//! Posture Replay - feeds a recorded landmark stream through the monitor

use alerting::TracingChannel;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use monitor::{ManualClock, MonitorConfig, PracticeMonitor, SessionReport};
use posture::{combine, CombinedScore};
use posture_cli::{init_logging, replay, settings, LoggingListener};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "posture-replay", version, about = "Replay recorded landmarks through the posture monitor")]
struct Cli {
    /// JSON-lines recording; `-` reads stdin
    #[arg(default_value = "-")]
    input: PathBuf,
    /// Settings file (TOML, JSON, or YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base thresholds before file and environment overrides
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,
    /// Handwriting score (0-100) to combine with the posture score
    #[arg(long)]
    handwriting_score: Option<f32>,
    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
    /// Log every frame
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Preset {
    Default,
    Strict,
    Lenient,
}

impl Preset {
    fn config(self) -> MonitorConfig {
        match self {
            Preset::Default => MonitorConfig::default(),
            Preset::Strict => MonitorConfig::strict(),
            Preset::Lenient => MonitorConfig::lenient(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    #[serde(flatten)]
    report: SessionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    combined: Option<CombinedScore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_logging(level, cli.json_logs)?;

    info!("=== Posture Replay v{} ===", env!("CARGO_PKG_VERSION"));

    let config = settings::load(&cli.preset.config(), cli.config.as_deref())?;
    let clock = Arc::new(ManualClock::new());
    let monitor = PracticeMonitor::new(config, Arc::new(TracingChannel), clock.clone())?;
    monitor.add_state_listener(Arc::new(LoggingListener));

    let (report, _) = if cli.input.as_os_str() == "-" {
        replay::replay(io::stdin().lock(), &monitor, &clock)?
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("Failed to open {}", cli.input.display()))?;
        replay::replay(BufReader::new(file), &monitor, &clock)?
    };

    let combined = cli
        .handwriting_score
        .map(|score| combine(score, report.assessment.as_ref()));
    let output = Output { report, combined };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
