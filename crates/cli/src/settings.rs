//! Layered monitor settings

use anyhow::Context;
use config::{Config, Environment, File};
use monitor::MonitorConfig;
use std::path::Path;
use tracing::debug;

/// Environment variable prefix, e.g. `POSTURE__ALERTS__COOLDOWN_MS=8000`
pub const ENV_PREFIX: &str = "POSTURE";

/// Load settings over `base`: optional file first, then the environment.
///
/// The file format follows its extension (TOML, JSON, YAML).
pub fn load(base: &MonitorConfig, path: Option<&Path>) -> anyhow::Result<MonitorConfig> {
    load_with_env(base, path, None)
}

fn load_with_env(
    base: &MonitorConfig,
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> anyhow::Result<MonitorConfig> {
    let mut builder = Config::builder()
        .add_source(Config::try_from(base).context("Failed to encode base settings")?);

    if let Some(path) = path {
        debug!("Loading settings from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("Failed to read settings")?;

    let config: MonitorConfig = settings
        .try_deserialize()
        .context("Failed to parse settings")?;
    config.validate()?;
    Ok(config)
}
