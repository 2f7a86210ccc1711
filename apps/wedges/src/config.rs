use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use wedge_ring::{
    walk::{DEFAULT_ADD_PROBABILITY, DEFAULT_MAX_WEDGES, DEFAULT_TICK_INTERVAL},
    WalkPolicy,
};

pub const DEFAULT_CONFIG_PATH: &str = "wedges.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tick_interval_ms: u64,
    pub max_wedges: usize,
    pub add_probability: f64,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            max_wedges: DEFAULT_MAX_WEDGES,
            add_probability: DEFAULT_ADD_PROBABILITY,
            seed: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    tick_interval_ms: Option<u64>,
    max_wedges: Option<usize>,
    add_probability: Option<f64>,
    seed: Option<u64>,
}

impl Settings {
    pub fn walk_policy(&self) -> anyhow::Result<WalkPolicy> {
        WalkPolicy::new(
            Duration::from_millis(self.tick_interval_ms),
            self.max_wedges,
            self.add_probability,
        )
        .context("invalid random walk settings")
    }
}

/// Defaults, then the config file (a missing file is skipped), then
/// environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file_settings(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.tick_interval_ms {
        settings.tick_interval_ms = v;
    }
    if let Some(v) = file_cfg.max_wedges {
        settings.max_wedges = v;
    }
    if let Some(v) = file_cfg.add_probability {
        settings.add_probability = v;
    }
    if let Some(v) = file_cfg.seed {
        settings.seed = Some(v);
    }

    Ok(())
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("WEDGES_TICK_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        settings.tick_interval_ms = v;
    }
    if let Some(v) = var("APP__TICK_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        settings.tick_interval_ms = v;
    }

    if let Some(v) = var("APP__MAX_WEDGES").and_then(|v| v.parse().ok()) {
        settings.max_wedges = v;
    }

    if let Some(v) = var("APP__ADD_PROBABILITY").and_then(|v| v.parse().ok()) {
        settings.add_probability = v;
    }

    if let Some(v) = var("APP__SEED").and_then(|v| v.parse().ok()) {
        settings.seed = Some(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
