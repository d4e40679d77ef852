//! Optional JSON settings read at startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::DEFAULT_HIT_RADIUS;

pub const CONFIG_ENV_VAR: &str = "QUADLABEL_CONFIG";
pub const CONFIG_FILE_NAME: &str = "quadlabel.json";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Half-width of the square around each corner that reacts to the pointer.
    pub hit_radius: i32,
    pub window_size: [f32; 2],
    pub prompt_message: String,
    /// Inserted between quad records in the output file. An empty string
    /// writes the records back to back.
    pub record_separator: String,
    pub frame_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hit_radius: DEFAULT_HIT_RADIUS,
            window_size: [1200.0, 800.0],
            prompt_message: "Enter the plate (ABC1234):".to_string(),
            record_separator: "\n".to_string(),
            frame_interval_ms: 20,
        }
    }
}

impl Config {
    /// `$QUADLABEL_CONFIG` if set, otherwise `quadlabel.json` in the working
    /// directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&data)
            .with_context(|| format!("invalid config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(data)?;
        if config.hit_radius <= 0 {
            log::warn!(
                "hit_radius must be positive (got {}), using {}",
                config.hit_radius,
                DEFAULT_HIT_RADIUS
            );
            config.hit_radius = DEFAULT_HIT_RADIUS;
        }
        Ok(config)
    }
}
