//! # Configuration Management Module
//!
//! Configuration for the `habitquest` CLI: engine defaults, storage location and
//! logging. The progression library itself takes every parameter explicitly;
//! this module only supplies the values the binary passes in.
//!
//! ## Configuration Structure
//!
//! - [`EngineConfig`] - Default heal/damage points, calendar offset, future-login policy
//! - [`StorageConfig`] - Sled database location
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Configuration File Format
//!
//! ```toml
//! [engine]
//! default_heal_points = 15
//! default_damage_points = 25
//! utc_offset_minutes = 0
//! future_login_policy = "ignore"
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "habitquest.log"
//! ```
//!
//! Every key in `[engine]` is optional and falls back to the defaults above.

use anyhow::{anyhow, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::progression::{FutureLoginPolicy, DEFAULT_DAMAGE_POINTS, DEFAULT_HEAL_POINTS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Points restored by `heal` when `--points` is not given.
    #[serde(default = "default_heal_points")]
    pub default_heal_points: u32,
    /// Points removed by `damage` when `--points` is not given.
    #[serde(default = "default_damage_points")]
    pub default_damage_points: u32,
    /// Offset from UTC, in minutes, used to decide calendar days for streaks.
    /// Must lie strictly within ±24h.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// What to do when a stored last login is dated after today.
    #[serde(default)]
    pub future_login_policy: FutureLoginPolicy,
}

fn default_heal_points() -> u32 {
    DEFAULT_HEAL_POINTS
}

fn default_damage_points() -> u32 {
    DEFAULT_DAMAGE_POINTS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_heal_points: DEFAULT_HEAL_POINTS,
            default_damage_points: DEFAULT_DAMAGE_POINTS,
            utc_offset_minutes: 0,
            future_login_policy: FutureLoginPolicy::Ignore,
        }
    }
}

impl EngineConfig {
    /// Time zone used for streak calendar days.
    pub fn calendar_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            anyhow!(
                "utc_offset_minutes {} is outside ±1439",
                self.utc_offset_minutes
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the Sled database path; defaults to `<data_dir>/characters`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn character_db_path(&self) -> String {
        match &self.db_path {
            Some(path) => path.clone(),
            None => format!("{}/characters", self.data_dir.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.engine.calendar_offset()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig::default(),
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("habitquest.log".to_string()),
            },
        }
    }
}
