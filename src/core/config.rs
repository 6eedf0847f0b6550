//=========================================================================
// Game Configuration
//=========================================================================
//
// TOML-backed settings: game information, runtime pacing, and the scene
// catalog. Every section is optional and falls back to defaults.
//
//   [info]          title / description / credits
//   [runtime]       tps / channel_capacity / load_latency_ms
//   [scenes]        levels = [...]
//   [scenes.names]  logical name = "SceneId"
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

//=== Internal Dependencies ===============================================

use crate::core::scene::SceneCatalog;

//=== ConfigError =========================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

//=== GameInfo ============================================================

/// General information about the game, shown by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameInfo {
    pub title: String,
    pub description: String,
    pub credits: String,
}

impl Default for GameInfo {
    fn default() -> Self {
        Self {
            title: "Untitled Game".to_string(),
            description: "Short Game Description".to_string(),
            credits: "By Your Name".to_string(),
        }
    }
}

//=== RuntimeConfig =======================================================

/// Logic-loop settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Logic ticks per second.
    pub tps: f64,

    /// Capacity of the command channel.
    pub channel_capacity: usize,

    /// Simulated duration of every load/unload for the threaded loader.
    pub load_latency_ms: u64,
}

impl RuntimeConfig {
    /// `load_latency_ms` as a `Duration`.
    pub fn load_latency(&self) -> Duration {
        Duration::from_millis(self.load_latency_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            load_latency_ms: 0,
        }
    }
}

//=== GameConfig ==========================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub info: GameInfo,
    pub runtime: RuntimeConfig,
    pub scenes: SceneCatalog,
}

impl GameConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&source)?;
        info!("Loaded config '{}' from {}", config.info.title, path.display());
        Ok(config)
    }

    /// Rejects a non-positive tick rate or channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.runtime.tps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "runtime.tps must be positive, got {}",
                self.runtime.tps
            )));
        }
        if self.runtime.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "runtime.channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
