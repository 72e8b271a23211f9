//! Application configuration, loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aq_core::UnitSystem;
use aq_project::GlobalDefaults;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Unit system of display output and chips.
    pub display_units: UnitSystem,
    /// Process-wide defaults; flowsheet defaults override them per field.
    pub defaults: GlobalDefaults,
    /// Rebuild a broken process graph from node positions before failing.
    pub auto_repair: bool,
    pub engine: EngineConfig,
    /// Where cached runs live. Unset means no caching.
    pub run_cache_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display_units: UnitSystem::Metric,
            defaults: GlobalDefaults::default(),
            auto_repair: true,
            engine: EngineConfig::default(),
            run_cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeout_s: u64,
    /// Engine build label; part of every run id.
    pub version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_s: 120,
            version: "0.1.0".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }
}

impl AppConfig {
    pub fn from_yaml_str(text: &str) -> AppResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
