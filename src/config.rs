//! Engine configuration for MiniDB
//!
//! Settings come from defaults, an optional JSON file, and finally the
//! environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Environment variable overriding [`EngineConfig::strict_mode`]
pub const STRICT_MODE_ENV: &str = "MINIDB_STRICT_MODE";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject strings longer than their VARCHAR column instead of truncating
    pub strict_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { strict_mode: true }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode
    pub fn strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_json(&content)?;
        config.apply_env_overrides()?;

        debug!(path = %path.display(), ?config, "engine config loaded");
        Ok(config)
    }

    /// Override fields from environment variables when present
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(STRICT_MODE_ENV) {
            self.override_strict_mode(&raw)?;
        }
        Ok(())
    }

    fn override_strict_mode(&mut self, raw: &str) -> Result<()> {
        self.strict_mode = match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(Error::Config(format!(
                    "invalid value '{}' for {}, expected true/false/1/0",
                    other, STRICT_MODE_ENV
                )))
            }
        };
        Ok(())
    }
}
