use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// A split costs 16 containment checks; 16 / ln(4), truncated.
pub const DEFAULT_CAPACITY: usize = 11;

/// Leaves this deep never split, so coordinates one ulp apart cannot recurse
/// forever.
pub const DEFAULT_MAX_DEPTH: u32 = 48;

/// Tree tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Distinct coordinates a leaf may hold before it splits.
    pub capacity: usize,
    /// Leaves at this depth keep growing instead of splitting.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads `path`, falling back to the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
