//! Client configuration loaded from TOML. Every section falls back to its
//! defaults, so partial files work.

use std::path::Path;

use pendula_platform::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::geometry::Viewport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub length1: f64,
    pub length2: f64,
    pub link_width: f32,
    pub trail_width: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            length1: 100.0,
            length2: 100.0,
            link_width: 2.0,
            trail_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Repaint from inbound updates even while paused (server is authoritative).
    pub apply_while_paused: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            apply_while_paused: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    pub timeout_secs: u64,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    pub viewport: Viewport,
    pub chain: ChainConfig,
    pub sync: SyncConfig,
    pub fractal: FractalConfig,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }
}
