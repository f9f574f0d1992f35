//! Geocoder configuration from `<config_dir>/unlogeo/config.toml`.
//!
//! Every field is optional in the file; the CLI overrides whatever is loaded.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api";

/// Settings handed to the geocoding client at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Places API key. Empty means "not configured".
    pub api_key: String,
    /// Base URL of the Maps API (without the `/place/...` suffix).
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Append " port" to names that do not already mention a port.
    pub append_port_suffix: bool,
    /// Pause between consecutive requests in a batch run.
    pub request_delay_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            append_port_suffix: true,
            request_delay_ms: 0,
        }
    }
}

impl GeocoderConfig {
    /// Load from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific path. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = toml::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// `~/.config/unlogeo/config.toml` on Linux, the platform equivalent elsewhere.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("unlogeo").join("config.toml"))
}
