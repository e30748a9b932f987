use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::edge::DEFAULT_ID_LENGTH;

/// Config file names probed under a project root, in precedence order.
pub const CONFIG_CANDIDATES: [&str; 2] = ["treeline.toml", ".treeline/config.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreelineConfig {
    #[serde(default)]
    pub connector: ConnectorConfig,
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub edges: EdgeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default = "default_connector_width")]
    pub width: f64,
    #[serde(default = "default_connector_height")]
    pub height: f64,
    /// Horizontal gap between an INPUT connector and the arrow tip.
    #[serde(default = "default_line_gap")]
    pub line_gap: f64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            width: default_connector_width(),
            height: default_connector_height(),
            line_gap: default_line_gap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Badge text shown for a block with no order label.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Clear labels on top-level chains outside the rebuilt tree.
    #[serde(default = "default_true")]
    pub reset_outside: bool,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            reset_outside: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeConfig {
    #[serde(default = "default_id_length")]
    pub id_length: usize,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            id_length: default_id_length(),
        }
    }
}

/// Load config from an explicit file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<TreelineConfig> {
    if !path.exists() {
        return Ok(TreelineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TreelineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Find the first config candidate present under `project_root`.
pub fn find_config(project_root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| project_root.join(candidate))
        .find(|path| path.exists())
}

/// Resolve config for a project: an explicit path wins, then the first
/// candidate under `project_root`, then defaults.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn resolve_config(project_root: &Path, explicit: Option<&Path>) -> Result<TreelineConfig> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| find_config(project_root));
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config(&path)
        }
        None => Ok(TreelineConfig::default()),
    }
}

const fn default_true() -> bool {
    true
}

const fn default_connector_width() -> f64 {
    20.0
}

const fn default_connector_height() -> f64 {
    60.0
}

const fn default_line_gap() -> f64 {
    4.0
}

fn default_placeholder() -> String {
    "...".to_string()
}

const fn default_id_length() -> usize {
    DEFAULT_ID_LENGTH
}
