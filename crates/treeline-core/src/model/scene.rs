//! Scene files: a canvas and its edges as one JSON document.
//!
//! ```json
//! {
//!   "blocks": [{ "id": "R", "wrapper": true, "top": 0, "wrapped": "A" }, ...],
//!   "edges":  [{ "id": "e1", "from": "R", "to": "C" }]
//! }
//! ```
//!
//! Loading restores edges without the fan-in/fan-out rules so a saved scene
//! round-trips as written. An edge without an id aborts the load.

#![allow(clippy::module_name_repetitions)]

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::edge::codec::{self, CodecError, EdgeRecord};
use crate::edge::registry::EdgeRegistry;
use crate::error::ErrorCode;
use crate::model::block::BlockHost;

use super::canvas::{BlockSpec, Canvas};

/// On-disk scene layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// Errors raised while restoring a scene.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid scene JSON: {0}")]
    Parse(String),
    #[error("edge #{index} in scene: {source}")]
    Edge {
        index: usize,
        #[source]
        source: CodecError,
    },
}

impl SceneError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::SceneParseError,
            Self::Edge { source, .. } => source.code(),
        }
    }
}

/// A loaded scene: the block host plus its edge registry.
#[derive(Debug, Clone)]
pub struct Scene {
    pub canvas: Canvas,
    pub edges: EdgeRegistry,
}

impl Scene {
    /// Parse and restore a scene from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Parse`] for invalid JSON and
    /// [`SceneError::Edge`] for an edge without an id.
    pub fn from_json(text: &str, id_length: usize) -> Result<Self, SceneError> {
        let file: SceneFile =
            serde_json::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))?;
        Self::restore(file, id_length)
    }

    /// Restore a scene from its file form.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Edge`] for the first edge record without an
    /// id. No partial scene is returned.
    pub fn restore(file: SceneFile, id_length: usize) -> Result<Self, SceneError> {
        let canvas = Canvas::from_specs(file.blocks);
        let mut edges = EdgeRegistry::with_id_length(id_length);
        for (index, record) in file.edges.iter().enumerate() {
            let decoded =
                codec::from_record(record).map_err(|source| SceneError::Edge { index, source })?;
            if !canvas.contains(&decoded.from) || !canvas.contains(&decoded.to) {
                warn!(edge = %decoded.id, from = %decoded.from, to = %decoded.to, "edge references a missing block");
            }
            if edges.insert(Some(decoded.id), &decoded.from, &decoded.to).is_none() {
                warn!(index, "skipping edge with invalid endpoints");
            }
        }
        debug!(blocks = canvas.len(), edges = edges.len(), "scene restored");
        Ok(Self { canvas, edges })
    }

    /// File form of the current scene, edges with their ids.
    #[must_use]
    pub fn to_file(&self) -> SceneFile {
        SceneFile {
            blocks: self.canvas.specs().cloned().collect(),
            edges: self.edges.iter().map(|edge| codec::to_record(edge, false)).collect(),
        }
    }
}

/// Load and restore a scene from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid scene JSON, or
/// contains an edge without an id.
pub fn load_scene(path: &Path, id_length: usize) -> Result<Scene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    Scene::from_json(&text, id_length)
        .with_context(|| format!("failed to load scene {}", path.display()))
}

/// Write a scene back to disk as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_scene(path: &Path, scene: &Scene) -> Result<()> {
    let text = serde_json::to_string_pretty(&scene.to_file()).context("failed to serialize scene")?;
    std::fs::write(path, text + "\n")
        .with_context(|| format!("failed to write scene {}", path.display()))
}
