//! Subcommand handlers.
//!
//! Every command loads a scene file into a [`Workspace`], applies its change
//! through the core [`Editor`], recomputes order from the scene's root, and
//! optionally writes the scene back.

pub mod connect;
pub mod disconnect;
pub mod dispose;
pub mod edges;
pub mod order;

use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::debug;
use treeline_core::config::TreelineConfig;
use treeline_core::editor::Editor;
use treeline_core::model::block::BlockHost;
use treeline_core::model::canvas::Canvas;
use treeline_core::model::scene::{Scene, load_scene, save_scene};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// A loaded scene plus the editor state driving it.
pub struct Workspace {
    pub canvas: Canvas,
    pub editor: Editor,
}

impl Workspace {
    /// Load `path` and decorate every top-level block with connectors.
    pub fn open(path: &Path, config: &TreelineConfig) -> anyhow::Result<Self> {
        let Scene { canvas, edges } = load_scene(path, config.edges.id_length)?;
        let mut editor = Editor::with_edges(config.clone(), edges);
        let tops: Vec<String> = canvas.top_blocks().into_iter().map(str::to_string).collect();
        for block in &tops {
            editor.attach_connectors(&canvas, block);
        }
        editor.run_deferred();
        debug!(path = %path.display(), blocks = canvas.len(), edges = editor.edges().len(), "workspace opened");
        Ok(Self { canvas, editor })
    }

    /// First top-level block eligible as a tree root.
    pub fn root(&self) -> Option<String> {
        self.canvas
            .top_blocks()
            .into_iter()
            .find(|block| self.canvas.is_top_or_wrapping_top(block))
            .map(str::to_string)
    }

    /// Rebuild every label from the root. Returns the root used, if any.
    pub fn recompute(&mut self) -> Option<String> {
        let root = self.root()?;
        self.editor.recompute_order(&mut self.canvas, &root)?;
        Some(root)
    }

    pub fn report(&self, root: Option<String>) -> OrderReport {
        let labels = self
            .canvas
            .specs()
            .map(|spec| LabelRow {
                block: spec.id.clone(),
                order: spec.order,
                badge: self.editor.badge_text(&self.canvas, &spec.id),
            })
            .collect();
        OrderReport { root, labels }
    }

    pub fn save(self, path: &Path) -> anyhow::Result<()> {
        let scene = Scene {
            canvas: self.canvas,
            edges: self.editor.into_edges(),
        };
        save_scene(path, &scene).with_context(|| format!("failed to save {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelRow {
    pub block: String,
    pub order: Option<u32>,
    pub badge: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderReport {
    pub root: Option<String>,
    pub labels: Vec<LabelRow>,
}

pub fn render_order_text(report: &OrderReport, w: &mut dyn Write) -> io::Result<()> {
    for row in &report.labels {
        writeln!(w, "{}\t{}", row.block, row.badge)?;
    }
    Ok(())
}

pub fn render_order_pretty(report: &OrderReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Execution order")?;
    pretty_kv(w, "root", report.root.as_deref().unwrap_or("(none)"))?;
    for row in &report.labels {
        pretty_kv(w, &row.block, &row.badge)?;
    }
    Ok(())
}

pub fn render_order(mode: OutputMode, report: &OrderReport) -> anyhow::Result<()> {
    render_mode(mode, report, render_order_text, render_order_pretty)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    use tempfile::TempDir;

    pub const SCENE: &str = r#"{
        "blocks": [
            { "id": "R", "wrapper": true, "top": 0, "wrapped": "A" },
            { "id": "A", "kind": "top", "top": 20, "next": "B" },
            { "id": "B", "top": 40 },
            { "id": "C", "wrapper": true, "top": 100, "wrapped": "D" },
            { "id": "D", "top": 120 },
            { "id": "X", "wrapper": true, "top": 200, "wrapped": "x1" },
            { "id": "x1", "top": 220 }
        ],
        "edges": [{ "id": "e1", "from": "R", "to": "C" }]
    }"#;

    pub fn scene_file() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("scene.json");
        std::fs::write(&path, SCENE).expect("write scene");
        (dir, path)
    }
}
