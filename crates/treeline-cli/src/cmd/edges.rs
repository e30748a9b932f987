//! `treeline edges`: list arrow lines.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use treeline_core::config::TreelineConfig;
use treeline_core::editor::EdgeFormat;

use super::Workspace;
use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct EdgesArgs {
    /// Scene file (JSON).
    pub scene: PathBuf,

    /// Print `<arrowline>` XML elements instead of records.
    #[arg(long)]
    pub xml: bool,

    /// Omit edge ids from the output.
    #[arg(long)]
    pub skip_id: bool,
}

#[derive(Debug, Serialize)]
struct EdgesReport {
    edges: Vec<EdgeRow>,
}

#[derive(Debug, Serialize)]
struct EdgeRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

pub fn run_edges(args: &EdgesArgs, config: &TreelineConfig, output: OutputMode) -> anyhow::Result<()> {
    let ws = Workspace::open(&args.scene, config)?;

    if args.xml {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for edge in ws.editor.edges().iter() {
            let xml = ws.editor.serialize_edge(edge.id(), EdgeFormat::Xml, args.skip_id)?;
            writeln!(out, "{xml}")?;
        }
        return Ok(());
    }

    let edges = ws
        .editor
        .edges()
        .iter()
        .map(|edge| EdgeRow {
            id: (!args.skip_id).then(|| edge.id().to_string()),
            from: edge.from_block().to_string(),
            to: edge.to_block().to_string(),
            path: edge.geometry().is_rendered().then(|| edge.geometry().path()),
        })
        .collect();
    render_mode(output, &EdgesReport { edges }, render_edges_text, render_edges_pretty)
}

fn render_edges_text(report: &EdgesReport, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &report.edges {
        writeln!(w, "{}\t{}\t{}", row.id.as_deref().unwrap_or("-"), row.from, row.to)?;
    }
    Ok(())
}

fn render_edges_pretty(report: &EdgesReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Edges ({})", report.edges.len()))?;
    for row in &report.edges {
        match &row.id {
            Some(id) => writeln!(w, "{id:<22} {} -> {}", row.from, row.to)?,
            None => writeln!(w, "{} -> {}", row.from, row.to)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_args_parse() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: EdgesArgs,
        }

        let parsed = Wrapper::parse_from(["test", "scene.json", "--xml", "--skip-id"]);
        assert!(parsed.args.xml);
        assert!(parsed.args.skip_id);
    }

    #[test]
    fn text_rows_use_dash_for_missing_id() {
        let report = EdgesReport {
            edges: vec![EdgeRow {
                id: None,
                from: "R".into(),
                to: "C".into(),
                path: None,
            }],
        };
        let mut out = Vec::new();
        render_edges_text(&report, &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "-\tR\tC\n");
    }

    #[test]
    fn pretty_lists_count() {
        let report = EdgesReport {
            edges: vec![EdgeRow {
                id: Some("e1".into()),
                from: "R".into(),
                to: "C".into(),
                path: Some("M0,0 L1,1".into()),
            }],
        };
        let mut out = Vec::new();
        render_edges_pretty(&report, &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.starts_with("Edges (1)"));
        assert!(rendered.contains("R -> C"));
    }
}
