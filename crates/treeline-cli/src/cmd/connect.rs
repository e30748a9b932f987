//! `treeline connect`: add an arrow line between two blocks.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;
use treeline_core::config::TreelineConfig;
use treeline_core::error::ErrorCode;
use treeline_core::model::block::BlockHost;

use super::{OrderReport, Workspace, render_order_pretty, render_order_text};
use crate::output::{CliError, OutputMode, render_error, render_mode};

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Scene file (JSON).
    pub scene: PathBuf,

    /// Source block (the parent).
    pub from: String,

    /// Target block (the child).
    pub to: String,

    /// Save the scene after connecting.
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
struct ConnectReport {
    /// New edge id, or `None` if the request was a no-op.
    edge: Option<String>,
    from: String,
    to: String,
    order: OrderReport,
}

pub fn run_connect(args: &ConnectArgs, config: &TreelineConfig, output: OutputMode) -> anyhow::Result<()> {
    let mut ws = Workspace::open(&args.scene, config)?;
    for block in [&args.from, &args.to] {
        if !ws.canvas.contains(block) {
            render_error(output, &CliError::from_code(ErrorCode::BlockNotFound, block))?;
            anyhow::bail!("block not found: {block}");
        }
    }

    let edge = ws.editor.commit_gesture_edge(&mut ws.canvas, &args.from, &args.to);
    match &edge {
        Some(id) => info!(edge = %id, "connected"),
        None => info!(from = %args.from, to = %args.to, "connection rejected"),
    }
    let root = ws.recompute();

    let report = ConnectReport {
        edge: edge.map(|id| id.to_string()),
        from: args.from.clone(),
        to: args.to.clone(),
        order: ws.report(root),
    };
    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "edge\t{}", r.edge.as_deref().unwrap_or("-"))?;
            render_order_text(&r.order, w)
        },
        |r, w| {
            match &r.edge {
                Some(id) => writeln!(w, "Connected {} -> {} ({id})", r.from, r.to)?,
                None => writeln!(w, "No change: {} -> {} was rejected", r.from, r.to)?,
            }
            writeln!(w)?;
            render_order_pretty(&r.order, w)
        },
    )?;

    if args.write {
        ws.save(&args.scene)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::fixtures::scene_file;
    use treeline_core::model::scene::load_scene;

    #[test]
    fn connect_args_parse() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ConnectArgs,
        }

        let parsed = Wrapper::parse_from(["test", "scene.json", "C", "X"]);
        assert_eq!(parsed.args.from, "C");
        assert_eq!(parsed.args.to, "X");
        assert!(!parsed.args.write);
    }

    #[test]
    fn connect_with_write_saves_edge() {
        let (_dir, path) = scene_file();
        let args = ConnectArgs {
            scene: path.clone(),
            from: "C".into(),
            to: "X".into(),
            write: true,
        };
        run_connect(&args, &TreelineConfig::default(), OutputMode::Json).expect("run");
        let scene = load_scene(&path, 20).expect("reload");
        assert_eq!(scene.edges.len(), 2);
        assert!(scene.edges.between("C", "X").is_some());
    }

    #[test]
    fn self_edge_is_not_an_error() {
        let (_dir, path) = scene_file();
        let args = ConnectArgs {
            scene: path,
            from: "C".into(),
            to: "C".into(),
            write: false,
        };
        assert!(run_connect(&args, &TreelineConfig::default(), OutputMode::Json).is_ok());
    }

    #[test]
    fn unknown_block_fails() {
        let (_dir, path) = scene_file();
        let args = ConnectArgs {
            scene: path,
            from: "C".into(),
            to: "nope".into(),
            write: false,
        };
        assert!(run_connect(&args, &TreelineConfig::default(), OutputMode::Json).is_err());
    }
}
