//! `treeline dispose`: remove a block and cascade to its edges.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use treeline_core::config::TreelineConfig;
use treeline_core::error::ErrorCode;
use treeline_core::model::block::BlockHost;

use super::{OrderReport, Workspace, render_order_pretty, render_order_text};
use crate::output::{CliError, OutputMode, render_error, render_mode};

#[derive(Args, Debug)]
pub struct DisposeArgs {
    /// Scene file (JSON).
    pub scene: PathBuf,

    /// Block to remove, with its nested and following blocks.
    pub block: String,

    /// Save the scene after disposing.
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
struct DisposeReport {
    removed_blocks: Vec<String>,
    removed_edges: usize,
    order: OrderReport,
}

pub fn run_dispose(args: &DisposeArgs, config: &TreelineConfig, output: OutputMode) -> anyhow::Result<()> {
    let mut ws = Workspace::open(&args.scene, config)?;
    if !ws.canvas.contains(&args.block) {
        render_error(output, &CliError::from_code(ErrorCode::BlockNotFound, &args.block))?;
        anyhow::bail!("block not found: {}", args.block);
    }

    let edges_before = ws.editor.edges().len();
    let manager = ws.editor.order_manager(&ws.canvas, &args.block);
    let removed_blocks = ws.canvas.dispose(&args.block);
    ws.editor.block_disposed(&mut ws.canvas, &manager);
    let removed_edges = edges_before - ws.editor.edges().len();
    let root = ws.recompute();

    let report = DisposeReport {
        removed_blocks,
        removed_edges,
        order: ws.report(root),
    };
    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "removed\t{}\t{}", r.removed_blocks.join(","), r.removed_edges)?;
            render_order_text(&r.order, w)
        },
        |r, w| {
            writeln!(
                w,
                "Removed {} block(s) and {} edge(s): {}",
                r.removed_blocks.len(),
                r.removed_edges,
                r.removed_blocks.join(", ")
            )?;
            writeln!(w)?;
            render_order_pretty(&r.order, w)
        },
    )?;

    if args.write {
        ws.save(&args.scene)?;
    }
    Ok(())
}
