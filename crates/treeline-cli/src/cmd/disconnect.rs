//! `treeline disconnect`: remove an arrow line by id.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use treeline_core::config::TreelineConfig;
use treeline_core::edge::EdgeId;
use treeline_core::error::ErrorCode;

use super::{OrderReport, Workspace, render_order_pretty, render_order_text};
use crate::output::{CliError, OutputMode, render_error, render_mode};

#[derive(Args, Debug)]
pub struct DisconnectArgs {
    /// Scene file (JSON).
    pub scene: PathBuf,

    /// Id of the edge to remove.
    pub edge: String,

    /// Save the scene after disconnecting.
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
struct DisconnectReport {
    edge: String,
    from: String,
    to: String,
    order: OrderReport,
}

pub fn run_disconnect(args: &DisconnectArgs, config: &TreelineConfig, output: OutputMode) -> anyhow::Result<()> {
    let mut ws = Workspace::open(&args.scene, config)?;
    let id = EdgeId::new(args.edge.as_str());
    let Some(edge) = ws.editor.dispose_edge(&mut ws.canvas, &id) else {
        render_error(output, &CliError::from_code(ErrorCode::EdgeNotFound, &args.edge))?;
        anyhow::bail!("edge not found: {}", args.edge);
    };
    let root = ws.recompute();

    let report = DisconnectReport {
        edge: args.edge.clone(),
        from: edge.from_block().to_string(),
        to: edge.to_block().to_string(),
        order: ws.report(root),
    };
    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "removed\t{}", r.edge)?;
            render_order_text(&r.order, w)
        },
        |r, w| {
            writeln!(w, "Removed {} -> {} ({})", r.from, r.to, r.edge)?;
            writeln!(w)?;
            render_order_pretty(&r.order, w)
        },
    )?;

    if args.write {
        ws.save(&args.scene)?;
    }
    Ok(())
}
