//! `treeline order`: recompute and print execution order.

use std::path::PathBuf;

use clap::Args;
use treeline_core::config::TreelineConfig;

use super::{Workspace, render_order};
use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Scene file (JSON).
    pub scene: PathBuf,

    /// Write the recomputed labels back to the scene file.
    #[arg(long)]
    pub write: bool,
}

pub fn run_order(args: &OrderArgs, config: &TreelineConfig, output: OutputMode) -> anyhow::Result<()> {
    let mut ws = Workspace::open(&args.scene, config)?;
    let root = ws.recompute();
    if root.is_none() {
        tracing::warn!(scene = %args.scene.display(), "no root block; labels left as saved");
    }
    render_order(output, &ws.report(root))?;
    if args.write {
        ws.save(&args.scene)?;
    }
    Ok(())
}
