#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use treeline_core::config::resolve_config;
use treeline_core::error::ErrorCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "treeline: arrow-line connections and execution order for behavior-tree scenes",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of treeline.toml discovery.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Print execution order labels",
        long_about = "Recompute execution order from the scene's root block and print every label.",
        after_help = "EXAMPLES:\n    # Show labels\n    treeline order scene.json\n\n    # Emit machine-readable output\n    treeline order scene.json --json"
    )]
    Order(cmd::order::OrderArgs),

    #[command(
        about = "Connect two blocks",
        long_about = "Add an arrow line from one block to another, displacing conflicting edges.",
        after_help = "EXAMPLES:\n    # Connect R to C and save\n    treeline connect scene.json R C --write"
    )]
    Connect(cmd::connect::ConnectArgs),

    #[command(
        about = "Remove an edge",
        long_about = "Dispose an arrow line by id and refresh execution order.",
        after_help = "EXAMPLES:\n    # Remove edge e1\n    treeline disconnect scene.json e1 --write"
    )]
    Disconnect(cmd::disconnect::DisconnectArgs),

    #[command(
        about = "Dispose a block",
        long_about = "Remove a block with its nested chain and every edge touching it.",
        after_help = "EXAMPLES:\n    # Remove block X\n    treeline dispose scene.json X --write"
    )]
    Dispose(cmd::dispose::DisposeArgs),

    #[command(
        about = "List edges",
        long_about = "List arrow lines as records, or as <arrowline> XML elements.",
        after_help = "EXAMPLES:\n    # List edges\n    treeline edges scene.json\n\n    # Export as XML\n    treeline edges scene.json --xml"
    )]
    Edges(cmd::edges::EdgesArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TREELINE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "treeline_core=debug,treeline=debug,info"
        } else {
            "treeline_core=warn,warn"
        })
    });

    let format = env::var("TREELINE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let output = cli.output_mode();
    let config = match resolve_config(&project_root, cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            output::render_error(
                output,
                &output::CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };
    info!(command = ?cli.command, "running");

    match &cli.command {
        Commands::Order(args) => cmd::order::run_order(args, &config, output),
        Commands::Connect(args) => cmd::connect::run_connect(args, &config, output),
        Commands::Disconnect(args) => cmd::disconnect::run_disconnect(args, &config, output),
        Commands::Dispose(args) => cmd::dispose::run_dispose(args, &config, output),
        Commands::Edges(args) => cmd::edges::run_edges(args, &config, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["treeline", "--json", "order", "scene.json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["treeline", "edges", "scene.json", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["treeline", "order", "scene.json", "--config", "alt.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn connect_takes_two_blocks() {
        let cli = Cli::parse_from(["treeline", "connect", "scene.json", "R", "C", "--write"]);
        match cli.command {
            Commands::Connect(args) => {
                assert_eq!((args.from.as_str(), args.to.as_str()), ("R", "C"));
                assert!(args.write);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbose_short_flag() {
        let cli = Cli::parse_from(["treeline", "-v", "order", "scene.json"]);
        assert!(cli.verbose);
    }
}
