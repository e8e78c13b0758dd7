//! depgraph CLI - build and query static dependency graphs of Python projects

mod command;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(author, version, about = "Static dependency graphs for Python projects", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG also works
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to <repo>/depgraph.toml when building)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dependency graph of a project and save it as JSON
    Build {
        /// Project root
        repo: PathBuf,

        /// Graph file to write
        #[arg(short, long, default_value = "dependency_graph.json")]
        output: PathBuf,
    },

    /// List entry points of a saved graph
    Entrypoints {
        graph: PathBuf,

        /// Naming marker (overrides the config's entry_marker)
        #[arg(long)]
        marker: Option<String>,
    },

    /// Print a component followed by everything it depends on
    Closure {
        graph: PathBuf,

        /// Component id, e.g. pkg.mod.Class.method
        id: String,

        /// Print full component records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print component ids with dependencies before dependents
    Order { graph: PathBuf },

    /// Summarize a saved graph
    Stats {
        graph: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Build { repo, output } => command::build(&repo, &output, config),
        Commands::Entrypoints { graph, marker } => {
            command::entrypoints(&graph, marker.as_deref(), config)
        }
        Commands::Closure { graph, id, json } => command::closure(&graph, &id, json),
        Commands::Order { graph } => command::order(&graph),
        Commands::Stats { graph, json } => command::stats(&graph, json, config),
    }
}
