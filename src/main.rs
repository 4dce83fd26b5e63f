use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log_graph::{Commit, GitWalker, GraphModel, Node};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod report;

use config::Config;

#[derive(Parser)]
#[command(name = "loggraph")]
#[command(about = "Lay out a repository's commit history as a row graph", long_about = None)]
struct Cli {
    /// Config file (defaults to ./loggraph.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Path to the repository
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Number of commits to load (overrides graph.max_commits)
    #[arg(short = 'n', long)]
    count: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the visible rows of the graph
    Rows {
        #[command(flatten)]
        source: Source,
        /// Collapse every fragment before printing
        #[arg(long)]
        collapse: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print graph statistics
    Stats {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        json: bool,
    },
    /// List collapsible fragments
    Fragments {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8, config: &Config) -> Result<()> {
    let level = match verbose {
        0 => config.log.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = match std::env::var_os("RUST_LOG") {
        Some(_) => EnvFilter::try_from_default_env().context("Invalid RUST_LOG")?,
        None => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level {:?}", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// Walk the repository and build the model with configured pins
fn load(source: &Source, config: &Config) -> Result<(GraphModel, Vec<Commit>)> {
    let path = source
        .path
        .to_str()
        .context("Repository path is not valid UTF-8")?;
    let limit = source.count.unwrap_or(config.graph.max_commits);

    let walker = GitWalker::open(Some(path))?;
    let commits = walker.commits(Some(limit))?;
    let mut model = GraphModel::from_commits(&commits)
        .with_context(|| format!("Failed to build graph for {}", source.path.display()))?;

    let graph_config = config.graph.clone();
    model
        .fragment_controller()
        .set_always_visible(Box::new(move |node: &Node| {
            node.commit_id().is_some_and(|id| graph_config.is_pinned(id))
        }));

    info!(
        commits = commits.len(),
        rows = model.row_count(),
        head = ?walker.head(),
        "loaded graph"
    );
    Ok((model, commits))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config = Config::load(cli.config.as_deref(), &cwd)?;
    init_logging(cli.verbose, &config)?;
    debug!(?config, "starting");

    match cli.command {
        Commands::Rows {
            source,
            collapse,
            json,
        } => {
            let (mut model, commits) = load(&source, &config)?;
            if collapse || config.graph.collapse {
                let collapsed = model.fragment_controller().collapse_all()?;
                info!(fragments = collapsed.len(), "collapsed fragments");
            }
            let rows = report::row_reports(&model, &commits);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", report::render_rows(&rows));
            }
        }
        Commands::Stats { source, json } => {
            let (model, _) = load(&source, &config)?;
            let stats = model.graph().stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", report::render_stats(&stats));
            }
        }
        Commands::Fragments { source, json } => {
            let (mut model, _) = load(&source, &config)?;
            if config.graph.collapse {
                model.fragment_controller().collapse_all()?;
            }
            let fragments = report::fragment_reports(&model);
            if json {
                println!("{}", serde_json::to_string_pretty(&fragments)?);
            } else {
                print!("{}", report::render_fragments(&fragments));
            }
        }
    }

    Ok(())
}
