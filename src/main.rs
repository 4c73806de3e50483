//! # rsnap
//!
//! **rsnap** stages snapshots of external git projects.
//!
//! Features:
//! - Projects are defined in `rsnap.toml` (or `$RSNAP_CONFIG`)
//! - `rsnap list` shows configured projects and whether they are cached
//! - `rsnap fetch` clones/fetches a project into `.cache/repos/<name>`
//! - `rsnap branches` lists remote branches
//! - `rsnap checkout` hard-resets the cache to a branch (interactive if omitted)
//! - `rsnap stages` prints the stages derived from `snap/`
//! - `rsnap snap` runs the staged snapshot into a destination directory
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{Parser, Subcommand};
use rsnap::{
    SnapOptions, cmd_branches, cmd_checkout, cmd_fetch, cmd_list, cmd_snap, cmd_stages,
    config_path, load_config,
};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "rsnap",
    version,
    about = "rsnap - stage snapshots of cached git projects"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log git invocations and stage progress (same as RSNAP_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// List configured projects
    List,
    /// Clone or fetch a project into the cache
    Fetch { project: String },
    /// List remote branches of a project
    Branches { project: String },
    /// Check out a branch (prompts when omitted)
    Checkout {
        project: String,
        branch: Option<String>,
    },
    /// Show stages derived from the project's snap directory
    Stages { project: String },
    /// Stage a snapshot of a project
    Snap {
        project: String,
        /// Destination directory for copied files
        #[arg(short, long, required_unless_present = "dry_run")]
        dest: Option<PathBuf>,
        /// Branch to check out first
        #[arg(short, long, conflicts_with = "choose")]
        branch: Option<String>,
        /// Choose the branch interactively
        #[arg(long)]
        choose: bool,
        /// Print the stages instead of copying
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RSNAP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// CLI entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = load_config(&config_path(cli.config.as_deref()))?;

    match cli.cmd {
        Cmd::List => cmd_list(&cfg),
        Cmd::Fetch { project } => cmd_fetch(&cfg, &project),
        Cmd::Branches { project } => cmd_branches(&cfg, &project),
        Cmd::Checkout { project, branch } => cmd_checkout(&cfg, &project, branch.as_deref()),
        Cmd::Stages { project } => cmd_stages(&cfg, &project),
        Cmd::Snap {
            project,
            dest,
            branch,
            choose,
            dry_run,
        } => cmd_snap(
            &cfg,
            &project,
            &SnapOptions {
                dest,
                branch,
                choose,
                dry_run,
            },
        ),
    }
}
