//! Crate entry point for **rsnap**.
//!
//! rsnap mirrors external git projects into a local cache and stages
//! snapshots of selected files from them. Each submodule owns one concern
//! (configuration, git access, snapshot markers, staging, CLI commands).
//! The `pub use` re-exports make the main types reachable from `rsnap::*`.

mod commands;
mod config;
mod git;
mod paths;
mod progress;
mod project;
mod select;
mod snap;
mod snapshot;

pub use commands::{SnapOptions, cmd_branches, cmd_checkout, cmd_fetch, cmd_list, cmd_snap, cmd_stages};
pub use config::{Config, ProjectEntry, config_path, load_config, parse_config};
pub use git::{GitCli, SSH_ENV_VAR, Vcs};
pub use paths::{DEFAULT_CACHE_ROOT, Layout, SNAP_DIR};
pub use project::{Project, parse_remote_branches};
pub use select::{Selector, TerminalSelector};
pub use snap::{SnapDir, Stage};
pub use snapshot::{PlanSink, RsyncSink, StageSink, run_snapshot};
