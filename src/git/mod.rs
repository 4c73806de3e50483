//! Git integration layer.
//!
//! The rest of the crate talks to git only through the [`Vcs`] trait, one
//! method per operation. [`GitCli`] is the real backend and shells out to the
//! `git` binary so that `GIT_SSH` wrappers are honored; tests substitute a
//! recording fake.
//!
//! Every method reports a non-zero exit as an `Err`. Whether that error
//! matters is decided by the caller (see [`crate::project::Project`]).

mod cli;
#[cfg(test)]
pub(crate) mod fake;

use anyhow::Result;
use std::path::Path;

pub use cli::GitCli;

/// Environment variable pointing git's ssh transport at a helper script.
pub const SSH_ENV_VAR: &str = "GIT_SSH";

/// Remote whose tracking refs are used as checkout targets.
pub const REMOTE: &str = "origin";

/// Operations the project layer needs from a version-control tool.
pub trait Vcs {
    /// Clone `url` into `dest`. The parent of `dest` must already exist.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch every remote of the working copy at `cwd`.
    fn fetch_all(&self, cwd: &Path) -> Result<()>;

    /// Drop remote-tracking refs whose branch no longer exists upstream.
    fn prune_remote(&self, cwd: &Path) -> Result<()>;

    /// Raw remote-branch listing (`git branch -r` format).
    fn list_remote_branches(&self, cwd: &Path) -> Result<String>;

    /// Create or move the local branch `name` to the current HEAD.
    fn branch_force(&self, name: &str, cwd: &Path) -> Result<()>;

    fn checkout(&self, name: &str, cwd: &Path) -> Result<()>;

    /// Hard-reset the working copy to `reference`.
    fn hard_reset(&self, reference: &str, cwd: &Path) -> Result<()>;

    /// Remove untracked files and directories.
    fn clean_untracked(&self, cwd: &Path) -> Result<()>;
}
