use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use crate::git::{REMOTE, Vcs};
use crate::paths::{Layout, SNAP_DIR, validate_project_name};
use crate::select::Selector;
use crate::snap::{EXCLUDES, INCLUDES, POST_SNAP, SnapDir, Stage};

/// One external project mirrored in the local cache.
///
/// Git failures are never raised from here: a failed clone leaves the cache
/// without `.git` (so the next call retries), a failed fetch is not retried
/// within the same instance, and checkout runs every step regardless. The end
/// state is checked by looking at the filesystem, not at exit codes.
///
/// Not safe to use concurrently with another instance on the same cache dir.
#[derive(Debug)]
pub struct Project<V: Vcs> {
    name: String,
    url: String,
    layout: Layout,
    vcs: V,
    fetched: bool,
}

impl<V: Vcs> Project<V> {
    /// # Errors
    /// Returns an error if `name` cannot be used as a cache directory name.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        layout: Layout,
        vcs: V,
    ) -> Result<Self> {
        let name = name.into();
        validate_project_name(&name)?;
        Ok(Self {
            name,
            url: url.into(),
            layout,
            vcs,
            fetched: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    pub fn cache_path(&self) -> PathBuf {
        self.layout.project_dir(&self.name)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.layout.snap_dir(&self.name)
    }

    fn snap(&self) -> SnapDir {
        SnapDir::new(self.snapshot_dir())
    }

    /// Whether the cache holds a working copy (has `.git` metadata).
    pub fn is_cloned(&self) -> bool {
        self.cache_path().join(".git").is_dir()
    }

    /// Clone into the cache unless a working copy is already there.
    pub fn ensure_cloned(&self) {
        let root = self.layout.cache_root();
        if let Err(e) = fs::create_dir_all(root) {
            warn!("cannot create cache root {}: {}", root.display(), e);
        }
        if self.is_cloned() {
            return;
        }

        info!("cloning {} from {}", self.name, self.url);
        if let Err(e) = self.vcs.clone_repo(&self.url, &self.cache_path()) {
            warn!("clone of {} failed: {:#}", self.name, e);
        }
    }

    /// Clone if needed, then fetch at most once for this instance.
    pub fn ensure_fetched(&mut self) {
        self.ensure_cloned();
        if self.fetched {
            return;
        }

        self.fetched = true;
        info!("fetching {}", self.name);
        if let Err(e) = self.vcs.fetch_all(&self.cache_path()) {
            warn!("fetch of {} failed: {:#}", self.name, e);
        }
    }

    /// Names of the remote branches, in listing order.
    ///
    /// An unreadable listing yields an empty vector.
    pub fn list_remote_branches(&mut self) -> Vec<String> {
        self.ensure_fetched();
        let cwd = self.cache_path();
        if let Err(e) = self.vcs.prune_remote(&cwd) {
            warn!("pruning {} failed: {:#}", self.name, e);
        }
        match self.vcs.list_remote_branches(&cwd) {
            Ok(out) => parse_remote_branches(&out),
            Err(e) => {
                warn!("listing branches of {} failed: {:#}", self.name, e);
                Vec::new()
            }
        }
    }

    /// Point the working copy at `origin/<branch>` and wipe local changes.
    ///
    /// All four steps run even if an earlier one fails.
    pub fn checkout_branch(&mut self, branch: &str) {
        self.ensure_fetched();
        info!("checking out {} in {}", branch, self.name);

        let cwd = self.cache_path();
        let remote_ref = format!("{}/{}", REMOTE, branch);
        let steps = [
            ("branch", self.vcs.branch_force(branch, &cwd)),
            ("checkout", self.vcs.checkout(branch, &cwd)),
            ("reset", self.vcs.hard_reset(&remote_ref, &cwd)),
            ("clean", self.vcs.clean_untracked(&cwd)),
        ];
        for (step, res) in steps {
            if let Err(e) = res {
                warn!("{} step for {} failed: {:#}", step, self.name, e);
            }
        }
    }

    /// Branch HEAD is attached to, read from `.git/HEAD`.
    ///
    /// `None` when the cache is not cloned or HEAD is detached.
    pub fn current_branch(&self) -> Option<String> {
        let head = fs::read_to_string(self.cache_path().join(".git").join("HEAD")).ok()?;
        head.trim()
            .strip_prefix("ref: refs/heads/")
            .map(str::to_string)
    }

    /// Let the user pick a remote branch, check it out and return its name.
    ///
    /// # Errors
    /// Returns whatever the selector returns, e.g. when input ends or there
    /// is nothing to choose from.
    pub fn choose_and_checkout_branch<S: Selector + ?Sized>(
        &mut self,
        selector: &mut S,
    ) -> Result<String> {
        let options: Vec<(String, String)> = self
            .list_remote_branches()
            .into_iter()
            .map(|b| (b.clone(), b))
            .collect();
        let prompt = format!("Choose a branch from {}", self.name);
        let branch = selector.select(&prompt, &options)?;
        self.checkout_branch(&branch);
        Ok(branch)
    }

    /// Lines of `snap/<name>`, or an empty vector when it cannot be read.
    pub fn read_snapshot_file(&self, name: &str) -> Vec<String> {
        self.snap().read_lines(name)
    }

    pub fn get_includes(&self) -> Vec<String> {
        self.read_snapshot_file(INCLUDES)
    }

    pub fn get_excludes(&self) -> Vec<String> {
        self.read_snapshot_file(EXCLUDES)
    }

    /// Run `snap/<script>` from the project directory if it exists.
    ///
    /// Exit status is logged only; a missing script is a no-op.
    pub fn run_snapshot_script(&self, script: &str) {
        if !self.snap().has_file(script) {
            debug!("no {} script for {}", script, self.name);
            return;
        }

        let rel = Path::new(".").join(SNAP_DIR).join(script);
        info!("running {} for {}", rel.display(), self.name);
        match Command::new(&rel).current_dir(self.cache_path()).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("{} for {} exited with {}", script, self.name, status),
            Err(e) => warn!("cannot run {} for {}: {}", script, self.name, e),
        }
    }

    pub fn run_post_snapshot_hook(&self) {
        self.run_snapshot_script(POST_SNAP);
    }

    pub fn get_stages(&self) -> Vec<Stage> {
        self.snap().stages()
    }
}

/// Parse `git branch -r` output into branch names.
///
/// Lines mentioning `HEAD` (the symbolic default-branch pointer) are
/// dropped, as are lines without a `/` and lines whose second token is
/// blank (`origin/`). The name is the second `/`-separated token, so
/// `origin/feature/x` yields `feature`.
pub fn parse_remote_branches(out: &str) -> Vec<String> {
    out.lines()
        .filter(|line| !line.contains("HEAD"))
        .filter_map(|line| line.split('/').nth(1))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
