use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::Vcs;

/// Test double recording every call as `"<op> <args>"`.
///
/// Operations listed in `failing` return an error after being recorded.
/// A successful clone creates `<dest>/.git` so later calls see a working copy.
#[derive(Debug, Default)]
pub struct RecordingVcs {
    pub calls: RefCell<Vec<String>>,
    pub failing: HashSet<&'static str>,
    pub branch_listing: String,
}

impl RecordingVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branches(mut self, listing: &str) -> Self {
        self.branch_listing = listing.to_string();
        self
    }

    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    fn record(&self, op: &'static str, arg: &str) -> Result<()> {
        let entry = if arg.is_empty() {
            op.to_string()
        } else {
            format!("{} {}", op, arg)
        };
        self.calls.borrow_mut().push(entry);
        if self.failing.contains(op) {
            bail!("{} failed", op);
        }
        Ok(())
    }
}

impl Vcs for RecordingVcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.record("clone", url)?;
        fs::create_dir_all(dest.join(".git"))?;
        Ok(())
    }

    fn fetch_all(&self, _cwd: &Path) -> Result<()> {
        self.record("fetch", "")
    }

    fn prune_remote(&self, _cwd: &Path) -> Result<()> {
        self.record("prune", "")
    }

    fn list_remote_branches(&self, _cwd: &Path) -> Result<String> {
        self.record("branches", "")?;
        Ok(self.branch_listing.clone())
    }

    fn branch_force(&self, name: &str, _cwd: &Path) -> Result<()> {
        self.record("branch", name)
    }

    fn checkout(&self, name: &str, _cwd: &Path) -> Result<()> {
        self.record("checkout", name)
    }

    fn hard_reset(&self, reference: &str, _cwd: &Path) -> Result<()> {
        self.record("reset", reference)
    }

    fn clean_untracked(&self, _cwd: &Path) -> Result<()> {
        self.record("clean", "")
    }
}
