use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

use super::{REMOTE, SSH_ENV_VAR, Vcs};

/// [`Vcs`] backend driving the `git` command-line tool.
///
/// Each invocation inherits the process environment plus the overrides held
/// here (at least `GIT_SSH` when a wrapper is configured). Output is always
/// captured; stdout/stderr end up in debug logs or in the returned error.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
    env: Vec<(OsString, OsString)>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
            env: Vec::new(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route ssh transport through `wrapper` by overriding `GIT_SSH`.
    pub fn with_ssh_wrapper(self, wrapper: impl Into<PathBuf>) -> Self {
        self.with_env(SSH_ENV_VAR, wrapper.into())
    }

    /// Add an environment override. Later overrides for the same key win.
    pub fn with_env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        let key = key.as_ref().to_os_string();
        self.env.retain(|(k, _)| *k != key);
        self.env.push((key, value.as_ref().to_os_string()));
        self
    }

    pub fn env(&self) -> &[(OsString, OsString)] {
        &self.env
    }

    fn command<I, S>(&self, args: I, cwd: &Path) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(cwd)
            .envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd
    }

    fn output(&self, args: &[&OsStr], cwd: &Path) -> Result<Output> {
        let line = render(args);
        debug!(cwd = %cwd.display(), "git {}", line);
        let out = self
            .command(args, cwd)
            .output()
            .with_context(|| format!("failed to spawn git {}", line))?;

        let stderr = String::from_utf8_lossy(&out.stderr);
        if !stderr.trim().is_empty() {
            debug!("git {}: {}", line, stderr.trim_end());
        }
        if !out.status.success() {
            bail!(
                "git {} exited with {}: {}",
                line,
                out.status,
                stderr.trim_end()
            );
        }
        Ok(out)
    }

    fn run(&self, args: &[&str], cwd: &Path) -> Result<()> {
        let args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();
        self.output(&args, cwd).map(|_| ())
    }
}

fn render(args: &[&OsStr]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Vcs for GitCli {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let target = dest.file_name().unwrap_or(dest.as_os_str());
        self.output(
            &[OsStr::new("clone"), OsStr::new(url), target],
            parent,
        )
        .map(|_| ())
    }

    fn fetch_all(&self, cwd: &Path) -> Result<()> {
        self.run(&["fetch", "-v", "--all"], cwd)
    }

    fn prune_remote(&self, cwd: &Path) -> Result<()> {
        self.run(&["remote", "prune", REMOTE], cwd)
    }

    fn list_remote_branches(&self, cwd: &Path) -> Result<String> {
        let out = self.output(&[OsStr::new("branch"), OsStr::new("-r")], cwd)?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn branch_force(&self, name: &str, cwd: &Path) -> Result<()> {
        self.run(&["branch", "-f", name], cwd)
    }

    fn checkout(&self, name: &str, cwd: &Path) -> Result<()> {
        self.run(&["checkout", name], cwd)
    }

    fn hard_reset(&self, reference: &str, cwd: &Path) -> Result<()> {
        self.run(&["reset", "--hard", reference], cwd)
    }

    fn clean_untracked(&self, cwd: &Path) -> Result<()> {
        self.run(&["clean", "-f", "-d"], cwd)
    }
}
