use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use super::StageSink;
use crate::snap::Stage;

/// Copies each stage's selection into `dest` with `rsync -a --relative`.
///
/// Paths are preserved relative to the project directory. Include patterns
/// are passed before exclude patterns, and `.git` is always excluded.
#[derive(Debug, Clone)]
pub struct RsyncSink {
    dest: PathBuf,
}

impl RsyncSink {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }
}

/// Build the rsync argument list for one stage. `dest` must be absolute.
fn rsync_args(
    dest: &Path,
    stage: &Stage,
    includes: &[String],
    excludes: &[String],
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-a".into(), "--relative".into()];
    for pat in includes.iter().filter(|p| !p.is_empty()) {
        args.push(format!("--include={}", pat).into());
    }
    args.push("--exclude=.git".into());
    for pat in excludes.iter().filter(|p| !p.is_empty()) {
        args.push(format!("--exclude={}", pat).into());
    }
    args.extend(stage.lines.iter().map(OsString::from));

    let mut target = dest.as_os_str().to_os_string();
    target.push("/");
    args.push(target);
    args
}

impl StageSink for RsyncSink {
    fn apply(
        &mut self,
        project_dir: &Path,
        stage: &Stage,
        includes: &[String],
        excludes: &[String],
    ) -> Result<()> {
        fs::create_dir_all(&self.dest)
            .with_context(|| format!("failed to create {}", self.dest.display()))?;
        let dest = std::path::absolute(&self.dest)
            .with_context(|| format!("failed to resolve {}", self.dest.display()))?;

        let args = rsync_args(&dest, stage, includes, excludes);
        debug!(cwd = %project_dir.display(), "rsync {:?}", args);
        let status = Command::new("rsync")
            .args(&args)
            .current_dir(project_dir)
            .status()
            .context("failed to spawn rsync")?;
        if !status.success() {
            bail!("rsync exited with {}", status);
        }
        Ok(())
    }
}
