//! Running a staged snapshot.
//!
//! For every stage derived from the project's `snap/` markers the optional
//! `pre_N` script runs first, then the stage's selection lines are handed to
//! a [`StageSink`] which performs the actual copy. The project's `post_snap`
//! hook runs once at the end.

mod rsync;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::git::Vcs;
use crate::project::Project;
use crate::snap::Stage;

pub use rsync::RsyncSink;

/// Copy step applied once per stage.
pub trait StageSink {
    /// Apply `stage`, with `project_dir` as the source root.
    ///
    /// # Errors
    /// Any error aborts the snapshot run.
    fn apply(
        &mut self,
        project_dir: &Path,
        stage: &Stage,
        includes: &[String],
        excludes: &[String],
    ) -> Result<()>;
}

/// Sink that only records the stages it was given (dry run).
#[derive(Debug, Default)]
pub struct PlanSink {
    pub applied: Vec<Stage>,
}

impl StageSink for PlanSink {
    fn apply(
        &mut self,
        _project_dir: &Path,
        stage: &Stage,
        _includes: &[String],
        _excludes: &[String],
    ) -> Result<()> {
        self.applied.push(stage.clone());
        Ok(())
    }
}

/// Run every stage of `project` through `sink`, then the post hook.
///
/// Returns the stages in the order they were applied.
///
/// # Errors
/// Returns the first sink error; later stages and the post hook are skipped.
pub fn run_snapshot<V: Vcs, S: StageSink + ?Sized>(
    project: &Project<V>,
    sink: &mut S,
) -> Result<Vec<Stage>> {
    let stages = project.get_stages();
    let includes = project.get_includes();
    let excludes = project.get_excludes();
    let dir = project.cache_path();

    for stage in &stages {
        if let Some(pre) = &stage.pre {
            project.run_snapshot_script(pre);
        }
        info!("applying stage {} of {}", stage.index, project.name());
        sink.apply(&dir, stage, &includes, &excludes)
            .with_context(|| format!("stage {} of {} failed", stage.index, project.name()))?;
    }

    project.run_post_snapshot_hook();
    Ok(stages)
}
