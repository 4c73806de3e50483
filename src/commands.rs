//! CLI commands.
//!
//! Each `cmd_*` function backs one subcommand of `rsnap`. They open the
//! project from configuration, drive the best-effort [`Project`] operations
//! behind spinners, and then check the filesystem to report real failures.

use anyhow::{Result, bail};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::Config;
use crate::git::{GitCli, Vcs};
use crate::progress::{finish, spinner};
use crate::project::Project;
use crate::select::TerminalSelector;
use crate::snapshot::{PlanSink, RsyncSink, run_snapshot};

/// Options of `rsnap snap`.
#[derive(Debug, Clone, Default)]
pub struct SnapOptions {
    pub dest: Option<PathBuf>,
    pub branch: Option<String>,
    pub choose: bool,
    pub dry_run: bool,
}

fn fetched_project(cfg: &Config, name: &str) -> Result<Project<GitCli>> {
    let mut project = cfg.open_project(name)?;
    let pb = spinner(format!("fetching {}", name));
    project.ensure_fetched();
    let res = verify_cloned(&project);
    finish(&pb, format!("fetched {}", name), &res);
    res.map(|_| project)
}

/// Fail unless the cache holds a working copy of `project`.
fn verify_cloned<V: Vcs>(project: &Project<V>) -> Result<()> {
    if !project.is_cloned() {
        bail!(
            "no working copy for {} at {} (clone of {} failed)",
            project.name(),
            project.cache_path().display(),
            project.url()
        );
    }
    Ok(())
}

/// Fail unless HEAD of `project` is attached to `branch`.
fn verify_checkout<V: Vcs>(project: &Project<V>, branch: &str) -> Result<()> {
    verify_cloned(project)?;
    match project.current_branch() {
        Some(head) if head == branch => Ok(()),
        Some(head) => bail!("checkout of {} failed, {} is still on {}", branch, project.name(), head),
        None => bail!("checkout of {} failed, {} has a detached HEAD", branch, project.name()),
    }
}

/// Print configured projects and whether they are cached.
///
/// Example output:
/// ```text
/// - widgets (git@example.com:acme/widgets.git) [cached]
/// - gadgets (https://example.com/acme/gadgets.git) [not cloned]
/// ```
pub fn cmd_list(cfg: &Config) -> Result<()> {
    if cfg.projects.is_empty() {
        eprintln!("no projects configured");
        return Ok(());
    }
    let layout = cfg.layout();
    for pr in &cfg.projects {
        let state = if layout.project_dir(&pr.name).join(".git").is_dir() {
            "cached".green()
        } else {
            "not cloned".yellow()
        };
        println!("- {} ({}) [{}]", pr.name.bold(), pr.url, state);
    }
    Ok(())
}

pub fn cmd_fetch(cfg: &Config, name: &str) -> Result<()> {
    fetched_project(cfg, name).map(|_| ())
}

pub fn cmd_branches(cfg: &Config, name: &str) -> Result<()> {
    let mut project = fetched_project(cfg, name)?;
    for b in project.list_remote_branches() {
        println!("{}", b);
    }
    Ok(())
}

/// Check out `branch`, or ask for one when `branch` is `None`.
pub fn cmd_checkout(cfg: &Config, name: &str, branch: Option<&str>) -> Result<()> {
    let mut project = fetched_project(cfg, name)?;
    let chosen = checkout(&mut project, branch, true)?;
    println!("{} {} on {}", "✔".green(), name, chosen.bold());
    Ok(())
}

fn checkout(project: &mut Project<GitCli>, branch: Option<&str>, choose: bool) -> Result<String> {
    let chosen = match branch {
        Some(b) => {
            let pb = spinner(format!("checking out {}", b));
            project.checkout_branch(b);
            let res = verify_checkout(project, b);
            finish(&pb, format!("checked out {}", b), &res);
            res?;
            return Ok(b.to_string());
        }
        None if choose => project.choose_and_checkout_branch(&mut TerminalSelector::stdio())?,
        None => return Ok(String::from("current checkout")),
    };
    verify_checkout(project, &chosen)?;
    Ok(chosen)
}

/// Print the stages, includes and excludes derived from `snap/`.
pub fn cmd_stages(cfg: &Config, name: &str) -> Result<()> {
    let project = cfg.open_project(name)?;
    for stage in project.get_stages() {
        println!("{}", stage);
    }
    for (title, lines) in [
        ("includes", project.get_includes()),
        ("excludes", project.get_excludes()),
    ] {
        if !lines.is_empty() {
            println!("{}", title.bold());
            for l in lines {
                println!("  {}", l);
            }
        }
    }
    Ok(())
}

/// Fetch, optionally switch branch, and stage a snapshot into `dest`.
///
/// # Errors
/// Returns an error if the project cannot be opened or cloned, or if a
/// stage fails to copy.
pub fn cmd_snap(cfg: &Config, name: &str, opts: &SnapOptions) -> Result<()> {
    let mut project = fetched_project(cfg, name)?;
    let on = checkout(&mut project, opts.branch.as_deref(), opts.choose)?;

    let stages = if opts.dry_run {
        let mut sink = PlanSink::default();
        run_snapshot(&project, &mut sink)?;
        for stage in &sink.applied {
            println!("{}", stage);
        }
        sink.applied
    } else {
        let Some(dest) = &opts.dest else {
            bail!("--dest is required unless --dry-run is given");
        };
        run_snapshot(&project, &mut RsyncSink::new(dest))?
    };

    println!(
        "{} {} ({}): {} stage(s){}",
        "✔".green(),
        name,
        on,
        stages.len(),
        if opts.dry_run { " planned" } else { " staged" }
    );
    Ok(())
}
