//! Snapshot marker files.
//!
//! A project's `snap/` directory describes how to stage a snapshot:
//!
//! ```text
//! snap/
//!   includes     inclusion patterns (optional)
//!   excludes     exclusion patterns (optional)
//!   1, 2, 3 ...  selection patterns per stage (optional, contiguous from 1)
//!   pre_1 ...    executable run before the matching stage (optional)
//!   post_snap    executable run once after all stages (optional)
//! ```
//!
//! None of these files are required. A missing or unreadable file reads as
//! empty, and a project without numbered markers gets a single stage that
//! selects everything.

mod stage;

use std::fs;
use std::path::{Path, PathBuf};

pub use stage::Stage;

pub const INCLUDES: &str = "includes";
pub const EXCLUDES: &str = "excludes";
pub const POST_SNAP: &str = "post_snap";

/// Pattern selecting the whole working copy.
pub const SELECT_ALL: &str = ".";

/// Name of the script run before stage `index`.
pub fn pre_script_name(index: usize) -> String {
    format!("pre_{}", index)
}

/// Read-only view of a `snap/` directory.
#[derive(Debug, Clone)]
pub struct SnapDir {
    root: PathBuf,
}

impl SnapDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Whether `name` exists as a regular file.
    pub fn has_file(&self, name: &str) -> bool {
        self.file(name).is_file()
    }

    /// Lines of `name` with trailing whitespace stripped, in file order.
    ///
    /// Returns an empty vector when the file cannot be read for any reason
    /// (absent, permission denied, a directory, not UTF-8).
    pub fn read_lines(&self, name: &str) -> Vec<String> {
        match fs::read_to_string(self.file(name)) {
            Ok(txt) => txt.lines().map(|l| l.trim_end().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Non-empty selection patterns of numbered marker `index`.
    fn stage_lines(&self, index: usize) -> Vec<String> {
        self.read_lines(&index.to_string())
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect()
    }

    /// Derive the ordered stage list from numbered markers.
    ///
    /// Scanning starts at `1` and stops at the first marker that is missing
    /// or has no non-empty line. When marker `1` yields nothing, the result
    /// is exactly one stage selecting [`SELECT_ALL`] with no pre script.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        let mut index = 1;
        loop {
            let lines = self.stage_lines(index);
            if lines.is_empty() {
                break;
            }
            let pre = Some(pre_script_name(index)).filter(|p| self.has_file(p));
            stages.push(Stage { index, lines, pre });
            index += 1;
        }

        if stages.is_empty() {
            stages.push(Stage::select_all());
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snap_with(files: &[(&str, &str)]) -> (tempfile::TempDir, SnapDir) {
        let td = tempdir().unwrap();
        let root = td.path().join("snap");
        fs::create_dir_all(&root).unwrap();
        for (name, body) in files {
            fs::write(root.join(name), body).unwrap();
        }
        (td, SnapDir::new(root))
    }

    #[test]
    fn missing_directory_yields_single_default_stage() {
        let td = tempdir().unwrap();
        let snap = SnapDir::new(td.path().join("no_such_snap"));

        let stages = snap.stages();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].index, 1);
        assert_eq!(stages[0].lines, vec!["."]);
        assert_eq!(stages[0].pre, None);
    }

    #[test]
    fn numbered_markers_become_ordered_stages() {
        let (_td, snap) = snap_with(&[("1", "a\nb"), ("2", "c\n")]);

        let stages = snap.stages();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].index, 1);
        assert_eq!(stages[0].lines, vec!["a", "b"]);
        assert_eq!(stages[1].index, 2);
        assert_eq!(stages[1].lines, vec!["c"]);
    }

    #[test]
    fn pre_script_is_attached_only_where_present() {
        let (_td, snap) = snap_with(&[("1", "a\n"), ("2", "b\n"), ("pre_2", "#!/bin/sh\n")]);

        let stages = snap.stages();
        assert_eq!(stages[0].pre, None);
        assert_eq!(stages[1].pre.as_deref(), Some("pre_2"));
    }

    #[test]
    fn gap_in_numbering_stops_scan() {
        let (_td, snap) = snap_with(&[("1", "a\n"), ("3", "c\n")]);

        let stages = snap.stages();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].lines, vec!["a"]);
    }

    #[test]
    fn blank_marker_stops_scan_and_blank_lines_are_dropped() {
        let (_td, snap) = snap_with(&[("1", "a\n\n  \nb  \r\n"), ("2", "\n\n"), ("3", "c\n")]);

        let stages = snap.stages();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].lines, vec!["a", "b"]);
    }

    #[test]
    fn empty_first_marker_falls_back_to_default_stage() {
        let (_td, snap) = snap_with(&[("1", ""), ("pre_1", "#!/bin/sh\n")]);

        assert_eq!(snap.stages(), vec![Stage::select_all()]);
    }

    #[test]
    fn read_lines_strips_terminators_and_keeps_order() {
        let (_td, snap) = snap_with(&[(INCLUDES, "src/**\r\ndocs/  \n\nREADME.md")]);

        assert_eq!(snap.read_lines(INCLUDES), vec!["src/**", "docs/", "", "README.md"]);
        assert!(snap.read_lines(EXCLUDES).is_empty());
    }

    #[test]
    fn read_lines_on_directory_is_empty() {
        let (_td, snap) = snap_with(&[]);
        fs::create_dir_all(snap.file("1")).unwrap();

        assert!(snap.read_lines("1").is_empty());
        assert!(!snap.has_file("1"));
    }
}
