use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Cache root used when the configuration does not name one.
pub const DEFAULT_CACHE_ROOT: &str = ".cache/repos";

/// Name of the per-project directory holding marker files and scripts.
pub const SNAP_DIR: &str = "snap";

/// On-disk layout of the repository cache.
///
/// Every project owns exactly one working copy at `<cache_root>/<name>`,
/// and its snapshot markers live in `<cache_root>/<name>/snap`.
/// Composing these paths never touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    cache_root: PathBuf,
}

impl Layout {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.cache_root.join(name)
    }

    pub fn snap_dir(&self, name: &str) -> PathBuf {
        self.project_dir(name).join(SNAP_DIR)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ROOT)
    }
}

/// Check that `name` can be used as a single cache directory component.
///
/// # Errors
/// Returns an error for empty names, `.`/`..`, and names containing a
/// path separator.
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("project name must not be empty");
    }
    if name == "." || name == ".." {
        bail!("project name must not be `{}`", name);
    }
    if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        bail!("project name must not contain a path separator: {}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_composes_project_and_snap_dirs() {
        let layout = Layout::default();
        assert_eq!(layout.cache_root(), Path::new(".cache/repos"));
        assert_eq!(
            layout.project_dir("widgets"),
            Path::new(".cache").join("repos").join("widgets")
        );
        assert_eq!(
            layout.snap_dir("widgets"),
            Path::new(".cache/repos/widgets/snap")
        );
    }

    #[test]
    fn validate_project_name_rejects_separators_and_dots() {
        assert!(validate_project_name("widgets").is_ok());
        assert!(validate_project_name("acme.widgets-2").is_ok());
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("  ").is_err());
        assert!(validate_project_name(".").is_err());
        assert!(validate_project_name("..").is_err());
        assert!(validate_project_name("acme/widgets").is_err());
    }
}
