use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::git::GitCli;
use crate::paths::{Layout, validate_project_name};
use crate::project::Project;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "rsnap.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "RSNAP_CONFIG";

/// Default ssh helper handed to git through `GIT_SSH`.
pub const DEFAULT_SSH_WRAPPER: &str = "ssh_wrapper.sh";

/// Top-level configuration loaded from `rsnap.toml`.
///
/// Example TOML:
/// ```toml
/// cache_root  = ".cache/repos"
/// ssh_wrapper = "ssh_wrapper.sh"
///
/// [env]
/// GIT_TERMINAL_PROMPT = "0"
///
/// [[projects]]
/// name = "widgets"
/// url  = "git@example.com:acme/widgets.git"
/// ```
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
    #[serde(default)]
    pub ssh_wrapper: Option<PathBuf>,
    /// Extra environment overrides for every git invocation.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

/// A single `[[projects]]` entry.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    pub url: String,
}

/// Resolve which configuration file to read.
///
/// Order: explicit path, then `$RSNAP_CONFIG`, then `./rsnap.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Parse and validate configuration text.
///
/// # Errors
/// - The TOML is malformed or has unknown keys.
/// - A project name is not a valid cache directory name or is duplicated.
pub fn parse_config(txt: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(txt).context("failed to parse config")?;
    let mut seen = std::collections::HashSet::new();
    for pr in &cfg.projects {
        validate_project_name(&pr.name).with_context(|| format!("invalid project {:?}", pr.name))?;
        if !seen.insert(pr.name.as_str()) {
            return Err(anyhow!("duplicate project name: {}", pr.name));
        }
    }
    Ok(cfg)
}

/// Load and parse the configuration file at `path`.
///
/// # Errors
/// - Returns an error if the file cannot be read; the message includes the path.
/// - Returns an error if parsing or validation fails (see [`parse_config`]).
pub fn load_config(path: &Path) -> Result<Config> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("config not found: {}", path.display()))?;
    parse_config(&txt).with_context(|| format!("in {}", path.display()))
}

impl Config {
    pub fn layout(&self) -> Layout {
        self.cache_root.clone().map(Layout::new).unwrap_or_default()
    }

    /// Git backend carrying `GIT_SSH` and the `[env]` overrides.
    ///
    /// A relative `ssh_wrapper` is resolved against `cwd`, since git runs
    /// from inside the project cache.
    pub fn git(&self, cwd: &Path) -> GitCli {
        let wrapper = self
            .ssh_wrapper
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SSH_WRAPPER));
        let wrapper = if wrapper.is_absolute() {
            wrapper
        } else {
            cwd.join(wrapper)
        };

        self.env
            .iter()
            .fold(GitCli::new().with_ssh_wrapper(wrapper), |git, (k, v)| {
                git.with_env(k, v)
            })
    }

    /// # Errors
    /// Returns an error listing the configured names if `name` is unknown.
    pub fn find_project(&self, name: &str) -> Result<&ProjectEntry> {
        self.projects.iter().find(|p| p.name == name).ok_or_else(|| {
            let known: Vec<_> = self.projects.iter().map(|p| p.name.as_str()).collect();
            anyhow!("unknown project {} (configured: {})", name, known.join(", "))
        })
    }

    /// Build the [`Project`] named `name` backed by the git CLI.
    ///
    /// # Errors
    /// Returns an error if the project is not configured or the working
    /// directory cannot be determined.
    pub fn open_project(&self, name: &str) -> Result<Project<GitCli>> {
        let entry = self.find_project(name)?;
        let cwd = env::current_dir().context("cannot determine working directory")?;
        Project::new(&entry.name, &entry.url, self.layout(), self.git(&cwd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::SSH_ENV_VAR;
    use serial_test::serial;
    use std::ffi::OsString;

    const SAMPLE: &str = r#"
ssh_wrapper = "tools/ssh_wrapper.sh"

[env]
GIT_TERMINAL_PROMPT = "0"

[[projects]]
name = "widgets"
url = "git@example.com:acme/widgets.git"

[[projects]]
name = "gadgets"
url = "https://example.com/acme/gadgets.git"
"#;

    #[test]
    fn parses_projects_and_defaults() {
        let cfg = parse_config(SAMPLE).unwrap();
        assert_eq!(cfg.projects.len(), 2);
        assert_eq!(cfg.projects[1].name, "gadgets");
        assert_eq!(cfg.layout(), Layout::default());

        let empty = parse_config("").unwrap();
        assert!(empty.projects.is_empty());
        assert!(empty.env.is_empty());
    }

    #[test]
    fn custom_cache_root_is_used() {
        let cfg = parse_config("cache_root = \"/var/cache/rsnap\"").unwrap();
        assert_eq!(cfg.layout().project_dir("w"), Path::new("/var/cache/rsnap/w"));
    }

    #[test]
    fn rejects_bad_or_duplicate_names_and_unknown_keys() {
        let bad = "[[projects]]\nname = \"a/b\"\nurl = \"u\"\n";
        assert!(parse_config(bad).is_err());

        let dup = "[[projects]]\nname = \"a\"\nurl = \"u\"\n[[projects]]\nname = \"a\"\nurl = \"v\"\n";
        let err = parse_config(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate project name: a"));

        assert!(parse_config("cache_dir = \"x\"").is_err());
    }

    #[test]
    fn git_env_resolves_wrapper_and_extra_overrides() {
        let cfg = parse_config(SAMPLE).unwrap();
        let git = cfg.git(Path::new("/work"));

        let env = git.env();
        assert!(env.contains(&(
            OsString::from(SSH_ENV_VAR),
            OsString::from("/work/tools/ssh_wrapper.sh")
        )));
        assert!(env.contains(&(OsString::from("GIT_TERMINAL_PROMPT"), OsString::from("0"))));

        let default = Config::default().git(Path::new("/work"));
        assert_eq!(
            default.env(),
            [(OsString::from(SSH_ENV_VAR), OsString::from("/work/ssh_wrapper.sh"))]
        );
    }

    #[test]
    fn find_project_reports_known_names() {
        let cfg = parse_config(SAMPLE).unwrap();
        assert_eq!(cfg.find_project("widgets").unwrap().url, "git@example.com:acme/widgets.git");
        let err = cfg.find_project("nope").unwrap_err();
        assert!(err.to_string().contains("configured: widgets, gadgets"));
    }

    #[test]
    fn load_config_mentions_missing_path() {
        let td = tempfile::tempdir().unwrap();
        let missing = td.path().join("rsnap.toml");
        let err = load_config(&missing).unwrap_err();
        assert!(err.to_string().contains("config not found"));

        fs::write(&missing, SAMPLE).unwrap();
        assert_eq!(load_config(&missing).unwrap().projects.len(), 2);
    }

    #[test]
    #[serial(env)]
    fn config_path_prefers_explicit_then_env() {
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(config_path(None), PathBuf::from(CONFIG_FILE));

        unsafe { env::set_var(CONFIG_ENV, "/etc/rsnap.toml") };
        assert_eq!(config_path(None), PathBuf::from("/etc/rsnap.toml"));
        assert_eq!(
            config_path(Some(Path::new("local.toml"))),
            PathBuf::from("local.toml")
        );

        unsafe { env::remove_var(CONFIG_ENV) };
    }
}
