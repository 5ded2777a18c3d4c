//! Locating and loading the configuration file.
//!
//! Lookup order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/ctor-lint.toml` or `{project}/.ctor-lint.toml`
//! 3. `~/.ctor-lint/config.toml` (or `$CTOR_LINT_CONFIG_DIR/config.toml`)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use ctor_lint_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads the configuration, falling back to defaults.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };

        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["ctor-lint.toml", ".ctor-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
pub const CONFIG_DIR_ENV: &str = "CTOR_LINT_CONFIG_DIR";

/// Resolves the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir())
}

/// Resolves the configuration file for `project_dir`, and loads it.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    resolve(project_dir, explicit).load()
}

/// Resolution with the global directory passed in, so tests need no env vars.
fn resolve_in(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.exists())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(candidate) if candidate.exists() => {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        }
        _ => ConfigSource::Default,
    }
}

/// Global config directory: `$CTOR_LINT_CONFIG_DIR`, else `~/.ctor-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".ctor-lint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_without_existence_check() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("ctor-lint.toml"), "").unwrap();

        let result = resolve_in(project.path(), Some(Path::new("/missing.toml")), None);
        assert_eq!(result, ConfigSource::Explicit(PathBuf::from("/missing.toml")));
        assert!(result.load().is_err());
    }

    #[test]
    fn project_config_prefers_plain_name() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".ctor-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_in(project.path(), None, None),
            ConfigSource::Project(project.path().join(".ctor-lint.toml"))
        );

        fs::write(project.path().join("ctor-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_in(project.path(), None, None),
            ConfigSource::Project(project.path().join("ctor-lint.toml"))
        );
    }

    #[test]
    fn global_used_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "[fix]\nmax_passes = 7\n").unwrap();

        let result = resolve_in(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(global.path().join("config.toml")));
        assert_eq!(result.load().unwrap().fix.max_passes, 7);

        fs::write(project.path().join("ctor-lint.toml"), "").unwrap();
        let result = resolve_in(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn defaults_when_nothing_found() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let result = resolve_in(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
        assert_eq!(result.load().unwrap().fix.max_passes, 100);
    }
}
