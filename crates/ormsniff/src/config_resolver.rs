//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. explicit path
//! 2. `{project}/ormsniff.toml` or `.ormsniff.toml`
//! 3. `$ORMSNIFF_CONFIG_DIR/config.toml`, else `~/.ormsniff/config.toml`
//! 4. No config found → defaults

use ormsniff_core::{Config, ConfigError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "path", rename_all = "lowercase")]
pub enum ConfigSource {
    /// Explicitly requested by the caller.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
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

    /// Loads the configuration, or the defaults for [`ConfigSource::Default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match self.path() {
            Some(path) => Config::from_file(path),
            None => Ok(Config::default()),
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["ormsniff.toml", ".ormsniff.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
pub const CONFIG_DIR_ENV: &str = "ORMSNIFF_CONFIG_DIR";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory path.
///
/// Resolution: `$ORMSNIFF_CONFIG_DIR` > `~/.ormsniff/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".ormsniff"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_takes_priority_over_project() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "").unwrap();
        fs::write(tmp.path().join("ormsniff.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(&explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".ormsniff.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join(".ormsniff.toml"))
        );

        fs::write(tmp.path().join("ormsniff.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join("ormsniff.toml"))
        );
    }

    #[test]
    fn global_fallback_when_no_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(global.path().join("config.toml")));
    }

    #[test]
    fn defaults_when_nothing_found() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
        assert!(result.load().unwrap().sniffs.is_empty());
    }

    #[test]
    fn load_reports_parse_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ormsniff.toml");
        fs::write(&path, "[sniffs.doctrine-entity\n").unwrap();
        assert!(matches!(
            ConfigSource::Project(path).load(),
            Err(ConfigError::Parse { .. })
        ));
    }
}
