//! Configuration types for ormsniff.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for ormsniff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-sniff configurations, keyed by sniff name.
    #[serde(default)]
    pub sniffs: HashMap<String, SniffConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a sniff is enabled.
    #[must_use]
    pub fn is_sniff_enabled(&self, sniff_name: &str) -> bool {
        self.sniffs
            .get(sniff_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a sniff.
    #[must_use]
    pub fn sniff_severity(&self, sniff_name: &str) -> Option<crate::Severity> {
        self.sniffs.get(sniff_name).and_then(|c| c.severity)
    }

    /// Gets the configuration section for a sniff.
    #[must_use]
    pub fn sniff(&self, sniff_name: &str) -> Option<&SniffConfig> {
        self.sniffs.get(sniff_name)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// File extensions to analyze (default: `php`).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Whether to apply fixes.
    #[serde(default)]
    pub fix: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: Vec::new(),
            extensions: default_extensions(),
            fix: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

/// Per-sniff configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SniffConfig {
    /// Whether this sniff is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this sniff.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Sniff-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl SniffConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analyzer.extensions, vec!["php"]);
        assert!(!config.analyzer.fix);
        assert!(config.sniffs.is_empty());
        assert!(config.is_sniff_enabled("doctrine-entity"));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
root = "./src"
exclude = ["**/generated/**"]
fix = true

[sniffs.doctrine-entity]
severity = "warning"
concrete_type_to_base_type_map = { AdminUser = "User" }
use_dynamical_calculation_for_enum_column_type = true

[sniffs.interface-suffix]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert!(config.analyzer.fix);
        assert!(config.is_sniff_enabled("doctrine-entity"));
        assert!(!config.is_sniff_enabled("interface-suffix"));
        assert_eq!(
            config.sniff_severity("doctrine-entity"),
            Some(crate::Severity::Warning)
        );

        let sniff = config.sniff("doctrine-entity").unwrap();
        assert!(sniff.get_bool("use_dynamical_calculation_for_enum_column_type", false));
        let map: HashMap<String, String> =
            sniff.get_option("concrete_type_to_base_type_map").unwrap();
        assert_eq!(map.get("AdminUser").map(String::as_str), Some("User"));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[analyzer\nroot = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file(std::path::Path::new("/nonexistent/ormsniff.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ormsniff.toml"));
    }
}
