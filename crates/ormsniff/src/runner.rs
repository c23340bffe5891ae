//! Directory runs: resolve the config, analyze, write fixes back.

use crate::config_resolver::{self, ConfigSource};
use ormsniff_core::{Analyzer, AnalyzerError, ConfigError, LintResult};
use ormsniff_rules::sniffs_from_config;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors from [`run`].
#[derive(Debug, Error)]
pub enum RunError {
    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis failed.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// A fixed file could not be written back.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Outcome of a directory run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Where the configuration came from.
    pub config: ConfigSource,
    /// Violations and fixes.
    pub result: LintResult,
    /// Files rewritten with fixes.
    pub written: Vec<PathBuf>,
}

impl RunReport {
    /// Machine-readable rendering of the report.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Analyzes `project_dir` with the resolved configuration.
///
/// In fix mode every fixed file is written back before returning.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, analysis fails,
/// or a fixed file cannot be written.
pub fn run(project_dir: &Path, explicit_config: Option<&Path>, fix: bool) -> Result<RunReport, RunError> {
    let source = config_resolver::resolve(project_dir, explicit_config);
    let config = source.load()?;
    info!(config = ?source.path(), "running ormsniff");

    let root = if config.analyzer.root.is_absolute() {
        config.analyzer.root.clone()
    } else {
        project_dir.join(&config.analyzer.root)
    };
    let fix = fix || config.analyzer.fix;

    let mut builder = Analyzer::builder().root(root).fix(fix);
    for sniff in sniffs_from_config(&config) {
        builder = builder.sniff_box(sniff);
    }
    let result = builder.config(config).build()?.analyze()?;

    let mut written = Vec::new();
    for fixed in &result.fixed_files {
        std::fs::write(&fixed.path, &fixed.content).map_err(|source| RunError::Write {
            path: fixed.path.clone(),
            source,
        })?;
        info!(path = %fixed.path.display(), fixes = fixed.fixes, "wrote fixes");
        written.push(fixed.path.clone());
    }

    Ok(RunReport {
        config: source,
        result,
        written,
    })
}
