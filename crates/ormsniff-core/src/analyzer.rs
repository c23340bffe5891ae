//! Core analyzer for orchestrating sniff execution.

use crate::config::{Config, SniffConfig};
use crate::context::SniffContext;
use crate::file::PhpFile;
use crate::fixer::Fixer;
use crate::sniff::{Sniff, SniffBox};
use crate::types::{FixedFile, LintResult, Violation};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_EXCLUDES: [&str; 2] = ["**/vendor/**", "**/var/cache/**"];

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error tokenizing a PHP source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    sniffs: Vec<SniffBox>,
    exclude_patterns: Vec<String>,
    extensions: Vec<String>,
    config: Option<Config>,
    fix: Option<bool>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a sniff to the analyzer.
    #[must_use]
    pub fn sniff<S: Sniff + 'static>(mut self, sniff: S) -> Self {
        self.sniffs.push(Box::new(sniff));
        self
    }

    /// Adds a boxed sniff to the analyzer.
    #[must_use]
    pub fn sniff_box(mut self, sniff: SniffBox) -> Self {
        self.sniffs.push(sniff);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds a file extension to analyze (without the dot).
    #[must_use]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Enables or disables fix mode, overriding the configuration.
    #[must_use]
    pub fn fix(mut self, fix: bool) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.analyzer.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        let mut extensions = self.extensions;
        if let Some(ref config) = self.config {
            exclude_patterns.extend(config.analyzer.exclude.clone());
            if extensions.is_empty() {
                extensions.extend(config.analyzer.extensions.clone());
            }
        }

        if exclude_patterns.is_empty() {
            exclude_patterns.extend(DEFAULT_EXCLUDES.map(String::from));
        }
        if extensions.is_empty() {
            extensions.push("php".to_string());
        }

        let fix = self
            .fix
            .or_else(|| self.config.as_ref().map(|c| c.analyzer.fix))
            .unwrap_or(false);

        Ok(Analyzer {
            root,
            sniffs: self.sniffs,
            exclude_patterns,
            extensions,
            config: self.config.unwrap_or_default(),
            fix,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates sniff execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    sniffs: Vec<SniffBox>,
    exclude_patterns: Vec<String>,
    extensions: Vec<String>,
    config: Config,
    fix: bool,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered sniffs.
    #[must_use]
    pub fn sniff_count(&self) -> usize {
        self.sniffs.len()
    }

    /// Whether fix mode is on.
    #[must_use]
    pub fn is_fixing(&self) -> bool {
        self.fix
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, a file cannot be read, or
    /// a file fails to tokenize while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!("Found {} files to analyze", files.len());

        for file_path in &files {
            debug!("Analyzing: {}", file_path.display());
            let content = std::fs::read_to_string(file_path)?;
            match self.analyze_source(file_path, content) {
                Ok(file_result) => result.extend(file_result),
                Err(AnalyzerError::Parse { path, message }) => {
                    warn!("Failed to parse {}: {}", path.display(), message);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, message });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        sort_violations(&mut result.violations);

        info!(
            "Analysis complete: {} violations in {} files, {} fixed",
            result.violations.len(),
            result.files_checked,
            result.fixed_files.len()
        );

        Ok(result)
    }

    /// Analyzes an in-memory buffer as the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Parse`] if the content cannot be tokenized.
    pub fn analyze_source(
        &self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Result<LintResult, AnalyzerError> {
        let path = path.into();
        let file = PhpFile::parse(path.clone(), content).map_err(|e| AnalyzerError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut fixer = Fixer::new(&file, self.fix);
        let mut violations = Vec::new();

        for sniff in &self.sniffs {
            if !self.config.is_sniff_enabled(sniff.name()) {
                debug!("Skipping disabled sniff: {}", sniff.name());
                continue;
            }

            let severity = self.config.sniff_severity(sniff.name());
            let mut ctx = SniffContext::new(&file, &mut fixer, sniff.as_ref(), severity);
            sniff.process(&mut ctx);
            violations.extend(ctx.into_violations());
        }

        sort_violations(&mut violations);

        let mut result = LintResult {
            violations,
            files_checked: 1,
            fixed_files: Vec::new(),
        };
        if self.fix && fixer.fix_count() > 0 {
            debug!("Fixed {} issue(s) in {}", fixer.fix_count(), path.display());
            result.fixed_files.push(FixedFile {
                path,
                content: fixer.fixed_content(),
                fixes: fixer.fix_count(),
            });
        }
        Ok(result)
    }

    /// Discovers all source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut files = Vec::new();

        for ext in &self.extensions {
            let pattern = format!("{}/**/*.{ext}", self.root.display());
            for entry in glob::glob(&pattern)? {
                let path = entry.map_err(|e| AnalyzerError::Io(e.into_error()))?;

                if self.should_exclude(&path) {
                    debug!("Excluding: {}", path.display());
                    continue;
                }

                files.push(path);
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
            }

            // Also check as substring for patterns like "**/vendor/**"
            let normalized_pattern = pattern.replace("**", "");
            if !normalized_pattern.is_empty() && path_str.contains(&normalized_pattern) {
                return true;
            }
        }

        false
    }

    /// Gets the configuration for a specific sniff.
    #[must_use]
    pub fn sniff_config(&self, sniff_name: &str) -> Option<&SniffConfig> {
        self.config.sniffs.get(sniff_name)
    }
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.location.line.cmp(&b.location.line))
            .then(a.location.column.cmp(&b.location.column))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    /// Flags every `var_dump` call and removes it in fix mode.
    struct NoVarDump;

    impl Sniff for NoVarDump {
        fn name(&self) -> &'static str {
            "no-var-dump"
        }
        fn code(&self) -> &'static str {
            "Test.Debug.NoVarDump"
        }

        fn process(&self, ctx: &mut SniffContext<'_>) {
            let file = ctx.file();
            for (ptr, token) in file.tokens().iter().enumerate() {
                if token.kind == TokenKind::String
                    && token.content == "var_dump"
                    && ctx.add_fixable_error("var_dump() found", ptr, "Found")
                {
                    let _ = ctx.fixer().replace_token(ptr, "dump");
                }
            }
        }
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/vendor/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert!(!analyzer.is_fixing());
        assert_eq!(analyzer.extensions, vec!["php"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root(".")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/app/vendor/doctrine/orm/Column.php")));
        assert!(analyzer.should_exclude(Path::new("/app/var/cache/dev/Container.php")));
        assert!(!analyzer.should_exclude(Path::new("/app/src/Entity/User.php")));
    }

    #[test]
    fn test_config_fix_and_overrides() {
        let config = Config::parse("[analyzer]\nfix = true\nextensions = [\"inc\"]\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(".")
            .config(config.clone())
            .build()
            .unwrap();
        assert!(analyzer.is_fixing());
        assert_eq!(analyzer.extensions, vec!["inc"]);

        let analyzer = Analyzer::builder().root(".").config(config).fix(false).build().unwrap();
        assert!(!analyzer.is_fixing());
    }

    #[test]
    fn test_analyze_source_reports_and_fixes() {
        let analyzer = Analyzer::builder()
            .root(".")
            .sniff(NoVarDump)
            .fix(true)
            .build()
            .unwrap();

        let result = analyzer
            .analyze_source("a.php", "<?php\nvar_dump($a);\nvar_dump($b);\n")
            .unwrap();
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.violations[0].location.line, 2);
        assert_eq!(result.fixable_count(), 2);
        assert_eq!(result.fixed_files.len(), 1);
        assert_eq!(result.fixed_files[0].content, "<?php\ndump($a);\ndump($b);\n");
        assert_eq!(result.fixed_files[0].fixes, 2);
    }

    #[test]
    fn test_disabled_sniff_and_severity_override() {
        let config = Config::parse("[sniffs.no-var-dump]\nseverity = \"info\"\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(".")
            .sniff(NoVarDump)
            .config(config)
            .build()
            .unwrap();
        let result = analyzer.analyze_source("a.php", "<?php var_dump(1);").unwrap();
        assert_eq!(result.violations[0].severity, crate::Severity::Info);
        assert!(result.fixed_files.is_empty());

        let config = Config::parse("[sniffs.no-var-dump]\nenabled = false\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(".")
            .sniff(NoVarDump)
            .config(config)
            .build()
            .unwrap();
        let result = analyzer.analyze_source("a.php", "<?php var_dump(1);").unwrap();
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_analyze_source_parse_error() {
        let analyzer = Analyzer::builder().root(".").build().unwrap();
        let err = analyzer.analyze_source("bad.php", "<?php 'open").unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { .. }));
    }
}
