//! Core types for sniff violations and results.

use crate::token::Token;
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for sniff violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a run.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a location covering a token.
    #[must_use]
    pub fn from_token(file: PathBuf, token: &Token) -> Self {
        Self {
            file,
            line: token.line,
            column: token.column,
            offset: token.offset,
            length: token.len(),
        }
    }

    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A violation reported by a sniff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Full code (e.g., "Ormsniff.Commenting.DoctrineEntity.ColumnUnderscored").
    pub code: String,
    /// Sniff name (e.g., "doctrine-entity").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Whether the reporting sniff can fix this violation.
    #[serde(default)]
    pub fixable: bool,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            fixable: false,
            suggestion: None,
        }
    }

    /// Marks this violation as fixable.
    #[must_use]
    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// The message code, i.e. the last dotted segment of [`code`](Self::code).
    #[must_use]
    pub fn short_code(&self) -> &str {
        self.code.rsplit('.').next().unwrap_or(&self.code)
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let fixable = if self.fixable { " (fixable)" } else { "" };
        let _ = writeln!(output, "  {}: {}{fixable}", self.severity, self.message);
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// A violation rendered as a miette [`Diagnostic`].
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.suggestion.as_ref().map(|s| s.message.clone()),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Fixed content produced for one file in fix mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFile {
    /// File path.
    pub path: PathBuf,
    /// Content with all fixes applied.
    pub content: String,
    /// Number of applied changes.
    pub fixes: usize,
}

/// Result of running sniffs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Files changed by fixes (fix mode only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_files: Vec<FixedFile>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns true if there are any warnings or errors.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity >= Severity::Warning)
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let errors = self.by_severity(Severity::Error).len();
        let warnings = self.by_severity(Severity::Warning).len();
        let infos = self.by_severity(Severity::Info).len();
        (errors, warnings, infos)
    }

    /// Number of violations the sniffs can fix.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.violations.iter().filter(|v| v.fixable).count()
    }

    /// One-line summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let (errors, warnings, infos) = self.count_by_severity();
        format!(
            "Found {} error(s), {} warning(s), {} info(s) in {} file(s); {} fixable",
            errors,
            warnings,
            infos,
            self.files_checked,
            self.fixable_count()
        )
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Adds violations and fixes from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.fixed_files.extend(other.fixed_files);
        self.files_checked += other.files_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "Ormsniff.Commenting.DoctrineEntity.ColumnUnderscored",
            "doctrine-entity",
            severity,
            Location::new(PathBuf::from("src/Entity/User.php"), 42, 10),
            "Column name must be underscored variable name; expected \"first_name\" but found \"firstName\"",
        )
    }

    #[test]
    fn violation_short_code() {
        assert_eq!(make_violation(Severity::Error).short_code(), "ColumnUnderscored");
    }

    #[test]
    fn violation_format_marks_fixable() {
        let v = make_violation(Severity::Error).fixable();
        assert!(v.format().contains("(fixable)"));
        assert!(!make_violation(Severity::Error).format().contains("(fixable)"));
    }

    #[test]
    fn violation_format_includes_suggestion() {
        let v = make_violation(Severity::Error)
            .with_suggestion(Suggestion::new("Rename the column to \"first_name\""));
        assert!(v.format().contains("= help: Rename the column"));
    }

    #[test]
    fn violation_display() {
        let v = make_violation(Severity::Warning);
        insta::assert_snapshot!(
            v.to_string(),
            @r#"src/Entity/User.php:42:10: warning [Ormsniff.Commenting.DoctrineEntity.ColumnUnderscored] Column name must be underscored variable name; expected "first_name" but found "firstName""#
        );
    }

    #[test]
    fn violation_diagnostic_carries_code_and_span() {
        let mut v = make_violation(Severity::Error);
        v.location = v.location.with_span(120, 8);
        let diagnostic = ViolationDiagnostic::from(&v);
        assert!(diagnostic.to_string().starts_with("[Ormsniff.Commenting.DoctrineEntity.ColumnUnderscored]"));
        let labels: Vec<_> = diagnostic.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 120);
        assert_eq!(labels[0].len(), 8);
    }

    #[test]
    fn has_violations_at_error_only() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
    }

    #[test]
    fn summary_counts_by_severity() {
        let mut result = LintResult::new();
        result.files_checked = 5;
        result.violations.push(make_violation(Severity::Warning));
        result.violations.push(make_violation(Severity::Error).fixable());

        assert_eq!(
            result.summary(),
            "Found 1 error(s), 1 warning(s), 0 info(s) in 5 file(s); 1 fixable"
        );
    }

    #[test]
    fn extend_merges_fixed_files() {
        let mut result = LintResult::new();
        let other = LintResult {
            violations: vec![make_violation(Severity::Error)],
            files_checked: 1,
            fixed_files: vec![FixedFile {
                path: PathBuf::from("a.php"),
                content: String::new(),
                fixes: 1,
            }],
        };
        result.extend(other);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.fixed_files.len(), 1);
    }
}
