//! Context passed to a sniff while it processes one file.

use crate::file::PhpFile;
use crate::fixer::Fixer;
use crate::sniff::Sniff;
use crate::types::{Location, Severity, Violation};

/// Per-sniff, per-file reporting context.
///
/// Violations are collected here; the [`Fixer`] is shared by every sniff
/// that runs on the same file.
pub struct SniffContext<'a> {
    file: &'a PhpFile,
    fixer: &'a mut Fixer,
    sniff_code: &'static str,
    sniff_name: &'static str,
    severity_override: Option<Severity>,
    violations: Vec<Violation>,
}

impl<'a> SniffContext<'a> {
    /// Creates a context for running `sniff` on `file`.
    ///
    /// A `severity_override` replaces the error/warning severity of every
    /// reported violation.
    pub fn new(
        file: &'a PhpFile,
        fixer: &'a mut Fixer,
        sniff: &dyn Sniff,
        severity_override: Option<Severity>,
    ) -> Self {
        Self {
            file,
            fixer,
            sniff_code: sniff.code(),
            sniff_name: sniff.name(),
            severity_override,
            violations: Vec::new(),
        }
    }

    /// The file being processed.
    #[must_use]
    pub fn file(&self) -> &'a PhpFile {
        self.file
    }

    /// The fixer shared by all sniffs on this file.
    pub fn fixer(&mut self) -> &mut Fixer {
        &mut *self.fixer
    }

    /// Dotted code of the running sniff.
    #[must_use]
    pub fn sniff_code(&self) -> &'static str {
        self.sniff_code
    }

    fn push(&mut self, message: String, ptr: usize, code: &str, severity: Severity, fixable: bool) {
        let path = self.file.path().to_path_buf();
        let location = match self.file.tokens().get(ptr) {
            Some(token) => Location::from_token(path, token),
            None => Location::new(path, 1, 1),
        };
        let mut violation = Violation::new(
            format!("{}.{code}", self.sniff_code),
            self.sniff_name,
            self.severity_override.unwrap_or(severity),
            location,
            message,
        );
        if fixable {
            violation = violation.fixable();
        }
        tracing::trace!(code = %violation.code, ptr, "violation");
        self.violations.push(violation);
    }

    /// Reports an error at token `ptr` under message `code`.
    pub fn add_error(&mut self, message: impl Into<String>, ptr: usize, code: &str) {
        self.push(message.into(), ptr, code, Severity::Error, false);
    }

    /// Reports a warning at token `ptr` under message `code`.
    pub fn add_warning(&mut self, message: impl Into<String>, ptr: usize, code: &str) {
        self.push(message.into(), ptr, code, Severity::Warning, false);
    }

    /// Reports a fixable error; returns whether the caller should apply its fix.
    pub fn add_fixable_error(&mut self, message: impl Into<String>, ptr: usize, code: &str) -> bool {
        self.push(message.into(), ptr, code, Severity::Error, true);
        self.fixer.is_enabled()
    }

    /// Reports a fixable warning; returns whether the caller should apply its fix.
    pub fn add_fixable_warning(&mut self, message: impl Into<String>, ptr: usize, code: &str) -> bool {
        self.push(message.into(), ptr, code, Severity::Warning, true);
        self.fixer.is_enabled()
    }

    /// Violations reported so far.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the context, returning its violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}
