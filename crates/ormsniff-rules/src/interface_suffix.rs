//! Sniff requiring interface names to end in `Interface`.
//!
//! # Rationale
//!
//! The Symfony coding standard suffixes interfaces with `Interface`, which
//! keeps contracts and implementations apart at the call site.
//!
//! # Fix
//!
//! Appends `Interface` to the declared name. References to the interface
//! elsewhere are not renamed.

use ormsniff_core::{Sniff, SniffContext, TokenKind};
use tracing::warn;

/// Sniff code for interface-suffix.
pub const CODE: &str = "Ormsniff.NamingConventions.InterfaceSuffix";

/// Sniff name for interface-suffix.
pub const NAME: &str = "interface-suffix";

const SUFFIX: &str = "Interface";

/// Requires the `Interface` suffix on interface names.
#[derive(Debug, Clone, Default)]
pub struct InterfaceSuffixSniff;

impl InterfaceSuffixSniff {
    /// Creates the sniff.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Sniff for InterfaceSuffixSniff {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires interface names to end in \"Interface\""
    }

    fn process(&self, ctx: &mut SniffContext<'_>) {
        let file = ctx.file();
        let tokens = file.tokens();

        for (ptr, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Interface {
                continue;
            }
            let name = tokens
                .iter()
                .enumerate()
                .skip(ptr + 1)
                .take_while(|(_, t)| t.line == token.line)
                .find(|(_, t)| t.kind == TokenKind::String);
            let Some((name_ptr, name)) = name else {
                continue;
            };
            if name.content.ends_with(SUFFIX) {
                continue;
            }
            if ctx.add_fixable_error("Interface name is not suffixed with \"Interface\"", name_ptr, "Missing") {
                let renamed = format!("{}{SUFFIX}", name.content);
                if let Err(err) = ctx.fixer().replace_token(name_ptr, renamed) {
                    warn!(error = %err, "interface rename rejected");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ormsniff_core::Analyzer;

    fn analyzer(fix: bool) -> Analyzer {
        Analyzer::builder()
            .sniff(InterfaceSuffixSniff::new())
            .fix(fix)
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_suffix() {
        let result = analyzer(false)
            .analyze_source("Repo.php", "<?php\ninterface Repository\n{\n}\n")
            .unwrap();
        assert_eq!(result.violations.len(), 1);
        let violation = &result.violations[0];
        assert_eq!(violation.code, "Ormsniff.NamingConventions.InterfaceSuffix.Missing");
        assert_eq!(violation.location.line, 2);
        assert!(violation.fixable);
    }

    #[test]
    fn test_suffixed_name_passes() {
        let result = analyzer(false)
            .analyze_source("Repo.php", "<?php\ninterface RepositoryInterface extends Countable\n{\n}\n")
            .unwrap();
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_fix_appends_suffix() {
        let result = analyzer(true)
            .analyze_source("Repo.php", "<?php\ninterface Repository\n{\n}\n")
            .unwrap();
        assert_eq!(result.fixed_files.len(), 1);
        assert_eq!(result.fixed_files[0].content, "<?php\ninterface RepositoryInterface\n{\n}\n");
    }
}
