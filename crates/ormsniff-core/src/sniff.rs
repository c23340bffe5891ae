//! The sniff trait.

use crate::context::SniffContext;
use crate::types::Severity;

/// A per-file check over the token stream of a PHP file.
///
/// Sniffs report through the [`SniffContext`] they receive, which also
/// carries the shared [`Fixer`](crate::Fixer) for fixable violations.
///
/// # Example
///
/// ```ignore
/// use ormsniff_core::{Sniff, SniffContext, TokenKind};
///
/// pub struct NoInlineHtml;
///
/// impl Sniff for NoInlineHtml {
///     fn name(&self) -> &'static str { "no-inline-html" }
///     fn code(&self) -> &'static str { "Ormsniff.Files.NoInlineHtml" }
///
///     fn process(&self, ctx: &mut SniffContext<'_>) {
///         let file = ctx.file();
///         for (ptr, token) in file.tokens().iter().enumerate() {
///             if token.kind == TokenKind::InlineHtml {
///                 ctx.add_error("Inline HTML is not allowed", ptr, "Found");
///             }
///         }
///     }
/// }
/// ```
pub trait Sniff: Send + Sync {
    /// Returns the kebab-case name of this sniff (e.g., "doctrine-entity").
    fn name(&self) -> &'static str;

    /// Returns the dotted sniff code (e.g., "Ormsniff.Commenting.DoctrineEntity").
    ///
    /// Violation codes are this code plus `.` plus the message code.
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this sniff checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this sniff.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Checks one file, reporting violations to `ctx`.
    fn process(&self, ctx: &mut SniffContext<'_>);
}

/// Type alias for boxed Sniff trait objects.
pub type SniffBox = Box<dyn Sniff>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::PhpFile;
    use crate::fixer::Fixer;
    use crate::token::TokenKind;

    struct VariableCounter;

    impl Sniff for VariableCounter {
        fn name(&self) -> &'static str {
            "variable-counter"
        }
        fn code(&self) -> &'static str {
            "Test.Variables.Counter"
        }
        fn default_severity(&self) -> Severity {
            Severity::Warning
        }

        fn process(&self, ctx: &mut SniffContext<'_>) {
            let file = ctx.file();
            for (ptr, token) in file.tokens().iter().enumerate() {
                if token.kind == TokenKind::Variable {
                    ctx.add_warning(format!("Found {}", token.content), ptr, "Found");
                }
            }
        }
    }

    #[test]
    fn test_sniff_trait() {
        let sniff = VariableCounter;
        assert_eq!(sniff.name(), "variable-counter");
        assert_eq!(sniff.description(), "");

        let file = PhpFile::parse("a.php", "<?php $a = $b;").unwrap();
        let mut fixer = Fixer::new(&file, false);
        let mut ctx = SniffContext::new(&file, &mut fixer, &sniff, None);
        sniff.process(&mut ctx);
        let violations = ctx.into_violations();

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].code, "Test.Variables.Counter.Found");
        assert_eq!(violations[1].message, "Found $b");
        assert_eq!(violations[1].severity, Severity::Warning);
    }
}
