//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! /**
//!  * @codingStandardsIgnoreError Ormsniff.Commenting.DoctrineEntity.ColumnGetterRequired
//!  */
//! ```

use std::collections::HashSet;

const DIRECTIVE: &str = "@codingStandardsIgnoreError";

/// Message codes suppressed for one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    codes: HashSet<String>,
}

impl IgnoreSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every directive in `comment`.
    ///
    /// Codes written as `<sniff_code>.<Code>` are stored as the bare `Code`.
    #[must_use]
    pub fn parse(comment: &str, sniff_code: &str) -> Self {
        let prefix = format!("{sniff_code}.");
        let mut codes = HashSet::new();
        let mut rest = comment;
        while let Some(at) = rest.find(DIRECTIVE) {
            rest = &rest[at + DIRECTIVE.len()..];
            let Some(first) = rest.chars().next() else {
                break;
            };
            if !first.is_whitespace() {
                continue;
            }
            let body = rest.trim_start();
            let end = body
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
                .unwrap_or(body.len());
            let code = &body[..end];
            if !code.is_empty() {
                let code = code.strip_prefix(&prefix).unwrap_or(code);
                codes.insert(code.to_string());
            }
            rest = &body[end..];
        }
        Self { codes }
    }

    /// Whether `code` is suppressed.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Whether no code is suppressed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIFF: &str = "Ormsniff.Commenting.DoctrineEntity";

    #[test]
    fn test_parse_strips_sniff_prefix() {
        let set = IgnoreSet::parse(
            "/** @codingStandardsIgnoreError Ormsniff.Commenting.DoctrineEntity.ColumnGetterRequired */",
            SNIFF,
        );
        assert!(set.contains("ColumnGetterRequired"));
        assert!(!set.contains("ColumnSetterRequired"));
    }

    #[test]
    fn test_parse_multiple_directives() {
        let comment = "/**\n * @codingStandardsIgnoreError ColumnUnderscored\n * @codingStandardsIgnoreError Other.Sniff.Code\n */";
        let set = IgnoreSet::parse(comment, SNIFF);
        assert!(set.contains("ColumnUnderscored"));
        assert!(set.contains("Other.Sniff.Code"));
    }

    #[test]
    fn test_parse_requires_whitespace_after_directive() {
        let set = IgnoreSet::parse("@codingStandardsIgnoreErrorFoo", SNIFF);
        assert!(set.is_empty());
        assert!(IgnoreSet::parse("@codingStandardsIgnoreError", SNIFF).is_empty());
    }
}
