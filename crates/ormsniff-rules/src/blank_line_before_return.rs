//! Sniff requiring a blank line before `return`.
//!
//! # Rationale
//!
//! Symfony style separates the return statement from the code computing the
//! result, unless the return is alone in its statement group.
//!
//! # Allowed Patterns
//!
//! - the previous line ends with `{` or `:`
//! - the return ends a `case` or `default` branch
//! - the previous line holds only whitespace or comments

use ormsniff_core::{PhpFile, Sniff, SniffContext, TokenKind};
use tracing::warn;

/// Sniff code for blank-line-before-return.
pub const CODE: &str = "Ormsniff.Formatting.BlankLineBeforeReturn";

/// Sniff name for blank-line-before-return.
pub const NAME: &str = "blank-line-before-return";

/// Requires a blank line before return statements.
#[derive(Debug, Clone, Default)]
pub struct BlankLineBeforeReturnSniff;

impl BlankLineBeforeReturnSniff {
    /// Creates the sniff.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Sniff for BlankLineBeforeReturnSniff {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires a blank line before return statements"
    }

    fn process(&self, ctx: &mut SniffContext<'_>) {
        let file = ctx.file();
        let tokens = file.tokens();

        for (ptr, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Return {
                continue;
            }
            let Some(last) = last_code_on_previous_line(file, ptr) else {
                continue;
            };
            if matches!(last, TokenKind::OpenCurlyBracket | TokenKind::Colon) || closes_case_branch(file, ptr) {
                continue;
            }

            if ctx.add_fixable_error("Missing blank line before return statement", ptr, "Missing") {
                let line_start = line_start(file, ptr);
                if let Err(err) = ctx.fixer().add_newline_before(line_start) {
                    warn!(error = %err, line = token.line, "blank line fix rejected");
                }
            }
        }
    }
}

/// Kind of the last token on the line above `ptr` that is not whitespace or
/// a comment.
fn last_code_on_previous_line(file: &PhpFile, ptr: usize) -> Option<TokenKind> {
    let tokens = file.tokens();
    let previous_line = tokens[ptr].line.checked_sub(1)?;
    tokens[..ptr]
        .iter()
        .rev()
        .take_while(|t| t.line >= previous_line)
        .filter(|t| t.line == previous_line)
        .find(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment))
        .map(|t| t.kind)
}

/// Whether the return at `ptr` is the first statement leaving the nearest
/// `case` or `default` branch.
fn closes_case_branch(file: &PhpFile, ptr: usize) -> bool {
    let tokens = file.tokens();
    [TokenKind::Case, TokenKind::Default].iter().any(|&kind| {
        file.find_previous(&[kind], ptr, None, false)
            .is_some_and(|branch| {
                tokens[branch].conditions == tokens[ptr].conditions
                    && file.find_next(&[TokenKind::Return, TokenKind::Break], branch + 1, None, false) == Some(ptr)
            })
    })
}

fn line_start(file: &PhpFile, ptr: usize) -> usize {
    let tokens = file.tokens();
    let line = tokens[ptr].line;
    let mut start = ptr;
    while start > 0 && tokens[start - 1].line == line {
        start -= 1;
    }
    start
}
