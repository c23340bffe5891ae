//! Hand-rolled PHP tokenizer.
//!
//! Produces the token stream sniffs run against: a flat list of
//! [`Token`]s whose contents concatenate back to the original source,
//! annotated with parenthesis/bracket/scope/attribute pairing, doc-comment
//! structure and enclosing scope conditions.
//!
//! Only the PHP subset that class declarations use is modelled precisely.
//! Everything else still tokenizes, just more coarsely (e.g. interpolated
//! strings are a single token).

use crate::token::{Token, TokenKind};
use thiserror::Error;

/// Errors raised while tokenizing a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A `/* */` or `/** */` comment is never closed.
    #[error("unterminated comment starting on line {line}")]
    UnterminatedComment {
        /// Line the comment starts on.
        line: usize,
    },

    /// A quoted string, heredoc or nowdoc is never closed.
    #[error("unterminated string starting on line {line}")]
    UnterminatedString {
        /// Line the string starts on.
        line: usize,
    },

    /// A closing bracket has no opener, or an opener is never closed.
    #[error("unbalanced '{found}' on line {line}")]
    UnbalancedBracket {
        /// Line of the offending bracket.
        line: usize,
        /// The bracket character.
        found: char,
    },
}

/// Tokenizes PHP source text.
///
/// # Errors
///
/// Returns an error for unterminated comments or strings and for
/// unbalanced brackets.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokens = Lexer::new(source).run()?;
    resolve_nullable(&mut tokens);
    pair(&mut tokens)?;
    Ok(tokens)
}

const OPERATORS: &[(&str, TokenKind)] = &[
    ("...", TokenKind::Ellipsis),
    ("?->", TokenKind::NullsafeObjectOperator),
    ("<=>", TokenKind::Operator),
    ("**=", TokenKind::Operator),
    ("===", TokenKind::Operator),
    ("!==", TokenKind::Operator),
    ("<<=", TokenKind::Operator),
    (">>=", TokenKind::Operator),
    ("??=", TokenKind::Operator),
    ("->", TokenKind::ObjectOperator),
    ("=>", TokenKind::DoubleArrow),
    ("::", TokenKind::DoubleColon),
    ("==", TokenKind::Operator),
    ("!=", TokenKind::Operator),
    ("<>", TokenKind::Operator),
    ("<=", TokenKind::Operator),
    (">=", TokenKind::Operator),
    ("&&", TokenKind::Operator),
    ("||", TokenKind::Operator),
    ("??", TokenKind::Operator),
    ("++", TokenKind::Operator),
    ("--", TokenKind::Operator),
    ("+=", TokenKind::Operator),
    ("-=", TokenKind::Operator),
    ("*=", TokenKind::Operator),
    ("/=", TokenKind::Operator),
    (".=", TokenKind::Operator),
    ("%=", TokenKind::Operator),
    ("&=", TokenKind::Operator),
    ("|=", TokenKind::Operator),
    ("^=", TokenKind::Operator),
    ("**", TokenKind::Operator),
    ("<<", TokenKind::Operator),
    (">>", TokenKind::Operator),
];

fn single_char_kind(c: char) -> TokenKind {
    match c {
        '(' => TokenKind::OpenParenthesis,
        ')' => TokenKind::CloseParenthesis,
        '[' => TokenKind::OpenSquareBracket,
        ']' => TokenKind::CloseSquareBracket,
        '{' => TokenKind::OpenCurlyBracket,
        '}' => TokenKind::CloseCurlyBracket,
        ';' => TokenKind::Semicolon,
        ',' => TokenKind::Comma,
        ':' => TokenKind::Colon,
        '=' => TokenKind::Equal,
        // Ternary until resolve_nullable decides otherwise.
        '?' => TokenKind::InlineThen,
        '\\' => TokenKind::NsSeparator,
        '|' => TokenKind::Pipe,
        '&' => TokenKind::Ampersand,
        '@' => TokenKind::At,
        _ => TokenKind::Operator,
    }
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    let kind = match word.to_ascii_lowercase().as_str() {
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "trait" => TokenKind::Trait,
        "enum" => TokenKind::Enum,
        "function" => TokenKind::Function,
        "fn" => TokenKind::Fn,
        "return" => TokenKind::Return,
        "public" => TokenKind::Public,
        "protected" => TokenKind::Protected,
        "private" => TokenKind::Private,
        "static" => TokenKind::Static,
        "readonly" => TokenKind::Readonly,
        "var" => TokenKind::Var,
        "abstract" => TokenKind::Abstract,
        "final" => TokenKind::Final,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "break" => TokenKind::Break,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "use" => TokenKind::Use,
        "namespace" => TokenKind::Namespace,
        "const" => TokenKind::Const,
        "self" => TokenKind::SelfKeyword,
        "parent" => TokenKind::Parent,
        "array" => TokenKind::Array,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

fn ident_len(text: &str) -> usize {
    text.char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map_or(text.len(), |(i, _)| i)
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn push(&mut self, kind: TokenKind, len: usize) -> usize {
        let text = &self.src[self.pos..self.pos + len];
        let index = self.tokens.len();
        self.tokens
            .push(Token::new(kind, text, self.line, self.column, self.pos));
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += len;
        index
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut in_php = false;
        while self.pos < self.src.len() {
            if in_php {
                in_php = self.lex_php_token()?;
                continue;
            }

            let rest = self.rest();
            let open = [rest.find("<?php"), rest.find("<?=")]
                .into_iter()
                .flatten()
                .min();
            match open {
                Some(0) => {
                    let len = if rest.starts_with("<?=") { 3 } else { 5 };
                    self.push(TokenKind::OpenTag, len);
                    in_php = true;
                }
                Some(start) => {
                    self.push(TokenKind::InlineHtml, start);
                }
                None => {
                    self.push(TokenKind::InlineHtml, rest.len());
                }
            }
        }
        Ok(self.tokens)
    }

    /// Lexes one token; returns whether the lexer is still inside PHP code.
    fn lex_php_token(&mut self) -> Result<bool, TokenizeError> {
        let rest = self.rest();
        let Some(c) = rest.chars().next() else {
            return Ok(true);
        };
        let next = rest[c.len_utf8()..].chars().next();

        if rest.starts_with("?>") {
            let newline = if rest[2..].starts_with("\r\n") {
                2
            } else {
                usize::from(rest[2..].starts_with('\n'))
            };
            self.push(TokenKind::CloseTag, 2 + newline);
            return Ok(false);
        }

        match c {
            ' ' | '\t' | '\r' | '\n' => {
                let len = whitespace_len(rest);
                self.push(TokenKind::Whitespace, len);
            }
            '#' if next == Some('[') => {
                self.push(TokenKind::AttributeStart, 2);
            }
            '#' => {
                self.push(TokenKind::Comment, line_comment_len(rest));
            }
            '/' if next == Some('/') => {
                self.push(TokenKind::Comment, line_comment_len(rest));
            }
            '/' if rest.starts_with("/**")
                && rest[3..].starts_with(|c: char| c.is_ascii_whitespace()) =>
            {
                self.lex_doc_comment()?;
            }
            '/' if next == Some('*') => {
                let end = rest[2..]
                    .find("*/")
                    .ok_or(TokenizeError::UnterminatedComment { line: self.line })?;
                self.push(TokenKind::Comment, end + 4);
            }
            '$' if next.is_some_and(is_ident_start) => {
                let len = 1 + ident_len(&rest[1..]);
                self.push(TokenKind::Variable, len);
            }
            '\'' | '"' | '`' => {
                let len = quoted_len(rest, c)
                    .ok_or(TokenizeError::UnterminatedString { line: self.line })?;
                self.push(TokenKind::ConstantEncapsedString, len);
            }
            '<' if rest.starts_with("<<<") && heredoc_label(rest).is_some() => {
                let len = heredoc_len(rest)
                    .ok_or(TokenizeError::UnterminatedString { line: self.line })?;
                self.push(TokenKind::ConstantEncapsedString, len);
            }
            '0'..='9' => {
                self.push(TokenKind::Number, number_len(rest));
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                self.push(TokenKind::Number, number_len(rest));
            }
            c if is_ident_start(c) => {
                let len = ident_len(rest);
                let kind = self.classify_word(&rest[..len]);
                self.push(kind, len);
            }
            _ => {
                let (kind, len) = OPERATORS
                    .iter()
                    .find(|(op, _)| rest.starts_with(op))
                    .map_or((single_char_kind(c), c.len_utf8()), |&(op, kind)| {
                        (kind, op.len())
                    });
                self.push(kind, len);
            }
        }
        Ok(true)
    }

    fn last_significant(&self, skip: usize) -> Option<TokenKind> {
        self.tokens
            .iter()
            .rev()
            .filter(|t| !t.kind.is_empty())
            .nth(skip)
            .map(|t| t.kind)
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        let forced = match self.last_significant(0) {
            Some(
                TokenKind::Function
                | TokenKind::ObjectOperator
                | TokenKind::NullsafeObjectOperator
                | TokenKind::DoubleColon
                | TokenKind::Const,
            ) => true,
            Some(TokenKind::Ampersand) => self.last_significant(1) == Some(TokenKind::Function),
            _ => false,
        };
        let after = &self.src[self.pos + word.len()..];
        let in_name = self.src[..self.pos].ends_with('\\') || after.starts_with('\\');
        if forced || in_name {
            return TokenKind::String;
        }

        match keyword_kind(word) {
            Some(TokenKind::Enum) => {
                let follows_name = after
                    .trim_start()
                    .starts_with(is_ident_start);
                if follows_name {
                    TokenKind::Enum
                } else {
                    TokenKind::String
                }
            }
            Some(kind) => kind,
            None => TokenKind::String,
        }
    }

    fn lex_doc_comment(&mut self) -> Result<(), TokenizeError> {
        let body_len = self.rest()[3..]
            .find("*/")
            .ok_or(TokenizeError::UnterminatedComment { line: self.line })?;
        let opener = self.push(TokenKind::DocCommentOpenTag, 3);
        let body_end = self.pos + body_len;
        let mut tags = Vec::new();
        let mut line_start = false;

        while self.pos < body_end {
            let rest = &self.src[self.pos..body_end];
            if rest.starts_with("\r\n") {
                self.push(TokenKind::DocCommentWhitespace, 2);
                line_start = true;
                continue;
            }
            let Some(c) = rest.chars().next() else { break };
            match c {
                '\n' => {
                    self.push(TokenKind::DocCommentWhitespace, 1);
                    line_start = true;
                }
                ' ' | '\t' | '\r' => {
                    let len = rest
                        .find(|c: char| c != ' ' && c != '\t')
                        .unwrap_or(rest.len())
                        .max(1);
                    self.push(TokenKind::DocCommentWhitespace, len);
                }
                '*' if line_start => {
                    self.push(TokenKind::DocCommentStar, 1);
                    line_start = false;
                }
                '@' if tag_len(rest) > 1 => {
                    tags.push(self.push(TokenKind::DocCommentTag, tag_len(rest)));
                    line_start = false;
                }
                _ => {
                    let line_len = rest.find(['\r', '\n']).unwrap_or(rest.len());
                    let len = rest[..line_len].trim_end_matches([' ', '\t']).len();
                    self.push(TokenKind::DocCommentString, len.max(c.len_utf8()));
                    line_start = false;
                }
            }
        }

        let closer = self.push(TokenKind::DocCommentCloseTag, 2);
        self.tokens[opener].comment_closer = Some(closer);
        self.tokens[opener].comment_tags = tags;
        self.tokens[closer].comment_opener = Some(opener);
        Ok(())
    }
}

/// Whitespace up to and including the first newline.
fn whitespace_len(text: &str) -> usize {
    let mut len = 0;
    for c in text.chars() {
        match c {
            '\n' => return len + 1,
            ' ' | '\t' | '\r' => len += 1,
            _ => break,
        }
    }
    len
}

fn line_comment_len(text: &str) -> usize {
    let eol = text.find(['\r', '\n']).unwrap_or(text.len());
    let close = text.find("?>").unwrap_or(text.len());
    eol.min(close)
}

fn tag_len(text: &str) -> usize {
    text.char_indices()
        .skip(1)
        .find(|&(_, c)| c.is_whitespace() || c == '(')
        .map_or(text.len(), |(i, _)| i)
}

fn quoted_len(text: &str, quote: char) -> Option<usize> {
    let bytes = text.as_bytes();
    let quote = u8::try_from(quote).ok()?;
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn heredoc_label(text: &str) -> Option<&str> {
    let header = text[3..].trim_start_matches([' ', '\t']);
    let header = header.trim_start_matches(['\'', '"']);
    let len = ident_len(header);
    (len > 0 && header.starts_with(is_ident_start)).then(|| &header[..len])
}

fn heredoc_len(text: &str) -> Option<usize> {
    let label = heredoc_label(text)?;
    let body_start = text.find('\n')? + 1;
    let mut line_start = body_start;
    while line_start < text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |i| line_start + i);
        let line = &text[line_start..line_end];
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        let candidate = &line[indent..];
        if candidate.starts_with(label)
            && !candidate[label.len()..].starts_with(is_ident_char)
        {
            return Some(line_start + indent + label.len());
        }
        line_start = line_end + 1;
    }
    None
}

fn number_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let hex = text.starts_with("0x") || text.starts_with("0X");
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let exponent_sign = (b == b'+' || b == b'-')
            && !hex
            && i > 0
            && matches!(bytes[i - 1], b'e' | b'E')
            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
            i += 1;
        } else {
            break;
        }
    }
    i
}

fn significant_before(tokens: &[Token], index: usize) -> Option<TokenKind> {
    tokens[..index]
        .iter()
        .rev()
        .find(|t| !t.kind.is_empty())
        .map(|t| t.kind)
}

fn significant_after(tokens: &[Token], index: usize) -> Option<TokenKind> {
    tokens[index + 1..]
        .iter()
        .find(|t| !t.kind.is_empty())
        .map(|t| t.kind)
}

/// Turns `?` in type positions into [`TokenKind::Nullable`].
fn resolve_nullable(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        if tokens[i].kind != TokenKind::InlineThen {
            continue;
        }
        let type_position = significant_before(tokens, i).is_some_and(|k| {
            matches!(
                k,
                TokenKind::OpenParenthesis | TokenKind::Comma | TokenKind::Colon
            ) || k.is_modifier()
        });
        let starts_type = matches!(
            significant_after(tokens, i),
            Some(
                TokenKind::String
                    | TokenKind::NsSeparator
                    | TokenKind::Array
                    | TokenKind::Static
                    | TokenKind::Null
                    | TokenKind::SelfKeyword
                    | TokenKind::Parent
            )
        );
        if type_position && starts_type {
            tokens[i].kind = TokenKind::Nullable;
        }
    }
}

fn unbalanced(token: &Token) -> TokenizeError {
    TokenizeError::UnbalancedBracket {
        line: token.line,
        found: token.content.chars().next().unwrap_or(' '),
    }
}

/// Links openers with closers and records scope conditions.
fn pair(tokens: &mut [Token]) -> Result<(), TokenizeError> {
    let mut parens: Vec<(usize, Option<usize>)> = Vec::new();
    let mut brackets: Vec<(usize, bool)> = Vec::new();
    let mut braces: Vec<(usize, Option<usize>)> = Vec::new();
    let mut conditions: Vec<(usize, TokenKind)> = Vec::new();
    let mut pending_scope_owner: Option<usize> = None;
    let mut pending_paren_owner: Option<usize> = None;
    let mut attribute: Option<usize> = None;

    for i in 0..tokens.len() {
        let kind = tokens[i].kind;
        if kind == TokenKind::CloseCurlyBracket && matches!(braces.last(), Some((_, Some(_)))) {
            conditions.pop();
        }
        tokens[i].conditions.clone_from(&conditions);
        tokens[i].nested_parenthesis = parens.len();
        if attribute.is_some() {
            tokens[i].attribute_opener = attribute;
        }

        match kind {
            TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum => {
                pending_scope_owner = Some(i);
            }
            TokenKind::Function => {
                pending_scope_owner = Some(i);
                pending_paren_owner = Some(i);
            }
            TokenKind::Fn => pending_paren_owner = Some(i),
            TokenKind::Semicolon => {
                pending_scope_owner = None;
                pending_paren_owner = None;
            }
            TokenKind::OpenParenthesis => {
                let owner = pending_paren_owner.take();
                if let Some(owner) = owner {
                    tokens[owner].parenthesis_opener = Some(i);
                }
                parens.push((i, owner));
            }
            TokenKind::CloseParenthesis => {
                let (opener, owner) = parens.pop().ok_or_else(|| unbalanced(&tokens[i]))?;
                tokens[i].nested_parenthesis = parens.len();
                for index in [opener, i] {
                    tokens[index].parenthesis_opener = Some(opener);
                    tokens[index].parenthesis_closer = Some(i);
                }
                if let Some(owner) = owner {
                    tokens[owner].parenthesis_closer = Some(i);
                }
            }
            TokenKind::OpenSquareBracket => brackets.push((i, false)),
            TokenKind::AttributeStart => {
                brackets.push((i, true));
                attribute = Some(i);
                tokens[i].attribute_opener = Some(i);
            }
            TokenKind::CloseSquareBracket => {
                let (opener, is_attribute) =
                    brackets.pop().ok_or_else(|| unbalanced(&tokens[i]))?;
                if is_attribute {
                    tokens[i].kind = TokenKind::AttributeEnd;
                    for token in &mut tokens[opener..=i] {
                        token.attribute_opener = Some(opener);
                        token.attribute_closer = Some(i);
                    }
                    attribute = None;
                } else {
                    for index in [opener, i] {
                        tokens[index].bracket_opener = Some(opener);
                        tokens[index].bracket_closer = Some(i);
                    }
                }
            }
            TokenKind::OpenCurlyBracket => {
                let owner = pending_scope_owner.take();
                pending_paren_owner = None;
                if let Some(owner) = owner {
                    tokens[owner].scope_opener = Some(i);
                    conditions.push((owner, tokens[owner].kind));
                }
                braces.push((i, owner));
            }
            TokenKind::CloseCurlyBracket => {
                let (opener, owner) = braces.pop().ok_or_else(|| unbalanced(&tokens[i]))?;
                for index in [opener, i] {
                    tokens[index].scope_opener = Some(opener);
                    tokens[index].scope_closer = Some(i);
                }
                if let Some(owner) = owner {
                    tokens[owner].scope_closer = Some(i);
                }
            }
            _ => {}
        }
    }

    let unclosed = parens
        .first()
        .map(|&(i, _)| i)
        .or_else(|| brackets.first().map(|&(i, _)| i))
        .or_else(|| braces.first().map(|&(i, _)| i));
    match unclosed {
        Some(i) => Err(unbalanced(&tokens[i])),
        None => Ok(()),
    }
}
