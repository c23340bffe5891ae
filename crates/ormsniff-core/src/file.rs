//! A tokenized PHP file and its navigation queries.

use crate::token::{Token, TokenKind};
use crate::tokenizer::{tokenize, TokenizeError};
use std::path::{Path, PathBuf};

/// Declared visibility of a method or property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// `public`, also the implicit default.
    #[default]
    Public,
    /// `protected`.
    Protected,
    /// `private`.
    Private,
}

impl Visibility {
    fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Public => Some(Self::Public),
            TokenKind::Protected => Some(Self::Protected),
            TokenKind::Private => Some(Self::Private),
            _ => None,
        }
    }
}

/// Signature-level facts about a method declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodProperties {
    /// Declared or implied visibility.
    pub scope: Visibility,
    /// Whether the visibility was written out.
    pub scope_specified: bool,
    /// Declared return type as written, including a leading `?`; empty if none.
    pub return_type: String,
    /// Whether the return type starts with `?`.
    pub nullable_return_type: bool,
    /// `abstract` modifier present.
    pub is_abstract: bool,
    /// `final` modifier present.
    pub is_final: bool,
    /// `static` modifier present.
    pub is_static: bool,
    /// Whether the method has a `{}` body.
    pub has_body: bool,
}

/// One parameter of a method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    /// Index of the parameter's variable token.
    pub token: usize,
    /// Variable name including `$`.
    pub name: String,
    /// Full parameter source text, trimmed.
    pub content: String,
    /// Declared type as written, including a leading `?`; empty if none.
    pub type_hint: String,
    /// Whether the type starts with `?`.
    pub nullable_type: bool,
    /// Default value source text, if any.
    pub default: Option<String>,
    /// `&$param`.
    pub pass_by_reference: bool,
    /// `...$param`.
    pub variable_length: bool,
    /// Visibility of a constructor-promoted property.
    pub property_visibility: Option<Visibility>,
}

/// Declaration facts about a class property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberProperties {
    /// Declared or implied visibility.
    pub scope: Visibility,
    /// Whether the visibility was written out.
    pub scope_specified: bool,
    /// `static` modifier present.
    pub is_static: bool,
    /// `readonly` modifier present.
    pub is_readonly: bool,
    /// Declared type as written, including a leading `?`; `None` if untyped.
    pub type_hint: Option<String>,
    /// Whether the type starts with `?`.
    pub nullable_type: bool,
}

fn is_type_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::String
            | TokenKind::NsSeparator
            | TokenKind::Nullable
            | TokenKind::Pipe
            | TokenKind::Ampersand
            | TokenKind::Array
            | TokenKind::Static
            | TokenKind::Null
            | TokenKind::True
            | TokenKind::False
            | TokenKind::SelfKeyword
            | TokenKind::Parent
            | TokenKind::OpenParenthesis
            | TokenKind::CloseParenthesis
    )
}

/// A PHP source file with its token stream.
#[derive(Debug, Clone)]
pub struct PhpFile {
    path: PathBuf,
    content: String,
    tokens: Vec<Token>,
}

impl PhpFile {
    /// Tokenizes `content` as the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be tokenized.
    pub fn parse(path: impl Into<PathBuf>, content: impl Into<String>) -> Result<Self, TokenizeError> {
        let content = content.into();
        let tokens = tokenize(&content)?;
        Ok(Self {
            path: path.into(),
            content,
            tokens,
        })
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original file content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// All tokens in source order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Line ending used by the file.
    #[must_use]
    pub fn eol_char(&self) -> &'static str {
        match self.content.find('\n') {
            Some(i) if i > 0 && self.content.as_bytes()[i - 1] == b'\r' => "\r\n",
            _ => "\n",
        }
    }

    fn search_forward<F>(&self, start: usize, end: Option<usize>, matches: F) -> Option<usize>
    where
        F: Fn(&Token) -> bool,
    {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| matches(&self.tokens[i]))
    }

    fn search_backward<F>(&self, start: usize, end: Option<usize>, matches: F) -> Option<usize>
    where
        F: Fn(&Token) -> bool,
    {
        if self.tokens.is_empty() {
            return None;
        }
        let start = start.min(self.tokens.len() - 1);
        let end = end.unwrap_or(0);
        if start < end {
            return None;
        }
        (end..=start).rev().find(|&i| matches(&self.tokens[i]))
    }

    /// Finds the next token at or after `start` (and before `end`) whose kind
    /// is in `kinds`, or not in `kinds` when `exclude` is set.
    #[must_use]
    pub fn find_next(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
        exclude: bool,
    ) -> Option<usize> {
        self.search_forward(start, end, |t| kinds.contains(&t.kind) != exclude)
    }

    /// Finds the previous token at or before `start` (and at or after `end`)
    /// whose kind is in `kinds`, or not in `kinds` when `exclude` is set.
    #[must_use]
    pub fn find_previous(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
        exclude: bool,
    ) -> Option<usize> {
        self.search_backward(start, end, |t| kinds.contains(&t.kind) != exclude)
    }

    /// Like [`find_next`](Self::find_next), additionally requiring exact content.
    #[must_use]
    pub fn find_next_with_content(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
        content: &str,
    ) -> Option<usize> {
        self.search_forward(start, end, |t| kinds.contains(&t.kind) && t.content == content)
    }

    /// Next token that is neither whitespace nor a comment.
    #[must_use]
    pub fn find_next_non_empty(&self, start: usize, end: Option<usize>) -> Option<usize> {
        self.search_forward(start, end, |t| !t.kind.is_empty())
    }

    /// Previous token that is neither whitespace nor a comment.
    #[must_use]
    pub fn find_previous_non_empty(&self, start: usize, end: Option<usize>) -> Option<usize> {
        self.search_backward(start, end, |t| !t.kind.is_empty())
    }

    /// Concatenated content of `length` tokens starting at `start`.
    #[must_use]
    pub fn tokens_as_string(&self, start: usize, length: usize) -> String {
        let end = start.saturating_add(length).min(self.tokens.len());
        if start >= end {
            return String::new();
        }
        self.tokens[start..end]
            .iter()
            .map(|t| t.content.as_str())
            .collect()
    }

    /// Name of a class-like or function declaration, `None` for anonymous ones.
    #[must_use]
    pub fn declaration_name(&self, ptr: usize) -> Option<&str> {
        let token = self.tokens.get(ptr)?;
        if !token.kind.is_class_like() && token.kind != TokenKind::Function {
            return None;
        }
        let mut next = self.find_next_non_empty(ptr + 1, None)?;
        if self.tokens[next].kind == TokenKind::Ampersand {
            next = self.find_next_non_empty(next + 1, None)?;
        }
        let name = &self.tokens[next];
        (name.kind == TokenKind::String).then_some(name.content.as_str())
    }

    /// Signature facts for the `function` token at `ptr`.
    #[must_use]
    pub fn method_properties(&self, ptr: usize) -> MethodProperties {
        let mut props = MethodProperties::default();
        let Some(token) = self.tokens.get(ptr) else {
            return props;
        };
        props.has_body = token.scope_opener.is_some();

        let mut i = ptr;
        while let Some(prev) = i.checked_sub(1).and_then(|p| self.find_previous_non_empty(p, None)) {
            let kind = self.tokens[prev].kind;
            if let Some(scope) = Visibility::from_kind(kind) {
                props.scope = scope;
                props.scope_specified = true;
            } else {
                match kind {
                    TokenKind::Abstract => props.is_abstract = true,
                    TokenKind::Final => props.is_final = true,
                    TokenKind::Static => props.is_static = true,
                    _ => break,
                }
            }
            i = prev;
        }

        let Some(mut cursor) = token.parenthesis_closer else {
            return props;
        };
        let Some(mut next) = self.find_next_non_empty(cursor + 1, None) else {
            return props;
        };
        if self.tokens[next].kind == TokenKind::Use {
            let uses_closer = self
                .find_next(&[TokenKind::OpenParenthesis], next, None, false)
                .and_then(|open| self.tokens[open].parenthesis_closer);
            let Some(closer) = uses_closer else {
                return props;
            };
            cursor = closer;
            match self.find_next_non_empty(cursor + 1, None) {
                Some(after) => next = after,
                None => return props,
            }
        }
        if self.tokens[next].kind != TokenKind::Colon {
            return props;
        }

        let end = self.find_next(
            &[TokenKind::OpenCurlyBracket, TokenKind::Semicolon, TokenKind::DoubleArrow],
            next + 1,
            None,
            false,
        );
        props.return_type = self.tokens[next + 1..end.unwrap_or(self.tokens.len())]
            .iter()
            .filter(|t| !t.kind.is_empty())
            .map(|t| t.content.as_str())
            .collect();
        props.nullable_return_type = props.return_type.starts_with('?');
        props
    }

    /// Parameters of the `function` token at `ptr`, in declaration order.
    #[must_use]
    pub fn method_parameters(&self, ptr: usize) -> Vec<MethodParameter> {
        let Some(token) = self.tokens.get(ptr) else {
            return Vec::new();
        };
        let (Some(open), Some(close)) = (token.parenthesis_opener, token.parenthesis_closer) else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut segment_start = open + 1;
        let mut i = open + 1;
        while i < close {
            let t = &self.tokens[i];
            let skip_to = match t.kind {
                TokenKind::OpenParenthesis => t.parenthesis_closer,
                TokenKind::OpenSquareBracket => t.bracket_closer,
                TokenKind::AttributeStart => t.attribute_closer,
                TokenKind::OpenCurlyBracket => t.scope_closer,
                TokenKind::Comma => {
                    params.extend(self.parse_parameter(segment_start, i));
                    segment_start = i + 1;
                    None
                }
                _ => None,
            };
            i = skip_to.map_or(i + 1, |closer| closer + 1);
        }
        params.extend(self.parse_parameter(segment_start, close));
        params
    }

    fn parse_parameter(&self, start: usize, end: usize) -> Option<MethodParameter> {
        let mut type_hint = String::new();
        let mut variable = None;
        let mut default = None;
        let mut pass_by_reference = false;
        let mut variable_length = false;
        let mut property_visibility = None;

        let mut i = start;
        while i < end {
            let t = &self.tokens[i];
            if variable.is_some() {
                if t.kind == TokenKind::Equal {
                    default = Some(self.tokens_as_string(i + 1, end - i - 1).trim().to_string());
                    break;
                }
                i += 1;
                continue;
            }

            match t.kind {
                TokenKind::AttributeStart => {
                    i = t.attribute_closer.unwrap_or(i);
                }
                TokenKind::Variable => variable = Some(i),
                TokenKind::Ellipsis => variable_length = true,
                TokenKind::Readonly => {}
                TokenKind::Ampersand => {
                    let by_ref = self
                        .find_next_non_empty(i + 1, Some(end))
                        .is_some_and(|n| {
                            matches!(self.tokens[n].kind, TokenKind::Variable | TokenKind::Ellipsis)
                        });
                    if by_ref {
                        pass_by_reference = true;
                    } else {
                        type_hint.push('&');
                    }
                }
                kind if kind.is_empty() => {}
                kind => {
                    if let Some(scope) = Visibility::from_kind(kind) {
                        property_visibility = Some(scope);
                    } else if is_type_token(kind) {
                        type_hint.push_str(&t.content);
                    }
                }
            }
            i += 1;
        }

        let token = variable?;
        Some(MethodParameter {
            token,
            name: self.tokens[token].content.clone(),
            content: self.tokens_as_string(start, end - start).trim().to_string(),
            nullable_type: type_hint.starts_with('?'),
            type_hint,
            default,
            pass_by_reference,
            variable_length,
            property_visibility,
        })
    }

    /// Declaration facts for the property variable at `ptr`.
    #[must_use]
    pub fn member_properties(&self, ptr: usize) -> MemberProperties {
        let mut props = MemberProperties::default();
        let mut type_tokens = Vec::new();
        let mut i = ptr;
        while i > 0 {
            i -= 1;
            let kind = self.tokens[i].kind;
            if kind.is_empty() {
                continue;
            }
            if let Some(scope) = Visibility::from_kind(kind) {
                props.scope = scope;
                props.scope_specified = true;
                continue;
            }
            match kind {
                TokenKind::Static => props.is_static = true,
                TokenKind::Readonly => props.is_readonly = true,
                TokenKind::Var => {}
                kind if is_type_token(kind) && !props.scope_specified => type_tokens.push(i),
                _ => break,
            }
        }

        if !type_tokens.is_empty() {
            let type_hint: String = type_tokens
                .iter()
                .rev()
                .map(|&t| self.tokens[t].content.as_str())
                .collect();
            props.nullable_type = type_hint.starts_with('?');
            props.type_hint = Some(type_hint);
        }
        props
    }

    /// Property variables declared directly in a class-like body.
    ///
    /// Constructor-promoted parameters are not included.
    #[must_use]
    pub fn member_vars(&self) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.kind == TokenKind::Variable
                    && t.nested_parenthesis == 0
                    && t.attribute_opener.is_none()
                    && t.conditions.last().is_some_and(|&(_, kind)| kind.is_class_like())
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Innermost class-like declaration enclosing `ptr`.
    #[must_use]
    pub fn enclosing_class(&self, ptr: usize) -> Option<usize> {
        self.tokens
            .get(ptr)?
            .conditions
            .iter()
            .rev()
            .find(|(_, kind)| kind.is_class_like())
            .map(|&(owner, _)| owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY: &str = r#"<?php

namespace App\Entity;

class Post
{
    /**
     * @var int
     */
    private ?int $id = null;

    #[ORM\Column]
    protected static string|null $title;

    public function __construct(private readonly string $slug)
    {
        $local = 1;
    }

    public function setTitle(?string $title = null, int &...$rest): static
    {
        return $this;
    }

    abstract protected function body(): ?\App\Body;

    public function items(array $items = [1, 2], callable $cb = null)
    {
    }
}
"#;

    fn parse() -> PhpFile {
        PhpFile::parse("Post.php", ENTITY).unwrap()
    }

    fn function_named(file: &PhpFile, name: &str) -> usize {
        file.tokens()
            .iter()
            .enumerate()
            .find(|&(i, t)| {
                t.kind == TokenKind::Function && file.declaration_name(i) == Some(name)
            })
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_member_vars_skip_locals_and_promoted() {
        let file = parse();
        let names: Vec<&str> = file
            .member_vars()
            .into_iter()
            .map(|i| file.tokens()[i].content.as_str())
            .collect();
        assert_eq!(names, vec!["$id", "$title"]);
    }

    #[test]
    fn test_member_properties() {
        let file = parse();
        let vars = file.member_vars();

        let id = file.member_properties(vars[0]);
        assert_eq!(id.type_hint.as_deref(), Some("?int"));
        assert!(id.nullable_type);
        assert_eq!(id.scope, Visibility::Private);

        let title = file.member_properties(vars[1]);
        assert_eq!(title.type_hint.as_deref(), Some("string|null"));
        assert!(title.is_static);
        assert_eq!(title.scope, Visibility::Protected);
    }

    #[test]
    fn test_method_properties() {
        let file = parse();
        let setter = file.method_properties(function_named(&file, "setTitle"));
        assert_eq!(setter.return_type, "static");
        assert!(setter.has_body);

        let body = file.method_properties(function_named(&file, "body"));
        assert_eq!(body.return_type, "?\\App\\Body");
        assert!(body.nullable_return_type);
        assert!(body.is_abstract);
        assert!(!body.has_body);
        assert_eq!(body.scope, Visibility::Protected);

        let items = file.method_properties(function_named(&file, "items"));
        assert_eq!(items.return_type, "");
    }

    #[test]
    fn test_method_parameters() {
        let file = parse();
        let params = file.method_parameters(function_named(&file, "setTitle"));
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "$title");
        assert_eq!(params[0].type_hint, "?string");
        assert!(params[0].nullable_type);
        assert_eq!(params[0].default.as_deref(), Some("null"));
        assert_eq!(params[1].type_hint, "int");
        assert!(params[1].pass_by_reference);
        assert!(params[1].variable_length);

        let params = file.method_parameters(function_named(&file, "items"));
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].default.as_deref(), Some("[1, 2]"));
        assert_eq!(params[1].type_hint, "callable");

        let params = file.method_parameters(function_named(&file, "__construct"));
        assert_eq!(params[0].property_visibility, Some(Visibility::Private));
        assert_eq!(params[0].type_hint, "string");
    }

    #[test]
    fn test_declaration_name_of_class() {
        let file = parse();
        let class = file
            .find_next(&[TokenKind::Class], 0, None, false)
            .unwrap();
        assert_eq!(file.declaration_name(class), Some("Post"));
        let id = file.member_vars()[0];
        assert_eq!(file.enclosing_class(id), Some(class));
    }

    #[test]
    fn test_find_previous_and_next_bounds() {
        let file = parse();
        let id = file.member_vars()[0];
        let close = file
            .find_previous(&[TokenKind::DocCommentCloseTag], id, None, false)
            .unwrap();
        assert!(close < id);
        assert_eq!(
            file.find_next(&[TokenKind::Variable], close + 1, None, false),
            Some(id)
        );
        assert_eq!(
            file.find_next(&[TokenKind::Variable], close + 1, Some(id), false),
            None
        );
    }

    #[test]
    fn test_tokens_as_string_clamps() {
        let file = parse();
        assert_eq!(file.tokens_as_string(0, 1), "<?php");
        assert_eq!(file.tokens_as_string(file.tokens().len(), 4), "");
        assert_eq!(file.tokens_as_string(0, usize::MAX), ENTITY);
    }

    #[test]
    fn test_eol_detection() {
        let file = PhpFile::parse("a.php", "<?php\r\n$a;").unwrap();
        assert_eq!(file.eol_char(), "\r\n");
        assert_eq!(parse().eol_char(), "\n");
    }
}
