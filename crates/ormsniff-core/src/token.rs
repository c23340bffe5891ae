//! Token types produced by the PHP tokenizer.

/// Kind of a PHP token.
///
/// Names follow the PHP_CodeSniffer token vocabulary so sniffs read the
/// same way they would against the reference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<?php` or `<?=`.
    OpenTag,
    /// `?>`.
    CloseTag,
    /// Text outside of PHP tags.
    InlineHtml,
    /// Spaces, tabs and newlines.
    Whitespace,
    /// `//`, `#` or `/* */` comment.
    Comment,

    /// `/**`.
    DocCommentOpenTag,
    /// `*/` closing a doc comment.
    DocCommentCloseTag,
    /// Leading `*` on a doc comment line.
    DocCommentStar,
    /// Whitespace inside a doc comment.
    DocCommentWhitespace,
    /// `@tag` inside a doc comment.
    DocCommentTag,
    /// Free text inside a doc comment.
    DocCommentString,

    /// `#[`.
    AttributeStart,
    /// `]` closing an attribute.
    AttributeEnd,

    /// `$name`.
    Variable,
    /// Identifier (names, type names, constants).
    String,
    /// Quoted string literal, heredoc or nowdoc.
    ConstantEncapsedString,
    /// Integer or float literal.
    Number,

    /// `class`.
    Class,
    /// `interface`.
    Interface,
    /// `trait`.
    Trait,
    /// `enum`.
    Enum,
    /// `function`.
    Function,
    /// `fn`.
    Fn,
    /// `return`.
    Return,
    /// `public`.
    Public,
    /// `protected`.
    Protected,
    /// `private`.
    Private,
    /// `static`.
    Static,
    /// `readonly`.
    Readonly,
    /// `var`.
    Var,
    /// `abstract`.
    Abstract,
    /// `final`.
    Final,
    /// `new`.
    New,
    /// `null`.
    Null,
    /// `true`.
    True,
    /// `false`.
    False,
    /// `switch`.
    Switch,
    /// `case`.
    Case,
    /// `default`.
    Default,
    /// `break`.
    Break,
    /// `extends`.
    Extends,
    /// `implements`.
    Implements,
    /// `use`.
    Use,
    /// `namespace`.
    Namespace,
    /// `const`.
    Const,
    /// `self`.
    SelfKeyword,
    /// `parent`.
    Parent,
    /// `array`.
    Array,

    /// `(`.
    OpenParenthesis,
    /// `)`.
    CloseParenthesis,
    /// `[`.
    OpenSquareBracket,
    /// `]`.
    CloseSquareBracket,
    /// `{`.
    OpenCurlyBracket,
    /// `}`.
    CloseCurlyBracket,
    /// `;`.
    Semicolon,
    /// `,`.
    Comma,
    /// `:`.
    Colon,
    /// `::`.
    DoubleColon,
    /// `->`.
    ObjectOperator,
    /// `?->`.
    NullsafeObjectOperator,
    /// `=>`.
    DoubleArrow,
    /// `=`.
    Equal,
    /// `?` in a type declaration.
    Nullable,
    /// `?` of a ternary.
    InlineThen,
    /// `\`.
    NsSeparator,
    /// `|`.
    Pipe,
    /// `&`.
    Ampersand,
    /// `...`.
    Ellipsis,
    /// `@` error suppression.
    At,
    /// Any other operator.
    Operator,
}

impl TokenKind {
    /// Whether this kind is skipped when looking for the next meaningful token.
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::Comment
                | Self::DocCommentOpenTag
                | Self::DocCommentCloseTag
                | Self::DocCommentStar
                | Self::DocCommentWhitespace
                | Self::DocCommentTag
                | Self::DocCommentString
        )
    }

    /// Whether this kind owns a `{}` scope.
    #[must_use]
    pub fn is_scope_owner(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Trait | Self::Enum | Self::Function
        )
    }

    /// Whether this kind declares a class-like structure.
    #[must_use]
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Trait | Self::Enum
        )
    }

    /// Whether this kind is a property or method modifier.
    #[must_use]
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::Public
                | Self::Protected
                | Self::Private
                | Self::Static
                | Self::Readonly
                | Self::Var
                | Self::Abstract
                | Self::Final
        )
    }
}

/// A single token with position and pairing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Exact source text.
    pub content: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub column: usize,
    /// Byte offset of the first character.
    pub offset: usize,
    /// Matching `(` for parentheses and for `function`/`fn` owners.
    pub parenthesis_opener: Option<usize>,
    /// Matching `)` for parentheses and for `function`/`fn` owners.
    pub parenthesis_closer: Option<usize>,
    /// Matching `{` for braces and scope owners.
    pub scope_opener: Option<usize>,
    /// Matching `}` for braces and scope owners.
    pub scope_closer: Option<usize>,
    /// Matching `[` for square brackets.
    pub bracket_opener: Option<usize>,
    /// Matching `]` for square brackets.
    pub bracket_closer: Option<usize>,
    /// `#[` for every token of an attribute block.
    pub attribute_opener: Option<usize>,
    /// `]` for every token of an attribute block.
    pub attribute_closer: Option<usize>,
    /// `/**` of a doc comment (set on the close tag).
    pub comment_opener: Option<usize>,
    /// `*/` of a doc comment (set on the open tag).
    pub comment_closer: Option<usize>,
    /// Tag tokens of a doc comment (set on the open tag).
    pub comment_tags: Vec<usize>,
    /// Enclosing scope owners, outermost first.
    pub conditions: Vec<(usize, TokenKind)>,
    /// Number of enclosing parentheses.
    pub nested_parenthesis: usize,
}

impl Token {
    /// Creates a token without pairing metadata.
    #[must_use]
    pub fn new(
        kind: TokenKind,
        content: impl Into<String>,
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        Self {
            kind,
            content: content.into(),
            line,
            column,
            offset,
            parenthesis_opener: None,
            parenthesis_closer: None,
            scope_opener: None,
            scope_closer: None,
            bracket_opener: None,
            bracket_closer: None,
            attribute_opener: None,
            attribute_closer: None,
            comment_opener: None,
            comment_closer: None,
            comment_tags: Vec::new(),
            conditions: Vec::new(),
            nested_parenthesis: 0,
        }
    }

    /// Byte length of the token content.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the token has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
