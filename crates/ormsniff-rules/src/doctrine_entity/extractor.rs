//! Collects the ORM annotations attached to a class member.
//!
//! Both the doc comment owned by the member and every native attribute block
//! directly in front of it are read. Only names starting with `ORM` are kept,
//! and `ORM\JoinTable` is skipped because its nested annotation list is not
//! decomposed.

use super::attribute_parser::{self, AttributeMap, Dialect, ParseIssue};
use super::reference::AnnotationKind;
use ormsniff_core::{IgnoreSet, PhpFile, TokenKind};
use std::ops::Range;
use tracing::trace;

const ORM_PREFIX: &str = "ORM";
const ORM_NAMESPACE: &str = "ORM\\";
const SKIPPED: &str = "ORM\\JoinTable";
const DECLARATIONS: [TokenKind; 4] = [
    TokenKind::Variable,
    TokenKind::Class,
    TokenKind::Interface,
    TokenKind::Function,
];

/// One annotation occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationTag {
    /// Name as written, e.g. `ORM\Column`.
    pub name: String,
    /// Supported kind resolved from the bare name.
    pub kind: AnnotationKind,
    /// Token diagnostics are reported at: the doc tag or the `#[` opener.
    pub position: usize,
    /// Tokens covering the name and its arguments.
    pub span: Range<usize>,
    /// Syntax the arguments were written in.
    pub dialect: Dialect,
    /// Parsed arguments.
    pub attributes: AttributeMap,
    /// Diagnostics from parsing the arguments.
    pub issues: Vec<ParseIssue>,
}

impl AnnotationTag {
    fn new(name: String, position: usize, span: Range<usize>, dialect: Dialect, args: &str) -> Self {
        let parsed = attribute_parser::parse(args, dialect);
        let kind = AnnotationKind::from_name(bare_name(&name));
        trace!(tag = %name, position, attributes = parsed.attributes.len(), "extracted annotation");
        Self {
            name,
            kind,
            position,
            span,
            dialect,
            attributes: parsed.attributes,
            issues: parsed.issues,
        }
    }

    /// Name without the `ORM\` namespace.
    #[must_use]
    pub fn bare_name(&self) -> &str {
        bare_name(&self.name)
    }
}

fn bare_name(name: &str) -> &str {
    name.strip_prefix(ORM_NAMESPACE).unwrap_or(name)
}

/// Everything known about a member from its annotations.
#[derive(Debug, Clone, Default)]
pub struct MemberAnnotations {
    /// Doc comment tags first, then native attributes, each in source order.
    pub tags: Vec<AnnotationTag>,
    /// First type of the `@var` tag.
    pub var_type: Option<String>,
    /// Codes suppressed by the member's doc comment.
    pub ignore: IgnoreSet,
}

impl MemberAnnotations {
    /// Kinds of every extracted tag.
    #[must_use]
    pub fn kinds(&self) -> Vec<AnnotationKind> {
        self.tags.iter().map(|tag| tag.kind).collect()
    }

    /// Whether a tag of `kind` is present.
    #[must_use]
    pub fn has(&self, kind: AnnotationKind) -> bool {
        self.tags.iter().any(|tag| tag.kind == kind)
    }

    /// First tag of `kind`.
    #[must_use]
    pub fn first(&self, kind: AnnotationKind) -> Option<&AnnotationTag> {
        self.tags.iter().find(|tag| tag.kind == kind)
    }
}

/// Extracts the annotations of the member variable at `member`.
#[must_use]
pub fn extract(file: &PhpFile, member: usize, sniff_code: &str) -> MemberAnnotations {
    let mut annotations = MemberAnnotations::default();
    read_doc_comment(file, member, sniff_code, &mut annotations);
    annotations.tags.extend(read_native_attributes(file, member));
    annotations
}

fn is_orm(name: &str) -> bool {
    name.starts_with(ORM_PREFIX) && name != SKIPPED
}

fn owner_of(file: &PhpFile, end: usize) -> Option<usize> {
    file.find_next(&DECLARATIONS, end + 1, None, false)
}

fn read_doc_comment(file: &PhpFile, member: usize, sniff_code: &str, out: &mut MemberAnnotations) {
    let tokens = file.tokens();
    let Some(close) = member
        .checked_sub(1)
        .and_then(|p| file.find_previous(&[TokenKind::DocCommentCloseTag], p, None, false))
    else {
        return;
    };
    if owner_of(file, close) != Some(member) {
        return;
    }
    let Some(open) = tokens[close].comment_opener else {
        return;
    };

    out.ignore = IgnoreSet::parse(&file.tokens_as_string(open, close - open + 1), sniff_code);

    let mut consumed = open;
    for &tag in &tokens[open].comment_tags {
        if tag < consumed {
            continue;
        }
        let content = &tokens[tag].content;
        if content == "@var" {
            if let Some(var_type) = var_type(file, tag, close) {
                out.var_type = Some(var_type);
            }
            continue;
        }

        let (args, end) = doc_arguments(file, tag, close);
        consumed = end;
        let name = content.trim_start_matches('@');
        if is_orm(name) {
            out.tags.push(AnnotationTag::new(
                name.to_string(),
                tag,
                tag..end,
                Dialect::DocComment,
                &args,
            ));
        }
    }
}

/// Text inside the parentheses following a doc tag and the token index
/// after the closing one. Lines are joined with a single space.
fn doc_arguments(file: &PhpFile, tag: usize, close: usize) -> (String, usize) {
    let tokens = file.tokens();
    let no_arguments = (String::new(), tag + 1);
    let opens = tokens
        .get(tag + 1)
        .is_some_and(|t| t.kind == TokenKind::DocCommentString && t.content.starts_with('('));
    if !opens {
        return no_arguments;
    }

    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate().take(close).skip(tag + 1) {
        if !matches!(token.kind, TokenKind::DocCommentString | TokenKind::DocCommentTag) {
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&token.content);
        if let Some(end) = text.find(')') {
            return (text[1..end].to_string(), i + 1);
        }
    }
    no_arguments
}

fn var_type(file: &PhpFile, tag: usize, close: usize) -> Option<String> {
    let tokens = file.tokens();
    let space = tokens.get(tag + 1)?;
    let text = tokens.get(tag + 2)?;
    if tag + 2 >= close
        || space.kind != TokenKind::DocCommentWhitespace
        || space.content.contains('\n')
        || text.kind != TokenKind::DocCommentString
    {
        return None;
    }
    text.content
        .split_whitespace()
        .next()?
        .split('|')
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

fn read_native_attributes(file: &PhpFile, member: usize) -> Vec<AnnotationTag> {
    let tokens = file.tokens();
    let mut blocks = Vec::new();
    let mut start = member;
    while let Some(end) = start
        .checked_sub(1)
        .and_then(|p| file.find_previous(&[TokenKind::AttributeEnd], p, None, false))
    {
        if owner_of(file, end) != Some(member) {
            break;
        }
        let Some(opener) = tokens[end].attribute_opener else {
            break;
        };
        blocks.push((opener, end));
        start = opener;
    }
    blocks.reverse();

    blocks
        .into_iter()
        .flat_map(|(opener, end)| read_attribute_block(file, opener, end))
        .collect()
}

/// Splits `#[A(...), B]` at top-level commas.
fn read_attribute_block(file: &PhpFile, opener: usize, end: usize) -> Vec<AnnotationTag> {
    let tokens = file.tokens();
    let mut tags = Vec::new();
    let mut segment = opener + 1;
    let mut i = opener + 1;
    while i < end {
        let token = &tokens[i];
        let skip_to = match token.kind {
            TokenKind::OpenParenthesis => token.parenthesis_closer,
            TokenKind::OpenSquareBracket => token.bracket_closer,
            TokenKind::Comma => {
                tags.extend(read_attribute(file, opener, segment, i));
                segment = i + 1;
                None
            }
            _ => None,
        };
        i = skip_to.map_or(i + 1, |closer| closer + 1);
    }
    tags.extend(read_attribute(file, opener, segment, end));
    tags
}

fn read_attribute(file: &PhpFile, opener: usize, start: usize, end: usize) -> Option<AnnotationTag> {
    let tokens = file.tokens();
    let paren = file.find_next(&[TokenKind::OpenParenthesis], start, Some(end), false);
    let name: String = tokens[start..paren.unwrap_or(end)]
        .iter()
        .filter(|t| !t.kind.is_empty())
        .map(|t| t.content.as_str())
        .collect();
    if !is_orm(&name) {
        return None;
    }

    let (args, span_end) = match paren.and_then(|p| tokens[p].parenthesis_closer.map(|c| (p, c))) {
        Some((open, close)) => (file.tokens_as_string(open + 1, close - open - 1), close + 1),
        None => (String::new(), end),
    };
    Some(AnnotationTag::new(name, opener, start..span_end, Dialect::Native, &args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctrine_entity::attribute_parser::AttributeValue;

    const SNIFF: &str = "Ormsniff.Commenting.DoctrineEntity";

    fn member(file: &PhpFile, name: &str) -> usize {
        file.member_vars()
            .into_iter()
            .find(|&m| file.tokens()[m].content == name)
            .unwrap()
    }

    #[test]
    fn test_doc_comment_tags() {
        let file = PhpFile::parse(
            "Post.php",
            r#"<?php
class Post
{
    /**
     * @var int|null
     *
     * @ORM\Id
     * @ORM\Column(
     *     name="id",
     *     type="integer"
     * )
     * @ORM\JoinTable(name="x", joinColumns={@ORM\JoinColumn(name="a")})
     * @Assert\NotBlank()
     * @codingStandardsIgnoreError Ormsniff.Commenting.DoctrineEntity.ColumnGetterRequired
     */
    private $id;
}
"#,
        )
        .unwrap();
        let annotations = extract(&file, member(&file, "$id"), SNIFF);

        assert_eq!(annotations.var_type.as_deref(), Some("int"));
        let names: Vec<&str> = annotations.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ORM\\Id", "ORM\\Column"]);
        assert_eq!(annotations.kinds(), vec![AnnotationKind::Id, AnnotationKind::Column]);

        let column = &annotations.tags[1];
        assert_eq!(file.tokens()[column.position].content, "@ORM\\Column");
        assert_eq!(column.attributes.get_str("name"), Some("id"));
        assert_eq!(column.attributes.get_str("type"), Some("integer"));
        assert!(column.issues.is_empty());
        assert!(annotations.ignore.contains("ColumnGetterRequired"));
    }

    #[test]
    fn test_comment_for_other_member_is_ignored() {
        let file = PhpFile::parse(
            "Post.php",
            "<?php\nclass Post\n{\n    /** @ORM\\Id */\n    private $id;\n    private $title;\n}\n",
        )
        .unwrap();
        let annotations = extract(&file, member(&file, "$title"), SNIFF);
        assert!(annotations.tags.is_empty());
    }

    #[test]
    fn test_native_attributes_in_source_order() {
        let file = PhpFile::parse(
            "Post.php",
            r"<?php
class Post
{
    #[ORM\Id, ORM\GeneratedValue(strategy: 'AUTO')]
    #[Assert\NotNull]
    #[ORM\Column(
        type: Types::INTEGER,
        options: ['unsigned' => true]
    )]
    private int $id;
}
",
        )
        .unwrap();
        let annotations = extract(&file, member(&file, "$id"), SNIFF);

        let names: Vec<&str> = annotations.tags.iter().map(|t| t.bare_name()).collect();
        assert_eq!(names, vec!["Id", "GeneratedValue", "Column"]);
        assert_eq!(annotations.tags[0].position, annotations.tags[1].position);
        assert_eq!(file.tokens()[annotations.tags[2].position].kind, TokenKind::AttributeStart);

        let column = &annotations.tags[2];
        assert_eq!(column.attributes.get_str("type"), Some("Types::INTEGER"));
        assert_eq!(
            column.attributes.get("options"),
            Some(&AttributeValue::Raw("['unsigned' => true]".into()))
        );
        assert!(annotations.var_type.is_none());
    }
}
