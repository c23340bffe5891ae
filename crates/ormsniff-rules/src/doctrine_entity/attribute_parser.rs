//! Parser for the argument text of an ORM annotation.
//!
//! Two dialects share one scanner:
//!
//! | dialect | delimiter | string | array |
//! |---|---|---|---|
//! | [`Dialect::DocComment`] | `name="value"` | `"..."` | `{...}` |
//! | [`Dialect::Native`] | `name: 'value'` | `'...'` | `[...]` |
//!
//! Bracketed literals end at the first closing bracket; nested brackets of
//! the same kind are not supported. Arguments without a name are stored
//! under `value`.

use std::fmt;

/// Name under which positional arguments are stored.
pub const POSITIONAL: &str = "value";

/// Annotation syntax being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `@ORM\Column(name="id")` inside a doc comment.
    DocComment,
    /// `#[ORM\Column(name: 'id')]`.
    Native,
}

impl Dialect {
    fn delimiter(self) -> u8 {
        match self {
            Self::DocComment => b'=',
            Self::Native => b':',
        }
    }

    fn quote(self) -> u8 {
        match self {
            Self::DocComment => b'"',
            Self::Native => b'\'',
        }
    }

    fn brackets(self) -> (u8, u8) {
        match self {
            Self::DocComment => (b'{', b'}'),
            Self::Native => (b'[', b']'),
        }
    }
}

/// A parsed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Quoted or bare text.
    String(String),
    /// Bare numeric text.
    Integer(i64),
    /// Bare `true`/`false`, any case.
    Boolean(bool),
    /// Bracketed literal including its brackets, not decomposed.
    Raw(String),
}

impl AttributeValue {
    /// Text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value counts as set for boolean flags such as `nullable`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::String(s) | Self::Raw(s) => !s.is_empty() && s != "0",
            Self::Integer(n) => *n != 0,
            Self::Boolean(b) => *b,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Raw(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(true) => f.write_str("1"),
            Self::Boolean(false) => Ok(()),
        }
    }
}

/// Attributes in first-occurrence order. A repeated name replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, keeping its position if already present.
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// String value of `name`.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attribute names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Kind of a parser diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseIssueKind {
    /// Unexpected space around a name or value.
    ExtraSpace,
    /// Missing space after a native `name:`.
    NeedSpace,
    /// String or array literal is not closed.
    UnexpectedEnd,
}

impl ParseIssueKind {
    /// Message code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::ExtraSpace => "ExtraSpace",
            Self::NeedSpace => "NeedSpace",
            Self::UnexpectedEnd => "UnexpectedEnd",
        }
    }
}

/// A diagnostic produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Kind of issue.
    pub kind: ParseIssueKind,
    /// Rendered message.
    pub message: String,
}

/// Parse result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    /// Attributes in source order.
    pub attributes: AttributeMap,
    /// Diagnostics in source order.
    pub issues: Vec<ParseIssue>,
}

/// Parses the text between an annotation's parentheses.
#[must_use]
pub fn parse(text: &str, dialect: Dialect) -> Parsed {
    let mut scanner = Scanner {
        dialect,
        parsed: Parsed::default(),
    };
    let mut rest = text.trim();
    while !rest.trim().is_empty() {
        rest = scanner.step(rest);
    }
    scanner.parsed
}

struct Scanner {
    dialect: Dialect,
    parsed: Parsed,
}

impl Scanner {
    fn issue(&mut self, kind: ParseIssueKind, message: String) {
        self.parsed.issues.push(ParseIssue { kind, message });
    }

    /// Parses one attribute and returns the unconsumed text.
    fn step<'t>(&mut self, rest: &'t str) -> &'t str {
        let rest = rest.trim_start_matches(',');
        if rest.trim().is_empty() {
            return "";
        }
        let bytes = rest.as_bytes();
        let (open, close) = self.dialect.brackets();

        if bytes.first() == Some(&open) {
            if let Some(end) = rest.find(char::from(close)) {
                return rest[end + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
            }
        }

        let (name, mut pos) = match self.split_name(rest) {
            Some(delimiter) => (self.attribute_name(&rest[..delimiter]), delimiter + 1),
            None => (POSITIONAL.to_string(), 0),
        };

        if pos > 0 {
            match (self.dialect, bytes.get(pos)) {
                (Dialect::DocComment, Some(b' ')) => self.issue(
                    ParseIssueKind::ExtraSpace,
                    format!("Found extra space before attribute \"{name}\" value"),
                ),
                (Dialect::Native, next) if next != Some(&b' ') => self.issue(
                    ParseIssueKind::NeedSpace,
                    format!("Need space before attribute \"{name}\" value"),
                ),
                _ => {}
            }
            while bytes.get(pos) == Some(&b' ') {
                pos += 1;
            }
        }

        let (value, end) = self.value(rest, pos);
        self.parsed.attributes.insert(name.clone(), value);

        let mut cursor = end;
        if bytes.get(cursor) == Some(&b' ') {
            self.issue(
                ParseIssueKind::ExtraSpace,
                format!("Extra space after attribute \"{name}\" value"),
            );
            while bytes.get(cursor) == Some(&b' ') {
                cursor += 1;
            }
        }
        if let Some(delimiter) = rest[cursor..].chars().next() {
            if delimiter == ',' && bytes.get(cursor + 1) == Some(&b' ') {
                cursor += 1;
            }
            cursor += delimiter.len_utf8();
        }
        &rest[cursor..]
    }

    /// Byte index of the name/value delimiter, `None` for a positional argument.
    fn split_name(&self, rest: &str) -> Option<usize> {
        let bytes = rest.as_bytes();
        let delimiter = self.dialect.delimiter();
        let index = bytes.iter().enumerate().position(|(i, &b)| {
            b == delimiter
                && (self.dialect == Dialect::DocComment
                    || (bytes.get(i + 1) != Some(&b':') && (i == 0 || bytes[i - 1] != b':')))
        })?;
        let name = rest[..index].trim();
        let is_identifier = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        is_identifier.then_some(index)
    }

    fn attribute_name(&mut self, raw: &str) -> String {
        let name = raw.trim().to_string();
        let spaced = match self.dialect {
            Dialect::DocComment => raw.contains(' '),
            Dialect::Native => raw.contains(' ') && !raw.contains('\n'),
        };
        if spaced {
            self.issue(
                ParseIssueKind::ExtraSpace,
                format!("Found extra space before attribute \"{name}\" name"),
            );
        }
        name
    }

    /// Value starting at `pos` and the index just past it.
    fn value(&mut self, rest: &str, pos: usize) -> (AttributeValue, usize) {
        let quote = self.dialect.quote();
        let (open, close) = self.dialect.brackets();

        match rest.as_bytes().get(pos) {
            Some(&b) if b == quote => match rest[pos + 1..].find(char::from(quote)) {
                Some(offset) => {
                    let end = pos + 1 + offset;
                    (AttributeValue::String(rest[pos + 1..end].to_string()), end + 1)
                }
                None => {
                    self.issue(ParseIssueKind::UnexpectedEnd, "Unexpected end of string".into());
                    (AttributeValue::String(rest[pos + 1..].to_string()), rest.len())
                }
            },
            Some(&b) if b == open => match rest[pos + 1..].find(char::from(close)) {
                Some(offset) => {
                    let end = pos + 1 + offset + 1;
                    (AttributeValue::Raw(rest[pos..end].to_string()), end)
                }
                None => {
                    self.issue(ParseIssueKind::UnexpectedEnd, "Unexpected end of array".into());
                    (AttributeValue::Raw(rest[pos..].to_string()), rest.len())
                }
            },
            _ => {
                let comma = rest[pos..].find(',').map_or(rest.len(), |offset| pos + offset);
                let text = rest[pos..comma].trim_end();
                (coerce(text), pos + text.len())
            }
        }
    }
}

/// Converts bare text: `true`/`false` to booleans, numbers to integers.
fn coerce(text: &str) -> AttributeValue {
    if text.eq_ignore_ascii_case("true") {
        AttributeValue::Boolean(true)
    } else if text.eq_ignore_ascii_case("false") {
        AttributeValue::Boolean(false)
    } else if let Some(n) = numeric(text) {
        AttributeValue::Integer(n)
    } else {
        AttributeValue::String(text.to_string())
    }
}

/// Integer value of a decimal or floating-point literal, truncated.
#[allow(clippy::cast_possible_truncation)]
fn numeric(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    let looks_numeric = text.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(parsed: &Parsed) -> Vec<&'static str> {
        parsed.issues.iter().map(|i| i.kind.code()).collect()
    }

    #[test]
    fn test_doc_comment_attributes() {
        let parsed = parse(
            r#"name="user_id", type="integer", length=255, nullable=TRUE"#,
            Dialect::DocComment,
        );
        assert!(parsed.issues.is_empty());
        let keys: Vec<&str> = parsed.attributes.keys().collect();
        assert_eq!(keys, vec!["name", "type", "length", "nullable"]);
        assert_eq!(parsed.attributes.get_str("name"), Some("user_id"));
        assert_eq!(parsed.attributes.get("length"), Some(&AttributeValue::Integer(255)));
        assert_eq!(parsed.attributes.get("nullable"), Some(&AttributeValue::Boolean(true)));
    }

    #[test]
    fn test_native_attributes() {
        let parsed = parse(
            "name: 'title', type: Types::STRING, options: ['default' => 0]",
            Dialect::Native,
        );
        assert!(parsed.issues.is_empty());
        assert_eq!(parsed.attributes.get_str("type"), Some("Types::STRING"));
        assert_eq!(
            parsed.attributes.get("options"),
            Some(&AttributeValue::Raw("['default' => 0]".into()))
        );
    }

    #[test]
    fn test_native_multiline() {
        let parsed = parse(
            "\n        targetEntity: User::class,\n        inversedBy: 'posts'\n    ",
            Dialect::Native,
        );
        assert!(parsed.issues.is_empty());
        let keys: Vec<&str> = parsed.attributes.keys().collect();
        assert_eq!(keys, vec!["targetEntity", "inversedBy"]);
        assert_eq!(parsed.attributes.get_str("targetEntity"), Some("User::class"));
    }

    #[test]
    fn test_spacing_issues() {
        let parsed = parse(r#"name = "id" , type="integer""#, Dialect::DocComment);
        assert_eq!(codes(&parsed), vec!["ExtraSpace", "ExtraSpace", "ExtraSpace"]);
        assert_eq!(
            parsed.issues[0].message,
            "Found extra space before attribute \"name\" name"
        );
        assert_eq!(
            parsed.issues[1].message,
            "Found extra space before attribute \"name\" value"
        );
        assert_eq!(
            parsed.issues[2].message,
            "Extra space after attribute \"name\" value"
        );
        assert_eq!(parsed.attributes.get_str("type"), Some("integer"));

        let parsed = parse("name:'id'", Dialect::Native);
        assert_eq!(codes(&parsed), vec!["NeedSpace"]);
        assert_eq!(parsed.issues[0].message, "Need space before attribute \"name\" value");
        assert_eq!(parsed.attributes.get_str("name"), Some("id"));
    }

    #[test]
    fn test_unterminated_literals() {
        let parsed = parse(r#"name="id"#, Dialect::DocComment);
        assert_eq!(codes(&parsed), vec!["UnexpectedEnd"]);
        assert_eq!(parsed.issues[0].message, "Unexpected end of string");
        assert_eq!(parsed.attributes.get_str("name"), Some("id"));

        let parsed = parse("options: ['a' => 1", Dialect::Native);
        assert_eq!(parsed.issues[0].message, "Unexpected end of array");
        assert_eq!(
            parsed.attributes.get("options"),
            Some(&AttributeValue::Raw("['a' => 1".into()))
        );
    }

    #[test]
    fn test_leading_literal_is_skipped() {
        let parsed = parse(r#"{"name"="ASC"}, name="x""#, Dialect::DocComment);
        let keys: Vec<&str> = parsed.attributes.keys().collect();
        assert_eq!(keys, vec!["name"]);
        assert_eq!(parsed.attributes.get_str("name"), Some("x"));
    }

    #[test]
    fn test_nested_brackets_end_at_first_close() {
        let parsed = parse(r#"options={"a"={"b"=1}}, unique=true"#, Dialect::DocComment);
        assert_eq!(
            parsed.attributes.get("options"),
            Some(&AttributeValue::Raw(r#"{"a"={"b"=1}"#.into()))
        );
        let keys: Vec<&str> = parsed.attributes.keys().collect();
        assert_eq!(keys, vec!["options", "unique"]);
        assert_eq!(codes(&parsed), vec!["ExtraSpace"]);
    }

    #[test]
    fn test_positional_argument() {
        let parsed = parse("User::class", Dialect::Native);
        assert_eq!(parsed.attributes.get_str(POSITIONAL), Some("User::class"));
        let parsed = parse(r#""users""#, Dialect::DocComment);
        assert_eq!(parsed.attributes.get_str(POSITIONAL), Some("users"));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce("10"), AttributeValue::Integer(10));
        assert_eq!(coerce("-3"), AttributeValue::Integer(-3));
        assert_eq!(coerce("1.9"), AttributeValue::Integer(1));
        assert_eq!(coerce("1e3"), AttributeValue::Integer(1000));
        assert_eq!(coerce("inf"), AttributeValue::String("inf".into()));
        assert_eq!(coerce("False"), AttributeValue::Boolean(false));
    }

    #[test]
    fn test_parser_terminates_on_garbage() {
        for text in [",,,", "=", ":", "a=", "a=\"", "{", "[", "a b c", "é=ü,ß", "  ,  "] {
            let _ = parse(text, Dialect::DocComment);
            let _ = parse(text, Dialect::Native);
        }
    }

    #[test]
    fn test_duplicate_keeps_first_position() {
        let parsed = parse("a=1, b=2, a=3", Dialect::DocComment);
        let entries: Vec<(&str, String)> = parsed
            .attributes
            .iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        assert_eq!(entries, vec![("a", "3".to_string()), ("b", "2".to_string())]);
    }
}
