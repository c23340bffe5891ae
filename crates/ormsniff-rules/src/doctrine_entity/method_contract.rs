//! Accessor contracts implied by a mapping.
//!
//! A [`MethodContract`] names the method a mapping requires and what its
//! return type and first argument must look like. The checks compare native
//! declarations and doc-comment tags with [`is_same_type`].

use super::handlers::MemberCheck;
use super::naming::{lcfirst, ucfirst};
use super::reference::AnnotationKind;
use super::types::is_same_type;
use ormsniff_core::{PhpFile, TokenKind};

const DECLARATIONS: [TokenKind; 4] = [
    TokenKind::Variable,
    TokenKind::Class,
    TokenKind::Interface,
    TokenKind::Function,
];

/// What a method is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodRole {
    /// `getFoo()` / `isFoo()`
    Getter,
    /// `setFoo($foo)`
    Setter,
    /// `addFoo($foo)`
    Adder,
    /// `removeFoo($foo)`
    Remover,
}

impl MethodRole {
    /// Lowercase role name used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Getter => "getter",
            Self::Setter => "setter",
            Self::Adder => "adder",
            Self::Remover => "remover",
        }
    }
}

/// Expected return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnExpectation {
    /// Returns the entity itself: `<Class>|self|static`.
    Fluent,
    /// Returns this type.
    Type(String),
}

/// Expected first argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentExpectation {
    /// Name without `$`.
    pub name: String,
    /// Expected type, `None` when only the name is checked.
    pub type_name: Option<String>,
    /// Whether the argument must accept `null`.
    pub nullable: bool,
}

/// A method the mapping requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodContract {
    /// Annotation that implies the method.
    pub owner: AnnotationKind,
    /// Role of the method.
    pub role: MethodRole,
    /// Expected method name.
    pub name: String,
    /// Whether a missing method is reported.
    pub required: bool,
    /// Expected return type, if checked.
    pub returns: Option<ReturnExpectation>,
    /// Expected first argument, if checked.
    pub argument: Option<ArgumentExpectation>,
}

impl MethodContract {
    /// Contract with no return or argument expectations.
    #[must_use]
    pub fn new(owner: AnnotationKind, role: MethodRole, name: String) -> Self {
        Self {
            owner,
            role,
            name,
            required: true,
            returns: None,
            argument: None,
        }
    }

    /// Sets whether the method must exist.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Expects a return type.
    #[must_use]
    pub fn returns(mut self, returns: ReturnExpectation) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Expects a first argument.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, type_name: Option<String>, nullable: bool) -> Self {
        self.argument = Some(ArgumentExpectation {
            name: name.into(),
            type_name,
            nullable,
        });
        self
    }

    fn code(&self, suffix: &str) -> String {
        format!("{}{}{suffix}", self.owner.name(), ucfirst(self.role.as_str()))
    }
}

impl MemberCheck<'_, '_> {
    /// Checks that the method described by `contract` exists and matches it.
    pub(super) fn validate_method(&mut self, contract: &MethodContract) {
        let file = self.file;
        let owner = contract.owner.name();
        let role = contract.role.as_str();
        let mut name = contract.name.clone();

        let mut method = self.cache.find_method(file, &name);
        if method.is_none() {
            if let Some(alternative) = boolean_getter_name(&name) {
                method = self.cache.find_method(file, &alternative);
                if method.is_some() {
                    name = alternative;
                }
            }
        }

        let Some(method) = method else {
            if contract.required {
                self.report(
                    format!("{owner} must have {role} method named \"{name}\""),
                    self.tag_start,
                    &contract.code("Required"),
                );
            }
            return;
        };

        let doc_comment = method_doc_comment(file, method);

        if let Some(returns) = &contract.returns {
            let expected = match returns {
                ReturnExpectation::Fluent => {
                    format!("{}|self|static", self.cache.class_name(file, method))
                }
                ReturnExpectation::Type(type_name) => type_name.clone(),
            };
            let properties = file.method_properties(method);
            let declared = properties.return_type.trim_start_matches('?');

            if declared.is_empty() && properties.has_body && !has_return_statement(file, method) {
                self.report(
                    format!("{owner} {role} \"{name}\" must have return statement which returns {expected}"),
                    method,
                    &contract.code("ReturnRequired"),
                );
            }

            if let Some(comment) = &doc_comment {
                let documented = doc_return_type(comment)
                    .is_some_and(|t| is_same_type(&expected, t.trim_start_matches('?')));
                if !documented {
                    self.report(
                        format!("{owner} {role} \"{name}\" must have return type \"{expected}\" in doc-comment"),
                        method,
                        &contract.code("ReturnDocType"),
                    );
                }
            }

            if !declared.is_empty() && !is_same_type(&expected, declared) {
                self.report(
                    format!("{owner} {role} \"{name}\" must have return type \"{expected}\""),
                    method,
                    &contract.code("ReturnType"),
                );
            }
        }

        if let Some(argument) = &contract.argument {
            self.validate_argument(contract, argument, method, &name, doc_comment.as_deref());
        }
    }

    fn validate_argument(
        &mut self,
        contract: &MethodContract,
        argument: &ArgumentExpectation,
        method: usize,
        name: &str,
        doc_comment: Option<&str>,
    ) {
        let owner = contract.owner.name();
        let role = contract.role.as_str();
        let parameters = self.file.method_parameters(method);
        let Some(parameter) = parameters.first() else {
            self.report(
                format!("{owner} {role} \"{name}\" must have at least one argument"),
                method,
                &contract.code("ArgumentRequired"),
            );
            return;
        };

        if parameter.name.trim_start_matches('$') != argument.name {
            self.report(
                format!("{owner} {role} \"{name}\" argument must have name \"{}\"", argument.name),
                method,
                &contract.code("ArgumentName"),
            );
        }

        let hint = parameter.type_hint.trim_start_matches('?');
        if !parameter.type_hint.is_empty() {
            if let Some(expected) = &argument.type_name {
                if !is_same_type(expected, hint) && !self.sniff.is_mapped_to_base_type(expected, hint) {
                    self.report(
                        format!(
                            "{owner} {role} \"{name}\" argument must have typehint \"{expected}\", instead of typehint \"{hint}\""
                        ),
                        method,
                        &contract.code("ArgumentType"),
                    );
                }
            }

            let nullable = parameter.nullable_type
                || hint.split('|').any(|t| t.eq_ignore_ascii_case("null"))
                || parameter
                    .default
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case("null"));
            if !nullable && argument.nullable {
                self.report(
                    format!("{owner} {role} \"{name}\" argument must be nullable"),
                    method,
                    &contract.code("ArgumentNullable"),
                );
            } else if nullable && !argument.nullable {
                self.report(
                    format!("{owner} {role} \"{name}\" argument must be not-nullable"),
                    method,
                    &contract.code("ArgumentNotNullable"),
                );
            }
        }

        if let (Some(expected), Some(comment)) = (&argument.type_name, doc_comment) {
            let documented = doc_param_type(comment).is_some_and(|documented| {
                is_same_type(expected, documented.trim_start_matches('?'))
                    || self.sniff.is_mapped_to_base_type(expected, hint)
            });
            if !documented {
                self.report(
                    format!(
                        "{owner} {role} \"{name}\" must have param \"{}\" with type \"{expected}\" in doc-comment",
                        argument.name
                    ),
                    method,
                    &contract.code("ArgumentDocType"),
                );
            }
        }
    }
}

/// `getActive` to `isActive`; `getIsActive` to `isActive`.
fn boolean_getter_name(getter: &str) -> Option<String> {
    let short = lcfirst(getter.strip_prefix("get")?);
    if short.starts_with("is") {
        Some(short)
    } else {
        Some(format!("is{}", ucfirst(&short)))
    }
}

fn has_return_statement(file: &PhpFile, method: usize) -> bool {
    let token = &file.tokens()[method];
    match (token.scope_opener, token.scope_closer) {
        (Some(open), Some(close)) => file
            .find_previous(&[TokenKind::Return], close, Some(open), false)
            .is_some(),
        _ => false,
    }
}

/// Text of the doc comment owned by the function at `method`.
fn method_doc_comment(file: &PhpFile, method: usize) -> Option<String> {
    let close = file.find_previous(&[TokenKind::DocCommentCloseTag], method.checked_sub(1)?, None, false)?;
    if file.find_next(&DECLARATIONS, close + 1, None, false) != Some(method) {
        return None;
    }
    let open = file.tokens()[close].comment_opener?;
    Some(file.tokens_as_string(open + 1, close - open))
}

/// Type following the first `@return` tag. A generic argument list is kept
/// through the last `>` on the line: `Collection<int, Post>`.
pub(super) fn doc_return_type(comment: &str) -> Option<String> {
    tag_values(comment, "@return").find_map(|body| {
        let end = body
            .find(|c: char| c.is_whitespace() || c == '<')
            .unwrap_or(body.len());
        if end == 0 {
            return None;
        }
        let mut type_name = body[..end].to_string();
        let rest = &body[end..];
        if rest.starts_with('<') {
            let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
            if let Some(close) = line.rfind('>') {
                type_name.push_str(&line[..=close]);
            }
        }
        Some(type_name)
    })
}

/// Type following the first `@param` tag.
pub(super) fn doc_param_type(comment: &str) -> Option<String> {
    tag_values(comment, "@param")
        .find_map(|body| body.split_whitespace().next().map(str::to_string))
}

/// Text after each occurrence of `tag` that is followed by whitespace, with
/// that whitespace removed.
fn tag_values<'c>(comment: &'c str, tag: &'c str) -> impl Iterator<Item = &'c str> {
    comment.match_indices(tag).filter_map(move |(at, _)| {
        let after = &comment[at + tag.len()..];
        let body = after.trim_start();
        (body.len() < after.len()).then_some(body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_return_type() {
        assert_eq!(doc_return_type(" * @return int\n").as_deref(), Some("int"));
        assert_eq!(
            doc_return_type(" * @return Collection<int, Comment> the comments\n").as_deref(),
            Some("Collection<int, Comment>")
        );
        assert_eq!(
            doc_return_type(" * @return  static|null\n").as_deref(),
            Some("static|null")
        );
        assert_eq!(doc_return_type(" * @returns int\n"), None);
        assert_eq!(doc_return_type(" * @param int $x\n"), None);
    }

    #[test]
    fn test_doc_param_type() {
        assert_eq!(doc_param_type(" * @param ?int $id\n").as_deref(), Some("?int"));
        assert_eq!(doc_param_type(" * @return self\n"), None);
    }

    #[test]
    fn test_boolean_getter_name() {
        assert_eq!(boolean_getter_name("getActive").as_deref(), Some("isActive"));
        assert_eq!(boolean_getter_name("getIsActive").as_deref(), Some("isActive"));
        assert_eq!(boolean_getter_name("setActive"), None);
    }

    #[test]
    fn test_contract_codes() {
        let contract = MethodContract::new(AnnotationKind::ManyToOne, MethodRole::Setter, "setAuthor".into());
        assert_eq!(contract.code("ArgumentNullable"), "ManyToOneSetterArgumentNullable");
        assert!(contract.required);
        assert!(!contract.clone().required(false).required);
    }

    #[test]
    fn test_method_doc_comment_ownership() {
        let file = PhpFile::parse(
            "Post.php",
            "<?php\nclass Post\n{\n    /** @var int */\n    private $id;\n\n    public function getId() {}\n\n    /**\n     * @return int\n     */\n    public function getCount() {}\n}\n",
        )
        .unwrap();
        let functions: Vec<usize> = file
            .tokens()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::Function)
            .map(|(i, _)| i)
            .collect();
        assert!(method_doc_comment(&file, functions[0]).is_none());
        let comment = method_doc_comment(&file, functions[1]).unwrap();
        assert_eq!(doc_return_type(&comment).as_deref(), Some("int"));
    }
}
