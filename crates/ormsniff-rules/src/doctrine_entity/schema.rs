//! Checks an annotation's attributes against its [`ReferenceRule`].
//!
//! [`ReferenceRule`]: super::reference::ReferenceRule

use super::attribute_parser::{AttributeMap, AttributeValue};
use super::naming::{is_class_reference, sounds_like_class};
use super::reference::{AnnotationKind, TypeSpec};

const SELF_CLASS: &str = "self::class";

/// A schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Message code.
    pub code: &'static str,
    /// Rendered message.
    pub message: String,
}

impl SchemaIssue {
    fn new(code: &'static str, message: String) -> Self {
        Self { code, message }
    }
}

/// Outcome of checking one value against a [`TypeSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCheck {
    /// Value matches.
    Valid,
    /// Value does not match.
    Invalid,
    /// The declared `TypeSpec` names a type that cannot be checked.
    UnknownType,
}

/// Validates `attributes` of an annotation of `kind`.
///
/// `present` lists every annotation kind on the same member. Checks run in
/// this order: sibling requirements, required attributes, unknown attributes,
/// then attribute types in reference-table order.
#[must_use]
pub fn validate(
    kind: AnnotationKind,
    attributes: &AttributeMap,
    present: &[AnnotationKind],
) -> Vec<SchemaIssue> {
    let Some(rule) = kind.rule() else {
        return Vec::new();
    };
    let name = kind.name();
    let mut issues = Vec::new();

    for requirement in rule.requires {
        if !requirement.is_met_by(present) {
            issues.push(SchemaIssue::new(
                "AnnotationRequired",
                format!("Annotation {name} requires {requirement} which is not found"),
            ));
        }
    }

    let Some(specs) = rule.attributes else {
        return issues;
    };

    let missing: Vec<&str> = rule
        .required
        .iter()
        .copied()
        .filter(|attr| !attributes.contains(attr))
        .collect();
    if !missing.is_empty() {
        issues.push(SchemaIssue::new(
            "AttributeRequired",
            format!(
                "Annotation {name} must have the following attributes: {}",
                missing.join(", ")
            ),
        ));
    }

    let unknown: Vec<&str> = attributes
        .keys()
        .filter(|key| rule.attribute_type(key).is_none())
        .collect();
    if !unknown.is_empty() {
        issues.push(SchemaIssue::new(
            "AttributeUnknown",
            format!("Annotation {name} has unknown attributes: {}", unknown.join(", ")),
        ));
    }

    for &(attr, spec) in specs {
        let Some(value) = attributes.get(attr) else {
            continue;
        };
        match check_type(spec, value) {
            TypeCheck::Valid => {}
            TypeCheck::Invalid => issues.push(SchemaIssue::new(
                "AttributeInvalidType",
                format!("Annotation {name} has attribute {attr} with invalid type; expected {spec}"),
            )),
            TypeCheck::UnknownType => issues.push(SchemaIssue::new(
                "AttributeUnknownType",
                format!("Annotation {name} has attribute {attr} with unknown type {spec}"),
            )),
        }
    }

    issues
}

/// Checks `value` against `spec`.
#[must_use]
pub fn check_type(spec: TypeSpec, value: &AttributeValue) -> TypeCheck {
    let valid = match (spec, value) {
        (TypeSpec::Custom(_), _) => return TypeCheck::UnknownType,
        (TypeSpec::String, AttributeValue::String(s) | AttributeValue::Raw(s)) => {
            !s.is_empty() && s != "0"
        }
        (TypeSpec::Integer, AttributeValue::Integer(_))
        | (TypeSpec::Boolean, AttributeValue::Boolean(_)) => true,
        (TypeSpec::OneOf(allowed), AttributeValue::String(s) | AttributeValue::Raw(s)) => {
            allowed.contains(&s.as_str())
        }
        (TypeSpec::Array, value) => value.to_string().starts_with(['{', '[']),
        (TypeSpec::Class, value) => {
            let text = value.to_string();
            (sounds_like_class(&text) || text == SELF_CLASS)
                && (text.contains('\\') || is_class_reference(&text))
        }
        _ => false,
    };
    if valid {
        TypeCheck::Valid
    } else {
        TypeCheck::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctrine_entity::attribute_parser::{parse, Dialect};

    fn attrs(text: &str) -> AttributeMap {
        parse(text, Dialect::DocComment).attributes
    }

    fn messages(issues: &[SchemaIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_valid_column() {
        let issues = validate(
            AnnotationKind::Column,
            &attrs(r#"name="title", type="string", length=255, nullable=true"#),
            &[AnnotationKind::Column],
        );
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn test_required_and_unknown() {
        let issues = validate(
            AnnotationKind::Column,
            &attrs(r#"name="title", size=10, color="red""#),
            &[AnnotationKind::Column],
        );
        assert_eq!(
            messages(&issues),
            vec![
                "Annotation Column must have the following attributes: type",
                "Annotation Column has unknown attributes: size, color",
            ]
        );
    }

    #[test]
    fn test_requirements() {
        let issues = validate(AnnotationKind::JoinColumn, &attrs(r#"name="a_id""#), &[]);
        assert_eq!(issues[0].code, "AnnotationRequired");
        assert_eq!(
            issues[0].message,
            "Annotation JoinColumn requires ManyToOne or OneToOne which is not found"
        );

        let issues = validate(AnnotationKind::GeneratedValue, &attrs(""), &[AnnotationKind::Id]);
        assert!(issues.is_empty());

        let issues = validate(AnnotationKind::OrderBy, &attrs(r#"{"name"="ASC"}"#), &[]);
        assert_eq!(
            messages(&issues),
            vec!["Annotation OrderBy requires ManyToMany or OneToMany which is not found"]
        );
    }

    #[test]
    fn test_invalid_types() {
        let issues = validate(
            AnnotationKind::Column,
            &attrs(r#"type="string", length="255", unique=1, options="x", nullable=false"#),
            &[],
        );
        assert_eq!(
            messages(&issues),
            vec![
                "Annotation Column has attribute length with invalid type; expected integer",
                "Annotation Column has attribute unique with invalid type; expected boolean",
                "Annotation Column has attribute options with invalid type; expected array",
            ]
        );

        let issues = validate(
            AnnotationKind::ManyToOne,
            &attrs(r#"targetEntity="user", fetch="SOMETIMES""#),
            &[],
        );
        assert_eq!(
            messages(&issues),
            vec![
                "Annotation ManyToOne has attribute targetEntity with invalid type; expected class",
                "Annotation ManyToOne has attribute fetch with invalid type; expected [\"LAZY\", \"EAGER\"]",
            ]
        );
    }

    #[test]
    fn test_class_values() {
        let check = |text: &str| check_type(TypeSpec::Class, &AttributeValue::String(text.into()));
        assert_eq!(check("App\\Entity\\User"), TypeCheck::Valid);
        assert_eq!(check("User::class"), TypeCheck::Valid);
        assert_eq!(check("self::class"), TypeCheck::Valid);
        assert_eq!(check("User"), TypeCheck::Invalid);
        assert_eq!(check("::class"), TypeCheck::Invalid);
    }

    #[test]
    fn test_custom_type_is_reported_once() {
        let value = AttributeValue::String("x".into());
        assert_eq!(check_type(TypeSpec::Custom("uuid"), &value), TypeCheck::UnknownType);
    }

    #[test]
    fn test_unknown_kind_is_not_validated() {
        assert!(validate(AnnotationKind::Unknown, &attrs("anything=1"), &[]).is_empty());
    }
}
