//! Static grammar of the supported ORM annotations.
//!
//! Each [`AnnotationKind`] has one [`ReferenceRule`] naming its required
//! attributes, the expected type of every known attribute and the sibling
//! annotations it cannot appear without. The tables are `const` data and are
//! never mutated.

use std::fmt;

/// Supported ORM annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// `Column`
    Column,
    /// `Cache`
    Cache,
    /// `GeneratedValue`
    GeneratedValue,
    /// `Id`
    Id,
    /// `JoinColumn`
    JoinColumn,
    /// `JoinTable`
    JoinTable,
    /// `ManyToOne`
    ManyToOne,
    /// `ManyToMany`
    ManyToMany,
    /// `OneToOne`
    OneToOne,
    /// `OneToMany`
    OneToMany,
    /// `OrderBy`
    OrderBy,
    /// `SequenceGenerator`
    SequenceGenerator,
    /// Any other name; not validated.
    Unknown,
}

impl AnnotationKind {
    /// Every supported kind, in reference-table order.
    pub const ALL: [Self; 12] = [
        Self::Column,
        Self::Cache,
        Self::GeneratedValue,
        Self::Id,
        Self::JoinColumn,
        Self::JoinTable,
        Self::ManyToOne,
        Self::ManyToMany,
        Self::OneToOne,
        Self::OneToMany,
        Self::OrderBy,
        Self::SequenceGenerator,
    ];

    /// Resolves a bare annotation name (without the `ORM\` prefix).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or(Self::Unknown)
    }

    /// Annotation name as written in source.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Column => "Column",
            Self::Cache => "Cache",
            Self::GeneratedValue => "GeneratedValue",
            Self::Id => "Id",
            Self::JoinColumn => "JoinColumn",
            Self::JoinTable => "JoinTable",
            Self::ManyToOne => "ManyToOne",
            Self::ManyToMany => "ManyToMany",
            Self::OneToOne => "OneToOne",
            Self::OneToMany => "OneToMany",
            Self::OrderBy => "OrderBy",
            Self::SequenceGenerator => "SequenceGenerator",
            Self::Unknown => "",
        }
    }

    /// Whether this is a single-valued association.
    #[must_use]
    pub fn is_to_one(self) -> bool {
        matches!(self, Self::ManyToOne | Self::OneToOne)
    }

    /// Whether this is a collection-valued association.
    #[must_use]
    pub fn is_to_many(self) -> bool {
        matches!(self, Self::ManyToMany | Self::OneToMany)
    }

    /// Reference rule for this kind, `None` for [`AnnotationKind::Unknown`].
    #[must_use]
    pub fn rule(self) -> Option<&'static ReferenceRule> {
        let rule = match self {
            Self::Column => &COLUMN,
            Self::Cache => &CACHE,
            Self::GeneratedValue => &GENERATED_VALUE,
            Self::Id => &ID,
            Self::JoinColumn => &JOIN_COLUMN,
            Self::JoinTable => &JOIN_TABLE,
            Self::ManyToOne => &MANY_TO_ONE,
            Self::ManyToMany => &MANY_TO_MANY,
            Self::OneToOne => &ONE_TO_ONE,
            Self::OneToMany => &ONE_TO_MANY,
            Self::OrderBy => &ORDER_BY,
            Self::SequenceGenerator => &SEQUENCE_GENERATOR,
            Self::Unknown => return None,
        };
        Some(rule)
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    /// Non-empty string.
    String,
    /// Integer.
    Integer,
    /// Boolean.
    Boolean,
    /// `{...}` or `[...]` literal.
    Array,
    /// `Foo::class` or a fully qualified class name.
    Class,
    /// One of the listed literals.
    OneOf(&'static [&'static str]),
    /// A type name the validator does not know how to check.
    Custom(&'static str),
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
            Self::Array => f.write_str("array"),
            Self::Class => f.write_str("class"),
            Self::Custom(name) => f.write_str(name),
            Self::OneOf(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{value}\"")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A sibling annotation that must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Exactly this annotation.
    One(AnnotationKind),
    /// Any of these annotations.
    AnyOf(&'static [AnnotationKind]),
}

impl Requirement {
    /// Whether `present` satisfies the requirement.
    #[must_use]
    pub fn is_met_by(&self, present: &[AnnotationKind]) -> bool {
        match self {
            Self::One(kind) => present.contains(kind),
            Self::AnyOf(kinds) => kinds.iter().any(|kind| present.contains(kind)),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(kind) => f.write_str(kind.name()),
            Self::AnyOf(kinds) => {
                let names: Vec<&str> = kinds.iter().map(|kind| kind.name()).collect();
                f.write_str(&names.join(" or "))
            }
        }
    }
}

/// Grammar of one annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRule {
    /// Attributes that must be given.
    pub required: &'static [&'static str],
    /// Known attributes with their types, `None` when attributes are not checked.
    pub attributes: Option<&'static [(&'static str, TypeSpec)]>,
    /// Sibling annotations that must be present.
    pub requires: &'static [Requirement],
}

impl ReferenceRule {
    /// Expected type of `attribute`, if known.
    #[must_use]
    pub fn attribute_type(&self, attribute: &str) -> Option<TypeSpec> {
        self.attributes?
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|&(_, spec)| spec)
    }
}

const FETCH: &[&str] = &["LAZY", "EAGER"];
const FETCH_EXTRA_LAZY: &[&str] = &["LAZY", "EXTRA_LAZY", "EAGER"];
const TO_ONE: &[AnnotationKind] = &[AnnotationKind::ManyToOne, AnnotationKind::OneToOne];
const TO_MANY: &[AnnotationKind] = &[AnnotationKind::OneToMany, AnnotationKind::ManyToMany];
const TO_MANY_ORDERED: &[AnnotationKind] = &[AnnotationKind::ManyToMany, AnnotationKind::OneToMany];

const COLUMN: ReferenceRule = ReferenceRule {
    required: &["type"],
    attributes: Some(&[
        ("name", TypeSpec::String),
        ("type", TypeSpec::String),
        ("length", TypeSpec::Integer),
        ("precision", TypeSpec::Integer),
        ("scale", TypeSpec::Integer),
        ("unique", TypeSpec::Boolean),
        ("nullable", TypeSpec::Boolean),
        ("enumType", TypeSpec::Class),
        ("options", TypeSpec::Array),
        ("columnDefinition", TypeSpec::String),
    ]),
    requires: &[],
};

const CACHE: ReferenceRule = ReferenceRule {
    required: &[],
    attributes: Some(&[
        (
            "usage",
            TypeSpec::OneOf(&["READ_ONLY", "READ_WRITE", "NONSTRICT_READ_WRITE"]),
        ),
        ("region", TypeSpec::String),
    ]),
    requires: &[],
};

const GENERATED_VALUE: ReferenceRule = ReferenceRule {
    required: &[],
    attributes: Some(&[(
        "strategy",
        TypeSpec::OneOf(&["AUTO", "SEQUENCE", "TABLE", "IDENTITY", "UUID", "CUSTOM", "NONE"]),
    )]),
    requires: &[Requirement::One(AnnotationKind::Id)],
};

const ID: ReferenceRule = ReferenceRule {
    required: &[],
    attributes: None,
    requires: &[],
};

const JOIN_COLUMN: ReferenceRule = ReferenceRule {
    required: &[],
    attributes: Some(&[
        ("name", TypeSpec::String),
        ("referencedColumnName", TypeSpec::String),
        ("unique", TypeSpec::Boolean),
        ("nullable", TypeSpec::Boolean),
        ("onDelete", TypeSpec::OneOf(&["SET NULL", "CASCADE"])),
        ("columnDefinition", TypeSpec::String),
    ]),
    requires: &[Requirement::AnyOf(TO_ONE)],
};

const JOIN_TABLE: ReferenceRule = ReferenceRule {
    required: &[],
    attributes: Some(&[
        ("name", TypeSpec::String),
        ("joinColumns", TypeSpec::Array),
        ("inverseJoinColumns", TypeSpec::Array),
    ]),
    requires: &[Requirement::AnyOf(TO_MANY)],
};

const MANY_TO_ONE: ReferenceRule = ReferenceRule {
    required: &["targetEntity"],
    attributes: Some(&[
        ("targetEntity", TypeSpec::Class),
        ("cascade", TypeSpec::String),
        ("fetch", TypeSpec::OneOf(FETCH)),
        ("inversedBy", TypeSpec::String),
    ]),
    requires: &[],
};

const MANY_TO_MANY: ReferenceRule = ReferenceRule {
    required: &["targetEntity"],
    attributes: Some(&[
        ("targetEntity", TypeSpec::Class),
        ("mappedBy", TypeSpec::String),
        ("inversedBy", TypeSpec::String),
        ("cascade", TypeSpec::String),
        ("fetch", TypeSpec::OneOf(FETCH_EXTRA_LAZY)),
        ("indexBy", TypeSpec::String),
    ]),
    requires: &[],
};

const ONE_TO_ONE: ReferenceRule = ReferenceRule {
    required: &["targetEntity"],
    attributes: Some(&[
        ("targetEntity", TypeSpec::Class),
        ("cascade", TypeSpec::String),
        ("fetch", TypeSpec::OneOf(FETCH)),
        ("orphanRemoval", TypeSpec::Boolean),
        ("mappedBy", TypeSpec::String),
        ("inversedBy", TypeSpec::String),
    ]),
    requires: &[],
};

const ONE_TO_MANY: ReferenceRule = ReferenceRule {
    required: &["targetEntity"],
    attributes: Some(&[
        ("targetEntity", TypeSpec::Class),
        ("cascade", TypeSpec::String),
        ("orphanRemoval", TypeSpec::Boolean),
        ("mappedBy", TypeSpec::String),
        ("fetch", TypeSpec::OneOf(FETCH_EXTRA_LAZY)),
        ("indexBy", TypeSpec::String),
    ]),
    requires: &[],
};

const ORDER_BY: ReferenceRule = ReferenceRule {
    required: &[],
    attributes: None,
    requires: &[Requirement::AnyOf(TO_MANY_ORDERED)],
};

const SEQUENCE_GENERATOR: ReferenceRule = ReferenceRule {
    required: &["sequenceName"],
    attributes: Some(&[
        ("sequenceName", TypeSpec::String),
        ("allocationSize", TypeSpec::Integer),
        ("initialValue", TypeSpec::Integer),
    ]),
    requires: &[Requirement::One(AnnotationKind::GeneratedValue)],
};

/// PHP type expected for an ORM column type.
///
/// `Some("")` means the column type carries no expectation.
#[must_use]
pub fn mapping_type(column_type: &str) -> Option<&'static str> {
    let php_type = match column_type {
        "string" | "text" | "guid" => "string",
        "integer" | "smallint" | "tinyint" | "bigint" => "integer",
        "boolean" => "boolean",
        "decimal" | "float" => "float",
        "date" | "time" | "datetime" | "datetimetz" => "DateTime",
        "date_immutable" | "time_immutable" | "datetime_immutable" | "datetimetz_immutable" => {
            "DateTimeImmutable"
        }
        "dateinterval" => "DateInterval",
        "array" | "simple_array" | "json_array" | "json" => "array",
        "object" => "",
        _ => return None,
    };
    Some(php_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trip() {
        for kind in AnnotationKind::ALL {
            assert_eq!(AnnotationKind::from_name(kind.name()), kind);
            assert!(kind.rule().is_some());
        }
        assert_eq!(AnnotationKind::from_name("Entity"), AnnotationKind::Unknown);
        assert!(AnnotationKind::Unknown.rule().is_none());
    }

    #[test]
    fn test_requirement_display() {
        assert_eq!(Requirement::One(AnnotationKind::Id).to_string(), "Id");
        assert_eq!(
            Requirement::AnyOf(TO_ONE).to_string(),
            "ManyToOne or OneToOne"
        );
    }

    #[test]
    fn test_requirement_is_met() {
        let present = [AnnotationKind::ManyToOne, AnnotationKind::JoinColumn];
        assert!(Requirement::AnyOf(TO_ONE).is_met_by(&present));
        assert!(!Requirement::One(AnnotationKind::Id).is_met_by(&present));
    }

    #[test]
    fn test_one_of_display() {
        assert_eq!(
            TypeSpec::OneOf(FETCH).to_string(),
            "[\"LAZY\", \"EAGER\"]"
        );
    }

    #[test]
    fn test_column_rule() {
        let rule = AnnotationKind::Column.rule().unwrap();
        assert_eq!(rule.required, &["type"]);
        assert_eq!(rule.attribute_type("length"), Some(TypeSpec::Integer));
        assert_eq!(rule.attribute_type("enumType"), Some(TypeSpec::Class));
        assert_eq!(rule.attribute_type("bogus"), None);
    }

    #[test]
    fn test_mapping_type() {
        assert_eq!(mapping_type("decimal"), Some("float"));
        assert_eq!(mapping_type("datetime"), Some("DateTime"));
        assert_eq!(mapping_type("datetime_immutable"), Some("DateTimeImmutable"));
        assert_eq!(mapping_type("object"), Some(""));
        assert_eq!(mapping_type("varchar"), None);
    }
}
