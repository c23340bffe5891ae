//! Effective mapping of typed properties.
//!
//! Doctrine completes `Column` and to-one mappings from a property's native
//! type. Validation runs against the completed attributes so a member that
//! relies on the defaults is checked the same way as one that spells them out.

use super::attribute_parser::{AttributeMap, AttributeValue};
use super::naming::{camel_case, class_reference, sounds_like_class, ucfirst};
use super::reference::{mapping_type, AnnotationKind};

const TYPES_PREFIX: &str = "Types::";
const MUTABLE_SUFFIX: &str = "_mutable";
const ENUM_SEPARATOR: &str = "_enum_";

/// Returns `attributes` completed with the defaults implied by `member_type`.
///
/// The input map is left untouched, so inferring twice yields the same map.
#[must_use]
pub fn infer_defaults(kind: AnnotationKind, attributes: &AttributeMap, member_type: &str) -> AttributeMap {
    let mut completed = attributes.clone();
    let php_type = member_type.trim_start_matches(['?', '\\']);
    if php_type.is_empty() {
        return completed;
    }

    match kind {
        AnnotationKind::Column if !completed.contains("type") => {
            let column_type = match php_type {
                "DateInterval" => "dateinterval",
                "DateTime" => "datetime",
                "DateTimeImmutable" => "datetime_immutable",
                "array" => "json",
                "bool" => "boolean",
                "float" => "float",
                "int" => "integer",
                "string" => "string",
                other if sounds_like_class(other) => {
                    completed.insert("type", AttributeValue::String("string".into()));
                    completed.insert("enumType", AttributeValue::String(class_reference(other)));
                    return completed;
                }
                _ => return completed,
            };
            completed.insert("type", AttributeValue::String(column_type.into()));
        }
        kind if kind.is_to_one() && !completed.contains("targetEntity") => {
            completed.insert("targetEntity", AttributeValue::String(class_reference(php_type)));
        }
        _ => {}
    }
    completed
}

/// PHP type a column of `column_type` holds; empty when there is no
/// expectation.
///
/// `Types::` constants are resolved to their lowercase keyword. Unknown
/// lowercase types fall back to `string`, or to a class name derived from
/// an `_enum_` keyword when `dynamic_enums` is set.
#[must_use]
pub fn suggest_type(column_type: &str, dynamic_enums: bool) -> String {
    let column_type = match column_type.strip_prefix(TYPES_PREFIX) {
        Some(constant) => {
            let lower = constant.to_lowercase();
            match lower.strip_suffix(MUTABLE_SUFFIX) {
                Some(stripped) => stripped.to_string(),
                None => lower,
            }
        }
        None => column_type.to_string(),
    };

    if let Some(php_type) = mapping_type(&column_type) {
        return php_type.to_string();
    }
    if sounds_like_class(&column_type) {
        return column_type;
    }
    if dynamic_enums && column_type.contains(ENUM_SEPARATOR) {
        let joined: String = column_type.split(ENUM_SEPARATOR).map(ucfirst).collect();
        return ucfirst(&camel_case(&joined));
    }
    "string".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> AttributeMap {
        entries
            .iter()
            .map(|&(k, v)| (k, AttributeValue::String(v.into())))
            .collect()
    }

    #[test]
    fn test_column_type_from_scalar() {
        let completed = infer_defaults(AnnotationKind::Column, &map(&[]), "?int");
        assert_eq!(completed.get_str("type"), Some("integer"));

        let completed = infer_defaults(AnnotationKind::Column, &map(&[]), "\\DateTimeImmutable");
        assert_eq!(completed.get_str("type"), Some("datetime_immutable"));
    }

    #[test]
    fn test_column_enum_from_class() {
        let completed = infer_defaults(AnnotationKind::Column, &map(&[("name", "status")]), "Status");
        let keys: Vec<&str> = completed.keys().collect();
        assert_eq!(keys, vec!["name", "type", "enumType"]);
        assert_eq!(completed.get_str("enumType"), Some("Status::class"));
    }

    #[test]
    fn test_explicit_type_is_kept() {
        let attributes = map(&[("type", "text")]);
        assert_eq!(infer_defaults(AnnotationKind::Column, &attributes, "string"), attributes);
    }

    #[test]
    fn test_unknown_lowercase_type_is_left_alone() {
        let completed = infer_defaults(AnnotationKind::Column, &map(&[]), "mixed");
        assert!(completed.is_empty());
    }

    #[test]
    fn test_to_one_target_entity() {
        let completed = infer_defaults(AnnotationKind::ManyToOne, &map(&[]), "?User");
        assert_eq!(completed.get_str("targetEntity"), Some("User::class"));
        let completed = infer_defaults(AnnotationKind::OneToMany, &map(&[]), "Collection");
        assert!(completed.is_empty());
    }

    #[test]
    fn test_inference_is_idempotent() {
        for (kind, member_type) in [
            (AnnotationKind::Column, "int"),
            (AnnotationKind::Column, "Status"),
            (AnnotationKind::OneToOne, "Profile"),
        ] {
            let once = infer_defaults(kind, &map(&[]), member_type);
            let twice = infer_defaults(kind, &once, member_type);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_suggest_type() {
        assert_eq!(suggest_type("integer", false), "integer");
        assert_eq!(suggest_type("Types::DATETIME_MUTABLE", false), "DateTime");
        assert_eq!(suggest_type("Types::JSON", false), "array");
        assert_eq!(suggest_type("Status", false), "Status");
        assert_eq!(suggest_type("object", false), "");
        assert_eq!(suggest_type("varchar", false), "string");
    }

    #[test]
    fn test_suggest_dynamic_enum_type() {
        assert_eq!(suggest_type("order_item_enum_state", true), "OrderItemState");
        assert_eq!(suggest_type("order_item_enum_state", false), "string");
    }
}
