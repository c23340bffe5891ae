//! Type equivalence between expected and declared PHP types.

/// Canonical spelling of a scalar type name.
#[must_use]
pub fn long_type(short: &str) -> &str {
    match short {
        "bool" => "boolean",
        "int" => "integer",
        other => other,
    }
}

/// Whether `actual` satisfies `expected`.
///
/// Both sides are unions split on `|`. They match when they share a member
/// after scalar aliasing. `array` is also satisfied by any `T[]` member, and
/// `DateTime` by `DateTimeInterface` or `DateTimeImmutable`.
#[must_use]
pub fn is_same_type(expected: &str, actual: &str) -> bool {
    let expected = expected.trim_start_matches('\\');
    let actual = actual.trim_start_matches('\\');

    if expected == actual || (expected == "array" && has_array_shape(actual)) {
        return true;
    }

    let expected = if expected == "DateTime" {
        "DateTime|DateTimeInterface|DateTimeImmutable"
    } else {
        expected
    };

    let expected: Vec<&str> = expected.split('|').map(long_type).collect();
    actual
        .split('|')
        .map(long_type)
        .any(|member| expected.contains(&member))
}

fn has_array_shape(actual: &str) -> bool {
    actual
        .match_indices("[]")
        .any(|(i, _)| matches!(actual.as_bytes().get(i + 2), None | Some(b'|')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_aliases() {
        assert!(is_same_type("integer", "int"));
        assert!(is_same_type("boolean", "bool"));
        assert!(is_same_type("int", "integer|null"));
        assert!(!is_same_type("integer", "string"));
    }

    #[test]
    fn test_namespace_and_unions() {
        assert!(is_same_type("\\App\\User", "App\\User"));
        assert!(is_same_type("Post|self|static", "static"));
        assert!(!is_same_type("Post|self|static", "$this"));
    }

    #[test]
    fn test_array_shape() {
        assert!(is_same_type("array", "string[]"));
        assert!(is_same_type("array", "int[]|null"));
        assert!(!is_same_type("array", "string[]x"));
    }

    #[test]
    fn test_datetime_family() {
        assert!(is_same_type("DateTime", "DateTimeInterface"));
        assert!(is_same_type("DateTime", "\\DateTimeImmutable"));
        assert!(!is_same_type("DateTimeImmutable", "DateTime"));
    }

    #[test]
    fn test_collection_getter_union() {
        let expected = "Comment[]|Collection|ArrayCollection|Collection<Comment>|Collection<int, Comment>";
        assert!(is_same_type(expected, "Collection"));
        assert!(is_same_type(expected, "Collection<int, Comment>"));
        assert!(!is_same_type(expected, "array"));
    }
}
