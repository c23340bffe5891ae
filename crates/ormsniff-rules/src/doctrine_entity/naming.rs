//! Identifier conversions used to derive column, method and class names.

const CLASS_SUFFIX: &str = "::class";

/// Uppercases the first ASCII character.
#[must_use]
pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Lowercases the first ASCII character.
#[must_use]
pub fn lcfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `first_name` to `firstName`.
#[must_use]
pub fn camel_case(value: &str) -> String {
    let spaced = value.replace('_', " ");
    let words: String = spaced
        .trim()
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(ucfirst)
        .collect();
    lcfirst(&words)
}

/// `firstName` to `first_name`.
///
/// An underscore goes between a lowercase letter or digit and the uppercase
/// letter following it; the result is lowercased.
#[must_use]
pub fn under_score(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut previous: Option<char> = None;
    for c in value.chars() {
        if c.is_ascii_uppercase()
            && previous.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
        previous = Some(c);
    }
    out
}

/// Singular form of a plural property name, `None` if it does not end in `s`.
///
/// `categories` gives `category`, `addresses` gives `address`.
#[must_use]
pub fn singularize(plural: &str) -> Option<String> {
    let stem = plural.strip_suffix('s')?;
    if let Some(base) = stem.strip_suffix("ie") {
        return Some(format!("{base}y"));
    }
    if stem.ends_with("se") {
        return Some(stem[..stem.len() - 1].to_string());
    }
    Some(stem.to_string())
}

/// Whether the type name starts with an uppercase letter (or anything that
/// is not a lowercase letter).
#[must_use]
pub fn sounds_like_class(value: &str) -> bool {
    !value.starts_with(|c: char| c.is_ascii_lowercase())
}

/// Whether `value` is a `Foo::class` reference.
#[must_use]
pub fn is_class_reference(value: &str) -> bool {
    value.len() > CLASS_SUFFIX.len() && value.ends_with(CLASS_SUFFIX)
}

/// `App\Entity\User::class` to `User`.
///
/// `self` is returned unchanged; callers resolve it to the enclosing class.
#[must_use]
pub fn short_class_name(class_name: &str) -> &str {
    let short = class_name
        .rsplit_once('\\')
        .map_or(class_name, |(_, short)| short);
    if is_class_reference(short) {
        &short[..short.len() - CLASS_SUFFIX.len()]
    } else {
        short
    }
}

/// Appends `::class` to a type name.
#[must_use]
pub fn class_reference(type_name: &str) -> String {
    format!("{type_name}{CLASS_SUFFIX}")
}
