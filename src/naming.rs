//! Identifier casing and pluralisation helpers.

/// Convert a snake_case identifier to PascalCase.
///
/// Empty segments (leading, trailing or doubled underscores) are kept as a
/// literal `_`, so `a__b` becomes `A_B`.
pub fn to_pascal_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for segment in value.split('_') {
        if segment.is_empty() {
            result.push('_');
            continue;
        }
        let lower = segment.to_lowercase();
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }

    upper_first(&result)
}

/// PascalCase with a lower-case first character.
pub fn to_camel_case(value: &str) -> String {
    let pascal = to_pascal_case(value);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Naive English plural: a consonant followed by `y` becomes `ies`,
/// everything else gets an `s`. Irregular nouns are not handled.
pub fn pluralize(value: &str) -> String {
    if let Some(stem) = value.strip_suffix('y') {
        let after_vowel = stem
            .chars()
            .last()
            .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'));
        if !stem.is_empty() && !after_vowel {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", value)
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
