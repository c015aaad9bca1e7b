//! Identifier normalization for code generation
//!
//! Every function here is total: whatever the input, the output is a valid
//! identifier in the usual `[A-Za-z_][A-Za-z0-9_]*` sense. Each function is also
//! idempotent on its own output, so names can be normalized again safely.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-./]+").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());
static REPEATED_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").unwrap());

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Converts a string to PascalCase for type names.
///
/// Dashes, dots, slashes and whitespace separate words like underscores do;
/// any other character that cannot appear in an identifier is dropped.
///
/// # Examples
/// ```
/// use clientgen::generation::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("Pet_status"), "PetStatus");
/// assert_eq!(to_pascal_case("order-item"), "OrderItem");
/// assert_eq!(to_pascal_case("3d_model"), "S3dModel");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    let separated = SEPARATORS.replace_all(s, "_");
    let cleaned = NON_WORD.replace_all(&separated, "");

    let pascal: String = cleaned
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if pascal.is_empty() {
        "Unnamed".to_string()
    } else if starts_with_digit(&pascal) {
        format!("S{pascal}")
    } else {
        pascal
    }
}

/// Converts a string to snake_case for function and accessor names.
///
/// # Examples
/// ```
/// use clientgen::generation::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("get_pets_{petId}"), "get_pets_pet_id");
/// assert_eq!(to_snake_case("Pet-Store"), "pet_store");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut spaced = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            spaced.push('_');
        }
        spaced.push(ch.to_ascii_lowercase());
    }

    let replaced = NON_WORD.replace_all(&spaced, "_");
    let collapsed = REPEATED_UNDERSCORES.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        "unnamed".to_string()
    } else if starts_with_digit(trimmed) {
        format!("n_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Converts a string to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(&to_snake_case(s));
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Turns an enum value into a member identifier.
///
/// String values are upper-cased with every non-alphanumeric character
/// replaced by `_`. Other JSON values use the `S_<value>` form.
///
/// # Examples
/// ```
/// use clientgen::generation::naming::sanitize_enum_member;
/// use serde_json::json;
///
/// assert_eq!(sanitize_enum_member(&json!("in-stock")), "IN_STOCK");
/// assert_eq!(sanitize_enum_member(&json!("2xx")), "_2XX");
/// assert_eq!(sanitize_enum_member(&json!(42)), "S_42");
/// ```
pub fn sanitize_enum_member(raw: &JsonValue) -> String {
    match raw.as_str() {
        Some(value) => {
            let upper = NON_ALNUM.replace_all(&value.to_uppercase(), "_").into_owned();
            if upper.is_empty() {
                fallback_member(raw)
            } else if starts_with_digit(&upper) {
                format!("_{upper}")
            } else {
                upper
            }
        }
        None => fallback_member(raw),
    }
}

fn fallback_member(raw: &JsonValue) -> String {
    let text = match raw {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    let cleaned = NON_ALNUM.replace_all(&text.to_uppercase(), "_").into_owned();
    format!("S_{cleaned}")
}

/// Member identifiers for a list of enum values, unique within the list.
///
/// Collisions (`"a-b"` and `"a_b"` both become `A_B`) are resolved with
/// `_2`, `_3`, ... suffixes in declaration order.
pub fn unique_member_names(values: &[JsonValue]) -> Vec<String> {
    let mut taken = HashSet::new();
    values
        .iter()
        .map(|value| {
            let base = sanitize_enum_member(value);
            let mut candidate = base.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{base}_{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Turns a property or parameter name into a field identifier.
///
/// # Examples
/// ```
/// use clientgen::generation::naming::sanitize_field_name;
///
/// assert_eq!(sanitize_field_name("pet-id"), "pet_id");
/// assert_eq!(sanitize_field_name("1st"), "_1st");
/// assert_eq!(sanitize_field_name("petId"), "petId");
/// ```
pub fn sanitize_field_name(raw: &str) -> String {
    let cleaned = NON_WORD.replace_all(raw, "_");
    if cleaned.is_empty() {
        "_".to_string()
    } else if starts_with_digit(&cleaned) {
        format!("_{cleaned}")
    } else {
        cleaned.into_owned()
    }
}

/// Whether a string is a valid identifier under the ASCII rules used here
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
