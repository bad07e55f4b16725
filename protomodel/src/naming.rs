//! Case conversion and identifier sanitization.
//!
//! Every generated identifier goes through this module so that field names,
//! message names and RPC names stay stable across runs.

use convert_case::{Case, Casing};

/// Suffixes that mark a command as asynchronous by convention.
const ASYNC_SUFFIXES: &[&str] = &["Async", "_async"];

/// Convert a property or parameter name into a proto field name.
///
/// `Count` becomes `count`, `IsEnabled` becomes `is_enabled`.
pub fn field_name(name: &str) -> String {
    sanitize_identifier(&name.to_case(Case::Snake))
}

/// Convert a name into PascalCase.
pub fn to_pascal_case(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// Replace characters that are not valid in a proto identifier.
///
/// Invalid characters become `_`. A leading digit gets a `_` prefix.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if out.is_empty() {
        return "_".to_string();
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Strip everything except ASCII letters, digits and underscores.
///
/// Used for type-derived names, where generic brackets and path separators
/// are dropped rather than replaced (`Page<Item>` becomes `PageItem`).
pub fn sanitize_type_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if out.is_empty() {
        return "Unnamed".to_string();
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'T');
    }

    out
}

/// Build a message name from a type's display name and the configured suffix.
pub fn message_name(display_name: &str, suffix: &str) -> String {
    format!("{}{}", sanitize_type_name(display_name), suffix)
}

/// Remove a conventional asynchronous suffix from a command name.
///
/// The suffix is kept when stripping it would leave nothing.
pub fn strip_async_suffix(name: &str) -> &str {
    for suffix in ASYNC_SUFFIXES {
        if let Some(base) = name.strip_suffix(suffix) {
            if !base.is_empty() {
                return base;
            }
        }
    }
    name
}

/// The base name used for a command's RPC and request/response messages.
///
/// `ResetAsync` and `reset_async` both become `Reset`.
pub fn command_base_name(name: &str) -> String {
    sanitize_type_name(&to_pascal_case(strip_async_suffix(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_from_pascal() {
        assert_eq!(field_name("Count"), "count");
        assert_eq!(field_name("IsEnabled"), "is_enabled");
        assert_eq!(field_name("Label"), "label");
    }

    #[test]
    fn test_field_name_already_snake() {
        assert_eq!(field_name("item_count"), "item_count");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("a-b c"), "a_b_c");
        assert_eq!(sanitize_identifier("1st"), "_1st");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_sanitize_type_name() {
        assert_eq!(sanitize_type_name("Page<Item>"), "PageItem");
        assert_eq!(sanitize_type_name("models::Node"), "modelsNode");
        assert_eq!(sanitize_type_name("3D"), "T3D");
        assert_eq!(sanitize_type_name("<>"), "Unnamed");
    }

    #[test]
    fn test_message_name() {
        assert_eq!(message_name("Node", "State"), "NodeState");
        assert_eq!(message_name("Page<Item>", "State"), "PageItemState");
    }

    #[test]
    fn test_strip_async_suffix() {
        assert_eq!(strip_async_suffix("LoadAsync"), "Load");
        assert_eq!(strip_async_suffix("load_async"), "load");
        assert_eq!(strip_async_suffix("Async"), "Async");
        assert_eq!(strip_async_suffix("Reset"), "Reset");
    }

    #[test]
    fn test_command_base_name() {
        assert_eq!(command_base_name("Reset"), "Reset");
        assert_eq!(command_base_name("ResetAsync"), "Reset");
        assert_eq!(command_base_name("load_items_async"), "LoadItems");
        assert_eq!(command_base_name("save"), "Save");
    }
}
