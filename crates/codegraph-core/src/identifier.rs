//! Stable, globally-unique node identifiers.
//!
//! Format (SPEC_FULL.md §4.5), path convention decided in the same section:
//!
//! ```text
//! <file-path> :: <node-type> :: <name>
//! <file-path> :: <scope> :: <node-type> :: <name>
//! library :: <library-name>
//! ```
//!
//! Paths are project-relative and forward-slash normalized; this module does
//! not itself resolve a path against a project root — callers (the analyzer)
//! pass already-normalized paths in.

const SEP: &str = " :: ";
const LIBRARY_PREFIX: &str = "library";

/// Normalize a path for use inside an identifier: forward slashes, no leading `./`.
pub fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    replaced
        .strip_prefix("./")
        .unwrap_or(&replaced)
        .to_string()
}

fn for_kind(path: &str, scope: Option<&str>, node_type: &str, name: &str) -> String {
    let path = normalize_path(path);
    match scope {
        Some(scope) => format!("{path}{SEP}{scope}{SEP}{node_type}{SEP}{name}"),
        None => format!("{path}{SEP}{node_type}{SEP}{name}"),
    }
}

pub fn for_file(path: &str) -> String {
    for_kind(path, None, "file", path)
}

pub fn for_export(path: &str, name: &str) -> String {
    for_kind(path, None, "export", name)
}

pub fn for_import(path: &str, imported_name: &str) -> String {
    for_kind(path, None, "import", imported_name)
}

pub fn for_library(name: &str) -> String {
    format!("{LIBRARY_PREFIX}{SEP}{name}")
}

pub fn for_class(path: &str, class_name: &str) -> String {
    for_kind(path, None, "class", class_name)
}

pub fn for_interface(path: &str, name: &str) -> String {
    for_kind(path, None, "interface", name)
}

pub fn for_method(path: &str, class_name: &str, method_name: &str) -> String {
    for_kind(path, Some(class_name), "method", method_name)
}

pub fn for_function(path: &str, name: &str) -> String {
    for_kind(path, None, "function", name)
}

pub fn for_property(path: &str, scope: Option<&str>, name: &str) -> String {
    for_kind(path, scope, "property", name)
}

pub fn for_variable(path: &str, name: &str) -> String {
    for_kind(path, None, "variable", name)
}

pub fn for_constant(path: &str, name: &str) -> String {
    for_kind(path, None, "constant", name)
}

pub fn for_type(path: &str, name: &str) -> String {
    for_kind(path, None, "type", name)
}

pub fn for_enum(path: &str, name: &str) -> String {
    for_kind(path, None, "enum", name)
}

pub fn for_enum_member(path: &str, enum_name: &str, member: &str) -> String {
    for_kind(path, Some(enum_name), "enum_member", member)
}

pub fn for_constructor(path: &str, class_name: &str) -> String {
    for_kind(path, Some(class_name), "constructor", class_name)
}

pub fn for_heading_symbol(path: &str, heading: &str, line: usize) -> String {
    for_kind(path, None, "heading_symbol", &format!("{heading}#{line}"))
}

pub fn for_missing_file(path: &str) -> String {
    for_kind(path, None, "missing-file", path)
}

pub fn for_broken_reference(path: &str, name: &str) -> String {
    for_kind(path, None, "broken_reference", name)
}

/// The parsed shape of an identifier; the inverse of the `for_*` constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdentifier {
    pub path: Option<String>,
    pub scope: Option<String>,
    pub node_type: String,
    pub name: String,
    pub is_library: bool,
}

/// Parse an identifier back into its components.
///
/// Returns `None` for malformed input (wrong number of `::`-separated parts).
pub fn parse(identifier: &str) -> Option<ParsedIdentifier> {
    let parts: Vec<&str> = identifier.split(SEP).collect();
    if parts.len() == 2 && parts[0] == LIBRARY_PREFIX {
        return Some(ParsedIdentifier {
            path: None,
            scope: None,
            node_type: "library".to_string(),
            name: parts[1].to_string(),
            is_library: true,
        });
    }
    match parts.as_slice() {
        [path, node_type, name] => Some(ParsedIdentifier {
            path: Some(path.to_string()),
            scope: None,
            node_type: node_type.to_string(),
            name: name.to_string(),
            is_library: false,
        }),
        [path, scope, node_type, name] => Some(ParsedIdentifier {
            path: Some(path.to_string()),
            scope: Some(scope.to_string()),
            node_type: node_type.to_string(),
            name: name.to_string(),
            is_library: false,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_determinism() {
        let a = for_function("src/math.ts", "add");
        let b = for_function("src/math.ts", "add");
        assert_eq!(a, b);
    }

    #[test]
    fn identifiers_differ_across_files() {
        let a = for_export("src/a.ts", "thing");
        let b = for_export("src/b.ts", "thing");
        assert_ne!(a, b);
    }

    #[test]
    fn library_identifier_uses_sentinel_prefix() {
        let id = for_library("lodash");
        assert_eq!(id, "library :: lodash");
        let parsed = parse(&id).unwrap();
        assert!(parsed.is_library);
        assert_eq!(parsed.name, "lodash");
    }

    #[test]
    fn scoped_method_identifier_round_trips() {
        let id = for_method("src/models.py", "User", "save");
        let parsed = parse(&id).unwrap();
        assert_eq!(parsed.path.as_deref(), Some("src/models.py"));
        assert_eq!(parsed.scope.as_deref(), Some("User"));
        assert_eq!(parsed.node_type, "method");
        assert_eq!(parsed.name, "save");
    }

    #[test]
    fn normalize_path_uses_forward_slashes_and_strips_leading_dot_slash() {
        assert_eq!(normalize_path("./src/a.ts"), "src/a.ts");
        assert_eq!(normalize_path("src\\a.ts"), "src/a.ts");
    }

    #[test]
    fn parse_roundtrips_unscoped_identifier() {
        let id = for_class("src/app.ts", "App");
        let parsed = parse(&id).unwrap();
        assert_eq!(parsed.node_type, "class");
        assert_eq!(parsed.name, "App");
        assert!(!parsed.is_library);
    }

    #[test]
    fn parse_rejects_malformed_identifier() {
        assert!(parse("not-an-identifier").is_none());
    }
}
