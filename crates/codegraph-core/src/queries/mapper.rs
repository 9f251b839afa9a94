//! Custom-Key Mapper (SPEC_FULL.md §4.4): composes a bundle of query results
//! under user-chosen field names.

use std::collections::HashMap;

use tree_sitter::Tree;

use crate::language::Language;
use crate::queries::engine::QueryEngine;
use crate::queries::records::ResultRecord;
use crate::queries::registry::QueryRegistry;

/// `{ user_key -> query_name }`.
pub type KeyMapping = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEntry {
    pub user_key: String,
    pub query_name: String,
    pub reason: String,
}

/// The `moduleStructure` predefined mapping: imports, exports, and top-level
/// declarations bundled under fixed keys. Not privileged — a value like any
/// other `KeyMapping`.
pub fn module_structure_mapping(language: Language) -> KeyMapping {
    let prefix = language.as_str();
    let mut mapping = KeyMapping::new();
    mapping.insert("imports".to_string(), format!("{prefix}-imports"));
    mapping.insert("exports".to_string(), format!("{prefix}-exports"));
    mapping.insert(
        "declarations".to_string(),
        format!("{prefix}-declarations"),
    );
    mapping
}

/// The `classAnalysis` predefined mapping: class/method declarations and
/// inheritance references.
pub fn class_analysis_mapping(language: Language) -> KeyMapping {
    let prefix = language.as_str();
    let mut mapping = KeyMapping::new();
    mapping.insert("declarations".to_string(), format!("{prefix}-declarations"));
    mapping.insert("references".to_string(), format!("{prefix}-references"));
    mapping
}

/// Validate that every `query_name` in `mapping` is registered and applies to
/// `language`, without executing anything.
pub fn validate(
    registry: &QueryRegistry,
    mapping: &KeyMapping,
    language: Language,
) -> Result<(), Vec<InvalidEntry>> {
    let mut errors = Vec::new();
    for (user_key, query_name) in mapping {
        match registry.get(query_name) {
            Ok(entry) => {
                if !entry.languages.contains(&language) {
                    errors.push(InvalidEntry {
                        user_key: user_key.clone(),
                        query_name: query_name.clone(),
                        reason: format!("not registered for language '{language}'"),
                    });
                }
            }
            Err(_) => errors.push(InvalidEntry {
                user_key: user_key.clone(),
                query_name: query_name.clone(),
                reason: "no such query registered".to_string(),
            }),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Execute `mapping` against `tree`/`source`, returning a bundle keyed by
/// each mapping's user-chosen key. Entries referencing an unregistered query
/// or a language mismatch are simply omitted from the bundle — callers that
/// need to fail fast should call [`validate`] first.
pub fn execute(
    engine: &mut QueryEngine,
    registry: &QueryRegistry,
    mapping: &KeyMapping,
    tree: &Tree,
    source: &str,
    language: Language,
) -> HashMap<String, Vec<ResultRecord>> {
    let mut bundle = HashMap::new();
    for (user_key, query_name) in mapping {
        if let Ok(records) = engine.execute(registry, query_name, tree, source, language) {
            bundle.insert(user_key.clone(), records);
        }
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::records::{ReferenceKind, SourceSpan};
    use crate::queries::registry::QueryEntry;

    fn dummy_processor(
        _q: &tree_sitter::Query,
        _s: &[u8],
        _m: &tree_sitter::QueryMatch,
    ) -> Option<ResultRecord> {
        Some(ResultRecord::Reference {
            name: "x".to_string(),
            reference_kind: ReferenceKind::Use,
            span: SourceSpan::default(),
        })
    }

    #[test]
    fn validate_reports_unregistered_query() {
        let registry = QueryRegistry::new();
        let mut mapping = KeyMapping::new();
        mapping.insert("thing".to_string(), "does-not-exist".to_string());
        let errors = validate(&registry, &mapping, Language::TypeScript).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn validate_passes_for_known_query() {
        let mut registry = QueryRegistry::new();
        registry.register(QueryEntry::new(
            "ts-refs",
            [Language::TypeScript],
            "(identifier) @id",
            dummy_processor,
            "reference",
        ));
        let mut mapping = KeyMapping::new();
        mapping.insert("refs".to_string(), "ts-refs".to_string());
        assert!(validate(&registry, &mapping, Language::TypeScript).is_ok());
    }

    #[test]
    fn execute_bundles_results_under_user_keys() {
        let mut registry = QueryRegistry::new();
        registry.register(QueryEntry::new(
            "ts-refs",
            [Language::TypeScript],
            "(identifier) @id",
            dummy_processor,
            "reference",
        ));
        let mut mapping = KeyMapping::new();
        mapping.insert("refs".to_string(), "ts-refs".to_string());

        let mut engine = QueryEngine::new();
        let mut pool = crate::parser_pool::ParserPool::default();
        let parsed = pool.parse("let a = 1;", Language::TypeScript).unwrap();
        let bundle = execute(&mut engine, &registry, &mapping, &parsed.tree, "let a = 1;", Language::TypeScript);
        assert!(bundle.contains_key("refs"));
    }
}
