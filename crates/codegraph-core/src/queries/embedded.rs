//! Embedded default query set: one tags query per supported language,
//! compiled into the binary via `include_str!` so a host never has to supply
//! its own query files to get a working analyzer (mirrors the teacher's
//! embedded-query pattern).

use crate::language::Language;
use crate::queries::processors::tags_processor;
use crate::queries::registry::{QueryEntry, QueryRegistry};

const TYPESCRIPT_TAGS: &str = include_str!("../../queries/typescript-tags.scm");
const JAVASCRIPT_TAGS: &str = include_str!("../../queries/javascript-tags.scm");
const JAVA_TAGS: &str = include_str!("../../queries/java-tags.scm");
const PYTHON_TAGS: &str = include_str!("../../queries/python-tags.scm");
const GO_TAGS: &str = include_str!("../../queries/go-tags.scm");
const MARKDOWN_TAGS: &str = include_str!("../../queries/markdown-tags.scm");

/// The embedded query text for a language's single `{lang}-tags` query.
pub fn embedded_query_text(language: Language) -> &'static str {
    match language {
        Language::TypeScript => TYPESCRIPT_TAGS,
        Language::Javascript => JAVASCRIPT_TAGS,
        Language::Java => JAVA_TAGS,
        Language::Python => PYTHON_TAGS,
        Language::Go => GO_TAGS,
        Language::Markdown => MARKDOWN_TAGS,
    }
}

/// The canonical query name for a language's tags query.
pub fn tags_query_name(language: Language) -> String {
    format!("{}-tags", language.as_str())
}

/// Build a registry seeded with every supported language's embedded tags
/// query. Callers MAY additionally `register` their own queries/overrides.
pub fn build_default_registry() -> QueryRegistry {
    let mut registry = QueryRegistry::new();
    for &language in Language::all() {
        registry.register(QueryEntry::new(
            tags_query_name(language),
            [language],
            embedded_query_text(language),
            tags_processor,
            "tags",
        ));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Query;

    #[test]
    fn every_embedded_query_compiles_for_its_language() {
        for &language in Language::all() {
            let ts_language = language.tree_sitter_language();
            let text = embedded_query_text(language);
            Query::new(&ts_language, text)
                .unwrap_or_else(|e| panic!("query for {language} failed to compile: {e:?}"));
        }
    }

    #[test]
    fn default_registry_has_one_entry_per_language() {
        let registry = build_default_registry();
        for &language in Language::all() {
            assert!(registry.get(&tags_query_name(language)).is_ok());
        }
    }
}
