//! Query Engine (SPEC_FULL.md §4.3): executes registered queries against an
//! AST and applies their processors.

use std::collections::HashMap;

use tree_sitter::{Query as TsQuery, QueryCursor, StreamingIterator, Tree};

use crate::error::QueryError;
use crate::language::Language;
use crate::queries::records::ResultRecord;
use crate::queries::registry::{QueryEntry, QueryRegistry};

/// Executes registered queries, caching compiled `tree_sitter::Query` objects
/// per (query name, language) pair since compilation is tied to a
/// `tree_sitter::Language` and is not free.
#[derive(Default)]
pub struct QueryEngine {
    compiled: HashMap<(String, Language), TsQuery>,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn compiled_query(
        &mut self,
        entry: &QueryEntry,
        language: Language,
    ) -> Result<&TsQuery, QueryError> {
        let key = (entry.name.clone(), language);
        if !self.compiled.contains_key(&key) {
            let ts_language = language.tree_sitter_language();
            let query = TsQuery::new(&ts_language, &entry.pattern).map_err(|source| {
                QueryError::QueryCompile {
                    name: entry.name.clone(),
                    source,
                }
            })?;
            self.compiled.insert(key.clone(), query);
        }
        Ok(self.compiled.get(&key).expect("inserted above"))
    }

    /// Run one registered query against `tree`/`source` for `language`.
    ///
    /// Fails with `LanguageMismatch` if the query is not registered for
    /// `language`. A processor that panics is not caught here (processors
    /// are plain functions expected to be total); a processor returning
    /// `None` for a given match simply contributes no record.
    pub fn execute(
        &mut self,
        registry: &QueryRegistry,
        query_name: &str,
        tree: &Tree,
        source: &str,
        language: Language,
    ) -> Result<Vec<ResultRecord>, QueryError> {
        let entry = registry.get(query_name)?.clone();
        if !entry.languages.contains(&language) {
            return Err(QueryError::LanguageMismatch {
                name: query_name.to_string(),
                language: language.to_string(),
            });
        }

        let source_bytes = source.as_bytes();
        let query = self.compiled_query(&entry, language)?;
        let mut cursor = QueryCursor::new();
        let mut records = Vec::new();
        let mut matches = cursor.matches(query, tree.root_node(), source_bytes);
        while let Some(m) = matches.next() {
            if let Some(record) = (entry.processor)(query, source_bytes, m) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Run every query registered for `language`, best-effort: a query whose
    /// execution fails logs nothing itself (the caller decides how to
    /// surface/log `ProcessorFailure`-equivalent warnings) and contributes an
    /// empty result list rather than aborting its siblings.
    pub fn execute_for_language(
        &mut self,
        registry: &QueryRegistry,
        tree: &Tree,
        source: &str,
        language: Language,
    ) -> HashMap<String, Vec<ResultRecord>> {
        let mut out = HashMap::new();
        for entry in registry.queries_for(language) {
            let name = entry.name.clone();
            let records = self
                .execute(registry, &name, tree, source, language)
                .unwrap_or_else(|e| {
                    tracing::warn!(query = %name, error = %e, "query execution failed; contributing empty result");
                    Vec::new()
                });
            out.insert(name, records);
        }
        out
    }
}
