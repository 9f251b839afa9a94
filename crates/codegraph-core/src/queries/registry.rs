//! Query Registry (SPEC_FULL.md §4.2): named, language-tagged query patterns
//! and their typed result processors.

use std::collections::{HashMap, HashSet};

use tree_sitter::{Query as TsQuery, QueryMatch};

use crate::error::QueryError;
use crate::language::Language;
use crate::queries::records::ResultRecord;

/// A processor turns one tree-sitter match into zero-or-one typed records.
/// `source` is the full source text the match was found in.
pub type Processor = fn(query: &TsQuery, source: &[u8], m: &QueryMatch) -> Option<ResultRecord>;

/// One registered query.
#[derive(Clone, Debug)]
pub struct QueryEntry {
    pub name: String,
    pub languages: HashSet<Language>,
    pub priority: i32,
    pub pattern: String,
    pub processor: Processor,
    pub result_type_key: &'static str,
}

impl QueryEntry {
    pub fn new(
        name: impl Into<String>,
        languages: impl IntoIterator<Item = Language>,
        pattern: impl Into<String>,
        processor: Processor,
        result_type_key: &'static str,
    ) -> Self {
        Self {
            name: name.into(),
            languages: languages.into_iter().collect(),
            priority: 0,
            pattern: pattern.into(),
            processor,
            result_type_key,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Holds registered query patterns keyed by query name.
#[derive(Default, Clone)]
pub struct QueryRegistry {
    entries: HashMap<String, QueryEntry>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry under `entry.name`.
    pub fn register(&mut self, entry: QueryEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Result<&QueryEntry, QueryError> {
        self.entries
            .get(name)
            .ok_or_else(|| QueryError::QueryNotFound(name.to_string()))
    }

    /// All entries registered for `language`, highest priority first.
    pub fn queries_for(&self, language: Language) -> Vec<&QueryEntry> {
        let mut entries: Vec<&QueryEntry> = self
            .entries
            .values()
            .filter(|e| e.languages.contains(&language))
            .collect();
        entries.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.name.cmp(&b.name)));
        entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }
}
