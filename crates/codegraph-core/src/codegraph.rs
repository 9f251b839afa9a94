//! `CodeGraph` (SPEC_FULL.md §6.2): the crate's single entry point, wiring
//! the Graph Store, Edge Type Registry, File Dependency Analyzer and
//! Inference Engine together from a [`CodeGraphConfig`]. Grounded on
//! `codeprysm-backend`'s `LocalBackend`, which plays the same owning-facade
//! role for that crate's own store/embedder/search pipeline.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::analyzer::{FileAnalysisResult, FileDependencyAnalyzer, ProjectAnalysisResult};
use crate::config::CodeGraphConfig;
use crate::edge_types::EdgeTypeRegistry;
use crate::error::CodeGraphError;
use crate::graph::{InferredEdge, Node, NodeType};
use crate::inference::{
    HierarchicalOptions, InferenceEngine, InferenceEngineOptions, InferenceResult, InheritableOptions,
    TransitiveOptions,
};
use crate::language::Language;
use crate::parser_pool::ParserPool;
use crate::queries::QueryEngine;
use crate::query_facade::{self, AllNodes, DependencyCycle, ProjectStats};
use crate::store::SqliteGraphStore;

/// Owns the store, registry, analyzer and inference engine for one project.
/// Not `Sync` by construction — `SqliteGraphStore` already serializes writes
/// behind its own connection-pool lock (SPEC_FULL.md §5); this facade adds no
/// further synchronization of its own.
pub struct CodeGraph {
    config: CodeGraphConfig,
    store: SqliteGraphStore,
    analyzer: FileDependencyAnalyzer,
    engine: InferenceEngine,
}

impl CodeGraph {
    /// Open (or create) the SQLite store at `db_path` and wire up the rest
    /// of the pipeline from `config`.
    pub fn open(db_path: impl AsRef<Path>, config: CodeGraphConfig) -> Result<Self, CodeGraphError> {
        let store = SqliteGraphStore::open(db_path, config.store.connection_pool.size)?;
        Self::from_store(store, config)
    }

    /// An in-memory store, for tests and one-shot analyses that don't need
    /// to persist across process restarts.
    pub fn in_memory(config: CodeGraphConfig) -> Result<Self, CodeGraphError> {
        let store = SqliteGraphStore::in_memory()?;
        Self::from_store(store, config)
    }

    fn from_store(store: SqliteGraphStore, config: CodeGraphConfig) -> Result<Self, CodeGraphError> {
        let registry = EdgeTypeRegistry::with_core_types();
        store.sync_edge_types(&registry)?;
        let engine = InferenceEngine::new(
            registry,
            InferenceEngineOptions {
                cache_enabled: config.inference.cache.enabled,
                cache_strategy: config.inference.cache.parsed_strategy().map_err(|e| CodeGraphError::Config(e.to_string()))?,
                default_max_path_length: config.inference.default_max_path_length,
                default_max_inheritance_depth: config.inference.default_max_inheritance_depth,
                detect_cycles: config.inference.detect_cycles,
            },
        );
        Ok(Self {
            config,
            store,
            analyzer: FileDependencyAnalyzer::default(),
            engine,
        })
    }

    pub fn config(&self) -> &CodeGraphConfig {
        &self.config
    }

    fn edge_types_to_clean(&self) -> HashSet<String> {
        self.config.analyzer.default_edge_types_to_clean.iter().cloned().collect()
    }

    /// Analyze one file, then invalidate any cached inference rooted at its
    /// node. Targets the file gained new edges to (libraries, other files)
    /// are invalidated too, since a new incoming edge can open a fresh
    /// inferred path through them.
    pub fn analyze_file(
        &mut self,
        project_relative_path: &str,
        source_text: &str,
    ) -> Result<FileAnalysisResult, CodeGraphError> {
        let mut pool = ParserPool::new(self.config.parser_recovery.max_successive_uses_before_recreate);
        let mut query_engine = QueryEngine::new();
        let edge_types_to_clean = self.edge_types_to_clean();
        let result = self.analyzer.analyze_file(
            &mut pool,
            &mut query_engine,
            &self.store,
            &edge_types_to_clean,
            project_relative_path,
            source_text,
        )?;
        self.invalidate_after_analysis(project_relative_path)?;
        Ok(result)
    }

    /// Walk `root` and analyze every supported-language file under it,
    /// honoring `.gitignore` plus `exclude_globs`.
    pub fn analyze_project(
        &mut self,
        root: impl AsRef<Path>,
        exclude_globs: &globset::GlobSet,
        parallel: bool,
    ) -> Result<ProjectAnalysisResult, CodeGraphError> {
        let edge_types_to_clean = self.edge_types_to_clean();
        let supported_languages: HashSet<_> = self.config.supported_languages.iter().copied().collect();
        let result = self.analyzer.analyze_project(
            &self.store,
            root.as_ref(),
            exclude_globs,
            &supported_languages,
            &edge_types_to_clean,
            self.config.parser_recovery.max_successive_uses_before_recreate,
            parallel,
        )?;
        self.engine.sync_cache(&self.store)?;
        Ok(result)
    }

    fn invalidate_after_analysis(&self, project_relative_path: &str) -> Result<(), CodeGraphError> {
        let path = crate::identifier::normalize_path(project_relative_path);
        let file_identifier = crate::identifier::for_file(&path);
        let Some(file_node) = self.store.get_node_by_identifier(&file_identifier)? else {
            return Ok(());
        };
        let file_id = file_node.id.expect("stored node has an id");
        self.engine.invalidate_node(&self.store, file_id)?;
        for edge in self.store.find_edges(&crate::store::EdgeFilter {
            from_ids: Some(vec![file_id]),
            ..Default::default()
        })? {
            self.engine.invalidate_node(&self.store, edge.to_node_id)?;
        }
        Ok(())
    }

    pub fn query_hierarchical(
        &self,
        edge_type: &str,
        options: &HierarchicalOptions,
    ) -> Result<Vec<crate::graph::Edge>, CodeGraphError> {
        Ok(self.engine.query_hierarchical(&self.store, edge_type, options)?)
    }

    pub fn query_transitive(
        &self,
        from_node_id: i64,
        edge_type: &str,
        options: &TransitiveOptions,
    ) -> Result<Vec<InferredEdge>, CodeGraphError> {
        Ok(self.engine.query_transitive(&self.store, from_node_id, edge_type, options)?)
    }

    pub fn query_inheritable(
        &self,
        from_node_id: i64,
        parent_type: &str,
        inheritable_type: &str,
        options: &InheritableOptions,
    ) -> Result<Vec<InferredEdge>, CodeGraphError> {
        Ok(self
            .engine
            .query_inheritable(&self.store, from_node_id, parent_type, inheritable_type, options)?)
    }

    pub fn infer_all(&self, from_node_id: i64) -> Result<InferenceResult, CodeGraphError> {
        Ok(self.engine.infer_all(&self.store, from_node_id)?)
    }

    pub fn sync_cache(&self) -> Result<(), CodeGraphError> {
        Ok(self.engine.sync_cache(&self.store)?)
    }

    pub fn list_all_nodes(&self) -> Result<AllNodes, CodeGraphError> {
        Ok(query_facade::list_all_nodes(&self.store)?)
    }

    pub fn list_nodes_by_type(&self, node_type: NodeType) -> Result<Vec<Node>, CodeGraphError> {
        Ok(query_facade::list_nodes_by_type(&self.store, node_type)?)
    }

    pub fn file_dependencies(&self, file_path: &str) -> Result<Vec<Node>, CodeGraphError> {
        Ok(query_facade::file_dependencies(&self.store, file_path)?)
    }

    pub fn file_dependents(&self, file_path: &str) -> Result<Vec<Node>, CodeGraphError> {
        Ok(query_facade::file_dependents(&self.store, file_path)?)
    }

    pub fn circular_dependencies(&self) -> Result<Vec<DependencyCycle>, CodeGraphError> {
        Ok(query_facade::circular_dependencies(&self.store, &self.engine)?)
    }

    pub fn project_stats(&self) -> Result<ProjectStats, CodeGraphError> {
        Ok(query_facade::project_stats(&self.store)?)
    }
}

/// Resolve the absolute path a `CodeGraph` should open its store at, given
/// a project root: `<project_root>/.codegraph/graph.db` (SPEC_FULL.md §6.1).
pub fn default_db_path(project_root: impl AsRef<Path>) -> PathBuf {
    project_root.as_ref().join(".codegraph").join("graph.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_file_then_query_facade_sees_the_result() {
        let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
        let result = graph
            .analyze_file("app.ts", "import { join } from 'path';\nexport function run() {}\n")
            .unwrap();
        assert!(result.nodes_created > 0);

        let deps = graph.file_dependencies("app.ts").unwrap();
        assert_eq!(deps.len(), 1);

        let stats = graph.project_stats().unwrap();
        assert!(stats.total_nodes >= 2);
    }

    #[test]
    fn reanalyzing_a_file_invalidates_its_cached_inference() {
        let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
        graph.analyze_file("a.ts", "import { b } from './b';\n").unwrap();
        graph.analyze_file("b.ts", "").unwrap();

        let a_id = graph
            .store
            .get_node_by_identifier(&crate::identifier::for_file("a.ts"))
            .unwrap()
            .unwrap()
            .id
            .unwrap();
        let first = graph
            .query_transitive(a_id, "depends_on", &TransitiveOptions::default())
            .unwrap();
        assert_eq!(first.len(), 0, "imports_file isn't depends_on, no path expected yet");

        // Re-analyzing shouldn't panic or leave stale cache entries behind.
        graph.analyze_file("a.ts", "import { b } from './b';\n").unwrap();
        let second = graph
            .query_transitive(a_id, "depends_on", &TransitiveOptions::default())
            .unwrap();
        assert_eq!(second.len(), 0);
    }
}
