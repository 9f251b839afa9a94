//! File Dependency Analyzer (SPEC_FULL.md §4.8): the glue from a file path
//! to persisted nodes and edges, grounded on the teacher's
//! `builder.rs::GraphBuilder::process_file` (containment/tag-to-node
//! translation, generalized here from the teacher's Container/Callable/Data
//! node model to SPEC_FULL.md's closed node-type set) and
//! `incremental.rs::IncrementalUpdater` (re-analysis/edge-cleanup shape).

use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;

use crate::error::AnalyzerError;
use crate::graph::{Edge, Node, NodeType, Position};
use crate::identifier;
use crate::language::Language;
use crate::parser_pool::ParserPool;
use crate::queries::embedded::build_default_registry;
use crate::queries::engine::QueryEngine;
use crate::queries::records::{DeclarationKind, ResultRecord, SourceSpan};
use crate::queries::registry::QueryRegistry;
use crate::resolver::{self, ImportTarget};
use crate::store::SqliteGraphStore;

/// The default edge types cleared from a file node before re-insertion
/// (SPEC_FULL.md §4.8 step 7 / §6.3 `analyzer.default_edge_types_to_clean`).
pub fn default_edge_types_to_clean() -> HashSet<String> {
    ["imports", "imports_library", "imports_file", "depends_on"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileAnalysisResult {
    pub nodes_created: usize,
    pub relationships_created: usize,
    pub warnings: Vec<String>,
    pub unresolved_internal_paths: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProjectAnalysisResult {
    pub files_analyzed: usize,
    pub nodes_created: usize,
    pub relationships_created: usize,
    pub warnings: Vec<String>,
    pub unresolved_internal_paths: Vec<String>,
}

impl ProjectAnalysisResult {
    fn absorb(&mut self, file: FileAnalysisResult) {
        self.files_analyzed += 1;
        self.nodes_created += file.nodes_created;
        self.relationships_created += file.relationships_created;
        self.warnings.extend(file.warnings);
        self.unresolved_internal_paths
            .extend(file.unresolved_internal_paths);
    }
}

fn position_from_span(span: SourceSpan) -> Position {
    Position {
        start_line: Some(span.start_line),
        start_column: Some(span.start_column),
        end_line: Some(span.end_line),
        end_column: Some(span.end_column),
    }
}

fn node_type_for_declaration(kind: DeclarationKind) -> NodeType {
    match kind {
        DeclarationKind::Class => NodeType::Class,
        DeclarationKind::Interface => NodeType::Interface,
        DeclarationKind::Function => NodeType::Function,
        DeclarationKind::Method => NodeType::Method,
        DeclarationKind::Property => NodeType::Property,
        DeclarationKind::Variable => NodeType::Variable,
        DeclarationKind::Constant => NodeType::Constant,
        DeclarationKind::TypeAlias => NodeType::Type,
        DeclarationKind::Enum => NodeType::Enum,
        DeclarationKind::EnumMember => NodeType::EnumMember,
        DeclarationKind::Constructor => NodeType::Constructor,
        DeclarationKind::Heading => NodeType::HeadingSymbol,
    }
}

fn declaration_identifier(
    path: &str,
    kind: DeclarationKind,
    scope: Option<&str>,
    name: &str,
    line: u32,
) -> String {
    match kind {
        DeclarationKind::Class => identifier::for_class(path, name),
        DeclarationKind::Interface => identifier::for_interface(path, name),
        DeclarationKind::Function => identifier::for_function(path, name),
        DeclarationKind::Method => match scope {
            Some(scope) => identifier::for_method(path, scope, name),
            None => identifier::for_function(path, name),
        },
        DeclarationKind::Property => identifier::for_property(path, scope, name),
        DeclarationKind::Variable => identifier::for_variable(path, name),
        DeclarationKind::Constant => identifier::for_constant(path, name),
        DeclarationKind::TypeAlias => identifier::for_type(path, name),
        DeclarationKind::Enum => identifier::for_enum(path, name),
        DeclarationKind::EnumMember => match scope {
            Some(scope) => identifier::for_enum_member(path, scope, name),
            None => identifier::for_enum_member(path, name, name),
        },
        DeclarationKind::Constructor => match scope {
            Some(scope) => identifier::for_constructor(path, scope),
            None => identifier::for_constructor(path, name),
        },
        DeclarationKind::Heading => identifier::for_heading_symbol(path, name, line as usize),
    }
}

/// Per-file analysis, plus directory/file-list orchestration.
pub struct FileDependencyAnalyzer {
    query_registry: QueryRegistry,
}

impl Default for FileDependencyAnalyzer {
    fn default() -> Self {
        Self {
            query_registry: build_default_registry(),
        }
    }
}

impl FileDependencyAnalyzer {
    pub fn new(query_registry: QueryRegistry) -> Self {
        Self { query_registry }
    }

    /// Analyze one file's source text, writing its nodes/edges into `store`
    /// within a single transactional scope (SPEC_FULL.md §4.8 algorithm).
    /// `project_relative_path` MUST already be relative to the project root.
    pub fn analyze_file(
        &self,
        pool: &mut ParserPool,
        engine: &mut QueryEngine,
        store: &SqliteGraphStore,
        edge_types_to_clean: &HashSet<String>,
        project_relative_path: &str,
        source_text: &str,
    ) -> Result<FileAnalysisResult, AnalyzerError> {
        let language = Language::from_path(Path::new(project_relative_path))
            .ok_or_else(|| {
                AnalyzerError::Parse(crate::error::ParserError::UnsupportedLanguage(
                    project_relative_path.to_string(),
                ))
            })?;

        let parsed = pool.parse(source_text, language)?;
        if parsed.has_errors() {
            tracing::warn!(file = %project_relative_path, "parse tree contains error nodes");
        }

        let path = identifier::normalize_path(project_relative_path);
        let file_identifier = identifier::for_file(&path);

        let by_query =
            engine.execute_for_language(&self.query_registry, &parsed.tree, source_text, language);
        let records: Vec<ResultRecord> = by_query.into_values().flatten().collect();

        let mut warnings = Vec::new();
        let mut unresolved_internal_paths = Vec::new();
        let mut nodes_created = 0usize;
        let mut relationships_created = 0usize;

        store.with_transaction(|store| {
            let file_node = Node::file(&file_identifier, &path, language);
            let file_node = store.upsert_node(&file_node)?;
            let file_node_id = file_node.id.expect("upsert_node always assigns an id");

            store.delete_edges_from(file_node_id, edge_types_to_clean)?;

            for record in &records {
                match record {
                    ResultRecord::Import { specifier, .. } => {
                        match resolver::resolve(&path, specifier) {
                            ImportTarget::External(name) => {
                                let lib_identifier = identifier::for_library(&name);
                                let lib_node = store.upsert_node(&Node::library(&lib_identifier, &name))?;
                                nodes_created += 1;
                                let edge = Edge::new(
                                    file_node_id,
                                    lib_node.id.expect("upsert_node always assigns an id"),
                                    "imports_library",
                                );
                                store.upsert_edge(&edge)?;
                                relationships_created += 1;
                            }
                            ImportTarget::Internal(target_path) => {
                                let target_identifier = identifier::for_file(&target_path);
                                let target_node = match store.get_node_by_identifier(&target_identifier)? {
                                    Some(existing) => existing,
                                    None => {
                                        unresolved_internal_paths.push(target_path.clone());
                                        let placeholder = Node::new(
                                            &target_identifier,
                                            NodeType::File,
                                            &target_path,
                                            &target_path,
                                            language.as_str(),
                                        );
                                        let node = store.upsert_node(&placeholder)?;
                                        nodes_created += 1;
                                        node
                                    }
                                };
                                let edge = Edge::new(
                                    file_node_id,
                                    target_node.id.expect("upsert_node always assigns an id"),
                                    "imports_file",
                                );
                                store.upsert_edge(&edge)?;
                                relationships_created += 1;
                            }
                        }
                    }
                    ResultRecord::Export { name, span } => {
                        let export_identifier = identifier::for_export(&path, name);
                        let export_node = Node::new(
                            &export_identifier,
                            NodeType::Export,
                            name,
                            &path,
                            language.as_str(),
                        )
                        .with_position(position_from_span(*span));
                        let export_node = store.upsert_node(&export_node)?;
                        nodes_created += 1;
                        let edge = Edge::new(
                            file_node_id,
                            export_node.id.expect("upsert_node always assigns an id"),
                            "exports_to",
                        );
                        store.upsert_edge(&edge)?;
                        relationships_created += 1;
                    }
                    ResultRecord::Declaration {
                        declaration_kind,
                        name,
                        scope,
                        span,
                        ..
                    } => {
                        let decl_identifier = declaration_identifier(
                            &path,
                            *declaration_kind,
                            scope.as_deref(),
                            name,
                            span.start_line,
                        );
                        let decl_node = Node::new(
                            &decl_identifier,
                            node_type_for_declaration(*declaration_kind),
                            name,
                            &path,
                            language.as_str(),
                        )
                        .with_position(position_from_span(*span));
                        let decl_node = store.upsert_node(&decl_node)?;
                        nodes_created += 1;
                        let edge = Edge::new(
                            file_node_id,
                            decl_node.id.expect("upsert_node always assigns an id"),
                            "declares",
                        );
                        store.upsert_edge(&edge)?;
                        relationships_created += 1;
                    }
                    ResultRecord::Reference { name, reference_kind, .. } => {
                        // References are recorded as diagnostics only: resolving a
                        // reference to its declaring node requires a symbol table
                        // this pass does not build (SPEC_FULL.md names `calls`/
                        // `uses`/etc as edge types the inference layer can attach
                        // once a caller supplies resolved reference targets).
                        warnings.push(format!(
                            "unresolved {reference_kind:?} reference to '{name}' in {path}"
                        ));
                    }
                }
            }
            nodes_created += 1; // the file node itself
            Ok(())
        })?;

        Ok(FileAnalysisResult {
            nodes_created,
            relationships_created,
            warnings,
            unresolved_internal_paths,
        })
    }

    /// Walk `root`, analyzing every file whose language is both tree-sitter-
    /// supported and present in `supported_languages`
    /// (SPEC_FULL.md §4.8 "Project-wide orchestration" / §6.3
    /// `supported_languages`). Honors `.gitignore` via the `ignore` crate plus
    /// a caller-supplied glob exclude set.
    pub fn analyze_project(
        &self,
        store: &SqliteGraphStore,
        root: &Path,
        exclude_globs: &globset::GlobSet,
        supported_languages: &HashSet<Language>,
        edge_types_to_clean: &HashSet<String>,
        max_successive_uses_before_recreate: u32,
        parallel: bool,
    ) -> Result<ProjectAnalysisResult, AnalyzerError> {
        let files = self.collect_files(root, exclude_globs, supported_languages);

        let per_file: Vec<Result<(String, FileAnalysisResult), AnalyzerError>> = if parallel {
            // Parsing/extraction is CPU-bound and safe to run across threads;
            // each file analysis builds its own ParserPool/QueryEngine since
            // neither is thread-safe (SPEC_FULL.md §5's "one Parser Pool per
            // worker thread" discipline), and store writes still serialize
            // through `with_transaction`'s transaction-scope lock.
            files
                .par_iter()
                .map(|(abs_path, rel_path)| {
                    self.analyze_one(
                        store,
                        abs_path,
                        rel_path,
                        edge_types_to_clean,
                        max_successive_uses_before_recreate,
                    )
                })
                .collect()
        } else {
            files
                .iter()
                .map(|(abs_path, rel_path)| {
                    self.analyze_one(
                        store,
                        abs_path,
                        rel_path,
                        edge_types_to_clean,
                        max_successive_uses_before_recreate,
                    )
                })
                .collect()
        };

        let mut aggregate = ProjectAnalysisResult::default();
        for result in per_file {
            match result {
                Ok((_, file_result)) => aggregate.absorb(file_result),
                Err(e) => aggregate.warnings.push(e.to_string()),
            }
        }
        Ok(aggregate)
    }

    fn analyze_one(
        &self,
        store: &SqliteGraphStore,
        abs_path: &Path,
        rel_path: &str,
        edge_types_to_clean: &HashSet<String>,
        max_successive_uses_before_recreate: u32,
    ) -> Result<(String, FileAnalysisResult), AnalyzerError> {
        let source_text = std::fs::read_to_string(abs_path)?;
        let mut pool = ParserPool::new(max_successive_uses_before_recreate);
        let mut engine = QueryEngine::new();
        let result = self.analyze_file(
            &mut pool,
            &mut engine,
            store,
            edge_types_to_clean,
            rel_path,
            &source_text,
        )?;
        Ok((rel_path.to_string(), result))
    }

    fn collect_files(
        &self,
        root: &Path,
        exclude_globs: &globset::GlobSet,
        supported_languages: &HashSet<Language>,
    ) -> Vec<(std::path::PathBuf, String)> {
        let mut files = Vec::new();
        let walker = ignore::WalkBuilder::new(root)
            .follow_links(false)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "error walking directory");
                    continue;
                }
            };
            let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let path = entry.path();
            let Some(language) = Language::from_path(path) else {
                continue;
            };
            if !supported_languages.contains(&language) {
                continue;
            }
            let rel_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            if exclude_globs.is_match(&rel_path) {
                continue;
            }
            files.push((path.to_path_buf(), rel_path));
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));
        files
    }
}
