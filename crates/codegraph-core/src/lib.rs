//! codegraph-core - multi-language code knowledge graph extraction and
//! inference over tree-sitter AST parsing
//!
//! This crate provides:
//! - Tree-sitter based extraction of declarations, imports and exports
//! - A persistent, identifier-stable SQLite graph store
//! - An edge-type hierarchy and an inference engine (hierarchical,
//!   transitive, inheritable) with an optional materialized cache
//! - A read-only query facade over the store and inference engine

pub mod analyzer;
pub mod codegraph;
pub mod config;
pub mod edge_types;
pub mod error;
pub mod graph;
pub mod identifier;
pub mod inference;
pub mod language;
pub mod parser_pool;
pub mod queries;
pub mod query_facade;
pub mod resolver;
pub mod store;

pub use codegraph::{default_db_path, CodeGraph};
pub use config::{CodeGraphConfig, ConfigError};
pub use edge_types::{EdgeTypeDef, EdgeTypeRegistry};
pub use error::{AnalyzerError, CodeGraphError, EdgeTypeError, InferenceError, ParserError, QueryError, Result, StoreError};
pub use graph::{Edge, InferencePath, InferenceType, InferredEdge, Node, NodeType, Position};
pub use inference::{
    CacheStrategy, HierarchicalOptions, InferenceCache, InferenceEngine, InferenceEngineOptions,
    InferenceResult, InferenceStatistics, InheritableOptions, TransitiveOptions,
};
pub use language::Language;
pub use query_facade::{AllNodes, DependencyCycle, ProjectStats};
pub use store::{EdgeFilter, GraphStats, NodeFilter, SqliteGraphStore};
