//! Error taxonomy for the code graph core.
//!
//! Each component defines its own error enum; [`CodeGraphError`] composes them
//! at the crate boundary so callers that don't care about the distinction can
//! use a single type.

use thiserror::Error;

/// Errors raised by the [`crate::parser_pool::ParserPool`].
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("unsupported language for file: {0}")]
    UnsupportedLanguage(String),

    #[error("failed to set tree-sitter language: {0}")]
    LanguageSet(String),

    #[error("parser rejected input and produced no tree (language: {0})")]
    ParseFailed(String),

    #[error("io error reading source: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the Query Registry / Query Engine / Custom-Key Mapper.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no query registered under name '{0}'")]
    QueryNotFound(String),

    #[error("query '{name}' is not registered for language '{language}'")]
    LanguageMismatch { name: String, language: String },

    #[error("failed to compile query '{name}': {source}")]
    QueryCompile {
        name: String,
        source: tree_sitter::QueryError,
    },

    #[error("processor for query '{name}' failed: {message}")]
    ProcessorFailure { name: String, message: String },

    #[error("mapper entry '{user_key}' references unknown query '{query_name}'")]
    InvalidMapping {
        user_key: String,
        query_name: String,
    },
}

/// Errors raised by the [`crate::edge_types::EdgeTypeRegistry`].
#[derive(Debug, Error)]
pub enum EdgeTypeError {
    #[error("edge type '{0}' is already registered")]
    DuplicateName(String),

    #[error("edge type '{name}' references unknown parent '{parent}'")]
    UnknownParent { name: String, parent: String },

    #[error("edge-type hierarchy contains a cycle reachable from '{0}'")]
    HierarchyCycle(String),

    #[error("core edge type '{0}' is missing or was modified")]
    CoreTypeMissing(String),
}

/// Errors raised by the [`crate::store`] module.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("edge type '{0}' is not registered in the edge-type registry")]
    EdgeTypeUnknown(String),

    #[error("node referenced by edge does not exist: {0}")]
    OrphanEdge(String),

    #[error("underlying store rejected the operation: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to (de)serialize stored metadata: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised by the [`crate::analyzer`] module.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Parse(#[from] ParserError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("analysis was cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the [`crate::inference`] module.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown edge type referenced in inference query: {0}")]
    UnknownEdgeType(String),

    #[error("inference was cancelled")]
    Cancelled,
}

/// Crate-level error uniting every component's error type.
#[derive(Debug, Error)]
pub enum CodeGraphError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    EdgeType(#[from] EdgeTypeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = CodeGraphError> = std::result::Result<T, E>;
