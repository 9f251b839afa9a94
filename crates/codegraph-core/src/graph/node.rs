//! The `Node` entity (SPEC_FULL.md §3).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::language::Language;

/// The closed set of node types (SPEC_FULL.md §3). Extensible but finite at
/// configuration time; unrecognized strings deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    File,
    Class,
    Interface,
    Function,
    Method,
    Property,
    Variable,
    Constant,
    Type,
    Enum,
    EnumMember,
    Constructor,
    Export,
    Import,
    Library,
    Package,
    ExternalResource,
    MissingFile,
    HeadingSymbol,
    Symbol,
    FileNotFound,
    BrokenReference,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::File => "file",
            NodeType::Class => "class",
            NodeType::Interface => "interface",
            NodeType::Function => "function",
            NodeType::Method => "method",
            NodeType::Property => "property",
            NodeType::Variable => "variable",
            NodeType::Constant => "constant",
            NodeType::Type => "type",
            NodeType::Enum => "enum",
            NodeType::EnumMember => "enum_member",
            NodeType::Constructor => "constructor",
            NodeType::Export => "export",
            NodeType::Import => "import",
            NodeType::Library => "library",
            NodeType::Package => "package",
            NodeType::ExternalResource => "external-resource",
            NodeType::MissingFile => "missing-file",
            NodeType::HeadingSymbol => "heading-symbol",
            NodeType::Symbol => "symbol",
            NodeType::FileNotFound => "file_not_found",
            NodeType::BrokenReference => "broken_reference",
        }
    }

    pub fn from_str_lenient(s: &str) -> Option<Self> {
        Some(match s {
            "file" => NodeType::File,
            "class" => NodeType::Class,
            "interface" => NodeType::Interface,
            "function" => NodeType::Function,
            "method" => NodeType::Method,
            "property" => NodeType::Property,
            "variable" => NodeType::Variable,
            "constant" => NodeType::Constant,
            "type" => NodeType::Type,
            "enum" => NodeType::Enum,
            "enum_member" => NodeType::EnumMember,
            "constructor" => NodeType::Constructor,
            "export" => NodeType::Export,
            "import" => NodeType::Import,
            "library" => NodeType::Library,
            "package" => NodeType::Package,
            "external-resource" => NodeType::ExternalResource,
            "missing-file" => NodeType::MissingFile,
            "heading-symbol" => NodeType::HeadingSymbol,
            "symbol" => NodeType::Symbol,
            "file_not_found" => NodeType::FileNotFound,
            "broken_reference" => NodeType::BrokenReference,
            _ => return None,
        })
    }

    /// Is this node type one produced for nodes outside the project (library
    /// packages, builtins, unresolved references)?
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            NodeType::Library
                | NodeType::Package
                | NodeType::ExternalResource
                | NodeType::MissingFile
                | NodeType::FileNotFound
                | NodeType::BrokenReference
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for NodeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NodeType::from_str_lenient(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized node type '{s}'")))
    }
}

/// A source position, when extractable from the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub start_line: Option<u32>,
    pub start_column: Option<u32>,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

/// A persisted node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque store-assigned id; `None` until the node has been upserted.
    pub id: Option<i64>,
    pub identifier: String,
    pub node_type: NodeType,
    pub name: String,
    pub source_file: String,
    pub language: String,
    pub position: Position,
    pub metadata: BTreeMap<String, Value>,
    pub semantic_tags: BTreeSet<String>,
}

impl Node {
    pub fn new(
        identifier: impl Into<String>,
        node_type: NodeType,
        name: impl Into<String>,
        source_file: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            identifier: identifier.into(),
            node_type,
            name: name.into(),
            source_file: source_file.into(),
            language: language.into(),
            position: Position::default(),
            metadata: BTreeMap::new(),
            semantic_tags: BTreeSet::new(),
        }
    }

    pub fn file(identifier: impl Into<String>, path: impl Into<String>, language: Language) -> Self {
        let path = path.into();
        Self::new(identifier, NodeType::File, path.clone(), path, language.as_str())
    }

    pub fn library(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        let mut node = Self::new(identifier, NodeType::Library, name, "library", "external");
        node.metadata
            .insert("isExternal".to_string(), Value::Bool(true));
        node
    }

    pub fn missing_file(identifier: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(identifier, NodeType::MissingFile, path.clone(), path, "external")
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.semantic_tags.insert(tag.into());
        self
    }

    pub fn is_external(&self) -> bool {
        self.node_type.is_external()
            || self
                .metadata
                .get("isExternal")
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }
}
