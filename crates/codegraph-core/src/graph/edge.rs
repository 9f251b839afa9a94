//! The `Edge` (relationship) entity (SPEC_FULL.md §3).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted edge record. `type` is a string drawn from the
/// [`crate::edge_types::EdgeTypeRegistry`] rather than a closed enum, since
/// the registry is itself extensible at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: Option<i64>,
    pub from_node_id: i64,
    pub to_node_id: i64,
    pub edge_type: String,
    pub metadata: BTreeMap<String, Value>,
}

impl Edge {
    pub fn new(from_node_id: i64, to_node_id: i64, edge_type: impl Into<String>) -> Self {
        Self {
            id: None,
            from_node_id,
            to_node_id,
            edge_type: edge_type.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// An edge inferred by the [`crate::inference`] engine rather than read
/// directly from storage; carries provenance about how it was derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredEdge {
    pub from_node_id: i64,
    pub to_node_id: i64,
    pub edge_type: String,
    pub path: InferencePath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferencePath {
    pub edge_ids: Vec<i64>,
    pub depth: u32,
    pub inference_type: InferenceType,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceType {
    Hierarchical,
    Transitive,
    Inheritable,
}

impl InferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceType::Hierarchical => "hierarchical",
            InferenceType::Transitive => "transitive",
            InferenceType::Inheritable => "inheritable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_builder_sets_metadata() {
        let edge = Edge::new(1, 2, "imports").with_metadata("isExternal", Value::Bool(true));
        assert_eq!(edge.metadata.get("isExternal"), Some(&Value::Bool(true)));
    }
}
