//! Hierarchical inference (SPEC_FULL.md §4.9): "querying type T yields
//! direct edges whose type ∈ descendants(T)", optionally unioned with
//! ancestors.

use std::collections::HashSet;

use crate::edge_types::EdgeTypeRegistry;
use crate::error::InferenceError;
use crate::graph::Edge;
use crate::store::{EdgeFilter, SqliteGraphStore};

/// Options for [`query_hierarchical`].
#[derive(Debug, Clone)]
pub struct HierarchicalOptions {
    pub include_children: bool,
    pub include_parents: bool,
    /// Bounds how many hierarchy levels `descendants`/`ancestors` expansion
    /// walks; `None` means unbounded (the whole forest below/above `edge_type`).
    pub max_depth: Option<u32>,
}

impl Default for HierarchicalOptions {
    fn default() -> Self {
        Self {
            include_children: true,
            include_parents: false,
            max_depth: None,
        }
    }
}

fn descendants_within(registry: &EdgeTypeRegistry, type_name: &str, max_depth: Option<u32>) -> HashSet<String> {
    let mut out = HashSet::new();
    out.insert(type_name.to_string());
    let mut frontier = vec![(type_name.to_string(), 0u32)];
    while let Some((current, depth)) = frontier.pop() {
        if let Some(limit) = max_depth {
            if depth >= limit {
                continue;
            }
        }
        for child in registry.children(&current) {
            if out.insert(child.to_string()) {
                frontier.push((child.to_string(), depth + 1));
            }
        }
    }
    out
}

fn ancestors_within(registry: &EdgeTypeRegistry, type_name: &str, max_depth: Option<u32>) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut current = registry.get(type_name).and_then(|def| def.parent.clone());
    let mut depth = 0u32;
    while let Some(name) = current {
        if let Some(limit) = max_depth {
            if depth >= limit {
                break;
            }
        }
        let next = registry.get(&name).and_then(|def| def.parent.clone());
        out.insert(name);
        current = next;
        depth += 1;
    }
    out
}

/// Direct edges whose type lies in `descendants(edge_type)` (and/or
/// `ancestors(edge_type)`), not a walked path — this is a type-hierarchy
/// expansion of the edge-type filter, unrelated to node containment.
pub fn query_hierarchical(
    store: &SqliteGraphStore,
    registry: &EdgeTypeRegistry,
    edge_type: &str,
    options: &HierarchicalOptions,
) -> Result<Vec<Edge>, InferenceError> {
    if !registry.contains(edge_type) {
        return Err(InferenceError::UnknownEdgeType(edge_type.to_string()));
    }

    let mut types = HashSet::new();
    types.insert(edge_type.to_string());
    if options.include_children {
        types.extend(descendants_within(registry, edge_type, options.max_depth));
    }
    if options.include_parents {
        types.extend(ancestors_within(registry, edge_type, options.max_depth));
    }

    let filter = EdgeFilter {
        types: Some(types.into_iter().collect()),
        ..Default::default()
    };
    Ok(store.find_edges(&filter)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node, NodeType};

    fn new_store_with_nodes(n: i64) -> SqliteGraphStore {
        let store = SqliteGraphStore::in_memory().unwrap();
        for i in 0..n {
            store
                .upsert_node(&Node::new(format!("n{i}"), NodeType::File, format!("n{i}"), "f.ts", "typescript"))
                .unwrap();
        }
        store
    }

    #[test]
    fn include_children_unions_imports_subtypes() {
        let store = new_store_with_nodes(3);
        store.upsert_edge(&Edge::new(1, 2, "imports_library")).unwrap();
        store.upsert_edge(&Edge::new(1, 3, "imports_file")).unwrap();
        let registry = EdgeTypeRegistry::with_core_types();

        let edges = query_hierarchical(&store, &registry, "imports", &HierarchicalOptions::default()).unwrap();
        let types: HashSet<_> = edges.iter().map(|e| e.edge_type.clone()).collect();
        assert_eq!(types, HashSet::from(["imports_library".to_string(), "imports_file".to_string()]));
    }

    #[test]
    fn unknown_edge_type_is_rejected() {
        let store = new_store_with_nodes(1);
        let registry = EdgeTypeRegistry::with_core_types();
        let err = query_hierarchical(&store, &registry, "not_a_type", &HierarchicalOptions::default()).unwrap_err();
        assert!(matches!(err, InferenceError::UnknownEdgeType(_)));
    }

    #[test]
    fn max_depth_zero_excludes_all_children() {
        let store = new_store_with_nodes(2);
        store.upsert_edge(&Edge::new(1, 2, "imports_library")).unwrap();
        let registry = EdgeTypeRegistry::with_core_types();
        let options = HierarchicalOptions {
            include_children: true,
            include_parents: false,
            max_depth: Some(0),
        };
        let edges = query_hierarchical(&store, &registry, "imports", &options).unwrap();
        assert!(edges.is_empty());
    }
}
