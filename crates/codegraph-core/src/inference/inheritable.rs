//! Inheritable inference (SPEC_FULL.md §4.9): "`parent(A,B)` via a type
//! whose `inheritable` flag is true AND `rel(B,C)` via some target type ⇒
//! `rel(A,C)` is inferred."

use std::collections::HashSet;

use crate::edge_types::EdgeTypeRegistry;
use crate::error::InferenceError;
use crate::graph::{InferencePath, InferenceType, InferredEdge};
use crate::store::{EdgeFilter, SqliteGraphStore};

#[derive(Debug, Clone)]
pub struct InheritableOptions {
    pub max_inheritance_depth: u32,
}

impl Default for InheritableOptions {
    fn default() -> Self {
        Self {
            max_inheritance_depth: 5,
        }
    }
}

struct Frame {
    node: i64,
    depth: u32,
    edge_ids: Vec<i64>,
}

/// For each `A —parent_type→ B` path up to `max_inheritance_depth`, emit
/// `A —inheritable_type→ X` for every existing `B —inheritable_type→ X`.
pub fn query_inheritable(
    store: &SqliteGraphStore,
    registry: &EdgeTypeRegistry,
    from_node_id: i64,
    parent_type: &str,
    inheritable_type: &str,
    options: &InheritableOptions,
) -> Result<Vec<InferredEdge>, InferenceError> {
    let parent_def = registry
        .get(parent_type)
        .ok_or_else(|| InferenceError::UnknownEdgeType(parent_type.to_string()))?;
    if !registry.contains(inheritable_type) {
        return Err(InferenceError::UnknownEdgeType(inheritable_type.to_string()));
    }
    if !parent_def.inheritable {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    let mut visited = HashSet::from([from_node_id]);
    let mut frontier = vec![Frame {
        node: from_node_id,
        depth: 0,
        edge_ids: Vec::new(),
    }];

    while let Some(frame) = frontier.pop() {
        if frame.depth >= options.max_inheritance_depth {
            continue;
        }
        let parent_edges = store.find_edges(&EdgeFilter {
            types: Some(vec![parent_type.to_string()]),
            from_ids: Some(vec![frame.node]),
            ..Default::default()
        })?;

        for parent_edge in parent_edges {
            let b = parent_edge.to_node_id;
            if !visited.insert(b) {
                continue;
            }
            let depth = frame.depth + 1;
            let mut edge_ids = frame.edge_ids.clone();
            edge_ids.push(parent_edge.id.expect("edge read back from the store always has an id"));

            let propagated = store.find_edges(&EdgeFilter {
                types: Some(vec![inheritable_type.to_string()]),
                from_ids: Some(vec![b]),
                ..Default::default()
            })?;
            for rel in propagated {
                let mut path_edges = edge_ids.clone();
                path_edges.push(rel.id.expect("edge read back from the store always has an id"));
                results.push(InferredEdge {
                    from_node_id,
                    to_node_id: rel.to_node_id,
                    edge_type: inheritable_type.to_string(),
                    path: InferencePath {
                        edge_ids: path_edges,
                        depth,
                        inference_type: InferenceType::Inheritable,
                        description: format!(
                            "inherited '{inheritable_type}' via {depth} '{parent_type}' hop(s)"
                        ),
                    },
                });
            }

            frontier.push(Frame {
                node: b,
                depth,
                edge_ids,
            });
        }
    }

    Ok(results)
}
