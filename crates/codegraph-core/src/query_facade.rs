//! Query Facade (SPEC_FULL.md §4.10): read-side queries composed from the
//! Graph Store and Inference Engine. Grounded on `codeprysm-core/src/graph.rs`'s
//! stats/query helpers on `PetCodeGraph`, adapted to read from the SQLite
//! store instead of an in-memory petgraph structure.

use std::collections::{BTreeMap, HashSet};

use crate::error::{InferenceError, StoreError};
use crate::graph::{Node, NodeType};
use crate::identifier;
use crate::inference::{InferenceEngine, TransitiveOptions};
use crate::store::{EdgeFilter, GraphStats, NodeFilter, SqliteGraphStore};

#[derive(Debug, Clone)]
pub struct AllNodes {
    pub nodes: Vec<Node>,
    pub nodes_by_type: BTreeMap<String, Vec<Node>>,
    pub stats: GraphStats,
}

/// `list_all_nodes()`: every node, grouped by type, plus store-wide stats.
pub fn list_all_nodes(store: &SqliteGraphStore) -> Result<AllNodes, StoreError> {
    let nodes = store.find_nodes(&NodeFilter::default())?;
    let mut nodes_by_type: BTreeMap<String, Vec<Node>> = BTreeMap::new();
    for node in &nodes {
        nodes_by_type
            .entry(node.node_type.as_str().to_string())
            .or_default()
            .push(node.clone());
    }
    let stats = store.stats()?;
    Ok(AllNodes {
        nodes,
        nodes_by_type,
        stats,
    })
}

/// `list_nodes_by_type(type)`.
pub fn list_nodes_by_type(store: &SqliteGraphStore, node_type: NodeType) -> Result<Vec<Node>, StoreError> {
    store.find_nodes(&NodeFilter {
        types: Some(vec![node_type.as_str().to_string()]),
        ..Default::default()
    })
}

const DEPENDENCY_EDGE_TYPES: &[&str] = &["imports", "imports_library", "imports_file", "depends_on"];

/// `file_dependencies(path)`: nodes targeted by this file's outgoing
/// `imports`/`depends_on` edges.
pub fn file_dependencies(store: &SqliteGraphStore, file_path: &str) -> Result<Vec<Node>, StoreError> {
    let Some(file_node) = store.get_node_by_identifier(&identifier::for_file(file_path))? else {
        return Ok(Vec::new());
    };
    let edges = store.find_edges(&EdgeFilter {
        types: Some(DEPENDENCY_EDGE_TYPES.iter().map(|s| s.to_string()).collect()),
        from_ids: Some(vec![file_node.id.expect("stored node has an id")]),
        ..Default::default()
    })?;
    resolve_targets(store, edges.iter().map(|e| e.to_node_id))
}

/// `file_dependents(path)`: nodes whose outgoing `imports`/`depends_on`
/// edges target this file. Implemented as a first-class query — the
/// teacher's own "currently empty" stub is not carried forward (SPEC_FULL.md
/// §9 open question 2).
pub fn file_dependents(store: &SqliteGraphStore, file_path: &str) -> Result<Vec<Node>, StoreError> {
    let Some(file_node) = store.get_node_by_identifier(&identifier::for_file(file_path))? else {
        return Ok(Vec::new());
    };
    let edges = store.find_edges(&EdgeFilter {
        types: Some(DEPENDENCY_EDGE_TYPES.iter().map(|s| s.to_string()).collect()),
        to_ids: Some(vec![file_node.id.expect("stored node has an id")]),
        ..Default::default()
    })?;
    resolve_targets(store, edges.iter().map(|e| e.from_node_id))
}

fn resolve_targets(store: &SqliteGraphStore, ids: impl Iterator<Item = i64>) -> Result<Vec<Node>, StoreError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for id in ids {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = store.get_node_by_id(id)? {
            out.push(node);
        }
    }
    Ok(out)
}

/// One detected cycle among file nodes, file-path order following the walk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DependencyCycle {
    pub node_ids: Vec<i64>,
    pub source_files: Vec<String>,
}

/// `circular_dependencies()`: dependency cycles detected by running
/// transitive inference over `depends_on` with cycle detection enabled from
/// every file node, then emitting the closing edge as a cycle rather than
/// silently suppressing it (SPEC_FULL.md §4.10, §9 open question 3 keeps
/// this orthogonal to the inheritable/hierarchical modes).
pub fn circular_dependencies(
    store: &SqliteGraphStore,
    engine: &InferenceEngine,
) -> Result<Vec<DependencyCycle>, InferenceError> {
    let files = store.find_nodes(&NodeFilter {
        types: Some(vec![NodeType::File.as_str().to_string()]),
        ..Default::default()
    })?;

    let mut cycles = Vec::new();
    let mut seen_cycle_keys = HashSet::new();

    for file in &files {
        let from_id = file.id.expect("stored node has an id");
        let direct = store.find_edges(&EdgeFilter {
            types: Some(vec!["depends_on".to_string()]),
            from_ids: Some(vec![from_id]),
            ..Default::default()
        })?;

        for edge in direct {
            // A fresh transitive walk per direct neighbor, with cycle
            // detection disabled along the candidate path so a hop back to
            // `from_id` is reported instead of silently dropped.
            let inferred = engine.query_transitive(
                store,
                edge.to_node_id,
                "depends_on",
                &TransitiveOptions {
                    max_path_length: 10,
                    detect_cycles: false,
                    relationship_types: None,
                },
            )?;
            for back in inferred.iter().filter(|e| e.to_node_id == from_id) {
                let mut node_ids = vec![from_id, edge.to_node_id];
                // `back.path.edge_ids` doesn't carry intermediate node ids,
                // only edge ids; for reporting purposes the cycle's
                // identity is its participant node set, not its edge path.
                node_ids.push(back.to_node_id);
                node_ids.dedup();
                let mut key: Vec<i64> = node_ids.clone();
                key.sort_unstable();
                if !seen_cycle_keys.insert(key) {
                    continue;
                }
                let source_files = node_ids
                    .iter()
                    .filter_map(|id| store.get_node_by_id(*id).ok().flatten())
                    .map(|n| n.source_file)
                    .collect();
                cycles.push(DependencyCycle { node_ids, source_files });
            }
        }
    }

    Ok(cycles)
}

#[derive(Debug, Clone, Default)]
pub struct ProjectStats {
    pub total_nodes: i64,
    pub total_relationships: i64,
    pub by_node_type: BTreeMap<String, i64>,
    pub by_edge_type: BTreeMap<String, i64>,
    pub by_language: BTreeMap<String, i64>,
}

/// `project_stats()`.
pub fn project_stats(store: &SqliteGraphStore) -> Result<ProjectStats, StoreError> {
    let stats = store.stats()?;
    Ok(ProjectStats {
        total_nodes: stats.total_nodes,
        total_relationships: stats.total_edges,
        by_node_type: stats.by_node_type,
        by_edge_type: stats.by_edge_type,
        by_language: stats.by_language,
    })
}

/// Used by `list_nodes_by_type`'s CLI-facing counterpart to accept a
/// free-form `--type` string. Kept here rather than on `NodeType` itself
/// since it's a facade-level convenience, not a data-model concern.
pub fn parse_node_type(raw: &str) -> Option<NodeType> {
    NodeType::from_str_lenient(raw)
}
