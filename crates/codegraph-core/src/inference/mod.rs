//! Inference Engine (SPEC_FULL.md §4.9): three read-only inference modes
//! over the Graph Store — hierarchical (edge-type expansion), transitive
//! (cycle-safe depth-capped path walk), inheritable (parent-type
//! propagation) — plus an optional materialized cache and the `infer_all`
//! aggregate.
//!
//! No single teacher module implements this; the recursive-traversal-with-
//! visited-set shape follows the cycle-avoidance discipline used across the
//! teacher's own tree/graph walks, hand-rolled rather than forced onto a
//! generic graph-library algorithm since the per-path provenance
//! (`InferencePath`) doesn't map onto petgraph's built-in traversals.

mod cache;
mod hierarchical;
mod inheritable;
mod transitive;

pub use cache::{CacheStrategy, InferenceCache};
pub use hierarchical::HierarchicalOptions;
pub use inheritable::InheritableOptions;
pub use transitive::TransitiveOptions;

use crate::edge_types::EdgeTypeRegistry;
use crate::error::InferenceError;
use crate::graph::{Edge, InferenceType, InferredEdge};
use crate::store::SqliteGraphStore;

/// `infer_all`'s aggregate output (SPEC_FULL.md §4.9, §6.2).
#[derive(Debug, Clone)]
pub struct InferenceResult {
    pub direct: Vec<Edge>,
    pub hierarchical: Vec<Edge>,
    pub transitive: Vec<InferredEdge>,
    pub inheritable: Vec<InferredEdge>,
    pub statistics: InferenceStatistics,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceStatistics {
    pub direct_count: usize,
    pub hierarchical_count: usize,
    pub transitive_count: usize,
    pub inheritable_count: usize,
}

/// Tunables shared by every query, mirroring `CodeGraphConfig`'s
/// `inference.*` options (§6.3) without creating a dependency on the config
/// module from this one.
#[derive(Debug, Clone)]
pub struct InferenceEngineOptions {
    pub cache_enabled: bool,
    pub cache_strategy: CacheStrategy,
    pub default_max_path_length: u32,
    pub default_max_inheritance_depth: u32,
    pub detect_cycles: bool,
}

impl Default for InferenceEngineOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_strategy: CacheStrategy::Lazy,
            default_max_path_length: 10,
            default_max_inheritance_depth: 5,
            detect_cycles: true,
        }
    }
}

/// The two relation names `infer_all` aggregates over when the caller
/// doesn't name a specific edge type: `depends_on` for the
/// hierarchical/transitive modes (the root of the dependency-relation
/// forest) and `contains`/`uses` for the inheritable mode (the canonical
/// containment-propagates-usage pairing named in SPEC_FULL.md §4.9's own
/// inheritable example).
const INFER_ALL_TRANSITIVE_TYPE: &str = "depends_on";
const INFER_ALL_PARENT_TYPE: &str = "contains";
const INFER_ALL_INHERITABLE_TYPE: &str = "uses";

/// Cache key used for inheritable results, since the persisted table's
/// `(from_node_id, edge_type, inference_type)` key has no column for the
/// parent-type half of an inheritable query's `(parent_type,
/// inheritable_type)` pair.
fn inheritable_cache_key(parent_type: &str, inheritable_type: &str) -> String {
    format!("{parent_type}>{inheritable_type}")
}

pub struct InferenceEngine {
    registry: EdgeTypeRegistry,
    cache: Option<InferenceCache>,
    default_max_path_length: u32,
    default_max_inheritance_depth: u32,
    detect_cycles: bool,
}

impl InferenceEngine {
    pub fn new(registry: EdgeTypeRegistry, options: InferenceEngineOptions) -> Self {
        Self {
            registry,
            cache: options
                .cache_enabled
                .then(|| InferenceCache::new(options.cache_strategy)),
            default_max_path_length: options.default_max_path_length,
            default_max_inheritance_depth: options.default_max_inheritance_depth,
            detect_cycles: options.detect_cycles,
        }
    }

    pub fn registry(&self) -> &EdgeTypeRegistry {
        &self.registry
    }

    /// Hierarchical inference has no `from_node_id` and so cannot be keyed
    /// into the `inference_cache` table's schema — it is always computed
    /// live directly against the store.
    pub fn query_hierarchical(
        &self,
        store: &SqliteGraphStore,
        edge_type: &str,
        options: &HierarchicalOptions,
    ) -> Result<Vec<Edge>, InferenceError> {
        hierarchical::query_hierarchical(store, &self.registry, edge_type, options)
    }

    pub fn query_transitive(
        &self,
        store: &SqliteGraphStore,
        from_node_id: i64,
        edge_type: &str,
        options: &TransitiveOptions,
    ) -> Result<Vec<InferredEdge>, InferenceError> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lookup(store, from_node_id, edge_type, InferenceType::Transitive)? {
                return Ok(hit);
            }
        }
        let computed = transitive::query_transitive(store, &self.registry, from_node_id, edge_type, options)?;
        if let Some(cache) = &self.cache {
            cache.store_result(store, from_node_id, edge_type, InferenceType::Transitive, &computed)?;
        }
        Ok(computed)
    }

    pub fn query_inheritable(
        &self,
        store: &SqliteGraphStore,
        from_node_id: i64,
        parent_type: &str,
        inheritable_type: &str,
        options: &InheritableOptions,
    ) -> Result<Vec<InferredEdge>, InferenceError> {
        let cache_key = inheritable_cache_key(parent_type, inheritable_type);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lookup(store, from_node_id, &cache_key, InferenceType::Inheritable)? {
                return Ok(hit);
            }
        }
        let computed = inheritable::query_inheritable(
            store,
            &self.registry,
            from_node_id,
            parent_type,
            inheritable_type,
            options,
        )?;
        if let Some(cache) = &self.cache {
            cache.store_result(store, from_node_id, &cache_key, InferenceType::Inheritable, &computed)?;
        }
        Ok(computed)
    }

    /// Invalidate every cached result rooted at either endpoint of `edge`.
    /// Callers (the `CodeGraph` facade) invoke this after any edge
    /// insert/update/delete whose type participates in an inferred chain.
    /// `Manual`-strategy engines ignore this; the caller owns cache staleness
    /// and must call [`Self::sync_cache`] explicitly.
    pub fn invalidate_for_edge_change(
        &self,
        store: &SqliteGraphStore,
        edge: &Edge,
    ) -> Result<(), InferenceError> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        if cache.strategy() == CacheStrategy::Manual {
            return Ok(());
        }
        cache.invalidate_node(store, edge.from_node_id)?;
        cache.invalidate_node(store, edge.to_node_id)?;
        Ok(())
    }

    /// Invalidate every cached result rooted at `node_id` directly, without
    /// requiring a specific [`Edge`] to hang the call off of — used when a
    /// node's own outgoing edges changed shape (e.g. re-analysis cleared and
    /// rewrote them) rather than a single edge being inserted or removed.
    pub fn invalidate_node(&self, store: &SqliteGraphStore, node_id: i64) -> Result<(), InferenceError> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        if cache.strategy() == CacheStrategy::Manual {
            return Ok(());
        }
        cache.invalidate_node(store, node_id)
    }

    /// Manual-strategy escape hatch: drop the whole materialized cache so
    /// the next read recomputes from scratch. A no-op when caching is
    /// disabled.
    pub fn sync_cache(&self, store: &SqliteGraphStore) -> Result<(), InferenceError> {
        if let Some(cache) = &self.cache {
            cache.clear(store)?;
        }
        Ok(())
    }

    pub fn infer_all(&self, store: &SqliteGraphStore, from_node_id: i64) -> Result<InferenceResult, InferenceError> {
        let direct = store.find_edges(&crate::store::EdgeFilter {
            from_ids: Some(vec![from_node_id]),
            ..Default::default()
        })?;

        let hierarchical_all = self.query_hierarchical(
            store,
            INFER_ALL_TRANSITIVE_TYPE,
            &HierarchicalOptions::default(),
        )?;
        let hierarchical: Vec<Edge> = hierarchical_all
            .into_iter()
            .filter(|e| e.from_node_id == from_node_id)
            .collect();

        let transitive = self.query_transitive(
            store,
            from_node_id,
            INFER_ALL_TRANSITIVE_TYPE,
            &TransitiveOptions {
                max_path_length: self.default_max_path_length,
                detect_cycles: self.detect_cycles,
                relationship_types: None,
            },
        )?;

        let inheritable = self.query_inheritable(
            store,
            from_node_id,
            INFER_ALL_PARENT_TYPE,
            INFER_ALL_INHERITABLE_TYPE,
            &InheritableOptions {
                max_inheritance_depth: self.default_max_inheritance_depth,
            },
        )?;

        let statistics = InferenceStatistics {
            direct_count: direct.len(),
            hierarchical_count: hierarchical.len(),
            transitive_count: transitive.len(),
            inheritable_count: inheritable.len(),
        };

        Ok(InferenceResult {
            direct,
            hierarchical,
            transitive,
            inheritable,
            statistics,
        })
    }
}
