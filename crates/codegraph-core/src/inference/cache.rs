//! Materialized inference cache (SPEC_FULL.md §4.9 "Cache" / §6.1
//! `inference_cache` table): a bounded in-memory [`lru::LruCache`] sitting in
//! front of the persistent table, matching the teacher core crate's own use
//! of `lru` for bounded caches. `SqliteGraphStore::cache_put`/`cache_get`/
//! `cache_invalidate` own the persistence; this module owns the strategy
//! (eager/lazy/manual) and the memo layer.

use std::num::NonZeroUsize;
use std::str::FromStr;

use lru::LruCache;
use parking_lot::Mutex;

use crate::error::InferenceError;
use crate::graph::{InferencePath, InferenceType, InferredEdge};
use crate::store::SqliteGraphStore;

/// When the materialized cache is recomputed relative to an edge change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStrategy {
    /// Recompute immediately on every edge insert/update/delete that
    /// participates in an inferred chain.
    Eager,
    /// Invalidate on change; recompute lazily on the next read that misses.
    Lazy,
    /// Never recompute implicitly; the caller must invoke `sync_cache()`.
    Manual,
}

impl FromStr for CacheStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eager" => Ok(CacheStrategy::Eager),
            "lazy" => Ok(CacheStrategy::Lazy),
            "manual" => Ok(CacheStrategy::Manual),
            other => Err(format!("unknown inference cache strategy '{other}'")),
        }
    }
}

impl std::fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CacheStrategy::Eager => "eager",
            CacheStrategy::Lazy => "lazy",
            CacheStrategy::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    from_node_id: i64,
    edge_type: String,
    inference_type: &'static str,
}

const MEMO_CAPACITY: usize = 1024;

/// The query-side half of the materialized cache: a bounded LRU memo backed
/// by the store's `inference_cache` table. Does not itself decide *when* to
/// recompute on edge changes — [`crate::inference::InferenceEngine`] drives
/// that from `strategy()`.
pub struct InferenceCache {
    strategy: CacheStrategy,
    memo: Mutex<LruCache<CacheKey, Vec<InferredEdge>>>,
}

impl InferenceCache {
    pub fn new(strategy: CacheStrategy) -> Self {
        Self {
            strategy,
            memo: Mutex::new(LruCache::new(NonZeroUsize::new(MEMO_CAPACITY).unwrap())),
        }
    }

    pub fn strategy(&self) -> CacheStrategy {
        self.strategy
    }

    /// `Some(edges)` if a result is already cached (memo or persisted
    /// table); `None` if the caller must compute fresh.
    pub fn lookup(
        &self,
        store: &SqliteGraphStore,
        from_node_id: i64,
        edge_type: &str,
        inference_type: InferenceType,
    ) -> Result<Option<Vec<InferredEdge>>, InferenceError> {
        let key = CacheKey {
            from_node_id,
            edge_type: edge_type.to_string(),
            inference_type: inference_type.as_str(),
        };
        if let Some(hit) = self.memo.lock().get(&key).cloned() {
            return Ok(Some(hit));
        }
        match store.cache_get(from_node_id, edge_type, inference_type.as_str())? {
            Some(paths) => {
                let edges = paths_to_edges(from_node_id, edge_type, inference_type, paths);
                self.memo.lock().put(key, edges.clone());
                Ok(Some(edges))
            }
            None => Ok(None),
        }
    }

    /// Persist a freshly computed result, both to the store's table and the
    /// in-memory memo.
    pub fn store_result(
        &self,
        store: &SqliteGraphStore,
        from_node_id: i64,
        edge_type: &str,
        inference_type: InferenceType,
        edges: &[InferredEdge],
    ) -> Result<(), InferenceError> {
        let paths: Vec<(i64, u32, Vec<i64>)> = edges
            .iter()
            .map(|e| (e.to_node_id, e.path.depth, e.path.edge_ids.clone()))
            .collect();
        store.cache_put(from_node_id, edge_type, inference_type.as_str(), &paths)?;
        let key = CacheKey {
            from_node_id,
            edge_type: edge_type.to_string(),
            inference_type: inference_type.as_str(),
        };
        self.memo.lock().put(key, edges.to_vec());
        Ok(())
    }

    /// Drop every cached result rooted at `node_id`, in both layers. Called
    /// whenever an edge touching `node_id` is written.
    pub fn invalidate_node(&self, store: &SqliteGraphStore, node_id: i64) -> Result<(), InferenceError> {
        store.cache_invalidate(node_id)?;
        let mut memo = self.memo.lock();
        let stale: Vec<CacheKey> = memo
            .iter()
            .filter(|(k, _)| k.from_node_id == node_id)
            .map(|(k, _)| k.clone())
            .collect();
        for key in stale {
            memo.pop(&key);
        }
        Ok(())
    }

    pub fn clear(&self, store: &SqliteGraphStore) -> Result<(), InferenceError> {
        store.cache_clear()?;
        self.memo.lock().clear();
        Ok(())
    }
}

fn paths_to_edges(
    from_node_id: i64,
    edge_type: &str,
    inference_type: InferenceType,
    paths: Vec<(i64, u32, Vec<i64>)>,
) -> Vec<InferredEdge> {
    paths
        .into_iter()
        .map(|(to_node_id, depth, edge_ids)| InferredEdge {
            from_node_id,
            to_node_id,
            edge_type: edge_type.to_string(),
            path: InferencePath {
                edge_ids,
                depth,
                inference_type,
                description: format!("cached {} result", inference_type.as_str()),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_round_trips_through_str() {
        for s in ["eager", "lazy", "manual"] {
            assert_eq!(CacheStrategy::from_str(s).unwrap().to_string(), s);
        }
        assert!(CacheStrategy::from_str("bogus").is_err());
    }

    #[test]
    fn store_then_lookup_hits_memo_without_touching_store_again() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let cache = InferenceCache::new(CacheStrategy::Lazy);
        let edges = vec![InferredEdge {
            from_node_id: 1,
            to_node_id: 2,
            edge_type: "depends_on".to_string(),
            path: InferencePath {
                edge_ids: vec![7],
                depth: 1,
                inference_type: InferenceType::Transitive,
                description: "1 hop".to_string(),
            },
        }];
        cache
            .store_result(&store, 1, "depends_on", InferenceType::Transitive, &edges)
            .unwrap();
        let hit = cache
            .lookup(&store, 1, "depends_on", InferenceType::Transitive)
            .unwrap();
        assert_eq!(hit, Some(edges));
    }

    #[test]
    fn invalidate_node_clears_persisted_and_memoized_entries() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let cache = InferenceCache::new(CacheStrategy::Eager);
        cache
            .store_result(&store, 1, "depends_on", InferenceType::Transitive, &[])
            .unwrap();
        assert!(cache
            .lookup(&store, 1, "depends_on", InferenceType::Transitive)
            .unwrap()
            .is_some());
        cache.invalidate_node(&store, 1).unwrap();
        assert!(cache
            .lookup(&store, 1, "depends_on", InferenceType::Transitive)
            .unwrap()
            .is_none());
    }
}
