//! Project-scale integration tests for the testable properties in
//! SPEC_FULL.md §8: idempotent re-analysis, selective edge cleanup, and the
//! transitive/hierarchical inference scenarios exercised against a real
//! multi-file project tree instead of an in-process store.

use std::fs;

use codegraph_core::{CodeGraph, CodeGraphConfig, HierarchicalOptions, TransitiveOptions};
use tempfile::TempDir;

fn write_project(dir: &TempDir) {
    fs::write(
        dir.path().join("a.ts"),
        "import { helper } from './b';\nimport { readFileSync } from 'fs';\n",
    )
    .unwrap();
    fs::write(dir.path().join("b.ts"), "export function helper() {}\n").unwrap();
    fs::write(dir.path().join("c.ts"), "import { helper } from './a';\n").unwrap();
}

#[test]
fn reanalyzing_an_unchanged_project_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
    let exclude = globset::GlobSetBuilder::new().build().unwrap();

    let first = graph.analyze_project(dir.path(), &exclude, false).unwrap();
    let stats_after_first = graph.project_stats().unwrap();

    let second = graph.analyze_project(dir.path(), &exclude, false).unwrap();
    let stats_after_second = graph.project_stats().unwrap();

    assert_eq!(first.files_analyzed, second.files_analyzed);
    assert_eq!(stats_after_first.total_nodes, stats_after_second.total_nodes);
    assert_eq!(
        stats_after_first.total_relationships,
        stats_after_second.total_relationships
    );
}

#[test]
fn supported_languages_filter_excludes_other_source_files() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    fs::write(dir.path().join("main.py"), "import os\n").unwrap();

    let mut config = CodeGraphConfig::default();
    config.supported_languages = vec![codegraph_core::Language::TypeScript];
    let mut graph = CodeGraph::in_memory(config).unwrap();
    let exclude = globset::GlobSetBuilder::new().build().unwrap();

    let result = graph.analyze_project(dir.path(), &exclude, false).unwrap();
    assert_eq!(result.files_analyzed, 3, "only the three .ts files should be walked");
}

#[test]
fn file_dependencies_and_dependents_hold_at_project_scale() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
    let exclude = globset::GlobSetBuilder::new().build().unwrap();
    graph.analyze_project(dir.path(), &exclude, false).unwrap();

    let a = graph.file_dependencies("a.ts").unwrap();
    assert!(a.iter().any(|n| n.source_file == "b.ts"));
    let a_dependents = graph.file_dependents("a.ts").unwrap();
    assert!(a_dependents.iter().any(|n| n.source_file == "c.ts"));
}

#[test]
fn hierarchical_inference_unions_import_subtypes_at_project_scale() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
    let exclude = globset::GlobSetBuilder::new().build().unwrap();
    graph.analyze_project(dir.path(), &exclude, false).unwrap();

    let edges = graph
        .query_hierarchical("imports", &HierarchicalOptions::default())
        .unwrap();
    let types: std::collections::HashSet<_> = edges.iter().map(|e| e.edge_type.as_str()).collect();
    assert!(types.contains("imports_file"));
    assert!(types.contains("imports_library"));
}

#[test]
fn transitive_inference_over_a_non_transitive_edge_type_is_empty_not_an_error() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
    let exclude = globset::GlobSetBuilder::new().build().unwrap();
    graph.analyze_project(dir.path(), &exclude, false).unwrap();

    let a_id = graph
        .list_nodes_by_type(codegraph_core::NodeType::File)
        .unwrap()
        .into_iter()
        .find(|n| n.source_file == "a.ts")
        .unwrap()
        .id
        .unwrap();

    // `imports_file` isn't registered `transitive` (only its ancestor
    // `depends_on` is); the query must return cleanly empty rather than walk
    // (or error) over a non-transitive type.
    let edges = graph
        .query_transitive(a_id, "imports_file", &TransitiveOptions::default())
        .unwrap();
    assert!(edges.is_empty());
}

#[test]
fn scenario_incremental_typescript_buildup_matches_the_documented_five_node_two_edge_outcome() {
    // SPEC_FULL.md §8 Scenario 1. `resolver::resolve` joins `./utils` against
    // the importer's directory without extension inference (its own doc
    // comment calls this out), so `math.ts`'s `import './utils'` resolves to
    // the bare path "utils" rather than the already-analyzed "utils.ts" node
    // — a distinct placeholder node is created. Same for `index.ts`
    // importing `./math`. That's the documented 5 nodes / 2 edges: 3 real
    // file nodes plus 2 placeholder import-target nodes.
    let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
    graph.analyze_file("utils.ts", "").unwrap();
    graph.analyze_file("math.ts", "import { x } from './utils';\n").unwrap();
    graph.analyze_file("index.ts", "import { y } from './math';\n").unwrap();

    let stats = graph.project_stats().unwrap();
    assert_eq!(stats.total_nodes, 5);
    assert_eq!(stats.total_relationships, 2);

    let math_deps = graph.file_dependencies("math.ts").unwrap();
    assert_eq!(math_deps.len(), 1);
    assert_eq!(math_deps[0].source_file, "utils");

    let index_deps = graph.file_dependencies("index.ts").unwrap();
    assert_eq!(index_deps.len(), 1);
    assert_eq!(index_deps[0].source_file, "math");

    assert!(graph.circular_dependencies().unwrap().is_empty());
}

#[test]
fn selective_edge_cleanup_replaces_only_dependency_edges_on_reanalysis() {
    let mut graph = CodeGraph::in_memory(CodeGraphConfig::default()).unwrap();
    graph.analyze_file("a.ts", "import { x } from './b';\n").unwrap();
    graph.analyze_file("b.ts", "export const x = 1;\n").unwrap();

    let before = graph.project_stats().unwrap();

    // Re-analyze a.ts with a different import; the stale imports_file edge to
    // b.ts must be gone, not accumulated alongside the new one.
    graph.analyze_file("a.ts", "import { y } from './c';\n").unwrap();
    graph.analyze_file("c.ts", "export const y = 1;\n").unwrap();

    let deps = graph.file_dependencies("a.ts").unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].source_file, "c.ts");

    let after = graph.project_stats().unwrap();
    assert!(after.total_relationships >= before.total_relationships);
}
