//! Thin demonstration binary for `codegraph-core` (SPEC_FULL.md §6.4):
//! argument parsing and JSON/plain-text rendering only, no logic of its own.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codegraph_core::{default_db_path, CodeGraph, CodeGraphConfig};

#[derive(Parser)]
#[command(name = "codegraph", about = "Multi-language code knowledge graph CLI")]
struct Cli {
    /// Project root; the graph database lives at `<root>/.codegraph/graph.db`.
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Optional path to a TOML config file (see CodeGraphConfig).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single file or walk a directory tree.
    Analyze {
        path: PathBuf,
        #[arg(long)]
        sequential: bool,
    },
    /// List a file's outgoing dependencies.
    Deps { file: String },
    /// List the files that depend on a given file.
    Dependents { file: String },
    /// Report detected circular dependencies.
    Cycles,
    /// Report aggregate project statistics.
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CodeGraphConfig::from_path(path)?,
        None => CodeGraphConfig::default(),
    };
    config.project_root = cli.project_root.clone();

    let db_path = default_db_path(&cli.project_root);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut graph = CodeGraph::open(&db_path, config)?;

    match cli.command {
        Command::Analyze { path, sequential } => run_analyze(&mut graph, &cli.project_root, &path, !sequential)?,
        Command::Deps { file } => print_json(&graph.file_dependencies(&file)?),
        Command::Dependents { file } => print_json(&graph.file_dependents(&file)?),
        Command::Cycles => print_json(&graph.circular_dependencies()?),
        Command::Stats => print_stats(&graph)?,
    }

    Ok(())
}

fn run_analyze(graph: &mut CodeGraph, project_root: &std::path::Path, path: &std::path::Path, parallel: bool) -> anyhow::Result<()> {
    if path.is_file() {
        let rel = path
            .strip_prefix(project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        let source = std::fs::read_to_string(path)?;
        let result = graph.analyze_file(&rel, &source)?;
        print_json(&serde_json::json!({
            "nodes_created": result.nodes_created,
            "relationships_created": result.relationships_created,
            "warnings": result.warnings,
            "unresolved_internal_paths": result.unresolved_internal_paths,
        }));
    } else {
        let exclude = globset::GlobSetBuilder::new().build()?;
        let result = graph.analyze_project(path, &exclude, parallel)?;
        print_json(&serde_json::json!({
            "files_analyzed": result.files_analyzed,
            "nodes_created": result.nodes_created,
            "relationships_created": result.relationships_created,
            "warnings": result.warnings,
            "unresolved_internal_paths": result.unresolved_internal_paths,
        }));
    }
    Ok(())
}

fn print_stats(graph: &CodeGraph) -> anyhow::Result<()> {
    let stats = graph.project_stats()?;
    print_json(&serde_json::json!({
        "total_nodes": stats.total_nodes,
        "total_relationships": stats.total_relationships,
        "by_node_type": stats.by_node_type,
        "by_edge_type": stats.by_edge_type,
        "by_language": stats.by_language,
    }));
    Ok(())
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to render JSON output: {e}"),
    }
}
