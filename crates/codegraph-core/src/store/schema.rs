//! SQL schema (SPEC_FULL.md §6.1), grounded on the teacher's
//! `lazy/schema.rs` DDL constants, extended with `edge_types` and
//! `inference_cache`.

pub const SCHEMA_CREATE_NODES: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier      TEXT NOT NULL UNIQUE,
    type            TEXT NOT NULL,
    name            TEXT NOT NULL,
    source_file     TEXT NOT NULL,
    language        TEXT NOT NULL,
    start_line      INTEGER,
    start_column    INTEGER,
    end_line        INTEGER,
    end_column      INTEGER,
    metadata        TEXT,
    semantic_tags   TEXT
)
"#;

pub const SCHEMA_CREATE_EDGES: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    from_node_id    INTEGER NOT NULL REFERENCES nodes(id),
    to_node_id      INTEGER NOT NULL REFERENCES nodes(id),
    type            TEXT NOT NULL,
    metadata        TEXT,
    UNIQUE(from_node_id, to_node_id, type)
)
"#;

pub const SCHEMA_CREATE_EDGE_TYPES: &str = r#"
CREATE TABLE IF NOT EXISTS edge_types (
    name              TEXT PRIMARY KEY,
    parent            TEXT REFERENCES edge_types(name),
    is_transitive     BOOLEAN NOT NULL DEFAULT 0,
    is_inheritable    BOOLEAN NOT NULL DEFAULT 0,
    is_hierarchical   BOOLEAN NOT NULL DEFAULT 0,
    description       TEXT
)
"#;

pub const SCHEMA_CREATE_INFERENCE_CACHE: &str = r#"
CREATE TABLE IF NOT EXISTS inference_cache (
    from_node_id    INTEGER NOT NULL,
    edge_type       TEXT NOT NULL,
    inference_type  TEXT NOT NULL,
    to_node_id      INTEGER NOT NULL,
    path_depth      INTEGER,
    path_edges      TEXT,
    computed_at     INTEGER,
    PRIMARY KEY (from_node_id, edge_type, inference_type, to_node_id)
)
"#;

pub const SCHEMA_CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS nodes_source_file ON nodes(source_file)",
    "CREATE INDEX IF NOT EXISTS nodes_type ON nodes(type)",
    "CREATE INDEX IF NOT EXISTS edges_type ON edges(type)",
    "CREATE INDEX IF NOT EXISTS edges_from ON edges(from_node_id)",
    "CREATE INDEX IF NOT EXISTS edges_to ON edges(to_node_id)",
];

pub const SCHEMA_CREATE_METADATA: &str = r#"
CREATE TABLE IF NOT EXISTS store_metadata (
    key     TEXT PRIMARY KEY,
    value   TEXT NOT NULL
)
"#;

pub const SCHEMA_VERSION_KEY: &str = "schema_version";
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// Column name constants, used by row-mapping code to avoid stringly-typed
/// drift between the DDL above and the row readers in `sqlite_store.rs`.
pub mod columns {
    pub const NODE_ID: &str = "id";
    pub const NODE_IDENTIFIER: &str = "identifier";
    pub const NODE_TYPE: &str = "type";
    pub const NODE_NAME: &str = "name";
    pub const NODE_SOURCE_FILE: &str = "source_file";
    pub const NODE_LANGUAGE: &str = "language";

    pub const EDGE_ID: &str = "id";
    pub const EDGE_FROM: &str = "from_node_id";
    pub const EDGE_TO: &str = "to_node_id";
    pub const EDGE_TYPE: &str = "type";
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;

    #[test]
    fn schema_statements_create_expected_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(SCHEMA_CREATE_NODES, []).unwrap();
        conn.execute(SCHEMA_CREATE_EDGES, []).unwrap();
        conn.execute(SCHEMA_CREATE_EDGE_TYPES, []).unwrap();
        conn.execute(SCHEMA_CREATE_INFERENCE_CACHE, []).unwrap();
        conn.execute(SCHEMA_CREATE_METADATA, []).unwrap();
        for stmt in SCHEMA_CREATE_INDEXES {
            conn.execute(stmt, []).unwrap();
        }

        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(count >= 5);
    }
}
