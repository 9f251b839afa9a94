//! Graph Store (SPEC_FULL.md §4.7 / §6.1): a persistent, upsert-based store
//! of nodes and edges backed by SQLite.

mod schema;
mod sqlite_store;

pub use schema::{columns, CURRENT_SCHEMA_VERSION};
pub use sqlite_store::{EdgeFilter, GraphStats, NodeFilter, SqliteGraphStore};
