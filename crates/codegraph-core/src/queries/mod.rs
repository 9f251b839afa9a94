//! Query Registry, Query Engine, and Custom-Key Mapper (SPEC_FULL.md §4.2-§4.4).

pub mod embedded;
pub mod engine;
pub mod mapper;
pub mod processors;
pub mod records;
pub mod registry;

pub use engine::QueryEngine;
pub use mapper::{validate as validate_mapping, KeyMapping};
pub use records::ResultRecord;
pub use registry::{QueryEntry, QueryRegistry};
