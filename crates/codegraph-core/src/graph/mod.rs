//! Node/edge data model (SPEC_FULL.md §3).

mod edge;
mod node;

pub use edge::{Edge, InferencePath, InferenceType, InferredEdge};
pub use node::{Node, NodeType, Position};
