//! Retained element tree: slotmap-backed arena with attribute and selector queries.

pub mod node;
pub mod tree;
pub mod query;

pub use node::{ElementState, NodeData, NodeId, NodeKind, RasterImage};
pub use tree::Dom;
