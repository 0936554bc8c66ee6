//! Layout: the `LayoutPrimitive` seam, its taffy implementation and style resolution.

pub mod engine;
pub mod resolve;

pub use engine::{ContentMeasure, LayoutInput, LayoutMap, LayoutPrimitive, TaffyLayout};

/// Errors from a layout primitive.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout engine error: {0}")]
    Engine(String),
}
