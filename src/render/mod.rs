//! Painting: cell grid, strips, borders, the compositor with its top layer,
//! dialog state, the sixel codec, the layout and paint pipeline, and the
//! crossterm driver.

pub mod cell;
pub mod grid;
pub mod strip;
pub mod text;
pub mod border;
pub mod compositor;
pub mod dialog;
pub mod sixel;
pub mod pipeline;
pub mod driver;

pub use cell::{Cell, CellStyle};
pub use compositor::{Compositor, OcclusionZone, TopLayer, TopLayerEntry, TopLayerKind, VisibleRegion};
pub use dialog::{DialogError, DialogManager};
pub use driver::Driver;
pub use grid::Grid;
pub use pipeline::{Frame, SixelPlacement};
pub use strip::Strip;
