//! Headless testing helpers: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive render passes over a tree without a terminal.
//! Use [`render_to_string`] and [`grid_to_string`] to capture output as plain
//! text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{grid_to_string, render_to_string};
