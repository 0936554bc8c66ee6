//! Snapshot rendering helpers.
//!
//! Functions for converting grids and render passes into plain-text strings
//! suitable for snapshot testing and assertions.

use crate::dom::Dom;
use crate::geometry::Size;
use crate::render::grid::Grid;
use crate::session::{RenderError, RenderSession};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Convert a grid to text: one line per row, trailing spaces trimmed, rows
/// joined with `'\n'`. Continuation cells print nothing.
pub fn grid_to_string(grid: &Grid) -> String {
    grid.rows()
        .map(|row| {
            let line: String = row
                .iter()
                .filter(|cell| !cell.is_continuation())
                .map(|cell| cell.ch)
                .collect();
            line.trim_end().to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `dom` with `session` into a `width` x `height` frame and return
/// its text as [`grid_to_string`] does.
///
/// # Examples
///
/// ```ignore
/// let mut session = RenderSession::new();
/// session.add_stylesheet("app", "p { text-align: center; }")?;
/// let output = render_to_string(&mut session, &mut dom, 20, 1)?;
/// ```
pub fn render_to_string(session: &mut RenderSession, dom: &mut Dom, width: i32, height: i32) -> Result<String, RenderError> {
    let frame = session.render(dom, Size::new(width, height))?;
    Ok(grid_to_string(&frame.grid))
}

// ===========================================================================
// Tests
// ===========================================================================
