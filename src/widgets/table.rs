//! Table renderer: rows of cells separated by box-drawing grid lines.
//!
//! Rows are `<tr>` children of the table or of its `thead`, `tbody` and
//! `tfoot` sections; cells are `<td>`/`<th>` children of a row. Each column
//! is as wide as its widest cell text plus one cell of padding on each side.
//! Every row is one line tall.

use crate::dom::{Dom, NodeId};
use crate::geometry::{Region, Size};
use crate::render::border::BorderGlyphs;
use crate::render::pipeline::{MeasureContext, PaintContext};
use crate::render::strip::Strip;
use crate::render::text;

use super::{collapsed_text, ElementRenderer};

/// Padding between a cell's text and the grid lines, per side.
pub const CELL_PADDING: i32 = 1;

// ---------------------------------------------------------------------------
// Table model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableModel {
    /// Cell nodes per row. Short rows are padded with `None`.
    rows: Vec<Vec<Option<NodeId>>>,
    /// Column widths including padding.
    widths: Vec<i32>,
}

impl TableModel {
    fn build(dom: &Dom, table: NodeId) -> Self {
        let mut rows: Vec<Vec<Option<NodeId>>> = Vec::new();
        for child in dom.element_children(table) {
            match dom.get(child).and_then(|d| d.tag()) {
                Some("tr") => rows.push(cells(dom, child)),
                Some("thead" | "tbody" | "tfoot") => {
                    for row in dom.element_children(child) {
                        if dom.get(row).and_then(|d| d.tag()) == Some("tr") {
                            rows.push(cells(dom, row));
                        }
                    }
                }
                _ => {}
            }
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &mut rows {
            row.resize(columns, None);
            for (col, cell) in row.iter().enumerate() {
                let width = cell.map_or(0, |c| text::display_width(&collapsed_text(dom, c)));
                widths[col] = widths[col].max(width);
            }
        }
        for width in &mut widths {
            *width += 2 * CELL_PADDING;
        }
        Self { rows, widths }
    }

    /// Outer size: columns plus a grid line between and around them.
    fn size(&self) -> Size {
        if self.rows.is_empty() || self.widths.is_empty() {
            return Size::ZERO;
        }
        let columns = self.widths.len() as i32;
        let rows = self.rows.len() as i32;
        Size::new(self.widths.iter().sum::<i32>() + columns + 1, 2 * rows + 1)
    }

    /// Left edge of each column's content, relative to the table.
    fn column_starts(&self) -> Vec<i32> {
        let mut x = 1;
        self.widths
            .iter()
            .map(|w| {
                let start = x;
                x += w + 1;
                start
            })
            .collect()
    }
}

fn cells(dom: &Dom, row: NodeId) -> Vec<Option<NodeId>> {
    dom.element_children(row)
        .filter(|&c| matches!(dom.get(c).and_then(|d| d.tag()), Some("td" | "th")))
        .map(Some)
        .collect()
}

// ---------------------------------------------------------------------------
// TableRenderer
// ---------------------------------------------------------------------------

/// Renders `<table>` elements.
pub struct TableRenderer;

impl TableRenderer {
    fn paint_grid(ctx: &mut PaintContext<'_>, node: NodeId, model: &TableModel, origin: Region) {
        let glyphs = BorderGlyphs::THIN;
        let style = ctx.cell_style(node);
        let clip = ctx.clip;
        let size = model.size();
        let starts = model.column_starts();
        let last_line = size.height - 1;

        for line in (0..=last_line).step_by(2) {
            let y = origin.y + line;
            let (left, tee, right) = if line == 0 {
                (glyphs.top_left, glyphs.top_tee, glyphs.top_right)
            } else if line == last_line {
                (glyphs.bottom_left, glyphs.bottom_tee, glyphs.bottom_right)
            } else {
                (glyphs.left_tee, glyphs.cross, glyphs.right_tee)
            };
            let mut strip = Strip::new(y, origin.x);
            strip.push(left, style);
            for (col, width) in model.widths.iter().enumerate() {
                strip.repeat(glyphs.horizontal, *width, style);
                strip.push(if col + 1 == model.widths.len() { right } else { tee }, style);
            }
            ctx.grid.put_strip(&strip, clip);
        }

        for row in 0..model.rows.len() as i32 {
            let y = origin.y + 2 * row + 1;
            ctx.grid.put_char(origin.x, y, glyphs.vertical, style, clip);
            for (start, width) in starts.iter().zip(&model.widths) {
                ctx.grid.put_char(origin.x + start + width, y, glyphs.vertical, style, clip);
            }
        }
    }
}

impl ElementRenderer for TableRenderer {
    fn tag(&self) -> &str {
        "table"
    }

    fn default_css(&self) -> &str {
        "th { text-align: center; text-style: bold; }"
    }

    fn custom_layout(&self) -> bool {
        true
    }

    fn measure(&self, ctx: &MeasureContext<'_>, node: NodeId, _available_width: Option<i32>) -> Size {
        TableModel::build(ctx.dom, node).size()
    }

    fn custom_children(&self) -> bool {
        true
    }

    fn paint(&self, ctx: &mut PaintContext<'_>, node: NodeId, content: Region) {
        let model = TableModel::build(ctx.dom, node);
        let size = model.size();
        if size.area() == 0 {
            return;
        }
        let origin = Region::new(content.x, content.y, size.width, size.height);
        Self::paint_grid(ctx, node, &model, origin);

        let starts = model.column_starts();
        let clip = ctx.clip.intersection(content);
        for (row, cells) in model.rows.iter().enumerate() {
            let y = origin.y + 2 * row as i32 + 1;
            for ((cell, start), width) in cells.iter().zip(&starts).zip(&model.widths) {
                let Some(cell) = *cell else {
                    continue;
                };
                let label = collapsed_text(ctx.dom, cell);
                let room = width - 2 * CELL_PADDING;
                let label = text::truncate_to_width(&label, room);
                let align = ctx.style(cell).text_align();
                let x = origin.x + start + CELL_PADDING + align.offset(room, text::display_width(label));
                let style = ctx.cell_style(cell);
                ctx.grid.put_str(x, y, label, style, clip);
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
