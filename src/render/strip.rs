//! Strip: a horizontal run of cells.
//!
//! Renderers build text lines and box edges as `Strip`s, which the grid
//! places with clipping. Wide glyphs are pushed as a real cell followed by a
//! continuation cell, so `cells.len()` is always the display width.

use super::cell::{Cell, CellStyle};
use super::text::char_width;

/// A horizontal run of cells starting at `(x_offset, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip {
    /// Absolute row.
    pub y: i32,
    /// Absolute column of the first cell.
    pub x_offset: i32,
    /// The cells in left-to-right order.
    pub cells: Vec<Cell>,
}

impl Strip {
    /// Create a new empty strip at the given row and x offset.
    pub fn new(y: i32, x_offset: i32) -> Self {
        Self {
            y,
            x_offset,
            cells: Vec::new(),
        }
    }

    /// Push a single character. Zero-width characters are skipped.
    pub fn push(&mut self, ch: char, style: Option<CellStyle>) {
        match char_width(ch) {
            0 => {}
            1 => self.cells.push(Cell::new(ch, style)),
            _ => {
                self.cells.push(Cell::new(ch, style));
                self.cells.push(Cell::continuation(style));
            }
        }
    }

    /// Push every character of `text` with the same style.
    pub fn push_str(&mut self, text: &str, style: Option<CellStyle>) {
        for ch in text.chars() {
            self.push(ch, style);
        }
    }

    /// Push `count` copies of `ch`.
    pub fn repeat(&mut self, ch: char, count: i32, style: Option<CellStyle>) {
        for _ in 0..count.max(0) {
            self.push(ch, style);
        }
    }

    /// The width of this strip in cells.
    pub fn width(&self) -> i32 {
        self.cells.len() as i32
    }

    /// Keep only the cells whose columns fall within `[x_start, x_end)`.
    ///
    /// A wide glyph cut in half becomes a blank with the glyph's style.
    pub fn crop(&self, x_start: i32, x_end: i32) -> Strip {
        let mut result = Strip::new(self.y, x_start);
        let last = self.cells.len().saturating_sub(1);
        for (i, cell) in self.cells.iter().enumerate() {
            let cell_x = self.x_offset + i as i32;
            if cell_x < x_start || cell_x >= x_end {
                continue;
            }
            if result.cells.is_empty() {
                result.x_offset = cell_x;
            }
            let orphan_head = !cell.is_continuation()
                && i < last
                && self.cells[i + 1].is_continuation()
                && cell_x + 1 >= x_end;
            let orphan_tail = cell.is_continuation() && cell_x == x_start;
            if orphan_head || orphan_tail {
                result.cells.push(Cell::new(' ', cell.style));
            } else {
                result.cells.push(*cell);
            }
        }
        result
    }

    /// Pad the strip to exactly `width` cells using spaces with the given style.
    ///
    /// If the strip is already wider than `width`, it is truncated.
    pub fn fill(&mut self, width: i32, style: Option<CellStyle>) {
        let w = width.max(0) as usize;
        if self.cells.len() < w {
            self.cells.resize(w, Cell::new(' ', style));
        } else if self.cells.len() > w {
            let splits_glyph = self.cells[w].is_continuation();
            self.cells.truncate(w);
            if splits_glyph {
                if let Some(head) = self.cells.last_mut() {
                    head.ch = ' ';
                }
            }
        }
    }

    /// The rightmost x position (exclusive) of this strip.
    pub fn right(&self) -> i32 {
        self.x_offset + self.width()
    }

    /// The printable text, without continuation markers.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::color::Color;

    fn red() -> Option<CellStyle> {
        Some(CellStyle::new().with_fg(Color::rgb(255, 0, 0)))
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn push_str_tracks_width() {
        let mut strip = Strip::new(2, 5);
        strip.push_str("abc", red());
        assert_eq!(strip.width(), 3);
        assert_eq!(strip.right(), 8);
        assert_eq!(strip.cells[1].style, red());
        assert_eq!(strip.text(), "abc");
    }

    #[test]
    fn wide_glyph_adds_continuation() {
        let mut strip = Strip::new(0, 0);
        strip.push_str("a日", None);
        assert_eq!(strip.width(), 3);
        assert!(strip.cells[2].is_continuation());
        assert_eq!(strip.text(), "a日");
    }

    #[test]
    fn zero_width_is_skipped() {
        let mut strip = Strip::new(0, 0);
        strip.push_str("e\u{0301}", None);
        assert_eq!(strip.width(), 1);
    }

    #[test]
    fn repeat_pushes_copies() {
        let mut strip = Strip::new(0, 0);
        strip.repeat('─', 4, None);
        assert_eq!(strip.text(), "────");
        strip.repeat('x', -2, None);
        assert_eq!(strip.width(), 4);
    }

    // -----------------------------------------------------------------------
    // Crop
    // -----------------------------------------------------------------------

    #[test]
    fn crop_keeps_range() {
        let mut strip = Strip::new(0, 10);
        strip.push_str("abcdef", None);
        let cropped = strip.crop(12, 15);
        assert_eq!(cropped.x_offset, 12);
        assert_eq!(cropped.text(), "cde");
    }

    #[test]
    fn crop_outside_is_empty() {
        let mut strip = Strip::new(0, 0);
        strip.push_str("abc", None);
        assert_eq!(strip.crop(5, 9).width(), 0);
    }

    #[test]
    fn crop_splitting_wide_glyph_leaves_blank() {
        let mut strip = Strip::new(0, 0);
        strip.push_str("日本", None);
        let head_cut = strip.crop(0, 3);
        assert_eq!(head_cut.text(), "日 ");
        let tail_cut = strip.crop(1, 4);
        assert_eq!(tail_cut.text(), " 本");
    }

    // -----------------------------------------------------------------------
    // Fill
    // -----------------------------------------------------------------------

    #[test]
    fn fill_pads_and_truncates() {
        let mut strip = Strip::new(0, 0);
        strip.push_str("ab", None);
        strip.fill(4, red());
        assert_eq!(strip.text(), "ab  ");
        assert_eq!(strip.cells[3].style, red());

        strip.fill(1, None);
        assert_eq!(strip.text(), "a");
    }

    #[test]
    fn fill_truncating_half_glyph_blanks_it() {
        let mut strip = Strip::new(0, 0);
        strip.push_str("日", None);
        strip.fill(1, None);
        assert_eq!(strip.text(), " ");
    }
}
