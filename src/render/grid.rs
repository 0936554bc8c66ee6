//! The cell grid a render pass paints into.
//!
//! Every write takes a clip region; anything outside the clip or the grid
//! bounds is dropped silently. Overwriting either half of a wide glyph
//! blanks the other half so no orphaned continuation survives.

use crate::geometry::{Region, Size};

use super::cell::{Cell, CellStyle};
use super::strip::Strip;
use super::text::char_width;

/// A 2-D array of cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// A blank grid. Negative dimensions are treated as zero.
    pub fn new(size: Size) -> Self {
        let width = size.width.max(0);
        let height = size.height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::blank(); (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The whole grid as a region at the origin.
    pub fn bounds(&self) -> Region {
        self.size().to_region()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// One row of cells.
    pub fn row(&self, y: i32) -> Option<&[Cell]> {
        if y < 0 || y >= self.height {
            return None;
        }
        let start = (y * self.width) as usize;
        Some(&self.cells[start..start + self.width as usize])
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Write one cell. Returns whether the write landed.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell, clip: Region) -> bool {
        if !clip.contains(x, y) {
            return false;
        }
        let Some(i) = self.index(x, y) else {
            return false;
        };
        self.unlink(x, y);
        self.cells[i] = cell;
        true
    }

    /// Write a character over the existing cell and return the columns it
    /// advances. A style without a background keeps the cell's background.
    pub fn put_char(&mut self, x: i32, y: i32, ch: char, style: Option<CellStyle>, clip: Region) -> i32 {
        let width = char_width(ch);
        if width > 0 {
            self.write_glyph(x, y, ch, style, width > 1, clip);
        }
        width
    }

    /// Write `text` left to right from `(x, y)`. Returns the columns used.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, style: Option<CellStyle>, clip: Region) -> i32 {
        let mut column = x;
        for ch in text.chars() {
            column += self.put_char(column, y, ch, style, clip);
        }
        column - x
    }

    /// Place a strip's cells.
    pub fn put_strip(&mut self, strip: &Strip, clip: Region) {
        let cells = &strip.cells;
        for (i, cell) in cells.iter().enumerate() {
            if cell.is_continuation() {
                continue;
            }
            let wide = cells.get(i + 1).is_some_and(Cell::is_continuation);
            self.write_glyph(strip.x_offset + i as i32, strip.y, cell.ch, cell.style, wide, clip);
        }
    }

    /// Fill a region with blanks in `style`.
    pub fn fill(&mut self, region: Region, style: Option<CellStyle>, clip: Region) {
        let area = region.intersection(clip).intersection(self.bounds());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.set(x, y, Cell::new(' ', style), clip);
            }
        }
    }

    /// The printable text of one row, continuation cells skipped.
    pub fn row_text(&self, y: i32) -> String {
        self.row(y)
            .map(|row| row.iter().filter(|c| !c.is_continuation()).map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    /// Every row as text.
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.row_text(y)).collect()
    }

    fn write_glyph(&mut self, x: i32, y: i32, ch: char, style: Option<CellStyle>, wide: bool, clip: Region) {
        let head_visible = clip.contains(x, y) && self.index(x, y).is_some();
        let tail_visible = wide && clip.contains(x + 1, y) && self.index(x + 1, y).is_some();

        if wide && head_visible && tail_visible {
            let style = self.blend(x, y, style);
            self.unlink(x, y);
            self.unlink(x + 1, y);
            if let Some(i) = self.index(x, y) {
                self.cells[i] = Cell::new(ch, style);
                self.cells[i + 1] = Cell::continuation(style);
            }
            return;
        }

        // Half a wide glyph cannot be shown: write a blank in the visible half.
        let (target, glyph) = match (head_visible, tail_visible) {
            (true, _) if !wide => (x, ch),
            (true, false) => (x, ' '),
            (false, true) => (x + 1, ' '),
            _ => return,
        };
        let style = self.blend(target, y, style);
        self.set(target, y, Cell::new(glyph, style), clip);
    }

    /// Carry the existing background under a style that has none.
    fn blend(&self, x: i32, y: i32, style: Option<CellStyle>) -> Option<CellStyle> {
        let below = self.get(x, y).and_then(|c| c.style).and_then(|s| s.bg);
        match (style, below) {
            (Some(style), Some(bg)) if style.bg.is_none() => Some(style.with_bg(bg)),
            (None, Some(bg)) => Some(CellStyle::new().with_bg(bg)),
            (style, _) => style,
        }
    }

    /// Blank the partner half of a wide glyph at `(x, y)`, if any.
    fn unlink(&mut self, x: i32, y: i32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i].is_continuation() {
            if x > 0 && !self.cells[i - 1].is_continuation() {
                self.cells[i - 1].ch = ' ';
            }
            self.cells[i].ch = ' ';
        } else if x + 1 < self.width && self.cells[i + 1].is_continuation() {
            self.cells[i + 1].ch = ' ';
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
