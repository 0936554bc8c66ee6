//! Crossterm terminal output backend.
//!
//! The `Driver` writes a [`Frame`] to any `Write` sink: every row from its
//! first column, style commands only where the style changes, then each sixel
//! placement at its cell position. It also wraps the alternate screen and
//! cursor controls for interactive hosts.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::css::color::Color;

use super::cell::CellStyle;
use super::pipeline::Frame;

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        crossterm::style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Terminal output backend using crossterm.
///
/// Commands are queued; call [`flush`](Self::flush) to send them. The driver
/// does NOT enter the alternate screen on creation.
pub struct Driver<W: Write> {
    writer: W,
}

impl Driver<BufWriter<Stdout>> {
    /// A driver over buffered stdout.
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(io::stdout()))
    }

    /// Get the terminal size (columns, rows) via crossterm.
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl<W: Write> Driver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Take back the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Enter alternate screen and enable raw mode.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        execute!(self.writer, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        Ok(())
    }

    /// Leave alternate screen and disable raw mode.
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.writer, LeaveAlternateScreen)?;
        Ok(())
    }

    /// Queue a whole frame.
    ///
    /// Style is reset whenever a styled cell is followed by an unstyled one
    /// and at the end of every row that ends styled. Continuation cells are
    /// skipped; their glyph was printed by the cell before.
    pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        for (y, row) in frame.grid.rows().enumerate() {
            queue!(self.writer, cursor::MoveTo(0, y as u16))?;
            let mut active: Option<CellStyle> = None;
            for cell in row.iter().filter(|c| !c.is_continuation()) {
                let style = cell.effective_style().copied();
                if style != active {
                    if active.is_some() {
                        queue!(self.writer, SetAttribute(Attribute::Reset))?;
                    }
                    if let Some(style) = &style {
                        self.apply_cell_style(style)?;
                    }
                    active = style;
                }
                queue!(self.writer, Print(cell.ch))?;
            }
            if active.is_some() {
                queue!(self.writer, SetAttribute(Attribute::Reset))?;
            }
        }

        for placement in &frame.sixels {
            queue!(
                self.writer,
                cursor::MoveTo(placement.x.max(0) as u16, placement.y.max(0) as u16)
            )?;
            self.writer.write_all(&placement.data)?;
        }
        Ok(())
    }

    /// Flush the internal write buffer to the terminal.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        execute!(self.writer, cursor::Hide)
    }

    /// Show the cursor.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        execute!(self.writer, cursor::Show)
    }

    /// Queue crossterm style commands for a given `CellStyle`.
    fn apply_cell_style(&mut self, style: &CellStyle) -> io::Result<()> {
        if let Some(fg) = style.fg {
            queue!(self.writer, SetForegroundColor(fg.into()))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.writer, SetBackgroundColor(bg.into()))?;
        }
        let attributes = [
            (style.bold, Attribute::Bold),
            (style.dim, Attribute::Dim),
            (style.italic, Attribute::Italic),
            (style.underline, Attribute::Underlined),
            (style.strikethrough, Attribute::CrossedOut),
            (style.reverse, Attribute::Reverse),
        ];
        for (_, attribute) in attributes.into_iter().filter(|(on, _)| *on) {
            queue!(self.writer, SetAttribute(attribute))?;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::render::grid::Grid;
    use crate::render::pipeline::SixelPlacement;
    use pretty_assertions::assert_eq;

    fn written(frame: &Frame) -> String {
        let mut driver = Driver::new(Vec::new());
        driver.write_frame(frame).unwrap();
        String::from_utf8(driver.into_inner()).unwrap()
    }

    fn frame(width: i32, height: i32) -> Frame {
        Frame {
            grid: Grid::new(Size::new(width, height)),
            sixels: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Color conversion
    // -----------------------------------------------------------------------

    #[test]
    fn color_converts_to_rgb() {
        let color: crossterm::style::Color = Color::rgb(1, 2, 3).into();
        assert_eq!(color, crossterm::style::Color::Rgb { r: 1, g: 2, b: 3 });
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    #[test]
    fn plain_rows_need_no_style_commands() {
        let mut f = frame(2, 2);
        let bounds = f.grid.bounds();
        f.grid.put_str(0, 0, "ab", None, bounds);
        assert_eq!(written(&f), "\x1b[1;1Hab\x1b[2;1H  ");
    }

    #[test]
    fn style_resets_before_unstyled_cell_and_row_end() {
        let mut f = frame(3, 1);
        let bounds = f.grid.bounds();
        let red = Some(CellStyle::new().with_fg(Color::rgb(255, 0, 0)));
        f.grid.put_str(0, 0, "a", red, bounds);
        f.grid.put_str(2, 0, "c", red, bounds);
        assert_eq!(
            written(&f),
            "\x1b[1;1H\x1b[38;2;255;0;0ma\x1b[0m \x1b[38;2;255;0;0mc\x1b[0m"
        );
    }

    #[test]
    fn continuation_cells_are_skipped() {
        let mut f = frame(3, 1);
        let bounds = f.grid.bounds();
        f.grid.put_str(0, 0, "日x", None, bounds);
        assert_eq!(written(&f), "\x1b[1;1H日x");
    }

    #[test]
    fn sixels_follow_the_grid() {
        let mut f = frame(1, 1);
        f.sixels.push(SixelPlacement {
            x: 2,
            y: 3,
            columns: 1,
            rows: 1,
            data: b"\x1bPq-\x1b\\".to_vec(),
        });
        assert_eq!(written(&f), "\x1b[1;1H \x1b[4;3H\x1bPq-\x1b\\");
    }

    #[test]
    fn bold_and_reverse_attributes() {
        let mut f = frame(1, 1);
        let bounds = f.grid.bounds();
        let style = CellStyle {
            bold: true,
            reverse: true,
            ..CellStyle::default()
        };
        f.grid.put_str(0, 0, "x", Some(style), bounds);
        assert_eq!(written(&f), "\x1b[1;1H\x1b[1m\x1b[7mx\x1b[0m");
    }
}
