//! Terminal cells: a character plus an optional style.
//!
//! A wide glyph occupies a real cell followed by a continuation cell that
//! carries the same style and is never printed on its own.

use crate::css::color::Color;
use crate::css::styles::{Background, Styles};

// ---------------------------------------------------------------------------
// CellStyle
// ---------------------------------------------------------------------------

/// Visual style for a single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub reverse: bool,
}

impl CellStyle {
    /// Create a new `CellStyle` with all attributes unset/false.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert computed `Styles` into a `CellStyle`.
    ///
    /// Only a solid background color carries over; gradients are painted
    /// per cell by the pipeline. Transparent colors are treated as unset.
    pub fn from_styles(styles: &Styles) -> Self {
        let flags = styles.text_style.unwrap_or_default();
        let bg = match &styles.background {
            Some(Background::Color(color)) => Some(*color),
            _ => None,
        };
        CellStyle {
            fg: styles.color.filter(|c| !c.is_transparent()),
            bg: bg.filter(|c| !c.is_transparent()),
            bold: flags.bold.unwrap_or(false),
            dim: flags.dim.unwrap_or(false),
            italic: flags.italic.unwrap_or(false),
            underline: flags.underline.unwrap_or(false),
            strikethrough: flags.strikethrough.unwrap_or(false),
            reverse: flags.reverse.unwrap_or(false),
        }
    }

    pub fn with_fg(mut self, fg: Color) -> Self {
        self.fg = Some(fg);
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Whether the style changes nothing about how a cell is printed.
    pub fn is_plain(&self) -> bool {
        *self == CellStyle::default()
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Option<CellStyle>,
}

impl Cell {
    /// Marker character of the second half of a wide glyph.
    pub const CONTINUATION: char = '\0';

    pub fn new(ch: char, style: Option<CellStyle>) -> Self {
        Self { ch, style }
    }

    /// A blank (space) cell without style.
    pub fn blank() -> Self {
        Self { ch: ' ', style: None }
    }

    /// A blank (space) cell with the given style.
    pub fn blank_styled(style: CellStyle) -> Self {
        Self { ch: ' ', style: Some(style) }
    }

    /// The trailing half of a wide glyph.
    pub fn continuation(style: Option<CellStyle>) -> Self {
        Self {
            ch: Self::CONTINUATION,
            style,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.ch == Self::CONTINUATION
    }

    /// The style, or `None` when it is plain.
    pub fn effective_style(&self) -> Option<&CellStyle> {
        self.style.as_ref().filter(|s| !s.is_plain())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::gradient;
    use crate::css::styles::TextStyleFlags;

    #[test]
    fn from_styles_maps_colors_and_flags() {
        let mut styles = Styles::new();
        styles.color = Some(Color::rgb(255, 0, 0));
        styles.background = Some(Background::Color(Color::rgb(0, 0, 255)));
        styles.text_style = Some(TextStyleFlags {
            bold: Some(true),
            underline: Some(true),
            ..TextStyleFlags::default()
        });

        let style = CellStyle::from_styles(&styles);
        assert_eq!(style.fg, Some(Color::rgb(255, 0, 0)));
        assert_eq!(style.bg, Some(Color::rgb(0, 0, 255)));
        assert!(style.bold);
        assert!(style.underline);
        assert!(!style.italic);
    }

    #[test]
    fn from_styles_skips_gradient_and_transparent() {
        let mut styles = Styles::new();
        styles.color = Some(Color::TRANSPARENT);
        styles.background = gradient::parse("linear-gradient(red, blue)").map(Background::Gradient);

        let style = CellStyle::from_styles(&styles);
        assert_eq!(style.fg, None);
        assert_eq!(style.bg, None);
        assert!(style.is_plain());
    }

    #[test]
    fn blank_and_continuation() {
        assert_eq!(Cell::default(), Cell::blank());
        assert!(!Cell::blank().is_continuation());
        assert!(Cell::continuation(None).is_continuation());
    }

    #[test]
    fn effective_style_hides_plain() {
        let plain = Cell::blank_styled(CellStyle::new());
        assert!(plain.effective_style().is_none());

        let bold = Cell::blank_styled(CellStyle {
            bold: true,
            ..CellStyle::default()
        });
        assert!(bold.effective_style().is_some());
    }
}
