//! Box-drawing glyph sets for borders and table grid lines.

use crate::css::styles::BorderKind;
use crate::geometry::Region;

use super::cell::CellStyle;
use super::grid::Grid;

/// The glyphs of one border style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    /// `┬`: a vertical line meeting the top edge.
    pub top_tee: char,
    /// `┴`: a vertical line meeting the bottom edge.
    pub bottom_tee: char,
    /// `├`: a horizontal line meeting the left edge.
    pub left_tee: char,
    /// `┤`: a horizontal line meeting the right edge.
    pub right_tee: char,
    pub cross: char,
}

impl BorderGlyphs {
    pub const THIN: BorderGlyphs = BorderGlyphs {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
        top_tee: '┬',
        bottom_tee: '┴',
        left_tee: '├',
        right_tee: '┤',
        cross: '┼',
    };

    pub const HEAVY: BorderGlyphs = BorderGlyphs {
        top_left: '┏',
        top_right: '┓',
        bottom_left: '┗',
        bottom_right: '┛',
        horizontal: '━',
        vertical: '┃',
        top_tee: '┳',
        bottom_tee: '┻',
        left_tee: '┣',
        right_tee: '┫',
        cross: '╋',
    };

    pub const DOUBLE: BorderGlyphs = BorderGlyphs {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
        top_tee: '╦',
        bottom_tee: '╩',
        left_tee: '╠',
        right_tee: '╣',
        cross: '╬',
    };

    pub const ROUND: BorderGlyphs = BorderGlyphs {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        ..BorderGlyphs::THIN
    };

    pub const ASCII: BorderGlyphs = BorderGlyphs {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
        top_tee: '+',
        bottom_tee: '+',
        left_tee: '+',
        right_tee: '+',
        cross: '+',
    };

    pub const DASHED: BorderGlyphs = BorderGlyphs {
        horizontal: '╌',
        vertical: '╎',
        ..BorderGlyphs::THIN
    };

    /// Glyphs for a border kind; `None` has none.
    pub fn for_kind(kind: BorderKind) -> Option<BorderGlyphs> {
        match kind {
            BorderKind::None => None,
            BorderKind::Thin => Some(Self::THIN),
            BorderKind::Heavy => Some(Self::HEAVY),
            BorderKind::Double => Some(Self::DOUBLE),
            BorderKind::Round => Some(Self::ROUND),
            BorderKind::Ascii => Some(Self::ASCII),
            BorderKind::Dashed => Some(Self::DASHED),
        }
    }
}

/// Draw a box outline around the edge of `region`.
///
/// Regions narrower or shorter than two cells are skipped.
pub fn draw_box(grid: &mut Grid, region: Region, glyphs: &BorderGlyphs, style: Option<CellStyle>, clip: Region) {
    if region.width < 2 || region.height < 2 {
        return;
    }
    let (left, top) = (region.x, region.y);
    let (right, bottom) = (region.right() - 1, region.bottom() - 1);

    for x in left + 1..right {
        grid.put_char(x, top, glyphs.horizontal, style, clip);
        grid.put_char(x, bottom, glyphs.horizontal, style, clip);
    }
    for y in top + 1..bottom {
        grid.put_char(left, y, glyphs.vertical, style, clip);
        grid.put_char(right, y, glyphs.vertical, style, clip);
    }
    grid.put_char(left, top, glyphs.top_left, style, clip);
    grid.put_char(right, top, glyphs.top_right, style, clip);
    grid.put_char(left, bottom, glyphs.bottom_left, style, clip);
    grid.put_char(right, bottom, glyphs.bottom_right, style, clip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use pretty_assertions::assert_eq;

    #[test]
    fn draws_rounded_box() {
        let mut grid = Grid::new(Size::new(4, 3));
        let bounds = grid.bounds();
        draw_box(&mut grid, bounds, &BorderGlyphs::ROUND, None, bounds);
        assert_eq!(grid.to_lines(), vec!["╭──╮", "│  │", "╰──╯"]);
    }

    #[test]
    fn tiny_region_draws_nothing() {
        let mut grid = Grid::new(Size::new(4, 3));
        let bounds = grid.bounds();
        draw_box(&mut grid, Region::new(0, 0, 1, 3), &BorderGlyphs::THIN, None, bounds);
        assert_eq!(grid.row_text(0), "    ");
    }

    #[test]
    fn none_kind_has_no_glyphs() {
        assert_eq!(BorderGlyphs::for_kind(BorderKind::None), None);
        assert_eq!(BorderGlyphs::for_kind(BorderKind::Dashed).map(|g| g.vertical), Some('╎'));
    }
}
