//! Core geometry types: Offset, Size, Region, Spacing.
//!
//! All coordinates are in terminal cells. `Region` carries the rectangle
//! arithmetic the paint pipeline and compositor need: intersection for
//! clipping and subtraction for occlusion.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D displacement or position delta in terminal cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// The zero offset.
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Offset {
    type Output = Offset;
    #[inline]
    fn neg(self) -> Offset {
        Offset { x: -self.x, y: -self.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in terminal cells (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Total area (width * height), zero for degenerate sizes.
    #[inline]
    pub const fn area(self) -> i64 {
        if self.width <= 0 || self.height <= 0 {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Convert to a [`Region`] positioned at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region { x: 0, y: 0, width: self.width, height: self.height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangular region in terminal cells defined by position and size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a region from its exclusive corner coordinates.
    #[inline]
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Region { x: left, y: top, width: right - left, height: bottom - top }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The top-left corner as an [`Offset`].
    #[inline]
    pub const fn offset(self) -> Offset {
        Offset { x: self.x, y: self.y }
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Number of cells covered.
    #[inline]
    pub const fn area(self) -> i64 {
        self.size().area()
    }

    /// Whether the region covers no cells.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the point (x, y) lies inside this region.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` is entirely contained within this region.
    #[inline]
    pub const fn contains_region(self, other: Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether `other` overlaps this region (non-zero intersection area).
    #[inline]
    pub const fn overlaps(self, other: Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Compute the intersection of two regions.
    ///
    /// Returns [`Region::EMPTY`] if the regions do not overlap.
    #[inline]
    pub fn intersection(self, other: Region) -> Region {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            Region::EMPTY
        } else {
            Region::from_edges(left, top, right, bottom)
        }
    }

    /// Subtract `other` from this region.
    ///
    /// Returns at most four disjoint pieces: a full-width band above, a
    /// full-width band below, and the left and right slivers of the middle
    /// band. Empty pieces are discarded. If the regions do not overlap the
    /// result is `self` unchanged.
    pub fn subtract(self, other: Region) -> Vec<Region> {
        if self.is_empty() {
            return Vec::new();
        }
        let cut = self.intersection(other);
        if cut.is_empty() {
            return vec![self];
        }

        let pieces = [
            Region::from_edges(self.x, self.y, self.right(), cut.y),
            Region::from_edges(self.x, cut.bottom(), self.right(), self.bottom()),
            Region::from_edges(self.x, cut.y, cut.x, cut.bottom()),
            Region::from_edges(cut.right(), cut.y, self.right(), cut.bottom()),
        ];
        pieces.into_iter().filter(|r| !r.is_empty()).collect()
    }

    /// Translate the region by an [`Offset`].
    #[inline]
    pub const fn translate(self, offset: Offset) -> Region {
        Region { x: self.x + offset.x, y: self.y + offset.y, width: self.width, height: self.height }
    }

    /// Contract the region inward by the given [`Spacing`].
    ///
    /// Width and height are clamped to zero to avoid negative dimensions.
    #[inline]
    pub const fn shrink(self, margin: Spacing) -> Region {
        let w = self.width - margin.left - margin.right;
        let h = self.height - margin.top - margin.bottom;
        Region {
            x: self.x + margin.left,
            y: self.y + margin.top,
            width: if w > 0 { w } else { 0 },
            height: if h > 0 { h } else { 0 },
        }
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Spacing around the four sides of a rectangle: border and padding widths.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    /// Zero spacing on all sides.
    pub const ZERO: Spacing = Spacing { top: 0, right: 0, bottom: 0, left: 0 };

    /// Create spacing with explicit values for each side.
    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// All four sides set to the same value.
    #[inline]
    pub const fn all(value: i32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Total horizontal extent: `left + right`.
    #[inline]
    pub const fn width(self) -> i32 {
        self.left + self.right
    }

    /// Total vertical extent: `top + bottom`.
    #[inline]
    pub const fn height(self) -> i32 {
        self.top + self.bottom
    }
}

impl Add for Spacing {
    type Output = Spacing;
    #[inline]
    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Offset / Size
    // -----------------------------------------------------------------------

    #[test]
    fn offset_arithmetic() {
        let a = Offset::new(1, 2);
        let b = Offset::new(3, 4);
        assert_eq!(a + b, Offset::new(4, 6));
        assert_eq!(b - a, Offset::new(2, 2));
        assert_eq!(-a, Offset::new(-1, -2));
    }

    #[test]
    fn size_area_clamps_negative() {
        assert_eq!(Size::new(4, 5).area(), 20);
        assert_eq!(Size::new(-4, 5).area(), 0);
        assert_eq!(Size::ZERO.area(), 0);
    }

    // -----------------------------------------------------------------------
    // Region
    // -----------------------------------------------------------------------

    #[test]
    fn region_edges() {
        let r = Region::new(2, 3, 10, 5);
        assert_eq!(r.right(), 12);
        assert_eq!(r.bottom(), 8);
        assert_eq!(Region::from_edges(2, 3, 12, 8), r);
    }

    #[test]
    fn region_contains_and_overlaps() {
        let r = Region::new(0, 0, 10, 10);
        assert!(r.contains(0, 0));
        assert!(!r.contains(10, 0));
        assert!(r.contains_region(Region::new(2, 2, 8, 8)));
        assert!(!r.contains_region(Region::new(2, 2, 9, 8)));
        assert!(r.overlaps(Region::new(9, 9, 5, 5)));
        assert!(!r.overlaps(Region::new(10, 0, 5, 5)));
    }

    #[test]
    fn region_intersection() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert_eq!(a.intersection(b), Region::new(5, 5, 5, 5));
        assert_eq!(a.intersection(Region::new(20, 20, 1, 1)), Region::EMPTY);
        assert_eq!(a.intersection(Region::new(10, 0, 5, 5)), Region::EMPTY);
    }

    #[test]
    fn subtract_disjoint_returns_self() {
        let a = Region::new(0, 0, 4, 4);
        assert_eq!(a.subtract(Region::new(10, 10, 2, 2)), vec![a]);
    }

    #[test]
    fn subtract_covering_returns_nothing() {
        let a = Region::new(2, 2, 4, 4);
        assert!(a.subtract(Region::new(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn subtract_center_hole_gives_four_pieces() {
        let a = Region::new(0, 0, 10, 10);
        let pieces = a.subtract(Region::new(3, 3, 4, 4));
        assert_eq!(pieces.len(), 4);
        let area: i64 = pieces.iter().map(|r| r.area()).sum();
        assert_eq!(area, 100 - 16);
        for (i, p) in pieces.iter().enumerate() {
            for q in &pieces[i + 1..] {
                assert!(!p.overlaps(*q));
            }
        }
    }

    #[test]
    fn subtract_corner_gives_two_pieces() {
        let a = Region::new(0, 0, 10, 10);
        let pieces = a.subtract(Region::new(5, 5, 10, 10));
        assert_eq!(
            pieces,
            vec![Region::new(0, 0, 10, 5), Region::new(0, 5, 5, 5)]
        );
    }

    #[test]
    fn shrink_clamps_to_zero() {
        let r = Region::new(0, 0, 3, 3).shrink(Spacing::all(2));
        assert_eq!(r.width, 0);
        assert_eq!(r.height, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn spacing_extents() {
        let s = Spacing::new(1, 2, 3, 4);
        assert_eq!(s.width(), 6);
        assert_eq!(s.height(), 4);
        assert_eq!(s + Spacing::all(1), Spacing::new(2, 3, 4, 5));
    }
}
