//! Occlusion zones and the top layer.
//!
//! The `Compositor` holds the opaque rectangles registered for one render
//! pass and answers which parts of a rectangle remain visible. The `TopLayer`
//! orders overlay elements (dropdowns, popovers, dialogs) above the main tree
//! by kind band and open order.

use std::fmt;

use tracing::trace;

use crate::dom::NodeId;
use crate::geometry::{Offset, Region};

use super::grid::Grid;

// ---------------------------------------------------------------------------
// Occlusion
// ---------------------------------------------------------------------------

/// An opaque rectangle at a stacking level, valid for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcclusionZone {
    pub region: Region,
    pub z_index: i32,
}

/// A visible piece of a queried rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRegion {
    /// Absolute position of the piece.
    pub region: Region,
    /// Position of the piece relative to the queried rectangle's origin.
    pub offset: Offset,
}

/// Per-pass occlusion state.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    zones: Vec<OcclusionZone>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every zone from the previous pass.
    pub fn begin_pass(&mut self) {
        self.zones.clear();
    }

    /// Register an opaque rectangle. Empty rectangles are ignored.
    pub fn add_occlusion_zone(&mut self, region: Region, z_index: i32) {
        if region.is_empty() {
            return;
        }
        trace!(?region, z_index, "occlusion zone");
        self.zones.push(OcclusionZone { region, z_index });
    }

    pub fn zones(&self) -> &[OcclusionZone] {
        &self.zones
    }

    /// Whether one zone covers the whole of `region`.
    ///
    /// Coverage by several zones together does not count.
    pub fn is_rect_fully_occluded(&self, region: Region) -> bool {
        !region.is_empty() && self.zones.iter().any(|z| z.region.contains_region(region))
    }

    /// The parts of `region` no zone covers.
    pub fn visible_regions(&self, region: Region) -> Vec<VisibleRegion> {
        slice(region, self.zones.iter())
    }

    /// The parts of `region` not covered by zones stacked above `z_index`.
    pub fn visible_regions_above(&self, region: Region, z_index: i32) -> Vec<VisibleRegion> {
        slice(region, self.zones.iter().filter(|z| z.z_index > z_index))
    }
}

/// Subtract each zone in turn. Pieces stay disjoint, so their areas add up
/// to the uncovered area exactly.
fn slice<'a>(region: Region, zones: impl Iterator<Item = &'a OcclusionZone>) -> Vec<VisibleRegion> {
    let mut pieces = if region.is_empty() { Vec::new() } else { vec![region] };
    for zone in zones {
        if pieces.is_empty() {
            break;
        }
        pieces = pieces
            .into_iter()
            .flat_map(|piece| piece.subtract(zone.region))
            .collect();
    }
    pieces
        .into_iter()
        .map(|piece| VisibleRegion {
            region: piece,
            offset: Offset::new(piece.x - region.x, piece.y - region.y),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Top layer
// ---------------------------------------------------------------------------

/// Overlay kinds, lowest band first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopLayerKind {
    Dropdown,
    Popover,
    Dialog,
}

impl TopLayerKind {
    /// Base z-index of the kind's band.
    pub const fn band(self) -> i32 {
        match self {
            TopLayerKind::Dropdown => 1000,
            TopLayerKind::Popover => 2000,
            TopLayerKind::Dialog => 3000,
        }
    }
}

/// Paints an overlay into the grid within the given region.
pub type PaintCallback = Box<dyn FnMut(&mut Grid, Region)>;

/// One overlay element.
pub struct TopLayerEntry {
    pub kind: TopLayerKind,
    pub node: NodeId,
    pub region: Region,
    pub z_index: i32,
    /// Custom paint. Without one the owner node's subtree is painted.
    pub paint: Option<PaintCallback>,
}

impl fmt::Debug for TopLayerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopLayerEntry")
            .field("kind", &self.kind)
            .field("node", &self.node)
            .field("region", &self.region)
            .field("z_index", &self.z_index)
            .field("paint", &self.paint.is_some())
            .finish()
    }
}

/// Overlay elements of one pass, sorted ascending by z-index.
#[derive(Debug, Default)]
pub struct TopLayer {
    entries: Vec<TopLayerEntry>,
}

impl TopLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overlay and return its z-index: the kind's band plus the
    /// number of same-kind entries added before it.
    pub fn add(&mut self, kind: TopLayerKind, node: NodeId, region: Region, paint: Option<PaintCallback>) -> i32 {
        let offset = self.entries.iter().filter(|e| e.kind == kind).count() as i32;
        let z_index = kind.band() + offset;
        self.entries.push(TopLayerEntry {
            kind,
            node,
            region,
            z_index,
            paint,
        });
        self.entries.sort_by_key(|e| e.z_index);
        z_index
    }

    pub fn entries(&self) -> &[TopLayerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `node` owns an entry.
    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.iter().any(|e| e.node == node)
    }

    /// Register every entry's bounds with the compositor.
    pub fn register_occlusion(&self, compositor: &mut Compositor) {
        for entry in &self.entries {
            compositor.add_occlusion_zone(entry.region, entry.z_index);
        }
    }

    /// Entries in paint order. Z-indices are fixed once added.
    pub fn entries_mut(&mut self) -> &mut [TopLayerEntry] {
        &mut self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Dom, NodeData};
    use pretty_assertions::assert_eq;

    fn area(pieces: &[VisibleRegion]) -> i64 {
        pieces.iter().map(|p| p.region.area()).sum()
    }

    /// Count the cells of `region` under at least one zone.
    fn occluded_cells(region: Region, zones: &[Region]) -> i64 {
        let mut count = 0;
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                if zones.iter().any(|z| z.contains(x, y)) {
                    count += 1;
                }
            }
        }
        count
    }

    // -----------------------------------------------------------------------
    // Occlusion
    // -----------------------------------------------------------------------

    #[test]
    fn no_zones_leaves_region_whole() {
        let c = Compositor::new();
        let r = Region::new(2, 3, 10, 4);
        assert_eq!(
            c.visible_regions(r),
            vec![VisibleRegion {
                region: r,
                offset: Offset::ZERO
            }]
        );
        assert!(!c.is_rect_fully_occluded(r));
    }

    #[test]
    fn fully_occluded_needs_single_zone() {
        let mut c = Compositor::new();
        c.add_occlusion_zone(Region::new(0, 0, 5, 10), 1);
        c.add_occlusion_zone(Region::new(5, 0, 5, 10), 1);
        let r = Region::new(2, 2, 6, 2);
        assert!(!c.is_rect_fully_occluded(r));
        assert!(c.visible_regions(r).is_empty());

        c.add_occlusion_zone(Region::new(0, 0, 20, 20), 1);
        assert!(c.is_rect_fully_occluded(r));
    }

    #[test]
    fn pieces_carry_offsets() {
        let mut c = Compositor::new();
        c.add_occlusion_zone(Region::new(0, 0, 10, 2), 1);
        let pieces = c.visible_regions(Region::new(0, 0, 10, 5));
        assert_eq!(
            pieces,
            vec![VisibleRegion {
                region: Region::new(0, 2, 10, 3),
                offset: Offset::new(0, 2)
            }]
        );
    }

    #[test]
    fn center_hole_yields_four_pieces() {
        let mut c = Compositor::new();
        c.add_occlusion_zone(Region::new(3, 3, 2, 2), 1);
        let r = Region::new(0, 0, 8, 8);
        let pieces = c.visible_regions(r);
        assert_eq!(pieces.len(), 4);
        assert_eq!(area(&pieces), 64 - 4);
    }

    #[test]
    fn visible_plus_occluded_equals_area() {
        let zone_sets: Vec<Vec<Region>> = vec![
            vec![],
            vec![Region::new(1, 1, 3, 3)],
            vec![Region::new(-5, -5, 100, 100)],
            vec![Region::new(0, 0, 4, 4), Region::new(2, 2, 4, 4)],
            vec![Region::new(5, 0, 1, 20), Region::new(0, 5, 20, 1), Region::new(4, 4, 3, 3)],
            vec![Region::new(10, 10, 5, 5), Region::new(-3, 2, 6, 2), Region::new(7, -1, 2, 30)],
        ];
        let rects = [Region::new(0, 0, 12, 9), Region::new(3, 2, 5, 7), Region::new(-2, -2, 20, 3)];

        for zones in &zone_sets {
            let mut c = Compositor::new();
            for z in zones {
                c.add_occlusion_zone(*z, 0);
            }
            for r in rects {
                let visible = area(&c.visible_regions(r));
                assert_eq!(visible + occluded_cells(r, zones), r.area(), "{r:?} {zones:?}");
            }
        }
    }

    #[test]
    fn above_ignores_lower_and_equal_zones() {
        let mut c = Compositor::new();
        c.add_occlusion_zone(Region::new(0, 0, 4, 4), 5);
        c.add_occlusion_zone(Region::new(4, 0, 4, 4), 10);
        let r = Region::new(0, 0, 8, 4);
        assert_eq!(area(&c.visible_regions_above(r, 5)), 16);
        assert_eq!(area(&c.visible_regions_above(r, 0)), 0);
        assert_eq!(area(&c.visible_regions_above(r, 10)), 32);
    }

    #[test]
    fn begin_pass_clears_zones() {
        let mut c = Compositor::new();
        c.add_occlusion_zone(Region::new(0, 0, 1, 1), 0);
        c.add_occlusion_zone(Region::EMPTY, 0);
        assert_eq!(c.zones().len(), 1);
        c.begin_pass();
        assert!(c.zones().is_empty());
    }

    // -----------------------------------------------------------------------
    // Top layer
    // -----------------------------------------------------------------------

    #[test]
    fn kinds_stack_in_bands() {
        let mut dom = Dom::new();
        let a = dom.insert(NodeData::element("dialog"));
        let b = dom.insert(NodeData::element("div"));
        let c = dom.insert(NodeData::element("select"));

        let mut layer = TopLayer::new();
        let r = Region::new(0, 0, 1, 1);
        assert_eq!(layer.add(TopLayerKind::Dialog, a, r, None), 3000);
        assert_eq!(layer.add(TopLayerKind::Popover, b, r, None), 2000);
        assert_eq!(layer.add(TopLayerKind::Dropdown, c, r, None), 1000);
        assert_eq!(layer.add(TopLayerKind::Dialog, b, r, None), 3001);

        let order: Vec<i32> = layer.entries().iter().map(|e| e.z_index).collect();
        assert_eq!(order, vec![1000, 2000, 3000, 3001]);
        assert!(layer.contains(c));
    }

    #[test]
    fn register_occlusion_adds_every_entry() {
        let mut dom = Dom::new();
        let a = dom.insert(NodeData::element("dialog"));
        let mut layer = TopLayer::new();
        layer.add(TopLayerKind::Dialog, a, Region::new(2, 2, 4, 4), None);

        let mut c = Compositor::new();
        layer.register_occlusion(&mut c);
        assert!(c.is_rect_fully_occluded(Region::new(3, 3, 2, 2)));
        assert_eq!(c.visible_regions_above(Region::new(2, 2, 4, 4), 0), vec![]);

        layer.clear();
        assert!(layer.is_empty());
    }
}
