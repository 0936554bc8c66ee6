//! Layout primitive trait and its taffy-backed implementation.
//!
//! [`TaffyLayout`] synchronizes the DOM tree to a taffy layout tree, runs
//! layout with a content measurer for leaves, and reports parent-relative
//! boxes as [`Region`]s.

use std::collections::{HashMap, HashSet};

use taffy::prelude::*;
use tracing::debug;

use crate::css::styles::{Display as CssDisplay, Styles};
use crate::css::value::StyleValue;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::geometry::{Region, Size};

use super::resolve::resolve_styles;
use super::LayoutError;

/// Parent-relative border boxes keyed by node.
pub type LayoutMap = HashMap<NodeId, Region>;

/// Sizes content-based leaves (text, custom-layout elements).
pub trait ContentMeasure {
    /// Whether `node` is sized by its content. Its children are not laid out.
    fn is_measured_leaf(&self, dom: &Dom, node: NodeId) -> bool;

    /// Content size of `node` given the width available to it, if known.
    fn measure(&self, dom: &Dom, node: NodeId, available_width: Option<f32>) -> Size;
}

/// Everything a layout primitive needs for one pass.
pub struct LayoutInput<'a> {
    pub dom: &'a Dom,
    /// Per-node computed styles. Missing entries use the default style.
    pub styles: &'a HashMap<NodeId, Styles>,
    pub measurer: &'a dyn ContentMeasure,
    pub viewport: Size,
}

/// Computes box geometry for a styled tree.
///
/// Implementations return parent-relative border boxes. Nodes absent from the
/// result are treated as empty boxes by the pipeline.
pub trait LayoutPrimitive {
    fn compute(&mut self, input: &LayoutInput<'_>) -> Result<LayoutMap, LayoutError>;
}

/// Wraps a [`TaffyTree`] and maintains a mapping from DOM [`NodeId`]s to
/// taffy node ids.
pub struct TaffyLayout {
    /// The taffy tree, parameterized with our DOM NodeId as context data.
    tree: TaffyTree<NodeId>,
    /// Maps DOM NodeId -> taffy NodeId for quick lookup.
    node_map: HashMap<NodeId, taffy::prelude::NodeId>,
    /// The taffy root node, if a layout has been synced.
    root: Option<taffy::prelude::NodeId>,
}

fn engine_error(err: taffy::TaffyError) -> LayoutError {
    LayoutError::Engine(err.to_string())
}

impl TaffyLayout {
    /// Create a new, empty layout.
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            node_map: HashMap::new(),
            root: None,
        }
    }

    /// Synchronize the taffy tree with the DOM structure.
    ///
    /// Walks the DOM from the root, creating or updating taffy nodes. Stale
    /// taffy nodes are removed. Children of measured leaves are left out.
    /// The root fills the viewport on any axis its style leaves `auto`.
    pub fn sync_tree(&mut self, input: &LayoutInput<'_>) -> Result<(), LayoutError> {
        let dom = input.dom;
        let Some(dom_root) = dom.root() else {
            self.clear();
            return Ok(());
        };

        // Collect live nodes with their parent's display.
        let mut live: Vec<(NodeId, Option<CssDisplay>)> = Vec::new();
        let mut stack = vec![(dom_root, None)];
        while let Some((node, parent_display)) = stack.pop() {
            if !dom.contains(node) {
                continue;
            }
            live.push((node, parent_display));
            if input.measurer.is_measured_leaf(dom, node) {
                continue;
            }
            let display = input.styles.get(&node).map_or(CssDisplay::Block, Styles::display);
            for &child in dom.children(node).iter().rev() {
                stack.push((child, Some(display)));
            }
        }
        let live_set: HashSet<NodeId> = live.iter().map(|(n, _)| *n).collect();

        let stale: Vec<NodeId> = self
            .node_map
            .keys()
            .filter(|k| !live_set.contains(k))
            .copied()
            .collect();
        for key in stale {
            if let Some(taffy_id) = self.node_map.remove(&key) {
                self.tree.remove(taffy_id).map_err(engine_error)?;
            }
        }

        let default_styles = Styles::new();
        for &(dom_id, parent_display) in &live {
            let node_styles = input.styles.get(&dom_id).unwrap_or(&default_styles);
            let mut taffy_style = resolve_styles(node_styles, parent_display);
            if dom_id == dom_root {
                fill_viewport(&mut taffy_style, node_styles, input.viewport);
            }

            match self.node_map.get(&dom_id) {
                Some(&taffy_id) => self.tree.set_style(taffy_id, taffy_style).map_err(engine_error)?,
                None => {
                    let taffy_id = self
                        .tree
                        .new_leaf_with_context(taffy_style, dom_id)
                        .map_err(engine_error)?;
                    self.node_map.insert(dom_id, taffy_id);
                }
            }
        }

        // Rebuild parent-child relationships to mirror the DOM.
        for &(dom_id, _) in &live {
            let taffy_children: Vec<taffy::prelude::NodeId> = if input.measurer.is_measured_leaf(dom, dom_id) {
                Vec::new()
            } else {
                dom.children(dom_id)
                    .iter()
                    .filter_map(|child| self.node_map.get(child).copied())
                    .collect()
            };
            if let Some(&taffy_id) = self.node_map.get(&dom_id) {
                self.tree
                    .set_children(taffy_id, &taffy_children)
                    .map_err(engine_error)?;
            }
        }

        self.root = self.node_map.get(&dom_root).copied();
        Ok(())
    }

    /// Run taffy layout on the synced tree within the viewport.
    pub fn compute_layout(&mut self, input: &LayoutInput<'_>) -> Result<(), LayoutError> {
        let Some(root) = self.root else {
            return Ok(());
        };
        let dom = input.dom;
        let measurer = input.measurer;
        let available = taffy::geometry::Size {
            width: AvailableSpace::Definite(input.viewport.width.max(0) as f32),
            height: AvailableSpace::Definite(input.viewport.height.max(0) as f32),
        };

        self.tree
            .compute_layout_with_measure(root, available, |known, available, _id, context, _style| {
                if let taffy::geometry::Size {
                    width: Some(width),
                    height: Some(height),
                } = known
                {
                    return taffy::geometry::Size { width, height };
                }
                let Some(node) = context.map(|n| *n) else {
                    return taffy::geometry::Size::ZERO;
                };
                if !measurer.is_measured_leaf(dom, node) {
                    return taffy::geometry::Size::ZERO;
                }
                let width_hint = known.width.or(match available.width {
                    AvailableSpace::Definite(w) => Some(w),
                    AvailableSpace::MinContent | AvailableSpace::MaxContent => None,
                });
                let measured = measurer.measure(dom, node, width_hint);
                taffy::geometry::Size {
                    width: known.width.unwrap_or(measured.width.max(0) as f32),
                    height: known.height.unwrap_or(measured.height.max(0) as f32),
                }
            })
            .map_err(engine_error)
    }

    /// The parent-relative box of one node, rounded to whole cells.
    pub fn get_layout(&self, node: NodeId) -> Option<Region> {
        let taffy_id = self.node_map.get(&node)?;
        let layout = self.tree.layout(*taffy_id).ok()?;
        Some(to_region(layout))
    }

    /// Boxes for every synced node.
    pub fn get_all_layouts(&self) -> LayoutMap {
        self.node_map
            .iter()
            .filter_map(|(&dom_id, &taffy_id)| {
                self.tree.layout(taffy_id).ok().map(|l| (dom_id, to_region(l)))
            })
            .collect()
    }

    /// Remove all taffy nodes and mappings.
    fn clear(&mut self) {
        self.tree.clear();
        self.node_map.clear();
        self.root = None;
    }
}

impl LayoutPrimitive for TaffyLayout {
    fn compute(&mut self, input: &LayoutInput<'_>) -> Result<LayoutMap, LayoutError> {
        self.sync_tree(input)?;
        self.compute_layout(input)?;
        debug!(nodes = self.node_map.len(), "layout computed");
        Ok(self.get_all_layouts())
    }
}

impl Default for TaffyLayout {
    fn default() -> Self {
        Self::new()
    }
}

fn to_region(layout: &taffy::tree::Layout) -> Region {
    Region {
        x: layout.location.x.round() as i32,
        y: layout.location.y.round() as i32,
        width: layout.size.width.round() as i32,
        height: layout.size.height.round() as i32,
    }
}

/// Give an auto-sized root the viewport's size.
fn fill_viewport(style: &mut taffy::Style, styles: &Styles, viewport: Size) {
    let is_auto = |v: &Option<StyleValue>| v.as_ref().map_or(true, StyleValue::is_auto);
    if is_auto(&styles.width) {
        style.size.width = Dimension::from_length(viewport.width.max(0) as f32);
    }
    if is_auto(&styles.height) {
        style.size.height = Dimension::from_length(viewport.height.max(0) as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::styles::FlexDirection;
    use crate::dom::node::NodeData;

    const VP: Size = Size::new(80, 24);

    /// Measures text nodes as one line of their char count.
    struct TextMeasure;

    impl ContentMeasure for TextMeasure {
        fn is_measured_leaf(&self, dom: &Dom, node: NodeId) -> bool {
            dom.get(node).is_some_and(|n| n.is_text())
        }

        fn measure(&self, dom: &Dom, node: NodeId, _available_width: Option<f32>) -> Size {
            let len = dom
                .get(node)
                .and_then(|n| n.text_content())
                .map_or(0, |t| t.chars().count());
            Size::new(len as i32, 1)
        }
    }

    /// Build a simple DOM with root and two children.
    fn simple_dom() -> (Dom, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        let a = dom.insert_child(root, NodeData::element("div"));
        let b = dom.insert_child(root, NodeData::element("div"));
        (dom, root, a, b)
    }

    fn run(dom: &Dom, styles: &HashMap<NodeId, Styles>) -> (TaffyLayout, LayoutMap) {
        let mut layout = TaffyLayout::new();
        let input = LayoutInput {
            dom,
            styles,
            measurer: &TextMeasure,
            viewport: VP,
        };
        let map = layout.compute(&input).unwrap();
        (layout, map)
    }

    fn with_height(h: f32) -> Styles {
        let mut s = Styles::new();
        s.height = Some(StyleValue::Cells(h));
        s
    }

    #[test]
    fn new_layout_is_empty() {
        let layout = TaffyLayout::default();
        assert!(layout.node_map.is_empty());
        assert!(layout.root.is_none());
    }

    #[test]
    fn empty_dom_gives_empty_map() {
        let dom = Dom::new();
        let (_, map) = run(&dom, &HashMap::new());
        assert!(map.is_empty());
    }

    #[test]
    fn root_fills_viewport_and_blocks_stack() {
        let (dom, root, a, b) = simple_dom();
        let mut styles = HashMap::new();
        styles.insert(a, with_height(10.0));
        styles.insert(b, with_height(14.0));
        let (_, map) = run(&dom, &styles);

        assert_eq!(map[&root], Region::new(0, 0, 80, 24));
        assert_eq!(map[&a], Region::new(0, 0, 80, 10));
        assert_eq!(map[&b], Region::new(0, 10, 80, 14));
    }

    #[test]
    fn flex_row_places_side_by_side() {
        let (dom, root, a, b) = simple_dom();
        let mut styles = HashMap::new();
        let mut root_style = Styles::new();
        root_style.display = Some(CssDisplay::Flex);
        root_style.flex_direction = Some(FlexDirection::Row);
        styles.insert(root, root_style);
        let mut a_style = Styles::new();
        a_style.width = Some(StyleValue::Cells(30.0));
        styles.insert(a, a_style);
        let mut b_style = Styles::new();
        b_style.width = Some(StyleValue::Cells(50.0));
        styles.insert(b, b_style);
        let (layout, _) = run(&dom, &styles);

        let a_box = layout.get_layout(a).unwrap();
        let b_box = layout.get_layout(b).unwrap();
        assert_eq!((a_box.x, a_box.width), (0, 30));
        assert_eq!((b_box.x, b_box.width), (30, 50));
    }

    #[test]
    fn text_leaves_are_measured() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        let p = dom.insert_child(root, NodeData::element("p"));
        let text = dom.insert_text(p, "hello");
        let (_, map) = run(&dom, &HashMap::new());
        assert_eq!(map[&text].height, 1);
        assert_eq!(map[&p].height, 1);
    }

    #[test]
    fn resync_drops_removed_nodes() {
        let (mut dom, _root, a, b) = simple_dom();
        let styles = HashMap::new();
        let mut layout = TaffyLayout::new();
        let input = LayoutInput {
            dom: &dom,
            styles: &styles,
            measurer: &TextMeasure,
            viewport: VP,
        };
        layout.compute(&input).unwrap();
        assert!(layout.get_layout(a).is_some());

        dom.remove(a);
        let input = LayoutInput {
            dom: &dom,
            styles: &styles,
            measurer: &TextMeasure,
            viewport: VP,
        };
        let map = layout.compute(&input).unwrap();
        assert!(!map.contains_key(&a));
        assert!(map.contains_key(&b));
    }
}
