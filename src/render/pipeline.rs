//! Layout and paint pipeline.
//!
//! A pass runs in three steps:
//!
//! 1. [`compute_styles`]: cascade every node and inherit from its parent.
//! 2. [`measure`]: run the layout primitive. If any style holds a `calc()`
//!    size, it is resolved against the parent's content box and layout runs
//!    again, one tree depth at a time from the root down.
//! 3. [`paint`]: walk the tree depth first into a [`Grid`], then paint the
//!    top layer above it.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace};

use crate::css::calc::{Axis, CalcContext};
use crate::css::model::PseudoElement;
use crate::css::styles::{Background, ContentItem, Styles};
use crate::css::value::StyleValue;
use crate::css::StylesheetRegistry;
use crate::dom::{Dom, NodeId};
use crate::geometry::{Offset, Region, Size, Spacing};
use crate::layout::{ContentMeasure, LayoutError, LayoutInput, LayoutMap, LayoutPrimitive};
use crate::session::RenderConfig;
use crate::widgets::RendererRegistry;

use super::border::{draw_box, BorderGlyphs};
use super::cell::{Cell, CellStyle};
use super::compositor::{Compositor, TopLayer, TopLayerKind};
use super::dialog::DialogManager;
use super::grid::Grid;
use super::text;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A sixel image positioned on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SixelPlacement {
    /// Top-left cell.
    pub x: i32,
    pub y: i32,
    /// Cells covered.
    pub columns: i32,
    pub rows: i32,
    /// `DCS q … ST` bytes.
    pub data: Vec<u8>,
}

/// The output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub grid: Grid,
    pub sixels: Vec<SixelPlacement>,
}

impl Frame {
    /// The grid's rows joined by newlines.
    pub fn text(&self) -> String {
        self.grid.to_lines().join("\n")
    }
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// Cascade every node reachable from the root and inherit from its parent.
/// Text nodes carry only inherited values.
pub fn compute_styles(dom: &Dom, registry: &StylesheetRegistry) -> HashMap<NodeId, Styles> {
    let mut computed: HashMap<NodeId, Styles> = HashMap::new();
    let Some(root) = dom.root() else {
        return computed;
    };
    let mut stack = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        let mut styles = registry.compute_style(dom, node);
        if let Some(parent_styles) = parent.and_then(|p| computed.get(&p)) {
            styles.inherit_from(parent_styles);
        }
        computed.insert(node, styles);
        for &child in dom.children(node).iter().rev() {
            stack.push((child, Some(node)));
        }
    }
    computed
}

/// Border plus padding on each side. Percentages resolve against `basis`.
pub fn insets(styles: &Styles, basis: i32) -> Spacing {
    let border = styles.border_kind().width();
    let ctx = CalcContext::new(basis as f32, 0.0, Axis::Horizontal);
    let side = |v: &StyleValue| v.resolve(&ctx).map_or(0, |n| n.max(0.0).round() as i32);
    let padding = styles.padding.as_ref().map_or(Spacing::ZERO, |p| {
        Spacing::new(side(&p.top), side(&p.right), side(&p.bottom), side(&p.left))
    });
    Spacing::all(border) + padding
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// Read-only view for sizing content-based elements.
pub struct MeasureContext<'a> {
    pub dom: &'a Dom,
    pub styles: &'a HashMap<NodeId, Styles>,
    pub config: &'a RenderConfig,
    empty: Styles,
}

impl<'a> MeasureContext<'a> {
    pub fn new(dom: &'a Dom, styles: &'a HashMap<NodeId, Styles>, config: &'a RenderConfig) -> Self {
        Self {
            dom,
            styles,
            config,
            empty: Styles::new(),
        }
    }

    pub fn style(&self, node: NodeId) -> &Styles {
        self.styles.get(&node).unwrap_or(&self.empty)
    }
}

struct Measurer<'a> {
    ctx: MeasureContext<'a>,
    renderers: &'a RendererRegistry,
}

impl ContentMeasure for Measurer<'_> {
    fn is_measured_leaf(&self, dom: &Dom, node: NodeId) -> bool {
        match dom.get(node) {
            Some(data) if data.is_text() => true,
            Some(data) => data
                .tag()
                .and_then(|tag| self.renderers.get(tag))
                .is_some_and(|r| r.custom_layout()),
            None => false,
        }
    }

    fn measure(&self, dom: &Dom, node: NodeId, available_width: Option<f32>) -> Size {
        let width = available_width.map(|w| w.floor() as i32);
        let Some(data) = dom.get(node) else {
            return Size::ZERO;
        };
        if let Some(content) = data.text_content() {
            return text::measure(content, width, self.ctx.style(node).white_space());
        }
        data.tag()
            .and_then(|tag| self.renderers.get(tag))
            .map_or(Size::ZERO, |r| r.measure(&self.ctx, node, width))
    }
}

/// Lay out the tree. Calc sizes in `styles` are resolved in place when a
/// second pass is needed.
pub fn measure(
    dom: &Dom,
    styles: &mut HashMap<NodeId, Styles>,
    renderers: &RendererRegistry,
    primitive: &mut dyn LayoutPrimitive,
    viewport: Size,
    config: &RenderConfig,
) -> Result<LayoutMap, LayoutError> {
    let first = run_layout(dom, styles, renderers, primitive, viewport, config)?;

    // Shallow nodes first: a child's container may itself be a calc size.
    let mut levels: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    for (&node, node_styles) in styles.iter() {
        if node_styles.has_calc() {
            levels.entry(dom.ancestors(node).len()).or_default().push(node);
        }
    }
    if levels.is_empty() {
        return Ok(first);
    }

    debug!(levels = levels.len(), "resolving calc sizes");
    let mut layout = first;
    for nodes in levels.into_values() {
        for node in nodes {
            let container = container_size(dom, styles, &layout, node, viewport);
            if let Some(node_styles) = styles.get_mut(&node) {
                node_styles.resolve_calc(CalcContext::new(
                    container.width as f32,
                    container.height as f32,
                    Axis::Horizontal,
                ));
            }
        }
        layout = run_layout(dom, styles, renderers, primitive, viewport, config)?;
    }
    Ok(layout)
}

fn run_layout(
    dom: &Dom,
    styles: &HashMap<NodeId, Styles>,
    renderers: &RendererRegistry,
    primitive: &mut dyn LayoutPrimitive,
    viewport: Size,
    config: &RenderConfig,
) -> Result<LayoutMap, LayoutError> {
    let measurer = Measurer {
        ctx: MeasureContext::new(dom, styles, config),
        renderers,
    };
    primitive.compute(&LayoutInput {
        dom,
        styles,
        measurer: &measurer,
        viewport,
    })
}

/// The parent's content box size; the viewport for the root.
fn container_size(dom: &Dom, styles: &HashMap<NodeId, Styles>, layout: &LayoutMap, node: NodeId, viewport: Size) -> Size {
    let Some(parent) = dom.parent(node) else {
        return viewport;
    };
    let region = layout.get(&parent).copied().unwrap_or(Region::EMPTY);
    match styles.get(&parent) {
        Some(parent_styles) => region.shrink(insets(parent_styles, region.width)).size(),
        None => region.size(),
    }
}

/// Open modal dialogs. These are centered in the viewport.
pub fn modal_nodes(dom: &Dom) -> HashSet<NodeId> {
    let Some(root) = dom.root() else {
        return HashSet::new();
    };
    dom.walk_depth_first(root)
        .into_iter()
        .filter(|&n| dom.get(n).is_some_and(|d| d.state.modal && d.is_open()))
        .collect()
}

/// Convert parent-relative boxes into absolute ones, applying each
/// container's scroll offset to its children. Nodes in `centered` are moved
/// to the middle of the viewport. Missing boxes are empty.
pub fn absolute_regions(dom: &Dom, layout: &LayoutMap, viewport: Size, centered: &HashSet<NodeId>) -> HashMap<NodeId, Region> {
    let mut regions = HashMap::new();
    let Some(root) = dom.root() else {
        return regions;
    };
    let mut stack = vec![(root, Offset::ZERO)];
    while let Some((node, origin)) = stack.pop() {
        let relative = layout.get(&node).copied().unwrap_or(Region::EMPTY);
        let mut region = relative.translate(origin);
        if centered.contains(&node) {
            region.x = (viewport.width - region.width).max(0) / 2;
            region.y = (viewport.height - region.height).max(0) / 2;
        }
        regions.insert(node, region);

        let scroll = dom.get(node).map_or(Offset::ZERO, |d| d.scroll);
        let child_origin = region.offset() - scroll;
        for &child in dom.children(node).iter().rev() {
            stack.push((child, child_origin));
        }
    }
    regions
}

// ---------------------------------------------------------------------------
// Paint context
// ---------------------------------------------------------------------------

/// Everything a renderer can read or write while painting one node.
pub struct PaintContext<'a> {
    pub dom: &'a Dom,
    pub registry: &'a StylesheetRegistry,
    pub styles: &'a HashMap<NodeId, Styles>,
    pub regions: &'a HashMap<NodeId, Region>,
    pub compositor: &'a Compositor,
    pub config: &'a RenderConfig,
    pub grid: &'a mut Grid,
    pub sixels: &'a mut Vec<SixelPlacement>,
    /// Writes outside this region are dropped.
    pub clip: Region,
    /// Stacking level of the node being painted.
    pub z_index: i32,
    empty: Styles,
}

impl PaintContext<'_> {
    pub fn style(&self, node: NodeId) -> &Styles {
        self.styles.get(&node).unwrap_or(&self.empty)
    }

    /// The node's cell style, or `None` when it is plain.
    pub fn cell_style(&self, node: NodeId) -> Option<CellStyle> {
        Some(CellStyle::from_styles(self.style(node))).filter(|s| !s.is_plain())
    }

    /// Absolute border box.
    pub fn region(&self, node: NodeId) -> Region {
        self.regions.get(&node).copied().unwrap_or(Region::EMPTY)
    }

    /// Absolute content box.
    pub fn content_box(&self, node: NodeId) -> Region {
        let region = self.region(node);
        region.shrink(insets(self.style(node), region.width))
    }

    /// Style of a pseudo-element of `node`, inheriting from the node.
    /// `None` when no rule targets it.
    pub fn pseudo_style(&self, node: NodeId, pseudo: &PseudoElement) -> Option<Styles> {
        if !self.registry.has_pseudo_rules(self.dom, node, pseudo) {
            return None;
        }
        let mut styles = self.registry.compute_pseudo_style(self.dom, node, pseudo);
        styles.inherit_from(self.style(node));
        Some(styles)
    }

    /// Write text at `(x, y)` within the current clip.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, style: Option<CellStyle>) -> i32 {
        self.grid.put_str(x, y, text, style, self.clip)
    }

    /// Fill a region within the current clip.
    pub fn fill(&mut self, region: Region, style: Option<CellStyle>) {
        self.grid.fill(region, style, self.clip);
    }
}

// ---------------------------------------------------------------------------
// Paint
// ---------------------------------------------------------------------------

/// Inputs to [`paint`].
pub struct PaintInput<'a> {
    pub dom: &'a Dom,
    pub registry: &'a StylesheetRegistry,
    pub styles: &'a HashMap<NodeId, Styles>,
    pub layout: &'a LayoutMap,
    pub renderers: &'a RendererRegistry,
    pub dialogs: &'a DialogManager,
    pub config: &'a RenderConfig,
    pub viewport: Size,
}

/// Paint the tree and its top layer into a new frame.
///
/// The compositor and top layer are reset first; after the pass they hold
/// this frame's occlusion zones and overlays.
pub fn paint(input: &PaintInput<'_>, compositor: &mut Compositor, top_layer: &mut TopLayer) -> Frame {
    compositor.begin_pass();
    top_layer.clear();

    let regions = absolute_regions(input.dom, input.layout, input.viewport, &modal_nodes(input.dom));

    let mut grid = Grid::new(input.viewport);
    let mut sixels = Vec::new();

    collect_top_layer(input, &regions, compositor, &mut grid, &mut sixels, top_layer);
    top_layer.register_occlusion(compositor);

    let deferred: HashSet<NodeId> = top_layer
        .entries()
        .iter()
        .filter(|e| e.paint.is_none())
        .map(|e| e.node)
        .collect();

    let mut painter = Painter {
        ctx: PaintContext {
            dom: input.dom,
            registry: input.registry,
            styles: input.styles,
            regions: &regions,
            compositor,
            config: input.config,
            grid: &mut grid,
            sixels: &mut sixels,
            clip: Region::EMPTY,
            z_index: 0,
            empty: Styles::new(),
        },
        renderers: input.renderers,
        deferred,
    };

    let bounds = painter.ctx.grid.bounds();
    if let Some(root) = input.dom.root() {
        painter.paint_subtree(root, bounds, 0);
    }

    for entry in top_layer.entries_mut() {
        trace!(node = ?entry.node, z = entry.z_index, "top layer");
        painter.ctx.grid.fill(entry.region, None, bounds);
        match entry.paint.as_mut() {
            Some(callback) => callback(&mut *painter.ctx.grid, entry.region.intersection(bounds)),
            None => painter.paint_element(entry.node, bounds, entry.z_index),
        }
    }

    debug!(sixels = sixels.len(), "frame painted");
    Frame { grid, sixels }
}

/// Gather open dialogs, showing popovers and renderer overlays.
fn collect_top_layer(
    input: &PaintInput<'_>,
    regions: &HashMap<NodeId, Region>,
    compositor: &Compositor,
    grid: &mut Grid,
    sixels: &mut Vec<SixelPlacement>,
    top_layer: &mut TopLayer,
) {
    let Some(root) = input.dom.root() else {
        return;
    };
    let nodes = input.dom.walk_depth_first(root);
    let visible = |n: NodeId| input.styles.get(&n).is_some_and(|s| !s.is_hidden());

    let mut overlays: Vec<(TopLayerKind, NodeId)> = nodes
        .iter()
        .filter_map(|&n| {
            let data = input.dom.get(n)?;
            if data.tag() == Some("dialog") && data.is_open() {
                Some((TopLayerKind::Dialog, n))
            } else if data.has_attr("popover") && data.state.popover_open {
                Some((TopLayerKind::Popover, n))
            } else {
                None
            }
        })
        .filter(|&(_, n)| visible(n))
        .collect();
    overlays.sort_by_key(|&(_, n)| input.dialogs.open_sequence(n));
    for (kind, node) in overlays {
        let region = regions.get(&node).copied().unwrap_or(Region::EMPTY);
        top_layer.add(kind, node, region, None);
    }

    let ctx = PaintContext {
        dom: input.dom,
        registry: input.registry,
        styles: input.styles,
        regions,
        compositor,
        config: input.config,
        grid,
        sixels,
        clip: Region::EMPTY,
        z_index: 0,
        empty: Styles::new(),
    };
    for &node in &nodes {
        if !visible(node) {
            continue;
        }
        let Some(renderer) = input.dom.get(node).and_then(|d| d.tag()).and_then(|t| input.renderers.get(t)) else {
            continue;
        };
        if let Some(request) = renderer.top_layer(&ctx, node) {
            top_layer.add(request.kind, node, request.region, Some(request.paint));
        }
    }
}

struct Painter<'a> {
    ctx: PaintContext<'a>,
    renderers: &'a RendererRegistry,
    /// Top-layer owners, painted after the main tree.
    deferred: HashSet<NodeId>,
}

impl Painter<'_> {
    fn paint_subtree(&mut self, node: NodeId, clip: Region, z_index: i32) {
        if self.deferred.contains(&node) {
            return;
        }
        self.paint_element(node, clip, z_index);
    }

    fn paint_element(&mut self, node: NodeId, clip: Region, z_index: i32) {
        let dom = self.ctx.dom;
        let renderers = self.renderers;
        let Some(data) = dom.get(node) else {
            return;
        };
        let styles = self.ctx.style(node);
        if styles.is_hidden() {
            return;
        }
        if let Some(content) = data.text_content() {
            self.paint_text(node, content, clip);
            return;
        }

        let region = self.ctx.region(node);
        trace!(?node, ?region, "paint");
        let renderer = data.tag().and_then(|t| renderers.get(t));
        let form_control = renderer.is_some_and(|r| r.is_form_control());
        let clips = styles.clips_overflow();
        let content = self.ctx.content_box(node);

        self.ctx.clip = clip;
        self.ctx.z_index = z_index;
        self.paint_background(node, region);
        self.paint_border(node, region);
        if let Some(renderer) = renderer {
            renderer.paint(&mut self.ctx, node, content);
        }
        if !form_control {
            self.paint_generated(node, content, &PseudoElement::Before);
        }

        let child_clip = if clips { clip.intersection(content) } else { clip };
        if !renderer.is_some_and(|r| r.custom_children()) {
            // Siblings without a z-index sit at level 0; the stable sort
            // keeps tree order on ties.
            let mut children: Vec<(i32, NodeId)> = dom
                .children(node)
                .iter()
                .map(|&c| (self.ctx.style(c).z_index.unwrap_or(0), c))
                .collect();
            children.sort_by_key(|&(z, _)| z);
            for (_, child) in children {
                let child_z = self.ctx.style(child).z_index.unwrap_or(z_index);
                self.paint_subtree(child, child_clip, child_z);
            }
        }

        if !form_control {
            self.ctx.clip = clip;
            self.ctx.z_index = z_index;
            self.paint_generated(node, content, &PseudoElement::After);
        }
    }

    fn paint_background(&mut self, node: NodeId, region: Region) {
        let background = self.ctx.style(node).background.clone();
        match background {
            Some(Background::Color(color)) if !color.is_transparent() => {
                self.ctx.fill(region, Some(CellStyle::new().with_bg(color)));
            }
            Some(Background::Gradient(gradient)) => {
                let area = region.intersection(self.ctx.clip);
                for y in area.y..area.bottom() {
                    for x in area.x..area.right() {
                        let color = gradient.sample(x - region.x, y - region.y, region.width, region.height);
                        if color.is_transparent() {
                            continue;
                        }
                        let cell = Cell::blank_styled(CellStyle::new().with_bg(color));
                        self.ctx.grid.set(x, y, cell, self.ctx.clip);
                    }
                }
            }
            _ => {}
        }
    }

    fn paint_border(&mut self, node: NodeId, region: Region) {
        let styles = self.ctx.style(node);
        let Some(glyphs) = BorderGlyphs::for_kind(styles.border_kind()) else {
            return;
        };
        let mut style = CellStyle::from_styles(styles);
        style.bg = None;
        if let Some(color) = styles.border.as_ref().and_then(|b| b.color) {
            style.fg = Some(color);
        }
        let style = Some(style).filter(|s| !s.is_plain());
        draw_box(self.ctx.grid, region, &glyphs, style, self.ctx.clip);
    }

    /// `::before` at the top-left of the content box, `::after` right-aligned
    /// on its last row.
    fn paint_generated(&mut self, node: NodeId, content: Region, pseudo: &PseudoElement) {
        let Some(pseudo_styles) = self.ctx.pseudo_style(node, pseudo) else {
            return;
        };
        let Some(items) = &pseudo_styles.content else {
            return;
        };
        let dom = self.ctx.dom;
        let Some(data) = dom.get(node) else {
            return;
        };
        let generated: String = items
            .iter()
            .map(|item| match item {
                ContentItem::Text(text) => text.clone(),
                ContentItem::Attr(name) => data.attr_or(name, "").into_owned(),
            })
            .collect();
        if generated.is_empty() || content.is_empty() {
            return;
        }
        let style = Some(CellStyle::from_styles(&pseudo_styles)).filter(|s| !s.is_plain());
        let (x, y) = match pseudo {
            PseudoElement::After => (
                content.right() - text::display_width(&generated).min(content.width),
                content.bottom() - 1,
            ),
            _ => (content.x, content.y),
        };
        let clip = self.ctx.clip.intersection(content);
        self.ctx.grid.put_str(x, y, &generated, style, clip);
    }

    fn paint_text(&mut self, node: NodeId, content: &str, clip: Region) {
        let region = self.ctx.region(node);
        let styles = self.ctx.style(node);
        let lines = text::wrap(content, Some(region.width), styles.white_space());
        let align = styles.text_align();
        let style = self.ctx.cell_style(node);
        for (row, line) in lines.iter().enumerate() {
            let x = region.x + align.offset(region.width, text::display_width(line));
            self.ctx.grid.put_str(x, region.y + row as i32, line, style, clip);
        }
    }
}

// ==========================================================================
// Tests
// ==========================================================================
