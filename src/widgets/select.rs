//! Select renderer: a closed box with the selected option, and a dropdown
//! list in the top layer while the select is open.
//!
//! The dropdown is styled by `select::picker(select)` rules. Its border
//! defaults to a thin line.

use crate::css::model::PseudoElement;
use crate::css::styles::BorderKind;
use crate::dom::{Dom, NodeId};
use crate::geometry::{Region, Size, Spacing};
use crate::render::border::{draw_box, BorderGlyphs};
use crate::render::cell::CellStyle;
use crate::render::compositor::TopLayerKind;
use crate::render::grid::Grid;
use crate::render::pipeline::{MeasureContext, PaintContext};
use crate::render::text;

use super::{collapsed_text, ElementRenderer, TopLayerRequest};

const ARROW: &str = " ▾";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Labels of the `<option>` children and the selected index.
///
/// The selected option is the first with a `selected` attribute, else the
/// one whose value matches the select's `value`, else the first.
fn options(dom: &Dom, select: NodeId) -> (Vec<String>, usize) {
    let mut labels = Vec::new();
    let mut selected_attr = None;
    let mut matching_value = None;
    let wanted = dom.get(select).and_then(|d| d.attr("value")).map(|v| v.into_owned());

    for option in dom.element_children(select) {
        let Some(data) = dom.get(option).filter(|d| d.tag() == Some("option")) else {
            continue;
        };
        let label = collapsed_text(dom, option);
        let index = labels.len();
        if selected_attr.is_none() && data.has_attr("selected") {
            selected_attr = Some(index);
        }
        let value = data.attr("value").map_or_else(|| label.clone(), |v| v.into_owned());
        if matching_value.is_none() && wanted.as_deref() == Some(value.as_str()) {
            matching_value = Some(index);
        }
        labels.push(label);
    }
    let selected = selected_attr.or(matching_value).unwrap_or(0);
    (labels, selected)
}

fn widest(labels: &[String]) -> i32 {
    labels.iter().map(|l| text::display_width(l)).max().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Dropdown
// ---------------------------------------------------------------------------

/// Everything the dropdown callback paints; owned so it outlives the pass
/// context.
struct Dropdown {
    labels: Vec<String>,
    selected: usize,
    glyphs: Option<BorderGlyphs>,
    style: Option<CellStyle>,
}

impl Dropdown {
    fn paint(&self, grid: &mut Grid, region: Region) {
        grid.fill(region, self.style, region);
        let inner = match self.glyphs {
            Some(glyphs) => {
                draw_box(grid, region, &glyphs, self.style, region);
                region.shrink(Spacing::all(1))
            }
            None => region,
        };
        for (row, label) in self.labels.iter().enumerate() {
            let y = inner.y + row as i32;
            let mut style = self.style.unwrap_or_default();
            if row == self.selected {
                style.reverse = !style.reverse;
                grid.fill(Region::new(inner.x, y, inner.width, 1), Some(style), inner);
            }
            let style = Some(style).filter(|s| !s.is_plain());
            grid.put_str(inner.x, y, label, style, inner);
        }
    }
}

// ---------------------------------------------------------------------------
// SelectRenderer
// ---------------------------------------------------------------------------

/// Renders `<select>` elements and their open dropdown.
pub struct SelectRenderer;

impl ElementRenderer for SelectRenderer {
    fn tag(&self) -> &str {
        "select"
    }

    fn default_css(&self) -> &str {
        "option { display: none; }"
    }

    fn is_form_control(&self) -> bool {
        true
    }

    fn custom_layout(&self) -> bool {
        true
    }

    fn measure(&self, ctx: &MeasureContext<'_>, node: NodeId, _available_width: Option<i32>) -> Size {
        let (labels, _) = options(ctx.dom, node);
        Size::new(widest(&labels) + text::display_width(ARROW), 1)
    }

    fn custom_children(&self) -> bool {
        true
    }

    fn paint(&self, ctx: &mut PaintContext<'_>, node: NodeId, content: Region) {
        if content.is_empty() {
            return;
        }
        let (labels, selected) = options(ctx.dom, node);
        let style = ctx.cell_style(node);
        let clip = ctx.clip.intersection(content);
        let arrow_width = text::display_width(ARROW);
        if let Some(label) = labels.get(selected) {
            let room = (content.width - arrow_width).max(0);
            ctx.grid.put_str(content.x, content.y, text::truncate_to_width(label, room), style, clip);
        }
        ctx.grid.put_str(content.right() - arrow_width, content.y, ARROW, style, clip);
    }

    fn top_layer(&self, ctx: &PaintContext<'_>, node: NodeId) -> Option<TopLayerRequest> {
        let data = ctx.dom.get(node)?;
        if !data.is_open() {
            return None;
        }
        let (labels, selected) = options(ctx.dom, node);
        if labels.is_empty() {
            return None;
        }

        let picker = ctx.pseudo_style(node, &PseudoElement::Picker("select".into()));
        let (kind, style) = match &picker {
            Some(styles) => (
                styles.border.as_ref().map_or(BorderKind::Thin, |b| b.kind),
                Some(CellStyle::from_styles(styles)).filter(|s| !s.is_plain()),
            ),
            None => (BorderKind::Thin, None),
        };
        let glyphs = BorderGlyphs::for_kind(kind);
        let edge = kind.width();

        let anchor = ctx.region(node);
        let width = anchor.width.max(widest(&labels) + 2 * edge);
        let height = labels.len() as i32 + 2 * edge;
        let region = Region::new(anchor.x, anchor.bottom(), width, height);

        let dropdown = Dropdown {
            labels,
            selected,
            glyphs,
            style,
        };
        Some(TopLayerRequest {
            kind: TopLayerKind::Dropdown,
            region,
            paint: Box::new(move |grid, region| dropdown.paint(grid, region)),
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
