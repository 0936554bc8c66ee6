//! List item renderer: `::marker` glyphs in the item's left padding.

use crate::css::model::PseudoElement;
use crate::css::styles::ListStyle;
use crate::dom::{Dom, NodeId};
use crate::geometry::Region;
use crate::render::cell::CellStyle;
use crate::render::pipeline::PaintContext;
use crate::render::text;

use super::ElementRenderer;

/// Marker text for the `index`th (zero-based) item.
pub fn marker_text(style: ListStyle, index: usize) -> Option<String> {
    match style {
        ListStyle::None => None,
        ListStyle::Disc => Some("•".into()),
        ListStyle::Circle => Some("◦".into()),
        ListStyle::Square => Some("▪".into()),
        ListStyle::Decimal => Some(format!("{}.", index + 1)),
    }
}

/// Position of `item` among its parent's `<li>` children.
fn item_index(dom: &Dom, item: NodeId) -> usize {
    dom.element_siblings(item)
        .into_iter()
        .filter(|&s| dom.get(s).and_then(|d| d.tag()) == Some("li"))
        .position(|s| s == item)
        .unwrap_or(0)
}

/// Renders `<li>` markers. Item content is laid out like a block.
pub struct ListItemRenderer;

impl ElementRenderer for ListItemRenderer {
    fn tag(&self) -> &str {
        "li"
    }

    fn default_css(&self) -> &str {
        "li { padding-left: 2; list-style: disc; }\nol > li { padding-left: 3; list-style: decimal; }"
    }

    /// The marker ends one cell before the content box.
    fn paint(&self, ctx: &mut PaintContext<'_>, node: NodeId, content: Region) {
        let kind = ctx.style(node).list_style.unwrap_or(ListStyle::None);
        let marker_style = ctx.pseudo_style(node, &PseudoElement::Marker);
        let kind = marker_style.as_ref().and_then(|s| s.list_style).unwrap_or(kind);
        let Some(marker) = marker_text(kind, item_index(ctx.dom, node)) else {
            return;
        };
        let style = match &marker_style {
            Some(styles) => Some(CellStyle::from_styles(styles)).filter(|s| !s.is_plain()),
            None => ctx.cell_style(node),
        };
        let x = content.x - text::display_width(&marker) - 1;
        let clip = ctx.clip.intersection(ctx.region(node));
        ctx.grid.put_str(x, content.y, &marker, style, clip);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
