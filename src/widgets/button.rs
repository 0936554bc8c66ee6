//! Button renderer: a label centered within its content box.
//!
//! The label is the button's text content. A disabled button paints it dim.

use crate::dom::NodeId;
use crate::geometry::{Region, Size};
use crate::render::cell::CellStyle;
use crate::render::pipeline::{MeasureContext, PaintContext};
use crate::render::text;

use super::{collapsed_text, ElementRenderer};

// ---------------------------------------------------------------------------
// ButtonRenderer
// ---------------------------------------------------------------------------

/// Renders `<button>` elements.
pub struct ButtonRenderer;

impl ElementRenderer for ButtonRenderer {
    fn tag(&self) -> &str {
        "button"
    }

    fn default_css(&self) -> &str {
        "button { text-align: center; padding: 0 1; }"
    }

    fn is_form_control(&self) -> bool {
        true
    }

    fn custom_layout(&self) -> bool {
        true
    }

    fn measure(&self, ctx: &MeasureContext<'_>, node: NodeId, _available_width: Option<i32>) -> Size {
        Size::new(text::display_width(&collapsed_text(ctx.dom, node)), 1)
    }

    fn custom_children(&self) -> bool {
        true
    }

    fn paint(&self, ctx: &mut PaintContext<'_>, node: NodeId, content: Region) {
        if content.is_empty() {
            return;
        }
        let label = collapsed_text(ctx.dom, node);
        let label = text::truncate_to_width(&label, content.width);

        // Middle row for tall buttons, first row otherwise.
        let row = (content.height - 1) / 2;
        let x = content.x + ctx.style(node).text_align().offset(content.width, text::display_width(label));

        let disabled = ctx.dom.get(node).is_some_and(|d| d.is_disabled());
        let mut style = ctx.cell_style(node).unwrap_or_default();
        style.dim |= disabled;
        let style = Some(style).filter(|s: &CellStyle| !s.is_plain());

        let clip = ctx.clip.intersection(content);
        ctx.grid.put_str(x, content.y + row, label, style, clip);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use crate::dom::{Dom, NodeData, NodeId};
    use crate::geometry::Size;
    use crate::session::RenderSession;
    use crate::testing::render_to_string;
    use pretty_assertions::assert_eq;

    fn button_tree(label: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        let button = dom.insert_child(root, NodeData::element("button"));
        dom.insert_text(button, label);
        (dom, button)
    }

    #[test]
    fn sized_to_label_plus_padding() {
        let (mut dom, button) = button_tree("OK");
        let mut session = RenderSession::new();
        session.add_stylesheet("app", "div { display: flex; }").unwrap();
        render_to_string(&mut session, &mut dom, 20, 1).unwrap();
        assert_eq!(dom.get(button).and_then(|d| d.layout).map(|r| r.width), Some(4));
    }

    #[test]
    fn label_centered_on_middle_row() {
        let (mut dom, _) = button_tree("OK");
        let mut session = RenderSession::new();
        session
            .add_stylesheet("app", "button { width: 10; height: 3; border: none; }")
            .unwrap();
        let output = render_to_string(&mut session, &mut dom, 10, 3).unwrap();
        assert_eq!(output, "\n    OK\n");
    }

    #[test]
    fn long_label_is_truncated() {
        let (mut dom, _) = button_tree("Very Long Label");
        let mut session = RenderSession::new();
        session.add_stylesheet("app", "button { width: 6; }").unwrap();
        let output = render_to_string(&mut session, &mut dom, 10, 1).unwrap();
        assert_eq!(output, " Very");
    }

    #[test]
    fn disabled_label_is_dim() {
        let (mut dom, button) = button_tree("X");
        if let Some(d) = dom.get_mut(button) {
            d.state.disabled = true;
        }
        let mut session = RenderSession::new();
        let frame = session.render(&mut dom, Size::new(3, 1)).unwrap();
        let cell = frame.grid.get(1, 0).copied().unwrap();
        assert_eq!(cell.ch, 'X');
        assert!(cell.style.is_some_and(|s| s.dim));
    }
}
