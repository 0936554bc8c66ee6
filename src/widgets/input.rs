//! Input renderer: text fields, password fields, checkboxes and radios.
//!
//! Text fields show the `value` attribute, or the `placeholder` dimmed when
//! empty. Password values are masked. A focused field that overflows shows
//! its tail, where the caret sits.

use crate::dom::{NodeData, NodeId};
use crate::geometry::{Region, Size};
use crate::render::pipeline::{MeasureContext, PaintContext};
use crate::render::strip::Strip;

use super::ElementRenderer;

/// Width of a text field without a `size` attribute.
const DEFAULT_SIZE: i32 = 20;

const MASK: char = '•';

// ---------------------------------------------------------------------------
// Input kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Text,
    Password,
    Checkbox,
    Radio,
}

impl InputKind {
    fn of(data: &NodeData) -> Self {
        match data.attr_or("type", "text").to_ascii_lowercase().as_str() {
            "password" => InputKind::Password,
            "checkbox" => InputKind::Checkbox,
            "radio" => InputKind::Radio,
            _ => InputKind::Text,
        }
    }

    fn is_toggle(self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Radio)
    }
}

/// What the field shows and whether it is placeholder text.
fn display_text(data: &NodeData) -> (String, bool) {
    let kind = InputKind::of(data);
    let checked = data.is_checked();
    match kind {
        InputKind::Checkbox => (if checked { "[x]" } else { "[ ]" }.to_owned(), false),
        InputKind::Radio => (if checked { "(•)" } else { "( )" }.to_owned(), false),
        InputKind::Text | InputKind::Password => {
            let value = data.attr_or("value", "");
            if value.is_empty() {
                return (data.attr_or("placeholder", "").into_owned(), true);
            }
            if kind == InputKind::Password {
                (std::iter::repeat_n(MASK, value.chars().count()).collect(), false)
            } else {
                (value.into_owned(), false)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// InputRenderer
// ---------------------------------------------------------------------------

/// Renders `<input>` elements.
pub struct InputRenderer;

impl ElementRenderer for InputRenderer {
    fn tag(&self) -> &str {
        "input"
    }

    fn is_form_control(&self) -> bool {
        true
    }

    fn custom_layout(&self) -> bool {
        true
    }

    fn measure(&self, ctx: &MeasureContext<'_>, node: NodeId, _available_width: Option<i32>) -> Size {
        let Some(data) = ctx.dom.get(node) else {
            return Size::ZERO;
        };
        if InputKind::of(data).is_toggle() {
            return Size::new(3, 1);
        }
        let size = data
            .attr("size")
            .and_then(|s| s.trim().parse::<i32>().ok())
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_SIZE);
        Size::new(size, 1)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>, node: NodeId, content: Region) {
        let Some(data) = ctx.dom.get(node) else {
            return;
        };
        if content.is_empty() {
            return;
        }
        let (shown, placeholder) = display_text(data);
        let mut style = ctx.cell_style(node).unwrap_or_default();
        style.dim |= placeholder || data.is_disabled();
        let style = Some(style).filter(|s| !s.is_plain());

        let mut strip = Strip::new(content.y, content.x);
        strip.push_str(&shown, style);
        let overflow = strip.width() - content.width;
        if overflow > 0 && data.state.focused && !placeholder {
            strip.x_offset -= overflow;
        }
        let strip = strip.crop(content.x, content.right());

        let clip = ctx.clip.intersection(content);
        ctx.grid.put_strip(&strip, clip);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;
    use crate::session::RenderSession;
    use crate::testing::render_to_string;
    use pretty_assertions::assert_eq;

    fn render_input(input: NodeData, width: i32) -> (String, Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        let node = dom.insert_child(root, input);
        let mut session = RenderSession::new();
        let output = render_to_string(&mut session, &mut dom, width, 1).unwrap();
        (output, dom, node)
    }

    // -----------------------------------------------------------------------
    // Display text
    // -----------------------------------------------------------------------

    #[test]
    fn kinds_from_type_attribute() {
        let input = |t: &str| NodeData::element("input").with_attr("type", t);
        assert_eq!(InputKind::of(&NodeData::element("input")), InputKind::Text);
        assert_eq!(InputKind::of(&input("PASSWORD")), InputKind::Password);
        assert_eq!(InputKind::of(&input("checkbox")), InputKind::Checkbox);
        assert_eq!(InputKind::of(&input("radio")), InputKind::Radio);
        assert_eq!(InputKind::of(&input("email")), InputKind::Text);
    }

    #[test]
    fn password_is_masked() {
        let data = NodeData::element("input")
            .with_attr("type", "password")
            .with_attr("value", "hunter2");
        assert_eq!(display_text(&data), ("•••••••".to_owned(), false));
    }

    #[test]
    fn empty_value_shows_placeholder() {
        let data = NodeData::element("input").with_attr("placeholder", "Name");
        assert_eq!(display_text(&data), ("Name".to_owned(), true));
    }

    #[test]
    fn toggles_reflect_checked() {
        let checkbox = NodeData::element("input").with_attr("type", "checkbox");
        assert_eq!(display_text(&checkbox).0, "[ ]");
        let checked = checkbox.with_attr("checked", "");
        assert_eq!(display_text(&checked).0, "[x]");
        let radio = NodeData::element("input").with_attr("type", "radio").with_attr("checked", "");
        assert_eq!(display_text(&radio).0, "(•)");
    }

    // -----------------------------------------------------------------------
    // Layout and paint
    // -----------------------------------------------------------------------

    #[test]
    fn size_attribute_sets_width() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        let input = dom.insert_child(root, NodeData::element("input").with_attr("size", "5"));
        let checkbox = dom.insert_child(root, NodeData::element("input").with_attr("type", "checkbox"));
        let mut session = RenderSession::new();
        session.add_stylesheet("app", "div { display: flex; }").unwrap();
        render_to_string(&mut session, &mut dom, 30, 1).unwrap();
        assert_eq!(dom.get(input).and_then(|d| d.layout).map(|r| r.width), Some(5));
        assert_eq!(dom.get(checkbox).and_then(|d| d.layout).map(|r| r.width), Some(3));
    }

    #[test]
    fn value_is_painted_and_cut() {
        let (output, _, _) = render_input(NodeData::element("input").with_attr("value", "abcdefgh"), 5);
        assert_eq!(output, "abcde");
    }

    #[test]
    fn focused_overflow_shows_tail() {
        let mut data = NodeData::element("input").with_attr("value", "abcdefgh");
        data.state.focused = true;
        let (output, _, _) = render_input(data, 5);
        assert_eq!(output, "defgh");
    }

    #[test]
    fn placeholder_is_dim() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        dom.insert_child(root, NodeData::element("input").with_attr("placeholder", "Name"));
        let mut session = RenderSession::new();
        let frame = session.render(&mut dom, Size::new(8, 1)).unwrap();
        assert_eq!(frame.grid.row_text(0), "Name    ");
        assert!(frame.grid.get(0, 0).and_then(|c| c.style).is_some_and(|s| s.dim));
    }
}
