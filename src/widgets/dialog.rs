//! Dialog renderer.
//!
//! Dialogs paint like blocks; what they add is user-agent CSS: hidden until
//! open, then positioned absolutely with a double border. Open dialogs are
//! lifted into the top layer by the pipeline and modal ones are centered.

use crate::dom::NodeId;
use crate::geometry::Region;
use crate::render::pipeline::PaintContext;

use super::ElementRenderer;

/// Renders `<dialog>` elements.
pub struct DialogRenderer;

impl ElementRenderer for DialogRenderer {
    fn tag(&self) -> &str {
        "dialog"
    }

    fn default_css(&self) -> &str {
        "dialog { display: none; }\n\
         dialog:open { display: block; position: absolute; border: double; padding: 0 1; }"
    }

    fn paint(&self, _ctx: &mut PaintContext<'_>, _node: NodeId, _content: Region) {}
}

#[cfg(test)]
mod tests {
    use crate::dom::{Dom, NodeData, NodeId};
    use crate::testing::Pilot;
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    fn page(pilot: &mut Pilot) -> (NodeId, NodeId) {
        let dom: &mut Dom = pilot.dom_mut();
        let root = dom.insert(NodeData::element("div"));
        dom.insert_text(root, "background text here");
        let dialog = dom.insert_child(root, NodeData::element("dialog"));
        dom.insert_text(dialog, "Hi");
        (root, dialog)
    }

    #[test]
    fn closed_dialog_is_hidden() {
        let mut pilot = Pilot::new(20, 5);
        page(&mut pilot);
        assert_eq!(pilot.text().unwrap(), "background text here\n\n\n\n");
    }

    #[test]
    fn modal_dialog_is_centered_above_content() {
        let mut pilot = Pilot::new(20, 5).with_css("dialog { width: 8; height: 3; }").unwrap();
        let (_, dialog) = page(&mut pilot);
        pilot.show_modal(dialog, None).unwrap();

        let text = pilot.text().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "background text here",
                "      ╔══════╗",
                "      ║ Hi   ║",
                "      ╚══════╝",
            ]
        );
        assert_eq!(pilot.session().top_layer.entries()[0].z_index, 3000);
    }

    #[test]
    fn escape_hides_modal_again() {
        let mut pilot = Pilot::new(20, 5).with_css("dialog { width: 8; height: 3; }").unwrap();
        let (_, dialog) = page(&mut pilot);
        pilot.show_modal(dialog, None).unwrap();
        pilot.press_key(KeyCode::Esc).unwrap();
        assert_eq!(pilot.text().unwrap(), "background text here\n\n\n\n");
        assert!(pilot.session().top_layer.is_empty());
    }
}
