//! Pilot: a headless session plus tree for driving render passes in tests.
//!
//! The `Pilot` owns a [`RenderSession`] and a [`Dom`] of a fixed viewport
//! size, forwards key presses that the render layer reacts to (Escape closes
//! the topmost dialog or popover) and renders to text for snapshot testing.

use crossterm::event::KeyCode;

use crate::dom::{Dom, NodeId};
use crate::geometry::Size;
use crate::render::dialog::DialogError;
use crate::render::pipeline::Frame;
use crate::session::{RenderConfig, RenderError, RenderSession};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless render harness for testing.
///
/// # Examples
///
/// ```ignore
/// use cellcss::testing::Pilot;
///
/// let mut pilot = Pilot::new(40, 10).with_css("p { color: red; }")?;
/// let root = pilot.dom_mut().insert(NodeData::element("div"));
/// pilot.dom_mut().insert_text(root, "hello");
/// assert_eq!(pilot.text()?, "hello");
/// ```
pub struct Pilot {
    session: RenderSession,
    dom: Dom,
    viewport: Size,
}

impl Pilot {
    /// A pilot with the default config and an empty tree.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_config(width, height, RenderConfig::default())
    }

    pub fn with_config(width: i32, height: i32, config: RenderConfig) -> Self {
        Self {
            session: RenderSession::with_config(config),
            dom: Dom::new(),
            viewport: Size::new(width, height),
        }
    }

    /// Register an author stylesheet (builder).
    pub fn with_css(mut self, css: &str) -> Result<Self, RenderError> {
        let id = format!("pilot-{}", self.session.registry.len());
        self.session.add_stylesheet(&id, css)?;
        Ok(self)
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn session(&self) -> &RenderSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut RenderSession {
        &mut self.session
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Change the viewport for following renders.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.viewport = Size::new(width, height);
    }

    /// Simulate a key press. Only Escape has an effect: it dismisses the
    /// topmost modal, auto popover or dialog, returned here.
    pub fn press_key(&mut self, key: KeyCode) -> Result<Option<NodeId>, DialogError> {
        match key {
            KeyCode::Esc => self.session.dialogs.handle_escape(&mut self.dom),
            _ => Ok(None),
        }
    }

    /// Open `dialog` as a modal, remembering `focused` for refocus on close.
    pub fn show_modal(&mut self, dialog: NodeId, focused: Option<NodeId>) -> Result<(), DialogError> {
        self.session.dialogs.show_modal(&mut self.dom, dialog, focused)
    }

    /// Open `dialog` without modality.
    pub fn show(&mut self, dialog: NodeId) -> Result<(), DialogError> {
        self.session.dialogs.show(&mut self.dom, dialog)
    }

    pub fn show_popover(&mut self, popover: NodeId) -> Result<(), DialogError> {
        self.session.dialogs.show_popover(&mut self.dom, popover)
    }

    // ── Render helpers ───────────────────────────────────────────────

    /// Run one render pass over the tree.
    pub fn render(&mut self) -> Result<Frame, RenderError> {
        self.session.render(&mut self.dom, self.viewport)
    }

    /// Render and convert the frame to trimmed text.
    pub fn text(&mut self) -> Result<String, RenderError> {
        let frame = self.render()?;
        Ok(super::snapshot::grid_to_string(&frame.grid))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_has_empty_tree() {
        let pilot = Pilot::new(80, 24);
        assert!(pilot.dom().is_empty());
        assert_eq!(pilot.viewport(), Size::new(80, 24));
    }

    #[test]
    fn with_css_registers_each_sheet() {
        let pilot = Pilot::new(10, 1)
            .with_css("p { color: red; }")
            .unwrap()
            .with_css("p { color: blue; }")
            .unwrap();
        assert_eq!(pilot.session().registry.len(), 2);
    }

    #[test]
    fn resize_changes_viewport() {
        let mut pilot = Pilot::new(10, 1);
        pilot.resize(3, 2);
        let root = pilot.dom_mut().insert(NodeData::element("div"));
        pilot.dom_mut().insert_text(root, "abc def");
        assert_eq!(pilot.text().unwrap(), "abc\ndef");
    }

    #[test]
    fn escape_closes_open_modal() {
        let mut pilot = Pilot::new(20, 5);
        let root = pilot.dom_mut().insert(NodeData::element("div"));
        let button = pilot.dom_mut().insert_child(root, NodeData::element("button"));
        let dialog = pilot.dom_mut().insert_child(root, NodeData::element("dialog"));
        pilot.show_modal(dialog, Some(button)).unwrap();

        assert_eq!(pilot.press_key(KeyCode::Char('q')).unwrap(), None);
        assert_eq!(pilot.press_key(KeyCode::Esc).unwrap(), Some(dialog));
        assert!(!pilot.dom().get(dialog).unwrap().is_open());
    }
}
