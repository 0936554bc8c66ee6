//! Element renderers: per-tag paint, measurement and default CSS.
//!
//! An [`ElementRenderer`] is looked up by tag during a pass. The pipeline
//! paints every element's background and border; the renderer then paints
//! its content. Renderers that opt into custom layout are sized by
//! [`ElementRenderer::measure`] and their children are not laid out.

use std::collections::BTreeMap;

use crate::dom::{Dom, NodeId};
use crate::geometry::{Region, Size};
use crate::render::compositor::{PaintCallback, TopLayerKind};
use crate::render::pipeline::{MeasureContext, PaintContext};

pub mod button;
pub mod dialog;
pub mod image;
pub mod input;
pub mod list;
pub mod select;
pub mod table;

pub use button::ButtonRenderer;
pub use dialog::DialogRenderer;
pub use image::ImageRenderer;
pub use input::InputRenderer;
pub use list::ListItemRenderer;
pub use select::SelectRenderer;
pub use table::TableRenderer;

/// Text of every text node under `node`, whitespace collapsed.
pub(crate) fn collapsed_text(dom: &Dom, node: NodeId) -> String {
    let parts: Vec<&str> = dom
        .descendants(node)
        .into_iter()
        .filter_map(|n| dom.get(n).and_then(|d| d.text_content()))
        .collect();
    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// ElementRenderer trait
// ---------------------------------------------------------------------------

/// An overlay a renderer asks to place in the top layer.
pub struct TopLayerRequest {
    pub kind: TopLayerKind,
    pub region: Region,
    pub paint: PaintCallback,
}

/// Paints one element tag.
///
/// Object-safe: the registry stores `Box<dyn ElementRenderer>`.
pub trait ElementRenderer {
    /// The lowercase tag this renderer handles.
    fn tag(&self) -> &str;

    /// User-agent CSS for the tag. Applied below every author rule.
    fn default_css(&self) -> &str {
        ""
    }

    /// Form controls get no `::before`/`::after` content.
    fn is_form_control(&self) -> bool {
        false
    }

    /// Whether the element is sized by [`measure`](Self::measure) instead
    /// of its children.
    fn custom_layout(&self) -> bool {
        false
    }

    /// Content size given the available width, if known.
    fn measure(&self, _ctx: &MeasureContext<'_>, _node: NodeId, _available_width: Option<i32>) -> Size {
        Size::ZERO
    }

    /// Whether [`paint`](Self::paint) draws the element's children itself.
    fn custom_children(&self) -> bool {
        false
    }

    /// Paint the element's content into `content`, its content box.
    fn paint(&self, ctx: &mut PaintContext<'_>, node: NodeId, content: Region);

    /// An overlay to add to the top layer this pass.
    fn top_layer(&self, _ctx: &PaintContext<'_>, _node: NodeId) -> Option<TopLayerRequest> {
        None
    }
}

// ---------------------------------------------------------------------------
// RendererRegistry
// ---------------------------------------------------------------------------

/// Renderers keyed by tag.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: BTreeMap<String, Box<dyn ElementRenderer>>,
}

impl RendererRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in renderer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ButtonRenderer));
        registry.register(Box::new(InputRenderer));
        registry.register(Box::new(SelectRenderer));
        registry.register(Box::new(TableRenderer));
        registry.register(Box::new(ImageRenderer));
        registry.register(Box::new(ListItemRenderer));
        registry.register(Box::new(DialogRenderer));
        registry
    }

    /// Add a renderer, replacing any for the same tag.
    pub fn register(&mut self, renderer: Box<dyn ElementRenderer>) {
        self.renderers.insert(renderer.tag().to_ascii_lowercase(), renderer);
    }

    pub fn get(&self, tag: &str) -> Option<&dyn ElementRenderer> {
        self.renderers.get(tag).map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }

    /// Every renderer's default CSS, in tag order.
    pub fn user_agent_css(&self) -> String {
        self.renderers
            .values()
            .map(|r| r.default_css())
            .filter(|css| !css.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marquee;

    impl ElementRenderer for Marquee {
        fn tag(&self) -> &str {
            "MARQUEE"
        }

        fn default_css(&self) -> &str {
            "marquee { display: block; }"
        }

        fn paint(&self, _ctx: &mut PaintContext<'_>, _node: NodeId, _content: Region) {}
    }

    #[test]
    fn defaults_cover_builtin_tags() {
        let registry = RendererRegistry::with_defaults();
        let tags: Vec<&str> = registry.tags().collect();
        assert_eq!(tags, vec!["button", "dialog", "img", "input", "li", "select", "table"]);
        assert!(registry.get("table").is_some_and(|r| r.custom_layout() && r.custom_children()));
        assert!(registry.get("input").is_some_and(|r| r.is_form_control()));
        assert!(registry.get("div").is_none());
    }

    #[test]
    fn register_lowercases_and_replaces() {
        let mut registry = RendererRegistry::new();
        registry.register(Box::new(Marquee));
        registry.register(Box::new(Marquee));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("marquee").is_some());
    }

    #[test]
    fn user_agent_css_joins_defaults() {
        let mut registry = RendererRegistry::new();
        assert!(registry.user_agent_css().is_empty());
        registry.register(Box::new(Marquee));
        assert_eq!(registry.user_agent_css(), "marquee { display: block; }");
    }
}
