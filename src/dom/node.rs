//! Node types: NodeId, NodeData, element state and raster payloads.

use std::borrow::Cow;
use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::css::styles::Styles;
use crate::geometry::{Offset, Region};

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// What a node is: an element with a tag, or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with a lowercase tag name.
    Element(String),
    /// Text content.
    Text(String),
}

/// Interaction and open/close state flags read by state pseudo-classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementState {
    pub focused: bool,
    pub hovered: bool,
    pub active: bool,
    pub disabled: bool,
    pub checked: bool,
    pub required: bool,
    pub invalid: bool,
    pub popover_open: bool,
    pub open: bool,
    pub modal: bool,
}

/// Decoded RGBA pixels for an image element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
    /// Whether loading finished. Images that aren't ready paint a placeholder.
    pub ready: bool,
}

impl RasterImage {
    /// A ready image. Returns `None` if the buffer size doesn't match.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        (rgba.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            rgba,
            ready: true,
        })
    }

    /// An image still loading.
    pub fn pending() -> Self {
        Self {
            width: 0,
            height: 0,
            rgba: Vec::new(),
            ready: false,
        }
    }
}

/// Data associated with a single DOM node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Optional unique id (CSS #id selector).
    pub id: Option<String>,
    /// CSS classes (for .class selector).
    pub classes: Vec<String>,
    /// Generic attributes. `id` and `class` live in their own fields.
    pub attributes: BTreeMap<String, String>,
    pub state: ElementState,
    pub image: Option<RasterImage>,
    /// Content scroll offset for overflowing containers.
    pub scroll: Offset,
    /// Computed style from the last pass.
    pub computed: Option<Styles>,
    /// Absolute border-box region from the last pass.
    pub layout: Option<Region>,
}

impl NodeData {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            state: ElementState::default(),
            image: None,
            scroll: Offset::default(),
            computed: None,
            layout: None,
        }
    }

    /// Create an element node. The tag is lowercased.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Element(tag.into().to_ascii_lowercase()))
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text(content.into()))
    }

    /// The element tag, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// The content of a text node.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    /// Set the CSS id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single CSS class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Add multiple CSS classes (builder).
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            self = self.with_class(class);
        }
        self
    }

    /// Set an attribute (builder). `id` and `class` go to their dedicated fields.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Replace the state flags (builder).
    pub fn with_state(mut self, state: ElementState) -> Self {
        self.state = state;
        self
    }

    /// Attach a raster image (builder).
    pub fn with_image(mut self, image: RasterImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Check whether this node has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a CSS class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a CSS class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle a CSS class: add if absent, remove if present.
    pub fn toggle_class(&mut self, class: &str) {
        if self.has_class(class) {
            self.remove_class(class);
        } else {
            self.add_class(class);
        }
    }

    /// Set an attribute. Names are lowercased.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match name.as_str() {
            "id" => self.id = Some(value),
            "class" => {
                self.classes.clear();
                for class in value.split_whitespace() {
                    self.add_class(class);
                }
            }
            _ => {
                self.attributes.insert(name, value);
            }
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Look up an attribute, including `id` and `class`.
    pub fn attr(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => self.id.as_deref().map(Cow::Borrowed),
            "class" if self.classes.is_empty() => None,
            "class" => Some(Cow::Owned(self.classes.join(" "))),
            _ => self.attributes.get(name).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    /// Attribute value or `default` when missing.
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> Cow<'a, str> {
        self.attr(name).unwrap_or(Cow::Borrowed(default))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Disabled by flag or by the `disabled` attribute.
    pub fn is_disabled(&self) -> bool {
        self.state.disabled || self.has_attr("disabled")
    }

    pub fn is_checked(&self) -> bool {
        self.state.checked || self.has_attr("checked")
    }

    pub fn is_required(&self) -> bool {
        self.state.required || self.has_attr("required")
    }

    /// Open by flag or by the `open` attribute (`<dialog open>`).
    pub fn is_open(&self) -> bool {
        self.state.open || self.has_attr("open")
    }
}
