//! Render configuration and the session that owns every registry.

use tracing::debug;

use crate::css::parser::ParseError;
use crate::css::StylesheetRegistry;
use crate::dom::Dom;
use crate::geometry::Size;
use crate::layout::{LayoutError, TaffyLayout};
use crate::render::compositor::{Compositor, TopLayer};
use crate::render::dialog::DialogManager;
use crate::render::pipeline::{self, Frame, PaintInput};
use crate::widgets::RendererRegistry;

/// Id of the user-agent sheet a session installs.
pub const USER_AGENT_SHEET: &str = "user-agent";

/// Rules every session installs below author CSS when user-agent styles
/// are enabled. Renderer defaults are appended.
const BASE_CSS: &str = "
[popover] { display: none; }
[popover]:popover-open { display: block; position: absolute; border: solid; }
";

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`RenderSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Pixel width of one terminal cell, for image scaling.
    pub cell_width_px: u32,
    /// Pixel height of one terminal cell.
    pub cell_height_px: u32,
    /// Whether ready images are encoded as sixel placements.
    pub sixel: bool,
    /// Text painted for an image without `alt` that can't be shown.
    pub image_placeholder: String,
    /// Whether the base and renderer default stylesheets are installed.
    pub user_agent_styles: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_width_px: 8,
            cell_height_px: 16,
            sixel: true,
            image_placeholder: "[image]".into(),
            user_agent_styles: true,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cell size in pixels (builder). Zero is raised to one.
    pub fn with_cell_size(mut self, width_px: u32, height_px: u32) -> Self {
        self.cell_width_px = width_px.max(1);
        self.cell_height_px = height_px.max(1);
        self
    }

    /// Enable or disable sixel output (builder).
    pub fn with_sixel(mut self, sixel: bool) -> Self {
        self.sixel = sixel;
        self
    }

    /// Set the image placeholder text (builder).
    pub fn with_image_placeholder(mut self, text: impl Into<String>) -> Self {
        self.image_placeholder = text.into();
        self
    }

    /// Install user-agent stylesheets or not (builder).
    pub fn with_user_agent_styles(mut self, enabled: bool) -> Self {
        self.user_agent_styles = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// RenderSession
// ---------------------------------------------------------------------------

/// Errors from a render pass or stylesheet registration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Every registry a render pass reads or writes.
///
/// Stylesheets and dialog state live until [`reset`](Self::reset);
/// occlusion zones and the top layer are rebuilt each pass.
pub struct RenderSession {
    pub registry: StylesheetRegistry,
    pub compositor: Compositor,
    pub top_layer: TopLayer,
    pub dialogs: DialogManager,
    pub renderers: RendererRegistry,
    pub config: RenderConfig,
    layout: TaffyLayout,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSession {
    /// A session with the built-in renderers and default config.
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            registry: StylesheetRegistry::new(),
            compositor: Compositor::new(),
            top_layer: TopLayer::new(),
            dialogs: DialogManager::new(),
            renderers: RendererRegistry::with_defaults(),
            config,
            layout: TaffyLayout::new(),
        }
    }

    /// Register an author stylesheet. Registering an id twice is a no-op.
    pub fn add_stylesheet(&mut self, id: &str, css: &str) -> Result<(), RenderError> {
        self.registry.register_stylesheet(id, css)?;
        Ok(())
    }

    /// Cascade, lay out and paint `dom` into a frame of `viewport` cells.
    ///
    /// Each node's computed style and absolute box are written back into
    /// its [`NodeData`](crate::dom::NodeData).
    pub fn render(&mut self, dom: &mut Dom, viewport: Size) -> Result<Frame, RenderError> {
        if self.config.user_agent_styles && !self.registry.contains(USER_AGENT_SHEET) {
            let css = format!("{BASE_CSS}\n{}", self.renderers.user_agent_css());
            self.registry.register_user_agent(USER_AGENT_SHEET, &css)?;
        }

        debug!(width = viewport.width, height = viewport.height, nodes = dom.len(), "render pass");
        let mut styles = pipeline::compute_styles(dom, &self.registry);
        let layout = pipeline::measure(
            dom,
            &mut styles,
            &self.renderers,
            &mut self.layout,
            viewport,
            &self.config,
        )?;

        let frame = pipeline::paint(
            &PaintInput {
                dom,
                registry: &self.registry,
                styles: &styles,
                layout: &layout,
                renderers: &self.renderers,
                dialogs: &self.dialogs,
                config: &self.config,
                viewport,
            },
            &mut self.compositor,
            &mut self.top_layer,
        );

        let regions = pipeline::absolute_regions(dom, &layout, viewport, &pipeline::modal_nodes(dom));
        for (node, node_styles) in styles {
            if let Some(data) = dom.get_mut(node) {
                data.layout = regions.get(&node).copied();
                data.computed = Some(node_styles);
            }
        }
        Ok(frame)
    }

    /// Drop every stylesheet, dialog and per-pass state.
    pub fn reset(&mut self) {
        debug!("resetting render session");
        self.registry.reset();
        self.compositor.begin_pass();
        self.top_layer.clear();
        self.dialogs.reset();
        self.layout = TaffyLayout::new();
    }
}
