//! Image renderer: sixel placements for ready images, a text placeholder
//! otherwise.
//!
//! `width` and `height` attributes are in cells. A missing one is derived
//! from the image's pixel size and the configured cell size, keeping the
//! aspect ratio when the other is given.

use tracing::trace;

use crate::dom::{NodeData, NodeId, RasterImage};
use crate::geometry::{Region, Size};
use crate::render::cell::CellStyle;
use crate::render::pipeline::{MeasureContext, PaintContext, SixelPlacement};
use crate::render::sixel;
use crate::render::text;
use crate::session::RenderConfig;

use super::ElementRenderer;

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

fn cells_attr(data: &NodeData, name: &str) -> Option<i32> {
    data.attr(name)
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|&v| v >= 0)
}

fn ready_image(data: &NodeData) -> Option<&RasterImage> {
    data.image.as_ref().filter(|img| img.ready && img.width > 0 && img.height > 0)
}

/// The element's size in cells.
fn cell_size(data: &NodeData, config: &RenderConfig) -> Size {
    let width = cells_attr(data, "width");
    let height = cells_attr(data, "height");
    let Some(image) = ready_image(data) else {
        let placeholder = data.attr("alt").map_or_else(
            || text::display_width(&config.image_placeholder),
            |alt| text::display_width(&alt),
        );
        return Size::new(width.unwrap_or(placeholder), height.unwrap_or(1));
    };

    let (cw, ch) = (config.cell_width_px.max(1) as f64, config.cell_height_px.max(1) as f64);
    let (pw, ph) = (image.width as f64, image.height as f64);
    match (width, height) {
        (Some(w), Some(h)) => Size::new(w, h),
        (Some(w), None) => Size::new(w, (w as f64 * cw * ph / pw / ch).round() as i32),
        (None, Some(h)) => Size::new((h as f64 * ch * pw / ph / cw).round() as i32, h),
        (None, None) => Size::new((pw / cw).ceil() as i32, (ph / ch).ceil() as i32),
    }
}

// ---------------------------------------------------------------------------
// ImageRenderer
// ---------------------------------------------------------------------------

/// Renders `<img>` elements.
pub struct ImageRenderer;

impl ImageRenderer {
    /// Scale the image to the content box and emit one placement per piece
    /// not covered by a higher occlusion zone.
    fn paint_sixels(ctx: &mut PaintContext<'_>, image: &RasterImage, content: Region) {
        let (cw, ch) = (ctx.config.cell_width_px.max(1), ctx.config.cell_height_px.max(1));
        let px_width = content.width as u32 * cw;
        let px_height = content.height as u32 * ch;
        let scaled = sixel::scale_rgba(&image.rgba, image.width, image.height, px_width, px_height);

        let shown = content.intersection(ctx.clip);
        let delta = shown.offset() - content.offset();
        for piece in ctx.compositor.visible_regions_above(shown, ctx.z_index) {
            let origin = delta + piece.offset;
            let region = piece.region;
            let (w, h) = (region.width as u32 * cw, region.height as u32 * ch);
            let cropped = sixel::crop_rgba(&scaled, px_width, origin.x as u32 * cw, origin.y as u32 * ch, w, h);
            let indexed = sixel::rgba_to_indexed(&cropped, w, h);
            trace!(?region, colors = indexed.palette.len(), "sixel placement");
            ctx.sixels.push(SixelPlacement {
                x: region.x,
                y: region.y,
                columns: region.width,
                rows: region.height,
                data: sixel::encode(&indexed),
            });
        }
    }
}

impl ElementRenderer for ImageRenderer {
    fn tag(&self) -> &str {
        "img"
    }

    fn custom_layout(&self) -> bool {
        true
    }

    fn measure(&self, ctx: &MeasureContext<'_>, node: NodeId, _available_width: Option<i32>) -> Size {
        ctx.dom.get(node).map_or(Size::ZERO, |data| cell_size(data, ctx.config))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>, node: NodeId, content: Region) {
        let dom = ctx.dom;
        let Some(data) = dom.get(node) else {
            return;
        };
        if content.is_empty() {
            return;
        }
        if let Some(image) = ready_image(data).filter(|_| ctx.config.sixel) {
            Self::paint_sixels(ctx, image, content);
            return;
        }

        let label = data.attr("alt").map_or_else(|| ctx.config.image_placeholder.clone(), |a| a.into_owned());
        let mut style = ctx.cell_style(node).unwrap_or_default();
        style.dim = true;
        let clip = ctx.clip.intersection(content);
        let label = text::truncate_to_width(&label, content.width);
        ctx.grid.put_str(content.x, content.y, label, Some(style).filter(|s: &CellStyle| !s.is_plain()), clip);
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
    use pretty_assertions::assert_eq;

    fn red(width: u32, height: u32) -> RasterImage {
        let rgba = [255u8, 0, 0, 255].repeat((width * height) as usize);
        RasterImage::new(width, height, rgba).unwrap()
    }

    #[test]
    fn sizes_from_attributes_and_pixels() {
        let config = RenderConfig::default();
        let img = NodeData::element("img").with_image(red(16, 32));
        assert_eq!(cell_size(&img, &config), Size::new(2, 2));

        let wide = img.clone().with_attr("width", "4");
        assert_eq!(cell_size(&wide, &config), Size::new(4, 4));

        let tall = img.clone().with_attr("height", "1");
        assert_eq!(cell_size(&tall, &config), Size::new(1, 1));

        let pending = NodeData::element("img").with_image(RasterImage::pending()).with_attr("alt", "logo");
        assert_eq!(cell_size(&pending, &config), Size::new(4, 1));
    }

    #[test]
    fn pending_image_paints_alt_text() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        dom.insert_child(
            root,
            NodeData::element("img").with_image(RasterImage::pending()).with_attr("alt", "logo"),
        );
        let mut session = RenderSession::new();
        let frame = session.render(&mut dom, Size::new(6, 1)).unwrap();
        assert_eq!(frame.grid.row_text(0), "logo  ");
        assert!(frame.sixels.is_empty());
    }

    #[test]
    fn sixel_disabled_paints_placeholder() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        dom.insert_child(root, NodeData::element("img").with_image(red(8, 16)).with_attr("width", "8"));
        let mut session = RenderSession::with_config(RenderConfig::new().with_sixel(false));
        let frame = session.render(&mut dom, Size::new(8, 2)).unwrap();
        assert_eq!(frame.grid.row_text(0), "[image] ");
        assert!(frame.sixels.is_empty());
    }

    #[test]
    fn ready_image_becomes_sixel_placement() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        dom.insert_child(
            root,
            NodeData::element("img").with_image(red(2, 2)),
        );
        let mut session = RenderSession::with_config(RenderConfig::new().with_cell_size(1, 6));
        session.add_stylesheet("app", "img { width: 2; height: 1; }").unwrap();
        let frame = session.render(&mut dom, Size::new(4, 2)).unwrap();

        assert_eq!(frame.sixels.len(), 1);
        let placement = &frame.sixels[0];
        assert_eq!((placement.x, placement.y, placement.columns, placement.rows), (0, 0, 2, 1));
        let data = String::from_utf8(placement.data.clone()).unwrap();
        assert_eq!(data, "\x1bP0;1;0q\"1;1;2;6#0;2;100;0;0#0~~$-\x1b\\");
    }

    #[test]
    fn top_layer_splits_covered_image() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        dom.insert_child(
            root,
            NodeData::element("img").with_image(red(4, 4)),
        );
        let pop = dom.insert_child(root, NodeData::element("div").with_attr("popover", ""));
        if let Some(d) = dom.get_mut(pop) {
            d.state.popover_open = true;
        }

        let mut session = RenderSession::new();
        session
            .add_stylesheet(
                "app",
                "img { width: 4; height: 2; }
                 [popover]:popover-open { left: 0; top: 0; width: 2; height: 2; border: none; }",
            )
            .unwrap();
        let frame = session.render(&mut dom, Size::new(6, 3)).unwrap();
        let pieces: Vec<(i32, i32, i32, i32)> = frame
            .sixels
            .iter()
            .map(|p| (p.x, p.y, p.columns, p.rows))
            .collect();
        assert_eq!(pieces, vec![(2, 0, 2, 2)]);
    }
}
