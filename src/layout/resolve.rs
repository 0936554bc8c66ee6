//! Computed style → taffy Style conversion.
//!
//! Maps [`StyleValue`], [`ValueBox`] and [`Styles`] to taffy's layout types.
//! Calc values are laid out as `auto` here; the pipeline resolves them
//! against container sizes and lays the tree out a second time.

use taffy::prelude::*;

use crate::css::styles::{
    self, AlignItems as CssAlign, Display as CssDisplay, FlexDirection as CssDirection,
    JustifyContent as CssJustify, Styles,
};
use crate::css::value::{StyleValue, ValueBox};

/// Convert a [`StyleValue`] to a [`LengthPercentageAuto`].
///
/// - `Cells` -> length
/// - `Percent` -> percent (0..100 mapped to 0..1)
/// - `Auto` and unresolved `Calc` -> auto
pub fn resolve_value(value: &StyleValue) -> LengthPercentageAuto {
    match value {
        StyleValue::Cells(n) => LengthPercentageAuto::from_length(*n),
        StyleValue::Percent(p) => LengthPercentageAuto::from_percent(p / 100.0),
        StyleValue::Auto | StyleValue::Calc(_) => LengthPercentageAuto::AUTO,
    }
}

/// Convert a [`StyleValue`] for contexts without auto (padding, gap).
///
/// `Auto` and unresolved `Calc` map to zero.
pub fn resolve_value_definite(value: &StyleValue) -> LengthPercentage {
    match value {
        StyleValue::Cells(n) => LengthPercentage::from_length(n.max(0.0)),
        StyleValue::Percent(p) => LengthPercentage::from_percent(p / 100.0),
        StyleValue::Auto | StyleValue::Calc(_) => LengthPercentage::ZERO,
    }
}

/// Convert a [`StyleValue`] to a [`Dimension`] for width, height, min and max.
fn resolve_dimension(value: &StyleValue) -> Dimension {
    match value {
        StyleValue::Cells(n) => Dimension::from_length(n.max(0.0)),
        StyleValue::Percent(p) => Dimension::from_percent(p / 100.0),
        StyleValue::Auto | StyleValue::Calc(_) => Dimension::AUTO,
    }
}

/// Convert a 4-sided [`ValueBox`] to a taffy [`Rect<LengthPercentageAuto>`].
pub fn resolve_value_box(value: &ValueBox) -> taffy::geometry::Rect<LengthPercentageAuto> {
    taffy::geometry::Rect {
        top: resolve_value(&value.top),
        right: resolve_value(&value.right),
        bottom: resolve_value(&value.bottom),
        left: resolve_value(&value.left),
    }
}

fn resolve_value_box_definite(value: &ValueBox) -> taffy::geometry::Rect<LengthPercentage> {
    taffy::geometry::Rect {
        top: resolve_value_definite(&value.top),
        right: resolve_value_definite(&value.right),
        bottom: resolve_value_definite(&value.bottom),
        left: resolve_value_definite(&value.left),
    }
}

fn resolve_overflow(overflow: styles::Overflow) -> taffy::style::Overflow {
    match overflow {
        styles::Overflow::Visible => taffy::style::Overflow::Visible,
        styles::Overflow::Hidden => taffy::style::Overflow::Hidden,
        styles::Overflow::Scroll | styles::Overflow::Auto => taffy::style::Overflow::Scroll,
    }
}

fn resolve_justify(justify: CssJustify) -> JustifyContent {
    match justify {
        CssJustify::Start => JustifyContent::FlexStart,
        CssJustify::End => JustifyContent::FlexEnd,
        CssJustify::Center => JustifyContent::Center,
        CssJustify::SpaceBetween => JustifyContent::SpaceBetween,
        CssJustify::SpaceAround => JustifyContent::SpaceAround,
        CssJustify::SpaceEvenly => JustifyContent::SpaceEvenly,
    }
}

fn resolve_align(align: CssAlign) -> AlignItems {
    match align {
        CssAlign::Start => AlignItems::FlexStart,
        CssAlign::End => AlignItems::FlexEnd,
        CssAlign::Center => AlignItems::Center,
        CssAlign::Stretch => AlignItems::Stretch,
    }
}

/// Convert a full [`Styles`] into a [`taffy::Style`].
///
/// `parent_display` is the display of the parent box, used for the default
/// flex-shrink: children of block boxes keep their size and overflow instead
/// of shrinking.
///
/// Mapping summary:
/// - `display: block` -> `Display::Flex` + `FlexDirection::Column`
/// - `display: flex` -> `Display::Flex` + `flex-direction` (default row)
/// - `display: none` -> `Display::None`
/// - `position: absolute` -> `Position::Absolute` with `top/right/bottom/left` inset
/// - `width/height`, `min-*`, `max-*` -> `size`, `min_size`, `max_size`
/// - `margin`, `padding` -> `margin`, `padding`
/// - `overflow_x/overflow_y` -> `overflow` (scroll and auto reserve no scrollbar)
/// - `border` with non-None kind -> 1 cell border on each side
pub fn resolve_styles(styles: &Styles, parent_display: Option<CssDisplay>) -> taffy::Style {
    let mut style = taffy::Style::default();

    match styles.display() {
        CssDisplay::None => style.display = Display::None,
        CssDisplay::Block => {
            style.display = Display::Flex;
            style.flex_direction = FlexDirection::Column;
        }
        CssDisplay::Flex => {
            style.display = Display::Flex;
            style.flex_direction = match styles.flex_direction.unwrap_or(CssDirection::Row) {
                CssDirection::Row => FlexDirection::Row,
                CssDirection::Column => FlexDirection::Column,
                CssDirection::RowReverse => FlexDirection::RowReverse,
                CssDirection::ColumnReverse => FlexDirection::ColumnReverse,
            };
        }
    }

    if styles.position == Some(styles::Position::Absolute) {
        style.position = Position::Absolute;
    }
    let inset = |v: &Option<StyleValue>| v.as_ref().map_or(LengthPercentageAuto::AUTO, resolve_value);
    style.inset = taffy::geometry::Rect {
        top: inset(&styles.top),
        right: inset(&styles.right),
        bottom: inset(&styles.bottom),
        left: inset(&styles.left),
    };

    // Size
    if let Some(ref w) = styles.width {
        style.size.width = resolve_dimension(w);
    }
    if let Some(ref h) = styles.height {
        style.size.height = resolve_dimension(h);
    }
    if let Some(ref w) = styles.min_width {
        style.min_size.width = resolve_dimension(w);
    }
    if let Some(ref h) = styles.min_height {
        style.min_size.height = resolve_dimension(h);
    }
    if let Some(ref w) = styles.max_width {
        style.max_size.width = resolve_dimension(w);
    }
    if let Some(ref h) = styles.max_height {
        style.max_size.height = resolve_dimension(h);
    }

    // Spacing
    if let Some(ref m) = styles.margin {
        style.margin = resolve_value_box(m);
    }
    if let Some(ref p) = styles.padding {
        style.padding = resolve_value_box_definite(p);
    }

    // Flex
    if let Some(grow) = styles.flex_grow {
        style.flex_grow = grow;
    }
    let block_child = matches!(parent_display, Some(CssDisplay::Block) | None);
    style.flex_shrink = styles
        .flex_shrink
        .unwrap_or(if block_child { 0.0 } else { 1.0 });
    if let Some(gap) = styles.gap {
        style.gap = taffy::geometry::Size {
            width: LengthPercentage::from_length(gap),
            height: LengthPercentage::from_length(gap),
        };
    }
    style.justify_content = styles.justify_content.map(resolve_justify);
    style.align_items = styles.align_items.map(resolve_align);

    // Overflow
    style.overflow = taffy::geometry::Point {
        x: styles.overflow_x.map_or(taffy::style::Overflow::Visible, resolve_overflow),
        y: styles.overflow_y.map_or(taffy::style::Overflow::Visible, resolve_overflow),
    };
    style.scrollbar_width = 0.0;

    // Border: one cell on each side for any visible border kind
    let border = styles.border_kind().width() as f32;
    if border > 0.0 {
        style.border = taffy::geometry::Rect {
            top: LengthPercentage::from_length(border),
            right: LengthPercentage::from_length(border),
            bottom: LengthPercentage::from_length(border),
            left: LengthPercentage::from_length(border),
        };
    }

    style
}
