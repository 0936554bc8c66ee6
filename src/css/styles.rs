//! Styles struct with typed Option<T> fields for all CSS properties.
//!
//! This is the central style representation. Every CSS property has a typed
//! `Option<T>` field. `None` means "not set" (inherits from parent or uses default).

use std::collections::BTreeMap;

use crate::css::calc::{Axis, CalcContext};
use crate::css::color::Color;
use crate::css::gradient::Gradient;
use crate::css::value::{StyleValue, ValueBox};

/// Text alignment options. `Start`/`End` behave as `Left`/`Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Start,
    End,
}

impl TextAlign {
    /// Column offset of a line `content` wide inside `available` columns.
    pub fn offset(self, available: i32, content: i32) -> i32 {
        let slack = (available - content).max(0);
        match self {
            TextAlign::Left | TextAlign::Start => 0,
            TextAlign::Center => slack / 2,
            TextAlign::Right | TextAlign::End => slack,
        }
    }
}

/// Display property options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Children stack vertically.
    Block,
    /// Flex container; direction from `flex-direction`.
    Flex,
    None,
}

/// Positioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Relative,
    Absolute,
}

/// Visibility property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Visible,
    Hidden,
    Scroll,
    Auto,
}

impl Overflow {
    /// Whether content outside the box is clipped.
    pub fn clips(self) -> bool {
        !matches!(self, Overflow::Visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    End,
    Center,
    Stretch,
}

/// Line wrapping behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Collapse whitespace and wrap at word boundaries.
    Normal,
    /// Collapse whitespace, never wrap.
    NoWrap,
    /// Keep whitespace and line breaks, never wrap.
    Pre,
}

/// Border style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    None,
    Thin,
    Heavy,
    Double,
    Round,
    Ascii,
    Dashed,
}

impl BorderKind {
    /// Cells taken on each side.
    pub fn width(self) -> i32 {
        if self == BorderKind::None {
            0
        } else {
            1
        }
    }
}

/// A border with kind and optional color.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub kind: BorderKind,
    pub color: Option<Color>,
}

/// Background paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Color(Color),
    Gradient(Gradient),
}

/// List marker style for `::marker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    None,
    Disc,
    Circle,
    Square,
    Decimal,
}

/// One piece of generated `content`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    /// `attr(name)`: the node's attribute value.
    Attr(String),
}

/// Text style flags (bold, italic, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyleFlags {
    pub bold: Option<bool>,
    pub dim: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub reverse: Option<bool>,
}

impl TextStyleFlags {
    /// Fill unset flags from `parent`.
    pub fn or(self, parent: TextStyleFlags) -> TextStyleFlags {
        TextStyleFlags {
            bold: self.bold.or(parent.bold),
            dim: self.dim.or(parent.dim),
            italic: self.italic.or(parent.italic),
            underline: self.underline.or(parent.underline),
            strikethrough: self.strikethrough.or(parent.strikethrough),
            reverse: self.reverse.or(parent.reverse),
        }
    }
}

/// All CSS properties for a node. Each field is `Option<T>`; None means unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    // Display & positioning
    pub display: Option<Display>,
    pub position: Option<Position>,
    pub visibility: Option<Visibility>,
    pub overflow_x: Option<Overflow>,
    pub overflow_y: Option<Overflow>,
    pub z_index: Option<i32>,
    pub top: Option<StyleValue>,
    pub right: Option<StyleValue>,
    pub bottom: Option<StyleValue>,
    pub left: Option<StyleValue>,

    // Sizing
    pub width: Option<StyleValue>,
    pub height: Option<StyleValue>,
    pub min_width: Option<StyleValue>,
    pub min_height: Option<StyleValue>,
    pub max_width: Option<StyleValue>,
    pub max_height: Option<StyleValue>,

    // Spacing
    pub margin: Option<ValueBox>,
    pub padding: Option<ValueBox>,

    // Flex
    pub flex_direction: Option<FlexDirection>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub gap: Option<f32>,
    pub justify_content: Option<JustifyContent>,
    pub align_items: Option<AlignItems>,

    // Colors
    pub color: Option<Color>,
    pub background: Option<Background>,

    // Text
    pub text_align: Option<TextAlign>,
    pub text_style: Option<TextStyleFlags>,
    pub white_space: Option<WhiteSpace>,
    pub list_style: Option<ListStyle>,
    pub content: Option<Vec<ContentItem>>,

    // Border
    pub border: Option<Border>,

    /// Custom properties (`--name`), already substituted.
    pub custom: BTreeMap<String, String>,
}

impl Styles {
    /// Create a new `Styles` with all fields set to `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` on top of `self`. For each field, if `other` has a value (`Some`),
    /// use it; otherwise keep `self`'s value.
    pub fn merge(&self, other: &Styles) -> Styles {
        /// Helper: pick `other` if set, otherwise keep `base`.
        fn merge_opt<T: Clone>(base: &Option<T>, other: &Option<T>) -> Option<T> {
            if other.is_some() {
                other.clone()
            } else {
                base.clone()
            }
        }

        let mut custom = self.custom.clone();
        custom.extend(other.custom.iter().map(|(k, v)| (k.clone(), v.clone())));

        Styles {
            display: merge_opt(&self.display, &other.display),
            position: merge_opt(&self.position, &other.position),
            visibility: merge_opt(&self.visibility, &other.visibility),
            overflow_x: merge_opt(&self.overflow_x, &other.overflow_x),
            overflow_y: merge_opt(&self.overflow_y, &other.overflow_y),
            z_index: merge_opt(&self.z_index, &other.z_index),
            top: merge_opt(&self.top, &other.top),
            right: merge_opt(&self.right, &other.right),
            bottom: merge_opt(&self.bottom, &other.bottom),
            left: merge_opt(&self.left, &other.left),

            width: merge_opt(&self.width, &other.width),
            height: merge_opt(&self.height, &other.height),
            min_width: merge_opt(&self.min_width, &other.min_width),
            min_height: merge_opt(&self.min_height, &other.min_height),
            max_width: merge_opt(&self.max_width, &other.max_width),
            max_height: merge_opt(&self.max_height, &other.max_height),

            margin: merge_opt(&self.margin, &other.margin),
            padding: merge_opt(&self.padding, &other.padding),

            flex_direction: merge_opt(&self.flex_direction, &other.flex_direction),
            flex_grow: merge_opt(&self.flex_grow, &other.flex_grow),
            flex_shrink: merge_opt(&self.flex_shrink, &other.flex_shrink),
            gap: merge_opt(&self.gap, &other.gap),
            justify_content: merge_opt(&self.justify_content, &other.justify_content),
            align_items: merge_opt(&self.align_items, &other.align_items),

            color: merge_opt(&self.color, &other.color),
            background: merge_opt(&self.background, &other.background),

            text_align: merge_opt(&self.text_align, &other.text_align),
            text_style: merge_opt(&self.text_style, &other.text_style),
            white_space: merge_opt(&self.white_space, &other.white_space),
            list_style: merge_opt(&self.list_style, &other.list_style),
            content: merge_opt(&self.content, &other.content),

            border: merge_opt(&self.border, &other.border),

            custom,
        }
    }

    /// Fill inherited properties (`color`, `text-align`, `text-style`,
    /// `white-space`, `list-style`) from the parent's computed style.
    pub fn inherit_from(&mut self, parent: &Styles) {
        if self.color.is_none() {
            self.color = parent.color;
        }
        if self.text_align.is_none() {
            self.text_align = parent.text_align;
        }
        self.text_style = match (self.text_style, parent.text_style) {
            (Some(own), Some(inherited)) => Some(own.or(inherited)),
            (own, inherited) => own.or(inherited),
        };
        if self.white_space.is_none() {
            self.white_space = parent.white_space;
        }
        if self.list_style.is_none() {
            self.list_style = parent.list_style;
        }
        for (name, value) in &parent.custom {
            self.custom.entry(name.clone()).or_insert_with(|| value.clone());
        }
    }

    /// Returns `true` if all fields are unset.
    pub fn is_empty(&self) -> bool {
        *self == Styles::default()
    }

    pub fn display(&self) -> Display {
        self.display.unwrap_or(Display::Block)
    }

    pub fn is_hidden(&self) -> bool {
        self.display() == Display::None || self.visibility == Some(Visibility::Hidden)
    }

    /// Whether children are clipped to the content box on either axis.
    pub fn clips_overflow(&self) -> bool {
        self.overflow_x.is_some_and(Overflow::clips) || self.overflow_y.is_some_and(Overflow::clips)
    }

    pub fn border_kind(&self) -> BorderKind {
        self.border.as_ref().map_or(BorderKind::None, |b| b.kind)
    }

    pub fn text_align(&self) -> TextAlign {
        self.text_align.unwrap_or(TextAlign::Left)
    }

    pub fn white_space(&self) -> WhiteSpace {
        self.white_space.unwrap_or(WhiteSpace::Normal)
    }

    /// Whether any sizing or spacing value is a deferred calc expression.
    pub fn has_calc(&self) -> bool {
        let values = [
            &self.width,
            &self.height,
            &self.min_width,
            &self.min_height,
            &self.max_width,
            &self.max_height,
            &self.top,
            &self.right,
            &self.bottom,
            &self.left,
        ];
        values.iter().any(|v| v.as_ref().is_some_and(StyleValue::is_calc))
            || self.margin.as_ref().is_some_and(ValueBox::has_calc)
            || self.padding.as_ref().is_some_and(ValueBox::has_calc)
    }

    /// Replace every calc value with its resolution against `container`.
    ///
    /// Widths and horizontal offsets resolve along the horizontal axis,
    /// heights and vertical offsets along the vertical one.
    pub fn resolve_calc(&mut self, container: CalcContext) {
        let horizontal = container.with_axis(Axis::Horizontal);
        let vertical = container.with_axis(Axis::Vertical);
        let fix = |value: &mut Option<StyleValue>, ctx: &CalcContext| {
            if let Some(StyleValue::Calc(calc)) = value {
                *value = Some(StyleValue::Cells(calc.resolve(ctx)));
            }
        };
        fix(&mut self.width, &horizontal);
        fix(&mut self.min_width, &horizontal);
        fix(&mut self.max_width, &horizontal);
        fix(&mut self.left, &horizontal);
        fix(&mut self.right, &horizontal);
        fix(&mut self.height, &vertical);
        fix(&mut self.min_height, &vertical);
        fix(&mut self.max_height, &vertical);
        fix(&mut self.top, &vertical);
        fix(&mut self.bottom, &vertical);

        // Box sides resolve against the container width, as in CSS.
        for spacing in [&mut self.margin, &mut self.padding].into_iter().flatten() {
            for side in [
                &mut spacing.top,
                &mut spacing.right,
                &mut spacing.bottom,
                &mut spacing.left,
            ] {
                if let StyleValue::Calc(calc) = side {
                    *side = StyleValue::Cells(calc.resolve(&horizontal));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        assert!(Styles::new().is_empty());
        assert!(Styles::default().is_empty());
    }

    #[test]
    fn not_empty_when_field_set() {
        let mut s = Styles::new();
        s.color = Some(Color::rgb(255, 0, 0));
        assert!(!s.is_empty());

        let mut c = Styles::new();
        c.custom.insert("--a".into(), "1".into());
        assert!(!c.is_empty());
    }

    #[test]
    fn merge_other_overrides_base() {
        let mut base = Styles::new();
        base.color = Some(Color::rgb(255, 0, 0));
        base.background = Some(Background::Color(Color::WHITE));
        base.custom.insert("--a".into(), "1".into());

        let mut other = Styles::new();
        other.color = Some(Color::rgb(0, 0, 255));
        other.custom.insert("--b".into(), "2".into());

        let merged = base.merge(&other);
        assert_eq!(merged.color, Some(Color::rgb(0, 0, 255)));
        assert_eq!(merged.background, Some(Background::Color(Color::WHITE)));
        assert_eq!(merged.custom.len(), 2);
    }

    #[test]
    fn inherit_fills_only_inherited_properties() {
        let mut parent = Styles::new();
        parent.color = Some(Color::rgb(1, 2, 3));
        parent.text_align = Some(TextAlign::Center);
        parent.width = Some(StyleValue::Cells(10.0));
        parent.text_style = Some(TextStyleFlags {
            bold: Some(true),
            ..Default::default()
        });

        let mut child = Styles::new();
        child.text_style = Some(TextStyleFlags {
            italic: Some(true),
            ..Default::default()
        });
        child.inherit_from(&parent);

        assert_eq!(child.color, Some(Color::rgb(1, 2, 3)));
        assert_eq!(child.text_align, Some(TextAlign::Center));
        assert_eq!(child.width, None);
        let flags = child.text_style.unwrap();
        assert_eq!(flags.bold, Some(true));
        assert_eq!(flags.italic, Some(true));
    }

    #[test]
    fn inherit_keeps_own_values() {
        let mut parent = Styles::new();
        parent.text_align = Some(TextAlign::Right);
        let mut child = Styles::new();
        child.text_align = Some(TextAlign::Left);
        child.inherit_from(&parent);
        assert_eq!(child.text_align, Some(TextAlign::Left));
    }

    #[test]
    fn text_align_offsets() {
        assert_eq!(TextAlign::Left.offset(10, 4), 0);
        assert_eq!(TextAlign::Start.offset(10, 4), 0);
        assert_eq!(TextAlign::Center.offset(10, 4), 3);
        assert_eq!(TextAlign::Center.offset(10, 5), 2);
        assert_eq!(TextAlign::Right.offset(10, 4), 6);
        assert_eq!(TextAlign::End.offset(10, 4), 6);
        assert_eq!(TextAlign::Right.offset(3, 5), 0);
    }

    #[test]
    fn resolve_calc_per_axis() {
        let mut s = Styles::new();
        s.width = StyleValue::parse("calc(50% + 1)");
        s.height = StyleValue::parse("calc(50%)");
        s.padding = Some(ValueBox::all(StyleValue::parse("calc(10%)").unwrap()));
        assert!(s.has_calc());

        s.resolve_calc(CalcContext::new(40.0, 10.0, Axis::Horizontal));
        assert_eq!(s.width, Some(StyleValue::Cells(21.0)));
        assert_eq!(s.height, Some(StyleValue::Cells(5.0)));
        assert_eq!(s.padding.as_ref().unwrap().left, StyleValue::Cells(4.0));
        assert!(!s.has_calc());
    }

    #[test]
    fn hidden_and_clipping_helpers() {
        let mut s = Styles::new();
        assert!(!s.is_hidden());
        assert!(!s.clips_overflow());
        s.overflow_y = Some(Overflow::Auto);
        assert!(s.clips_overflow());
        s.display = Some(Display::None);
        assert!(s.is_hidden());
    }
}
