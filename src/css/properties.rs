//! Property parsing: declaration text → typed property values.
//!
//! Parses the (already `var()`-substituted) value text of a declaration into
//! the typed fields on [`crate::css::styles::Styles`].

use crate::css::color::Color;
use crate::css::gradient;
use crate::css::styles::*;
use crate::css::value::{split_words, StyleValue, ValueBox};

/// Errors from property parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue {
        property: property.into(),
        message: message.into(),
    }
}

/// Parse a single sizing value into a [`StyleValue`].
pub fn parse_style_value(value: &str, property: &str) -> Result<StyleValue, PropertyError> {
    StyleValue::parse(value).ok_or_else(|| {
        invalid(
            property,
            format!("expected number, ch, %, auto or calc(), got: {value}"),
        )
    })
}

/// Parse 1-4 values into a [`ValueBox`] (CSS shorthand).
///
/// - 1 value: all sides
/// - 2 values: vertical, horizontal
/// - 3 values: top, horizontal, bottom
/// - 4 values: top, right, bottom, left
pub fn parse_value_box(value: &str, property: &str) -> Result<ValueBox, PropertyError> {
    let words = split_words(value);
    let parse = |w: &str| parse_style_value(w, property);
    match words.as_slice() {
        [all] => Ok(ValueBox::all(parse(all)?)),
        [vertical, horizontal] => Ok(ValueBox::symmetric(parse(vertical)?, parse(horizontal)?)),
        [top, horizontal, bottom] => {
            let horizontal = parse(horizontal)?;
            Ok(ValueBox::new(parse(top)?, horizontal.clone(), parse(bottom)?, horizontal))
        }
        [top, right, bottom, left] => Ok(ValueBox::new(
            parse(top)?,
            parse(right)?,
            parse(bottom)?,
            parse(left)?,
        )),
        other => Err(invalid(property, format!("expected 1-4 values, got {}", other.len()))),
    }
}

/// Extract a single lowercase keyword.
fn require_single_ident(value: &str, property: &str) -> Result<String, PropertyError> {
    let words = split_words(value);
    match words.as_slice() {
        [word] if word.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
            Ok(word.to_ascii_lowercase())
        }
        [word] => Err(invalid(property, format!("expected identifier, got: {word}"))),
        other => Err(invalid(property, format!("expected 1 value, got {}", other.len()))),
    }
}

fn require_color(value: &str, property: &str) -> Result<Color, PropertyError> {
    Color::parse(value).ok_or_else(|| invalid(property, format!("expected color, got: {value}")))
}

fn require_number(value: &str, property: &str) -> Result<f32, PropertyError> {
    let number = value.trim();
    let number = number.strip_suffix("ch").unwrap_or(number);
    number
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| invalid(property, format!("expected number, got: {value}")))
}

/// Parse an overflow ident.
fn parse_overflow(name: &str, property: &str) -> Result<Overflow, PropertyError> {
    match name {
        "visible" => Ok(Overflow::Visible),
        "hidden" | "clip" => Ok(Overflow::Hidden),
        "scroll" => Ok(Overflow::Scroll),
        "auto" => Ok(Overflow::Auto),
        other => Err(invalid(
            property,
            format!("expected visible|hidden|scroll|auto, got: {other}"),
        )),
    }
}

fn parse_border_kind(name: &str) -> Option<BorderKind> {
    Some(match name {
        "none" | "hidden" => BorderKind::None,
        "thin" | "solid" => BorderKind::Thin,
        "heavy" | "thick" => BorderKind::Heavy,
        "double" => BorderKind::Double,
        "round" | "rounded" => BorderKind::Round,
        "ascii" => BorderKind::Ascii,
        "dashed" | "dotted" => BorderKind::Dashed,
        _ => return None,
    })
}

/// Parse `border`: any order of a kind keyword, a color and an ignored width.
fn parse_border(value: &str) -> Result<Border, PropertyError> {
    let mut kind = None;
    let mut color = None;

    for word in split_words(value) {
        let lower = word.to_ascii_lowercase();
        if let Some(k) = parse_border_kind(&lower) {
            kind = Some(k);
        } else if let Some(c) = Color::parse(word) {
            color = Some(c);
        } else if require_number(word, "border").is_ok() {
            // Widths are always one cell.
        } else {
            return Err(invalid("border", format!("unexpected border value: {word}")));
        }
    }

    if kind.is_none() && color.is_none() {
        return Err(invalid("border", "expected border kind or color"));
    }
    // A border with only a color draws a thin line.
    Ok(Border {
        kind: kind.unwrap_or(BorderKind::Thin),
        color,
    })
}

/// Parse text-style values: one or more of bold, dim, italic, underline, strikethrough, reverse.
fn parse_text_style(value: &str) -> Result<TextStyleFlags, PropertyError> {
    let mut flags = TextStyleFlags::default();

    for word in split_words(value) {
        match word.to_ascii_lowercase().as_str() {
            "bold" => flags.bold = Some(true),
            "dim" => flags.dim = Some(true),
            "italic" => flags.italic = Some(true),
            "underline" => flags.underline = Some(true),
            "strikethrough" => flags.strikethrough = Some(true),
            "reverse" => flags.reverse = Some(true),
            "none" => {
                flags = TextStyleFlags {
                    bold: Some(false),
                    dim: Some(false),
                    italic: Some(false),
                    underline: Some(false),
                    strikethrough: Some(false),
                    reverse: Some(false),
                };
            }
            other => {
                return Err(invalid("text-style", format!("unknown text style: {other}")));
            }
        }
    }

    Ok(flags)
}

fn parse_background_image(value: &str, property: &str) -> Result<Background, PropertyError> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Ok(Background::Color(Color::TRANSPARENT));
    }
    gradient::parse(value)
        .map(Background::Gradient)
        .ok_or_else(|| invalid(property, format!("invalid gradient: {value}")))
}

/// Parse `content`: `none`, `normal`, or a sequence of strings and `attr()`.
fn parse_content(value: &str) -> Result<Vec<ContentItem>, PropertyError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("normal") {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut rest = trimmed;
    while !rest.is_empty() {
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'');
        if let Some(q) = quote {
            let body = &rest[1..];
            let end = body
                .find(q)
                .ok_or_else(|| invalid("content", "unterminated string"))?;
            items.push(ContentItem::Text(unescape(&body[..end])));
            rest = body[end + 1..].trim_start();
        } else if rest.to_ascii_lowercase().starts_with("attr(") {
            let end = rest
                .find(')')
                .ok_or_else(|| invalid("content", "unterminated attr()"))?;
            let name = rest[5..end].trim().to_ascii_lowercase();
            if name.is_empty() {
                return Err(invalid("content", "attr() needs a name"));
            }
            items.push(ContentItem::Attr(name));
            rest = rest[end + 1..].trim_start();
        } else {
            return Err(invalid("content", format!("unexpected content: {rest}")));
        }
    }
    Ok(items)
}

/// Resolve `\\XXXX` hex escapes and `\\c` escapes inside a CSS string.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 && chars.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            hex.extend(chars.next());
        }
        if hex.is_empty() {
            out.extend(chars.next());
        } else {
            if chars.peek() == Some(&' ') {
                chars.next();
            }
            let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
            out.push(decoded.unwrap_or('\u{FFFD}'));
        }
    }
    out
}

fn set_box_side(
    target: &mut Option<ValueBox>,
    side: &str,
    value: &str,
    property: &str,
) -> Result<(), PropertyError> {
    let parsed = parse_style_value(value, property)?;
    let spacing = target.get_or_insert_with(ValueBox::default);
    match side {
        "top" => spacing.top = parsed,
        "right" => spacing.right = parsed,
        "bottom" => spacing.bottom = parsed,
        _ => spacing.left = parsed,
    }
    Ok(())
}

/// Apply a CSS declaration (property name + value text) to a mutable [`Styles`].
///
/// Returns an error for unknown properties or invalid values; the caller
/// drops the declaration.
pub fn apply_declaration(
    styles: &mut Styles,
    property: &str,
    value: &str,
) -> Result<(), PropertyError> {
    if property.starts_with("--") {
        styles.custom.insert(property.to_string(), value.trim().to_string());
        return Ok(());
    }

    match property {
        // Display & positioning
        "display" => {
            styles.display = Some(match require_single_ident(value, "display")?.as_str() {
                "block" | "inline-block" => Display::Block,
                "flex" | "inline-flex" => Display::Flex,
                "none" => Display::None,
                other => return Err(invalid("display", format!("expected block|flex|none, got: {other}"))),
            });
        }
        "position" => {
            styles.position = Some(match require_single_ident(value, "position")?.as_str() {
                "static" | "relative" => Position::Relative,
                "absolute" | "fixed" => Position::Absolute,
                other => {
                    return Err(invalid("position", format!("expected relative|absolute, got: {other}")))
                }
            });
        }
        "visibility" => {
            styles.visibility = Some(match require_single_ident(value, "visibility")?.as_str() {
                "visible" => Visibility::Visible,
                "hidden" | "collapse" => Visibility::Hidden,
                other => {
                    return Err(invalid("visibility", format!("expected visible|hidden, got: {other}")))
                }
            });
        }
        "overflow" => {
            let words = split_words(value);
            let (x, y) = match words.as_slice() {
                [both] => {
                    let o = parse_overflow(&both.to_ascii_lowercase(), "overflow")?;
                    (o, o)
                }
                [x, y] => (
                    parse_overflow(&x.to_ascii_lowercase(), "overflow")?,
                    parse_overflow(&y.to_ascii_lowercase(), "overflow")?,
                ),
                other => return Err(invalid("overflow", format!("expected 1-2 values, got {}", other.len()))),
            };
            styles.overflow_x = Some(x);
            styles.overflow_y = Some(y);
        }
        "overflow-x" => {
            let name = require_single_ident(value, "overflow-x")?;
            styles.overflow_x = Some(parse_overflow(&name, "overflow-x")?);
        }
        "overflow-y" => {
            let name = require_single_ident(value, "overflow-y")?;
            styles.overflow_y = Some(parse_overflow(&name, "overflow-y")?);
        }
        "z-index" => {
            let text = value.trim();
            styles.z_index = Some(if text.eq_ignore_ascii_case("auto") {
                0
            } else {
                text.parse::<i32>()
                    .map_err(|_| invalid("z-index", format!("expected integer, got: {text}")))?
            });
        }
        "top" => styles.top = Some(parse_style_value(value, property)?),
        "right" => styles.right = Some(parse_style_value(value, property)?),
        "bottom" => styles.bottom = Some(parse_style_value(value, property)?),
        "left" => styles.left = Some(parse_style_value(value, property)?),

        // Sizing
        "width" => styles.width = Some(parse_style_value(value, property)?),
        "height" => styles.height = Some(parse_style_value(value, property)?),
        "min-width" => styles.min_width = Some(parse_style_value(value, property)?),
        "min-height" => styles.min_height = Some(parse_style_value(value, property)?),
        "max-width" => styles.max_width = Some(parse_style_value(value, property)?),
        "max-height" => styles.max_height = Some(parse_style_value(value, property)?),

        // Spacing
        "margin" => styles.margin = Some(parse_value_box(value, "margin")?),
        "padding" => styles.padding = Some(parse_value_box(value, "padding")?),
        "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => {
            set_box_side(&mut styles.margin, &property[7..], value, property)?;
        }
        "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => {
            set_box_side(&mut styles.padding, &property[8..], value, property)?;
        }

        // Flex
        "flex-direction" => {
            styles.flex_direction = Some(match require_single_ident(value, property)?.as_str() {
                "row" => FlexDirection::Row,
                "column" => FlexDirection::Column,
                "row-reverse" => FlexDirection::RowReverse,
                "column-reverse" => FlexDirection::ColumnReverse,
                other => return Err(invalid(property, format!("unknown direction: {other}"))),
            });
        }
        "flex-grow" => styles.flex_grow = Some(require_number(value, property)?.max(0.0)),
        "flex-shrink" => styles.flex_shrink = Some(require_number(value, property)?.max(0.0)),
        "flex" => {
            let words = split_words(value);
            match words.as_slice() {
                [single] if single.eq_ignore_ascii_case("none") => {
                    styles.flex_grow = Some(0.0);
                    styles.flex_shrink = Some(0.0);
                }
                [grow] => styles.flex_grow = Some(require_number(grow, property)?.max(0.0)),
                [grow, shrink, ..] => {
                    styles.flex_grow = Some(require_number(grow, property)?.max(0.0));
                    styles.flex_shrink = Some(require_number(shrink, property)?.max(0.0));
                }
                [] => return Err(invalid(property, "expected a value")),
            }
        }
        "gap" => styles.gap = Some(require_number(value, property)?.max(0.0)),
        "justify-content" => {
            styles.justify_content = Some(match require_single_ident(value, property)?.as_str() {
                "start" | "flex-start" | "left" | "normal" => JustifyContent::Start,
                "end" | "flex-end" | "right" => JustifyContent::End,
                "center" => JustifyContent::Center,
                "space-between" => JustifyContent::SpaceBetween,
                "space-around" => JustifyContent::SpaceAround,
                "space-evenly" => JustifyContent::SpaceEvenly,
                other => return Err(invalid(property, format!("unknown value: {other}"))),
            });
        }
        "align-items" => {
            styles.align_items = Some(match require_single_ident(value, property)?.as_str() {
                "start" | "flex-start" => AlignItems::Start,
                "end" | "flex-end" => AlignItems::End,
                "center" => AlignItems::Center,
                "stretch" | "normal" => AlignItems::Stretch,
                other => return Err(invalid(property, format!("unknown value: {other}"))),
            });
        }

        // Colors
        "color" => styles.color = Some(require_color(value, "color")?),
        "background-color" => {
            styles.background = Some(Background::Color(require_color(value, property)?));
        }
        "background-image" => styles.background = Some(parse_background_image(value, property)?),
        "background" => {
            styles.background = Some(match Color::parse(value) {
                Some(color) => Background::Color(color),
                None => parse_background_image(value, property)?,
            });
        }

        // Text
        "text-align" => {
            styles.text_align = Some(match require_single_ident(value, "text-align")?.as_str() {
                "left" | "justify" => TextAlign::Left,
                "center" => TextAlign::Center,
                "right" => TextAlign::Right,
                "start" => TextAlign::Start,
                "end" => TextAlign::End,
                other => {
                    return Err(invalid(
                        "text-align",
                        format!("expected left|center|right|start|end, got: {other}"),
                    ));
                }
            });
        }
        "text-style" => {
            styles.text_style = Some(parse_text_style(value)?);
        }
        "font-weight" => {
            let bold = match require_single_ident(value, property)?.as_str() {
                "bold" | "bolder" => true,
                "normal" | "lighter" => false,
                numeric => {
                    numeric
                        .parse::<u16>()
                        .map_err(|_| invalid(property, format!("unknown weight: {numeric}")))?
                        >= 600
                }
            };
            styles.text_style.get_or_insert_with(Default::default).bold = Some(bold);
        }
        "font-style" => {
            let italic = match require_single_ident(value, property)?.as_str() {
                "italic" | "oblique" => true,
                "normal" => false,
                other => return Err(invalid(property, format!("unknown font style: {other}"))),
            };
            styles.text_style.get_or_insert_with(Default::default).italic = Some(italic);
        }
        "text-decoration" | "text-decoration-line" => {
            let mut underline = false;
            let mut strike = false;
            for word in split_words(value) {
                match word.to_ascii_lowercase().as_str() {
                    "underline" => underline = true,
                    "line-through" => strike = true,
                    "none" => {}
                    other => return Err(invalid(property, format!("unknown decoration: {other}"))),
                }
            }
            let flags = styles.text_style.get_or_insert_with(Default::default);
            flags.underline = Some(underline);
            flags.strikethrough = Some(strike);
        }
        "white-space" => {
            styles.white_space = Some(match require_single_ident(value, property)?.as_str() {
                "normal" => WhiteSpace::Normal,
                "nowrap" => WhiteSpace::NoWrap,
                "pre" => WhiteSpace::Pre,
                other => return Err(invalid(property, format!("expected normal|nowrap|pre, got: {other}"))),
            });
        }
        "list-style" | "list-style-type" => {
            styles.list_style = Some(match require_single_ident(value, property)?.as_str() {
                "none" => ListStyle::None,
                "disc" => ListStyle::Disc,
                "circle" => ListStyle::Circle,
                "square" => ListStyle::Square,
                "decimal" => ListStyle::Decimal,
                other => return Err(invalid(property, format!("unknown list style: {other}"))),
            });
        }
        "content" => styles.content = Some(parse_content(value)?),

        // Border
        "border" => {
            styles.border = Some(parse_border(value)?);
        }
        "border-style" => {
            let name = require_single_ident(value, property)?;
            let kind = parse_border_kind(&name)
                .ok_or_else(|| invalid(property, format!("unknown border kind: {name}")))?;
            let color = styles.border.as_ref().and_then(|b| b.color);
            styles.border = Some(Border { kind, color });
        }
        "border-color" => {
            let color = require_color(value, property)?;
            let kind = styles.border.as_ref().map_or(BorderKind::None, |b| b.kind);
            styles.border = Some(Border {
                kind,
                color: Some(color),
            });
        }

        // Unknown
        other => {
            return Err(PropertyError::UnknownProperty(other.to_string()));
        }
    }

    Ok(())
}
