//! Sizing values: `StyleValue` (auto, cells, %, calc) and four-sided `ValueBox`.
//!
//! Values stay symbolic in computed styles. Percentages and calc
//! expressions resolve only through [`StyleValue::resolve`] once a
//! container size is known.

use std::fmt;

use crate::css::calc::{self, Axis, CalcContext, CalcValue};

/// A length-like style value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// Content-based size.
    Auto,
    /// Cell count (unitless numbers and `ch`).
    Cells(f32),
    /// Percentage of the container along the property's axis.
    Percent(f32),
    /// Deferred `calc()`/`min()`/`max()`/`clamp()` expression.
    Calc(CalcValue),
}

impl StyleValue {
    pub fn cells(value: f32) -> Self {
        StyleValue::Cells(value)
    }

    pub fn percent(value: f32) -> Self {
        StyleValue::Percent(value)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, StyleValue::Auto)
    }

    pub fn is_calc(&self) -> bool {
        matches!(self, StyleValue::Calc(_))
    }

    /// Parse `auto`, `10`, `10ch`, `50%` or a math function.
    pub fn parse(text: &str) -> Option<StyleValue> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("auto") {
            return Some(StyleValue::Auto);
        }
        if calc::is_math_function(text) {
            return calc::parse_and_compile(text).map(StyleValue::Calc);
        }
        if let Some(p) = text.strip_suffix('%') {
            return p.parse::<f32>().ok().filter(|v| v.is_finite()).map(StyleValue::Percent);
        }
        let number = text.strip_suffix("ch").unwrap_or(text);
        number
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(StyleValue::Cells)
    }

    /// Resolve to cells. `Auto` has no numeric value.
    pub fn resolve(&self, ctx: &CalcContext) -> Option<f32> {
        match self {
            StyleValue::Auto => None,
            StyleValue::Cells(n) => Some(*n),
            StyleValue::Percent(p) => Some(
                p / 100.0
                    * match ctx.axis {
                        Axis::Horizontal => ctx.container_width,
                        Axis::Vertical => ctx.container_height,
                    },
            ),
            StyleValue::Calc(value) => Some(value.resolve(ctx)),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, value: f32, suffix: &str) -> fmt::Result {
    if value.fract() == 0.0 {
        write!(f, "{}{suffix}", value as i64)
    } else {
        write!(f, "{value}{suffix}")
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Auto => write!(f, "auto"),
            StyleValue::Cells(n) => write_number(f, *n, ""),
            StyleValue::Percent(p) => write_number(f, *p, "%"),
            StyleValue::Calc(value) => write!(f, "{value}"),
        }
    }
}

/// Four-sided values (top, right, bottom, left) like CSS margin/padding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueBox {
    pub top: StyleValue,
    pub right: StyleValue,
    pub bottom: StyleValue,
    pub left: StyleValue,
}

impl ValueBox {
    /// The same value on all four sides.
    pub fn all(v: StyleValue) -> Self {
        Self {
            top: v.clone(),
            right: v.clone(),
            bottom: v.clone(),
            left: v,
        }
    }

    /// Vertical and horizontal pairs.
    pub fn symmetric(vertical: StyleValue, horizontal: StyleValue) -> Self {
        Self {
            top: vertical.clone(),
            right: horizontal.clone(),
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn new(top: StyleValue, right: StyleValue, bottom: StyleValue, left: StyleValue) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Whether any side holds a calc expression.
    pub fn has_calc(&self) -> bool {
        [&self.top, &self.right, &self.bottom, &self.left]
            .iter()
            .any(|v| v.is_calc())
    }
}

impl Default for ValueBox {
    fn default() -> Self {
        ValueBox::all(StyleValue::Cells(0.0))
    }
}

/// Split at `sep` outside parentheses; pieces are trimmed.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// Split on whitespace outside parentheses.
pub(crate) fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut depth = 0i32;
    let mut start: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    words.push(&text[s..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        words.push(&text[s..]);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_values() {
        assert_eq!(StyleValue::parse("auto"), Some(StyleValue::Auto));
        assert_eq!(StyleValue::parse("10"), Some(StyleValue::Cells(10.0)));
        assert_eq!(StyleValue::parse("3ch"), Some(StyleValue::Cells(3.0)));
        assert_eq!(StyleValue::parse("50%"), Some(StyleValue::Percent(50.0)));
        assert_eq!(StyleValue::parse("10px"), None);
        assert_eq!(StyleValue::parse("wide"), None);
    }

    #[test]
    fn test_parse_calc_stays_deferred() {
        let value = StyleValue::parse("calc(100% - 2)").unwrap();
        assert!(value.is_calc());
        assert_eq!(value.to_string(), "calc(100% - 2)");
        assert_eq!(StyleValue::parse("calc(1 +)"), None);
    }

    #[test]
    fn test_resolve() {
        let ctx = CalcContext::new(40.0, 10.0, Axis::Horizontal);
        assert_eq!(StyleValue::Auto.resolve(&ctx), None);
        assert_eq!(StyleValue::Cells(4.0).resolve(&ctx), Some(4.0));
        assert_eq!(StyleValue::Percent(50.0).resolve(&ctx), Some(20.0));
        assert_eq!(
            StyleValue::Percent(50.0).resolve(&ctx.with_axis(Axis::Vertical)),
            Some(5.0)
        );
        let calc = StyleValue::parse("calc(100% - 2)").unwrap();
        assert_eq!(calc.resolve(&ctx), Some(38.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(StyleValue::Cells(10.0).to_string(), "10");
        assert_eq!(StyleValue::Cells(2.5).to_string(), "2.5");
        assert_eq!(StyleValue::Percent(50.0).to_string(), "50%");
        assert_eq!(StyleValue::Auto.to_string(), "auto");
    }

    #[test]
    fn test_value_box() {
        let b = ValueBox::symmetric(StyleValue::Cells(1.0), StyleValue::Cells(2.0));
        assert_eq!(b.top, StyleValue::Cells(1.0));
        assert_eq!(b.right, StyleValue::Cells(2.0));
        assert!(!b.has_calc());

        let c = ValueBox::all(StyleValue::parse("calc(1 + 1)").unwrap());
        assert!(c.has_calc());
    }
}
