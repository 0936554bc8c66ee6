//! Linear, radial and conic gradients over a cell grid.
//!
//! A [`Gradient`] maps a cell `(x, y)` inside a `w × h` box to an offset with
//! [`Gradient::position_at`], and an offset to a color with
//! [`Gradient::color_at`]. Offsets are sampled at cell centres.

use std::f32::consts::PI;

use crate::css::color::Color;
use crate::css::value::{split_top_level, split_words};
use crate::css::variables::matching_paren;

/// A color stop. `offset` is a fraction of the gradient line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

impl ColorStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Radial gradient shape. Both shapes scale per axis to the farthest edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadialShape {
    Circle,
    #[default]
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    /// Angle in degrees, 0 = to top, clockwise.
    Linear { angle: f32 },
    /// Centre as fractions of the box.
    Radial { shape: RadialShape, center: (f32, f32) },
    /// Start angle in degrees, 0 = up, clockwise.
    Conic { from: f32, center: (f32, f32) },
}

/// A parsed gradient with normalized stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    pub repeating: bool,
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    /// Offset along the gradient for the cell `(x, y)` of a `w × h` box.
    ///
    /// Zero-area boxes give `0`.
    pub fn position_at(&self, x: i32, y: i32, w: i32, h: i32) -> f32 {
        if w <= 0 || h <= 0 {
            return 0.0;
        }
        let offset = match self.kind {
            GradientKind::Linear { angle } => linear_position(angle, x, y, w, h),
            GradientKind::Radial { center, .. } => radial_position(center, x, y, w, h),
            GradientKind::Conic { from, center } => conic_position(from, center, x, y, w, h),
        };
        if offset.is_finite() {
            offset
        } else {
            0.0
        }
    }

    /// Interpolated color at `offset`.
    ///
    /// Repeating gradients wrap the offset modulo the stops' span;
    /// others clamp it to `[0, 1]`.
    pub fn color_at(&self, offset: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Color::TRANSPARENT,
        };
        let offset = if offset.is_finite() { offset } else { 0.0 };

        let pos = if self.repeating {
            let span = last.offset - first.offset;
            if span <= 0.0 {
                return last.color;
            }
            first.offset + (offset - first.offset).rem_euclid(span)
        } else {
            offset.clamp(0.0, 1.0)
        };

        if pos <= first.offset {
            return first.color;
        }
        if pos >= last.offset {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if pos >= a.offset && pos <= b.offset {
                let span = b.offset - a.offset;
                if span <= 0.0 {
                    return b.color;
                }
                return a.color.lerp(b.color, (pos - a.offset) / span);
            }
        }
        last.color
    }

    /// Color of the cell `(x, y)` in a `w × h` box.
    pub fn sample(&self, x: i32, y: i32, w: i32, h: i32) -> Color {
        self.color_at(self.position_at(x, y, w, h))
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

fn edge_fraction(v: i32, extent: i32) -> f32 {
    if extent > 1 {
        v as f32 / (extent - 1) as f32
    } else {
        0.0
    }
}

fn linear_position(angle: f32, x: i32, y: i32, w: i32, h: i32) -> f32 {
    let angle = angle.rem_euclid(360.0);

    // Cardinal directions map first cell to 0 and last cell to 1 exactly.
    if angle == 0.0 {
        return 1.0 - edge_fraction(y, h);
    }
    if angle == 90.0 {
        return edge_fraction(x, w);
    }
    if angle == 180.0 {
        return edge_fraction(y, h);
    }
    if angle == 270.0 {
        return 1.0 - edge_fraction(x, w);
    }

    let rad = angle.to_radians();
    let (sin, cos) = rad.sin_cos();
    let nx = (x as f32 + 0.5) / w as f32 - 0.5;
    let ny = (y as f32 + 0.5) / h as f32 - 0.5;
    let projection = nx * sin - ny * cos;
    let max_projection = 0.5 * (sin.abs() + cos.abs());
    if max_projection == 0.0 {
        return 0.0;
    }
    projection / max_projection * 0.5 + 0.5
}

fn radial_position(center: (f32, f32), x: i32, y: i32, w: i32, h: i32) -> f32 {
    let (w, h) = (w as f32, h as f32);
    let (cx, cy) = (center.0 * w, center.1 * h);
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;

    let rx = cx.max(w - cx);
    let ry = cy.max(h - cy);
    let sx = if rx > 0.0 { dx / rx } else { 0.0 };
    let sy = if ry > 0.0 { dy / ry } else { 0.0 };
    (sx * sx + sy * sy).sqrt()
}

fn conic_position(from: f32, center: (f32, f32), x: i32, y: i32, w: i32, h: i32) -> f32 {
    let dx = x as f32 + 0.5 - center.0 * w as f32;
    let dy = y as f32 + 0.5 - center.1 * h as f32;
    // 0 is up, increasing clockwise with y growing downward.
    let degrees = dx.atan2(-dy).to_degrees() - from;
    let offset = degrees.rem_euclid(360.0) / 360.0;
    if offset >= 1.0 {
        0.0
    } else {
        offset
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a `*-gradient()` value. Returns `None` for anything malformed or
/// with fewer than two color stops.
pub fn parse(value: &str) -> Option<Gradient> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    let (repeating, rest) = match lower.strip_prefix("repeating-") {
        Some(rest) => (true, rest),
        None => (false, lower.as_str()),
    };

    let (name, open) = ["linear-gradient", "radial-gradient", "conic-gradient"]
        .iter()
        .find_map(|name| {
            rest.strip_prefix(name)
                .filter(|after| after.starts_with('('))
                .map(|_| (*name, lower.len() - rest.len() + name.len()))
        })?;
    if matching_paren(&lower, open)? != lower.len() - 1 {
        return None;
    }
    let args = split_top_level(&lower[open + 1..lower.len() - 1], ',');
    let (first, stop_args) = args.split_first()?;

    let (kind, stop_args) = match name {
        "linear-gradient" => match parse_linear_config(first) {
            Some(angle) => (GradientKind::Linear { angle }, stop_args),
            None => (GradientKind::Linear { angle: 180.0 }, &args[..]),
        },
        "radial-gradient" => match parse_radial_config(first) {
            Some((shape, center)) => (GradientKind::Radial { shape, center }, stop_args),
            None => (
                GradientKind::Radial {
                    shape: RadialShape::Ellipse,
                    center: (0.5, 0.5),
                },
                &args[..],
            ),
        },
        _ => match parse_conic_config(first) {
            Some((from, center)) => (GradientKind::Conic { from, center }, stop_args),
            None => (
                GradientKind::Conic {
                    from: 0.0,
                    center: (0.5, 0.5),
                },
                &args[..],
            ),
        },
    };

    let stops = parse_stops(stop_args)?;
    if stops.len() < 2 {
        return None;
    }

    Some(Gradient {
        kind,
        repeating,
        stops,
    })
}

/// Parse an angle in `deg`, `rad`, `grad` or `turn` (or a bare `0`) to degrees.
pub fn parse_angle(text: &str) -> Option<f32> {
    let text = text.trim();
    let units: [(&str, f32); 4] = [
        ("grad", 0.9),
        ("deg", 1.0),
        ("rad", 180.0 / PI),
        ("turn", 360.0),
    ];
    for (unit, factor) in units {
        if let Some(number) = text.strip_suffix(unit) {
            return number.parse::<f32>().ok().map(|n| n * factor);
        }
    }
    (text.parse::<f32>().ok()? == 0.0).then_some(0.0)
}

fn parse_linear_config(arg: &str) -> Option<f32> {
    if let Some(angle) = parse_angle(arg) {
        return Some(angle);
    }
    let words = split_words(arg);
    let (head, sides) = words.split_first()?;
    if *head != "to" || sides.is_empty() || sides.len() > 2 {
        return None;
    }
    let has = |side: &str| sides.contains(&side);
    let angle = match (has("top"), has("right"), has("bottom"), has("left")) {
        (true, false, false, false) => 0.0,
        (false, true, false, false) => 90.0,
        (false, false, true, false) => 180.0,
        (false, false, false, true) => 270.0,
        (true, true, false, false) => 45.0,
        (false, true, true, false) => 135.0,
        (false, false, true, true) => 225.0,
        (true, false, false, true) => 315.0,
        _ => return None,
    };
    Some(angle)
}

fn parse_radial_config(arg: &str) -> Option<(RadialShape, (f32, f32))> {
    let words = split_words(arg);
    let mut shape = RadialShape::Ellipse;
    let mut center = (0.5, 0.5);
    let mut recognized = false;
    let mut i = 0;

    while i < words.len() {
        match words[i] {
            "circle" => shape = RadialShape::Circle,
            "ellipse" => shape = RadialShape::Ellipse,
            "closest-side" | "closest-corner" | "farthest-side" | "farthest-corner" => {}
            "at" => {
                center = parse_position(&words[i + 1..])?;
                recognized = true;
                break;
            }
            _ => return None,
        }
        recognized = true;
        i += 1;
    }

    recognized.then_some((shape, center))
}

fn parse_conic_config(arg: &str) -> Option<(f32, (f32, f32))> {
    let words = split_words(arg);
    let mut from = 0.0;
    let mut center = (0.5, 0.5);

    match words.as_slice() {
        ["from", angle] => from = parse_angle(angle)?,
        ["from", angle, "at", position @ ..] => {
            from = parse_angle(angle)?;
            center = parse_position(position)?;
        }
        ["at", position @ ..] => center = parse_position(position)?,
        _ => return None,
    }
    Some((from, center))
}

/// `<position>`: one or two of `left|center|right|top|bottom|<percent>`.
fn parse_position(words: &[&str]) -> Option<(f32, f32)> {
    let percent = |w: &str| w.strip_suffix('%')?.parse::<f32>().ok().map(|p| p / 100.0);
    match words {
        [single] => match *single {
            "top" => Some((0.5, 0.0)),
            "bottom" => Some((0.5, 1.0)),
            "left" => Some((0.0, 0.5)),
            "right" => Some((1.0, 0.5)),
            "center" => Some((0.5, 0.5)),
            other => percent(other).map(|x| (x, 0.5)),
        },
        [a, b] => {
            // Keywords may come in either order: `top left` == `left top`.
            let (a, b) = if matches!(*a, "top" | "bottom") || matches!(*b, "left" | "right") {
                (*b, *a)
            } else {
                (*a, *b)
            };
            let x = match a {
                "left" => 0.0,
                "center" => 0.5,
                "right" => 1.0,
                other => percent(other)?,
            };
            let y = match b {
                "top" => 0.0,
                "center" => 0.5,
                "bottom" => 1.0,
                other => percent(other)?,
            };
            Some((x, y))
        }
        _ => None,
    }
}

/// Offset of one stop position: a percentage or an angle (for conic stops).
fn parse_stop_offset(text: &str) -> Option<f32> {
    if let Some(p) = text.strip_suffix('%') {
        return p.parse::<f32>().ok().map(|p| p / 100.0);
    }
    parse_angle(text).map(|deg| deg / 360.0)
}

fn parse_stops(args: &[&str]) -> Option<Vec<ColorStop>> {
    let mut raw: Vec<(Color, Option<f32>)> = Vec::new();

    for arg in args {
        let words = split_words(arg);
        let (color_word, offsets) = words.split_first()?;
        let color = Color::parse(color_word)?;
        match offsets {
            [] => raw.push((color, None)),
            [at] => raw.push((color, Some(parse_stop_offset(at)?))),
            [from, to] => {
                raw.push((color, Some(parse_stop_offset(from)?)));
                raw.push((color, Some(parse_stop_offset(to)?)));
            }
            _ => return None,
        }
    }

    Some(normalize_stops(raw))
}

/// Fill in missing offsets and make them non-decreasing.
///
/// The first and last stops default to 0 and 1; runs of missing offsets are
/// spread evenly between their defined neighbors.
fn normalize_stops(raw: Vec<(Color, Option<f32>)>) -> Vec<ColorStop> {
    let n = raw.len();
    if n == 0 {
        return Vec::new();
    }
    let mut offsets: Vec<Option<f32>> = raw.iter().map(|(_, o)| *o).collect();
    if offsets[0].is_none() {
        offsets[0] = Some(0.0);
    }
    if offsets[n - 1].is_none() {
        offsets[n - 1] = Some(1.0);
    }

    // Clamp each defined offset to at least the largest before it.
    let mut max_so_far = f32::NEG_INFINITY;
    for offset in offsets.iter_mut().flatten() {
        *offset = offset.max(max_so_far);
        max_so_far = *offset;
    }

    let mut i = 0;
    while i < n {
        if offsets[i].is_some() {
            i += 1;
            continue;
        }
        let start = i - 1;
        let mut end = i;
        while offsets[end].is_none() {
            end += 1;
        }
        let (a, b) = (offsets[start].unwrap_or(0.0), offsets[end].unwrap_or(1.0));
        let steps = (end - start) as f32;
        for (k, slot) in offsets.iter_mut().enumerate().take(end).skip(start + 1) {
            *slot = Some(a + (b - a) * (k - start) as f32 / steps);
        }
        i = end;
    }

    raw.into_iter()
        .zip(offsets)
        .map(|((color, _), offset)| ColorStop::new(offset.unwrap_or(0.0), color))
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn grad(text: &str) -> Gradient {
        parse(text).unwrap_or_else(|| panic!("failed to parse {text}"))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn linear_defaults_to_bottom() {
        let g = grad("linear-gradient(red, blue)");
        assert_eq!(g.kind, GradientKind::Linear { angle: 180.0 });
        assert!(!g.repeating);
        assert_eq!(g.stops, vec![ColorStop::new(0.0, RED), ColorStop::new(1.0, BLUE)]);
    }

    #[test]
    fn linear_directions_and_angle_units() {
        let angle = |t: &str| match grad(t).kind {
            GradientKind::Linear { angle } => angle,
            other => panic!("not linear: {other:?}"),
        };
        assert_eq!(angle("linear-gradient(to right, red, blue)"), 90.0);
        assert_eq!(angle("linear-gradient(to left top, red, blue)"), 315.0);
        assert_eq!(angle("linear-gradient(0.25turn, red, blue)"), 90.0);
        assert!(close(angle("linear-gradient(100grad, red, blue)"), 90.0));
        assert!(close(angle("linear-gradient(3.14159265rad, red, blue)"), 180.0));
        assert_eq!(angle("linear-gradient(0, red, blue)"), 0.0);
    }

    #[test]
    fn radial_and_conic_configuration() {
        assert_eq!(
            grad("radial-gradient(red, blue)").kind,
            GradientKind::Radial { shape: RadialShape::Ellipse, center: (0.5, 0.5) }
        );
        assert_eq!(
            grad("radial-gradient(circle at 25% 75%, red, blue)").kind,
            GradientKind::Radial { shape: RadialShape::Circle, center: (0.25, 0.75) }
        );
        assert_eq!(
            grad("radial-gradient(at top left, red, blue)").kind,
            GradientKind::Radial { shape: RadialShape::Ellipse, center: (0.0, 0.0) }
        );
        assert_eq!(
            grad("conic-gradient(from 90deg at 0% 100%, red, blue)").kind,
            GradientKind::Conic { from: 90.0, center: (0.0, 1.0) }
        );
        assert!(grad("repeating-conic-gradient(red, blue 25%)").repeating);
    }

    #[test]
    fn missing_stop_offsets_are_interpolated() {
        let g = grad("linear-gradient(red, lime, blue 80%, white)");
        let offsets: Vec<f32> = g.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.4, 0.8, 1.0]);
    }

    #[test]
    fn explicit_offsets_kept_and_two_position_stops() {
        let g = grad("linear-gradient(red 10%, blue 30% 60%, rgb(0, 255, 0))");
        let offsets: Vec<f32> = g.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.1, 0.3, 0.6, 1.0]);
    }

    #[test]
    fn decreasing_offsets_are_clamped() {
        let g = grad("linear-gradient(red 50%, blue 20%)");
        assert_eq!(g.stops[1].offset, 0.5);
    }

    #[test]
    fn malformed_gradients_rejected() {
        assert!(parse("linear-gradient()").is_none());
        assert!(parse("linear-gradient(red)").is_none());
        assert!(parse("linear-gradient(to nowhere, red, blue)").is_none());
        assert!(parse("linear-gradient(red, notacolor)").is_none());
        assert!(parse("linear-gradient(red, blue) extra").is_none());
        assert!(parse("sparkle-gradient(red, blue)").is_none());
    }

    // -----------------------------------------------------------------------
    // Positions
    // -----------------------------------------------------------------------

    #[test]
    fn zero_and_one_eighty_are_mirrored() {
        let up = grad("linear-gradient(0deg, red, blue)");
        let down = grad("linear-gradient(180deg, red, blue)");
        let (w, h) = (6, 4);
        for x in 0..w {
            assert_eq!(up.sample(x, 0, w, h), down.sample(x, h - 1, w, h));
            assert_eq!(up.sample(x, h - 1, w, h), down.sample(x, 0, w, h));
        }
        assert_eq!(down.sample(0, 0, w, h), RED);
        assert_eq!(down.sample(0, h - 1, w, h), BLUE);
    }

    #[test]
    fn to_right_spans_edge_to_edge() {
        let g = grad("linear-gradient(to right, red, blue)");
        assert_eq!(g.position_at(0, 0, 5, 1), 0.0);
        assert_eq!(g.position_at(4, 0, 5, 1), 1.0);
        assert_eq!(g.position_at(2, 0, 5, 1), 0.5);
    }

    #[test]
    fn diagonal_projection_is_normalized() {
        let g = grad("linear-gradient(45deg, red, blue)");
        assert!(close(g.position_at(0, 9, 10, 10), 0.05));
        assert!(close(g.position_at(9, 0, 10, 10), 0.95));
    }

    #[test]
    fn radial_scales_to_farthest_edge_per_axis() {
        let g = grad("radial-gradient(circle, red, blue)");
        assert_eq!(g.position_at(2, 2, 5, 5), 0.0);
        assert!(close(g.position_at(0, 2, 5, 5), 0.8));
        // Wide boxes still reach the horizontal edge.
        assert!(close(g.position_at(0, 1, 20, 3), 0.95));
    }

    #[test]
    fn conic_zero_is_up_and_clockwise() {
        let g = grad("conic-gradient(red, blue)");
        assert_eq!(g.position_at(5, 0, 11, 11), 0.0);
        assert!(close(g.position_at(10, 5, 11, 11), 0.25));
        assert!(close(g.position_at(5, 10, 11, 11), 0.5));
        assert!(close(g.position_at(0, 5, 11, 11), 0.75));

        let rotated = grad("conic-gradient(from 90deg, red, blue)");
        assert!(close(rotated.position_at(10, 5, 11, 11), 0.0));
    }

    #[test]
    fn zero_area_box_gives_zero() {
        let g = grad("linear-gradient(45deg, red, blue)");
        assert_eq!(g.position_at(0, 0, 0, 10), 0.0);
        assert_eq!(g.position_at(0, 0, 10, 0), 0.0);
    }

    // -----------------------------------------------------------------------
    // Sampling
    // -----------------------------------------------------------------------

    #[test]
    fn color_at_interpolates_and_clamps() {
        let g = grad("linear-gradient(red, blue)");
        assert_eq!(g.color_at(0.5), Color::rgb(128, 0, 128));
        assert_eq!(g.color_at(-3.0), RED);
        assert_eq!(g.color_at(7.0), BLUE);
        assert_eq!(g.color_at(f32::NAN), RED);
    }

    #[test]
    fn repeating_wraps_over_stop_span() {
        let g = grad("repeating-linear-gradient(red 0%, blue 50%)");
        assert_eq!(g.color_at(0.75), g.color_at(0.25));
        assert_eq!(g.color_at(0.5), RED);
    }

    #[test]
    fn repeating_with_offset_start() {
        let g = grad("repeating-linear-gradient(red 20%, blue 40%)");
        assert_eq!(g.color_at(0.05), g.color_at(0.25));
        assert_eq!(g.color_at(0.2), RED);
    }
}
