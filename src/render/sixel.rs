//! Sixel graphics encoding.
//!
//! Images are reduced to an indexed palette of at most 256 entries and
//! written as a DEC sixel stream (`DCS q … ST`) one six-row band at a time.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, Write};

use crate::css::color::Color;

/// Largest palette a sixel stream may use.
pub const MAX_PALETTE: usize = 256;

const INTRODUCER: &str = "\x1bP0;1;0q";
const TERMINATOR: &str = "\x1b\\";
const SIXEL_BASE: u8 = 0x3f;
/// Runs this long or longer use the `!N` repeat form.
const REPEAT_THRESHOLD: usize = 4;

/// A palette image ready for sixel encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
    /// Palette colors. The transparent slot, if any, is included.
    pub palette: Vec<Color>,
    /// Palette slot shared by every fully transparent pixel.
    pub transparent_index: Option<u8>,
}

/// Build an indexed image from RGBA pixels.
///
/// Pixels with alpha 0 share one reserved slot; every other pixel is treated
/// as opaque. When the distinct colors do not fit, channels are quantized
/// with progressively fewer bits until they do. Missing trailing bytes read
/// as transparent.
pub fn rgba_to_indexed(rgba: &[u8], width: u32, height: u32) -> IndexedImage {
    let pixel_count = width as usize * height as usize;
    let pixel = |i: usize| -> Option<(u8, u8, u8)> {
        let p = rgba.get(i * 4..i * 4 + 4)?;
        (p[3] > 0).then_some((p[0], p[1], p[2]))
    };

    let has_transparent = (0..pixel_count).any(|i| pixel(i).is_none());
    let capacity = MAX_PALETTE - usize::from(has_transparent);

    let mut bits = 8;
    loop {
        let mut palette: Vec<Color> = Vec::new();
        let mut lookup: HashMap<(u8, u8, u8), u8> = HashMap::new();
        let mut indices = Vec::with_capacity(pixel_count);
        let transparent_index = has_transparent.then(|| {
            palette.push(Color::TRANSPARENT);
            0u8
        });
        let mut overflow = false;

        for i in 0..pixel_count {
            let Some(rgb) = pixel(i) else {
                indices.push(0);
                continue;
            };
            let key = quantize(rgb, bits);
            let index = match lookup.get(&key) {
                Some(&index) => index,
                None => {
                    if lookup.len() >= capacity {
                        overflow = true;
                        break;
                    }
                    let index = palette.len() as u8;
                    palette.push(Color::rgb(key.0, key.1, key.2));
                    lookup.insert(key, index);
                    index
                }
            };
            indices.push(index);
        }

        if !overflow || bits == 1 {
            return IndexedImage {
                width,
                height,
                indices,
                palette,
                transparent_index,
            };
        }
        bits -= 1;
    }
}

/// Keep the top `bits` of each channel, centered in the dropped range.
fn quantize((r, g, b): (u8, u8, u8), bits: u32) -> (u8, u8, u8) {
    if bits >= 8 {
        return (r, g, b);
    }
    let shift = 8 - bits;
    let half = 1u16 << (shift - 1);
    let q = |c: u8| (((c as u16 >> shift) << shift) + half).min(255) as u8;
    (q(r), q(g), q(b))
}

/// Encode into one buffer.
pub fn encode(image: &IndexedImage) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&header(image));
    for top in band_tops(image) {
        out.push_str(&band(image, top));
    }
    out.push_str(TERMINATOR);
    out.into_bytes()
}

/// Stream the encoding into `sink` band by band.
pub fn encode_to<W: Write>(image: &IndexedImage, sink: &mut W) -> io::Result<()> {
    sink.write_all(header(image).as_bytes())?;
    for top in band_tops(image) {
        sink.write_all(band(image, top).as_bytes())?;
    }
    sink.write_all(TERMINATOR.as_bytes())
}

fn band_tops(image: &IndexedImage) -> impl Iterator<Item = u32> {
    (0..image.height).step_by(6)
}

fn header(image: &IndexedImage) -> String {
    let mut out = String::from(INTRODUCER);
    let _ = write!(out, "\"1;1;{};{}", image.width, image.height);
    for (index, color) in image.palette.iter().enumerate() {
        if Some(index as u8) == image.transparent_index {
            continue;
        }
        let _ = write!(
            out,
            "#{};2;{};{};{}",
            index,
            percent(color.r),
            percent(color.g),
            percent(color.b)
        );
    }
    out
}

fn percent(channel: u8) -> u32 {
    (channel as u32 * 100 + 127) / 255
}

/// One six-row band: a pass per color present, each ended by `$`, then `-`.
fn band(image: &IndexedImage, top: u32) -> String {
    let width = image.width as usize;
    let rows = (image.height - top).min(6) as usize;
    let at = |x: usize, row: usize| image.indices.get((top as usize + row) * width + x).copied();

    let mut present = [false; MAX_PALETTE];
    for row in 0..rows {
        for x in 0..width {
            if let Some(index) = at(x, row) {
                present[index as usize] = true;
            }
        }
    }

    let mut out = String::new();
    for index in (0..MAX_PALETTE).filter(|&i| present[i]) {
        if Some(index as u8) == image.transparent_index {
            continue;
        }
        let _ = write!(out, "#{index}");
        let mut sixels: Vec<u8> = (0..width)
            .map(|x| {
                let bits = (0..rows)
                    .filter(|&row| at(x, row) == Some(index as u8))
                    .fold(0u8, |acc, row| acc | (1 << row));
                SIXEL_BASE + bits
            })
            .collect();
        while sixels.last() == Some(&SIXEL_BASE) {
            sixels.pop();
        }
        write_runs(&sixels, &mut out);
        out.push('$');
    }
    out.push('-');
    out
}

fn write_runs(sixels: &[u8], out: &mut String) {
    let mut i = 0;
    while i < sixels.len() {
        let ch = sixels[i];
        let run = sixels[i..].iter().take_while(|&&c| c == ch).count();
        push_run(ch as char, run, out);
        i += run;
    }
}

/// Emit `count` copies of `ch`, using DECGRI (`!N`) once it is shorter.
fn push_run(ch: char, count: usize, out: &mut String) {
    if count >= REPEAT_THRESHOLD {
        let _ = write!(out, "!{count}{ch}");
    } else {
        out.extend(std::iter::repeat(ch).take(count));
    }
}

/// Nearest-neighbour resize of RGBA pixels.
pub fn scale_rgba(rgba: &[u8], width: u32, height: u32, new_width: u32, new_height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(new_width as usize * new_height as usize * 4);
    if width == 0 || height == 0 {
        out.resize(new_width as usize * new_height as usize * 4, 0);
        return out;
    }
    for y in 0..new_height {
        let sy = (y as u64 * height as u64 / new_height.max(1) as u64) as usize;
        for x in 0..new_width {
            let sx = (x as u64 * width as u64 / new_width.max(1) as u64) as usize;
            let i = (sy * width as usize + sx) * 4;
            match rgba.get(i..i + 4) {
                Some(p) => out.extend_from_slice(p),
                None => out.extend_from_slice(&[0, 0, 0, 0]),
            }
        }
    }
    out
}

/// Copy a rectangle out of RGBA pixels. Parts outside the source read as
/// transparent.
pub fn crop_rgba(rgba: &[u8], width: u32, x: u32, y: u32, crop_width: u32, crop_height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(crop_width as usize * crop_height as usize * 4);
    for row in y..y + crop_height {
        for col in x..x + crop_width {
            let i = (row as usize * width as usize + col as usize) * 4;
            match rgba.get(i..i + 4).filter(|_| col < width) {
                Some(p) => out.extend_from_slice(p),
                None => out.extend_from_slice(&[0, 0, 0, 0]),
            }
        }
    }
    out
}
