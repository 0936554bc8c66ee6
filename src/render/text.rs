//! Display-width aware text measurement and wrapping.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::css::styles::WhiteSpace;
use crate::geometry::Size;

const TAB_STOP: usize = 4;

/// Terminal columns taken by `text`.
pub fn display_width(text: &str) -> i32 {
    UnicodeWidthStr::width(text) as i32
}

/// Terminal columns taken by one character. Control and combining
/// characters take none.
pub fn char_width(ch: char) -> i32 {
    UnicodeWidthChar::width(ch).unwrap_or(0) as i32
}

/// The longest prefix of `text` that fits in `width` columns.
pub fn truncate_to_width(text: &str, width: i32) -> &str {
    let mut used = 0;
    for (index, ch) in text.char_indices() {
        let w = char_width(ch);
        if used + w > width {
            return &text[..index];
        }
        used += w;
    }
    text
}

/// Break `text` into lines for a box `width` columns wide.
///
/// `Normal` collapses whitespace and wraps at word boundaries; a word wider
/// than the box sits on its own line, cut to the box width. `NoWrap`
/// collapses whitespace onto one line. `Pre` keeps whitespace and breaks only
/// at newlines. A `None` width never wraps.
pub fn wrap(text: &str, width: Option<i32>, mode: WhiteSpace) -> Vec<String> {
    match mode {
        WhiteSpace::Pre => text.split('\n').map(expand_tabs).collect(),
        WhiteSpace::NoWrap => {
            let line = collapse(text);
            if line.is_empty() {
                Vec::new()
            } else {
                vec![line]
            }
        }
        WhiteSpace::Normal => match width {
            None => wrap(text, None, WhiteSpace::NoWrap),
            Some(width) => wrap_words(text, width),
        },
    }
}

/// Size of the wrapped text block: widest line by line count.
pub fn measure(text: &str, width: Option<i32>, mode: WhiteSpace) -> Size {
    let lines = wrap(text, width, mode);
    let widest = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
    Size::new(widest, lines.len() as i32)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn expand_tabs(line: &str) -> String {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut out = String::with_capacity(line.len());
    let mut column = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_STOP - column % TAB_STOP;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(ch);
            column += char_width(ch) as usize;
        }
    }
    out
}

fn wrap_words(text: &str, width: i32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = display_width(word);
        if current.is_empty() {
            if word_width > width {
                lines.push(truncate_to_width(word, width).to_string());
                continue;
            }
            current.push_str(word);
            current_width = word_width;
        } else if current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
            if word_width > width {
                lines.push(truncate_to_width(word, width).to_string());
            } else {
                current.push_str(word);
                current_width = word_width;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn widths_follow_unicode_columns() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(char_width('界'), 2);
        assert_eq!(char_width('\u{0301}'), 0);
    }

    #[test]
    fn zero_width_cuts_every_word() {
        let lines = wrap("ab cd", Some(0), WhiteSpace::Normal);
        assert_eq!(lines, vec![String::new(), String::new()]);
        assert_eq!(measure("ab cd", Some(0), WhiteSpace::Normal), Size::new(0, 2));
    }

    #[test]
    fn truncate_respects_wide_glyphs() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("日本語", 3), "日");
        assert_eq!(truncate_to_width("ab", 10), "ab");
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap("the quick brown fox", Some(10), WhiteSpace::Normal);
        assert_eq!(lines, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn collapses_whitespace() {
        let lines = wrap("  a \n\t b  ", Some(20), WhiteSpace::Normal);
        assert_eq!(lines, vec!["a b"]);
    }

    #[test]
    fn long_word_is_hard_clipped() {
        let lines = wrap("go supercalifragilistic now", Some(5), WhiteSpace::Normal);
        assert_eq!(lines, vec!["go", "super", "now"]);
    }

    #[test]
    fn wide_glyphs_count_two_columns() {
        let lines = wrap("日本 語", Some(4), WhiteSpace::Normal);
        assert_eq!(lines, vec!["日本", "語"]);
    }

    #[test]
    fn nowrap_keeps_one_line() {
        let lines = wrap("one   two three", Some(3), WhiteSpace::NoWrap);
        assert_eq!(lines, vec!["one two three"]);
    }

    #[test]
    fn pre_keeps_breaks_and_spaces() {
        let lines = wrap("a  b\n\tc", Some(2), WhiteSpace::Pre);
        assert_eq!(lines, vec!["a  b", "    c"]);
    }

    #[test]
    fn unbounded_width_never_wraps() {
        let lines = wrap("a b c", None, WhiteSpace::Normal);
        assert_eq!(lines, vec!["a b c"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap("   ", Some(10), WhiteSpace::Normal).is_empty());
        assert_eq!(measure("", Some(10), WhiteSpace::Normal), Size::ZERO);
    }

    #[test]
    fn measure_reports_widest_line() {
        assert_eq!(measure("aaa bb c", Some(4), WhiteSpace::Normal), Size::new(4, 2));
    }
}
