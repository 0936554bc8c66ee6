//! CSS custom properties (`--name`) and `var()` substitution.
//!
//! Custom properties are collected registry-wide and substituted textually
//! into declaration values before the typed property parsers run.
//!
//! A reference is *invalid* when it is part of a cycle or nests deeper than
//! [`MAX_VAR_DEPTH`]. An invalid reference takes its fallback; without one,
//! the invalidity propagates to the enclosing reference, so the outermost
//! available fallback wins. An undefined variable without fallback
//! substitutes the empty string.

use std::collections::HashMap;

/// Maximum nesting of `var()` resolution before a reference is invalid.
pub const MAX_VAR_DEPTH: usize = 10;

/// Registry-wide custom property definitions.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    variables: HashMap<String, String>,
}

impl VariableScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a custom property. Returns `true` if the stored
    /// value changed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        let value = value.into();
        if self.variables.get(&name) == Some(&value) {
            return false;
        }
        self.variables.insert(name, value);
        true
    }

    /// The raw (unsubstituted) value of a custom property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }

    /// Whether `text` contains a `var()` reference.
    pub fn has_references(text: &str) -> bool {
        find_var(text, 0).is_some()
    }

    /// Substitute every `var()` reference in `text`.
    pub fn resolve(&self, text: &str) -> String {
        let mut stack = Vec::new();
        self.substitute(text, &mut stack).unwrap_or_default()
    }

    /// Substitute references in `text`. `None` means an invalid reference
    /// without fallback was hit.
    fn substitute(&self, text: &str, stack: &mut Vec<String>) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        while let Some(start) = find_var(text, cursor) {
            let open = start + "var(".len() - 1;
            let Some(close) = matching_paren(text, open) else {
                // Malformed reference: keep the remainder verbatim.
                break;
            };

            out.push_str(&text[cursor..start]);
            let inner = &text[open + 1..close];
            let (name, fallback) = split_reference(inner);
            out.push_str(&self.resolve_reference(name, fallback, stack)?);
            cursor = close + 1;
        }

        out.push_str(&text[cursor..]);
        Some(out.trim().to_string())
    }

    fn resolve_reference(
        &self,
        name: &str,
        fallback: Option<&str>,
        stack: &mut Vec<String>,
    ) -> Option<String> {
        let invalid = stack.len() >= MAX_VAR_DEPTH || stack.iter().any(|n| n == name);

        let resolved = if invalid {
            None
        } else {
            match self.get(name) {
                Some(raw) => {
                    let raw = raw.to_string();
                    stack.push(name.to_string());
                    let value = self.substitute(&raw, stack);
                    stack.pop();
                    value
                }
                None => {
                    return match fallback {
                        Some(fb) => self.substitute(fb, stack),
                        None => Some(String::new()),
                    };
                }
            }
        };

        match (resolved, fallback) {
            (Some(value), _) => Some(value),
            (None, Some(fb)) => self.substitute(fb, stack),
            (None, None) => None,
        }
    }
}

/// Byte index of the next `var(` at or after `from` that is not the tail
/// of a longer identifier.
fn find_var(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut search = from;
    while let Some(rel) = text.get(search..)?.find("var(") {
        let idx = search + rel;
        let prev_is_ident = idx > 0 && {
            let b = bytes[idx - 1];
            b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
        };
        if !prev_is_ident {
            return Some(idx);
        }
        search = idx + 4;
    }
    None
}

/// Index of the `)` closing the `(` at `open`, skipping quoted strings.
pub(crate) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, ch) in text[open..].char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `--name, fallback` at the first top-level comma.
fn split_reference(inner: &str) -> (&str, Option<&str>) {
    let mut depth = 0i32;
    for (i, ch) in inner.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => return (inner[..i].trim(), Some(inner[i + 1..].trim())),
            _ => {}
        }
    }
    (inner.trim(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(defs: &[(&str, &str)]) -> VariableScope {
        let mut s = VariableScope::new();
        for (name, value) in defs {
            s.set(*name, *value);
        }
        s
    }

    // ── Basic substitution ───────────────────────────────────────────

    #[test]
    fn substitutes_defined_variable() {
        let s = scope(&[("--accent", "#ff0000")]);
        assert_eq!(s.resolve("var(--accent)"), "#ff0000");
        assert_eq!(s.resolve("1 solid var(--accent)"), "1 solid #ff0000");
    }

    #[test]
    fn undefined_uses_fallback_or_empty() {
        let s = VariableScope::new();
        assert_eq!(s.resolve("var(--missing, blue)"), "blue");
        assert_eq!(s.resolve("var(--missing)"), "");
    }

    #[test]
    fn fallback_may_contain_commas_and_functions() {
        let s = VariableScope::new();
        assert_eq!(
            s.resolve("var(--bg, linear-gradient(red, blue))"),
            "linear-gradient(red, blue)"
        );
    }

    #[test]
    fn nested_references_and_fallbacks() {
        let s = scope(&[("--a", "var(--b)"), ("--b", "3")]);
        assert_eq!(s.resolve("calc(var(--a) * 2)"), "calc(3 * 2)");
        assert_eq!(s.resolve("var(--none, var(--b))"), "3");
    }

    #[test]
    fn ident_ending_in_var_is_not_a_reference() {
        let s = scope(&[("--x", "1")]);
        assert_eq!(s.resolve("myvar(--x)"), "myvar(--x)");
    }

    #[test]
    fn unterminated_reference_kept() {
        let s = scope(&[("--x", "1")]);
        assert_eq!(s.resolve("var(--x"), "var(--x");
    }

    // ── Cycles and depth ─────────────────────────────────────────────

    #[test]
    fn self_reference_uses_fallback() {
        let s = scope(&[("--a", "var(--a)")]);
        assert_eq!(s.resolve("var(--a, red)"), "red");
        assert_eq!(s.resolve("var(--a)"), "");
    }

    #[test]
    fn mutual_cycle_uses_outermost_fallback() {
        let s = scope(&[("--a", "var(--b)"), ("--b", "var(--a)")]);
        assert_eq!(s.resolve("var(--a, green)"), "green");
        assert_eq!(s.resolve("var(--b)"), "");
    }

    #[test]
    fn inner_fallback_breaks_cycle() {
        let s = scope(&[("--a", "var(--b, 7)"), ("--b", "var(--a)")]);
        assert_eq!(s.resolve("var(--a)"), "7");
    }

    #[test]
    fn depth_limit_invalidates_long_chains() {
        let mut defs = Vec::new();
        for i in 0..15 {
            defs.push((format!("--v{i}"), format!("var(--v{})", i + 1)));
        }
        defs.push(("--v15".to_string(), "end".to_string()));
        let mut s = VariableScope::new();
        for (n, v) in &defs {
            s.set(n.as_str(), v.as_str());
        }
        assert_eq!(s.resolve("var(--v0, fb)"), "fb");
        // A short chain still resolves.
        assert_eq!(s.resolve("var(--v10)"), "end");
    }

    #[test]
    fn set_reports_change() {
        let mut s = VariableScope::new();
        assert!(s.set("--a", "1"));
        assert!(!s.set("--a", "1"));
        assert!(s.set("--a", "2"));
        assert_eq!(s.len(), 1);
        s.clear();
        assert!(s.is_empty());
    }
}
