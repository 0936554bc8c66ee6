//! logos-based CSS tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `#fff` as HexColor beats `#` as Hash)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Our ordering ensures:
//! - `::before` matches [`Token::PseudoElement`], not two `Colon`s
//! - `:hover` matches [`Token::PseudoClass`], not `Colon` + `Ident`
//! - `--accent` matches [`Token::CustomIdent`], not `Minus` + `Ident`
//! - `^=` matches [`Token::PrefixMatch`], not an error + `Equals`
//!
//! Declaration values are not interpreted here. The parser slices the raw
//! source text between `:` and `;` using token spans, so the value tokens
//! only need to be good enough to find that boundary.

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// `!important` flag.
    #[token("!important")]
    Important,

    /// At-rule keyword: `@media`, `@keyframes`.
    #[regex(r"@[a-zA-Z][a-zA-Z0-9_-]*")]
    AtKeyword,

    /// CSS hex color: `#fff`, `#ff00aa`, `#ff00aa80` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Dimension: number with unit suffix like `10ch`, `50%`, `45deg`.
    #[regex(r"[0-9]*\.?[0-9]+(%|[a-zA-Z]+)")]
    Dimension,

    /// Pseudo-element: `::before`, `::picker`.
    #[regex(r"::[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoElement,

    /// Pseudo-class: `:hover`, `:nth-child`, etc.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoClass,

    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Custom property name: `--accent`, `--gap-size`.
    #[regex(r"--[a-zA-Z0-9_-]+")]
    CustomIdent,

    /// Number: integer or float.
    #[regex(r"[0-9]*\.?[0-9]+")]
    Number,

    /// Identifier: property names, selector names, color names, etc.
    #[regex(r"-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Attribute operators ──────────────────────────────────────────

    /// `~=`
    #[token("~=")]
    IncludesMatch,

    /// `|=`
    #[token("|=")]
    DashMatch,

    /// `^=`
    #[token("^=")]
    PrefixMatch,

    /// `$=`
    #[token("$=")]
    SuffixMatch,

    /// `*=`
    #[token("*=")]
    SubstringMatch,

    // ── Single-character punctuation ─────────────────────────────────

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `(`
    #[token("(")]
    ParenOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// `[`
    #[token("[")]
    BracketOpen,

    /// `]`
    #[token("]")]
    BracketClose,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,

    /// `*`
    #[token("*")]
    Star,

    /// `>`
    #[token(">")]
    GreaterThan,

    /// `+`
    #[token("+")]
    Plus,

    /// `~`
    #[token("~")]
    Tilde,

    /// `=`
    #[token("=")]
    Equals,

    /// `-`
    #[token("-")]
    Minus,

    /// `/`
    #[token("/")]
    Slash,
}

/// Tokenize a CSS string into a vector of `(Token, String)` pairs.
///
/// Characters that fail to lex are skipped.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    let lexer = Token::lexer(input);
    lexer
        .spanned()
        .filter_map(|(result, span)| {
            result.ok().map(|token| (token, input[span].to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: tokenize and return just the token variants.
    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|(t, _)| t).collect()
    }

    // ── Punctuation ──────────────────────────────────────────────────

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokens("{ } ( ) [ ] : ; , . # * > + ~ = /"),
            vec![
                Token::BraceOpen,
                Token::BraceClose,
                Token::ParenOpen,
                Token::ParenClose,
                Token::BracketOpen,
                Token::BracketClose,
                Token::Colon,
                Token::Semicolon,
                Token::Comma,
                Token::Dot,
                Token::Hash,
                Token::Star,
                Token::GreaterThan,
                Token::Plus,
                Token::Tilde,
                Token::Equals,
                Token::Slash,
            ]
        );
    }

    #[test]
    fn test_attribute_operators() {
        assert_eq!(
            tokens("~= |= ^= $= *="),
            vec![
                Token::IncludesMatch,
                Token::DashMatch,
                Token::PrefixMatch,
                Token::SuffixMatch,
                Token::SubstringMatch,
            ]
        );
    }

    // ── Identifiers ──────────────────────────────────────────────────

    #[test]
    fn test_idents_and_custom_idents() {
        let result = tokenize("color my-widget -webkit-box --accent");
        assert_eq!(result[0], (Token::Ident, "color".into()));
        assert_eq!(result[1], (Token::Ident, "my-widget".into()));
        assert_eq!(result[2], (Token::Ident, "-webkit-box".into()));
        assert_eq!(result[3], (Token::CustomIdent, "--accent".into()));
    }

    // ── Pseudo selectors ─────────────────────────────────────────────

    #[test]
    fn test_pseudo_class_vs_element() {
        let result = tokenize("li:first-child::marker");
        assert_eq!(
            result,
            vec![
                (Token::Ident, "li".into()),
                (Token::PseudoClass, ":first-child".into()),
                (Token::PseudoElement, "::marker".into()),
            ]
        );
    }

    #[test]
    fn test_functional_pseudo_class_splits_paren() {
        assert_eq!(
            tokens(":nth-child(2n+1)"),
            vec![
                Token::PseudoClass,
                Token::ParenOpen,
                Token::Dimension,
                Token::Plus,
                Token::Number,
                Token::ParenClose,
            ]
        );
    }

    // ── Values ───────────────────────────────────────────────────────

    #[test]
    fn test_numbers_and_dimensions() {
        let result = tokenize("10 0.5 50% 3ch 45deg .5turn");
        assert_eq!(result[0].0, Token::Number);
        assert_eq!(result[1].0, Token::Number);
        assert_eq!(result[2], (Token::Dimension, "50%".into()));
        assert_eq!(result[3], (Token::Dimension, "3ch".into()));
        assert_eq!(result[4], (Token::Dimension, "45deg".into()));
        assert_eq!(result[5], (Token::Dimension, ".5turn".into()));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(tokens("#fff #ff00aa"), vec![Token::HexColor, Token::HexColor]);
    }

    #[test]
    fn test_important_and_at_keyword() {
        assert_eq!(
            tokens("@media !important"),
            vec![Token::AtKeyword, Token::Important]
        );
    }

    #[test]
    fn test_strings() {
        let result = tokenize(r#""a;b" 'c'"#);
        assert_eq!(result[0], (Token::StringLiteral, "\"a;b\"".into()));
        assert_eq!(result[1], (Token::StringLiteralSingle, "'c'".into()));
    }

    #[test]
    fn test_unlexable_characters_are_skipped() {
        assert_eq!(tokens("a ` b"), vec![Token::Ident, Token::Ident]);
    }
}
