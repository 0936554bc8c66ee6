//! Recursive descent CSS parser.
//!
//! Parses CSS text into a [`StyleSheet`] (a vector of [`RuleSet`]s). Uses the
//! logos-based tokenizer from [`crate::css::tokenizer`].
//!
//! Errors are local: a rule with a bad selector is dropped and parsing resumes
//! after its block, a bad declaration is dropped and parsing resumes after the
//! next `;`. Only a stylesheet that cannot be parsed at all (unbalanced braces,
//! an unterminated comment, or no recoverable rule) is an error.

use logos::Logos;
use tracing::warn;

use crate::css::model::*;
use crate::css::tokenizer::Token;

/// Errors from CSS parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("unbalanced braces at byte {byte}")]
    UnbalancedBraces { byte: usize },
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("no valid rules ({dropped} dropped): {reason}")]
    NoValidRules { dropped: usize, reason: String },
}

/// A positioned token with byte-level span information for whitespace detection.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Index in the token stream (for error reporting).
    pos: usize,
    /// Byte offset where this token starts in the source.
    byte_start: usize,
    /// Byte offset where this token ends in the source.
    byte_end: usize,
}

/// Strip CSS block comments (`/* ... */`) from the input, replacing each
/// comment with a single space.
fn strip_comments(input: &str) -> Result<String, ParseError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("*/") {
            Some(end) => {
                result.push(' ');
                rest = &after[end + 2..];
            }
            None => return Err(ParseError::UnterminatedComment),
        }
    }
    result.push_str(rest);

    Ok(result)
}

/// Tokenize input using logos with span information preserved.
fn tokenize_with_spans(input: &str) -> Vec<PToken> {
    let lexer = Token::lexer(input);
    let mut tokens = Vec::new();
    let mut idx = 0;

    for (result, span) in lexer.spanned() {
        if let Ok(token) = result {
            tokens.push(PToken {
                text: input[span.clone()].to_string(),
                token,
                pos: idx,
                byte_start: span.start,
                byte_end: span.end,
            });
            idx += 1;
        }
    }

    tokens
}

/// Reject input whose curly braces do not pair up.
fn check_brace_balance(tokens: &[PToken]) -> Result<(), ParseError> {
    let mut depth: i32 = 0;
    for tok in tokens {
        match tok.token {
            Token::BraceOpen => depth += 1,
            Token::BraceClose => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedBraces { byte: tok.byte_start });
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        let byte = tokens.last().map(|t| t.byte_end).unwrap_or(0);
        return Err(ParseError::UnbalancedBraces { byte });
    }
    Ok(())
}

/// Parse a CSS string into a [`StyleSheet`].
pub fn parse_css(input: &str) -> Result<StyleSheet, ParseError> {
    let cleaned = strip_comments(input)?;
    let tokens = tokenize_with_spans(&cleaned);
    check_brace_balance(&tokens)?;

    let mut parser = Parser::new(&cleaned, tokens);
    let mut rules = Vec::new();
    let mut dropped = 0;
    let mut first_error: Option<ParseError> = None;

    while !parser.is_eof() {
        if parser.peek().is_some_and(|t| t.token == Token::AtKeyword) {
            parser.skip_at_rule();
            continue;
        }

        let start = parser.cursor;
        match parser.parse_rule() {
            Ok(rule) => rules.push(rule),
            Err(err) => {
                warn!(error = %err, "dropping malformed css rule");
                dropped += 1;
                first_error.get_or_insert(err);
                parser.skip_rule_from(start);
            }
        }
    }

    if rules.is_empty() {
        if let Some(err) = first_error {
            return Err(ParseError::NoValidRules {
                dropped,
                reason: err.to_string(),
            });
        }
    }

    Ok(StyleSheet {
        rules,
        dropped_rules: dropped,
    })
}

/// Parse a standalone comma-separated selector list, e.g. for queries.
pub fn parse_selector_list(input: &str) -> Result<Vec<Selector>, ParseError> {
    let tokens = tokenize_with_spans(input);
    let mut parser = Parser::new(input, tokens);
    let selectors = parser.parse_selector_list()?;
    parser.expect_eof()?;
    Ok(selectors)
}

/// Parse an `an+b` formula as used by `:nth-child()`.
///
/// Accepts `odd`, `even`, `n`, `-n+3`, `2n`, `+5`, `3`, with optional spaces
/// around the sign of `b`.
pub fn parse_nth(input: &str) -> Option<NthFormula> {
    let text: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let text = text.to_ascii_lowercase();

    match text.as_str() {
        "odd" => return Some(NthFormula::new(2, 1)),
        "even" => return Some(NthFormula::new(2, 0)),
        "" => return None,
        _ => {}
    }

    match text.find('n') {
        Some(n_idx) => {
            let a = match &text[..n_idx] {
                "" | "+" => 1,
                "-" => -1,
                coeff => coeff.parse::<i32>().ok()?,
            };
            let rest = &text[n_idx + 1..];
            let b = if rest.is_empty() {
                0
            } else {
                if !rest.starts_with('+') && !rest.starts_with('-') {
                    return None;
                }
                rest.parse::<i32>().ok()?
            };
            Some(NthFormula::new(a, b))
        }
        None => text.parse::<i32>().ok().map(|b| NthFormula::new(0, b)),
    }
}

/// Recursive descent parser state.
struct Parser<'a> {
    source: &'a str,
    tokens: Vec<PToken>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<PToken>) -> Self {
        Self {
            source,
            tokens,
            cursor: 0,
        }
    }

    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&PToken> {
        if self.cursor < self.tokens.len() {
            let tok = &self.tokens[self.cursor];
            self.cursor += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok.clone()),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!(
                    "expected {:?}, got {:?} '{}'",
                    expected, tok.token, tok.text
                ),
            }),
            None => Err(ParseError::UnexpectedEof(format!(
                "expected {:?}",
                expected
            ))),
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(self.unexpected(tok, "trailing input")),
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    fn unexpected(&self, tok: &PToken, what: &str) -> ParseError {
        ParseError::UnexpectedToken {
            position: tok.pos,
            message: format!("{what}: {:?} '{}'", tok.token, tok.text),
        }
    }

    /// Returns `true` if the current token is immediately adjacent (no whitespace)
    /// to the previous token.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        match self.peek() {
            Some(curr) => curr.byte_start == prev.byte_end,
            None => false,
        }
    }

    /// Index of the token closing the bracket opened at `open_idx`.
    fn matching_close(&self, open_idx: usize) -> Option<usize> {
        let mut depth = 0i32;
        for (i, tok) in self.tokens.iter().enumerate().skip(open_idx) {
            match tok.token {
                Token::ParenOpen | Token::BracketOpen | Token::BraceOpen => depth += 1,
                Token::ParenClose | Token::BracketClose | Token::BraceClose => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    // ── Recovery ─────────────────────────────────────────────────────

    /// Skip past the block of the rule that started at token `start`.
    fn skip_rule_from(&mut self, start: usize) {
        let open = self.tokens[start..]
            .iter()
            .position(|t| t.token == Token::BraceOpen)
            .map(|i| i + start);
        self.cursor = match open.and_then(|o| self.matching_close(o)) {
            Some(close) => close + 1,
            None => self.tokens.len(),
        };
    }

    /// Skip an at-rule: either up to its `;` or past its `{ ... }` block.
    fn skip_at_rule(&mut self) {
        let at = self.cursor;
        for i in at..self.tokens.len() {
            match self.tokens[i].token {
                Token::Semicolon => {
                    self.cursor = i + 1;
                    return;
                }
                Token::BraceOpen => {
                    self.cursor = self.matching_close(i).map_or(self.tokens.len(), |c| c + 1);
                    return;
                }
                _ => {}
            }
        }
        self.cursor = self.tokens.len();
    }

    /// Skip a malformed declaration: past the next `;` at this depth, or up
    /// to (not including) the `}` that closes the enclosing block.
    fn skip_declaration(&mut self) {
        let mut depth = 0i32;
        while let Some(tok) = self.peek() {
            match tok.token {
                Token::ParenOpen | Token::BracketOpen | Token::BraceOpen => depth += 1,
                Token::ParenClose | Token::BracketClose => depth -= 1,
                Token::BraceClose if depth == 0 => return,
                Token::BraceClose => depth -= 1,
                Token::Semicolon if depth == 0 => {
                    self.cursor += 1;
                    return;
                }
                _ => {}
            }
            self.cursor += 1;
        }
    }

    // ── Rules ────────────────────────────────────────────────────────

    /// Parse a single CSS rule: selector(s) `{` declarations `}`.
    fn parse_rule(&mut self) -> Result<RuleSet, ParseError> {
        let selectors = self.parse_selector_list()?;
        self.expect(&Token::BraceOpen)?;
        let declarations = self.parse_declarations();
        self.expect(&Token::BraceClose)?;

        Ok(RuleSet {
            selectors,
            declarations,
        })
    }

    /// Parse a comma-separated list of selectors.
    fn parse_selector_list(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut selectors = Vec::new();

        selectors.push(self.parse_selector()?);

        while self.peek().is_some_and(|t| t.token == Token::Comma) {
            self.advance(); // consume comma
            selectors.push(self.parse_selector()?);
        }

        Ok(selectors)
    }

    /// Parse a comma-separated list of relative selectors for `:has()`.
    fn parse_relative_selector_list(&mut self) -> Result<Vec<RelativeSelector>, ParseError> {
        let mut list = Vec::new();
        loop {
            let combinator = match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => Some(Combinator::Child),
                Some(Token::Plus) => Some(Combinator::NextSibling),
                Some(Token::Tilde) => Some(Combinator::LaterSibling),
                _ => None,
            };
            if combinator.is_some() {
                self.advance();
            }
            let selector = self.parse_selector()?;
            list.push(RelativeSelector {
                combinator: combinator.unwrap_or(Combinator::Descendant),
                selector,
            });

            if self.peek().is_some_and(|t| t.token == Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(list)
    }

    /// Parse a single selector: a sequence of compound selectors with combinators.
    ///
    /// A selector like `ul > li.active + li` becomes parts:
    /// - Compound [Type("ul")]
    /// - Combinator(Child)
    /// - Compound [Type("li"), Class("active")]
    /// - Combinator(NextSibling)
    /// - Compound [Type("li")]
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = Vec::new();

        parts.push(SelectorPart::Compound(self.parse_compound_selector()?));

        loop {
            let explicit = match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => Some(Combinator::Child),
                Some(Token::Plus) => Some(Combinator::NextSibling),
                Some(Token::Tilde) => Some(Combinator::LaterSibling),
                _ => None,
            };
            if let Some(combinator) = explicit {
                self.advance();
                parts.push(SelectorPart::Combinator(combinator));
                parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                continue;
            }

            // A selector-starting token after whitespace is a descendant
            // combinator. Adjacent tokens were already consumed by the compound.
            match self.peek() {
                Some(t) if starts_compound(&t.token) => {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                _ => break,
            }
        }

        let selector = Selector { parts };
        validate_pseudo_element_position(&selector, self.current_pos())?;
        Ok(selector)
    }

    /// Parse a compound selector: a sequence of simple selector components with
    /// no whitespace between them, e.g. `input[type=text]:focus`.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut compound = CompoundSelector::new();

        match self.peek() {
            Some(t) if t.token == Token::Ident => {
                let name = t.text.to_ascii_lowercase();
                self.advance();
                compound.push(SelectorComponent::Type(name));
            }
            Some(t) if t.token == Token::Star => {
                self.advance();
                compound.push(SelectorComponent::Universal);
            }
            Some(t) if starts_compound(&t.token) => {
                compound.push(self.parse_simple_component()?);
            }
            Some(t) => return Err(self.unexpected(t, "expected selector")),
            None => return Err(ParseError::UnexpectedEof("expected selector".into())),
        }

        // Continue appending only while the next token is adjacent.
        while self.is_adjacent() {
            match self.peek() {
                Some(t) if starts_compound(&t.token) && !matches!(t.token, Token::Ident | Token::Star) => {
                    compound.push(self.parse_simple_component()?);
                }
                _ => break,
            }
        }

        Ok(compound)
    }

    /// Parse one class, id, attribute, pseudo-class or pseudo-element component.
    fn parse_simple_component(&mut self) -> Result<SelectorComponent, ParseError> {
        let tok = self
            .advance()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("expected selector part".into()))?;

        match tok.token {
            Token::Dot => {
                let name_tok = self.advance().cloned().ok_or_else(|| {
                    ParseError::UnexpectedEof("expected class name after '.'".into())
                })?;
                if name_tok.token != Token::Ident {
                    return Err(self.unexpected(&name_tok, "expected class name"));
                }
                Ok(SelectorComponent::Class(name_tok.text))
            }
            Token::Hash => {
                let name_tok = self.advance().cloned().ok_or_else(|| {
                    ParseError::UnexpectedEof("expected id name after '#'".into())
                })?;
                if name_tok.token != Token::Ident {
                    return Err(self.unexpected(&name_tok, "expected id name"));
                }
                Ok(SelectorComponent::Id(self.extend_adjacent_name(name_tok.text)))
            }
            // `#abc` lexes as a hex color; as a selector it is an id.
            Token::HexColor => Ok(SelectorComponent::Id(
                self.extend_adjacent_name(tok.text[1..].to_string()),
            )),
            Token::BracketOpen => self.parse_attribute_selector().map(SelectorComponent::Attribute),
            Token::PseudoClass => {
                let name = tok.text[1..].to_ascii_lowercase();
                if self.peek().is_some_and(|t| t.token == Token::ParenOpen) && self.is_adjacent() {
                    let arg = self.take_parenthesized()?;
                    self.parse_functional_pseudo_class(&name, &arg, tok.pos)
                        .map(SelectorComponent::PseudoClass)
                } else {
                    Ok(SelectorComponent::PseudoClass(PseudoClass::from_name(&name)))
                }
            }
            Token::PseudoElement => {
                let name = tok.text[2..].to_ascii_lowercase();
                if self.peek().is_some_and(|t| t.token == Token::ParenOpen) && self.is_adjacent() {
                    let arg = self.take_parenthesized()?;
                    let arg = arg.trim().to_ascii_lowercase();
                    if name == "picker" && !arg.is_empty() {
                        Ok(SelectorComponent::PseudoElement(PseudoElement::Picker(arg)))
                    } else {
                        Err(self.unexpected(&tok, "unknown functional pseudo-element"))
                    }
                } else {
                    PseudoElement::from_name(&name)
                        .map(SelectorComponent::PseudoElement)
                        .ok_or_else(|| self.unexpected(&tok, "unknown pseudo-element"))
                }
            }
            _ => Err(self.unexpected(&tok, "expected selector part")),
        }
    }

    /// Glue adjacent ident/number tokens onto an id name (`#a1b2c3d4e`).
    fn extend_adjacent_name(&mut self, mut name: String) -> String {
        while self.is_adjacent() {
            match self.peek() {
                Some(t) if matches!(t.token, Token::Ident | Token::Number | Token::Dimension) => {
                    let text = t.text.clone();
                    self.advance();
                    name.push_str(&text);
                }
                _ => break,
            }
        }
        name
    }

    /// Consume `( ... )` and return the raw source text between the parens.
    fn take_parenthesized(&mut self) -> Result<String, ParseError> {
        let open_idx = self.cursor;
        let close_idx = self
            .matching_close(open_idx)
            .ok_or_else(|| ParseError::UnexpectedEof("unclosed '('".into()))?;
        let start = self.tokens[open_idx].byte_end;
        let end = self.tokens[close_idx].byte_start;
        self.cursor = close_idx + 1;
        Ok(self.source[start..end].to_string())
    }

    fn parse_functional_pseudo_class(
        &self,
        name: &str,
        arg: &str,
        position: usize,
    ) -> Result<PseudoClass, ParseError> {
        let bad_arg = || ParseError::UnexpectedToken {
            position,
            message: format!("invalid argument for :{name}(): '{arg}'"),
        };

        match name {
            "nth-child" => parse_nth(arg).map(PseudoClass::NthChild).ok_or_else(bad_arg),
            "nth-last-child" => parse_nth(arg).map(PseudoClass::NthLastChild).ok_or_else(bad_arg),
            "nth-of-type" => parse_nth(arg).map(PseudoClass::NthOfType).ok_or_else(bad_arg),
            "nth-last-of-type" => parse_nth(arg)
                .map(PseudoClass::NthLastOfType)
                .ok_or_else(bad_arg),
            "not" | "is" | "matches" | "where" => {
                let list = parse_nested_selector_list(arg)?;
                if list.iter().any(|s| s.pseudo_element().is_some()) {
                    return Err(bad_arg());
                }
                Ok(match name {
                    "not" => PseudoClass::Not(list),
                    "where" => PseudoClass::Where(list),
                    _ => PseudoClass::Is(list),
                })
            }
            "has" => {
                let tokens = tokenize_with_spans(arg);
                let mut inner = Parser::new(arg, tokens);
                let list = inner.parse_relative_selector_list()?;
                inner.expect_eof()?;
                Ok(PseudoClass::Has(list))
            }
            other => Ok(PseudoClass::Unknown(other.to_string())),
        }
    }

    /// Parse `[name]`, `[name op value]` or `[name op value i]`; the opening
    /// bracket is already consumed.
    fn parse_attribute_selector(&mut self) -> Result<AttributeSelector, ParseError> {
        let name_tok = self
            .advance()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("expected attribute name".into()))?;
        if name_tok.token != Token::Ident {
            return Err(self.unexpected(&name_tok, "expected attribute name"));
        }
        let name = name_tok.text.to_ascii_lowercase();

        let op_tok = self
            .advance()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("expected ']'".into()))?;
        let operator = match op_tok.token {
            Token::BracketClose => {
                return Ok(AttributeSelector {
                    name,
                    value: None,
                    case_insensitive: false,
                });
            }
            Token::Equals => AttributeOperator::Equals,
            Token::IncludesMatch => AttributeOperator::Includes,
            Token::DashMatch => AttributeOperator::DashMatch,
            Token::PrefixMatch => AttributeOperator::Prefix,
            Token::SuffixMatch => AttributeOperator::Suffix,
            Token::SubstringMatch => AttributeOperator::Substring,
            _ => return Err(self.unexpected(&op_tok, "expected attribute operator")),
        };

        let value_tok = self
            .advance()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("expected attribute value".into()))?;
        let value = match value_tok.token {
            Token::StringLiteral | Token::StringLiteralSingle => {
                value_tok.text[1..value_tok.text.len() - 1].to_string()
            }
            Token::Ident | Token::Number | Token::Dimension | Token::CustomIdent => value_tok.text,
            _ => return Err(self.unexpected(&value_tok, "expected attribute value")),
        };

        let mut case_insensitive = false;
        if let Some(flag) = self.peek() {
            if flag.token == Token::Ident {
                match flag.text.as_str() {
                    "i" | "I" => case_insensitive = true,
                    "s" | "S" => {}
                    _ => return Err(self.unexpected(flag, "unknown attribute flag")),
                }
                self.advance();
            }
        }
        self.expect(&Token::BracketClose)?;

        Ok(AttributeSelector {
            name,
            value: Some((operator, value)),
            case_insensitive,
        })
    }

    // ── Declarations ─────────────────────────────────────────────────

    /// Parse declarations between `{` and `}`, dropping malformed ones.
    fn parse_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        while self.peek().is_some_and(|t| t.token != Token::BraceClose) {
            if self.peek().is_some_and(|t| t.token == Token::Semicolon) {
                self.advance();
                continue;
            }
            match self.parse_declaration() {
                Ok(decl) => declarations.push(decl),
                Err(err) => {
                    warn!(error = %err, "dropping malformed css declaration");
                    self.skip_declaration();
                }
            }
        }

        declarations
    }

    /// Parse a single declaration: `property: value [!important];`
    ///
    /// The value is captured as the raw source text between the colon and
    /// the terminator.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let prop_tok = self
            .advance()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("expected property name".into()))?;
        let property = match prop_tok.token {
            Token::Ident => prop_tok.text.to_ascii_lowercase(),
            Token::CustomIdent => prop_tok.text.clone(),
            _ => return Err(self.unexpected(&prop_tok, "expected property name")),
        };

        // `color:red` lexes the colon and value together as a pseudo-class.
        let (value_start, mut value_end) = match self.peek().cloned() {
            Some(t) if t.token == Token::Colon => (t.byte_end, t.byte_end),
            Some(t) if t.token == Token::PseudoClass => (t.byte_start + 1, t.byte_end),
            Some(t) => return Err(self.unexpected(&t, "expected ':'")),
            None => return Err(ParseError::UnexpectedEof("expected ':'".into())),
        };
        self.advance();

        let mut important = false;
        let mut depth = 0i32;

        loop {
            let Some(tok) = self.peek() else { break };
            match tok.token {
                Token::Semicolon | Token::BraceClose if depth == 0 => break,
                Token::Important if depth == 0 => {
                    important = true;
                    self.advance();
                    match self.peek().map(|t| &t.token) {
                        None | Some(Token::Semicolon) | Some(Token::BraceClose) => break,
                        Some(_) => {
                            let t = self.tokens[self.cursor].clone();
                            return Err(self.unexpected(&t, "unexpected token after !important"));
                        }
                    }
                }
                Token::BraceOpen => {
                    let t = tok.clone();
                    return Err(self.unexpected(&t, "unexpected block in declaration"));
                }
                Token::ParenOpen | Token::BracketOpen => depth += 1,
                Token::ParenClose | Token::BracketClose => {
                    depth -= 1;
                    if depth < 0 {
                        let t = tok.clone();
                        return Err(self.unexpected(&t, "unbalanced ')'"));
                    }
                }
                _ => {}
            }
            value_end = self.tokens[self.cursor].byte_end;
            self.cursor += 1;
        }

        if depth != 0 {
            return Err(ParseError::UnexpectedEof("unclosed '(' in value".into()));
        }

        let value = if value_end > value_start {
            self.source[value_start..value_end].trim().to_string()
        } else {
            String::new()
        };
        if value.is_empty() && !property.starts_with("--") {
            return Err(ParseError::UnexpectedToken {
                position: self.current_pos(),
                message: format!("empty value for '{property}'"),
            });
        }

        if self.peek().is_some_and(|t| t.token == Token::Semicolon) {
            self.advance();
        }

        Ok(Declaration {
            property,
            value,
            important,
        })
    }
}

/// Tokens that can begin a compound selector.
fn starts_compound(token: &Token) -> bool {
    matches!(
        token,
        Token::Ident
            | Token::Star
            | Token::Dot
            | Token::Hash
            | Token::HexColor
            | Token::BracketOpen
            | Token::PseudoClass
            | Token::PseudoElement
    )
}

fn parse_nested_selector_list(arg: &str) -> Result<Vec<Selector>, ParseError> {
    let tokens = tokenize_with_spans(arg);
    let mut inner = Parser::new(arg, tokens);
    let list = inner.parse_selector_list()?;
    inner.expect_eof()?;
    Ok(list)
}

/// A pseudo-element may only appear as the last component of the subject.
fn validate_pseudo_element_position(selector: &Selector, position: usize) -> Result<(), ParseError> {
    let last = selector.parts.len().saturating_sub(1);
    for (i, part) in selector.parts.iter().enumerate() {
        if let SelectorPart::Compound(compound) = part {
            for (j, component) in compound.components.iter().enumerate() {
                if matches!(component, SelectorComponent::PseudoElement(_))
                    && (i != last || j != compound.components.len() - 1)
                {
                    return Err(ParseError::UnexpectedToken {
                        position,
                        message: "pseudo-element must be the rightmost component".into(),
                    });
                }
            }
        }
    }
    Ok(())
}
