//! `calc()`, `min()`, `max()` and `clamp()` expressions.
//!
//! Expressions compile to a small tree at stylesheet registration time and
//! stay unresolved until a container size is known. [`CalcValue::resolve`]
//! evaluates against a [`CalcContext`].
//!
//! Units: unitless numbers and `ch` are terminal cells; `%` resolves
//! against the container width or height depending on the [`Axis`].
//! Division by zero and any non-finite intermediate resolve to `0`.

use std::fmt;

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
enum CalcToken {
    #[regex(r"[0-9]*\.?[0-9]+%", |lex| { let s = lex.slice(); s[..s.len() - 1].parse::<f32>().ok() })]
    Percent(f32),

    #[regex(r"[0-9]*\.?[0-9]+ch", |lex| { let s = lex.slice(); s[..s.len() - 2].parse::<f32>().ok() })]
    Cells(f32),

    #[regex(r"[0-9]*\.?[0-9]+", |lex| lex.slice().parse::<f32>().ok())]
    Number(f32),

    #[regex(r"[a-zA-Z][a-zA-Z0-9-]*", |lex| lex.slice().to_ascii_lowercase())]
    Ident(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
}

/// Which container dimension a percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Container dimensions a calc expression resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalcContext {
    pub container_width: f32,
    pub container_height: f32,
    pub axis: Axis,
}

impl CalcContext {
    pub fn new(container_width: f32, container_height: f32, axis: Axis) -> Self {
        Self {
            container_width,
            container_height,
            axis,
        }
    }

    /// The same container, resolving percentages along `axis`.
    pub fn with_axis(self, axis: Axis) -> Self {
        Self { axis, ..self }
    }

    fn percent_basis(&self) -> f32 {
        match self.axis {
            Axis::Horizontal => self.container_width,
            Axis::Vertical => self.container_height,
        }
    }
}

/// Compiled expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcNode {
    /// Unitless number (cells).
    Number(f32),
    /// `ch` length.
    Cells(f32),
    /// Percentage of the container along the context axis.
    Percent(f32),
    Negate(Box<CalcNode>),
    Add(Box<CalcNode>, Box<CalcNode>),
    Sub(Box<CalcNode>, Box<CalcNode>),
    Mul(Box<CalcNode>, Box<CalcNode>),
    Div(Box<CalcNode>, Box<CalcNode>),
    Min(Vec<CalcNode>),
    Max(Vec<CalcNode>),
    Clamp(Box<CalcNode>, Box<CalcNode>, Box<CalcNode>),
}

impl CalcNode {
    /// Evaluate, mapping every non-finite result to zero.
    pub fn eval(&self, ctx: &CalcContext) -> f32 {
        let value = match self {
            CalcNode::Number(n) | CalcNode::Cells(n) => *n,
            CalcNode::Percent(p) => p / 100.0 * ctx.percent_basis(),
            CalcNode::Negate(inner) => -inner.eval(ctx),
            CalcNode::Add(a, b) => a.eval(ctx) + b.eval(ctx),
            CalcNode::Sub(a, b) => a.eval(ctx) - b.eval(ctx),
            CalcNode::Mul(a, b) => a.eval(ctx) * b.eval(ctx),
            CalcNode::Div(a, b) => {
                let divisor = b.eval(ctx);
                if divisor == 0.0 {
                    0.0
                } else {
                    a.eval(ctx) / divisor
                }
            }
            CalcNode::Min(args) => args
                .iter()
                .map(|n| n.eval(ctx))
                .fold(f32::INFINITY, f32::min),
            CalcNode::Max(args) => args
                .iter()
                .map(|n| n.eval(ctx))
                .fold(f32::NEG_INFINITY, f32::max),
            CalcNode::Clamp(lo, val, hi) => {
                let (lo, val, hi) = (lo.eval(ctx), val.eval(ctx), hi.eval(ctx));
                if val > hi {
                    hi
                } else if val < lo {
                    lo
                } else {
                    val
                }
            }
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    /// Whether the node is a plain number (no unit anywhere below it).
    fn is_unitless(&self) -> bool {
        match self {
            CalcNode::Number(_) => true,
            CalcNode::Cells(_) | CalcNode::Percent(_) => false,
            CalcNode::Negate(inner) => inner.is_unitless(),
            CalcNode::Add(a, b) | CalcNode::Sub(a, b) | CalcNode::Mul(a, b) | CalcNode::Div(a, b) => {
                a.is_unitless() && b.is_unitless()
            }
            CalcNode::Min(args) | CalcNode::Max(args) => args.iter().all(CalcNode::is_unitless),
            CalcNode::Clamp(a, b, c) => a.is_unitless() && b.is_unitless() && c.is_unitless(),
        }
    }

    /// Whether a percentage occurs anywhere in the tree.
    pub fn uses_percent(&self) -> bool {
        match self {
            CalcNode::Percent(_) => true,
            CalcNode::Number(_) | CalcNode::Cells(_) => false,
            CalcNode::Negate(inner) => inner.uses_percent(),
            CalcNode::Add(a, b) | CalcNode::Sub(a, b) | CalcNode::Mul(a, b) | CalcNode::Div(a, b) => {
                a.uses_percent() || b.uses_percent()
            }
            CalcNode::Min(args) | CalcNode::Max(args) => args.iter().any(CalcNode::uses_percent),
            CalcNode::Clamp(a, b, c) => a.uses_percent() || b.uses_percent() || c.uses_percent(),
        }
    }
}

/// A compiled, unresolved calc expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcValue {
    source: String,
    expr: CalcNode,
}

impl CalcValue {
    /// The original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &CalcNode {
        &self.expr
    }

    /// Evaluate against a concrete container.
    pub fn resolve(&self, ctx: &CalcContext) -> f32 {
        self.expr.eval(ctx)
    }
}

impl fmt::Display for CalcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Whether `text` starts with one of the math functions this module compiles.
pub fn is_math_function(text: &str) -> bool {
    let lower = text.trim_start().to_ascii_lowercase();
    ["calc(", "min(", "max(", "clamp("]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Compile an expression. Returns `None` for anything outside the grammar.
pub fn parse_and_compile(source: &str) -> Option<CalcValue> {
    let mut tokens = Vec::new();
    for token in CalcToken::lexer(source) {
        tokens.push(token.ok()?);
    }
    let mut parser = CalcParser { tokens, cursor: 0 };
    let expr = parser.parse_sum()?;
    if parser.cursor != parser.tokens.len() {
        return None;
    }
    Some(CalcValue {
        source: source.trim().to_string(),
        expr,
    })
}

struct CalcParser {
    tokens: Vec<CalcToken>,
    cursor: usize,
}

impl CalcParser {
    fn peek(&self) -> Option<&CalcToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<CalcToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &CalcToken) -> Option<()> {
        (self.advance()? == *expected).then_some(())
    }

    /// sum := product (('+' | '-') product)*
    fn parse_sum(&mut self) -> Option<CalcNode> {
        let mut lhs = self.parse_product()?;
        loop {
            match self.peek() {
                Some(CalcToken::Plus) => {
                    self.advance();
                    let rhs = self.parse_product()?;
                    lhs = CalcNode::Add(Box::new(lhs), Box::new(rhs));
                }
                Some(CalcToken::Minus) => {
                    self.advance();
                    let rhs = self.parse_product()?;
                    lhs = CalcNode::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => return Some(lhs),
            }
        }
    }

    /// product := unary (('*' | '/') unary)*
    fn parse_product(&mut self) -> Option<CalcNode> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(CalcToken::Star) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    // At least one factor must be a plain number.
                    if !lhs.is_unitless() && !rhs.is_unitless() {
                        return None;
                    }
                    lhs = CalcNode::Mul(Box::new(lhs), Box::new(rhs));
                }
                Some(CalcToken::Slash) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    if !rhs.is_unitless() {
                        return None;
                    }
                    lhs = CalcNode::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => return Some(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> Option<CalcNode> {
        match self.peek() {
            Some(CalcToken::Minus) => {
                self.advance();
                Some(CalcNode::Negate(Box::new(self.parse_unary()?)))
            }
            Some(CalcToken::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Option<CalcNode> {
        match self.advance()? {
            CalcToken::Number(n) => Some(CalcNode::Number(n)),
            CalcToken::Cells(n) => Some(CalcNode::Cells(n)),
            CalcToken::Percent(p) => Some(CalcNode::Percent(p)),
            CalcToken::ParenOpen => {
                let inner = self.parse_sum()?;
                self.expect(&CalcToken::ParenClose)?;
                Some(inner)
            }
            CalcToken::Ident(name) => {
                self.expect(&CalcToken::ParenOpen)?;
                let node = match name.as_str() {
                    "calc" => self.parse_sum()?,
                    "min" => CalcNode::Min(self.parse_args()?),
                    "max" => CalcNode::Max(self.parse_args()?),
                    "clamp" => {
                        let mut args = self.parse_args()?;
                        if args.len() != 3 {
                            return None;
                        }
                        let hi = args.pop()?;
                        let val = args.pop()?;
                        let lo = args.pop()?;
                        CalcNode::Clamp(Box::new(lo), Box::new(val), Box::new(hi))
                    }
                    _ => return None,
                };
                self.expect(&CalcToken::ParenClose)?;
                Some(node)
            }
            _ => None,
        }
    }

    /// Comma-separated, at least one argument.
    fn parse_args(&mut self) -> Option<Vec<CalcNode>> {
        let mut args = vec![self.parse_sum()?];
        while self.peek() == Some(&CalcToken::Comma) {
            self.advance();
            args.push(self.parse_sum()?);
        }
        Some(args)
    }
}
