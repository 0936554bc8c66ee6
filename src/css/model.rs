//! CSS AST: Selector, RuleSet, Declaration.

use std::fmt;

/// A single CSS selector component.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Type selector: matches the element tag (e.g. `button`).
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.classname`.
    Class(String),
    /// ID selector: `#id`.
    Id(String),
    /// Attribute selector: `[name]`, `[name=value]`, `[name^=value i]`.
    Attribute(AttributeSelector),
    /// Pseudo-class: `:hover`, `:nth-child(2n+1)`, `:has(> img)`.
    PseudoClass(PseudoClass),
    /// Pseudo-element: `::before`, `::picker(select)`.
    PseudoElement(PseudoElement),
}

/// Operator of an attribute selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[a=v]`: exact match.
    Equals,
    /// `[a~=v]`: whitespace-separated list contains `v`.
    Includes,
    /// `[a|=v]`: equals `v` or starts with `v-`.
    DashMatch,
    /// `[a^=v]`: starts with `v`.
    Prefix,
    /// `[a$=v]`: ends with `v`.
    Suffix,
    /// `[a*=v]`: contains `v`.
    Substring,
}

/// An attribute selector. `value` is `None` for bare presence tests.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub value: Option<(AttributeOperator, String)>,
    /// Set by the trailing ` i` flag.
    pub case_insensitive: bool,
}

/// An `an+b` formula from `:nth-child()` and friends.
///
/// Positions are 1-based. `odd` is `2n+1`, `even` is `2n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthFormula {
    pub a: i32,
    pub b: i32,
}

impl NthFormula {
    /// Create a formula `an+b`.
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Whether the 1-based `position` satisfies `position = a*n + b` for some `n >= 0`.
    pub fn matches(&self, position: i32) -> bool {
        if self.a == 0 {
            return position == self.b;
        }
        let diff = position - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

/// A pseudo-class.
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    // Structural
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild(NthFormula),
    NthLastChild(NthFormula),
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthOfType(NthFormula),
    NthLastOfType(NthFormula),
    Root,
    Empty,

    // Element state
    Focus,
    FocusVisible,
    FocusWithin,
    Hover,
    Active,
    Disabled,
    Enabled,
    Checked,
    Required,
    Optional,
    Valid,
    Invalid,
    PopoverOpen,
    Open,
    Modal,
    PlaceholderShown,

    // Relational
    Not(Vec<Selector>),
    Is(Vec<Selector>),
    Where(Vec<Selector>),
    Has(Vec<RelativeSelector>),

    /// A pseudo-class this engine does not know. Parses, never matches.
    Unknown(String),
}

impl PseudoClass {
    /// Look up a non-functional pseudo-class by name (without the colon).
    pub fn from_name(name: &str) -> PseudoClass {
        match name.to_ascii_lowercase().as_str() {
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "focus" => PseudoClass::Focus,
            "focus-visible" => PseudoClass::FocusVisible,
            "focus-within" => PseudoClass::FocusWithin,
            "hover" => PseudoClass::Hover,
            "active" => PseudoClass::Active,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "checked" => PseudoClass::Checked,
            "required" => PseudoClass::Required,
            "optional" => PseudoClass::Optional,
            "valid" => PseudoClass::Valid,
            "invalid" => PseudoClass::Invalid,
            "popover-open" => PseudoClass::PopoverOpen,
            "open" => PseudoClass::Open,
            "modal" => PseudoClass::Modal,
            "placeholder-shown" => PseudoClass::PlaceholderShown,
            other => PseudoClass::Unknown(other.to_string()),
        }
    }
}

/// A pseudo-element. Only valid as the rightmost component of a selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    Before,
    After,
    Marker,
    /// `::picker(tag)`: the dropdown surface of a picker-style control.
    Picker(String),
}

impl PseudoElement {
    /// Look up a non-functional pseudo-element by name (without the colons).
    pub fn from_name(name: &str) -> Option<PseudoElement> {
        match name.to_ascii_lowercase().as_str() {
            "before" => Some(PseudoElement::Before),
            "after" => Some(PseudoElement::After),
            "marker" => Some(PseudoElement::Marker),
            _ => None,
        }
    }
}

impl fmt::Display for PseudoElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoElement::Before => write!(f, "::before"),
            PseudoElement::After => write!(f, "::after"),
            PseudoElement::Marker => write!(f, "::marker"),
            PseudoElement::Picker(tag) => write!(f, "::picker({tag})"),
        }
    }
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
    /// Next-sibling combinator: `A + B`.
    NextSibling,
    /// Subsequent-sibling combinator: `A ~ B`.
    LaterSibling,
}

/// A single compound selector (sequence of components without combinators).
///
/// For example, `button.primary:hover` is one `CompoundSelector` with three
/// components: `Type("button")`, `Class("primary")`, `PseudoClass(Hover)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    /// Create an empty compound selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component to this compound selector.
    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }

    /// The pseudo-element of this compound, if any.
    pub fn pseudo_element(&self) -> Option<&PseudoElement> {
        self.components.iter().find_map(|c| match c {
            SelectorComponent::PseudoElement(pe) => Some(pe),
            _ => None,
        })
    }
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    /// A compound selector (one or more simple selectors).
    Compound(CompoundSelector),
    /// A combinator between compound selectors.
    Combinator(Combinator),
}

/// A full CSS selector: chain of compound selectors joined by combinators.
///
/// For example, `nav > li.active a` is a `Selector` with parts:
/// `[Compound(nav), Combinator(Child), Compound(li.active), Combinator(Descendant), Compound(a)]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    /// Alternating compound selectors and combinators.
    /// Always starts and ends with a `SelectorPart::Compound`.
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rightmost compound selector (the subject).
    pub fn subject(&self) -> Option<&CompoundSelector> {
        match self.parts.last() {
            Some(SelectorPart::Compound(c)) => Some(c),
            _ => None,
        }
    }

    /// The pseudo-element this selector targets, if any.
    pub fn pseudo_element(&self) -> Option<&PseudoElement> {
        self.subject().and_then(CompoundSelector::pseudo_element)
    }
}

/// A selector inside `:has()`, anchored to the element being tested.
///
/// `:has(> img)` has combinator `Child`; `:has(img)` has `Descendant`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeSelector {
    pub combinator: Combinator,
    pub selector: Selector,
}

/// A single CSS property declaration, e.g. `color: red` or `margin: 1 2`.
///
/// The value is kept as trimmed source text. Custom property substitution
/// happens on this text before the typed property parsers see it.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The property name, e.g. `"color"`, `"--accent"`.
    pub property: String,
    /// The raw value text.
    pub value: String,
    /// Whether `!important` was specified.
    pub important: bool,
}

impl Declaration {
    /// Create a new declaration.
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important,
        }
    }

    /// Whether this declares a custom property (`--name`).
    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }
}

/// A CSS rule: one or more selectors paired with declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// The selectors for this rule (comma-separated in CSS).
    pub selectors: Vec<Selector>,
    /// The property declarations inside the `{ ... }` block.
    pub declarations: Vec<Declaration>,
}

/// A parsed CSS stylesheet: a list of rule sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
    /// Rules dropped during error recovery.
    pub dropped_rules: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_formula_odd_even() {
        let odd = NthFormula::new(2, 1);
        let even = NthFormula::new(2, 0);
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(3));
        assert!(even.matches(2));
        assert!(!even.matches(1));
    }

    #[test]
    fn nth_formula_constant() {
        let third = NthFormula::new(0, 3);
        assert!(third.matches(3));
        assert!(!third.matches(6));
    }

    #[test]
    fn nth_formula_negative_a_limits_to_first_b() {
        // -n+3 matches 1, 2, 3.
        let first_three = NthFormula::new(-1, 3);
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
    }

    #[test]
    fn nth_formula_offset_beyond_start() {
        // 3n+4 matches 4, 7, 10 but not 1.
        let f = NthFormula::new(3, 4);
        assert!(!f.matches(1));
        assert!(f.matches(4));
        assert!(f.matches(7));
    }

    #[test]
    fn pseudo_class_lookup() {
        assert_eq!(PseudoClass::from_name("hover"), PseudoClass::Hover);
        assert_eq!(PseudoClass::from_name("Popover-Open"), PseudoClass::PopoverOpen);
        assert_eq!(
            PseudoClass::from_name("visited"),
            PseudoClass::Unknown("visited".into())
        );
    }

    #[test]
    fn selector_pseudo_element_is_on_subject() {
        let mut subject = CompoundSelector::new();
        subject.push(SelectorComponent::Type("li".into()));
        subject.push(SelectorComponent::PseudoElement(PseudoElement::Marker));
        let sel = Selector {
            parts: vec![SelectorPart::Compound(subject)],
        };
        assert_eq!(sel.pseudo_element(), Some(&PseudoElement::Marker));
    }

    #[test]
    fn declaration_custom_property() {
        assert!(Declaration::new("--accent", "red", false).is_custom_property());
        assert!(!Declaration::new("color", "red", false).is_custom_property());
    }

    #[test]
    fn pseudo_element_display() {
        assert_eq!(
            PseudoElement::Picker("select".into()).to_string(),
            "::picker(select)"
        );
    }
}
