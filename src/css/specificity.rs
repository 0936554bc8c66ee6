//! Selector specificity and the cascade sort key.
//!
//! Specificity is the classic 3-tuple:
//!
//! ```text
//! (ids, classes + attributes + pseudo-classes, types + pseudo-elements)
//! ```
//!
//! packed into one `u32` with 10 bits per field, so that plain integer
//! comparison orders selectors correctly. Each field saturates at 1023.
//!
//! The full cascade key wraps it:
//!
//! ```text
//! (important, origin, specificity, source_order)
//! ```
//!
//! Fields are ordered so that the derived `Ord` (lexicographic) gives the
//! winning declaration as the maximum.

use crate::css::model::{PseudoClass, Selector, SelectorComponent, SelectorPart};

const FIELD_BITS: u32 = 10;
const FIELD_MAX: u32 = (1 << FIELD_BITS) - 1;

/// Selector specificity as a 3-tuple, ordered from highest to lowest weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// Number of ID selectors (`#id`).
    pub ids: u32,
    /// Number of class, attribute and pseudo-class selectors.
    pub classes: u32,
    /// Number of type selectors and pseudo-elements.
    pub types: u32,
}

impl Specificity {
    /// Zero specificity (`*`, `:where(...)`).
    pub const ZERO: Specificity = Specificity { ids: 0, classes: 0, types: 0 };

    /// Create a specificity from explicit counts.
    pub const fn new(ids: u32, classes: u32, types: u32) -> Self {
        Self { ids, classes, types }
    }

    /// Pack into one ordered integer: `ids << 20 | classes << 10 | types`.
    pub fn packed(&self) -> u32 {
        (self.ids.min(FIELD_MAX) << (2 * FIELD_BITS))
            | (self.classes.min(FIELD_MAX) << FIELD_BITS)
            | self.types.min(FIELD_MAX)
    }

    /// Compute specificity from a parsed selector.
    pub fn from_selector(selector: &Selector) -> Self {
        let mut spec = Specificity::ZERO;

        for part in &selector.parts {
            if let SelectorPart::Compound(compound) = part {
                for component in &compound.components {
                    spec = spec + component_specificity(component);
                }
            }
        }

        spec
    }

    /// The most specific selector of a list, or zero for an empty list.
    pub fn max_of(selectors: &[Selector]) -> Self {
        selectors
            .iter()
            .map(Specificity::from_selector)
            .max_by_key(Specificity::packed)
            .unwrap_or(Specificity::ZERO)
    }
}

impl std::ops::Add for Specificity {
    type Output = Specificity;

    fn add(self, rhs: Specificity) -> Specificity {
        Specificity {
            ids: self.ids + rhs.ids,
            classes: self.classes + rhs.classes,
            types: self.types + rhs.types,
        }
    }
}

fn component_specificity(component: &SelectorComponent) -> Specificity {
    match component {
        SelectorComponent::Id(_) => Specificity::new(1, 0, 0),
        SelectorComponent::Class(_) | SelectorComponent::Attribute(_) => Specificity::new(0, 1, 0),
        SelectorComponent::Type(_) | SelectorComponent::PseudoElement(_) => {
            Specificity::new(0, 0, 1)
        }
        SelectorComponent::Universal => Specificity::ZERO,
        SelectorComponent::PseudoClass(pc) => match pc {
            PseudoClass::Where(_) => Specificity::ZERO,
            PseudoClass::Is(list) | PseudoClass::Not(list) => Specificity::max_of(list),
            PseudoClass::Has(list) => list
                .iter()
                .map(|rel| Specificity::from_selector(&rel.selector))
                .max_by_key(Specificity::packed)
                .unwrap_or(Specificity::ZERO),
            _ => Specificity::new(0, 1, 0),
        },
    }
}

/// Where a stylesheet comes from. Author sheets beat user-agent sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Origin {
    /// Built-in sheets installed by element renderers.
    UserAgent,
    /// Sheets registered by the host application.
    #[default]
    Author,
}

/// Full cascade sort key. The maximum key wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CascadeKey {
    /// `!important` outranks everything below it.
    pub important: bool,
    pub origin: Origin,
    /// Packed [`Specificity`].
    pub specificity: u32,
    /// Registry-wide rule sequence number (later = higher).
    pub source_order: u64,
}

impl CascadeKey {
    /// Build the key for one declaration of one matching selector.
    pub fn new(
        important: bool,
        origin: Origin,
        specificity: Specificity,
        source_order: u64,
    ) -> Self {
        Self {
            important,
            origin,
            specificity: specificity.packed(),
            source_order,
        }
    }
}
