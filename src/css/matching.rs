//! Selector matching against the DOM.
//!
//! Selectors are matched right to left: the subject compound is tested on the
//! node, then each combinator walks to candidate elements for the compound to
//! its left. Descendant and later-sibling combinators try every candidate, so
//! a failed match further left backtracks to the next candidate.

use crate::css::model::{
    AttributeOperator, AttributeSelector, Combinator, CompoundSelector, PseudoClass,
    PseudoElement, RelativeSelector, Selector, SelectorComponent, SelectorPart,
};
use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;

/// Tags that `:enabled`, `:optional` and `:valid` apply to.
const FORM_TAGS: &[&str] = &["button", "input", "select", "textarea", "option", "fieldset"];

/// Whether `selector` matches `node`, ignoring its pseudo-element.
///
/// Callers decide whether a pseudo-element selector applies; see
/// [`matches_pseudo`].
pub fn matches(dom: &Dom, node: NodeId, selector: &Selector) -> bool {
    match_at(dom, node, &selector.parts, selector.parts.len(), None)
}

/// Whether `selector` targets `pseudo` on `node`.
pub fn matches_pseudo(dom: &Dom, node: NodeId, selector: &Selector, pseudo: &PseudoElement) -> bool {
    selector.pseudo_element() == Some(pseudo) && matches(dom, node, selector)
}

/// Whether any selector in `list` matches `node`.
pub fn matches_any(dom: &Dom, node: NodeId, list: &[Selector]) -> bool {
    list.iter().any(|selector| matches(dom, node, selector))
}

/// Match `parts[..end]` with the last compound on `node`.
///
/// `anchor` constrains the leftmost compound when matching a relative
/// selector inside `:has()`.
fn match_at(
    dom: &Dom,
    node: NodeId,
    parts: &[SelectorPart],
    end: usize,
    anchor: Option<(NodeId, Combinator)>,
) -> bool {
    let Some(SelectorPart::Compound(compound)) = end.checked_sub(1).and_then(|i| parts.get(i))
    else {
        return false;
    };
    if !matches_compound(dom, node, compound) {
        return false;
    }

    let index = end - 1;
    if index == 0 {
        return anchor.map_or(true, |(anchor, combinator)| {
            related(dom, anchor, node, combinator)
        });
    }

    let Some(SelectorPart::Combinator(combinator)) = parts.get(index - 1) else {
        return false;
    };
    let next_end = index - 1;

    match combinator {
        Combinator::Child => dom
            .parent(node)
            .is_some_and(|parent| match_at(dom, parent, parts, next_end, anchor)),
        Combinator::Descendant => dom
            .ancestors(node)
            .into_iter()
            .any(|ancestor| match_at(dom, ancestor, parts, next_end, anchor)),
        Combinator::NextSibling => dom
            .previous_element_sibling(node)
            .is_some_and(|sibling| match_at(dom, sibling, parts, next_end, anchor)),
        Combinator::LaterSibling => dom
            .preceding_element_siblings(node)
            .into_iter()
            .any(|sibling| match_at(dom, sibling, parts, next_end, anchor)),
    }
}

/// Whether `node` stands in `combinator` relation to `anchor`.
fn related(dom: &Dom, anchor: NodeId, node: NodeId, combinator: Combinator) -> bool {
    match combinator {
        Combinator::Descendant => dom.ancestors(node).contains(&anchor),
        Combinator::Child => dom.parent(node) == Some(anchor),
        Combinator::NextSibling => dom.previous_element_sibling(node) == Some(anchor),
        Combinator::LaterSibling => dom.preceding_element_siblings(node).contains(&anchor),
    }
}

fn matches_compound(dom: &Dom, node: NodeId, compound: &CompoundSelector) -> bool {
    let Some(data) = dom.get(node) else {
        return false;
    };
    let Some(tag) = data.tag() else {
        return false;
    };

    compound.components.iter().all(|component| match component {
        SelectorComponent::Type(name) => tag.eq_ignore_ascii_case(name),
        SelectorComponent::Universal => true,
        SelectorComponent::Class(name) => data.has_class(name),
        SelectorComponent::Id(name) => data.id.as_deref() == Some(name.as_str()),
        SelectorComponent::Attribute(attr) => matches_attribute(data, attr),
        SelectorComponent::PseudoClass(pc) => matches_pseudo_class(dom, node, data, pc),
        SelectorComponent::PseudoElement(PseudoElement::Picker(target)) => {
            tag.eq_ignore_ascii_case(target)
        }
        SelectorComponent::PseudoElement(_) => true,
    })
}

fn matches_attribute(data: &NodeData, selector: &AttributeSelector) -> bool {
    let Some(actual) = data.attr(&selector.name) else {
        return false;
    };
    let Some((operator, expected)) = &selector.value else {
        return true;
    };

    let (actual, expected) = if selector.case_insensitive {
        (actual.to_lowercase(), expected.to_lowercase())
    } else {
        (actual.into_owned(), expected.clone())
    };

    match operator {
        AttributeOperator::Equals => actual == expected,
        AttributeOperator::Includes => {
            !expected.is_empty() && actual.split_whitespace().any(|word| word == expected)
        }
        AttributeOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttributeOperator::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}

/// 1-based position of `node` among `siblings`.
fn position_in(siblings: &[NodeId], node: NodeId) -> Option<i32> {
    siblings.iter().position(|&s| s == node).map(|i| i as i32 + 1)
}

fn same_type_siblings(dom: &Dom, node: NodeId, tag: &str) -> Vec<NodeId> {
    dom.element_siblings(node)
        .into_iter()
        .filter(|&s| dom.get(s).and_then(NodeData::tag) == Some(tag))
        .collect()
}

fn is_form_control(data: &NodeData) -> bool {
    data.tag().is_some_and(|tag| FORM_TAGS.contains(&tag))
}

fn matches_pseudo_class(dom: &Dom, node: NodeId, data: &NodeData, pc: &PseudoClass) -> bool {
    let tag = data.tag().unwrap_or_default();
    match pc {
        PseudoClass::FirstChild => dom.previous_element_sibling(node).is_none(),
        PseudoClass::LastChild => dom.next_element_sibling(node).is_none(),
        PseudoClass::OnlyChild => {
            dom.previous_element_sibling(node).is_none() && dom.next_element_sibling(node).is_none()
        }
        PseudoClass::NthChild(formula) => {
            position_in(&dom.element_siblings(node), node).is_some_and(|p| formula.matches(p))
        }
        PseudoClass::NthLastChild(formula) => {
            let siblings = dom.element_siblings(node);
            position_in(&siblings, node)
                .is_some_and(|p| formula.matches(siblings.len() as i32 - p + 1))
        }
        PseudoClass::FirstOfType => same_type_siblings(dom, node, tag).first() == Some(&node),
        PseudoClass::LastOfType => same_type_siblings(dom, node, tag).last() == Some(&node),
        PseudoClass::OnlyOfType => same_type_siblings(dom, node, tag).len() == 1,
        PseudoClass::NthOfType(formula) => {
            position_in(&same_type_siblings(dom, node, tag), node).is_some_and(|p| formula.matches(p))
        }
        PseudoClass::NthLastOfType(formula) => {
            let siblings = same_type_siblings(dom, node, tag);
            position_in(&siblings, node)
                .is_some_and(|p| formula.matches(siblings.len() as i32 - p + 1))
        }
        PseudoClass::Root => dom.parent(node).is_none(),
        PseudoClass::Empty => dom.children(node).iter().all(|&child| {
            dom.get(child)
                .is_some_and(|c| c.text_content().is_some_and(str::is_empty))
        }),

        PseudoClass::Focus | PseudoClass::FocusVisible => data.state.focused,
        PseudoClass::FocusWithin => {
            data.state.focused
                || dom
                    .descendants(node)
                    .into_iter()
                    .any(|d| dom.get(d).is_some_and(|n| n.state.focused))
        }
        PseudoClass::Hover => data.state.hovered,
        PseudoClass::Active => data.state.active,
        PseudoClass::Disabled => data.is_disabled(),
        PseudoClass::Enabled => is_form_control(data) && !data.is_disabled(),
        PseudoClass::Checked => data.is_checked(),
        PseudoClass::Required => data.is_required(),
        PseudoClass::Optional => is_form_control(data) && !data.is_required(),
        PseudoClass::Valid => is_form_control(data) && !data.state.invalid,
        PseudoClass::Invalid => data.state.invalid,
        PseudoClass::PopoverOpen => data.state.popover_open,
        PseudoClass::Open => data.is_open(),
        PseudoClass::Modal => data.state.modal,
        PseudoClass::PlaceholderShown => {
            data.has_attr("placeholder") && data.attr("value").map_or(true, |v| v.is_empty())
        }

        PseudoClass::Not(list) => !matches_any(dom, node, list),
        PseudoClass::Is(list) | PseudoClass::Where(list) => matches_any(dom, node, list),
        PseudoClass::Has(relatives) => relatives.iter().any(|rel| has_match(dom, node, rel)),

        PseudoClass::Unknown(_) => false,
    }
}

/// Whether some element related to `anchor` matches the relative selector.
fn has_match(dom: &Dom, anchor: NodeId, relative: &RelativeSelector) -> bool {
    let candidates = match relative.combinator {
        Combinator::Descendant | Combinator::Child => dom.descendants(anchor),
        Combinator::NextSibling | Combinator::LaterSibling => dom
            .following_element_siblings(anchor)
            .into_iter()
            .flat_map(|sibling| dom.walk_depth_first(sibling))
            .collect(),
    };
    let parts = &relative.selector.parts;
    candidates.into_iter().any(|candidate| {
        match_at(
            dom,
            candidate,
            parts,
            parts.len(),
            Some((anchor, relative.combinator)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_selector_list;
    use crate::dom::node::{ElementState, NodeData};

    fn sel(text: &str) -> Selector {
        parse_selector_list(text)
            .unwrap_or_else(|e| panic!("{text}: {e}"))
            .remove(0)
    }

    fn is_match(dom: &Dom, node: NodeId, text: &str) -> bool {
        matches(dom, node, &sel(text))
    }

    /// ```text
    /// main#app
    ///   nav.top
    ///     ul
    ///       li × 5 (li#i3 is .active; "text" node between li#i1 and li#i2)
    ///   section
    ///     h1
    ///     p[lang=en-US]
    ///     input[type=text]
    /// ```
    struct Fixture {
        dom: Dom,
        main: NodeId,
        nav: NodeId,
        ul: NodeId,
        items: Vec<NodeId>,
        section: NodeId,
        h1: NodeId,
        p: NodeId,
        input: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let main = dom.insert(NodeData::element("main").with_id("app"));
        let nav = dom.insert_child(main, NodeData::element("nav").with_class("top"));
        let ul = dom.insert_child(nav, NodeData::element("ul"));
        let mut items = Vec::new();
        for i in 1..=5 {
            let mut li = NodeData::element("li").with_id(format!("i{i}"));
            if i == 3 {
                li = li.with_class("active");
            }
            items.push(dom.insert_child(ul, li));
            if i == 1 {
                dom.insert_text(ul, "text");
            }
        }
        let section = dom.insert_child(main, NodeData::element("section"));
        let h1 = dom.insert_child(section, NodeData::element("h1"));
        let p = dom.insert_child(
            section,
            NodeData::element("p")
                .with_attr("lang", "en-US")
                .with_attr("title", "hello big world"),
        );
        let input = dom.insert_child(
            section,
            NodeData::element("input")
                .with_attr("type", "text")
                .with_attr("placeholder", "name"),
        );
        Fixture {
            dom,
            main,
            nav,
            ul,
            items,
            section,
            h1,
            p,
            input,
        }
    }

    // ── Simple selectors ─────────────────────────────────────────────

    #[test]
    fn type_class_id_universal() {
        let f = fixture();
        assert!(is_match(&f.dom, f.nav, "nav"));
        assert!(is_match(&f.dom, f.nav, "NAV"));
        assert!(is_match(&f.dom, f.nav, ".top"));
        assert!(is_match(&f.dom, f.main, "#app"));
        assert!(is_match(&f.dom, f.main, "*"));
        assert!(!is_match(&f.dom, f.nav, "nav.bottom"));
    }

    #[test]
    fn text_nodes_never_match() {
        let f = fixture();
        let text = f.dom.children(f.ul)[1];
        assert!(!is_match(&f.dom, text, "*"));
    }

    // ── Combinators ──────────────────────────────────────────────────

    #[test]
    fn child_and_descendant() {
        let f = fixture();
        assert!(is_match(&f.dom, f.items[0], "ul > li"));
        assert!(is_match(&f.dom, f.items[0], "main li"));
        assert!(!is_match(&f.dom, f.items[0], "main > li"));
        assert!(!is_match(&f.dom, f.main, "main > main"));
    }

    #[test]
    fn descendant_backtracks() {
        let f = fixture();
        // The nearest `nav` ancestor chain must be retried from `main`.
        assert!(is_match(&f.dom, f.items[0], "main > nav li"));
        assert!(is_match(&f.dom, f.items[0], "#app ul li"));
        assert!(!is_match(&f.dom, f.items[0], "section li"));
    }

    #[test]
    fn sibling_combinators_skip_text() {
        let f = fixture();
        // A text node sits between li#i1 and li#i2.
        assert!(is_match(&f.dom, f.items[1], "#i1 + li"));
        assert!(!is_match(&f.dom, f.items[2], "#i1 + li"));
        assert!(is_match(&f.dom, f.items[4], "#i1 ~ li"));
        assert!(!is_match(&f.dom, f.items[0], "li ~ #i1"));
        assert!(is_match(&f.dom, f.p, "h1 + p"));
        assert!(is_match(&f.dom, f.input, "h1 ~ input"));
    }

    // ── Attributes ───────────────────────────────────────────────────

    #[test]
    fn attribute_operators() {
        let f = fixture();
        assert!(is_match(&f.dom, f.p, "[lang]"));
        assert!(is_match(&f.dom, f.p, "[lang=en-US]"));
        assert!(is_match(&f.dom, f.p, "[lang|=en]"));
        assert!(is_match(&f.dom, f.p, "[lang^=en]"));
        assert!(is_match(&f.dom, f.p, "[lang$=US]"));
        assert!(is_match(&f.dom, f.p, "[lang*=n-U]"));
        assert!(is_match(&f.dom, f.p, "[title~=big]"));
        assert!(!is_match(&f.dom, f.p, "[title~=bi]"));
        assert!(!is_match(&f.dom, f.p, "[lang=en-us]"));
        assert!(is_match(&f.dom, f.p, "[lang=en-us i]"));
        assert!(!is_match(&f.dom, f.p, "[lang^=\"\"]"));
    }

    #[test]
    fn id_and_class_as_attributes() {
        let f = fixture();
        assert!(is_match(&f.dom, f.main, "[id=app]"));
        assert!(is_match(&f.dom, f.items[2], "[class~=active]"));
        assert!(!is_match(&f.dom, f.items[1], "[class]"));
    }

    // ── Structural pseudo-classes ────────────────────────────────────

    #[test]
    fn nth_child_odd_positions() {
        let f = fixture();
        let hits: Vec<usize> = f
            .items
            .iter()
            .enumerate()
            .filter(|(_, &li)| is_match(&f.dom, li, "li:nth-child(2n+1)"))
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(hits, vec![1, 3, 5]);
    }

    #[test]
    fn structural_positions() {
        let f = fixture();
        assert!(is_match(&f.dom, f.items[0], ":first-child"));
        assert!(is_match(&f.dom, f.items[4], ":last-child"));
        assert!(is_match(&f.dom, f.items[3], ":nth-last-child(2)"));
        assert!(is_match(&f.dom, f.ul, ":only-child"));
        assert!(is_match(&f.dom, f.h1, ":first-of-type"));
        assert!(is_match(&f.dom, f.p, ":only-of-type"));
        assert!(is_match(&f.dom, f.items[1], "li:nth-of-type(even)"));
        assert!(is_match(&f.dom, f.items[4], "li:nth-last-of-type(1)"));
        assert!(is_match(&f.dom, f.main, ":root"));
        assert!(!is_match(&f.dom, f.nav, ":root"));
        assert!(is_match(&f.dom, f.h1, ":empty"));
        assert!(!is_match(&f.dom, f.ul, ":empty"));
    }

    // ── State pseudo-classes ─────────────────────────────────────────

    #[test]
    fn state_flags() {
        let mut f = fixture();
        assert!(is_match(&f.dom, f.input, ":enabled"));
        assert!(!is_match(&f.dom, f.section, ":enabled"));
        assert!(is_match(&f.dom, f.input, ":optional"));
        assert!(is_match(&f.dom, f.input, ":placeholder-shown"));

        if let Some(input) = f.dom.get_mut(f.input) {
            input.state = ElementState {
                focused: true,
                disabled: true,
                invalid: true,
                ..Default::default()
            };
            input.set_attr("value", "bob");
        }
        assert!(is_match(&f.dom, f.input, ":focus"));
        assert!(is_match(&f.dom, f.input, ":disabled"));
        assert!(is_match(&f.dom, f.input, ":invalid"));
        assert!(!is_match(&f.dom, f.input, ":valid"));
        assert!(!is_match(&f.dom, f.input, ":placeholder-shown"));
        assert!(is_match(&f.dom, f.section, ":focus-within"));
        assert!(is_match(&f.dom, f.main, ":focus-within"));
        assert!(!is_match(&f.dom, f.nav, ":focus-within"));
    }

    #[test]
    fn unknown_pseudo_class_never_matches() {
        let f = fixture();
        assert!(!is_match(&f.dom, f.nav, "nav:frobnicate"));
    }

    // ── Relational pseudo-classes ────────────────────────────────────

    #[test]
    fn not_is_where() {
        let f = fixture();
        assert!(is_match(&f.dom, f.items[0], "li:not(.active)"));
        assert!(!is_match(&f.dom, f.items[2], "li:not(.active)"));
        assert!(is_match(&f.dom, f.h1, ":is(h1, h2)"));
        assert!(is_match(&f.dom, f.h1, ":where(section > h1)"));
    }

    #[test]
    fn has_relative_selectors() {
        let f = fixture();
        assert!(is_match(&f.dom, f.nav, "nav:has(li.active)"));
        assert!(!is_match(&f.dom, f.nav, "nav:has(> li)"));
        assert!(is_match(&f.dom, f.nav, "nav:has(> ul > li)"));
        assert!(is_match(&f.dom, f.h1, "h1:has(+ p)"));
        assert!(is_match(&f.dom, f.h1, "h1:has(~ input)"));
        assert!(!is_match(&f.dom, f.p, "p:has(+ h1)"));
        assert!(is_match(&f.dom, f.main, ":has(section input)"));
    }

    // ── Pseudo-elements ──────────────────────────────────────────────

    #[test]
    fn pseudo_element_selectors() {
        let f = fixture();
        let before = sel("li::before");
        assert!(matches_pseudo(&f.dom, f.items[0], &before, &PseudoElement::Before));
        assert!(!matches_pseudo(&f.dom, f.items[0], &before, &PseudoElement::After));

        let mut dom = Dom::new();
        let select = dom.insert(NodeData::element("select"));
        let picker = sel("::picker(select)");
        let target = PseudoElement::Picker("select".into());
        assert!(matches_pseudo(&dom, select, &picker, &target));
        assert!(!matches_pseudo(&f.dom, f.input, &sel("::picker(select)"), &target));
    }
}
