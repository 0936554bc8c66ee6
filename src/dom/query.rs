//! DOM queries: by id, class, tag, predicate and CSS selector.

use super::node::{NodeData, NodeId};
use super::tree::Dom;
use crate::css::matching;
use crate::css::parser::{parse_selector_list, ParseError};

impl Dom {
    /// Find the first node in document order whose `id` matches.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|&n| self.get(n).is_some_and(|d| d.id.as_deref() == Some(id)))
    }

    /// Find all nodes that have the given CSS class.
    pub fn query_by_class(&self, class: &str) -> Vec<NodeId> {
        self.query_all(|data| data.has_class(class))
    }

    /// Find all elements with the given tag.
    pub fn query_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.query_all(|data| data.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    /// Find all nodes matching an arbitrary predicate, in document order.
    pub fn query_all(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(&predicate))
            .collect()
    }

    /// First element matching a CSS selector list, in document order.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<NodeId>, ParseError> {
        Ok(self.query_selector_all(selectors)?.into_iter().next())
    }

    /// All elements matching a CSS selector list, in document order.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<NodeId>, ParseError> {
        let list = parse_selector_list(selectors)?;
        Ok(self
            .document_order()
            .into_iter()
            .filter(|&n| matching::matches_any(self, n, &list))
            .collect())
    }

    fn document_order(&self) -> Vec<NodeId> {
        self.root()
            .map(|root| self.walk_depth_first(root))
            .unwrap_or_default()
    }
}
