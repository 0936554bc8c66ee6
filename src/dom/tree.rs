//! Tree operations: insert, remove, reparent, walk, element siblings.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The retained element tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Child order is document order, which is also the default stacking order.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a root-level node (no parent).
    ///
    /// If no root has been set yet, this node becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// A stale `parent` leaves the new node detached.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
            self.parent.insert(id, parent);
        }
        id
    }

    /// Append a text node under `parent`.
    pub fn insert_text(&mut self, parent: NodeId, content: impl Into<String>) -> NodeId {
        self.insert_child(parent, NodeData::text(content))
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        self.detach(id);
        if self.root == Some(id) {
            self.root = None;
        }

        let mut to_remove = VecDeque::from([id]);
        let mut removed = None;
        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed = data;
            }
        }
        removed
    }

    /// Move `node` to become the last child of `new_parent`.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        if !self.nodes.contains_key(node) || !self.nodes.contains_key(new_parent) {
            return;
        }
        self.detach(node);
        if let Some(siblings) = self.children.get_mut(new_parent) {
            siblings.push(node);
            self.parent.insert(node, new_parent);
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
        }
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Children that are elements, in order. Text nodes are skipped.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    /// The element siblings of `id` including itself, in order.
    ///
    /// A parentless node is its own only sibling.
    pub fn element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self.element_children(parent).collect(),
            None => vec![id],
        }
    }

    /// The closest preceding element sibling.
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&s| s == id)?;
        siblings[..index]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// The closest following element sibling.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&s| s == id)?;
        siblings[index + 1..]
            .iter()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// All preceding element siblings, nearest first.
    pub fn preceding_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.previous_element_sibling(id);
        while let Some(sibling) = current {
            result.push(sibling);
            current = self.previous_element_sibling(sibling);
        }
        result
    }

    /// All following element siblings, nearest first.
    pub fn following_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.next_element_sibling(id);
        while let Some(sibling) = current {
            result.push(sibling);
            current = self.next_element_sibling(sibling);
        }
        result
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// All nodes below `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut all = self.walk_depth_first(id);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(NodeData::is_element)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the DOM.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DOM is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the DOM contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            stack.extend(self.children(current).iter().rev());
        }
        result
    }

    /// Breadth-first traversal starting from `start`.
    pub fn walk_breadth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            queue.extend(self.children(current));
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///        root
    ///      /  |   \
    ///    a  "txt"  b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div").with_id("root"));
        let a = dom.insert_child(root, NodeData::element("section").with_id("a"));
        dom.insert_text(root, "txt");
        let b = dom.insert_child(root, NodeData::element("section").with_id("b"));
        let c = dom.insert_child(a, NodeData::element("button").with_id("c"));
        let d = dom.insert_child(a, NodeData::element("span").with_id("d"));
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root() {
        let mut dom = Dom::new();
        let first = dom.insert(NodeData::element("div"));
        let _second = dom.insert(NodeData::element("div"));
        assert_eq!(dom.root(), Some(first));
    }

    #[test]
    fn insert_child_parent_relationship() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
    }

    #[test]
    fn children_include_text_element_children_do_not() {
        let (dom, root, a, b, ..) = build_tree();
        assert_eq!(dom.children(root).len(), 3);
        assert_eq!(dom.element_children(root).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn element_sibling_navigation_skips_text() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.next_element_sibling(a), Some(b));
        assert_eq!(dom.previous_element_sibling(b), Some(a));
        assert_eq!(dom.previous_element_sibling(a), None);
        assert_eq!(dom.element_siblings(c), vec![c, d]);
        assert_eq!(dom.element_siblings(root), vec![root]);
        assert_eq!(dom.preceding_element_siblings(d), vec![c]);
        assert_eq!(dom.following_element_siblings(c), vec![d]);
    }

    #[test]
    fn ancestors_and_descendants() {
        let (dom, root, a, _b, c, d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert!(dom.ancestors(root).is_empty());
        assert_eq!(dom.descendants(a), vec![c, d]);
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        let removed = dom.remove(a).unwrap();
        assert_eq!(removed.tag(), Some("section"));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert_eq!(dom.element_children(root).collect::<Vec<_>>(), vec![b]);
        assert_eq!(dom.len(), 3);
    }

    #[test]
    fn remove_root_and_stale_ids() {
        let (mut dom, root, ..) = build_tree();
        dom.remove(root);
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
        assert!(dom.remove(root).is_none());
    }

    #[test]
    fn reparent() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.reparent(c, b);
        assert_eq!(dom.parent(c), Some(b));
        assert!(!dom.children(a).contains(&c));
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn walk_orders() {
        let (dom, root, a, b, c, d) = build_tree();
        let depth: Vec<_> = dom
            .walk_depth_first(root)
            .into_iter()
            .filter(|&n| dom.is_element(n))
            .collect();
        assert_eq!(depth, vec![root, a, c, d, b]);

        let breadth: Vec<_> = dom
            .walk_breadth_first(root)
            .into_iter()
            .filter(|&n| dom.is_element(n))
            .collect();
        assert_eq!(breadth, vec![root, a, b, c, d]);
    }
}
