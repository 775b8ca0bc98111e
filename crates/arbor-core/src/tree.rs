//! Arena-backed rooted tree.
//!
//! The [`Tree`] stores every node in a single map keyed by [`NodeId`]. Each
//! node owns the ordered list of its children's ids; the parent id kept on a
//! node is a back-reference used for lookup only. Structural changes go
//! through [`Tree::insert`] and the operations in [`crate::mutation`], which
//! keep the following invariants:
//!
//! - there is exactly one root and it has no parent,
//! - ids are unique across the whole tree,
//! - every non-root node appears in exactly one parent's child list,
//! - child order only changes when a child is appended or removed.

use std::collections::HashMap;

use log::trace;

use crate::{
    error::{TreeError, TreeResult},
    identifier::NodeId,
};

/// A node stored in the tree arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId, label: String, parent: Option<NodeId>) -> Self {
        Self {
            id,
            label,
            parent,
            children: Vec::new(),
        }
    }

    /// Returns the node's id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the parent's id, `None` for the root.
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Returns the children's ids in left-to-right order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns true if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn detach_child(&mut self, child: &str) {
        self.children.retain(|id| id != child);
    }
}

/// A rooted tree of labeled nodes with ordered children.
///
/// # Examples
///
/// ```
/// use arbor_core::{identifier::NodeId, tree::Tree};
///
/// let mut tree = Tree::new("n0", "Root");
/// tree.insert("n0", NodeId::new("n1"), "Node 1").unwrap();
/// tree.insert("n1", NodeId::new("n2"), "Node 2").unwrap();
///
/// assert_eq!(tree.node_count(), 3);
/// assert_eq!(tree.depth_of("n2"), Some(3));
/// assert_eq!(tree.parent_of("n2").map(NodeId::as_str), Some("n1"));
/// assert_eq!(tree.max_depth(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub(crate) nodes: HashMap<NodeId, Node>,
    root: NodeId,
}

impl Tree {
    /// Creates a tree consisting of a single root node.
    pub fn new(root: impl Into<NodeId>, label: impl Into<String>) -> Self {
        let root = root.into();
        let mut nodes = HashMap::new();
        nodes.insert(root.clone(), Node::new(root.clone(), label.into(), None));
        Self { nodes, root }
    }

    /// Returns the root's id.
    pub fn root(&self) -> &NodeId {
        &self.root
    }

    /// Returns the root node.
    pub fn root_node(&self) -> &Node {
        // The root entry is created in `new` and `remove_subtree` refuses to touch it.
        &self.nodes[self.root.as_str()]
    }

    /// Returns the node with the given id, if present.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Checks if a node with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the children of the given node, or an empty slice if it is absent.
    pub fn children(&self, id: &str) -> &[NodeId] {
        self.nodes.get(id).map(Node::children).unwrap_or_default()
    }

    /// Returns the label of the given node.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).map(Node::label)
    }

    /// Finds a node by walking the tree depth-first from the root.
    ///
    /// Ids are unique, so the first match is the only match. Unlike
    /// [`Tree::node`] this only reports nodes reachable from the root.
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.iter().find(|node| node.id == *id)
    }

    /// Returns the parent's id of the given node.
    ///
    /// Returns `None` for the root and for unknown ids.
    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        self.nodes.get(id).and_then(Node::parent)
    }

    /// Returns the 1-based depth of the node (the root has depth 1).
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        let mut node = self.nodes.get(id)?;
        let mut depth = 1;
        while let Some(parent) = &node.parent {
            node = self.nodes.get(parent.as_str())?;
            depth += 1;
        }
        Some(depth)
    }

    /// Returns the height of the tree; a lone root has height 1.
    pub fn max_depth(&self) -> usize {
        self.height_of(&self.root)
    }

    fn height_of(&self, id: &NodeId) -> usize {
        self.children(id.as_str())
            .iter()
            .map(|child| self.height_of(child))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Returns the number of nodes in the subtree rooted at `id`, itself included.
    pub fn subtree_size(&self, id: &str) -> Option<usize> {
        self.nodes.get(id)?;
        Some(Preorder::starting_at(self, id).count())
    }

    /// Returns the ids of the subtree rooted at `id` in pre-order.
    ///
    /// Returns an empty vector for unknown ids.
    pub fn subtree_ids(&self, id: &str) -> Vec<NodeId> {
        Preorder::starting_at(self, id).map(|node| node.id.clone()).collect()
    }

    /// Iterates over all nodes in pre-order, children left to right.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder::starting_at(self, self.root.as_str())
    }

    /// Appends a new node as the last child of `parent`.
    ///
    /// This is the raw structural insertion used when rebuilding a tree; it
    /// does not enforce a depth limit. Interactive edits go through
    /// [`Tree::add_child`].
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotFound`] if `parent` does not exist.
    /// - [`TreeError::DuplicateId`] if `id` is already used.
    pub fn insert(&mut self, parent: &str, id: NodeId, label: impl Into<String>) -> TreeResult<()> {
        if self.nodes.contains_key(id.as_str()) {
            return Err(TreeError::DuplicateId(id));
        }
        let parent_node = self
            .nodes
            .get_mut(parent)
            .ok_or_else(|| TreeError::NotFound(NodeId::new(parent)))?;

        parent_node.children.push(id.clone());
        let parent_id = parent_node.id.clone();
        trace!(parent = parent, node_id = id.as_str(); "Node inserted");

        self.nodes
            .insert(id.clone(), Node::new(id, label.into(), Some(parent_id)));
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a Node;
    type IntoIter = Preorder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over a tree or one of its subtrees.
#[derive(Debug)]
pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<&'a NodeId>,
}

impl<'a> Preorder<'a> {
    fn starting_at(tree: &'a Tree, start: &str) -> Self {
        let stack = tree.nodes.get(start).map(|node| vec![&node.id]).unwrap_or_default();
        Self { tree, stack }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.nodes.get(id.as_str())?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
