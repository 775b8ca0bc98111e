//! Mutation engine: id allocation, add-child and remove-subtree.
//!
//! Every mutation validates all of its preconditions before touching the
//! arena, so a call that returns an error leaves the tree exactly as it was.

use log::debug;

use crate::{
    error::{TreeError, TreeResult},
    identifier::NodeId,
    tree::Tree,
};

/// Default maximum tree depth (the root is at depth 1).
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Id of the root of a freshly created tree.
pub const ROOT_SERIAL: u64 = 0;

/// Label of the root of a freshly created tree.
pub const ROOT_LABEL: &str = "Root";

/// Monotonic id counter owned by an editing session.
///
/// Serials are never handed out twice: deleting a node does not return its
/// serial to the pool. After restoring a tree, [`IdAllocator::reseed`] moves
/// the counter past every numeric id in that tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next: ROOT_SERIAL + 1,
        }
    }
}

impl IdAllocator {
    /// Creates an allocator seeded from an existing tree.
    ///
    /// # Errors
    ///
    /// See [`IdAllocator::reseed`].
    pub fn seeded_from(tree: &Tree) -> TreeResult<Self> {
        let mut allocator = Self::default();
        allocator.reseed(tree)?;
        Ok(allocator)
    }

    /// Returns the serial the next call to [`IdAllocator::mint`] will use.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Returns a fresh id and its serial, then advances the counter.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::IdsExhausted`] once the counter cannot advance
    /// any further. The counter is left unchanged.
    pub fn mint(&mut self) -> TreeResult<(NodeId, u64)> {
        let serial = self.next;
        self.next = serial
            .checked_add(1)
            .ok_or_else(|| TreeError::IdsExhausted(NodeId::from_serial(serial)))?;
        Ok((NodeId::from_serial(serial), serial))
    }

    /// Re-seeds the counter to one past the largest numeric id in `tree`.
    ///
    /// Ids without a numeric part are ignored. A tree without any numeric ids
    /// seeds the counter at 1.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::IdsExhausted`] if the tree already holds the
    /// largest representable serial. The counter is left unchanged.
    pub fn reseed(&mut self, tree: &Tree) -> TreeResult<()> {
        let max_serial = tree
            .iter()
            .filter_map(|node| node.id().numeric_suffix())
            .max();
        self.next = match max_serial {
            None => ROOT_SERIAL + 1,
            Some(serial) => serial
                .checked_add(1)
                .ok_or_else(|| TreeError::IdsExhausted(NodeId::from_serial(serial)))?,
        };
        debug!(next = self.next; "Id allocator reseeded");
        Ok(())
    }
}

/// Builds the label given to a node created with the given serial.
pub fn default_label(serial: u64) -> String {
    format!("Node {serial}")
}

impl Tree {
    /// Creates the tree a new session starts with: a lone `n0` "Root".
    pub fn fresh() -> Self {
        Self::new(NodeId::from_serial(ROOT_SERIAL), ROOT_LABEL)
    }

    /// Appends a new child to `parent` and returns its id.
    ///
    /// The child gets a freshly minted id and the label `Node {serial}` and
    /// becomes the parent's last child.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotFound`] if `parent` does not exist.
    /// - [`TreeError::DepthLimitExceeded`] if the child would sit deeper than
    ///   `max_depth`. No serial is consumed in that case.
    /// - [`TreeError::IdsExhausted`] if no serial is left to mint.
    ///
    /// # Examples
    ///
    /// ```
    /// use arbor_core::{mutation::IdAllocator, tree::Tree};
    ///
    /// let mut tree = Tree::fresh();
    /// let mut ids = IdAllocator::default();
    ///
    /// let child = tree.add_child("n0", &mut ids, 10).unwrap();
    /// assert_eq!(child, "n1");
    /// assert_eq!(tree.label("n1"), Some("Node 1"));
    /// ```
    pub fn add_child(
        &mut self,
        parent: &str,
        ids: &mut IdAllocator,
        max_depth: usize,
    ) -> TreeResult<NodeId> {
        let parent_depth = self
            .depth_of(parent)
            .ok_or_else(|| TreeError::NotFound(NodeId::new(parent)))?;

        let depth = parent_depth + 1;
        if depth > max_depth {
            return Err(TreeError::DepthLimitExceeded { depth, max_depth });
        }

        let (id, serial) = ids.mint()?;
        self.insert(parent, id.clone(), default_label(serial))?;
        debug!(parent = parent, node_id = id.as_str(), depth; "Child added");

        Ok(id)
    }

    /// Removes `id` and all of its descendants, returning how many nodes were removed.
    ///
    /// # Errors
    ///
    /// - [`TreeError::ProtectedRoot`] if `id` is the root.
    /// - [`TreeError::NotFound`] if `id` does not exist.
    pub fn remove_subtree(&mut self, id: &str) -> TreeResult<usize> {
        if self.root() == id {
            return Err(TreeError::ProtectedRoot(self.root().clone()));
        }
        let parent = self
            .parent_of(id)
            .cloned()
            .ok_or_else(|| TreeError::NotFound(NodeId::new(id)))?;

        let doomed = self.subtree_ids(id);
        if let Some(parent_node) = self.nodes.get_mut(parent.as_str()) {
            parent_node.detach_child(id);
        }
        for node_id in &doomed {
            self.nodes.remove(node_id.as_str());
        }
        debug!(node_id = id, removed = doomed.len(); "Subtree removed");

        Ok(doomed.len())
    }
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    /// A scripted edit: pick an existing node by index and add under it or remove it.
    #[derive(Debug, Clone)]
    enum Edit {
        Add(usize),
        Remove(usize),
    }

    fn edits_strategy() -> impl Strategy<Value = Vec<Edit>> {
        prop::collection::vec(
            prop_oneof![
                3 => any::<usize>().prop_map(Edit::Add),
                1 => any::<usize>().prop_map(Edit::Remove),
            ],
            0..80,
        )
    }

    fn pick(tree: &Tree, index: usize) -> NodeId {
        let ids = tree.subtree_ids(tree.root().as_str());
        ids[index % ids.len()].clone()
    }

    fn apply(tree: &mut Tree, ids: &mut IdAllocator, edits: &[Edit], max_depth: usize) {
        for edit in edits {
            match edit {
                Edit::Add(index) => {
                    let parent = pick(tree, *index);
                    let _ = tree.add_child(parent.as_str(), ids, max_depth);
                }
                Edit::Remove(index) => {
                    let target = pick(tree, *index);
                    let _ = tree.remove_subtree(target.as_str());
                }
            }
        }
    }

    /// After any edit sequence every id is unique and reachable exactly once.
    fn check_ids_unique(edits: Vec<Edit>) -> Result<(), TestCaseError> {
        let mut tree = Tree::fresh();
        let mut ids = IdAllocator::default();
        apply(&mut tree, &mut ids, &edits, 4);

        let reachable: Vec<&NodeId> = tree.iter().map(|node| node.id()).collect();
        let unique: HashSet<&NodeId> = reachable.iter().copied().collect();
        prop_assert_eq!(reachable.len(), unique.len());
        prop_assert_eq!(reachable.len(), tree.node_count());
        prop_assert!(tree.max_depth() <= 4);
        Ok(())
    }

    /// Removing a node drops exactly its subtree and nothing else.
    fn check_remove_drops_exact_subtree(
        edits: Vec<Edit>,
        target: usize,
    ) -> Result<(), TestCaseError> {
        let mut tree = Tree::fresh();
        let mut ids = IdAllocator::default();
        apply(&mut tree, &mut ids, &edits, DEFAULT_MAX_DEPTH);

        let victim = pick(&tree, target);
        let before: HashSet<NodeId> = tree.iter().map(|node| node.id().clone()).collect();
        let subtree: HashSet<NodeId> = tree.subtree_ids(victim.as_str()).into_iter().collect();
        let result = tree.remove_subtree(victim.as_str());
        let after: HashSet<NodeId> = tree.iter().map(|node| node.id().clone()).collect();

        if victim == *tree.root() {
            prop_assert!(result.is_err());
            prop_assert_eq!(after, before);
        } else {
            prop_assert_eq!(result, Ok(subtree.len()));
            let expected: HashSet<NodeId> = before.difference(&subtree).cloned().collect();
            prop_assert_eq!(after, expected);
        }
        Ok(())
    }

    /// Adding beneath a node at the depth limit never changes the tree.
    fn check_depth_limit_never_mutates(
        edits: Vec<Edit>,
        max_depth: usize,
    ) -> Result<(), TestCaseError> {
        let mut tree = Tree::fresh();
        let mut ids = IdAllocator::default();
        apply(&mut tree, &mut ids, &edits, max_depth);

        let deepest: Vec<NodeId> = tree
            .iter()
            .filter(|node| tree.depth_of(node.id().as_str()) == Some(max_depth))
            .map(|node| node.id().clone())
            .collect();
        for id in deepest {
            let before = tree.clone();
            let result = tree.add_child(id.as_str(), &mut ids, max_depth);
            let is_depth_limit = matches!(result, Err(TreeError::DepthLimitExceeded { .. }));
            prop_assert!(is_depth_limit);
            prop_assert_eq!(&tree, &before);
        }
        Ok(())
    }

    /// A reseeded allocator is past every numeric id in the tree.
    fn check_reseed_is_past_every_id(edits: Vec<Edit>) -> Result<(), TestCaseError> {
        let mut tree = Tree::fresh();
        let mut ids = IdAllocator::default();
        apply(&mut tree, &mut ids, &edits, DEFAULT_MAX_DEPTH);

        let reseeded =
            IdAllocator::seeded_from(&tree).map_err(|e| TestCaseError::fail(e.to_string()))?;
        for node in &tree {
            if let Some(serial) = node.id().numeric_suffix() {
                prop_assert!(reseeded.peek() > serial);
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn ids_unique_after_edits(edits in edits_strategy()) {
            check_ids_unique(edits)?;
        }

        #[test]
        fn remove_drops_exact_subtree(edits in edits_strategy(), target in any::<usize>()) {
            check_remove_drops_exact_subtree(edits, target)?;
        }

        #[test]
        fn depth_limit_never_mutates(edits in edits_strategy(), max_depth in 1usize..6) {
            check_depth_limit_never_mutates(edits, max_depth)?;
        }

        #[test]
        fn reseed_is_past_every_id(edits in edits_strategy()) {
            check_reseed_is_past_every_id(edits)?;
        }
    }
}
