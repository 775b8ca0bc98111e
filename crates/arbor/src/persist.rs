//! Tree persistence.
//!
//! A tree is saved as a single JSON document under one well-known key:
//!
//! ```json
//! { "id": "n0", "label": "Root", "children": [
//!     { "id": "n1", "label": "Node 1", "children": [] }
//! ] }
//! ```
//!
//! [`Persistence`] turns trees into that shape and back, and moves the bytes
//! through a [`Store`]. Its `load`/`save` never fail: a missing or corrupt
//! document reads as "nothing saved", and a failed write is logged and
//! dropped, so persistence problems never interrupt editing.

mod store;

pub use store::{FileStore, MemoryStore, Store};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use arbor_core::{error::TreeResult, identifier::NodeId, tree::Tree};

use crate::error::ArborError;

/// Key under which the tree document is stored.
pub const TREE_STATE_KEY: &str = "arbor.tree";

/// Nested, serializable form of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTree {
    pub id: NodeId,
    pub label: String,
    #[serde(default)]
    pub children: Vec<SerializedTree>,
}

impl SerializedTree {
    /// Captures the structure of `tree`, children in order.
    pub fn from_tree(tree: &Tree) -> Self {
        Self::capture(tree, tree.root())
    }

    fn capture(tree: &Tree, id: &NodeId) -> Self {
        Self {
            id: id.clone(),
            label: tree.label(id.as_str()).unwrap_or_default().to_string(),
            children: tree
                .children(id.as_str())
                .iter()
                .map(|child| Self::capture(tree, child))
                .collect(),
        }
    }

    /// Rebuilds the arena tree.
    ///
    /// # Errors
    ///
    /// Returns [`arbor_core::error::TreeError::DuplicateId`] if an id appears
    /// more than once.
    pub fn into_tree(self) -> TreeResult<Tree> {
        let Self {
            id,
            label,
            children,
        } = self;
        let mut tree = Tree::new(id.clone(), label);
        Self::attach(&mut tree, &id, children)?;
        Ok(tree)
    }

    fn attach(tree: &mut Tree, parent: &NodeId, children: Vec<Self>) -> TreeResult<()> {
        for Self {
            id,
            label,
            children,
        } in children
        {
            tree.insert(parent.as_str(), id.clone(), label)?;
            Self::attach(tree, &id, children)?;
        }
        Ok(())
    }

    /// Encodes the document as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, ArborError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a JSON document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ArborError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Moves tree documents in and out of a [`Store`].
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    store: S,
    key: String,
}

impl<S: Store> Persistence<S> {
    /// Creates an adapter storing the tree under [`TREE_STATE_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, TREE_STATE_KEY)
    }

    /// Creates an adapter storing the tree under a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Reads and decodes the saved tree.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Io`] if the store fails and
    /// [`ArborError::Persistence`] if the document cannot be decoded.
    pub fn try_load(&self) -> Result<Option<SerializedTree>, ArborError> {
        match self.store.load(&self.key)? {
            Some(bytes) => SerializedTree::from_json(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the saved tree, treating any failure as "nothing saved".
    pub fn load(&self) -> Option<SerializedTree> {
        match self.try_load() {
            Ok(Some(tree)) => {
                debug!(key = self.key; "Saved tree loaded");
                Some(tree)
            }
            Ok(None) => {
                debug!(key = self.key; "No saved tree");
                None
            }
            Err(err) => {
                warn!(key = self.key, err:err; "Saved tree unreadable, starting fresh");
                None
            }
        }
    }

    /// Encodes and writes the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Persistence`] if encoding fails and
    /// [`ArborError::Io`] if the store fails.
    pub fn try_save(&mut self, tree: &SerializedTree) -> Result<(), ArborError> {
        let bytes = tree.to_json()?;
        self.store.save(&self.key, &bytes)?;
        Ok(())
    }

    /// Writes the tree, logging and dropping any failure.
    pub fn save(&mut self, tree: &SerializedTree) {
        if let Err(err) = self.try_save(tree) {
            warn!(key = self.key, err:err; "Failed to save tree");
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use arbor_core::mutation::IdAllocator;

    use super::*;

    fn tree_strategy() -> impl Strategy<Value = Tree> {
        prop::collection::vec((any::<usize>(), "[a-zA-Z0-9 _-]{0,12}"), 0..40).prop_map(|picks| {
            let mut tree = Tree::fresh();
            let mut ids = IdAllocator::default();
            let mut created = vec![tree.root().clone()];
            for (pick, label) in picks {
                let parent = created[pick % created.len()].clone();
                let (id, _) = ids.mint().unwrap();
                if tree.insert(parent.as_str(), id.clone(), label).is_ok() {
                    created.push(id);
                }
            }
            tree
        })
    }

    /// Decoding an encoded tree reproduces the same ids, labels and child order.
    fn check_roundtrip(tree: Tree) -> Result<(), TestCaseError> {
        let bytes = SerializedTree::from_tree(&tree).to_json().unwrap();
        let restored = SerializedTree::from_json(&bytes).unwrap().into_tree().unwrap();
        prop_assert_eq!(&restored, &tree);

        let original: Vec<(&NodeId, &str)> = tree.iter().map(|n| (n.id(), n.label())).collect();
        let decoded: Vec<(&NodeId, &str)> = restored.iter().map(|n| (n.id(), n.label())).collect();
        prop_assert_eq!(original, decoded);
        Ok(())
    }

    proptest! {
        #[test]
        fn roundtrip(tree in tree_strategy()) {
            check_roundtrip(tree)?;
        }
    }
}
