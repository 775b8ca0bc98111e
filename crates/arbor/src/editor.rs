//! The editing session.
//!
//! An [`Editor`] owns the tree, the id allocator, the layout engine and the
//! persistence adapter. [`Editor::dispatch`] is the single entry point for
//! user actions; each call runs one full editing step:
//!
//! ```text
//! Action ─► mutate tree ─► save (best effort) ─► recompute layout ─► Frame
//! ```
//!
//! `dispatch` takes `&mut self`, so two mutations can never be in flight at
//! once. Hosts that share an editor between threads wrap the whole editor in
//! one `Mutex`, which covers lookup, mutation and id assignment together.

use std::fmt;

use log::{debug, info, warn};

use arbor_core::{
    error::TreeError,
    identifier::NodeId,
    mutation::IdAllocator,
    tree::Tree,
};

use crate::{
    config::AppConfig,
    layout::{Engine, TreeLayout},
    persist::{Persistence, SerializedTree, Store},
};

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The user activated a node: add a child beneath it.
    Activate(NodeId),
    /// The user clicked a node's delete affordance: remove its subtree.
    Delete(NodeId),
    /// Replace the whole tree with a fresh root.
    Reset,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// An add was rejected because the child would exceed the maximum depth.
    DepthLimit { max_depth: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthLimit { max_depth } => {
                write!(f, "Maximum depth of {max_depth} levels reached")
            }
        }
    }
}

/// What an action did to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(NodeId),
    Removed { id: NodeId, count: usize },
    Reset,
    Unchanged,
}

/// Everything a renderer needs after an editing step.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    layout: TreeLayout,
    notice: Option<Notice>,
    outcome: Outcome,
}

impl Frame {
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}

/// An editing session over one tree.
///
/// # Examples
///
/// ```
/// use arbor::{
///     config::AppConfig,
///     editor::{Action, Editor, Outcome},
///     persist::MemoryStore,
/// };
///
/// let mut editor = Editor::open(&AppConfig::default(), MemoryStore::new());
/// let frame = editor.dispatch(Action::Activate("n0".into()));
///
/// assert_eq!(frame.outcome(), &Outcome::Added("n1".into()));
/// assert_eq!(frame.layout().node_count(), 2);
/// ```
#[derive(Debug)]
pub struct Editor<S> {
    tree: Tree,
    ids: IdAllocator,
    engine: Engine,
    max_depth: usize,
    persistence: Persistence<S>,
}

impl<S: Store> Editor<S> {
    /// Opens a session, restoring the saved tree if there is a readable one.
    ///
    /// A missing, unreadable or structurally invalid document starts a fresh
    /// tree. A restored tree re-seeds the id allocator past its largest id.
    pub fn open(config: &AppConfig, store: S) -> Self {
        let persistence = Persistence::new(store);
        let max_depth = config.editor().max_depth();

        let restored = persistence.load().and_then(|document| {
            document
                .into_tree()
                .and_then(|tree| IdAllocator::seeded_from(&tree).map(|ids| (tree, ids)))
                .map_err(|err| warn!(err:err; "Saved tree is invalid, starting fresh"))
                .ok()
        });

        let (tree, ids) = match restored {
            Some((tree, ids)) => {
                info!(nodes = tree.node_count(), next_id = ids.peek(); "Tree restored");
                if tree.max_depth() > max_depth {
                    warn!(
                        depth = tree.max_depth(),
                        max_depth;
                        "Restored tree is deeper than the configured maximum",
                    );
                }
                (tree, ids)
            }
            None => {
                info!("Starting with a fresh tree");
                (Tree::fresh(), IdAllocator::default())
            }
        };

        Self {
            tree,
            ids,
            engine: Engine::new(config.layout().options()),
            max_depth,
            persistence,
        }
    }

    /// Returns the current tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Returns the serial the next created node will get.
    pub fn next_serial(&self) -> u64 {
        self.ids.peek()
    }

    /// Returns the configured maximum depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Computes the layout of the current tree.
    pub fn layout(&self) -> TreeLayout {
        self.engine.calculate(&self.tree)
    }

    /// Builds a frame for the current tree without changing it.
    pub fn frame(&self) -> Frame {
        Frame {
            layout: self.layout(),
            notice: None,
            outcome: Outcome::Unchanged,
        }
    }

    /// Adds a child beneath `id`; see [`Action::Activate`].
    pub fn activate_node(&mut self, id: &str) -> Frame {
        self.dispatch(Action::Activate(NodeId::new(id)))
    }

    /// Removes the subtree rooted at `id`; see [`Action::Delete`].
    pub fn delete_node(&mut self, id: &str) -> Frame {
        self.dispatch(Action::Delete(NodeId::new(id)))
    }

    /// Applies one action and returns the resulting frame.
    ///
    /// - Adding beneath a node at the maximum depth leaves the tree unchanged
    ///   and sets [`Notice::DepthLimit`] on the frame.
    /// - Adding beneath an unknown node, deleting the root, and deleting an
    ///   unknown node are silent no-ops.
    ///
    /// The tree is saved only when it changed.
    pub fn dispatch(&mut self, action: Action) -> Frame {
        debug!(action:?; "Dispatching action");

        let (outcome, notice) = match self.apply(&action) {
            Ok(outcome) => (outcome, None),
            Err(TreeError::DepthLimitExceeded { depth, max_depth }) => {
                info!(depth, max_depth; "Add rejected at depth limit");
                (Outcome::Unchanged, Some(Notice::DepthLimit { max_depth }))
            }
            Err(err) => {
                debug!(err:err; "Action ignored");
                (Outcome::Unchanged, None)
            }
        };

        if outcome != Outcome::Unchanged {
            self.persistence.save(&SerializedTree::from_tree(&self.tree));
        }

        Frame {
            layout: self.layout(),
            notice,
            outcome,
        }
    }

    fn apply(&mut self, action: &Action) -> Result<Outcome, TreeError> {
        match action {
            Action::Activate(parent) => self
                .tree
                .add_child(parent.as_str(), &mut self.ids, self.max_depth)
                .map(Outcome::Added),
            Action::Delete(id) => self.tree.remove_subtree(id.as_str()).map(|count| {
                Outcome::Removed {
                    id: id.clone(),
                    count,
                }
            }),
            Action::Reset => {
                // The allocator keeps counting so ids handed out before the
                // reset are never reissued.
                self.tree = Tree::fresh();
                Ok(Outcome::Reset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::persist::{MemoryStore, TREE_STATE_KEY};

    use super::*;

    fn editor() -> (Editor<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (Editor::open(&AppConfig::default(), store.clone()), store)
    }

    #[test]
    fn test_fresh_session() {
        let (editor, store) = editor();
        assert_eq!(editor.tree().root(), "n0");
        assert_eq!(editor.tree().label("n0"), Some("Root"));
        assert_eq!(editor.tree().max_depth(), 1);
        assert_eq!(editor.next_serial(), 1);
        assert!(store.get(TREE_STATE_KEY).is_none());
    }

    #[test]
    fn test_activate_saves_and_lays_out() {
        let (mut editor, store) = editor();
        let frame = editor.activate_node("n0");

        assert_eq!(frame.outcome(), &Outcome::Added(NodeId::new("n1")));
        assert_eq!(frame.notice(), None);
        assert_eq!(frame.layout().node_count(), 2);
        assert_eq!(frame.layout().connectors().len(), 1);

        let saved = SerializedTree::from_json(&store.get(TREE_STATE_KEY).unwrap()).unwrap();
        assert_eq!(saved.children.len(), 1);
        assert_eq!(saved.children[0].label, "Node 1");
    }

    #[test]
    fn test_depth_limit_notice() {
        let (mut editor, _store) = editor();
        let mut tip = "n0".to_string();
        for _ in 1..10 {
            let frame = editor.activate_node(&tip);
            let Outcome::Added(id) = frame.outcome() else {
                panic!("expected an added node");
            };
            tip = id.to_string();
        }
        assert_eq!(tip, "n9");
        assert_eq!(editor.tree().max_depth(), 10);

        let before = editor.tree().clone();
        let frame = editor.activate_node(&tip);
        assert_eq!(frame.notice(), Some(Notice::DepthLimit { max_depth: 10 }));
        assert_eq!(frame.outcome(), &Outcome::Unchanged);
        assert_eq!(editor.tree(), &before);
        assert_eq!(
            frame.notice().unwrap().to_string(),
            "Maximum depth of 10 levels reached"
        );
    }

    #[test]
    fn test_silent_no_ops() {
        let (mut editor, store) = editor();

        let frame = editor.delete_node("n0");
        assert_eq!(frame.outcome(), &Outcome::Unchanged);
        assert_eq!(frame.notice(), None);

        let frame = editor.delete_node("n42");
        assert_eq!(frame.outcome(), &Outcome::Unchanged);

        let frame = editor.activate_node("n42");
        assert_eq!(frame.outcome(), &Outcome::Unchanged);
        assert_eq!(frame.notice(), None);

        assert_eq!(editor.tree().node_count(), 1);
        assert!(store.get(TREE_STATE_KEY).is_none());
    }

    #[test]
    fn test_delete_reports_count() {
        let (mut editor, _store) = editor();
        editor.activate_node("n0");
        editor.activate_node("n1");
        editor.activate_node("n1");

        let frame = editor.delete_node("n1");
        assert_eq!(
            frame.outcome(),
            &Outcome::Removed {
                id: NodeId::new("n1"),
                count: 3
            }
        );
        assert_eq!(frame.layout().node_count(), 1);
    }

    #[test]
    fn test_reset_keeps_counting() {
        let (mut editor, store) = editor();
        editor.activate_node("n0");
        editor.activate_node("n0");

        let frame = editor.dispatch(Action::Reset);
        assert_eq!(frame.outcome(), &Outcome::Reset);
        assert_eq!(editor.tree().node_count(), 1);

        let saved = SerializedTree::from_json(&store.get(TREE_STATE_KEY).unwrap()).unwrap();
        assert!(saved.children.is_empty());

        let frame = editor.activate_node("n0");
        assert_eq!(frame.outcome(), &Outcome::Added(NodeId::new("n3")));
    }

    #[test]
    fn test_malformed_state_starts_fresh() {
        let store = MemoryStore::new();
        store
            .insert(TREE_STATE_KEY, r#"{"id": "n0", "children": 5}"#)
            .unwrap();

        let editor = Editor::open(&AppConfig::default(), store);
        assert_eq!(editor.tree(), &Tree::fresh());
        assert_eq!(editor.next_serial(), 1);
    }

    #[test]
    fn test_duplicate_ids_start_fresh() {
        let store = MemoryStore::new();
        store
            .insert(
                TREE_STATE_KEY,
                r#"{"id":"n0","label":"Root","children":[{"id":"n0","label":"again","children":[]}]}"#,
            )
            .unwrap();

        let editor = Editor::open(&AppConfig::default(), store);
        assert_eq!(editor.tree(), &Tree::fresh());
    }

    #[test]
    fn test_exhausted_ids_start_fresh() {
        let store = MemoryStore::new();
        store
            .insert(
                TREE_STATE_KEY,
                r#"{"id":"n0","label":"Root","children":[{"id":"n18446744073709551615","label":"Last","children":[]}]}"#,
            )
            .unwrap();

        let mut editor = Editor::open(&AppConfig::default(), store.clone());
        assert_eq!(editor.tree(), &Tree::fresh());
        assert_eq!(editor.next_serial(), 1);

        let frame = editor.activate_node("n0");
        assert_eq!(frame.outcome(), &Outcome::Added(NodeId::new("n1")));
        let saved = String::from_utf8(store.get(TREE_STATE_KEY).unwrap()).unwrap();
        assert!(!saved.contains("18446744073709551615"));
    }
}
