//! Layout engine for positioning tree nodes.
//!
//! This module turns a [`Tree`] into absolute node positions, connector
//! geometry and a canvas size. The computation is a pure function of the
//! tree and the [`LayoutOptions`]; the editor recomputes it in full after
//! every mutation.
//!
//! # Pipeline Position
//!
//! ```text
//! Tree (arbor-core)
//!     ↓ layout (this module)
//! TreeLayout
//!     ↓ export
//! SVG / outline
//! ```
//!
//! # Algorithm
//!
//! Two depth-first passes:
//!
//! 1. **Width pass** (post-order). A leaf's subtree is exactly one node wide.
//!    An internal node's subtree is as wide as its children's subtrees side
//!    by side, with one horizontal gap between neighbours. Sibling subtrees
//!    therefore never overlap, whatever their shape.
//! 2. **Position pass** (pre-order). Children are laid out left to right from
//!    the parent subtree's left edge, one vertical gap below the parent. A
//!    leaf sits at its subtree's left edge; an internal node is centered over
//!    the span of its children.
//!
//! Node positions are the top-left corners of the node boxes.

pub mod connector;

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use arbor_core::{
    geometry::{Bounds, Point, Size},
    identifier::NodeId,
    tree::Tree,
};

pub use connector::{Connector, ConnectorKind, Segment};

/// Geometry parameters for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    node_size: Size,
    horizontal_gap: f32,
    vertical_gap: f32,
    margin: f32,
    viewport_width: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_size: Size::new(100.0, 40.0),
            horizontal_gap: 20.0,
            vertical_gap: 80.0,
            margin: 40.0,
            viewport_width: 800.0,
        }
    }
}

impl LayoutOptions {
    /// Creates options for the given node size with default spacing.
    pub fn new(node_size: Size) -> Self {
        Self {
            node_size,
            ..Self::default()
        }
    }

    /// Set the space between adjacent sibling subtrees
    pub fn with_horizontal_gap(mut self, gap: f32) -> Self {
        self.horizontal_gap = gap;
        self
    }

    /// Set the distance between a parent row and its children row
    pub fn with_vertical_gap(mut self, gap: f32) -> Self {
        self.vertical_gap = gap;
        self
    }

    /// Set the blank border around the tree
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the minimum canvas width
    pub fn with_viewport_width(mut self, width: f32) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn node_size(&self) -> Size {
        self.node_size
    }

    pub fn horizontal_gap(&self) -> f32 {
        self.horizontal_gap
    }

    pub fn vertical_gap(&self) -> f32 {
        self.vertical_gap
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }
}

/// A node with its computed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    id: NodeId,
    label: String,
    depth: usize,
    position: Point,
    subtree_width: f32,
    children: Vec<NodeId>,
}

impl PlacedNode {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the 1-based depth of the node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the top-left corner of the node box.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the width of the subtree rooted at this node.
    pub fn subtree_width(&self) -> f32 {
        self.subtree_width
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The result of laying out a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    root: NodeId,
    nodes: IndexMap<NodeId, PlacedNode>,
    connectors: Vec<Connector>,
    node_size: Size,
    canvas_size: Size,
}

impl TreeLayout {
    /// Returns the root's id.
    pub fn root(&self) -> &NodeId {
        &self.root
    }

    /// Iterates over the placed nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = &PlacedNode> {
        self.nodes.values()
    }

    /// Returns the number of placed nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the placed node with the given id.
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.get(id)
    }

    /// Returns the top-left corner of the given node.
    pub fn position(&self, id: &str) -> Option<Point> {
        self.node(id).map(PlacedNode::position)
    }

    /// Returns the center of the given node's box.
    pub fn center(&self, id: &str) -> Option<Point> {
        self.bounds(id).map(Bounds::center)
    }

    /// Returns the box of the given node.
    pub fn bounds(&self, id: &str) -> Option<Bounds> {
        self.position(id)
            .map(|position| Bounds::new_from_top_left(position, self.node_size))
    }

    /// Returns the width of the subtree rooted at the given node.
    pub fn subtree_width(&self, id: &str) -> Option<f32> {
        self.node(id).map(PlacedNode::subtree_width)
    }

    /// Returns the horizontal band reserved for the subtree rooted at `id`,
    /// spanning the height of that node's row.
    pub fn subtree_span(&self, id: &str) -> Option<Bounds> {
        let node = self.node(id)?;
        let left = node.position.x() - (node.subtree_width - self.node_size.width()) / 2.0;
        Some(Bounds::new_from_top_left(
            node.position.with_x(left),
            Size::new(node.subtree_width, self.node_size.height()),
        ))
    }

    /// Returns the smallest box containing every node box.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.nodes
            .values()
            .map(|node| Bounds::new_from_top_left(node.position, self.node_size))
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// Returns the connectors, one per node with children, in pre-order.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Returns the size of every node box.
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    /// Returns the size of the whole canvas.
    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }
}

/// Tree layout engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: LayoutOptions,
}

impl Engine {
    /// Create a new layout engine
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Calculate the layout for a tree
    ///
    /// The canvas is at least as wide as the viewport; the root's subtree is
    /// centered horizontally and starts one margin below the top edge.
    pub fn calculate(&self, tree: &Tree) -> TreeLayout {
        let options = &self.options;
        let widths = self.subtree_widths(tree);
        let root = tree.root();
        let root_width = widths
            .get(root.as_str())
            .copied()
            .unwrap_or(options.node_size.width());

        let canvas_width = (root_width + 2.0 * options.margin).max(options.viewport_width);
        let canvas_height = tree.max_depth() as f32 * options.vertical_gap
            + options.node_size.height()
            + 2.0 * options.margin;
        let origin = Point::new((canvas_width - root_width) / 2.0, options.margin);

        let mut nodes = IndexMap::with_capacity(tree.node_count());
        self.place(tree, root, origin, 1, &widths, &mut nodes);
        let connectors = connector::route(&nodes, options.node_size);

        debug!(
            nodes_len = nodes.len(),
            connectors_len = connectors.len(),
            canvas_width,
            canvas_height;
            "Layout calculated",
        );

        TreeLayout {
            root: root.clone(),
            nodes,
            connectors,
            node_size: options.node_size,
            canvas_size: Size::new(canvas_width, canvas_height),
        }
    }

    /// Computes the subtree width of every node reachable from the root.
    pub fn subtree_widths(&self, tree: &Tree) -> HashMap<NodeId, f32> {
        let mut widths = HashMap::with_capacity(tree.node_count());
        self.measure(tree, tree.root(), &mut widths);
        widths
    }

    fn measure(&self, tree: &Tree, id: &NodeId, widths: &mut HashMap<NodeId, f32>) -> f32 {
        let children = tree.children(id.as_str());
        let width = if children.is_empty() {
            self.options.node_size.width()
        } else {
            let children_width: f32 = children
                .iter()
                .map(|child| self.measure(tree, child, widths))
                .sum();
            children_width + self.options.horizontal_gap * (children.len() - 1) as f32
        };

        widths.insert(id.clone(), width);
        width
    }

    fn place(
        &self,
        tree: &Tree,
        id: &NodeId,
        top_left: Point,
        depth: usize,
        widths: &HashMap<NodeId, f32>,
        nodes: &mut IndexMap<NodeId, PlacedNode>,
    ) {
        let node_width = self.options.node_size.width();
        let subtree_width = widths.get(id.as_str()).copied().unwrap_or(node_width);
        let children = tree.children(id.as_str());

        let x = if children.is_empty() {
            top_left.x()
        } else {
            top_left.x() + (subtree_width - node_width) / 2.0
        };
        let position = top_left.with_x(x);
        trace!(node_id = id.as_str(), x, y = position.y(); "Node placed");

        nodes.insert(
            id.clone(),
            PlacedNode {
                id: id.clone(),
                label: tree.label(id.as_str()).unwrap_or_default().to_string(),
                depth,
                position,
                subtree_width,
                children: children.to_vec(),
            },
        );

        let child_y = top_left.y() + self.options.vertical_gap;
        let mut child_x = top_left.x();
        for child in children {
            self.place(tree, child, Point::new(child_x, child_y), depth + 1, widths, nodes);
            child_x += widths.get(child.as_str()).copied().unwrap_or(node_width)
                + self.options.horizontal_gap;
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use arbor_core::mutation::IdAllocator;

    use super::*;

    /// Builds a tree by attaching each new node under a previously created one.
    fn tree_strategy() -> impl Strategy<Value = Tree> {
        prop::collection::vec(any::<usize>(), 0..60).prop_map(|parents| {
            let mut tree = Tree::fresh();
            let mut ids = IdAllocator::default();
            let mut created = vec![tree.root().clone()];
            for pick in parents {
                let parent = created[pick % created.len()].clone();
                if let Ok(child) = tree.add_child(parent.as_str(), &mut ids, 8) {
                    created.push(child);
                }
            }
            tree
        })
    }

    fn options_strategy() -> impl Strategy<Value = LayoutOptions> {
        (20.0f32..200.0, 10.0f32..80.0, 0.0f32..60.0, 20.0f32..200.0).prop_map(
            |(width, height, gap, vertical)| {
                LayoutOptions::new(Size::new(width, height))
                    .with_horizontal_gap(gap)
                    .with_vertical_gap(vertical)
            },
        )
    }

    /// Adjacent sibling subtrees never share horizontal space.
    fn check_sibling_spans_disjoint(tree: Tree, options: LayoutOptions) -> Result<(), TestCaseError> {
        let layout = Engine::new(options).calculate(&tree);
        for node in layout.nodes() {
            let spans: Vec<Bounds> = node
                .children()
                .iter()
                .filter_map(|child| layout.subtree_span(child.as_str()))
                .collect();
            // Spans are laid out left to right, so checking neighbours covers every pair
            for pair in spans.windows(2) {
                prop_assert!(pair[0].max_x() <= pair[1].min_x() + 0.01);
            }
        }
        Ok(())
    }

    /// An internal node's center is the center of its children's combined span.
    fn check_parent_centered(tree: Tree, options: LayoutOptions) -> Result<(), TestCaseError> {
        let layout = Engine::new(options).calculate(&tree);
        for node in layout.nodes().filter(|node| !node.children().is_empty()) {
            let first = layout.subtree_span(node.children()[0].as_str()).unwrap();
            let last = layout
                .subtree_span(node.children()[node.children().len() - 1].as_str())
                .unwrap();
            let span_center = (first.min_x() + last.max_x()) / 2.0;
            let center = layout.center(node.id().as_str()).unwrap();
            prop_assert!(approx_eq!(f32, center.x(), span_center, epsilon = 0.05));
        }
        Ok(())
    }

    /// Children sit exactly one vertical gap below their parent, in order.
    fn check_rows_and_order(tree: Tree, options: LayoutOptions) -> Result<(), TestCaseError> {
        let layout = Engine::new(options).calculate(&tree);
        prop_assert_eq!(layout.node_count(), tree.node_count());
        for node in layout.nodes() {
            let mut previous_x = f32::NEG_INFINITY;
            for child in node.children() {
                let child_position = layout.position(child.as_str()).unwrap();
                prop_assert!(approx_eq!(
                    f32,
                    child_position.y(),
                    node.position().y() + options.vertical_gap(),
                    epsilon = 0.01
                ));
                prop_assert!(child_position.x() > previous_x);
                previous_x = child_position.x();
            }
        }
        Ok(())
    }

    /// The canvas contains every node box.
    fn check_canvas_contains_nodes(tree: Tree, options: LayoutOptions) -> Result<(), TestCaseError> {
        let layout = Engine::new(options).calculate(&tree);
        let canvas = layout.canvas_size();
        prop_assert!(canvas.width() >= options.viewport_width());

        let content = layout.content_bounds().unwrap();
        prop_assert!(content.min_x() >= options.margin() - 0.01);
        prop_assert!(content.min_y() >= options.margin() - 0.01);
        prop_assert!(content.max_x() <= canvas.width() - options.margin() + 0.01);
        prop_assert!(content.max_y() <= canvas.height() - options.margin() + 0.01);
        Ok(())
    }

    proptest! {
        #[test]
        fn sibling_spans_disjoint(tree in tree_strategy(), options in options_strategy()) {
            check_sibling_spans_disjoint(tree, options)?;
        }

        #[test]
        fn parent_centered(tree in tree_strategy(), options in options_strategy()) {
            check_parent_centered(tree, options)?;
        }

        #[test]
        fn rows_and_order(tree in tree_strategy(), options in options_strategy()) {
            check_rows_and_order(tree, options)?;
        }

        #[test]
        fn canvas_contains_nodes(tree in tree_strategy(), options in options_strategy()) {
            check_canvas_contains_nodes(tree, options)?;
        }
    }
}
