//! Connector geometry between parents and children.
//!
//! A parent with a single child is joined by one straight segment between
//! the two node centers. A parent with several children gets an org-chart
//! connector:
//!
//! ```text
//!            ┌────────┐
//!            │ parent │
//!            └───┬────┘
//!                │            trunk
//!     ┌──────────┼─────────┐  bus (at mid_y)
//!     │          │         │  drops
//! ┌───┴───┐ ┌────┴──┐ ┌────┴──┐
//! │ child │ │ child │ │ child │
//! └───────┘ └───────┘ └───────┘
//! ```
//!
//! `mid_y` is the average of the parent row's center y and the child row's
//! center y.

use indexmap::IndexMap;

use arbor_core::{
    geometry::{Point, Size},
    identifier::NodeId,
};

use super::PlacedNode;

/// A straight line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Returns SVG path data for this segment.
    pub fn to_path_data(&self) -> String {
        format!(
            "M {} {} L {} {}",
            self.start.x(),
            self.start.y(),
            self.end.x(),
            self.end.y()
        )
    }
}

/// The shape of a connector.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorKind {
    /// Parent center to the single child's center.
    Straight(Segment),
    /// Trunk down from the parent, a horizontal bus across the children and
    /// one drop per child.
    Orthogonal {
        trunk: Segment,
        bus: Segment,
        drops: Vec<Segment>,
    },
}

/// Lines linking a parent to all of its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    parent: NodeId,
    children: Vec<NodeId>,
    kind: ConnectorKind,
}

impl Connector {
    /// Builds the connector from a parent center to its children's centers.
    ///
    /// Returns `None` when there are no children.
    pub fn between(parent: NodeId, parent_center: Point, children: &[(NodeId, Point)]) -> Option<Self> {
        let kind = match children {
            [] => return None,
            [(_, child_center)] => ConnectorKind::Straight(Segment::new(parent_center, *child_center)),
            [(_, first), ..] => {
                let mid_y = parent_center.midpoint(*first).y();
                let (min_x, max_x) = children.iter().fold(
                    (f32::INFINITY, f32::NEG_INFINITY),
                    |(min_x, max_x), (_, center)| (min_x.min(center.x()), max_x.max(center.x())),
                );

                ConnectorKind::Orthogonal {
                    trunk: Segment::new(parent_center, parent_center.with_y(mid_y)),
                    bus: Segment::new(Point::new(min_x, mid_y), Point::new(max_x, mid_y)),
                    drops: children
                        .iter()
                        .map(|(_, center)| Segment::new(center.with_y(mid_y), *center))
                        .collect(),
                }
            }
        };

        Some(Self {
            parent,
            children: children.iter().map(|(id, _)| id.clone()).collect(),
            kind,
        })
    }

    pub fn parent(&self) -> &NodeId {
        &self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &ConnectorKind {
        &self.kind
    }

    /// Returns every segment in drawing order: trunk, bus, then drops left to right.
    pub fn segments(&self) -> Vec<Segment> {
        match &self.kind {
            ConnectorKind::Straight(segment) => vec![*segment],
            ConnectorKind::Orthogonal { trunk, bus, drops } => {
                let mut segments = Vec::with_capacity(drops.len() + 2);
                segments.push(*trunk);
                segments.push(*bus);
                segments.extend_from_slice(drops);
                segments
            }
        }
    }

    /// Returns SVG path data drawing the whole connector.
    pub fn to_path_data(&self) -> String {
        self.segments()
            .iter()
            .map(Segment::to_path_data)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Derives the connectors for every placed node that has children.
pub(super) fn route(nodes: &IndexMap<NodeId, PlacedNode>, node_size: Size) -> Vec<Connector> {
    let half = node_size.half_extent();
    let center_of = |id: &NodeId| nodes.get(id).map(|node| node.position.add_point(half));

    nodes
        .values()
        .filter_map(|node| {
            let children: Vec<(NodeId, Point)> = node
                .children
                .iter()
                .filter_map(|child| center_of(child).map(|center| (child.clone(), center)))
                .collect();
            Connector::between(node.id.clone(), node.position.add_point(half), &children)
        })
        .collect()
}
