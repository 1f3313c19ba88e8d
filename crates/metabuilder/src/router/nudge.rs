//! Spreading of relationships that share a side of an element.
//!
//! Every relationship attached to a side gets a slot. Slots are ordered by
//! the position of the element at the other end, so that lines do not cross
//! near the side. Generalizations converging on the same parent share one
//! slot (and one arrowhead), as do compositions leaving the same whole.

use std::collections::HashMap;

use metabuilder_core::{
    element::{EdgeId, EdgeKind, NodeId},
    geometry::Point,
};

use super::{MARGIN, SegmentationStyle, Side};
use crate::viewer::{DiagramViewer, round_half_up};

/// Default distance between two neighbouring slots.
const MAX_NUDGE: i32 = 11;

/// Slot of a relationship on a side: a 1-based index out of `total`.
///
/// An index of 0 means the relationship was not found on the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    index: i32,
    total: i32,
}

impl Position {
    pub(crate) fn new(index: i32, total: i32) -> Self {
        Self { index, total }
    }

    fn middle(self) -> f64 {
        (f64::from(self.total) + 1.0) / 2.0
    }

    /// Offset of this slot from the middle of a side `side_length` long.
    ///
    /// Slots are [`MAX_NUDGE`] apart unless the side is too short to hold
    /// them all, in which case they are spread evenly.
    pub(crate) fn nudge(self, side_length: i32) -> f64 {
        let mut increment = f64::from(MAX_NUDGE);
        let available = f64::from(side_length - 2 * MAX_NUDGE);
        if self.total > 1 && f64::from((self.total - 2) * MAX_NUDGE) > available {
            increment = available / f64::from(self.total - 1);
        }
        -(self.middle() - f64::from(self.index)) * increment
    }
}

/// Attachment point of `edge` on `side` of `node`, shifted into its slot.
///
/// `forward` selects the start (`true`) or the end of the relationship.
pub(super) fn anchor(
    viewer: &DiagramViewer<'_>,
    edge: EdgeId,
    node: NodeId,
    side: Side,
    forward: bool,
) -> Point {
    let position = compute_position(viewer, edge, side, forward);
    let point = viewer.connection_point(node, side.direction());
    let bounds = viewer.bounds(node);
    let has_self_relationship = has_self_relationship(viewer, node);
    if side.is_east_west() {
        let mut y = f64::from(point.y()) + position.nudge(bounds.height());
        if side == Side::East && has_self_relationship {
            // Slots share the side with the loop anchored at the corner.
            let increment = (bounds.height() - MARGIN) / (position.total + 1);
            y = f64::from(bounds.y() + MARGIN + position.index * increment);
        }
        Point::new(point.x(), round_half_up(y))
    } else {
        let mut x = f64::from(point.x()) + position.nudge(bounds.width());
        if side == Side::North && has_self_relationship {
            let increment = (bounds.width() - MARGIN) / (position.total + 1);
            x = f64::from(bounds.x() + position.index * increment);
        }
        Point::new(round_half_up(x), point.y())
    }
}

fn has_self_relationship(viewer: &DiagramViewer<'_>, node: NodeId) -> bool {
    let diagram = viewer.diagram();
    diagram
        .relationships_connected_to(node)
        .into_iter()
        .any(|edge| diagram.relationship(edge).is_self_relationship())
}

/// The side of `target` a relationship occupies for slot allocation.
///
/// Slots are always allocated with the style of the relationship kind, even
/// when the route itself falls back to another style.
fn kind_side(viewer: &DiagramViewer<'_>, edge: EdgeId, target: NodeId) -> Side {
    let kind = viewer.diagram().relationship(edge).kind();
    SegmentationStyle::for_kind(kind).attached_side(viewer, edge, target)
}

fn other_end(viewer: &DiagramViewer<'_>, edge: EdgeId, node: NodeId) -> NodeId {
    let (start, end) = viewer.diagram().relationship(edge).endpoints();
    if start == node { end } else { start }
}

/// Relationships attached to `side` of `target`, in slot order.
fn relationships_on_side(viewer: &DiagramViewer<'_>, target: NodeId, side: Side) -> Vec<EdgeId> {
    let diagram = viewer.diagram();
    let mut on_side: Vec<EdgeId> = diagram
        .relationships_connected_to(target)
        .into_iter()
        .filter(|&edge| !diagram.relationship(edge).is_self_relationship())
        .filter(|&edge| kind_side(viewer, edge, target) == side)
        .collect();

    // Relationships to the same element stay adjacent, ordered by kind.
    let mut first_seen: HashMap<NodeId, usize> = HashMap::new();
    for &edge in &on_side {
        let next = first_seen.len();
        first_seen.entry(other_end(viewer, edge, target)).or_insert(next);
    }
    on_side.sort_by_key(|&edge| {
        let other = other_end(viewer, edge, target);
        let center = viewer.bounds(other).center();
        let coordinate = if side.is_east_west() {
            center.y()
        } else {
            center.x()
        };
        (coordinate, first_seen[&other], diagram.relationship(edge).kind())
    });
    on_side
}

/// Returns `true` if both relationships should share one slot on `target`.
fn can_aggregate(viewer: &DiagramViewer<'_>, a: EdgeId, b: EdgeId, target: NodeId) -> bool {
    let diagram = viewer.diagram();
    let (a, b) = (diagram.relationship(a), diagram.relationship(b));
    match (a.kind(), b.kind()) {
        (EdgeKind::Generalization, EdgeKind::Generalization) => {
            a.end() == Some(target) && b.end() == Some(target)
        }
        (EdgeKind::Composition, EdgeKind::Composition) => {
            a.start() == Some(target) && b.start() == Some(target)
        }
        _ => false,
    }
}

/// Slot of `edge` on `side` of its start (`forward`) or end element.
pub(crate) fn compute_position(
    viewer: &DiagramViewer<'_>,
    edge: EdgeId,
    side: Side,
    forward: bool,
) -> Position {
    let (start, end) = viewer.diagram().relationship(edge).endpoints();
    let target = if forward { start } else { end };

    let mut groups: Vec<EdgeId> = Vec::new();
    let mut index = None;
    for candidate in relationships_on_side(viewer, target, side) {
        let group = match groups
            .iter()
            .position(|&leader| can_aggregate(viewer, candidate, leader, target))
        {
            Some(group) => group,
            None => {
                groups.push(candidate);
                groups.len() - 1
            }
        };
        if candidate == edge {
            index = Some(group);
        }
    }
    let index = index.map_or(0, |group| group as i32 + 1);
    Position::new(index, groups.len() as i32)
}
