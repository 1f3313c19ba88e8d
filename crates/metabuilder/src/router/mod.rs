//! Relationship routing.
//!
//! A route is the polyline drawn for a relationship, from a point on the
//! outline of its start element to a point on the outline of its end
//! element. Routing is a pure function of the current element geometry and
//! of the relationships attached to each side of an element.
//!
//! Three [`SegmentationStyle`]s exist:
//!
//! - [`SegmentationStyle::Straight`] joins the closest pair of side
//!   midpoints with a single segment.
//! - [`SegmentationStyle::Hvh`] leaves horizontally, bends once vertically
//!   and arrives horizontally. It needs horizontal clearance between the
//!   two elements.
//! - [`SegmentationStyle::Vhv`] is the vertical counterpart.
//!
//! When the clearance a style needs is missing, [`Hvh`](SegmentationStyle::Hvh)
//! defers to [`Vhv`](SegmentationStyle::Vhv) and the other way round; both
//! end at [`Straight`](SegmentationStyle::Straight), which always works.
//! A relationship from an element to itself is always drawn as a fixed loop
//! at the top right corner of the element.

mod nudge;

use log::trace;

use metabuilder_core::{
    element::{EdgeId, EdgeKind, NodeId},
    geometry::{Direction, Point},
};

use crate::viewer::DiagramViewer;

/// Size of the self-relationship loop.
const MARGIN: i32 = 20;

/// Shortest segment a bent route may contain.
const MIN_SEGMENT: i32 = 10;

/// Side of an element a relationship is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    West,
    North,
    East,
    South,
}

impl Side {
    /// Every side, in the order ties are resolved.
    pub const ALL: [Side; 4] = [Side::West, Side::North, Side::East, Side::South];

    pub fn is_east_west(self) -> bool {
        matches!(self, Side::West | Side::East)
    }

    pub fn direction(self) -> Direction {
        match self {
            Side::West => Direction::West,
            Side::North => Direction::North,
            Side::East => Direction::East,
            Side::South => Direction::South,
        }
    }

    /// The opposite side.
    pub fn flip(self) -> Self {
        match self {
            Side::West => Side::East,
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
        }
    }
}

/// Strategy computing the bend points of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentationStyle {
    Straight,
    Hvh,
    Vhv,
}

impl SegmentationStyle {
    /// The style used to draw relationships of `kind`.
    pub fn for_kind(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Association | EdgeKind::Composition => SegmentationStyle::Hvh,
            EdgeKind::Generalization => SegmentationStyle::Vhv,
        }
    }

    /// Returns `true` if the element geometry leaves room for this style.
    pub fn is_possible(self, viewer: &DiagramViewer<'_>, edge: EdgeId) -> bool {
        match self {
            SegmentationStyle::Straight => true,
            SegmentationStyle::Hvh => going_east(viewer, edge) || going_west(viewer, edge),
            SegmentationStyle::Vhv => going_south(viewer, edge) || going_north(viewer, edge),
        }
    }

    /// The side of `node` the relationship leaves from.
    ///
    /// `node` must be the start or the end of `edge`.
    pub fn attached_side(self, viewer: &DiagramViewer<'_>, edge: EdgeId, node: NodeId) -> Side {
        let (start, end) = viewer.diagram().relationship(edge).endpoints();
        assert!(
            node == start || node == end,
            "{node} is not an endpoint of {edge}"
        );
        match self {
            SegmentationStyle::Straight => closest_side(viewer, node, other_end(start, end, node)),
            _ if start == end => Side::North,
            SegmentationStyle::Hvh => {
                if going_east(viewer, edge) {
                    if node == start { Side::East } else { Side::West }
                } else if going_west(viewer, edge) {
                    if node == start { Side::West } else { Side::East }
                } else {
                    SegmentationStyle::Vhv.fallback_side(viewer, edge, node)
                }
            }
            SegmentationStyle::Vhv => {
                if going_south(viewer, edge) {
                    if node == start { Side::South } else { Side::North }
                } else if going_north(viewer, edge) {
                    if node == start { Side::North } else { Side::South }
                } else {
                    SegmentationStyle::Hvh.fallback_side(viewer, edge, node)
                }
            }
        }
    }

    fn fallback_side(self, viewer: &DiagramViewer<'_>, edge: EdgeId, node: NodeId) -> Side {
        if self.is_possible(viewer, edge) {
            self.attached_side(viewer, edge, node)
        } else {
            SegmentationStyle::Straight.attached_side(viewer, edge, node)
        }
    }

    /// Points of the polyline drawn for `edge`, from start to end.
    ///
    /// The path always has at least two points.
    pub fn path(self, viewer: &DiagramViewer<'_>, edge: EdgeId) -> Vec<Point> {
        let (start, end) = viewer.diagram().relationship(edge).endpoints();
        if start == end {
            return self_path(viewer, start);
        }
        match self {
            SegmentationStyle::Straight => straight_path(viewer, edge, start, end),
            SegmentationStyle::Hvh => {
                if self.is_possible(viewer, edge) {
                    hvh_path(viewer, edge, start, end)
                } else {
                    trace!(edge:?; "No horizontal clearance for relationship");
                    SegmentationStyle::Vhv.fallback_path(viewer, edge)
                }
            }
            SegmentationStyle::Vhv => {
                if self.is_possible(viewer, edge) {
                    vhv_path(viewer, edge, start, end)
                } else {
                    trace!(edge:?; "No vertical clearance for relationship");
                    SegmentationStyle::Hvh.fallback_path(viewer, edge)
                }
            }
        }
    }

    fn fallback_path(self, viewer: &DiagramViewer<'_>, edge: EdgeId) -> Vec<Point> {
        if self.is_possible(viewer, edge) {
            self.path(viewer, edge)
        } else {
            trace!(edge:?; "Routing relationship as a straight line");
            SegmentationStyle::Straight.path(viewer, edge)
        }
    }
}

/// Routes `edge` with the style of its kind.
pub fn route(viewer: &DiagramViewer<'_>, edge: EdgeId) -> Vec<Point> {
    let kind = viewer.diagram().relationship(edge).kind();
    SegmentationStyle::for_kind(kind).path(viewer, edge)
}

fn other_end(start: NodeId, end: NodeId, node: NodeId) -> NodeId {
    if node == start { end } else { start }
}

/// Side of `node` whose midpoint is closest to any side midpoint of `other`.
fn closest_side(viewer: &DiagramViewer<'_>, node: NodeId, other: NodeId) -> Side {
    let mut best_side = Side::West;
    let mut shortest = f64::MAX;
    for side in Side::ALL {
        let from = viewer.connection_point(node, side.direction());
        for inner in Side::ALL {
            let to = viewer.connection_point(other, inner.direction());
            let distance = from.distance(to);
            if distance < shortest {
                shortest = distance;
                best_side = side;
            }
        }
    }
    best_side
}

fn going_east(viewer: &DiagramViewer<'_>, edge: EdgeId) -> bool {
    let (start, end) = viewer.diagram().relationship(edge).endpoints();
    viewer.connection_point(start, Direction::East).x() + 2 * MIN_SEGMENT
        <= viewer.connection_point(end, Direction::West).x()
}

fn going_west(viewer: &DiagramViewer<'_>, edge: EdgeId) -> bool {
    let (start, end) = viewer.diagram().relationship(edge).endpoints();
    viewer.connection_point(end, Direction::East).x() + 2 * MIN_SEGMENT
        <= viewer.connection_point(start, Direction::West).x()
}

fn going_south(viewer: &DiagramViewer<'_>, edge: EdgeId) -> bool {
    let (start, end) = viewer.diagram().relationship(edge).endpoints();
    viewer.connection_point(start, Direction::South).y() + 2 * MIN_SEGMENT
        <= viewer.connection_point(end, Direction::North).y()
}

fn going_north(viewer: &DiagramViewer<'_>, edge: EdgeId) -> bool {
    let (start, end) = viewer.diagram().relationship(edge).endpoints();
    viewer.connection_point(end, Direction::South).y() + 2 * MIN_SEGMENT
        <= viewer.connection_point(start, Direction::North).y()
}

/// Fixed loop starting left of the top right corner and ending below it.
fn self_path(viewer: &DiagramViewer<'_>, node: NodeId) -> Vec<Point> {
    let corner = viewer.top_right_corner(node);
    vec![
        corner.translated(-MARGIN, 0),
        corner.translated(-MARGIN, -MARGIN),
        corner.translated(MARGIN, -MARGIN),
        corner.translated(MARGIN, MARGIN),
        corner.translated(0, MARGIN),
    ]
}

/// Connection points of both ends, spread apart when the relationship is
/// part of the diagram and shares its sides with other relationships.
fn anchor_points(
    viewer: &DiagramViewer<'_>,
    edge: EdgeId,
    (start, start_side): (NodeId, Side),
    (end, end_side): (NodeId, Side),
) -> (Point, Point) {
    if viewer.diagram().contains(edge) {
        (
            nudge::anchor(viewer, edge, start, start_side, true),
            nudge::anchor(viewer, edge, end, end_side, false),
        )
    } else {
        (
            viewer.connection_point(start, start_side.direction()),
            viewer.connection_point(end, end_side.direction()),
        )
    }
}

fn straight_path(viewer: &DiagramViewer<'_>, edge: EdgeId, start: NodeId, end: NodeId) -> Vec<Point> {
    let style = SegmentationStyle::Straight;
    let start_side = style.attached_side(viewer, edge, start);
    let end_side = style.attached_side(viewer, edge, end);
    let (from, to) = anchor_points(viewer, edge, (start, start_side), (end, end_side));
    vec![from, to]
}

fn hvh_path(viewer: &DiagramViewer<'_>, edge: EdgeId, start: NodeId, end: NodeId) -> Vec<Point> {
    let start_side = if going_east(viewer, edge) {
        Side::East
    } else {
        Side::West
    };
    let (from, to) = anchor_points(viewer, edge, (start, start_side), (end, start_side.flip()));
    if (from.y() - to.y()).abs() <= MIN_SEGMENT {
        return vec![Point::new(from.x(), to.y()), to];
    }
    let middle = (from.x() + to.x()) / 2;
    vec![
        from,
        Point::new(middle, from.y()),
        Point::new(middle, to.y()),
        to,
    ]
}

fn vhv_path(viewer: &DiagramViewer<'_>, edge: EdgeId, start: NodeId, end: NodeId) -> Vec<Point> {
    let start_side = if going_south(viewer, edge) {
        Side::South
    } else {
        Side::North
    };
    let (from, to) = anchor_points(viewer, edge, (start, start_side), (end, start_side.flip()));
    if (from.x() - to.x()).abs() <= MIN_SEGMENT {
        return vec![Point::new(to.x(), from.y()), to];
    }
    let middle = (from.y() + to.y()) / 2;
    vec![
        from,
        Point::new(from.x(), middle),
        Point::new(to.x(), middle),
        to,
    ]
}

#[cfg(test)]
mod tests {
    use metabuilder_core::{diagram::Diagram, element::NodeKind};

    use super::*;
    use crate::viewer::TextMetrics;

    fn class_at(diagram: &mut Diagram, x: i32, y: i32) -> NodeId {
        let node = diagram.create_named_element(NodeKind::CLASS);
        diagram.translate(node, x, y);
        diagram.add_named_element(node);
        node
    }

    fn connect(diagram: &mut Diagram, kind: EdgeKind, start: NodeId, end: NodeId) -> EdgeId {
        let edge = diagram.create_relationship(kind);
        diagram.connect(edge, start, end);
        diagram.add_relationship(edge);
        edge
    }

    #[test]
    fn test_side_flip() {
        for side in Side::ALL {
            assert_eq!(side.flip().flip(), side);
            assert_eq!(side.flip().is_east_west(), side.is_east_west());
        }
        assert_eq!(Side::North.direction(), Direction::North);
    }

    #[test]
    fn test_self_path() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let node = class_at(&mut diagram, 0, 100);
        let edge = connect(&mut diagram, EdgeKind::Association, node, node);
        let viewer = DiagramViewer::new(&diagram, &metrics);

        let expected = vec![
            Point::new(80, 100),
            Point::new(80, 80),
            Point::new(120, 80),
            Point::new(120, 120),
            Point::new(100, 120),
        ];
        for style in [
            SegmentationStyle::Straight,
            SegmentationStyle::Hvh,
            SegmentationStyle::Vhv,
        ] {
            assert_eq!(style.path(&viewer, edge), expected);
        }
        assert_eq!(
            SegmentationStyle::Hvh.attached_side(&viewer, edge, node),
            Side::North
        );
    }

    #[test]
    fn test_hvh_two_point_path() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let a = class_at(&mut diagram, 0, 0);
        let b = class_at(&mut diagram, 300, 5);
        let edge = connect(&mut diagram, EdgeKind::Association, a, b);
        let viewer = DiagramViewer::new(&diagram, &metrics);

        assert_eq!(
            route(&viewer, edge),
            vec![Point::new(100, 35), Point::new(300, 35)]
        );
        assert_eq!(
            SegmentationStyle::Hvh.attached_side(&viewer, edge, a),
            Side::East
        );
        assert_eq!(
            SegmentationStyle::Hvh.attached_side(&viewer, edge, b),
            Side::West
        );
    }

    #[test]
    fn test_hvh_bends_through_middle() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let a = class_at(&mut diagram, 300, 200);
        let b = class_at(&mut diagram, 0, 0);
        let edge = connect(&mut diagram, EdgeKind::Composition, a, b);
        let viewer = DiagramViewer::new(&diagram, &metrics);

        assert_eq!(
            route(&viewer, edge),
            vec![
                Point::new(300, 230),
                Point::new(200, 230),
                Point::new(200, 30),
                Point::new(100, 30),
            ]
        );
    }

    #[test]
    fn test_vhv_path() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let child = class_at(&mut diagram, 200, 200);
        let parent = class_at(&mut diagram, 0, 0);
        let edge = connect(&mut diagram, EdgeKind::Generalization, child, parent);
        let viewer = DiagramViewer::new(&diagram, &metrics);

        assert_eq!(
            route(&viewer, edge),
            vec![
                Point::new(250, 200),
                Point::new(250, 130),
                Point::new(50, 130),
                Point::new(50, 60),
            ]
        );
    }

    #[test]
    fn test_fallback_to_straight() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        // Overlapping elements leave no clearance in either direction.
        let a = class_at(&mut diagram, 0, 0);
        let b = class_at(&mut diagram, 50, 30);
        let edge = connect(&mut diagram, EdgeKind::Generalization, a, b);
        let viewer = DiagramViewer::new(&diagram, &metrics);

        assert!(!SegmentationStyle::Hvh.is_possible(&viewer, edge));
        assert!(!SegmentationStyle::Vhv.is_possible(&viewer, edge));
        let straight = SegmentationStyle::Straight.path(&viewer, edge);
        assert_eq!(straight.len(), 2);
        assert_eq!(SegmentationStyle::Vhv.path(&viewer, edge), straight);
        assert_eq!(SegmentationStyle::Hvh.path(&viewer, edge), straight);
    }

    #[test]
    fn test_hvh_defers_to_vhv() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let a = class_at(&mut diagram, 0, 0);
        let b = class_at(&mut diagram, 20, 200);
        let edge = connect(&mut diagram, EdgeKind::Association, a, b);
        let viewer = DiagramViewer::new(&diagram, &metrics);

        assert!(!SegmentationStyle::Hvh.is_possible(&viewer, edge));
        assert!(SegmentationStyle::Vhv.is_possible(&viewer, edge));
        assert_eq!(
            route(&viewer, edge),
            SegmentationStyle::Vhv.path(&viewer, edge)
        );
        assert_eq!(
            SegmentationStyle::Hvh.attached_side(&viewer, edge, a),
            Side::South
        );
    }

    #[test]
    fn test_detached_relationship_is_not_nudged() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let a = class_at(&mut diagram, 0, 0);
        let b = class_at(&mut diagram, 300, 0);
        connect(&mut diagram, EdgeKind::Association, a, b);
        let candidate = diagram.create_relationship(EdgeKind::Association);
        diagram.connect(candidate, a, b);
        let viewer = DiagramViewer::new(&diagram, &metrics);

        assert_eq!(
            route(&viewer, candidate),
            vec![Point::new(100, 30), Point::new(300, 30)]
        );
    }
}
