//! Relationship geometry: routed path, arrowheads, labels and hit-testing.

use metabuilder_core::{
    element::{AssociationDirection, EdgeId, EdgeKind},
    geometry::{Dimension, Line, Point, Rectangle},
};

use super::{ArrowHead, DiagramViewer, round_half_up};
use crate::router;

/// Hit-test tolerance around a relationship path.
const MAX_DISTANCE: f64 = 3.0;

/// Distance between a label and the segment it annotates.
const LABEL_GAP: f64 = 3.0;

/// Shortest line length labels are wrapped to, in characters.
const MIN_LABEL_LINE_LENGTH: usize = 15;

/// Which segment of a relationship a label annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelPosition {
    Start,
    Middle,
    End,
}

/// A relationship label wrapped and placed for drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    position: LabelPosition,
    text: String,
    bounds: Rectangle,
}

impl Label {
    pub fn position(&self) -> LabelPosition {
        self.position
    }

    /// Label text with line breaks inserted.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }
}

/// A label slot: the segment it annotates and the arrowhead at its end.
struct LabelSlot<'t> {
    position: LabelPosition,
    text: &'t str,
    from: Point,
    to: Point,
    arrow: ArrowHead,
}

impl DiagramViewer<'_> {
    /// Routed polyline of a relationship.
    pub fn relationship_path(&self, edge: EdgeId) -> Vec<Point> {
        router::route(self, edge)
    }

    /// First and last point of the routed path.
    pub fn connection_points(&self, edge: EdgeId) -> Line {
        line_of(&self.relationship_path(edge))
    }

    /// Arrowheads drawn at the start and at the end of a relationship.
    pub fn arrow_heads(&self, edge: EdgeId) -> (ArrowHead, ArrowHead) {
        let relationship = self.diagram.relationship(edge);
        match relationship.kind() {
            EdgeKind::Association => match relationship.direction() {
                AssociationDirection::None => (ArrowHead::None, ArrowHead::None),
                AssociationDirection::Uni => (ArrowHead::None, ArrowHead::V),
                AssociationDirection::Bi => (ArrowHead::V, ArrowHead::V),
            },
            EdgeKind::Composition => (ArrowHead::BlackDiamond, ArrowHead::None),
            EdgeKind::Generalization => (ArrowHead::None, ArrowHead::Triangle),
        }
    }

    /// Path segments followed by the arrowhead outlines.
    fn outline(&self, edge: EdgeId, path: &[Point]) -> Vec<(Point, Point)> {
        let (start_arrow, end_arrow) = self.arrow_heads(edge);
        let last = path.len() - 1;
        let mut segments: Vec<(Point, Point)> = path.windows(2).map(|w| (w[0], w[1])).collect();
        segments.extend(start_arrow.segments(path[1], path[0]));
        segments.extend(end_arrow.segments(path[last - 1], path[last]));
        segments
    }

    fn label_slots<'e>(&'e self, edge: EdgeId, path: &[Point]) -> [LabelSlot<'e>; 3] {
        let relationship = self.diagram.relationship(edge);
        let (start_arrow, end_arrow) = self.arrow_heads(edge);
        let last = path.len() - 1;
        let middle = path.len() / 2;
        [
            LabelSlot {
                position: LabelPosition::Start,
                text: relationship.start_label(),
                from: path[1],
                to: path[0],
                arrow: start_arrow,
            },
            LabelSlot {
                position: LabelPosition::Middle,
                text: relationship.middle_label(),
                from: path[middle - 1],
                to: path[middle],
                arrow: ArrowHead::None,
            },
            LabelSlot {
                position: LabelPosition::End,
                text: relationship.end_label(),
                from: path[last - 1],
                to: path[last],
                arrow: end_arrow,
            },
        ]
    }

    /// Bounding box of the path, the arrowheads and the labels.
    pub fn relationship_bounds(&self, edge: EdgeId) -> Rectangle {
        let path = self.relationship_path(edge);
        let step_up = is_step_up(line_of(&path));
        let outline = self
            .outline(edge, &path)
            .into_iter()
            .flat_map(|(a, b)| [a, b])
            .map(|p| Rectangle::new(p.x(), p.y(), 0, 0))
            .fold(Rectangle::new(path[0].x(), path[0].y(), 0, 0), Rectangle::add);
        self.label_slots(edge, &path)
            .iter()
            .map(|slot| self.label_bounds(slot, slot.text, step_up))
            .fold(outline, Rectangle::add)
    }

    /// Returns `true` if `point` is on the relationship line or its arrowheads.
    ///
    /// Points close to either connection point belong to the connected
    /// elements rather than to the relationship.
    pub fn relationship_contains(&self, edge: EdgeId, point: Point) -> bool {
        let path = self.relationship_path(edge);
        let ends = line_of(&path);
        if point.distance(ends.point1()) <= MAX_DISTANCE
            || point.distance(ends.point2()) <= MAX_DISTANCE
        {
            return false;
        }
        self.outline(edge, &path)
            .into_iter()
            .any(|(a, b)| distance_to_segment(point, a, b) <= MAX_DISTANCE)
    }

    /// Non-empty labels of a relationship, wrapped and placed.
    pub fn labels(&self, edge: EdgeId) -> Vec<Label> {
        let path = self.relationship_path(edge);
        let step_up = is_step_up(line_of(&path));
        self.label_slots(edge, &path)
            .iter()
            .filter(|slot| !slot.text.is_empty())
            .map(|slot| {
                let text = self.wrap_label(slot.text, slot.from, slot.to);
                let bounds = self.label_bounds(slot, &text, step_up);
                Label {
                    position: slot.position,
                    text,
                    bounds,
                }
            })
            .collect()
    }

    /// Wraps a label so that it spreads along long, flat segments.
    fn wrap_label(&self, text: &str, from: Point, to: Point) -> String {
        let spacing = self.metrics.dimension(" ");
        let mut line_length = MIN_LABEL_LINE_LENGTH;
        let dx = f64::from((from.x() - to.x()).abs() / spacing.width().max(1));
        let dy = f64::from((from.y() - to.y()).abs() / spacing.height().max(1));
        if dx > 0.0 {
            let angle = (dy / dx).atan().to_degrees();
            let stretched = (dx / 4.0) * (1.0 - angle / 180.0);
            line_length = line_length.max(stretched as usize);
        }
        self.metrics.wrap(text, line_length)
    }

    fn label_bounds(&self, slot: &LabelSlot<'_>, text: &str, step_up: bool) -> Rectangle {
        if text.is_empty() {
            return Rectangle::new(slot.to.x(), slot.to.y(), 0, 0);
        }
        let dimension = self.metrics.dimension(text);
        let (x, y) = attachment_point(
            slot.from,
            slot.to,
            slot.arrow,
            dimension,
            slot.position == LabelPosition::Middle,
            step_up,
        );
        Rectangle::from_origin(
            Point::new(round_half_up(x), round_half_up(y)),
            dimension,
        )
    }
}

fn line_of(path: &[Point]) -> Line {
    Line::new(path[0], path[path.len() - 1])
}

/// Returns `true` when the relationship rises from left to right or falls
/// from right to left.
fn is_step_up(line: Line) -> bool {
    let (p1, p2) = (line.point1(), line.point2());
    (p1.x() < p2.x() && p1.y() > p2.y()) || (p1.x() > p2.x() && p1.y() < p2.y())
}

/// Top left corner of a label of size `dimension` drawn along `from`-`to`.
fn attachment_point(
    from: Point,
    to: Point,
    arrow: ArrowHead,
    dimension: Dimension,
    center: bool,
    step_up: bool,
) -> (f64, f64) {
    let (width, height) = (dimension.width(), dimension.height());
    let mut x_offset = LABEL_GAP;
    let mut y_offset = -LABEL_GAP - f64::from(height);
    let mut attach = (f64::from(to.x()), f64::from(to.y()));

    if center {
        if from.x() > to.x() {
            return attachment_point(to, from, arrow, dimension, center, step_up);
        }
        let middle_y = f64::from(from.y() + to.y()) / 2.0;
        attach = (f64::from(from.x() + to.x()) / 2.0, middle_y);
        if from.x() == to.x() {
            if step_up {
                y_offset = LABEL_GAP;
            }
        } else if from.y() == to.y() {
            if width > (from.x() - to.x()).abs() {
                attach = (f64::from(to.x() + width / 2) + LABEL_GAP, middle_y);
            }
            x_offset = f64::from(-width / 2);
        }
    } else {
        if from.x() < to.x() {
            x_offset = -LABEL_GAP - f64::from(width);
        }
        if from.y() > to.y() {
            y_offset = LABEL_GAP;
        }
        if let Some(arrow_bounds) = arrow.bounds(from, to) {
            if from.y() == to.y() {
                y_offset -= f64::from(arrow_bounds.height()) / 2.0;
            } else if from.x() == to.x() {
                x_offset += f64::from(arrow_bounds.width()) / 2.0;
            }
        }
    }
    (attach.0 + x_offset, attach.1 + y_offset)
}

fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (f64::from(point.x()), f64::from(point.y()));
    let (ax, ay) = (f64::from(a.x()), f64::from(a.y()));
    let (bx, by) = (f64::from(b.x()), f64::from(b.y()));
    let (dx, dy) = (bx - ax, by - ay);
    let length_squared = dx * dx + dy * dy;
    if length_squared == 0.0 {
        return point.distance(a);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / length_squared).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
