use std::f64::consts::PI;

use metabuilder_core::geometry::{Point, Rectangle};

use super::round_half_up as round;

const ARROW_LENGTH: f64 = 10.0;
const ARROW_ANGLE: f64 = PI / 6.0;

/// Decoration drawn at one end of a relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrowHead {
    #[default]
    None,
    Triangle,
    BlackTriangle,
    V,
    Diamond,
    BlackDiamond,
}

impl ArrowHead {
    /// Outline segments of the arrowhead pointing at `end`.
    ///
    /// `axis` is any point on the axis of the arrow, usually the previous
    /// point of the relationship path.
    pub fn segments(self, axis: Point, end: Point) -> Vec<(Point, Point)> {
        if self == ArrowHead::None {
            return Vec::new();
        }

        let angle = f64::from(end.y() - axis.y()).atan2(f64::from(end.x() - axis.x()));
        let barb = |from: Point, angle: f64| {
            Point::new(
                round(f64::from(from.x()) - ARROW_LENGTH * angle.cos()),
                round(f64::from(from.y()) - ARROW_LENGTH * angle.sin()),
            )
        };
        let p1 = barb(end, angle + ARROW_ANGLE);
        let p2 = barb(end, angle - ARROW_ANGLE);

        match self {
            ArrowHead::None => Vec::new(),
            ArrowHead::V => vec![(end, p1), (p2, end)],
            ArrowHead::Triangle | ArrowHead::BlackTriangle => {
                vec![(end, p1), (p1, p2), (p2, end)]
            }
            ArrowHead::Diamond | ArrowHead::BlackDiamond => {
                let p3 = barb(p2, angle + ARROW_ANGLE);
                vec![(end, p1), (p1, p3), (p3, p2), (p2, end)]
            }
        }
    }

    /// Bounding box of the arrowhead outline, if it has one.
    pub fn bounds(self, axis: Point, end: Point) -> Option<Rectangle> {
        self.segments(axis, end)
            .into_iter()
            .flat_map(|(a, b)| [a, b])
            .map(|p| Rectangle::new(p.x(), p.y(), 0, 0))
            .reduce(Rectangle::add)
    }
}
