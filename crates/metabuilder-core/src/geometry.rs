//! Geometric primitives for element placement and hit-testing.
//!
//! All coordinates are integers in diagram space. Element bounds, connection
//! points and relationship paths are snapped to whole pixels, so every
//! midpoint computation in this crate and its dependents uses integer
//! division.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Dimension`] - Width and height of a box
//! - [`Rectangle`] - An axis-aligned box anchored at its top-left corner
//! - [`Line`] - A pair of points, typically the two connection points of a relationship
//! - [`Direction`] - One of the four compass directions used for connection points
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! The origin is the top-left corner of the canvas and Y grows downward.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use metabuilder_core::geometry::Point;
/// let p = Point::new(10, 20).translated(5, -5);
/// assert_eq!(p, Point::new(15, 15));
/// assert_eq!(Point::new(0, 0).distance(Point::new(3, 4)), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> i32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> i32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: i32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: i32) -> Self {
        self.y = y;
        self
    }

    /// Returns this point shifted by `(dx, dy)`
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Point) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    width: i32,
    height: i32,
}

impl Dimension {
    /// A dimension with no extent.
    pub const ZERO: Dimension = Dimension {
        width: 0,
        height: 0,
    };

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> i32 {
        self.width
    }

    pub fn height(self) -> i32 {
        self.height
    }

    /// Component-wise maximum of two dimensions
    pub fn max(self, other: Dimension) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Grows both sides by the given amounts on each edge.
    pub fn include(self, horizontal: i32, vertical: i32) -> Self {
        Self {
            width: self.width + 2 * horizontal,
            height: self.height + 2 * vertical,
        }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
///
/// Containment is inclusive on all four edges, so a zero-size rectangle
/// contains exactly its origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0, "rectangle extent must be non-negative");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle whose top-left corner is `origin`.
    pub fn from_origin(origin: Point, dimension: Dimension) -> Self {
        Self::new(origin.x(), origin.y(), dimension.width(), dimension.height())
    }

    pub fn x(self) -> i32 {
        self.x
    }

    pub fn y(self) -> i32 {
        self.y
    }

    pub fn width(self) -> i32 {
        self.width
    }

    pub fn height(self) -> i32 {
        self.height
    }

    pub fn max_x(self) -> i32 {
        self.x + self.width
    }

    pub fn max_y(self) -> i32 {
        self.y + self.height
    }

    /// Returns the top-left corner
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn dimension(self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    /// Returns the center, rounded toward the origin
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Returns `true` if `point` lies inside or on the border of this rectangle.
    pub fn contains(self, point: Point) -> bool {
        point.x() >= self.x
            && point.x() <= self.max_x()
            && point.y() >= self.y
            && point.y() <= self.max_y()
    }

    /// Returns `true` if `other` lies completely inside this rectangle.
    pub fn contains_rect(self, other: Rectangle) -> bool {
        self.contains(other.origin()) && self.contains(Point::new(other.max_x(), other.max_y()))
    }

    /// Smallest rectangle enclosing both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// # use metabuilder_core::geometry::Rectangle;
    /// let union = Rectangle::new(0, 0, 10, 10).add(Rectangle::new(20, 5, 10, 10));
    /// assert_eq!(union, Rectangle::new(0, 0, 30, 15));
    /// ```
    pub fn add(self, other: Rectangle) -> Self {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Smallest rectangle enclosing this rectangle and `point`.
    pub fn add_point(self, point: Point) -> Self {
        self.add(Rectangle::new(point.x(), point.y(), 0, 0))
    }

    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// A segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    point1: Point,
    point2: Point,
}

impl Line {
    pub fn new(point1: Point, point2: Point) -> Self {
        Self { point1, point2 }
    }

    pub fn point1(self) -> Point {
        self.point1
    }

    pub fn point2(self) -> Point {
        self.point2
    }
}

/// Compass direction used to pick a connection point on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// The opposite direction
    pub fn mirrored(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn rectangle_strategy() -> impl Strategy<Value = Rectangle> {
        (-1000i32..1000, -1000i32..1000, 0i32..500, 0i32..500)
            .prop_map(|(x, y, w, h)| Rectangle::new(x, y, w, h))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000i32..1000, -1000i32..1000).prop_map(|(x, y)| Point::new(x, y))
    }

    /// The union should contain both operands.
    fn check_add_contains_both(r1: Rectangle, r2: Rectangle) -> Result<(), TestCaseError> {
        let union = r1.add(r2);
        prop_assert!(union.contains_rect(r1));
        prop_assert!(union.contains_rect(r2));
        Ok(())
    }

    /// Union is commutative.
    fn check_add_is_commutative(r1: Rectangle, r2: Rectangle) -> Result<(), TestCaseError> {
        prop_assert_eq!(r1.add(r2), r2.add(r1));
        Ok(())
    }

    /// A rectangle always contains its own center.
    fn check_contains_center(rect: Rectangle) -> Result<(), TestCaseError> {
        prop_assert!(rect.contains(rect.center()));
        Ok(())
    }

    /// Translating moves the origin and keeps the extent.
    fn check_translated_keeps_dimension(
        rect: Rectangle,
        offset: Point,
    ) -> Result<(), TestCaseError> {
        let moved = rect.translated(offset.x(), offset.y());
        prop_assert_eq!(moved.dimension(), rect.dimension());
        prop_assert_eq!(moved.origin(), rect.origin().translated(offset.x(), offset.y()));
        Ok(())
    }

    proptest! {
        #[test]
        fn add_contains_both(r1 in rectangle_strategy(), r2 in rectangle_strategy()) {
            check_add_contains_both(r1, r2)?;
        }

        #[test]
        fn add_is_commutative(r1 in rectangle_strategy(), r2 in rectangle_strategy()) {
            check_add_is_commutative(r1, r2)?;
        }

        #[test]
        fn contains_center(rect in rectangle_strategy()) {
            check_contains_center(rect)?;
        }

        #[test]
        fn translated_keeps_dimension(rect in rectangle_strategy(), offset in point_strategy()) {
            check_translated_keeps_dimension(rect, offset)?;
        }
    }
}
