//! Geometry of diagram elements.
//!
//! A [`DiagramViewer`] answers every geometric question about a diagram:
//! element bounds, connection points, hit-testing and, through the
//! [`router`](crate::router), relationship paths. It borrows the diagram
//! immutably and never changes it.
//!
//! # Overview
//!
//! - [`DiagramViewer`] - Bounds, connection points and hit-testing
//! - [`TextMetrics`] - Monospace measurement of element and label text
//! - [`BoundsCache`] - Memoised bounds for a single render pass
//! - [`ArrowHead`] - Decorations at relationship ends
//! - [`Label`] - A placed relationship label

mod arrow;
mod cache;
mod relationship;
mod text;

pub use arrow::ArrowHead;
pub use cache::BoundsCache;
pub use relationship::{Label, LabelPosition};
pub use text::TextMetrics;

use metabuilder_core::{
    diagram::Diagram,
    element::{EdgeId, ElementId, NamedElement, NodeId, NodeKind},
    geometry::{Dimension, Direction, Point, Rectangle},
    property::keys,
};

const DEFAULT_WIDTH: i32 = 100;
const DEFAULT_HEIGHT: i32 = 60;
const TOP_INCREMENT: i32 = 20;

const PACKAGE_PADDING: i32 = 10;
const PACKAGE_TOP_HEIGHT: i32 = 20;
const PACKAGE_TOP_WIDTH: i32 = 60;
const PACKAGE_NAME_GAP: i32 = 3;

/// Hit radius of point elements.
const POINT_SELECTION_DISTANCE: f64 = 5.0;

/// Read-only geometric view of a [`Diagram`].
#[derive(Debug, Clone, Copy)]
pub struct DiagramViewer<'a> {
    diagram: &'a Diagram,
    metrics: &'a TextMetrics,
    cache: Option<&'a BoundsCache>,
}

impl<'a> DiagramViewer<'a> {
    pub fn new(diagram: &'a Diagram, metrics: &'a TextMetrics) -> Self {
        Self {
            diagram,
            metrics,
            cache: None,
        }
    }

    /// Memoises named element bounds in `cache`.
    ///
    /// The diagram must not change while the returned viewer is in use.
    pub fn with_cache(mut self, cache: &'a BoundsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    pub fn metrics(&self) -> &'a TextMetrics {
        self.metrics
    }

    /// Bounding box of a named element.
    pub fn bounds(&self, node: NodeId) -> Rectangle {
        let Some(cache) = self.cache else {
            return self.compute_bounds(node);
        };
        if let Some(bounds) = cache.get(node) {
            return bounds;
        }
        let bounds = self.compute_bounds(node);
        cache.insert(node, bounds);
        bounds
    }

    /// Bounding box of any element.
    pub fn element_bounds(&self, id: impl Into<ElementId>) -> Rectangle {
        match id.into() {
            ElementId::Node(node) => self.bounds(node),
            ElementId::Edge(edge) => self.relationship_bounds(edge),
        }
    }

    fn compute_bounds(&self, node: NodeId) -> Rectangle {
        let element = self.diagram.named_element(node);
        match element.kind() {
            NodeKind::Class { .. } => self.class_bounds(element),
            NodeKind::DataType => self.data_type_bounds(element),
            NodeKind::Enumeration => self.enumeration_bounds(element),
            NodeKind::Package => {
                let (top, bottom) = self.package_parts(node);
                top.add(bottom)
            }
            NodeKind::Point => Rectangle::from_origin(element.position(), Dimension::ZERO),
        }
    }

    /// Text of the name compartment, including the stereotype line.
    fn name_text(element: &NamedElement) -> String {
        match element.kind() {
            NodeKind::Class {
                is_abstract: true, ..
            } => format!("\u{ab}abstract\u{bb}\n{}", element.name()),
            NodeKind::Class {
                is_interface: true, ..
            } => format!("\u{ab}interface\u{bb}\n{}", element.name()),
            _ => element.name().to_string(),
        }
    }

    /// Height of the name compartment given the height of the others.
    ///
    /// The name compartment absorbs the space the other compartments leave
    /// free below the default height.
    fn name_box_height(&self, name_text: &str, content_height: i32) -> i32 {
        let text_height = self
            .metrics
            .padded_dimension(name_text)
            .height()
            .max(TOP_INCREMENT);
        let free_space = DEFAULT_HEIGHT - text_height;
        if free_space < 0 || content_height > free_space {
            text_height
        } else {
            text_height + free_space - content_height
        }
    }

    fn compartment_bounds(&self, element: &NamedElement, compartments: &[&str]) -> Rectangle {
        let name_text = Self::name_text(element);
        let dimensions: Vec<Dimension> = compartments
            .iter()
            .map(|text| self.metrics.padded_dimension(text))
            .collect();
        let content_height: i32 = dimensions.iter().map(|d| d.height()).sum();
        let name_height = self.name_box_height(&name_text, content_height);
        let width = dimensions
            .iter()
            .map(|d| d.width())
            .fold(
                DEFAULT_WIDTH.max(self.metrics.padded_dimension(&name_text).width()),
                i32::max,
            );
        Rectangle::from_origin(
            element.position(),
            Dimension::new(width, content_height + name_height),
        )
    }

    fn class_bounds(&self, element: &NamedElement) -> Rectangle {
        let properties = element.properties();
        self.compartment_bounds(
            element,
            &[
                properties.value(keys::ATTRIBUTES),
                properties.value(keys::METHODS),
            ],
        )
    }

    fn data_type_bounds(&self, element: &NamedElement) -> Rectangle {
        self.compartment_bounds(element, &[])
    }

    fn enumeration_bounds(&self, element: &NamedElement) -> Rectangle {
        let literals = element.properties().value(keys::LITERALS);
        self.compartment_bounds(element, &[literals])
    }

    fn package_top_dimension(&self, element: &NamedElement) -> Dimension {
        let name = self.metrics.padded_dimension(element.name());
        Dimension::new(
            (name.width() + 2 * PACKAGE_NAME_GAP).max(PACKAGE_TOP_WIDTH),
            (name.height() - 2 * PACKAGE_NAME_GAP).max(PACKAGE_TOP_HEIGHT),
        )
    }

    fn children_bounds(&self, element: &NamedElement) -> Option<Rectangle> {
        element
            .children()
            .iter()
            .map(|&child| self.bounds(child))
            .reduce(Rectangle::add)
    }

    /// The tab and body rectangles of a package.
    ///
    /// A package with children wraps them: its position follows the
    /// children rather than the stored position.
    fn package_parts(&self, node: NodeId) -> (Rectangle, Rectangle) {
        let element = self.diagram.named_element(node);
        let top = self.package_top_dimension(element);
        let children = self.children_bounds(element);
        let position = match children {
            Some(children) => Point::new(
                children.x() - PACKAGE_PADDING,
                children.y() - PACKAGE_PADDING - top.height(),
            ),
            None => element.position(),
        };

        let mut width = DEFAULT_WIDTH;
        let mut height = DEFAULT_HEIGHT;
        if let Some(children) = children {
            width = width.max(children.max_x() + PACKAGE_PADDING - position.x());
            height = height.max(children.max_y() + PACKAGE_PADDING - position.y() - top.height());
        }
        width = width.max(top.width() + (DEFAULT_WIDTH - PACKAGE_TOP_WIDTH));

        (
            Rectangle::from_origin(position, top),
            Rectangle::new(position.x(), position.y() + top.height(), width, height),
        )
    }

    /// Top right corner of an element's outline, where self-relationships
    /// are anchored.
    pub fn top_right_corner(&self, node: NodeId) -> Point {
        let bounds = match self.diagram.named_element(node).kind() {
            NodeKind::Package => self.package_parts(node).1,
            _ => self.bounds(node),
        };
        Point::new(bounds.max_x(), bounds.y())
    }

    /// Point on the outline of an element facing `direction`.
    pub fn connection_point(&self, node: NodeId, direction: Direction) -> Point {
        let element = self.diagram.named_element(node);
        match element.kind() {
            NodeKind::Point => element.position(),
            NodeKind::Package => self.package_connection_point(node, direction),
            _ => side_midpoint(self.bounds(node), direction),
        }
    }

    fn package_connection_point(&self, node: NodeId, direction: Direction) -> Point {
        let (top, bottom) = self.package_parts(node);
        let bounds = top.add(bottom);
        let point = side_midpoint(bounds, direction);
        if point.y() < bottom.y() && top.max_x() < point.x() {
            // The point falls in the empty area right of the tab: slide it
            // down the diagonal onto the top edge of the body.
            let delta = top.height() * (point.x() - bounds.center().x()) * 2 / bounds.height();
            let mut x = point.x() - delta;
            if x < top.max_x() {
                x = top.max_x() + 1;
            }
            Point::new(x, bottom.y())
        } else {
            point
        }
    }

    /// Returns `true` if `point` hits the named element.
    pub fn contains(&self, node: NodeId, point: Point) -> bool {
        let element = self.diagram.named_element(node);
        match element.kind() {
            NodeKind::Point => element.position().distance(point) < POINT_SELECTION_DISTANCE,
            _ => self.bounds(node).contains(point),
        }
    }

    /// Returns `true` if `point` hits the element.
    pub fn element_contains(&self, id: impl Into<ElementId>, point: Point) -> bool {
        match id.into() {
            ElementId::Node(node) => self.contains(node, point),
            ElementId::Edge(edge) => self.relationship_contains(edge, point),
        }
    }

    /// The named element under `point`.
    ///
    /// Among root elements the last match wins. Inside a package the first
    /// matching child is preferred over the package itself.
    pub fn element_at(&self, point: Point) -> Option<NodeId> {
        self.diagram
            .root_elements()
            .iter()
            .filter_map(|&root| self.deep_find(root, point))
            .last()
    }

    fn deep_find(&self, node: NodeId, point: Point) -> Option<NodeId> {
        let element = self.diagram.named_element(node);
        if element.kind().is_package() {
            let child = element
                .children()
                .iter()
                .find_map(|&child| self.deep_find(child, point));
            if child.is_some() {
                return child;
            }
        }
        self.contains(node, point).then_some(node)
    }

    /// The first relationship hit by `point`.
    pub fn relationship_at(&self, point: Point) -> Option<EdgeId> {
        self.diagram
            .relationships()
            .iter()
            .copied()
            .find(|&edge| self.relationship_contains(edge, point))
    }

    /// Union of all element and relationship bounds.
    ///
    /// An empty diagram has bounds `(0, 0, 0, 0)`.
    pub fn diagram_bounds(&self) -> Rectangle {
        let nodes = self
            .diagram
            .root_elements()
            .iter()
            .map(|&node| self.bounds(node));
        let edges = self
            .diagram
            .relationships()
            .iter()
            .map(|&edge| self.relationship_bounds(edge));
        nodes
            .chain(edges)
            .reduce(Rectangle::add)
            .unwrap_or_default()
    }

    /// Elements whose bounds lie entirely inside `area`.
    ///
    /// Named elements are reported in paint order, followed by
    /// relationships in diagram order.
    pub fn elements_within(&self, area: Rectangle) -> Vec<ElementId> {
        let nodes = self
            .diagram
            .all_named_elements()
            .into_iter()
            .filter(|&node| area.contains_rect(self.bounds(node)))
            .map(ElementId::from);
        let edges = self
            .diagram
            .relationships()
            .iter()
            .copied()
            .filter(|&edge| area.contains_rect(self.relationship_bounds(edge)))
            .map(ElementId::from);
        nodes.chain(edges).collect()
    }

    /// Returns `true` if the bounds of `node` intersect those of another
    /// root element.
    pub fn is_overlapping(&self, node: NodeId) -> bool {
        let bounds = self.bounds(node);
        self.diagram
            .root_elements()
            .iter()
            .filter(|&&other| other != node)
            .any(|&other| intersects(bounds, self.bounds(other)))
    }
}

/// Midpoint of the side of `bounds` facing `direction`.
fn side_midpoint(bounds: Rectangle, direction: Direction) -> Point {
    let center = bounds.center();
    match direction {
        Direction::North => Point::new(center.x(), bounds.y()),
        Direction::South => Point::new(center.x(), bounds.max_y()),
        Direction::East => Point::new(bounds.max_x(), center.y()),
        Direction::West => Point::new(bounds.x(), center.y()),
    }
}

/// Rounds half up, the way screen coordinates are snapped.
pub(crate) fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn intersects(a: Rectangle, b: Rectangle) -> bool {
    a.x() < b.max_x() && b.x() < a.max_x() && a.y() < b.max_y() && b.y() < a.max_y()
}

#[cfg(test)]
mod tests {
    use metabuilder_core::element::EdgeKind;

    use super::*;

    fn diagram_with(kind: NodeKind, x: i32, y: i32) -> (Diagram, NodeId) {
        let mut diagram = Diagram::new();
        let node = diagram.create_named_element(kind);
        diagram.translate(node, x, y);
        diagram.add_named_element(node);
        (diagram, node)
    }

    #[test]
    fn test_class_default_bounds() {
        let metrics = TextMetrics::default();
        let (diagram, node) = diagram_with(NodeKind::CLASS, 10, 20);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.bounds(node), Rectangle::new(10, 20, 100, 60));
    }

    #[test]
    fn test_class_grows_with_compartments() {
        let metrics = TextMetrics::default();
        let (mut diagram, node) = diagram_with(NodeKind::CLASS, 0, 0);
        diagram
            .properties_mut(node)
            .set(keys::ATTRIBUTES, "a\nb\nc");
        diagram.properties_mut(node).set(keys::METHODS, "m()");
        let viewer = DiagramViewer::new(&diagram, &metrics);
        // name 20, attributes 3*16+12, methods 16+12
        assert_eq!(viewer.bounds(node), Rectangle::new(0, 0, 100, 108));
    }

    #[test]
    fn test_interface_name_has_stereotype() {
        let metrics = TextMetrics::default();
        let (mut diagram, node) = diagram_with(NodeKind::INTERFACE, 0, 0);
        diagram
            .properties_mut(node)
            .set(keys::NAME, "AVeryLongInterfaceName");
        let viewer = DiagramViewer::new(&diagram, &metrics);
        let bounds = viewer.bounds(node);
        assert_eq!(bounds.width(), 22 * 7 + 14);
        assert_eq!(bounds.height(), 60);
    }

    #[test]
    fn test_empty_package_bounds() {
        let metrics = TextMetrics::default();
        let (diagram, node) = diagram_with(NodeKind::Package, 0, 0);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.bounds(node), Rectangle::new(0, 0, 100, 80));
        assert_eq!(viewer.top_right_corner(node), Point::new(100, 20));
    }

    #[test]
    fn test_package_wraps_children() {
        let metrics = TextMetrics::default();
        let (mut diagram, package) = diagram_with(NodeKind::Package, 0, 0);
        let child = diagram.create_named_element(NodeKind::CLASS);
        diagram.translate(child, 10, 30);
        diagram.add_child(package, child);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        // child 10..110 x 30..90, padding 10 on every side
        assert_eq!(viewer.bounds(package), Rectangle::new(0, 0, 120, 100));
    }

    #[test]
    fn test_package_connection_point_avoids_tab_gap() {
        let metrics = TextMetrics::default();
        let (mut diagram, package) = diagram_with(NodeKind::Package, 0, 0);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(
            viewer.connection_point(package, Direction::North),
            Point::new(50, 0)
        );
        assert_eq!(
            viewer.connection_point(package, Direction::East),
            Point::new(100, 40)
        );

        for x in [10, 200] {
            let child = diagram.create_named_element(NodeKind::CLASS);
            diagram.translate(child, x, 30);
            diagram.add_child(package, child);
        }
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.bounds(package), Rectangle::new(0, 0, 310, 100));
        assert_eq!(
            viewer.connection_point(package, Direction::North),
            Point::new(155, 20)
        );
    }

    #[test]
    fn test_point_element_geometry() {
        let metrics = TextMetrics::default();
        let (diagram, node) = diagram_with(NodeKind::Point, 40, 40);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.bounds(node), Rectangle::new(40, 40, 0, 0));
        assert!(viewer.contains(node, Point::new(43, 43)));
        assert!(!viewer.contains(node, Point::new(44, 44)));
        assert_eq!(
            viewer.connection_point(node, Direction::West),
            Point::new(40, 40)
        );
    }

    #[test]
    fn test_element_at_prefers_last_root_and_first_child() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let bottom = diagram.create_named_element(NodeKind::CLASS);
        let top = diagram.create_named_element(NodeKind::CLASS);
        diagram.add_named_element(bottom);
        diagram.add_named_element(top);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.element_at(Point::new(5, 5)), Some(top));
        assert_eq!(viewer.element_at(Point::new(500, 500)), None);

        let mut diagram = Diagram::new();
        let package = diagram.create_named_element(NodeKind::Package);
        let child = diagram.create_named_element(NodeKind::CLASS);
        diagram.translate(child, 10, 30);
        diagram.add_named_element(package);
        diagram.add_child(package, child);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.element_at(Point::new(20, 40)), Some(child));
        assert_eq!(viewer.element_at(Point::new(2, 2)), Some(package));
    }

    #[test]
    fn test_diagram_bounds() {
        let metrics = TextMetrics::default();
        let diagram = Diagram::new();
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.diagram_bounds(), Rectangle::new(0, 0, 0, 0));

        let mut diagram = Diagram::new();
        let a = diagram.create_named_element(NodeKind::CLASS);
        let b = diagram.create_named_element(NodeKind::CLASS);
        diagram.translate(b, 300, 0);
        diagram.add_named_element(a);
        diagram.add_named_element(b);
        let edge = diagram.create_relationship(EdgeKind::Generalization);
        diagram.connect(edge, a, b);
        diagram.add_relationship(edge);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(viewer.diagram_bounds(), Rectangle::new(0, 0, 400, 60));
    }

    #[test]
    fn test_elements_within() {
        let metrics = TextMetrics::default();
        let mut diagram = Diagram::new();
        let a = diagram.create_named_element(NodeKind::CLASS);
        let b = diagram.create_named_element(NodeKind::CLASS);
        diagram.translate(b, 300, 300);
        diagram.add_named_element(a);
        diagram.add_named_element(b);
        let viewer = DiagramViewer::new(&diagram, &metrics);
        assert_eq!(
            viewer.elements_within(Rectangle::new(0, 0, 200, 200)),
            vec![ElementId::from(a)]
        );
        assert!(!viewer.is_overlapping(a));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
    }

    #[test]
    fn test_cache_memoises_bounds() {
        let metrics = TextMetrics::default();
        let (diagram, node) = diagram_with(NodeKind::CLASS, 0, 0);
        let cache = BoundsCache::new();
        let viewer = DiagramViewer::new(&diagram, &metrics).with_cache(&cache);
        assert!(cache.is_empty());
        let bounds = viewer.bounds(node);
        assert_eq!(cache.get(node), Some(bounds));
        assert_eq!(cache.len(), 1);
    }
}
