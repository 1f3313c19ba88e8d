//! Turns edit intents into validated, reversible operations.
//!
//! The [`DiagramBuilder`] only reads the diagram. Each `create_*` method
//! returns an [`Operation`] that the caller executes (and later undoes);
//! nothing happens to the diagram until then. Intents that cannot be
//! carried out are reported by the matching `can_*` query, and the
//! `create_*` method returns `None` for them.
//!
//! Elements handed to the builder for insertion are created standalone in
//! the diagram arena first:
//!
//! ```
//! # use metabuilder::{builder::DiagramBuilder, operation::DiagramOperation};
//! # use metabuilder_core::{diagram::Diagram, element::NodeKind, geometry::Point};
//! let mut diagram = Diagram::new();
//! let builder = DiagramBuilder::default();
//!
//! let class = diagram.create_named_element(NodeKind::CLASS);
//! let mut add = builder
//!     .create_add_element_operation(&diagram, class, Point::new(950, 20))
//!     .expect("a new element can always be added");
//! add.execute(&mut diagram);
//! // Clipped so that the element fits the 1000x1000 canvas.
//! assert_eq!(diagram.named_element(class).position(), Point::new(900, 20));
//!
//! add.undo(&mut diagram);
//! assert!(diagram.root_elements().is_empty());
//! ```

use std::cmp::Reverse;

use indexmap::IndexSet;
use log::{debug, trace};

use metabuilder_core::{
    diagram::Diagram,
    element::{EdgeId, ElementId, NodeId},
    geometry::{Dimension, Point},
};

use crate::{
    config::AppConfig,
    constraint::{Candidate, ConstraintSet, max_relationships},
    operation::{CompoundOperation, Edit, Operation},
    viewer::{DiagramViewer, TextMetrics},
};

/// Gap between a package outline and its first child.
const PADDING: i32 = 10;

/// Height reserved for the package tab above its first child.
const TOP_HEIGHT: i32 = 20;

const DEFAULT_CANVAS_SIZE: i32 = 1000;

/// Builds operations for a class diagram.
#[derive(Debug)]
pub struct DiagramBuilder {
    canvas: Dimension,
    metrics: TextMetrics,
    constraints: ConstraintSet,
}

impl Default for DiagramBuilder {
    /// A 1000x1000 canvas, default text metrics and at most one relationship
    /// of each kind between the same ordered pair of elements.
    fn default() -> Self {
        Self::new(
            Dimension::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE),
            TextMetrics::default(),
        )
    }
}

impl DiagramBuilder {
    /// Creates a builder with the default relationship constraints.
    pub fn new(canvas: Dimension, metrics: TextMetrics) -> Self {
        Self {
            canvas,
            metrics,
            constraints: ConstraintSet::new().with(max_relationships(1)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.canvas().dimension(), *config.text())
    }

    /// Replaces the relationship constraints.
    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn canvas(&self) -> Dimension {
        self.canvas
    }

    pub fn set_canvas(&mut self, canvas: Dimension) {
        self.canvas = canvas;
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    fn viewer<'a>(&'a self, diagram: &'a Diagram) -> DiagramViewer<'a> {
        DiagramViewer::new(diagram, &self.metrics)
    }

    /// Returns `true` if `node` is a standalone element that can be placed.
    pub fn can_add_element(&self, diagram: &Diagram, node: NodeId, _point: Point) -> bool {
        !diagram.contains(node) && !diagram.named_element(node).has_parent()
    }

    /// Adds `node` at `point`.
    ///
    /// A point inside a package makes the element a child of the deepest
    /// package there. The first child of a package is placed just below
    /// the package tab. Placements are clipped so that the element fits
    /// the canvas.
    pub fn create_add_element_operation(
        &self,
        diagram: &Diagram,
        node: NodeId,
        point: Point,
    ) -> Option<Operation> {
        if !self.can_add_element(diagram, node, point) {
            return None;
        }
        let viewer = self.viewer(diagram);
        let container = find_container(&viewer, diagram.root_elements(), point);

        let mut compound = CompoundOperation::new();
        match container {
            Some(package) => {
                let element = diagram.named_element(package);
                let requested = if element.children().is_empty() {
                    element.position().translated(PADDING, PADDING + TOP_HEIGHT)
                } else {
                    point
                };
                compound.push(self.position_element(&viewer, node, requested));
                compound.push(Edit::add_child(package, node));
                debug!(node:%, package:%; "Adding element to package");
            }
            None => {
                compound.push(self.position_element(&viewer, node, point));
                compound.push(Edit::add_root(node));
                debug!(node:%; "Adding root element");
            }
        }
        Some(compound.into())
    }

    /// Moves `node` so that its bounds start as close to `requested` as
    /// the canvas allows.
    fn position_element(&self, viewer: &DiagramViewer<'_>, node: NodeId, requested: Point) -> Edit {
        let bounds = viewer.bounds(node);
        let x = requested
            .x()
            .min(self.canvas.width() - bounds.width())
            .max(0);
        let y = requested
            .y()
            .min(self.canvas.height() - bounds.height())
            .max(0);
        Edit::translate(node, x - bounds.x(), y - bounds.y())
    }

    /// Adds previously built elements as they are, e.g. pasted ones.
    ///
    /// Named elements become roots. Relationships are reconnected to their
    /// current endpoints, which must be in the diagram by the time the
    /// relationship is added.
    pub fn create_add_elements_operation(&self, diagram: &Diagram, elements: &[ElementId]) -> Operation {
        let compound: CompoundOperation = elements
            .iter()
            .map(|&element| match element {
                ElementId::Node(node) => Edit::add_root(node),
                ElementId::Edge(edge) => {
                    let (start, end) = diagram.relationship(edge).endpoints();
                    Edit::add_relationship(edge, start, end)
                }
            })
            .collect();
        debug!(elements = compound.len(); "Adding elements");
        compound.into()
    }

    /// Translates a named element with its subtree.
    pub fn create_move_element_operation(&self, node: NodeId, dx: i32, dy: i32) -> Operation {
        Edit::translate(node, dx, dy).into()
    }

    pub fn create_set_property_operation(
        &self,
        element: impl Into<ElementId>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Operation {
        Edit::set_property(element, key, value).into()
    }

    /// Brings `node` and its ancestors in front of their siblings.
    pub fn create_place_on_top_operation(&self, node: NodeId) -> Operation {
        Edit::place_on_top(node).into()
    }

    fn candidate(&self, diagram: &Diagram, edge: EdgeId, start: Point, end: Point) -> Option<Candidate> {
        let viewer = self.viewer(diagram);
        let start_node = viewer.element_at(start)?;
        let end_node = viewer.element_at(end)?;
        Some(Candidate::new(
            diagram.relationship(edge).kind(),
            (start_node, start),
            (end_node, end),
        ))
    }

    fn accepts(&self, diagram: &Diagram, candidate: &Candidate) -> bool {
        let accepted = self.constraints.satisfied(candidate, diagram);
        if !accepted {
            trace!(candidate:?; "Relationship rejected by constraints");
        }
        accepted
    }

    /// Returns `true` if `edge` can connect the elements under `start` and
    /// `end`.
    pub fn can_add_relationship(&self, diagram: &Diagram, edge: EdgeId, start: Point, end: Point) -> bool {
        self.candidate(diagram, edge, start, end)
            .is_some_and(|candidate| self.accepts(diagram, &candidate))
    }

    /// Connects `edge` to the elements under `start` and `end` and adds it.
    pub fn create_add_relationship_operation(
        &self,
        diagram: &Diagram,
        edge: EdgeId,
        start: Point,
        end: Point,
    ) -> Option<Operation> {
        let candidate = self.candidate(diagram, edge, start, end)?;
        if !self.accepts(diagram, &candidate) {
            return None;
        }
        debug!(edge:%, start:% = candidate.start(), end:% = candidate.end(); "Adding relationship");
        Some(Edit::add_relationship(edge, candidate.start(), candidate.end()).into())
    }

    fn element_candidate(&self, diagram: &Diagram, edge: EdgeId, start: NodeId, end: NodeId) -> Candidate {
        let viewer = self.viewer(diagram);
        Candidate::new(
            diagram.relationship(edge).kind(),
            (start, viewer.bounds(start).center()),
            (end, viewer.bounds(end).center()),
        )
    }

    /// Returns `true` if `edge` can connect `start` to `end`.
    ///
    /// Both elements must be in the diagram.
    pub fn can_connect(&self, diagram: &Diagram, edge: EdgeId, start: NodeId, end: NodeId) -> bool {
        diagram.contains(start)
            && diagram.contains(end)
            && self.accepts(diagram, &self.element_candidate(diagram, edge, start, end))
    }

    /// Connects `edge` to `start` and `end` and adds it.
    pub fn create_connect_operation(
        &self,
        diagram: &Diagram,
        edge: EdgeId,
        start: NodeId,
        end: NodeId,
    ) -> Option<Operation> {
        if !self.can_connect(diagram, edge, start, end) {
            return None;
        }
        debug!(edge:%, start:%, end:%; "Connecting relationship");
        Some(Edit::add_relationship(edge, start, end).into())
    }

    /// Removes `elements` together with every relationship that would be
    /// left dangling.
    ///
    /// Removing a named element also removes the relationships touching it
    /// or any of its descendants; for point elements these are all the
    /// relationships they anchor. Undoing puts every element back at the
    /// index it occupied.
    ///
    /// # Panics
    ///
    /// Panics if one of `elements` is not in the diagram.
    pub fn create_remove_elements_operation(&self, diagram: &Diagram, elements: &[ElementId]) -> Operation {
        let mut closure: IndexSet<ElementId> = IndexSet::new();
        for &element in elements {
            closure.extend(co_removals(diagram, element));
        }

        let compound: CompoundOperation = removal_order(diagram, closure)
            .into_iter()
            .map(|element| match element {
                ElementId::Edge(edge) => Edit::remove_relationship(edge),
                ElementId::Node(node) => match diagram.named_element(node).parent() {
                    // Only a package losing its last child at the time of the
                    // request is re-anchored.
                    Some(package) if diagram.named_element(package).children().len() == 1 => {
                        Edit::detach_child_reanchored(node, self.metrics)
                    }
                    Some(_) => Edit::detach_child(node),
                    None => Edit::remove_root(node),
                },
            })
            .collect();
        debug!(requested = elements.len(), removed = compound.len(); "Removing elements");
        compound.into()
    }

    /// The package `nodes` would be linked to.
    ///
    /// The package lies under the position of the first node. It must not
    /// be one of `nodes` nor already contain one of them.
    fn package_to_link(&self, diagram: &Diagram, nodes: &[NodeId]) -> Option<NodeId> {
        let first = nodes.first()?;
        let candidates: Vec<NodeId> = diagram
            .root_elements()
            .iter()
            .copied()
            .filter(|root| !nodes.contains(root))
            .collect();
        let point = diagram.named_element(*first).position();
        let package = find_container(&self.viewer(diagram), &candidates, point)?;
        let children = diagram.named_element(package).children();
        let clashes = nodes
            .iter()
            .any(|node| *node == package || children.contains(node));
        (!clashes).then_some(package)
    }

    /// Returns `true` if `nodes` are root elements with a package under
    /// the first of them to move into.
    ///
    /// An empty list cannot be linked.
    pub fn can_link_to_package(&self, diagram: &Diagram, nodes: &[NodeId]) -> bool {
        !nodes.is_empty()
            && nodes
                .iter()
                .all(|&node| diagram.contains(node) && !diagram.named_element(node).has_parent())
            && self.package_to_link(diagram, nodes).is_some()
    }

    /// Moves root elements into the package under the first of them.
    pub fn create_link_to_package_operation(&self, diagram: &Diagram, nodes: &[NodeId]) -> Option<Operation> {
        if !self.can_link_to_package(diagram, nodes) {
            return None;
        }
        let package = self.package_to_link(diagram, nodes)?;
        let mut compound = CompoundOperation::new();
        for &node in nodes {
            compound.push(Edit::remove_root(node));
            compound.push(Edit::add_child(package, node));
        }
        debug!(package:%, elements = nodes.len(); "Linking elements to package");
        Some(compound.into())
    }

    fn shared_parent(&self, diagram: &Diagram, nodes: &[NodeId]) -> Option<NodeId> {
        let first = nodes.first()?;
        let parent = diagram.named_element(*first).parent()?;
        nodes
            .iter()
            .all(|&node| diagram.named_element(node).parent() == Some(parent))
            .then_some(parent)
    }

    /// Returns `true` if all of `nodes` share the same parent package.
    ///
    /// An empty list cannot be unlinked.
    pub fn can_unlink_from_package(&self, diagram: &Diagram, nodes: &[NodeId]) -> bool {
        self.shared_parent(diagram, nodes).is_some()
    }

    /// Moves `nodes` out of their parent, into the parent's own parent or
    /// to the root sequence.
    pub fn create_unlink_from_package_operation(
        &self,
        diagram: &Diagram,
        nodes: &[NodeId],
    ) -> Option<Operation> {
        let parent = self.shared_parent(diagram, nodes)?;
        let outer = diagram.named_element(parent).parent();
        let mut compound = CompoundOperation::new();
        for &node in nodes {
            compound.push(Edit::detach_child(node));
            compound.push(match outer {
                Some(outer) => Edit::add_child(outer, node),
                None => Edit::add_root(node),
            });
        }
        debug!(package:% = parent, elements = nodes.len(); "Unlinking elements from package");
        Some(compound.into())
    }
}

/// The deepest package under `point`, searching `nodes` and their
/// descendants.
///
/// When packages overlap, the last one in the list wins, at every level.
pub fn find_container(viewer: &DiagramViewer<'_>, nodes: &[NodeId], point: Point) -> Option<NodeId> {
    let diagram = viewer.diagram();
    let container = nodes
        .iter()
        .copied()
        .filter(|&node| diagram.named_element(node).kind().is_package())
        .filter(|&node| viewer.contains(node, point))
        .last()?;
    let children = diagram.named_element(container).children();
    if children.is_empty() {
        return Some(container);
    }
    find_container(viewer, children, point).or(Some(container))
}

/// `element` and the relationships that must go with it.
fn co_removals(diagram: &Diagram, element: ElementId) -> Vec<ElementId> {
    assert!(diagram.contains(element), "{element} is not in the diagram");
    let mut result = vec![element];
    if let ElementId::Node(node) = element {
        let descendants = diagram.descendants(node);
        result.extend(
            diagram
                .relationships()
                .iter()
                .copied()
                .filter(|&edge| {
                    let relationship = diagram.relationship(edge);
                    [relationship.start(), relationship.end()]
                        .into_iter()
                        .flatten()
                        .any(|end| descendants.contains(&end))
                })
                .map(ElementId::from),
        );
    }
    result
}

/// Sibling indices leading from the root sequence down to `node`.
fn containment_path(diagram: &Diagram, node: NodeId) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = Some(node);
    while let Some(node) = current {
        if let Some(index) = diagram.sibling_index(node) {
            path.push(index);
        }
        current = diagram.named_element(node).parent();
    }
    path.reverse();
    path
}

/// Orders a removal closure so that undoing it in reverse restores every
/// index.
///
/// Root elements come first, then relationships from the highest index
/// down, then parented elements with later and deeper ones before earlier
/// ones and their containers.
fn removal_order(diagram: &Diagram, closure: IndexSet<ElementId>) -> Vec<ElementId> {
    let mut roots = Vec::new();
    let mut edges = Vec::new();
    let mut parented = Vec::new();
    for element in closure {
        match element {
            ElementId::Edge(edge) => edges.push(edge),
            ElementId::Node(node) if diagram.named_element(node).has_parent() => parented.push(node),
            ElementId::Node(node) => roots.push(node),
        }
    }
    edges.sort_by_key(|&edge| Reverse(diagram.index_of(edge)));
    parented.sort_by_cached_key(|&node| Reverse(containment_path(diagram, node)));

    roots
        .into_iter()
        .map(ElementId::from)
        .chain(edges.into_iter().map(ElementId::from))
        .chain(parented.into_iter().map(ElementId::from))
        .collect()
}
