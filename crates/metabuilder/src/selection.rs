//! The set of elements a user has selected.

use indexmap::IndexSet;

use metabuilder_core::{
    diagram::Diagram,
    element::{ElementId, NodeId},
    geometry::Rectangle,
};

use crate::viewer::DiagramViewer;

/// Ordered selection of diagram elements.
///
/// The most recently selected element comes last. An element is never
/// selected together with one of its ancestors: selecting a package evicts
/// its selected descendants, and selecting an element inside a selected
/// package has no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: IndexSet<ElementId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every root element and every relationship.
    pub fn select_all(&mut self, diagram: &Diagram) {
        self.clear();
        for &root in diagram.root_elements() {
            self.add(diagram, root.into());
        }
        for &edge in diagram.relationships() {
            self.add(diagram, edge.into());
        }
    }

    /// Selects the elements lying entirely inside `lasso`, in addition to
    /// the current selection.
    pub fn select_within(&mut self, viewer: &DiagramViewer<'_>, lasso: Rectangle) {
        for element in viewer.elements_within(lasso) {
            self.add(viewer.diagram(), element);
        }
    }

    /// Replaces the selection.
    pub fn set_selection(&mut self, diagram: &Diagram, elements: &[ElementId]) {
        self.clear();
        for &element in elements {
            self.add(diagram, element);
        }
    }

    /// Selects `element` only.
    pub fn set(&mut self, element: ElementId) {
        self.selected.clear();
        self.selected.insert(element);
    }

    /// Adds `element` as the last selected element.
    pub fn add(&mut self, diagram: &Diagram, element: ElementId) {
        if self.has_selected_ancestor(diagram, element) {
            return;
        }
        self.selected.shift_remove(&element);
        self.selected.insert(element);
        let evicted: Vec<ElementId> = self
            .selected
            .iter()
            .copied()
            .filter(|&other| self.has_selected_ancestor(diagram, other))
            .collect();
        for other in evicted {
            self.selected.shift_remove(&other);
        }
    }

    pub fn remove(&mut self, element: ElementId) {
        self.selected.shift_remove(&element);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.selected.contains(&element)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn last_selected(&self) -> Option<ElementId> {
        self.selected.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.selected.iter().copied()
    }

    /// Selected elements, in selection order.
    pub fn to_vec(&self) -> Vec<ElementId> {
        self.iter().collect()
    }

    pub fn selected_named_elements(&self) -> Vec<NodeId> {
        self.iter().filter_map(ElementId::as_node).collect()
    }

    fn has_selected_ancestor(&self, diagram: &Diagram, element: ElementId) -> bool {
        let Some(node) = element.as_node() else {
            return false;
        };
        let mut parent = diagram.named_element(node).parent();
        while let Some(package) = parent {
            if self.selected.contains(&ElementId::from(package)) {
                return true;
            }
            parent = diagram.named_element(package).parent();
        }
        false
    }

    /// Union of the bounds of the selected elements.
    pub fn bounds(&self, viewer: &DiagramViewer<'_>) -> Option<Rectangle> {
        self.iter()
            .map(|element| viewer.element_bounds(element))
            .reduce(Rectangle::add)
    }

    /// Like [`bounds`](Self::bounds), but a nested element contributes the
    /// bounds of its outermost package.
    pub fn entire_bounds(&self, viewer: &DiagramViewer<'_>) -> Option<Rectangle> {
        let diagram = viewer.diagram();
        self.iter()
            .map(|element| match element {
                ElementId::Node(mut node) => {
                    while let Some(parent) = diagram.named_element(node).parent() {
                        node = parent;
                    }
                    viewer.bounds(node)
                }
                ElementId::Edge(edge) => viewer.relationship_bounds(edge),
            })
            .reduce(Rectangle::add)
    }
}

#[cfg(test)]
mod tests {
    use metabuilder_core::element::{EdgeKind, NodeKind};

    use super::*;
    use crate::viewer::TextMetrics;

    fn nested() -> (Diagram, NodeId, NodeId, NodeId) {
        let mut diagram = Diagram::new();
        let outer = diagram.create_named_element(NodeKind::Package);
        diagram.add_named_element(outer);
        let inner = diagram.create_named_element(NodeKind::Package);
        diagram.add_child(outer, inner);
        let class = diagram.create_named_element(NodeKind::CLASS);
        diagram.translate(class, 40, 60);
        diagram.add_child(inner, class);
        (diagram, outer, inner, class)
    }

    #[test]
    fn test_selecting_package_evicts_descendants() {
        let (diagram, outer, inner, class) = nested();
        let mut selection = SelectionModel::new();
        selection.add(&diagram, class.into());
        selection.add(&diagram, inner.into());
        assert_eq!(selection.to_vec(), vec![ElementId::from(inner)]);

        selection.add(&diagram, outer.into());
        assert_eq!(selection.to_vec(), vec![ElementId::from(outer)]);

        // Already covered by its ancestor.
        selection.add(&diagram, class.into());
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_reselecting_moves_to_end() {
        let mut diagram = Diagram::new();
        let a = diagram.create_named_element(NodeKind::CLASS);
        diagram.add_named_element(a);
        let b = diagram.create_named_element(NodeKind::DataType);
        diagram.add_named_element(b);
        let edge = diagram.create_relationship(EdgeKind::Association);
        diagram.connect(edge, a, b);
        diagram.add_relationship(edge);

        let mut selection = SelectionModel::new();
        selection.select_all(&diagram);
        assert_eq!(selection.last_selected(), Some(edge.into()));
        selection.add(&diagram, a.into());
        assert_eq!(
            selection.to_vec(),
            vec![ElementId::from(b), ElementId::from(edge), ElementId::from(a)]
        );
        assert_eq!(selection.selected_named_elements(), vec![b, a]);
    }

    #[test]
    fn test_entire_bounds_uses_outermost_package() {
        let metrics = TextMetrics::default();
        let (diagram, outer, _, class) = nested();
        let viewer = DiagramViewer::new(&diagram, &metrics);
        let mut selection = SelectionModel::new();
        assert_eq!(selection.bounds(&viewer), None);

        selection.set(class.into());
        assert_eq!(selection.bounds(&viewer), Some(viewer.bounds(class)));
        assert_eq!(selection.entire_bounds(&viewer), Some(viewer.bounds(outer)));
    }
}
