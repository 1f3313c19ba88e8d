//! Recording of interactive changes as undoable operations.
//!
//! Dragging elements or editing properties in a front end changes the
//! diagram directly while the gesture is in progress. A tracker takes a
//! snapshot when the gesture starts and, once it ends, describes the net
//! change as an operation. That operation has already taken effect: the
//! caller records it for undo and must not execute it again.

use log::debug;

use metabuilder_core::{
    diagram::Diagram,
    element::{ElementId, NodeId},
    geometry::Rectangle,
    property::Properties,
};

use crate::{
    builder::DiagramBuilder,
    operation::{CompoundOperation, Edit},
    viewer::DiagramViewer,
};

/// Tracks the bounds of selected named elements across a drag.
#[derive(Debug, Clone, Default)]
pub struct MoveTracker {
    tracked: Vec<(NodeId, Rectangle)>,
}

impl MoveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers where the named elements of `selection` are.
    ///
    /// Relationships in the selection are ignored.
    pub fn start_tracking(&mut self, viewer: &DiagramViewer<'_>, selection: &[ElementId]) {
        self.tracked = selection
            .iter()
            .filter_map(|element| element.as_node())
            .map(|node| (node, viewer.bounds(node)))
            .collect();
    }

    /// One move per tracked element whose bounds moved since
    /// [`start_tracking`](Self::start_tracking).
    pub fn end_tracking(&mut self, viewer: &DiagramViewer<'_>, builder: &DiagramBuilder) -> CompoundOperation {
        let compound: CompoundOperation = self
            .tracked
            .drain(..)
            .filter_map(|(node, before)| {
                let after = viewer.bounds(node);
                let (dx, dy) = (after.x() - before.x(), after.y() - before.y());
                (dx != 0 || dy != 0).then(|| builder.create_move_element_operation(node, dx, dy))
            })
            .collect();
        debug!(moved = compound.len(); "Move tracking ended");
        compound
    }
}

/// Tracks the property map of one element across an edit.
#[derive(Debug, Clone)]
pub struct PropertyChangeTracker {
    element: ElementId,
    snapshot: Properties,
}

impl PropertyChangeTracker {
    /// Takes a snapshot of the properties of `element`.
    pub fn start_tracking(diagram: &Diagram, element: impl Into<ElementId>) -> Self {
        let element = element.into();
        Self {
            element,
            snapshot: diagram.properties(element).clone(),
        }
    }

    /// One property edit per value that changed, appeared or disappeared
    /// since the snapshot.
    pub fn stop_tracking(self, diagram: &Diagram) -> CompoundOperation {
        let current = diagram.properties(self.element);
        let changed = current
            .iter()
            .filter(|&(key, value)| self.snapshot.get(key) != Some(value))
            .map(|(key, value)| {
                Edit::property_changed(
                    self.element,
                    key,
                    self.snapshot.get(key).map(str::to_owned),
                    value,
                )
            });
        let removed = self
            .snapshot
            .iter()
            .enumerate()
            .filter(|(_, (key, _))| !current.contains_key(key))
            .map(|(index, (key, value))| Edit::property_removed(self.element, key, index, value));
        changed.chain(removed).collect()
    }
}

#[cfg(test)]
mod tests {
    use metabuilder_core::{element::NodeKind, geometry::Point};

    use super::*;
    use crate::{operation::DiagramOperation, viewer::TextMetrics};

    fn two_classes() -> (Diagram, NodeId, NodeId) {
        let mut diagram = Diagram::new();
        let a = diagram.create_named_element(NodeKind::CLASS);
        diagram.add_named_element(a);
        let b = diagram.create_named_element(NodeKind::CLASS);
        diagram.translate(b, 200, 0);
        diagram.add_named_element(b);
        (diagram, a, b)
    }

    #[test]
    fn test_only_moved_elements_are_recorded() {
        let metrics = TextMetrics::default();
        let builder = DiagramBuilder::default();
        let (mut diagram, a, b) = two_classes();
        let mut tracker = MoveTracker::new();
        tracker.start_tracking(&DiagramViewer::new(&diagram, &metrics), &[a.into(), b.into()]);

        diagram.translate(b, 15, -5);
        let mut moves = tracker.end_tracking(&DiagramViewer::new(&diagram, &metrics), &builder);
        assert_eq!(moves.len(), 1);

        moves.undo(&mut diagram);
        assert_eq!(diagram.named_element(b).position(), Point::new(200, 0));
        assert_eq!(diagram.named_element(a).position(), Point::new(0, 0));
    }

    #[test]
    fn test_no_move_gives_empty_compound() {
        let metrics = TextMetrics::default();
        let builder = DiagramBuilder::default();
        let (diagram, a, _) = two_classes();
        let viewer = DiagramViewer::new(&diagram, &metrics);
        let mut tracker = MoveTracker::new();
        tracker.start_tracking(&viewer, &[a.into()]);
        assert!(tracker.end_tracking(&viewer, &builder).is_empty());
    }

    #[test]
    fn test_property_changes_are_undone() {
        let (mut diagram, a, _) = two_classes();
        let tracker = PropertyChangeTracker::start_tracking(&diagram, a);
        diagram.properties_mut(a).put("name", "Shape");
        diagram.properties_mut(a).put("stereotype", "entity");

        let mut changes = tracker.stop_tracking(&diagram);
        assert_eq!(changes.len(), 2);
        changes.undo(&mut diagram);
        assert_eq!(diagram.named_element(a).name(), "");
        assert_eq!(diagram.properties(a).get("stereotype"), None);

        changes.execute(&mut diagram);
        assert_eq!(diagram.named_element(a).name(), "Shape");
    }

    #[test]
    fn test_removed_property_is_restored() {
        let (mut diagram, a, _) = two_classes();
        diagram.properties_mut(a).put("stereotype", "entity");
        diagram.properties_mut(a).put("note", "cached");
        let before = diagram.clone();

        let tracker = PropertyChangeTracker::start_tracking(&diagram, a);
        diagram.properties_mut(a).remove("stereotype");
        diagram.properties_mut(a).put("note", "stale");

        let mut changes = tracker.stop_tracking(&diagram);
        assert_eq!(changes.len(), 2);
        changes.undo(&mut diagram);
        assert_eq!(diagram.properties(a).get("stereotype"), Some("entity"));
        assert_eq!(diagram.properties(a).get("note"), Some("cached"));
        assert_eq!(diagram, before);

        changes.execute(&mut diagram);
        assert_eq!(diagram.properties(a).get("stereotype"), None);
        assert_eq!(diagram.properties(a).get("note"), Some("stale"));
    }
}
