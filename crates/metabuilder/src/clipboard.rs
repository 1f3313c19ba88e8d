//! Copy and paste of diagram fragments.
//!
//! A [`Clipboard`] keeps its own copy of the copied elements in a private
//! arena, so later edits of the source diagram do not leak into it. Every
//! paste imports a fresh copy into the target diagram.

use std::collections::HashMap;

use log::debug;

use metabuilder_core::{
    diagram::Diagram,
    element::{EdgeId, ElementId, NodeId},
};

/// Copied named elements and the relationships between them.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    store: Diagram,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content of the clipboard with a copy of `selection`.
    ///
    /// Named elements are copied with their subtrees and lose their
    /// parent. A relationship is only kept if both of its endpoints were
    /// copied; its copy connects the copied endpoints.
    pub fn copy(&mut self, source: &Diagram, selection: &[ElementId]) {
        self.store = Diagram::new();
        self.nodes.clear();
        self.edges.clear();

        let mut mapping = HashMap::new();
        for node in selection.iter().filter_map(|element| element.as_node()) {
            let copy = self.store.copy_named_element_from(source, node, &mut mapping);
            self.nodes.push(copy);
        }
        for edge in selection.iter().filter_map(|element| element.as_edge()) {
            if let Some(copy) = self.store.copy_relationship_from(source, edge, &mapping) {
                self.edges.push(copy);
            }
        }
        debug!(
            elements = self.nodes.len(),
            relationships = self.edges.len();
            "Copied selection"
        );
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Number of copied top-level named elements and relationships.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    /// Imports a fresh copy of the clipboard into `target`'s arena.
    ///
    /// The copies are standalone: pass the returned handles, named elements
    /// first, to
    /// [`create_add_elements_operation`](crate::builder::DiagramBuilder::create_add_elements_operation)
    /// to add them.
    pub fn paste_into(&self, target: &mut Diagram) -> Vec<ElementId> {
        let mut mapping = HashMap::new();
        let mut result: Vec<ElementId> = self
            .nodes
            .iter()
            .map(|&node| target.copy_named_element_from(&self.store, node, &mut mapping).into())
            .collect();
        result.extend(
            self.edges
                .iter()
                .filter_map(|&edge| target.copy_relationship_from(&self.store, edge, &mapping))
                .map(ElementId::from),
        );
        result
    }
}
