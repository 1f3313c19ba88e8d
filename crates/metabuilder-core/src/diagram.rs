//! The diagram arena.
//!
//! A [`Diagram`] owns every element it ever created. Membership is separate
//! from ownership: an element is *in* the diagram while it is reachable from
//! the root sequence (named elements) or listed in the relationship sequence
//! (relationships). Elements that are created but not yet added, or that were
//! removed by an operation, stay in the arena in a detached state so that
//! undo can put them back.
//!
//! # Invariants
//!
//! - A named element has a parent if and only if it appears in that
//!   package's child list.
//! - A named element is attached if and only if it is reachable from the
//!   root sequence.
//! - Relationship order is preserved exactly by insert and remove.
//!
//! Calls that would break these invariants are programming errors and panic.

use std::collections::HashMap;

use log::debug;

use crate::{
    element::{EdgeId, EdgeKind, ElementId, NamedElement, NodeId, NodeKind, Relationship},
    prototype::{Prototype, PrototypeKind},
    property::Properties,
};

/// A class diagram: root named elements, a flat relationship list and the
/// arena backing both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    name: String,
    nodes: Vec<NamedElement>,
    edges: Vec<Relationship>,
    roots: Vec<NodeId>,
    relationships: Vec<EdgeId>,
    prototypes: Vec<Prototype>,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            roots: Vec::new(),
            relationships: Vec::new(),
            prototypes: Prototype::DEFAULTS.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Element templates offered by this diagram.
    pub fn prototypes(&self) -> &[Prototype] {
        &self.prototypes
    }

    /// Creates a detached element from a prototype.
    pub fn instantiate(&mut self, prototype: &Prototype) -> ElementId {
        match prototype.kind() {
            PrototypeKind::Node(kind) => self.create_named_element(kind).into(),
            PrototypeKind::Edge(kind) => self.create_relationship(kind).into(),
        }
    }

    /// Creates a detached, unparented named element at the origin.
    pub fn create_named_element(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NamedElement::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// Creates an unconnected relationship.
    pub fn create_relationship(&mut self, kind: EdgeKind) -> EdgeId {
        self.edges.push(Relationship::new(kind));
        EdgeId(self.edges.len() - 1)
    }

    pub fn named_element(&self, id: NodeId) -> &NamedElement {
        &self.nodes[id.0]
    }

    pub fn relationship(&self, id: EdgeId) -> &Relationship {
        &self.edges[id.0]
    }

    pub fn properties(&self, id: impl Into<ElementId>) -> &Properties {
        match id.into() {
            ElementId::Node(id) => &self.nodes[id.0].properties,
            ElementId::Edge(id) => &self.edges[id.0].properties,
        }
    }

    pub fn properties_mut(&mut self, id: impl Into<ElementId>) -> &mut Properties {
        match id.into() {
            ElementId::Node(id) => &mut self.nodes[id.0].properties,
            ElementId::Edge(id) => &mut self.edges[id.0].properties,
        }
    }

    /// Root named elements in back-to-front order.
    pub fn root_elements(&self) -> &[NodeId] {
        &self.roots
    }

    /// All relationships of the diagram in insertion order.
    pub fn relationships(&self) -> &[EdgeId] {
        &self.relationships
    }

    /// Returns `true` if the element is part of the diagram.
    pub fn contains(&self, id: impl Into<ElementId>) -> bool {
        match id.into() {
            ElementId::Node(id) => self.nodes[id.0].attached,
            ElementId::Edge(id) => self.relationships.contains(&id),
        }
    }

    /// Every relationship whose start or end is `node`.
    pub fn relationships_connected_to(&self, node: NodeId) -> Vec<EdgeId> {
        assert!(self.contains(node), "{node} is not in the diagram");
        self.relationships
            .iter()
            .copied()
            .filter(|&edge| {
                let relationship = &self.edges[edge.0];
                relationship.start == Some(node) || relationship.end == Some(node)
            })
            .collect()
    }

    /// `node` followed by all of its descendants in pre-order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = vec![node];
        let mut index = 0;
        while index < result.len() {
            let current = result[index];
            // Splice children right after their parent to keep pre-order.
            let children = &self.nodes[current.0].children;
            result.splice(index + 1..index + 1, children.iter().copied());
            index += 1;
        }
        result
    }

    /// Every named element reachable from the roots, in paint order.
    pub fn all_named_elements(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|&root| self.descendants(root))
            .collect()
    }

    /// Position of `node` in its sibling list (parent children or roots).
    pub fn sibling_index(&self, node: NodeId) -> Option<usize> {
        let siblings = match self.nodes[node.0].parent {
            Some(parent) => &self.nodes[parent.0].children,
            None => &self.roots,
        };
        siblings.iter().position(|&n| n == node)
    }

    /// Shifts `node` and its whole subtree.
    pub fn translate(&mut self, node: NodeId, dx: i32, dy: i32) {
        for id in self.descendants(node) {
            let element = &mut self.nodes[id.0];
            element.position = element.position.translated(dx, dy);
        }
    }

    fn set_attached(&mut self, node: NodeId, attached: bool) {
        for id in self.descendants(node) {
            self.nodes[id.0].attached = attached;
        }
    }

    /// Adds a root element, attaching it and its descendants.
    pub fn add_named_element(&mut self, node: NodeId) {
        let index = self.roots.len();
        self.insert_named_element(index, node);
    }

    /// Inserts a root element at `index`, attaching it and its descendants.
    pub fn insert_named_element(&mut self, index: usize, node: NodeId) {
        assert!(!self.roots.contains(&node), "{node} is already a root");
        assert!(
            self.nodes[node.0].parent.is_none(),
            "{node} must be unlinked before becoming a root"
        );
        self.set_attached(node, true);
        self.roots.insert(index, node);
    }

    /// Removes a root element, detaching it and its descendants.
    ///
    /// Returns the index the element occupied.
    pub fn remove_named_element(&mut self, node: NodeId) -> usize {
        let index = self
            .roots
            .iter()
            .position(|&n| n == node)
            .unwrap_or_else(|| panic!("{node} is not a root element"));
        self.roots.remove(index);
        self.set_attached(node, false);
        index
    }

    /// Appends `child` to `package`, unlinking it from any previous parent.
    pub fn add_child(&mut self, package: NodeId, child: NodeId) {
        let index = self.nodes[package.0].children.len();
        let index = match self.nodes[child.0].parent {
            Some(parent) if parent == package => index - 1,
            _ => index,
        };
        self.insert_child(package, index, child);
    }

    /// Inserts `child` into `package` at `index`.
    ///
    /// A child that already has a parent is removed from it first. The
    /// child's subtree takes over the attachment state of `package`.
    pub fn insert_child(&mut self, package: NodeId, index: usize, child: NodeId) {
        assert!(
            self.nodes[package.0].kind.is_package(),
            "{package} is not a package"
        );
        assert_ne!(package, child, "a package cannot contain itself");
        if let Some(parent) = self.nodes[child.0].parent {
            self.remove_child(parent, child);
        }
        assert!(
            index <= self.nodes[package.0].children.len(),
            "child index {index} out of range"
        );
        self.nodes[package.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(package);
        let attached = self.nodes[package.0].attached;
        self.set_attached(child, attached);
    }

    /// Removes `child` from `package`, detaching its subtree.
    ///
    /// Returns the index the child occupied.
    pub fn remove_child(&mut self, package: NodeId, child: NodeId) -> usize {
        assert_eq!(
            self.nodes[child.0].parent,
            Some(package),
            "{child} is not a child of {package}"
        );
        let children = &mut self.nodes[package.0].children;
        let index = children
            .iter()
            .position(|&n| n == child)
            .unwrap_or_else(|| panic!("{child} missing from children of {package}"));
        children.remove(index);
        self.nodes[child.0].parent = None;
        self.set_attached(child, false);
        index
    }

    /// Moves `node` to `index` within its sibling list.
    pub fn reorder(&mut self, node: NodeId, index: usize) {
        let siblings = match self.nodes[node.0].parent {
            Some(parent) => &mut self.nodes[parent.0].children,
            None => &mut self.roots,
        };
        let current = siblings
            .iter()
            .position(|&n| n == node)
            .unwrap_or_else(|| panic!("{node} is not in a sibling list"));
        siblings.remove(current);
        siblings.insert(index, node);
    }

    /// Moves `node` in front of its siblings, and recursively its parents
    /// in front of theirs.
    pub fn place_on_top(&mut self, node: NodeId) {
        match self.nodes[node.0].parent {
            Some(parent) => {
                let last = self.nodes[parent.0].children.len() - 1;
                self.reorder(node, last);
                self.place_on_top(parent);
            }
            None if self.roots.contains(&node) => {
                let last = self.roots.len() - 1;
                self.reorder(node, last);
            }
            None => {}
        }
    }

    /// Sets both endpoints and marks the relationship as connected.
    pub fn connect(&mut self, edge: EdgeId, start: NodeId, end: NodeId) {
        let relationship = &mut self.edges[edge.0];
        relationship.start = Some(start);
        relationship.end = Some(end);
        relationship.attached = true;
    }

    /// Appends a connected relationship.
    pub fn add_relationship(&mut self, edge: EdgeId) {
        let index = self.relationships.len();
        self.insert_relationship(index, edge);
    }

    /// Inserts a connected relationship at `index`.
    pub fn insert_relationship(&mut self, index: usize, edge: EdgeId) {
        let relationship = &mut self.edges[edge.0];
        assert!(
            relationship.start.is_some() && relationship.end.is_some(),
            "{edge} must be connected before it is added"
        );
        assert!(
            !self.relationships.contains(&edge),
            "{edge} is already in the diagram"
        );
        relationship.attached = true;
        self.relationships.insert(index, edge);
    }

    /// Removes a relationship, returning the index it occupied.
    pub fn remove_relationship(&mut self, edge: EdgeId) -> usize {
        let index = self.index_of(edge);
        self.relationships.remove(index);
        self.edges[edge.0].attached = false;
        index
    }

    /// Current index of a relationship in the relationship list.
    pub fn index_of(&self, edge: EdgeId) -> usize {
        self.relationships
            .iter()
            .position(|&e| e == edge)
            .unwrap_or_else(|| panic!("{edge} is not in the diagram"))
    }

    /// Deep-clones an element inside this arena.
    ///
    /// The clone has its own property map, no parent and is detached.
    /// Package children are cloned along with it. A cloned relationship
    /// keeps the original endpoints.
    pub fn clone_element(&mut self, id: impl Into<ElementId>) -> ElementId {
        match id.into() {
            ElementId::Node(node) => self.clone_named_element(node).into(),
            ElementId::Edge(edge) => {
                let mut copy = self.edges[edge.0].clone();
                copy.attached = false;
                self.edges.push(copy);
                EdgeId(self.edges.len() - 1).into()
            }
        }
    }

    fn clone_named_element(&mut self, node: NodeId) -> NodeId {
        let original = self.nodes[node.0].clone();
        let children = original.children.clone();
        self.nodes.push(NamedElement {
            parent: None,
            children: Vec::new(),
            attached: false,
            ..original
        });
        let copy = NodeId(self.nodes.len() - 1);
        for child in children {
            let child_copy = self.clone_named_element(child);
            self.nodes[copy.0].children.push(child_copy);
            self.nodes[child_copy.0].parent = Some(copy);
        }
        copy
    }

    /// Deep-copies `node` of `source` into this arena.
    ///
    /// Every copied element is recorded in `mapping`. The copy is detached
    /// and has no parent.
    pub fn copy_named_element_from(
        &mut self,
        source: &Diagram,
        node: NodeId,
        mapping: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        let original = source.named_element(node);
        self.nodes.push(NamedElement {
            kind: original.kind,
            properties: original.properties.clone(),
            position: original.position,
            parent: None,
            children: Vec::new(),
            attached: false,
        });
        let copy = NodeId(self.nodes.len() - 1);
        mapping.insert(node, copy);
        for &child in original.children() {
            let child_copy = self.copy_named_element_from(source, child, mapping);
            self.nodes[copy.0].children.push(child_copy);
            self.nodes[child_copy.0].parent = Some(copy);
        }
        copy
    }

    /// Copies `edge` of `source` into this arena, rewiring its endpoints
    /// through `mapping`.
    ///
    /// Returns `None` when an endpoint has no copy. The copy is not added
    /// to the relationship list.
    pub fn copy_relationship_from(
        &mut self,
        source: &Diagram,
        edge: EdgeId,
        mapping: &HashMap<NodeId, NodeId>,
    ) -> Option<EdgeId> {
        let original = source.relationship(edge);
        let start = mapping.get(&original.start?).copied()?;
        let end = mapping.get(&original.end?).copied()?;
        self.edges.push(Relationship {
            kind: original.kind,
            properties: original.properties.clone(),
            start: Some(start),
            end: Some(end),
            attached: false,
        });
        Some(EdgeId(self.edges.len() - 1))
    }

    /// Returns an independent copy holding only the diagram's content.
    ///
    /// The copy's arena is rebuilt from the reachable elements, so handles
    /// of this diagram are not valid in the copy.
    pub fn duplicate(&self) -> Diagram {
        let mut copy = Diagram::new();
        copy.name = self.name.clone();
        let mut mapping = HashMap::new();
        for &root in &self.roots {
            let root_copy = copy.copy_named_element_from(self, root, &mut mapping);
            copy.add_named_element(root_copy);
        }
        for &edge in &self.relationships {
            let edge_copy = copy
                .copy_relationship_from(self, edge, &mapping)
                .unwrap_or_else(|| panic!("{edge} has an endpoint outside the diagram"));
            copy.edges[edge_copy.0].attached = true;
            copy.relationships.push(edge_copy);
        }
        debug!(
            elements = mapping.len(),
            relationships = copy.relationships.len();
            "Duplicated diagram"
        );
        copy
    }
}
