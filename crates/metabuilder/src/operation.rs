//! Reversible edits of a diagram.
//!
//! Every change to a [`Diagram`] goes through an [`Operation`]. An operation
//! is built by the [`DiagramBuilder`](crate::builder::DiagramBuilder) (or a
//! tracker) and executed by the caller; calling [`DiagramOperation::undo`]
//! afterwards restores the diagram exactly, including sibling and
//! relationship indices.
//!
//! An operation is only guaranteed to work for one `execute` followed by one
//! `undo` (and again for a redo). Indices needed by `undo` are captured when
//! the operation executes, not when it is built.
//!
//! Operations do not validate: the builder checks feasibility first, and
//! executing an operation against a diagram that does not satisfy its
//! preconditions panics.

use std::fmt;

use log::{debug, trace};

use metabuilder_core::{
    diagram::Diagram,
    element::{EdgeId, ElementId, NodeId},
};

use crate::viewer::{DiagramViewer, TextMetrics};

/// Something that can be applied to a diagram and taken back.
pub trait DiagramOperation {
    fn execute(&mut self, diagram: &mut Diagram);

    fn undo(&mut self, diagram: &mut Diagram);
}

/// Where a detached child used to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detached {
    package: NodeId,
    index: usize,
    shift: (i32, i32),
}

/// A single reversible change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Appends a root element.
    AddRoot { element: NodeId },
    /// Removes a root element, remembering its index.
    RemoveRoot {
        element: NodeId,
        index: Option<usize>,
    },
    /// Appends a parentless element to a package.
    AddChild { package: NodeId, element: NodeId },
    /// Removes an element from its parent package.
    ///
    /// With `reanchor` set and the element being the only child, the
    /// package keeps its visual position: its stored position moves to
    /// where its bounds were while it still wrapped the child.
    DetachChild {
        element: NodeId,
        reanchor: Option<TextMetrics>,
        detached: Option<Detached>,
    },
    /// Connects a relationship and appends it.
    AddRelationship {
        relationship: EdgeId,
        start: NodeId,
        end: NodeId,
    },
    /// Removes a relationship, remembering its index.
    RemoveRelationship {
        relationship: EdgeId,
        index: Option<usize>,
    },
    /// Translates an element with its subtree.
    Move { element: NodeId, dx: i32, dy: i32 },
    /// Stores a property value; undo restores or removes the old value.
    SetProperty {
        element: ElementId,
        key: String,
        value: String,
        previous: Option<Option<String>>,
    },
    /// Removes a property; undo puts it back at its old index.
    RemoveProperty {
        element: ElementId,
        key: String,
        removed: Option<(usize, String)>,
    },
    /// Brings an element and its ancestors to the front.
    PlaceOnTop {
        element: NodeId,
        previous: Vec<(NodeId, usize)>,
    },
}

impl Edit {
    pub fn add_root(element: NodeId) -> Self {
        Self::AddRoot { element }
    }

    pub fn remove_root(element: NodeId) -> Self {
        Self::RemoveRoot {
            element,
            index: None,
        }
    }

    pub fn add_child(package: NodeId, element: NodeId) -> Self {
        Self::AddChild { package, element }
    }

    pub fn detach_child(element: NodeId) -> Self {
        Self::DetachChild {
            element,
            reanchor: None,
            detached: None,
        }
    }

    /// Detaches `element`, re-anchoring an emptied parent package using
    /// `metrics` to measure it.
    pub fn detach_child_reanchored(element: NodeId, metrics: TextMetrics) -> Self {
        Self::DetachChild {
            element,
            reanchor: Some(metrics),
            detached: None,
        }
    }

    pub fn add_relationship(relationship: EdgeId, start: NodeId, end: NodeId) -> Self {
        Self::AddRelationship {
            relationship,
            start,
            end,
        }
    }

    pub fn remove_relationship(relationship: EdgeId) -> Self {
        Self::RemoveRelationship {
            relationship,
            index: None,
        }
    }

    pub fn translate(element: NodeId, dx: i32, dy: i32) -> Self {
        Self::Move { element, dx, dy }
    }

    pub fn set_property(
        element: impl Into<ElementId>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::SetProperty {
            element: element.into(),
            key: key.into(),
            value: value.into(),
            previous: None,
        }
    }

    /// Records a property change that has already been applied.
    ///
    /// `old` is `None` when the property did not exist before. The edit
    /// can be undone right away.
    pub fn property_changed(
        element: impl Into<ElementId>,
        key: impl Into<String>,
        old: Option<String>,
        new: impl Into<String>,
    ) -> Self {
        Self::SetProperty {
            element: element.into(),
            key: key.into(),
            value: new.into(),
            previous: Some(old),
        }
    }

    pub fn remove_property(element: impl Into<ElementId>, key: impl Into<String>) -> Self {
        Self::RemoveProperty {
            element: element.into(),
            key: key.into(),
            removed: None,
        }
    }

    /// Records a property removal that has already been applied.
    pub fn property_removed(
        element: impl Into<ElementId>,
        key: impl Into<String>,
        index: usize,
        old: impl Into<String>,
    ) -> Self {
        Self::RemoveProperty {
            element: element.into(),
            key: key.into(),
            removed: Some((index, old.into())),
        }
    }

    pub fn place_on_top(element: NodeId) -> Self {
        Self::PlaceOnTop {
            element,
            previous: Vec::new(),
        }
    }
}

impl DiagramOperation for Edit {
    fn execute(&mut self, diagram: &mut Diagram) {
        trace!(edit:% = self; "Executing edit");
        match self {
            Edit::AddRoot { element } => diagram.add_named_element(*element),
            Edit::RemoveRoot { element, index } => {
                *index = Some(diagram.remove_named_element(*element));
            }
            Edit::AddChild { package, element } => {
                assert!(
                    !diagram.named_element(*element).has_parent(),
                    "{element} must be detached before it joins {package}"
                );
                diagram.add_child(*package, *element);
            }
            Edit::DetachChild {
                element,
                reanchor,
                detached,
            } => {
                let package = diagram
                    .named_element(*element)
                    .parent()
                    .unwrap_or_else(|| panic!("{element} has no parent"));
                let reanchored = reanchor.as_ref().and_then(|metrics| {
                    (diagram.named_element(package).children().len() == 1).then(|| {
                        DiagramViewer::new(diagram, metrics).bounds(package)
                    })
                });
                let index = diagram.remove_child(package, *element);
                let shift = match reanchored {
                    Some(bounds) => {
                        let position = diagram.named_element(package).position();
                        let shift = (bounds.x() - position.x(), bounds.y() - position.y());
                        diagram.translate(package, shift.0, shift.1);
                        shift
                    }
                    None => (0, 0),
                };
                *detached = Some(Detached {
                    package,
                    index,
                    shift,
                });
            }
            Edit::AddRelationship {
                relationship,
                start,
                end,
            } => {
                diagram.connect(*relationship, *start, *end);
                diagram.add_relationship(*relationship);
            }
            Edit::RemoveRelationship {
                relationship,
                index,
            } => {
                *index = Some(diagram.remove_relationship(*relationship));
            }
            Edit::Move { element, dx, dy } => diagram.translate(*element, *dx, *dy),
            Edit::SetProperty {
                element,
                key,
                value,
                previous,
            } => {
                *previous = Some(diagram.properties_mut(*element).put(key.clone(), value.clone()));
            }
            Edit::RemoveProperty {
                element,
                key,
                removed,
            } => {
                *removed = diagram.properties_mut(*element).remove_full(key);
            }
            Edit::PlaceOnTop { element, previous } => {
                previous.clear();
                let mut current = Some(*element);
                while let Some(node) = current {
                    if let Some(index) = diagram.sibling_index(node) {
                        previous.push((node, index));
                    }
                    current = diagram.named_element(node).parent();
                }
                diagram.place_on_top(*element);
            }
        }
    }

    fn undo(&mut self, diagram: &mut Diagram) {
        trace!(edit:% = self; "Undoing edit");
        match self {
            Edit::AddRoot { element } => {
                diagram.remove_named_element(*element);
            }
            Edit::RemoveRoot { element, index } => {
                let index = index.unwrap_or_else(|| panic!("{element} was never removed"));
                diagram.insert_named_element(index, *element);
            }
            Edit::AddChild { package, element } => {
                diagram.remove_child(*package, *element);
            }
            Edit::DetachChild {
                element, detached, ..
            } => {
                let Detached {
                    package,
                    index,
                    shift,
                } = detached.unwrap_or_else(|| panic!("{element} was never detached"));
                // The package moves back before the child returns, otherwise
                // the translation would carry the child along.
                diagram.translate(package, -shift.0, -shift.1);
                diagram.insert_child(package, index, *element);
            }
            Edit::AddRelationship { relationship, .. } => {
                diagram.remove_relationship(*relationship);
            }
            Edit::RemoveRelationship {
                relationship,
                index,
            } => {
                let index = index.unwrap_or_else(|| panic!("{relationship} was never removed"));
                diagram.insert_relationship(index, *relationship);
            }
            Edit::Move { element, dx, dy } => diagram.translate(*element, -*dx, -*dy),
            Edit::SetProperty {
                element,
                key,
                previous,
                ..
            } => {
                let properties = diagram.properties_mut(*element);
                match previous.take().flatten() {
                    Some(old) => {
                        properties.put(key.clone(), old);
                    }
                    None => {
                        properties.remove(key);
                    }
                }
            }
            Edit::RemoveProperty {
                element,
                key,
                removed,
            } => {
                if let Some((index, old)) = removed.take() {
                    diagram.properties_mut(*element).insert_at(index, key.clone(), old);
                }
            }
            Edit::PlaceOnTop { previous, .. } => {
                for &(node, index) in previous.iter().rev() {
                    diagram.reorder(node, index);
                }
            }
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::AddRoot { element } => write!(f, "add {element}"),
            Edit::RemoveRoot { element, .. } => write!(f, "remove {element}"),
            Edit::AddChild { package, element } => write!(f, "link {element} to {package}"),
            Edit::DetachChild { element, .. } => write!(f, "unlink {element}"),
            Edit::AddRelationship {
                relationship,
                start,
                end,
            } => write!(f, "add {relationship} from {start} to {end}"),
            Edit::RemoveRelationship { relationship, .. } => write!(f, "remove {relationship}"),
            Edit::Move { element, dx, dy } => write!(f, "move {element} by ({dx}, {dy})"),
            Edit::SetProperty { element, key, .. } => write!(f, "set {key} of {element}"),
            Edit::RemoveProperty { element, key, .. } => write!(f, "remove {key} of {element}"),
            Edit::PlaceOnTop { element, .. } => write!(f, "place {element} on top"),
        }
    }
}

/// An ordered group of operations acting as one.
///
/// Sub-operations execute in insertion order and undo in reverse order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundOperation {
    operations: Vec<Operation>,
}

impl CompoundOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: impl Into<Operation>) {
        self.operations.push(operation.into());
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

impl<O: Into<Operation>> FromIterator<O> for CompoundOperation {
    fn from_iter<I: IntoIterator<Item = O>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<O: Into<Operation>> Extend<O> for CompoundOperation {
    fn extend<I: IntoIterator<Item = O>>(&mut self, iter: I) {
        self.operations.extend(iter.into_iter().map(Into::into));
    }
}

impl DiagramOperation for CompoundOperation {
    fn execute(&mut self, diagram: &mut Diagram) {
        for operation in &mut self.operations {
            operation.execute(diagram);
        }
    }

    fn undo(&mut self, diagram: &mut Diagram) {
        for operation in self.operations.iter_mut().rev() {
            operation.undo(diagram);
        }
    }
}

/// Any operation the builder produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Edit(Edit),
    Compound(CompoundOperation),
}

impl Operation {
    /// Number of single edits this operation performs.
    pub fn edit_count(&self) -> usize {
        match self {
            Operation::Edit(_) => 1,
            Operation::Compound(compound) => {
                compound.operations.iter().map(Operation::edit_count).sum()
            }
        }
    }
}

impl From<Edit> for Operation {
    fn from(edit: Edit) -> Self {
        Operation::Edit(edit)
    }
}

impl From<CompoundOperation> for Operation {
    fn from(compound: CompoundOperation) -> Self {
        Operation::Compound(compound)
    }
}

impl DiagramOperation for Operation {
    fn execute(&mut self, diagram: &mut Diagram) {
        match self {
            Operation::Edit(edit) => edit.execute(diagram),
            Operation::Compound(compound) => {
                debug!(edits = compound.len(); "Executing compound operation");
                compound.execute(diagram);
            }
        }
    }

    fn undo(&mut self, diagram: &mut Diagram) {
        match self {
            Operation::Edit(edit) => edit.undo(diagram),
            Operation::Compound(compound) => {
                debug!(edits = compound.len(); "Undoing compound operation");
                compound.undo(diagram);
            }
        }
    }
}
