//! Predicates gating the creation of relationships.
//!
//! A [`Constraint`] looks at a [`Candidate`] relationship and the diagram it
//! would be added to. A [`ConstraintSet`] is satisfied when every constraint
//! in it is. Constraints are pure: they never change the diagram, so the
//! order in which a set evaluates them does not matter.
//!
//! Any `Fn(&Candidate, &Diagram) -> bool` closure is a constraint:
//!
//! ```
//! # use metabuilder::constraint::{Candidate, ConstraintSet, no_self_relationship};
//! # use metabuilder_core::diagram::Diagram;
//! let constraints = ConstraintSet::new()
//!     .with(no_self_relationship())
//!     .with(|candidate: &Candidate, _: &Diagram| candidate.start_point().x() >= 0);
//! assert_eq!(constraints.len(), 2);
//! ```

use std::fmt;

use metabuilder_core::{
    diagram::Diagram,
    element::{EdgeKind, NodeId},
    geometry::Point,
};

/// A relationship the user is about to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    kind: EdgeKind,
    start: NodeId,
    end: NodeId,
    start_point: Point,
    end_point: Point,
}

impl Candidate {
    pub fn new(
        kind: EdgeKind,
        (start, start_point): (NodeId, Point),
        (end, end_point): (NodeId, Point),
    ) -> Self {
        Self {
            kind,
            start,
            end,
            start_point,
            end_point,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    /// The point the user started the relationship at.
    pub fn start_point(&self) -> Point {
        self.start_point
    }

    /// The point the user released the relationship at.
    pub fn end_point(&self) -> Point {
        self.end_point
    }
}

/// A side-effect free predicate over a candidate relationship.
pub trait Constraint {
    fn satisfied(&self, candidate: &Candidate, diagram: &Diagram) -> bool;
}

impl<F> Constraint for F
where
    F: Fn(&Candidate, &Diagram) -> bool,
{
    fn satisfied(&self, candidate: &Candidate, diagram: &Diagram) -> bool {
        self(candidate, diagram)
    }
}

/// Conjunction of constraints.
#[derive(Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint to the set.
    pub fn with(mut self, constraint: impl Constraint + 'static) -> Self {
        self.push(constraint);
        self
    }

    pub fn push(&mut self, constraint: impl Constraint + 'static) {
        self.constraints.push(Box::new(constraint));
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Returns `true` if every constraint accepts the candidate.
    ///
    /// An empty set accepts everything.
    pub fn satisfied(&self, candidate: &Candidate, diagram: &Diagram) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.satisfied(candidate, diagram))
    }
}

impl fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("constraints", &self.constraints.len())
            .finish()
    }
}

/// Allows at most `max` relationships of the candidate's kind from the
/// candidate's start to its end.
///
/// The direction matters: a relationship from `b` to `a` does not count
/// against a candidate from `a` to `b`. With `max` of zero no relationship
/// is ever accepted.
pub fn max_relationships(max: usize) -> impl Constraint {
    move |candidate: &Candidate, diagram: &Diagram| {
        let existing = diagram
            .relationships()
            .iter()
            .map(|&edge| diagram.relationship(edge))
            .filter(|relationship| {
                relationship.kind() == candidate.kind()
                    && relationship.start() == Some(candidate.start())
                    && relationship.end() == Some(candidate.end())
            })
            .count();
        existing < max
    }
}

/// Rejects relationships from an element to itself.
pub fn no_self_relationship() -> impl Constraint {
    |candidate: &Candidate, _: &Diagram| candidate.start() != candidate.end()
}

#[cfg(test)]
mod tests {
    use metabuilder_core::element::NodeKind;

    use super::*;

    fn diagram_with_association() -> (Diagram, NodeId, NodeId) {
        let mut diagram = Diagram::new();
        let a = diagram.create_named_element(NodeKind::CLASS);
        let b = diagram.create_named_element(NodeKind::CLASS);
        diagram.add_named_element(a);
        diagram.add_named_element(b);
        let edge = diagram.create_relationship(EdgeKind::Association);
        diagram.connect(edge, a, b);
        diagram.add_relationship(edge);
        (diagram, a, b)
    }

    fn candidate(kind: EdgeKind, start: NodeId, end: NodeId) -> Candidate {
        Candidate::new(kind, (start, Point::default()), (end, Point::default()))
    }

    #[test]
    fn test_max_relationships_counts_same_kind_and_direction() {
        let (diagram, a, b) = diagram_with_association();
        let one = max_relationships(1);
        assert!(!one.satisfied(&candidate(EdgeKind::Association, a, b), &diagram));
        assert!(one.satisfied(&candidate(EdgeKind::Association, b, a), &diagram));
        assert!(one.satisfied(&candidate(EdgeKind::Composition, a, b), &diagram));
        assert!(max_relationships(2).satisfied(&candidate(EdgeKind::Association, a, b), &diagram));
    }

    #[test]
    fn test_max_relationships_zero_rejects_everything() {
        let mut diagram = Diagram::new();
        let a = diagram.create_named_element(NodeKind::CLASS);
        let b = diagram.create_named_element(NodeKind::CLASS);
        diagram.add_named_element(a);
        diagram.add_named_element(b);

        let set = ConstraintSet::new().with(max_relationships(0));
        assert!(!set.satisfied(&candidate(EdgeKind::Association, a, b), &diagram));
        assert!(!set.satisfied(&candidate(EdgeKind::Generalization, b, a), &diagram));
    }

    #[test]
    fn test_no_self_relationship() {
        let (diagram, a, b) = diagram_with_association();
        let constraint = no_self_relationship();
        assert!(!constraint.satisfied(&candidate(EdgeKind::Association, a, a), &diagram));
        assert!(constraint.satisfied(&candidate(EdgeKind::Association, a, b), &diagram));
    }

    #[test]
    fn test_set_is_conjunction() {
        let (diagram, a, b) = diagram_with_association();
        let set = ConstraintSet::new();
        assert!(set.is_empty());
        assert!(set.satisfied(&candidate(EdgeKind::Association, a, b), &diagram));

        let set = ConstraintSet::new()
            .with(max_relationships(1))
            .with(no_self_relationship());
        assert!(!set.satisfied(&candidate(EdgeKind::Association, a, b), &diagram));
        assert!(!set.satisfied(&candidate(EdgeKind::Generalization, b, b), &diagram));
        assert!(set.satisfied(&candidate(EdgeKind::Generalization, b, a), &diagram));
    }
}
