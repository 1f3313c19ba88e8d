//! MetaBuilder - An editing engine for class diagrams.
//!
//! Builds reversible edit operations from user intents, routes relationships
//! between elements and answers the geometric queries a front end needs for
//! painting and hit-testing.
//!
//! # Overview
//!
//! - [`builder::DiagramBuilder`] - Validates edit intents and turns them into operations
//! - [`operation`] - Reversible edits and their composition
//! - [`constraint`] - Predicates gating new relationships
//! - [`viewer::DiagramViewer`] - Bounds, connection points and hit-testing
//! - [`router`] - Orthogonal and straight relationship paths
//! - [`render::RenderPass`] - Everything needed to paint a diagram, with cached bounds
//! - [`clipboard`], [`tracker`], [`selection`] - Editing helpers for front ends
//!
//! # Example
//!
//! ```
//! use metabuilder::{
//!     builder::DiagramBuilder,
//!     diagram::Diagram,
//!     element::{EdgeKind, NodeKind},
//!     geometry::Point,
//!     operation::DiagramOperation,
//! };
//!
//! let mut diagram = Diagram::new();
//! let builder = DiagramBuilder::default();
//!
//! let shape = diagram.create_named_element(NodeKind::ABSTRACT_CLASS);
//! builder
//!     .create_add_element_operation(&diagram, shape, Point::new(200, 20))
//!     .expect("element can be added")
//!     .execute(&mut diagram);
//! let circle = diagram.create_named_element(NodeKind::CLASS);
//! builder
//!     .create_add_element_operation(&diagram, circle, Point::new(200, 300))
//!     .expect("element can be added")
//!     .execute(&mut diagram);
//!
//! let edge = diagram.create_relationship(EdgeKind::Generalization);
//! let mut add = builder
//!     .create_add_relationship_operation(&diagram, edge, Point::new(220, 320), Point::new(220, 40))
//!     .expect("both points hit an element");
//! add.execute(&mut diagram);
//! assert_eq!(diagram.relationship(edge).endpoints(), (circle, shape));
//! ```

pub mod builder;
pub mod clipboard;
pub mod config;
pub mod constraint;
pub mod operation;
pub mod render;
pub mod router;
pub mod selection;
pub mod tracker;
pub mod viewer;

mod error;

pub use metabuilder_core::{diagram, element, geometry, property, prototype};

pub use error::MetabuilderError;
