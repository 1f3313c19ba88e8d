//! MetaBuilder Core Types and Definitions
//!
//! This crate holds the element model shared by the editing engine and any
//! front end: geometry primitives, the property store, element kinds and the
//! [`Diagram`](diagram::Diagram) arena.

pub mod diagram;
pub mod element;
pub mod geometry;
pub mod property;
pub mod prototype;
