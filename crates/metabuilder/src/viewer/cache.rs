use std::{cell::RefCell, collections::HashMap};

use metabuilder_core::{element::NodeId, geometry::Rectangle};

/// Memoised named element bounds for the duration of one render pass.
///
/// Routing queries the bounds of the same elements many times. The cache is
/// only valid while the diagram is not mutated, so it is owned by a
/// [`RenderPass`](crate::render::RenderPass) and dropped with it.
#[derive(Debug, Default)]
pub struct BoundsCache {
    bounds: RefCell<HashMap<NodeId, Rectangle>>,
}

impl BoundsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> Option<Rectangle> {
        self.bounds.borrow().get(&node).copied()
    }

    pub fn insert(&self, node: NodeId, bounds: Rectangle) {
        self.bounds.borrow_mut().insert(node, bounds);
    }

    pub fn len(&self) -> usize {
        self.bounds.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.borrow().is_empty()
    }
}
