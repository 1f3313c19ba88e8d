//! Whole-diagram render pass.
//!
//! A [`RenderPass`] computes everything a painting layer needs in one go.
//! Named element bounds are memoised for as long as the pass lives, which
//! matters for routing: every relationship looks at the bounds of its
//! endpoints and of the elements at the other end of its neighbours.

use log::{debug, info};

use metabuilder_core::{
    diagram::Diagram,
    element::{EdgeId, EdgeKind, NodeId, NodeKind},
    geometry::{Point, Rectangle},
};

use crate::viewer::{ArrowHead, BoundsCache, DiagramViewer, Label, TextMetrics};

/// A named element ready to be painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedElement {
    pub node: NodeId,
    pub kind: NodeKind,
    /// Nesting depth; root elements have depth 0.
    pub depth: usize,
    pub bounds: Rectangle,
}

/// A relationship ready to be painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRelationship {
    pub edge: EdgeId,
    pub kind: EdgeKind,
    pub path: Vec<Point>,
    pub arrow_heads: (ArrowHead, ArrowHead),
    pub labels: Vec<Label>,
}

/// Output of a [`RenderPass`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDiagram {
    /// Named elements in paint order, back to front.
    pub elements: Vec<RenderedElement>,
    /// Relationships in diagram order; painted over the elements.
    pub relationships: Vec<RenderedRelationship>,
    pub bounds: Rectangle,
}

impl RenderedDiagram {
    pub fn element(&self, node: NodeId) -> Option<&RenderedElement> {
        self.elements.iter().find(|element| element.node == node)
    }

    pub fn relationship(&self, edge: EdgeId) -> Option<&RenderedRelationship> {
        self.relationships.iter().find(|relationship| relationship.edge == edge)
    }
}

/// A single pass over an unchanging diagram with memoised bounds.
///
/// The cache lives exactly as long as the pass. The diagram is borrowed,
/// so it cannot change while the pass exists.
#[derive(Debug)]
pub struct RenderPass<'a> {
    diagram: &'a Diagram,
    metrics: &'a TextMetrics,
    cache: BoundsCache,
}

impl<'a> RenderPass<'a> {
    pub fn new(metrics: &'a TextMetrics, diagram: &'a Diagram) -> Self {
        Self {
            diagram,
            metrics,
            cache: BoundsCache::new(),
        }
    }

    /// A viewer sharing this pass's bounds cache.
    pub fn viewer(&self) -> DiagramViewer<'_> {
        DiagramViewer::new(self.diagram, self.metrics).with_cache(&self.cache)
    }

    /// Number of named elements whose bounds are cached so far.
    pub fn cached_bounds(&self) -> usize {
        self.cache.len()
    }

    pub fn render(&self) -> RenderedDiagram {
        info!(
            elements = self.diagram.all_named_elements().len(),
            relationships = self.diagram.relationships().len();
            "Rendering diagram"
        );
        let viewer = self.viewer();

        let mut elements = Vec::new();
        for &root in self.diagram.root_elements() {
            self.collect_elements(&viewer, root, 0, &mut elements);
        }

        let relationships = self
            .diagram
            .relationships()
            .iter()
            .map(|&edge| RenderedRelationship {
                edge,
                kind: self.diagram.relationship(edge).kind(),
                path: viewer.relationship_path(edge),
                arrow_heads: viewer.arrow_heads(edge),
                labels: viewer.labels(edge),
            })
            .collect();

        let bounds = viewer.diagram_bounds();
        debug!(cached = self.cache.len(), bounds:?; "Render pass complete");
        RenderedDiagram {
            elements,
            relationships,
            bounds,
        }
    }

    fn collect_elements(
        &self,
        viewer: &DiagramViewer<'_>,
        node: NodeId,
        depth: usize,
        elements: &mut Vec<RenderedElement>,
    ) {
        let element = self.diagram.named_element(node);
        elements.push(RenderedElement {
            node,
            kind: element.kind(),
            depth,
            bounds: viewer.bounds(node),
        });
        for &child in element.children() {
            self.collect_elements(viewer, child, depth + 1, elements);
        }
    }
}
