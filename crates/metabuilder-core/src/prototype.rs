//! Templates for the element kinds a diagram can hold.
//!
//! Tool palettes list [`Prototype`]s in [`Prototype::DEFAULTS`] order and
//! ask the diagram to instantiate one when the user places a new element.

use crate::element::{EdgeKind, NodeKind};

/// What a prototype instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrototypeKind {
    Node(NodeKind),
    Edge(EdgeKind),
}

/// A named template for one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prototype {
    key: &'static str,
    kind: PrototypeKind,
}

impl Prototype {
    /// Every prototype a class diagram offers, in palette order.
    pub const DEFAULTS: [Prototype; 9] = [
        Prototype::node("class", NodeKind::CLASS),
        Prototype::node("abstractclass", NodeKind::ABSTRACT_CLASS),
        Prototype::node("interface", NodeKind::INTERFACE),
        Prototype::node("package", NodeKind::Package),
        Prototype::node("datatype", NodeKind::DataType),
        Prototype::node("enumeration", NodeKind::Enumeration),
        Prototype::edge("generalization", EdgeKind::Generalization),
        Prototype::edge("association", EdgeKind::Association),
        Prototype::edge("composition", EdgeKind::Composition),
    ];

    const fn node(key: &'static str, kind: NodeKind) -> Self {
        Self {
            key,
            kind: PrototypeKind::Node(kind),
        }
    }

    const fn edge(key: &'static str, kind: EdgeKind) -> Self {
        Self {
            key,
            kind: PrototypeKind::Edge(kind),
        }
    }

    /// Stable resource key, e.g. `abstractclass`
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn kind(&self) -> PrototypeKind {
        self.kind
    }

    /// Resource key of the palette tooltip
    pub fn tooltip_key(&self) -> String {
        format!("{}.tooltip", self.key)
    }

    /// Finds a default prototype by key.
    pub fn by_key(key: &str) -> Option<Prototype> {
        Self::DEFAULTS.iter().copied().find(|p| p.key == key)
    }
}
