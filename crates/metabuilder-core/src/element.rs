//! Element identities, kinds and per-element state.
//!
//! Elements live in the arena of a [`Diagram`](crate::diagram::Diagram) and
//! are addressed by copyable handles:
//!
//! - [`NodeId`] - a named element (class, package, data type, ...)
//! - [`EdgeId`] - a relationship between two named elements
//! - [`ElementId`] - either of the two
//!
//! Handles compare by identity. Two elements with identical properties are
//! still different elements.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    geometry::Point,
    property::{self, Attribute, Method, Properties, keys},
};

/// Handle to a named element stored in a diagram arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Handle to a relationship stored in a diagram arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Handle to any element of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Node(NodeId),
    Edge(EdgeId),
}

impl ElementId {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            ElementId::Node(id) => Some(id),
            ElementId::Edge(_) => None,
        }
    }

    pub fn as_edge(self) -> Option<EdgeId> {
        match self {
            ElementId::Edge(id) => Some(id),
            ElementId::Node(_) => None,
        }
    }
}

impl From<NodeId> for ElementId {
    fn from(id: NodeId) -> Self {
        ElementId::Node(id)
    }
}

impl From<EdgeId> for ElementId {
    fn from(id: EdgeId) -> Self {
        ElementId::Edge(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Node(id) => id.fmt(f),
            ElementId::Edge(id) => id.fmt(f),
        }
    }
}

/// Error returned when a kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element kind `{0}`")]
pub struct ParseKindError(pub String);

/// The kind of a named element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Class { is_abstract: bool, is_interface: bool },
    Package,
    DataType,
    Enumeration,
    /// Zero-size anchor used as a relationship endpoint.
    Point,
}

impl NodeKind {
    pub const CLASS: NodeKind = NodeKind::Class {
        is_abstract: false,
        is_interface: false,
    };
    pub const ABSTRACT_CLASS: NodeKind = NodeKind::Class {
        is_abstract: true,
        is_interface: false,
    };
    pub const INTERFACE: NodeKind = NodeKind::Class {
        is_abstract: false,
        is_interface: true,
    };

    /// Stable, human readable kind name.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Class {
                is_interface: true, ..
            } => "interface",
            NodeKind::Class {
                is_abstract: true, ..
            } => "abstract-class",
            NodeKind::Class { .. } => "class",
            NodeKind::Package => "package",
            NodeKind::DataType => "data-type",
            NodeKind::Enumeration => "enumeration",
            NodeKind::Point => "point",
        }
    }

    pub fn is_package(self) -> bool {
        matches!(self, NodeKind::Package)
    }

    pub fn is_point(self) -> bool {
        matches!(self, NodeKind::Point)
    }

    /// Property map a fresh element of this kind starts with.
    pub fn default_properties(self) -> Properties {
        let mut properties = Properties::new();
        properties.put(keys::NAME, "");
        match self {
            NodeKind::Class { .. } => {
                properties.put(keys::ATTRIBUTES, "");
                properties.put(keys::METHODS, "");
            }
            NodeKind::Enumeration => {
                properties.put(keys::LITERALS, "");
            }
            NodeKind::Package | NodeKind::DataType | NodeKind::Point => {}
        }
        properties
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(NodeKind::CLASS),
            "abstract-class" => Ok(NodeKind::ABSTRACT_CLASS),
            "interface" => Ok(NodeKind::INTERFACE),
            "package" => Ok(NodeKind::Package),
            "data-type" => Ok(NodeKind::DataType),
            "enumeration" => Ok(NodeKind::Enumeration),
            "point" => Ok(NodeKind::Point),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// The kind of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    Association,
    Composition,
    Generalization,
}

impl EdgeKind {
    pub fn name(self) -> &'static str {
        match self {
            EdgeKind::Association => "association",
            EdgeKind::Composition => "composition",
            EdgeKind::Generalization => "generalization",
        }
    }

    /// Returns `true` for kinds carrying start, middle and end labels.
    pub fn has_labels(self) -> bool {
        !matches!(self, EdgeKind::Generalization)
    }

    pub fn default_properties(self) -> Properties {
        let mut properties = Properties::new();
        if self.has_labels() {
            properties.put(keys::START_LABEL, "");
            properties.put(keys::MIDDLE_LABEL, "");
            properties.put(keys::END_LABEL, "");
        }
        if self == EdgeKind::Association {
            properties.put(keys::DIRECTION, AssociationDirection::None.as_str());
        }
        properties
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "association" => Ok(EdgeKind::Association),
            "composition" => Ok(EdgeKind::Composition),
            "generalization" => Ok(EdgeKind::Generalization),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Navigability of an association.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssociationDirection {
    #[default]
    None,
    Uni,
    Bi,
}

impl AssociationDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            AssociationDirection::None => "NoDirection",
            AssociationDirection::Uni => "UniDirection",
            AssociationDirection::Bi => "BiDirection",
        }
    }

    /// Reads a direction property value; unknown text means no direction.
    pub fn from_property(value: &str) -> Self {
        match value.trim() {
            "UniDirection" => AssociationDirection::Uni,
            "BiDirection" => AssociationDirection::Bi,
            _ => AssociationDirection::None,
        }
    }
}

/// State of a named element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedElement {
    pub(crate) kind: NodeKind,
    pub(crate) properties: Properties,
    pub(crate) position: Point,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attached: bool,
}

impl NamedElement {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            properties: kind.default_properties(),
            position: Point::default(),
            parent: None,
            children: Vec::new(),
            attached: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn name(&self) -> &str {
        self.properties.value(keys::NAME)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Children in back-to-front order. Always empty for non-packages.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns `true` while the element is reachable from a diagram.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        property::parse_attributes(self.properties.value(keys::ATTRIBUTES))
    }

    pub fn methods(&self) -> Vec<Method> {
        property::parse_methods(self.properties.value(keys::METHODS))
    }

    pub fn literals(&self) -> Vec<String> {
        property::parse_literals(self.properties.value(keys::LITERALS))
    }
}

/// State of a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub(crate) kind: EdgeKind,
    pub(crate) properties: Properties,
    pub(crate) start: Option<NodeId>,
    pub(crate) end: Option<NodeId>,
    pub(crate) attached: bool,
}

impl Relationship {
    pub(crate) fn new(kind: EdgeKind) -> Self {
        Self {
            kind,
            properties: kind.default_properties(),
            start: None,
            end: None,
            attached: false,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn start(&self) -> Option<NodeId> {
        self.start
    }

    pub fn end(&self) -> Option<NodeId> {
        self.end
    }

    /// Start and end of a connected relationship.
    ///
    /// # Panics
    ///
    /// Panics if the relationship was never connected.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => panic!("relationship has no endpoints"),
        }
    }

    /// Returns `true` when start and end are the same element.
    pub fn is_self_relationship(&self) -> bool {
        self.start.is_some() && self.start == self.end
    }

    /// Returns `true` while the relationship is connected to a diagram.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn start_label(&self) -> &str {
        self.properties.value(keys::START_LABEL)
    }

    pub fn middle_label(&self) -> &str {
        self.properties.value(keys::MIDDLE_LABEL)
    }

    pub fn end_label(&self) -> &str {
        self.properties.value(keys::END_LABEL)
    }

    pub fn direction(&self) -> AssociationDirection {
        AssociationDirection::from_property(self.properties.value(keys::DIRECTION))
    }
}
