//! Scene files and their replay through the diagram builder.
//!
//! A scene is a TOML list of elements and relationships. Elements are added
//! at a requested point, so the builder decides containment and clipping
//! exactly as it would for an interactive drop. Relationships refer to
//! elements by their scene id.
//!
//! ```toml
//! [[element]]
//! id = "shape"
//! kind = "abstract-class"
//! name = "Shape"
//! at = { x = 200, y = 40 }
//!
//! [[relationship]]
//! kind = "generalization"
//! start = "circle"
//! end = "shape"
//! ```

use std::collections::HashMap;

use log::{debug, info};
use serde::Deserialize;

use metabuilder::{
    MetabuilderError,
    builder::DiagramBuilder,
    diagram::Diagram,
    element::{EdgeKind, NodeId, NodeKind},
    geometry::Point,
    operation::{DiagramOperation, Operation},
    property::keys,
};

/// A parsed scene file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Diagram name.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSpec>,

    #[serde(default, rename = "relationship")]
    pub relationships: Vec<RelationshipSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    pub at: Point,
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(default)]
    pub methods: Option<String>,
    #[serde(default)]
    pub literals: Option<String>,
}

impl ElementSpec {
    fn overrides(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (keys::NAME, &self.name),
            (keys::ATTRIBUTES, &self.attributes),
            (keys::METHODS, &self.methods),
            (keys::LITERALS, &self.literals),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key, value)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RelationshipSpec {
    pub kind: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub start_label: Option<String>,
    #[serde(default)]
    pub mid_label: Option<String>,
    #[serde(default)]
    pub end_label: Option<String>,
    /// `NoDirection`, `UniDirection` or `BiDirection`.
    #[serde(default)]
    pub direction: Option<String>,
}

impl RelationshipSpec {
    fn overrides(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (keys::START_LABEL, &self.start_label),
            (keys::MIDDLE_LABEL, &self.mid_label),
            (keys::END_LABEL, &self.end_label),
            (keys::DIRECTION, &self.direction),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key, value)))
    }
}

impl Scene {
    /// Parses scene text.
    ///
    /// # Errors
    ///
    /// Returns [`MetabuilderError::Scene`] carrying the span of the
    /// malformed source.
    pub fn parse(src: &str) -> Result<Self, MetabuilderError> {
        toml::from_str(src)
            .map_err(|err| MetabuilderError::new_scene_error(err.message(), err.span(), src))
    }
}

/// A diagram built from a scene, with the operations that built it.
#[derive(Debug)]
pub struct Replay {
    diagram: Diagram,
    history: Vec<Operation>,
    ids: HashMap<NodeId, String>,
}

impl Replay {
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Executed operations, oldest first.
    pub fn history(&self) -> &[Operation] {
        &self.history
    }

    /// Scene id of `node`.
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.ids.get(&node).map(String::as_str)
    }

    /// Undoes every operation, newest first.
    pub fn undo_all(&mut self) {
        while let Some(mut operation) = self.history.pop() {
            operation.undo(&mut self.diagram);
        }
    }

    fn execute(&mut self, mut operation: Operation) {
        operation.execute(&mut self.diagram);
        self.history.push(operation);
    }
}

/// Replays `scene` through `builder`.
///
/// # Errors
///
/// Fails on an unknown kind, a duplicate or unknown element id, and on any
/// element or relationship the builder refuses.
pub fn replay(scene: &Scene, builder: &DiagramBuilder) -> Result<Replay, MetabuilderError> {
    let mut replay = Replay {
        diagram: Diagram::new(),
        history: Vec::new(),
        ids: HashMap::new(),
    };
    if let Some(name) = &scene.name {
        replay.diagram.set_name(name.clone());
    }
    let mut nodes: HashMap<&str, NodeId> = HashMap::new();

    for spec in &scene.elements {
        let kind: NodeKind = spec.kind.parse()?;
        if nodes.contains_key(spec.id.as_str()) {
            return Err(MetabuilderError::Rejected(format!(
                "element id `{}` is used twice",
                spec.id
            )));
        }

        let node = replay.diagram.create_named_element(kind);
        for (key, value) in spec.overrides() {
            replay.execute(builder.create_set_property_operation(node, key, value));
        }
        let operation = builder
            .create_add_element_operation(&replay.diagram, node, spec.at)
            .ok_or_else(|| {
                MetabuilderError::Rejected(format!("element `{}` cannot be added at {}", spec.id, spec.at))
            })?;
        replay.execute(operation);

        debug!(id = spec.id.as_str(), node:%, kind:%; "Scene element added");
        nodes.insert(spec.id.as_str(), node);
        replay.ids.insert(node, spec.id.clone());
    }

    for spec in &scene.relationships {
        let kind: EdgeKind = spec.kind.parse()?;
        let lookup = |id: &str| {
            nodes
                .get(id)
                .copied()
                .ok_or_else(|| MetabuilderError::UnknownReference(id.to_string()))
        };
        let (start, end) = (lookup(&spec.start)?, lookup(&spec.end)?);

        let edge = replay.diagram.create_relationship(kind);
        for (key, value) in spec.overrides() {
            replay.execute(builder.create_set_property_operation(edge, key, value));
        }
        let operation = builder
            .create_connect_operation(&replay.diagram, edge, start, end)
            .ok_or_else(|| {
                MetabuilderError::Rejected(format!(
                    "{kind} from `{}` to `{}` is not allowed",
                    spec.start, spec.end
                ))
            })?;
        replay.execute(operation);
        debug!(edge:%, kind:%; "Scene relationship added");
    }

    info!(
        elements = scene.elements.len(),
        relationships = scene.relationships.len(),
        operations = replay.history.len();
        "Scene replayed"
    );
    Ok(replay)
}
