//! Plain-text layout report of a replayed scene.

use std::fmt::{self, Write};

use metabuilder::{element::NodeId, geometry::Point, render::RenderPass, viewer::TextMetrics};

use crate::scene::Replay;

/// Writes one line per element, in paint order, then one line per
/// relationship with its routed path.
pub fn write_report(replay: &Replay, metrics: &TextMetrics) -> Result<String, fmt::Error> {
    let diagram = replay.diagram();
    let pass = RenderPass::new(metrics, diagram);
    let rendered = pass.render();

    let label = |node: NodeId| replay.id(node).map_or_else(|| node.to_string(), str::to_string);

    let mut out = String::new();
    writeln!(out, "diagram {:?} {}", diagram.name(), rendered.bounds)?;

    writeln!(out, "elements:")?;
    for element in &rendered.elements {
        let named = diagram.named_element(element.node);
        let parent = named.parent().map_or_else(|| "-".to_string(), label);
        writeln!(
            out,
            "{:indent$}{} {} {:?} parent={} bounds={}",
            "",
            label(element.node),
            element.kind,
            named.name(),
            parent,
            element.bounds,
            indent = 2 + 2 * element.depth,
        )?;
    }

    writeln!(out, "relationships:")?;
    for relationship in &rendered.relationships {
        let (start, end) = diagram.relationship(relationship.edge).endpoints();
        let path: Vec<String> = relationship.path.iter().map(Point::to_string).collect();
        writeln!(
            out,
            "  {} {} -> {}: {}",
            relationship.kind,
            label(start),
            label(end),
            path.join(" ")
        )?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use metabuilder::builder::DiagramBuilder;

    use super::*;
    use crate::scene::{Scene, replay};

    #[test]
    fn test_report_lists_nested_elements_and_paths() {
        let src = r#"
[[element]]
id = "model"
kind = "package"
at = { x = 0, y = 0 }

[[element]]
id = "item"
kind = "class"
name = "Item"
at = { x = 20, y = 20 }

[[element]]
id = "order"
kind = "class"
name = "Order"
at = { x = 400, y = 20 }

[[relationship]]
kind = "composition"
start = "order"
end = "item"
"#;
        let builder = DiagramBuilder::default();
        let replay = replay(&Scene::parse(src).unwrap(), &builder).unwrap();
        let report = write_report(&replay, builder.metrics()).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[1], "elements:");
        assert!(lines[2].starts_with("  model package \"\" parent=- bounds=(0, 0, "));
        assert!(lines[3].starts_with("    item class \"Item\" parent=model bounds=(10, 30, "));
        assert!(lines[4].starts_with("  order class \"Order\" parent=- bounds=(400, 20, "));
        assert_eq!(lines[5], "relationships:");
        assert!(lines[6].starts_with("  composition order -> item: "));
    }
}
