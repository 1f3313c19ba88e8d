use metabuilder::{
    builder::DiagramBuilder,
    clipboard::Clipboard,
    diagram::Diagram,
    element::{EdgeId, EdgeKind, ElementId, NodeId, NodeKind},
    geometry::Point,
    operation::DiagramOperation,
    router::{self, SegmentationStyle},
    viewer::DiagramViewer,
};

struct Fixture {
    diagram: Diagram,
    builder: DiagramBuilder,
}

impl Fixture {
    fn new() -> Self {
        Self {
            diagram: Diagram::new(),
            builder: DiagramBuilder::default(),
        }
    }

    fn add(&mut self, kind: NodeKind, x: i32, y: i32) -> NodeId {
        let node = self.diagram.create_named_element(kind);
        let mut operation = self
            .builder
            .create_add_element_operation(&self.diagram, node, Point::new(x, y))
            .expect("element can be added");
        operation.execute(&mut self.diagram);
        node
    }

    fn relate(&mut self, kind: EdgeKind, start: Point, end: Point) -> Option<EdgeId> {
        let edge = self.diagram.create_relationship(kind);
        let mut operation = self
            .builder
            .create_add_relationship_operation(&self.diagram, edge, start, end)?;
        operation.execute(&mut self.diagram);
        Some(edge)
    }

    fn connect(&mut self, kind: EdgeKind, start: NodeId, end: NodeId) -> EdgeId {
        let edge = self.diagram.create_relationship(kind);
        let mut operation = self
            .builder
            .create_connect_operation(&self.diagram, edge, start, end)
            .expect("relationship can be connected");
        operation.execute(&mut self.diagram);
        edge
    }

    fn viewer(&self) -> DiagramViewer<'_> {
        DiagramViewer::new(&self.diagram, self.builder.metrics())
    }
}

#[test]
fn test_first_child_is_placed_below_package_tab() {
    let mut fixture = Fixture::new();
    let package = fixture.add(NodeKind::Package, 0, 0);
    let node = fixture.add(NodeKind::CLASS, 50, 50);

    let element = fixture.diagram.named_element(node);
    assert_eq!(element.parent(), Some(package));
    assert_eq!(element.position(), Point::new(10, 30));
    assert_eq!(fixture.diagram.root_elements(), &[package]);
}

#[test]
fn test_converging_generalizations_share_the_arrowhead() {
    let mut fixture = Fixture::new();
    let parent = fixture.add(NodeKind::CLASS, 200, 0);
    let x = fixture.add(NodeKind::CLASS, 100, 300);
    let y = fixture.add(NodeKind::CLASS, 300, 300);
    let from_x = fixture
        .relate(EdgeKind::Generalization, Point::new(150, 320), Point::new(250, 30))
        .expect("generalization from x");
    let from_y = fixture
        .relate(EdgeKind::Generalization, Point::new(350, 320), Point::new(250, 30))
        .expect("generalization from y");
    assert_eq!(fixture.diagram.relationship(from_x).endpoints(), (x, parent));
    assert_eq!(fixture.diagram.relationship(from_y).endpoints(), (y, parent));

    let viewer = fixture.viewer();
    let path_x = router::route(&viewer, from_x);
    let path_y = router::route(&viewer, from_y);
    // Both arrive, without any nudge, at the middle of the bottom side.
    assert_eq!(path_x.last(), Some(&Point::new(250, 60)));
    assert_eq!(path_y.last(), Some(&Point::new(250, 60)));
}

#[test]
fn test_duplicate_relationship_is_rejected() {
    let mut fixture = Fixture::new();
    fixture.add(NodeKind::CLASS, 0, 0);
    fixture.add(NodeKind::CLASS, 300, 0);
    let (on_a, on_b) = (Point::new(50, 30), Point::new(350, 30));

    assert!(fixture.relate(EdgeKind::Association, on_a, on_b).is_some());

    let second = fixture.diagram.create_relationship(EdgeKind::Association);
    assert!(!fixture.builder.can_add_relationship(&fixture.diagram, second, on_a, on_b));
    assert!(fixture
        .builder
        .create_add_relationship_operation(&fixture.diagram, second, on_a, on_b)
        .is_none());

    // Other kinds and the opposite direction are still allowed.
    assert!(fixture.builder.can_add_relationship(&fixture.diagram, second, on_b, on_a));
    let composition = fixture.diagram.create_relationship(EdgeKind::Composition);
    assert!(fixture.builder.can_add_relationship(&fixture.diagram, composition, on_a, on_b));
}

#[test]
fn test_overlapping_elements_fall_back_to_straight() {
    let mut fixture = Fixture::new();
    let a = fixture.add(NodeKind::CLASS, 0, 0);
    let b = fixture.add(NodeKind::DataType, 50, 30);
    let edge = fixture.connect(EdgeKind::Association, a, b);

    let viewer = fixture.viewer();
    assert!(!SegmentationStyle::Hvh.is_possible(&viewer, edge));
    assert!(!SegmentationStyle::Vhv.is_possible(&viewer, edge));
    let path = router::route(&viewer, edge);
    assert_eq!(path, SegmentationStyle::Straight.path(&viewer, edge));
    assert_eq!(path.len(), 2);
}

#[test]
fn test_self_relationship_is_a_loop() {
    let mut fixture = Fixture::new();
    let node = fixture.add(NodeKind::CLASS, 500, 500);
    let edge = fixture.connect(EdgeKind::Association, node, node);

    let viewer = fixture.viewer();
    let corner = viewer.top_right_corner(node);
    for style in [
        SegmentationStyle::Straight,
        SegmentationStyle::Hvh,
        SegmentationStyle::Vhv,
    ] {
        let path = style.path(&viewer, edge);
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], corner.translated(-20, 0));
        assert_eq!(path[4], corner.translated(0, 20));
    }
}

#[test]
fn test_removing_package_removes_attached_relationships() {
    let mut fixture = Fixture::new();
    let package = fixture.add(NodeKind::Package, 0, 0);
    let first = fixture.add(NodeKind::CLASS, 50, 50);
    let second = fixture.add(NodeKind::CLASS, 110, 90);
    let outside = fixture.add(NodeKind::CLASS, 600, 0);
    let other = fixture.add(NodeKind::Enumeration, 600, 300);
    let to_outside = fixture.connect(EdgeKind::Association, first, outside);
    let from_outside = fixture.connect(EdgeKind::Generalization, outside, second);
    let unrelated = fixture.connect(EdgeKind::Composition, other, outside);
    let before = fixture.diagram.clone();

    let mut removal = fixture
        .builder
        .create_remove_elements_operation(&fixture.diagram, &[package.into()]);
    assert_eq!(removal.edit_count(), 3);
    removal.execute(&mut fixture.diagram);

    let diagram = &fixture.diagram;
    assert!(!diagram.contains(package));
    assert!(!diagram.contains(first));
    assert!(!diagram.contains(to_outside));
    assert!(!diagram.contains(from_outside));
    assert_eq!(diagram.relationships(), &[unrelated]);
    assert_eq!(diagram.root_elements(), &[outside, other]);

    removal.undo(&mut fixture.diagram);
    assert_eq!(fixture.diagram, before);
}

#[test]
fn test_removing_point_removes_anchored_relationships() {
    let mut fixture = Fixture::new();
    let a = fixture.add(NodeKind::CLASS, 0, 0);
    let point = fixture.add(NodeKind::Point, 300, 300);
    let edge = fixture.connect(EdgeKind::Association, a, point);
    let before = fixture.diagram.clone();

    let mut removal = fixture
        .builder
        .create_remove_elements_operation(&fixture.diagram, &[point.into()]);
    removal.execute(&mut fixture.diagram);
    assert!(!fixture.diagram.contains(edge));
    assert!(fixture.diagram.contains(a));

    removal.undo(&mut fixture.diagram);
    assert_eq!(fixture.diagram, before);
}

#[test]
fn test_removing_only_child_keeps_package_in_place() {
    let mut fixture = Fixture::new();
    let package = fixture.add(NodeKind::Package, 200, 200);
    let child = fixture.add(NodeKind::CLASS, 250, 250);
    // Dragging the child drags the package outline along.
    fixture.diagram.translate(child, 100, 50);
    let drawn_at = fixture.viewer().bounds(package).origin();
    let before = fixture.diagram.clone();

    let mut removal = fixture
        .builder
        .create_remove_elements_operation(&fixture.diagram, &[child.into()]);
    removal.execute(&mut fixture.diagram);
    assert!(fixture.diagram.named_element(package).children().is_empty());
    assert_eq!(fixture.viewer().bounds(package).origin(), drawn_at);

    removal.undo(&mut fixture.diagram);
    assert_eq!(fixture.diagram, before);
}

#[test]
fn test_removing_mixed_selection_is_reversible() {
    let mut fixture = Fixture::new();
    let outer = fixture.add(NodeKind::Package, 0, 0);
    let inner = fixture.add(NodeKind::Package, 50, 50);
    let deep = fixture.add(NodeKind::CLASS, 60, 90);
    let sibling = fixture.add(NodeKind::DataType, 110, 120);
    let root = fixture.add(NodeKind::CLASS, 700, 700);
    let e1 = fixture.connect(EdgeKind::Association, root, deep);
    let e2 = fixture.connect(EdgeKind::Association, sibling, root);
    let e3 = fixture.connect(EdgeKind::Generalization, deep, sibling);
    assert_eq!(fixture.diagram.named_element(deep).parent(), Some(inner));
    assert_eq!(fixture.diagram.named_element(sibling).parent(), Some(inner));
    let before = fixture.diagram.clone();

    let selection: Vec<ElementId> = vec![deep.into(), e2.into(), inner.into(), sibling.into()];
    let mut removal = fixture
        .builder
        .create_remove_elements_operation(&fixture.diagram, &selection);
    removal.execute(&mut fixture.diagram);
    for edge in [e1, e2, e3] {
        assert!(!fixture.diagram.contains(edge));
    }
    assert!(!fixture.diagram.contains(deep));
    assert_eq!(fixture.diagram.root_elements(), &[outer, root]);

    removal.undo(&mut fixture.diagram);
    assert_eq!(fixture.diagram, before);
}

#[test]
fn test_link_to_package_and_back() {
    let mut fixture = Fixture::new();
    let class = fixture.add(NodeKind::CLASS, 20, 40);
    let package = fixture.add(NodeKind::Package, 600, 600);
    fixture.diagram.translate(package, -600, -600);
    let before = fixture.diagram.clone();

    assert!(!fixture.builder.can_link_to_package(&fixture.diagram, &[]));
    assert!(!fixture.builder.can_link_to_package(&fixture.diagram, &[package]));
    assert!(fixture.builder.can_link_to_package(&fixture.diagram, &[class]));

    let mut link = fixture
        .builder
        .create_link_to_package_operation(&fixture.diagram, &[class])
        .expect("class lies on the package");
    link.execute(&mut fixture.diagram);
    assert_eq!(fixture.diagram.named_element(class).parent(), Some(package));
    assert_eq!(fixture.diagram.root_elements(), &[package]);

    let mut unlink = fixture
        .builder
        .create_unlink_from_package_operation(&fixture.diagram, &[class])
        .expect("class has a parent");
    unlink.execute(&mut fixture.diagram);
    assert!(!fixture.diagram.named_element(class).has_parent());
    assert_eq!(fixture.diagram.root_elements(), &[package, class]);

    unlink.undo(&mut fixture.diagram);
    link.undo(&mut fixture.diagram);
    assert_eq!(fixture.diagram, before);
}

#[test]
fn test_paste_adds_copies() {
    let mut fixture = Fixture::new();
    let a = fixture.add(NodeKind::CLASS, 0, 0);
    let b = fixture.add(NodeKind::CLASS, 300, 0);
    let edge = fixture.connect(EdgeKind::Composition, a, b);

    let mut clipboard = Clipboard::new();
    clipboard.copy(&fixture.diagram, &[a.into(), b.into(), edge.into()]);
    let pasted = clipboard.paste_into(&mut fixture.diagram);
    let before = fixture.diagram.clone();

    let mut paste = fixture
        .builder
        .create_add_elements_operation(&fixture.diagram, &pasted);
    paste.execute(&mut fixture.diagram);
    assert_eq!(fixture.diagram.root_elements().len(), 4);
    assert_eq!(fixture.diagram.relationships().len(), 2);
    assert!(pasted.iter().all(|&element| fixture.diagram.contains(element)));

    paste.undo(&mut fixture.diagram);
    assert_eq!(fixture.diagram, before);
}

#[test]
fn test_move_and_property_edits_are_reversible() {
    let mut fixture = Fixture::new();
    let package = fixture.add(NodeKind::Package, 0, 0);
    let child = fixture.add(NodeKind::CLASS, 50, 50);
    let before = fixture.diagram.clone();

    let mut moved = fixture.builder.create_move_element_operation(package, 40, 10);
    moved.execute(&mut fixture.diagram);
    assert_eq!(fixture.diagram.named_element(child).position(), Point::new(50, 40));

    let mut renamed = fixture.builder.create_set_property_operation(child, "name", "Shape");
    renamed.execute(&mut fixture.diagram);
    assert_eq!(fixture.diagram.named_element(child).name(), "Shape");

    renamed.undo(&mut fixture.diagram);
    moved.undo(&mut fixture.diagram);
    assert_eq!(fixture.diagram, before);
}
