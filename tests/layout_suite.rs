use orthoflow::layout::{GraphLayout, GraphResult, GraphSpec};
use orthoflow::{
    Association, Compartment, Config, Direction, Directive, FontStyle, Measurer, Node,
    apply_directives, layout,
};
use orthoflow::{DagreLayout, LayoutedCompartment};
use std::collections::BTreeMap;

/// Seven units per character, independent of any installed font.
struct CharMeasurer;

impl Measurer for CharMeasurer {
    fn text_width(&self, text: &str, _family: &str, _size: f32, _style: FontStyle) -> f32 {
        text.chars().count() as f32 * 7.0
    }
}

/// Places nodes along the rank axis in declaration order.
struct RowLayout;

impl GraphLayout for RowLayout {
    fn solve(&self, spec: &GraphSpec) -> GraphResult {
        let mut positions = BTreeMap::new();
        let mut cursor = 0.0f32;
        let mut breadth = 0.0f32;
        for node in &spec.nodes {
            let (advance, side) = match spec.direction {
                Direction::LeftRight => (node.width, node.height),
                Direction::TopBottom => (node.height, node.width),
            };
            let center = cursor + advance / 2.0;
            let position = match spec.direction {
                Direction::LeftRight => (center, side / 2.0),
                Direction::TopBottom => (side / 2.0, center),
            };
            positions.insert(
                node.id.clone(),
                orthoflow::geometry::Vec2::new(position.0, position.1),
            );
            cursor += advance + spec.node_spacing;
            breadth = breadth.max(side);
        }
        let along = (cursor - spec.node_spacing).max(0.0);
        let (width, height) = match spec.direction {
            Direction::LeftRight => (along, breadth),
            Direction::TopBottom => (breadth, along),
        };
        GraphResult {
            positions,
            width,
            height,
        }
    }
}

/// Route engine debug traces to the test output when RUST_LOG is set.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn labeled(start: &str, end: &str, start_label: &str, end_label: &str) -> Association {
    Association {
        start_label: Some(start_label.to_string()),
        end_label: Some(end_label.to_string()),
        ..Association::new(start, end, "->")
    }
}

/// A package node containing two connected leaves, next to a free leaf.
fn nested_tree() -> Compartment {
    let mut inner = Compartment::from_lines(vec!["Engine".to_string()]);
    inner.nodes.push(Node::new("Parser", "class"));
    inner.nodes.push(Node::new("Router", "class"));
    inner
        .assocs
        .push(labeled("Parser", "Router", "feeds", "1"));
    let engine = Node {
        id: "Engine".to_string(),
        kind: "frame".to_string(),
        attrs: Default::default(),
        parts: vec![inner],
    };

    let mut root = Compartment::default();
    root.nodes.push(engine);
    root.nodes.push(Node::new("Client", "class"));
    root.assocs.push(Association::new("Client", "Engine", "->"));
    root
}

fn assert_orthogonal(laid: &LayoutedCompartment) {
    for assoc in &laid.assocs {
        for pair in assoc.path.windows(2) {
            assert!(
                pair[0].x == pair[1].x || pair[0].y == pair[1].y,
                "diagonal segment in {} -> {}: {:?}",
                assoc.start,
                assoc.end,
                pair
            );
        }
    }
    for node in &laid.nodes {
        for part in &node.parts {
            assert_orthogonal(part);
        }
    }
}

fn assert_paths_terminate_at_centers(laid: &LayoutedCompartment) {
    for assoc in &laid.assocs {
        let start = laid
            .nodes
            .iter()
            .find(|n| n.id == assoc.start)
            .expect("start node present");
        let end = laid
            .nodes
            .iter()
            .find(|n| n.id == assoc.end)
            .expect("end node present");
        assert_eq!(assoc.path[0], start.center());
        assert_eq!(*assoc.path.last().unwrap(), end.center());
        assert!(assoc.path.len() >= 4, "path must pass through the ports");
    }
    for node in &laid.nodes {
        for part in &node.parts {
            assert_paths_terminate_at_centers(part);
        }
    }
}

#[test]
fn nested_tree_lays_out_with_routed_paths() {
    init_logging();
    let config = Config::default();
    let root = nested_tree();
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);

    assert!(laid.width > 0.0);
    assert!(laid.height > 0.0);
    assert_eq!(laid.nodes.len(), 2);
    assert_eq!(laid.assocs.len(), 1);
    assert_orthogonal(&laid);
    assert_paths_terminate_at_centers(&laid);

    // The frame node grew around its inner graph.
    let engine = laid.nodes.iter().find(|n| n.id == "Engine").unwrap();
    let inner = &engine.parts[0];
    assert_eq!(inner.nodes.len(), 2);
    assert_eq!(inner.assocs.len(), 1);
    assert!(engine.width >= inner.nodes[0].width);
    assert!(engine.height > inner.nodes[0].height + inner.nodes[1].height);
}

#[test]
fn association_labels_are_placed_beside_the_path_ends() {
    init_logging();
    let config = Config::default();
    let mut root = Compartment::default();
    root.nodes.push(Node::new("A", "class"));
    root.nodes.push(Node::new("B", "class"));
    root.assocs.push(labeled("A", "B", "from", "to"));
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);

    let assoc = &laid.assocs[0];
    assert_eq!(assoc.start_label.text.as_deref(), Some("from"));
    assert_eq!(assoc.end_label.text.as_deref(), Some("to"));
    assert_eq!(assoc.start_label.width, 4.0 * 7.0);
    assert_eq!(assoc.start_label.height, config.font_size);

    // Each label hugs its anchor point within one padding of offset.
    let start_anchor = assoc.path[1];
    let dx = (assoc.start_label.x - start_anchor.x)
        .abs()
        .min((assoc.start_label.x + assoc.start_label.width - start_anchor.x).abs());
    assert!(dx <= config.padding + 0.001);
}

#[test]
fn explicitly_positioned_node_is_pinned() {
    init_logging();
    let config = Config::default();
    let mut root = nested_tree();
    apply_directives(&mut root, &[Directive::new("pos", "Client=300,40")]);
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);

    let client = laid.nodes.iter().find(|n| n.id == "Client").unwrap();
    assert!(client.fixed);
    assert_eq!((client.x, client.y), (300.0, 40.0));
    assert_orthogonal(&laid);
    assert_paths_terminate_at_centers(&laid);
    // The compartment still spans the pinned node.
    assert!(laid.width >= client.x + laid.offset.x + client.width / 2.0);
}

#[test]
fn parent_directive_moves_a_node_before_layout() {
    init_logging();
    let config = Config::default();
    let mut root = nested_tree();
    apply_directives(&mut root, &[Directive::new("parent", "Client=Engine")]);
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);

    assert_eq!(laid.nodes.len(), 1);
    let engine = &laid.nodes[0];
    assert!(engine.parts[0].nodes.iter().any(|n| n.id == "Client"));
    // The root association lost an endpoint and is dropped, not dangling.
    assert!(laid.assocs.is_empty());
}

#[test]
fn routed_path_detours_around_a_node_in_the_way() {
    init_logging();
    let config = Config {
        direction: Direction::LeftRight,
        ..Config::default()
    };
    let mut root = Compartment::default();
    for (id, x) in [("A", 0.0f32), ("C", 100.0), ("B", 200.0)] {
        let mut node = Node::new(id, "class");
        node.attrs.x = Some(x);
        node.attrs.y = Some(0.0);
        root.nodes.push(node);
    }
    root.assocs.push(Association::new("A", "B", "->"));
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);

    let assoc = &laid.assocs[0];
    let blocker = laid.nodes.iter().find(|n| n.id == "C").unwrap();
    let margin = config.edge_margin + config.padding + 2.0;
    let left = blocker.x - blocker.width / 2.0 - margin;
    let right = blocker.x + blocker.width / 2.0 + margin;
    let top = blocker.y - blocker.height / 2.0 - margin;
    let bottom = blocker.y + blocker.height / 2.0 + margin;

    // No interior segment passes strictly through the inflated blocker box.
    for pair in assoc.path[1..assoc.path.len() - 1].windows(2) {
        let (p, q) = (pair[0], pair[1]);
        let crosses = if p.x == q.x {
            p.x > left && p.x < right && p.y.max(q.y) > top && p.y.min(q.y) < bottom
        } else {
            p.y > top && p.y < bottom && p.x.max(q.x) > left && p.x.min(q.x) < right
        };
        assert!(!crosses, "segment {p:?} -> {q:?} crosses the blocker");
    }
    assert_paths_terminate_at_centers(&laid);
}

#[test]
fn pinned_node_without_associations_keeps_its_coordinates() {
    init_logging();
    let config = Config::default();
    let mut root = Compartment::default();
    let mut node = Node::new("Only", "class");
    node.attrs.x = Some(100.0);
    node.attrs.y = Some(50.0);
    root.nodes.push(node);
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);

    let only = &laid.nodes[0];
    assert!(only.fixed);
    assert_eq!((only.x, only.y), (100.0, 50.0));
    assert!(laid.width >= only.x + laid.offset.x + only.width / 2.0);
    assert!(laid.height >= only.y + laid.offset.y + only.height / 2.0);
}

#[test]
fn layout_is_reproducible() {
    init_logging();
    let config = Config::default();
    let root = nested_tree();
    let first = layout(&CharMeasurer, &RowLayout, &config, &root);
    let second = layout(&CharMeasurer, &RowLayout, &config, &root);
    assert_eq!(first, second);
}

#[test]
fn left_right_direction_ranks_horizontally() {
    init_logging();
    let config = Config {
        direction: Direction::LeftRight,
        ..Config::default()
    };
    let mut root = Compartment::default();
    root.nodes.push(Node::new("A", "class"));
    root.nodes.push(Node::new("B", "class"));
    root.assocs.push(Association::new("A", "B", "->"));
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);

    let a = laid.nodes.iter().find(|n| n.id == "A").unwrap();
    let b = laid.nodes.iter().find(|n| n.id == "B").unwrap();
    assert!(b.x > a.x);
    assert_eq!(a.y, b.y);
}

#[test]
fn dagre_backend_end_to_end() {
    init_logging();
    let config = Config::default();
    let root = nested_tree();
    let laid = layout(&CharMeasurer, &DagreLayout, &config, &root);

    assert!(laid.width > 0.0);
    assert!(laid.height > 0.0);
    assert_orthogonal(&laid);
    assert_paths_terminate_at_centers(&laid);

    let rerun = layout(&CharMeasurer, &DagreLayout, &config, &root);
    assert_eq!(laid, rerun);
}

#[test]
fn json_export_mirrors_the_layout() {
    init_logging();
    let config = Config::default();
    let root = nested_tree();
    let laid = layout(&CharMeasurer, &RowLayout, &config, &root);
    let text = orthoflow::dump::to_json(&laid).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["width"], serde_json::json!(laid.width));
    assert_eq!(value["root"]["nodes"].as_array().unwrap().len(), 2);
    let path = &value["root"]["assocs"][0]["path"];
    assert!(path.as_array().unwrap().len() >= 4);
}
