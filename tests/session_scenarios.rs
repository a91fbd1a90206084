//! End-to-end behavior of a session driving a render adapter.

use std::collections::BTreeSet;

use health_graph::model::parse_elements;
use health_graph::{
    DetailDisclosure, Edge, GraphError, GraphModel, LayoutAlgorithm, LayoutConfig, Node,
    RenderAdapter, Rgb, Segment, SelectionMode, Session, StyleSource, ViewConfig, ViewEvent,
    VisibleGraph,
};

#[derive(Debug, PartialEq)]
enum Call {
    Layout(LayoutAlgorithm),
    Render { nodes: Vec<String>, edges: Vec<String> },
    Refresh(Vec<String>),
}

#[derive(Default)]
struct RecordingAdapter {
    calls: Vec<Call>,
    queued: Vec<ViewEvent>,
    selected_seen: BTreeSet<String>,
}

impl RenderAdapter for RecordingAdapter {
    fn set_layout(&mut self, layout: &LayoutConfig) {
        self.calls.push(Call::Layout(layout.algorithm));
    }

    fn render(&mut self, graph: &VisibleGraph, styles: &dyn StyleSource) {
        self.selected_seen = graph
            .nodes
            .iter()
            .filter(|id| styles.node_style(id).is_some_and(|style| style.selected))
            .cloned()
            .collect();
        self.calls.push(Call::Render {
            nodes: graph.nodes.clone(),
            edges: graph.edges.iter().map(|edge| edge.id.clone()).collect(),
        });
    }

    fn refresh(&mut self, nodes: &BTreeSet<String>, styles: &dyn StyleSource) {
        for id in nodes {
            let selected = styles.node_style(id).is_some_and(|style| style.selected);
            if selected {
                self.selected_seen.insert(id.clone());
            } else {
                self.selected_seen.remove(id);
            }
        }
        self.calls.push(Call::Refresh(nodes.iter().cloned().collect()));
    }

    fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.queued)
    }
}

fn ab_model() -> GraphModel {
    GraphModel::load(
        [
            Node::new("A").with_health("red", 3.0).with_health("green", 7.0),
            Node::new("B")
                .with_health("red", 6.0)
                .with_health("green", 4.0)
                .with_parent("A"),
        ],
        [Edge::new("A->B", "A", "B")],
    )
    .unwrap()
}

fn session_with(mode: SelectionMode) -> Session {
    Session::new(
        ab_model(),
        ViewConfig {
            selection_mode: mode,
            ..ViewConfig::default()
        },
    )
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn collapse_hides_child_and_expand_restores_it() {
    let mut session = session_with(SelectionMode::Single);

    let full = session.get_visible_graph();
    assert_eq!(full.nodes, ids(&["A", "B"]));
    assert_eq!(full.edges.len(), 1);

    session.collapse("A").unwrap();
    let collapsed = session.get_visible_graph();
    assert_eq!(collapsed.nodes, ids(&["A"]));
    assert!(collapsed.edges.is_empty());
    assert_eq!(session.model().edge_count(), 1);

    session.expand("A").unwrap();
    assert_eq!(session.get_visible_graph(), full);
}

#[test]
fn selected_node_style_carries_segments_and_highlight() {
    let mut session = session_with(SelectionMode::Single);
    session.select("A");

    let style = session.get_node_style("A").unwrap();
    assert_eq!(
        style.segments,
        vec![
            Segment {
                category: "red".into(),
                color: Rgb::new(0xE8, 0x74, 0x7C),
                proportion: 0.3,
            },
            Segment {
                category: "green".into(),
                color: Rgb::new(0x74, 0xE8, 0x83),
                proportion: 0.7,
            },
        ]
    );
    assert!(style.selected);
    assert!(session.is_detail_visible("A"));
}

#[test]
fn single_mode_replaces_and_additive_mode_accumulates() {
    let mut single = session_with(SelectionMode::Single);
    single.select("A");
    single.select("B");
    assert_eq!(single.selected_ids().iter().collect::<Vec<_>>(), vec!["B"]);

    let mut additive = session_with(SelectionMode::Additive);
    additive.select("A");
    additive.select("B");
    assert_eq!(
        additive.selected_ids().iter().collect::<Vec<_>>(),
        vec!["A", "B"]
    );
}

#[test]
fn unknown_ids_are_ignored_by_selection_and_refused_by_hierarchy() {
    let mut session = session_with(SelectionMode::Single);
    session.select("ghost");
    assert!(session.selected_ids().is_empty());
    assert!(session.pending().nodes.is_empty());

    assert_eq!(
        session.collapse("ghost"),
        Err(GraphError::NotFound("ghost".into()))
    );
    assert!(session.collapse("B").is_ok());
    assert!(!session.hierarchy().can_undo());
}

#[test]
fn first_flush_sends_layout_then_full_render() {
    let mut session = session_with(SelectionMode::Single);
    let mut adapter = RecordingAdapter::default();

    assert!(session.flush(&mut adapter));
    assert_eq!(
        adapter.calls,
        vec![
            Call::Layout(LayoutAlgorithm::Breadthfirst),
            Call::Render {
                nodes: ids(&["A", "B"]),
                edges: ids(&["A->B"]),
            },
        ]
    );

    adapter.calls.clear();
    assert!(!session.flush(&mut adapter));
    assert!(adapter.calls.is_empty());
}

#[test]
fn selection_changes_refresh_only_affected_nodes() {
    let mut session = session_with(SelectionMode::Single);
    let mut adapter = RecordingAdapter::default();
    session.flush(&mut adapter);
    adapter.calls.clear();

    adapter.queued = vec![
        ViewEvent::NodeClicked("A".into()),
        ViewEvent::NodeClicked("B".into()),
    ];
    assert_eq!(session.pump(&mut adapter), 2);

    assert_eq!(
        adapter.calls,
        vec![Call::Refresh(ids(&["A"])), Call::Refresh(ids(&["A", "B"]))]
    );
    assert_eq!(adapter.selected_seen, BTreeSet::from(["B".to_owned()]));
}

#[test]
fn events_are_handled_in_arrival_order() {
    let mut session = session_with(SelectionMode::Additive);
    let mut adapter = RecordingAdapter::default();
    session.flush(&mut adapter);
    adapter.calls.clear();

    adapter.queued = vec![
        ViewEvent::NodeDoubleClicked("A".into()),
        ViewEvent::NodeDoubleClicked("ghost".into()),
        ViewEvent::Undo,
        ViewEvent::NodeClicked("B".into()),
    ];
    assert_eq!(session.pump(&mut adapter), 4);

    assert_eq!(
        adapter.calls,
        vec![
            Call::Render {
                nodes: ids(&["A"]),
                edges: Vec::new(),
            },
            Call::Render {
                nodes: ids(&["A", "B"]),
                edges: ids(&["A->B"]),
            },
            Call::Refresh(ids(&["B"])),
        ]
    );
    assert!(session.hierarchy().can_redo());
}

#[test]
fn collapse_all_is_one_undo_step() {
    let model = GraphModel::load(
        [
            Node::new("dc"),
            Node::new("rack").with_parent("dc"),
            Node::new("host").with_parent("rack"),
            Node::new("other"),
            Node::new("vm").with_parent("other"),
        ],
        [Edge::new("link", "host", "vm")],
    )
    .unwrap();
    let mut session = Session::from(model);
    let before = session.get_visible_graph();

    session.collapse_all();
    assert_eq!(session.get_visible_graph().nodes, ids(&["dc", "other"]));
    let redirected = &session.get_visible_graph().edges[0];
    assert_eq!((redirected.source.as_str(), redirected.target.as_str()), ("dc", "other"));
    assert!(redirected.redirected);

    assert!(session.undo());
    assert_eq!(session.get_visible_graph(), before);
    assert!(!session.undo());

    assert!(session.redo());
    assert_eq!(session.hierarchy().collapsed_ids().len(), 3);
}

#[test]
fn always_disclosure_shows_every_symptom() {
    let model = GraphModel::load(
        [
            Node::new("db").with_symptoms("<br>replication lag (4)"),
            Node::new("web"),
        ],
        Vec::<Edge>::new(),
    )
    .unwrap();
    let mut session = Session::from(model);
    assert_eq!(session.get_node_style("db").unwrap().detail, "");

    session.set_detail_disclosure(DetailDisclosure::Always);
    assert_eq!(
        session.pending().nodes.iter().collect::<Vec<_>>(),
        vec!["db"]
    );
    assert_eq!(
        session.get_node_style("db").unwrap().detail,
        "<br>replication lag (4)"
    );
}

#[test]
fn parsed_elements_drive_a_session() {
    let raw = r#"{
        "nodes": [
            {"data": {"id": "/vm", "name": "vm", "red": 2, "green": 8, "symptoms": ""}},
            {"data": {"id": "/vm/disk", "parent": "/vm", "red": 9, "green": 1,
                      "symptoms": "<br>disk full (9)"}}
        ],
        "edges": [
            {"data": {"source": "/vm/disk", "target": "/vm"}}
        ]
    }"#;
    let model = parse_elements(raw).unwrap().into_model().unwrap();
    let mut session = Session::from(model);

    session.select("/vm/disk");
    let style = session.get_node_style("/vm/disk").unwrap();
    assert_eq!(style.label, "/vm/disk");
    assert_eq!(style.segments.len(), 2);
    assert_eq!(style.detail, "<br>disk full (9)");

    session.collapse("/vm").unwrap();
    let graph = session.get_visible_graph();
    assert_eq!(graph.nodes, ids(&["/vm"]));
    assert!(graph.edges.is_empty());
    assert!(session.selection().is_selected("/vm/disk"));
}

#[test]
fn removing_inside_collapsed_subtree_keeps_hierarchy_consistent() {
    let mut session = session_with(SelectionMode::Single);
    let mut adapter = RecordingAdapter::default();
    session.collapse("A").unwrap();
    session.flush(&mut adapter);
    adapter.calls.clear();

    session.remove_node("B").unwrap();
    assert!(session.hierarchy().collapsed_ids().is_empty());
    assert!(session.flush(&mut adapter));
    assert_eq!(
        adapter.calls,
        vec![Call::Render {
            nodes: ids(&["A"]),
            edges: Vec::new(),
        }]
    );

    session.add_node(Node::new("C").with_parent("A")).unwrap();
    assert_eq!(session.get_visible_graph().nodes, ids(&["A", "C"]));
    assert!(!session.get_node_style("A").unwrap().collapsed);
}
