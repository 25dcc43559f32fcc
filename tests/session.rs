use toposync::events::{ExecutionEvent, StreamSignal};
use toposync::graph::WorkflowDefinition;
use toposync::metadata::{MetadataMap, NodeMetadata};
use toposync::session::{CanvasSession, SessionOptions};
use toposync::types::RenderId;

fn chain_definition() -> WorkflowDefinition {
    serde_json::from_str(
        r#"{
            "nodes": [
                {"id": "A", "kind": "agent", "label": "A"},
                {"id": "B", "kind": "agent", "label": "B"}
            ],
            "edges": [
                {"id": "e1", "source": "A", "target": "B"},
                {"id": "e2", "source": "B", "target": "__end__"}
            ],
            "subgraphs": {
                "sub_agents": {
                    "nodes": [{"id": "helper", "kind": "sub_agent", "label": "Helper"}],
                    "edges": []
                }
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn execution_walks_the_chain_and_errors_out() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let generation = session.load(&chain_definition(), None).unwrap();

    session
        .ingest(generation, ExecutionEvent::entered("A", 1.0))
        .unwrap();
    assert_eq!(session.active_nodes().len(), 1);
    assert!(session.active_nodes().contains("A"));

    session
        .ingest(generation, ExecutionEvent::exited("A", 2.0))
        .unwrap();
    session
        .ingest(generation, ExecutionEvent::entered("B", 2.1))
        .unwrap();
    assert!(session.active_nodes().contains("B"));
    assert!(!session.active_nodes().contains("A"));

    session
        .ingest(generation, ExecutionEvent::errored("B", "assertion failed", 3.0))
        .unwrap();
    assert!(session.active_nodes().is_empty());

    // The log retains the failure for display.
    let last = session.event_log().back().unwrap();
    assert_eq!(last.event.error(), Some("assertion failed"));

    // Diagram activity followed every step.
    assert!(!session.diagram().node(&RenderId::primary("B")).unwrap().is_active);
}

#[test]
fn load_replaces_the_graph_wholesale_and_bumps_the_generation() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let first = session.load(&chain_definition(), None).unwrap();
    session
        .ingest(first, ExecutionEvent::entered("A", 1.0))
        .unwrap();

    let second = session.load(&chain_definition(), None).unwrap();
    assert_eq!(second, first + 1);
    // Fresh selection: no carried-over activity, log, or metadata.
    assert!(session.active_nodes().is_empty());
    assert!(session.event_log().is_empty());
    assert!(!session.diagram().nodes[0].is_active);
}

#[test]
fn stale_generation_callbacks_are_discarded() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let old = session.load(&chain_definition(), None).unwrap();
    let current = session.load(&chain_definition(), None).unwrap();

    assert!(session.ingest(old, ExecutionEvent::entered("A", 1.0)).is_none());
    assert!(session.active_nodes().is_empty());

    let mut poll = MetadataMap::default();
    poll.insert("A".into(), NodeMetadata::new("ch-1"));
    assert!(session.apply_metadata(old, poll.clone()).is_none());
    assert!(session.diagram().nodes[0].metadata.is_none());

    // The same payloads tagged with the live generation apply.
    assert!(session.ingest(current, ExecutionEvent::entered("A", 1.0)).is_some());
    assert!(session.apply_metadata(current, poll).is_some());
    assert!(session.diagram().nodes[0].is_active);
}

#[test]
fn metadata_polls_replace_the_snapshot_but_preserve_omitted_nodes() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let generation = session.load(&chain_definition(), None).unwrap();

    let mut poll = MetadataMap::default();
    poll.insert("A".into(), NodeMetadata::new("ch-1").with_version(3));
    session.apply_metadata(generation, poll).unwrap();

    // Next poll omits A entirely.
    let outcome = session
        .apply_metadata(generation, MetadataMap::default())
        .unwrap();
    assert!(outcome.is_clean());
    let a = session.diagram().node(&RenderId::primary("A")).unwrap();
    assert_eq!(a.metadata.as_ref().unwrap().version, 3);
}

#[test]
fn overlay_nodes_mirror_activity_reported_canonically() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let generation = session
        .load(&chain_definition(), Some("sub_agents"))
        .unwrap();

    // 2 primary + synthesized terminal + 1 overlay node.
    assert_eq!(session.diagram().nodes.len(), 4);
    let helper = session
        .diagram()
        .node(&RenderId::overlay("helper"))
        .unwrap();
    // Overlay sits beside the primary bounding box.
    assert!(helper.x >= 300.0);

    session
        .ingest(generation, ExecutionEvent::entered("helper", 1.0))
        .unwrap();
    let helper = session
        .diagram()
        .node(&RenderId::overlay("helper"))
        .unwrap();
    assert!(helper.is_active);
}

#[test]
fn missing_overlay_name_renders_primary_only() {
    let mut session = CanvasSession::new(SessionOptions::default());
    session.load(&chain_definition(), Some("no_such")).unwrap();
    assert_eq!(session.diagram().nodes.len(), 3);
}

#[test]
fn dragged_node_survives_event_and_poll_ticks() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let generation = session.load(&chain_definition(), None).unwrap();

    let target = RenderId::primary("B");
    assert!(session.move_node(&target, 640.0, 222.0));

    session
        .ingest(generation, ExecutionEvent::entered("B", 1.0))
        .unwrap();
    let mut poll = MetadataMap::default();
    poll.insert("B".into(), NodeMetadata::new("ch-2"));
    session.apply_metadata(generation, poll).unwrap();

    let b = session.diagram().node(&target).unwrap();
    assert_eq!((b.x, b.y), (640.0, 222.0));
    assert!(b.is_active);
    assert!(b.metadata.is_some());

    assert!(!session.move_node(&RenderId::primary("ghost"), 0.0, 0.0));
}

#[test]
fn connectivity_signals_flip_the_flag_without_touching_state() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let generation = session.load(&chain_definition(), None).unwrap();

    session.handle_signal(generation, StreamSignal::Connected);
    assert!(session.connected());

    session
        .handle_signal(generation, StreamSignal::Event(ExecutionEvent::entered("A", 1.0)))
        .unwrap();
    session.handle_signal(generation, StreamSignal::Disconnected);

    // Disconnect keeps last-known activity; clearing is an explicit choice.
    assert!(!session.connected());
    assert!(session.active_nodes().contains("A"));

    let outcome = session.clear_activity();
    assert_eq!(outcome.changed_count(), 1);
    assert!(session.active_nodes().is_empty());
    assert!(!session.diagram().nodes[0].is_active);
}

#[test]
fn failed_load_falls_back_to_an_empty_diagram() {
    let mut session = CanvasSession::new(SessionOptions::default());
    let good = session.load(&chain_definition(), None).unwrap();

    let broken: WorkflowDefinition = serde_json::from_str(
        r#"{
            "nodes": [{"id": "a", "kind": "agent", "label": "A"}],
            "edges": [{"id": "e1", "source": "a", "target": "ghost"}]
        }"#,
    )
    .unwrap();

    assert!(session.load(&broken, None).is_err());
    // No partial graph: the canvas shows nothing, and the old generation is
    // dead so late callbacks for it are dropped.
    assert!(session.diagram().nodes.is_empty());
    assert!(session.ingest(good, ExecutionEvent::entered("A", 1.0)).is_none());
}
