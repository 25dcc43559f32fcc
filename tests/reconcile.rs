use rustc_hash::FxHashSet;
use toposync::graph::NodeSpec;
use toposync::layout::PositionedNode;
use toposync::metadata::{MetadataMap, NodeMetadata};
use toposync::reconcile::reconcile;
use toposync::types::{NodeKind, RenderId};

fn node(render_id: RenderId) -> PositionedNode {
    let canonical = render_id.canonical().to_string();
    PositionedNode {
        spec: NodeSpec::new(canonical.clone(), NodeKind::Agent, canonical.to_uppercase()),
        render_id,
        x: 0.0,
        y: 0.0,
        is_active: false,
        metadata: None,
    }
}

fn active(ids: &[&str]) -> FxHashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn activity_and_metadata_land_on_matching_nodes() {
    let mut nodes = vec![node(RenderId::primary("a")), node(RenderId::primary("b"))];
    let mut metadata = MetadataMap::default();
    metadata.insert("b".into(), NodeMetadata::new("ch-2").with_version(1));

    let outcome = reconcile(&mut nodes, &active(&["a"]), &metadata);

    assert_eq!(outcome.changed_count(), 2);
    assert!(nodes[0].is_active);
    assert!(!nodes[1].is_active);
    assert_eq!(nodes[1].metadata.as_ref().unwrap().version, 1);
}

#[test]
fn second_pass_with_unchanged_inputs_writes_nothing() {
    let mut nodes = vec![node(RenderId::primary("a")), node(RenderId::primary("b"))];
    let mut metadata = MetadataMap::default();
    metadata.insert("a".into(), NodeMetadata::new("ch-1"));
    let set = active(&["a"]);

    let first = reconcile(&mut nodes, &set, &metadata);
    assert!(!first.is_clean());

    let before = nodes.clone();
    let second = reconcile(&mut nodes, &set, &metadata);

    assert!(second.is_clean());
    assert_eq!(nodes, before);
}

#[test]
fn dragged_positions_survive_unrelated_updates() {
    let mut nodes = vec![node(RenderId::primary("a"))];
    nodes[0].x = 411.0;
    nodes[0].y = -35.5;

    let mut metadata = MetadataMap::default();
    metadata.insert("a".into(), NodeMetadata::new("ch-1").with_latency_ms(12.0));
    let outcome = reconcile(&mut nodes, &active(&["a"]), &metadata);

    assert_eq!(outcome.changed_count(), 1);
    assert_eq!(nodes[0].x, 411.0);
    assert_eq!(nodes[0].y, -35.5);
}

#[test]
fn overlay_twin_resolves_through_its_canonical_id() {
    // The server reports activity and metadata against canonical ids; the
    // namespaced twin must reflect both.
    let mut nodes = vec![
        node(RenderId::primary("planner")),
        node(RenderId::overlay("planner")),
    ];
    let mut metadata = MetadataMap::default();
    metadata.insert("planner".into(), NodeMetadata::new("ch-9").with_version(4));

    reconcile(&mut nodes, &active(&["planner"]), &metadata);

    for n in &nodes {
        assert!(n.is_active, "{} should be active", n.render_id);
        assert_eq!(n.metadata.as_ref().unwrap().version, 4);
    }
}

#[test]
fn activity_reported_under_the_render_key_also_counts() {
    // Some producers key sub-agent activity by the namespaced id.
    let mut nodes = vec![node(RenderId::overlay("planner"))];
    let outcome = reconcile(&mut nodes, &active(&["sub_planner"]), &MetadataMap::default());

    assert_eq!(outcome.changed_count(), 1);
    assert!(nodes[0].is_active);
}

#[test]
fn metadata_prefers_canonical_over_render_key() {
    let mut nodes = vec![node(RenderId::overlay("planner"))];
    let mut metadata = MetadataMap::default();
    metadata.insert("planner".into(), NodeMetadata::new("canonical"));
    metadata.insert("sub_planner".into(), NodeMetadata::new("render-keyed"));

    reconcile(&mut nodes, &active(&[]), &metadata);
    assert_eq!(nodes[0].metadata.as_ref().unwrap().channel_id, "canonical");
}

#[test]
fn missing_metadata_entry_preserves_the_displayed_value() {
    let mut nodes = vec![node(RenderId::primary("a"))];
    let mut first_poll = MetadataMap::default();
    first_poll.insert("a".into(), NodeMetadata::new("ch-1").with_version(3));
    reconcile(&mut nodes, &active(&[]), &first_poll);

    // A later poll omits the node entirely: stale-preserved, not cleared.
    let outcome = reconcile(&mut nodes, &active(&[]), &MetadataMap::default());

    assert!(outcome.is_clean());
    assert_eq!(nodes[0].metadata.as_ref().unwrap().version, 3);
}

#[test]
fn changed_metadata_replaces_the_whole_value() {
    let mut nodes = vec![node(RenderId::primary("a"))];
    let mut poll = MetadataMap::default();
    poll.insert(
        "a".into(),
        NodeMetadata::new("ch-1").with_version(1).with_latency_ms(10.0),
    );
    reconcile(&mut nodes, &active(&[]), &poll);

    let mut next = MetadataMap::default();
    // No latency this time: the whole value is replaced, no field merge.
    next.insert("a".into(), NodeMetadata::new("ch-1").with_version(2));
    let outcome = reconcile(&mut nodes, &active(&[]), &next);

    assert_eq!(outcome.changed, vec![RenderId::primary("a")]);
    let meta = nodes[0].metadata.as_ref().unwrap();
    assert_eq!(meta.version, 2);
    assert_eq!(meta.last_latency_ms, None);
}

#[test]
fn deactivation_is_a_reported_change() {
    let mut nodes = vec![node(RenderId::primary("a"))];
    reconcile(&mut nodes, &active(&["a"]), &MetadataMap::default());

    let outcome = reconcile(&mut nodes, &active(&[]), &MetadataMap::default());
    assert_eq!(outcome.changed, vec![RenderId::primary("a")]);
    assert!(!nodes[0].is_active);
}
