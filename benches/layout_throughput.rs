//! Benchmarks for layered layout over canvas-scale graphs.
//!
//! Layout runs synchronously inside one task-queue turn on selection
//! change, so throughput at tens-to-hundreds of nodes is what matters.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use toposync::graph::{EdgeSpec, NodeSpec, TopologyGraph};
use toposync::layout::{LayoutOptions, layout};
use toposync::types::NodeKind;

/// Build a linear chain: n0 -> n1 -> ... -> n{count-1}
fn build_chain(count: usize) -> TopologyGraph {
    let nodes = (0..count)
        .map(|i| NodeSpec::new(format!("n{i}"), NodeKind::Agent, format!("N{i}")))
        .collect();
    let edges = (0..count.saturating_sub(1))
        .map(|i| EdgeSpec::new(format!("e{i}"), format!("n{i}"), format!("n{}", i + 1)))
        .collect();
    TopologyGraph::from_parts(nodes, edges).unwrap()
}

/// Build an orchestrator fanning out to `count - 1` agents and back in to a
/// shared terminal.
fn build_fan(count: usize) -> TopologyGraph {
    let mut nodes = vec![NodeSpec::new("root", NodeKind::Orchestrator, "Root")];
    let mut edges = Vec::new();
    for i in 1..count {
        nodes.push(NodeSpec::new(
            format!("n{i}"),
            NodeKind::Agent,
            format!("N{i}"),
        ));
        edges.push(EdgeSpec::new(format!("out{i}"), "root", format!("n{i}")));
        edges.push(EdgeSpec::new(format!("in{i}"), format!("n{i}"), "__end__"));
    }
    TopologyGraph::from_parts(nodes, edges).unwrap()
}

fn bench_layout(c: &mut Criterion) {
    let options = LayoutOptions::default();
    let mut group = c.benchmark_group("layout");

    for &size in &[10usize, 50, 200] {
        let chain = build_chain(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &chain, |b, graph| {
            b.iter(|| layout(graph, &options).unwrap())
        });

        let fan = build_fan(size);
        group.bench_with_input(BenchmarkId::new("fan", size), &fan, |b, graph| {
            b.iter(|| layout(graph, &options).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
