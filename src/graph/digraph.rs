//! petgraph adjacency view of a topology graph.
//!
//! The layout engine works over a petgraph [`DiGraph`] whose node weights
//! are positions into [`TopologyGraph::nodes`](super::TopologyGraph::nodes)
//! and whose edge weights are positions into
//! [`TopologyGraph::edges`](super::TopologyGraph::edges). Indices into the
//! wire arrays (never ids, never map iteration order) keep every
//! downstream traversal deterministic.

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use super::builder::TopologyGraph;
use super::model::TERMINAL_ID;

/// Directed adjacency of a topology graph; weights are input-array indices.
pub type TopologyDiGraph = DiGraph<usize, usize>;

/// Result of converting a [`TopologyGraph`] to petgraph form.
#[derive(Debug, Clone)]
pub struct DiGraphView {
    /// The petgraph directed graph (weights are input indices).
    pub graph: TopologyDiGraph,
    /// Mapping from node id to petgraph index.
    pub index_of: FxHashMap<String, NodeIndex>,
}

impl DiGraphView {
    /// Look up the petgraph index for a node id.
    #[must_use]
    pub fn index(&self, id: &str) -> Option<NodeIndex> {
        self.index_of.get(id).copied()
    }
}

impl TopologyGraph {
    /// Convert to a petgraph adjacency view.
    ///
    /// Nodes are added in wire order, so petgraph indices equal input
    /// positions. Edges whose endpoints reference the unsynthesized sentinel
    /// are skipped (they carry no drawable geometry).
    #[must_use]
    pub fn to_digraph(&self) -> DiGraphView {
        let mut graph = TopologyDiGraph::new();
        let mut index_of: FxHashMap<String, NodeIndex> = FxHashMap::default();

        for (i, node) in self.nodes().iter().enumerate() {
            let idx = graph.add_node(i);
            index_of.insert(node.id.clone(), idx);
        }

        for (i, edge) in self.edges().iter().enumerate() {
            match (index_of.get(&edge.source), index_of.get(&edge.target)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, i);
                }
                _ => {
                    debug_assert!(
                        edge.source == TERMINAL_ID || edge.target == TERMINAL_ID,
                        "validated graph contains dangling edge {}",
                        edge.id
                    );
                    tracing::debug!(edge = %edge.id, "skipping sentinel-only edge in adjacency view");
                }
            }
        }

        DiGraphView { graph, index_of }
    }

    /// Whether the topology contains a directed cycle.
    ///
    /// Cycles are structurally permitted (retry loops between agents); the
    /// layout engine handles them by excluding back edges from ranking.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.to_digraph().graph)
    }

    /// Export the topology in Graphviz DOT format.
    ///
    /// Useful for debugging layouts outside the canvas: render with
    /// `dot -Tpng topology.dot -o topology.png`.
    #[must_use]
    pub fn to_dot(&self) -> String {
        use std::fmt::Write;

        let mut output = String::new();
        writeln!(output, "digraph {{").unwrap();
        writeln!(output, "    rankdir=TB;").unwrap();
        writeln!(output, "    node [shape=box, style=rounded];").unwrap();

        for (i, node) in self.nodes().iter().enumerate() {
            let style = if node.kind.is_terminal() {
                " style=\"filled\" fillcolor=\"lightcoral\""
            } else {
                ""
            };
            writeln!(output, "    {} [ label=\"{}\"{} ];", i, node.label, style).unwrap();
        }

        writeln!(output).unwrap();

        for edge in self.edges() {
            if let (Some(from), Some(to)) =
                (self.node_index(&edge.source), self.node_index(&edge.target))
            {
                let attrs = if edge.conditional { " [style=dashed]" } else { "" };
                writeln!(output, "    {from} -> {to}{attrs};").unwrap();
            }
        }

        writeln!(output, "}}").unwrap();
        output
    }
}
