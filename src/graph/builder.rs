//! Construction and validation of topology graphs.
//!
//! A [`TopologyGraph`] is built from wire-level node/edge lists in three
//! passes: provider classification, lazy terminal synthesis, and reference
//! validation. Construction is fatal on the first invalid reference; no
//! partial graph is ever produced.

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use super::model::{EdgeSpec, NodeSpec, SubgraphSpec, TERMINAL_ID, WorkflowDefinition};
use crate::types::ModelProvider;

/// Errors raised while constructing a [`TopologyGraph`].
///
/// All variants are fatal to the load: the caller renders nothing rather
/// than a partial graph.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// An edge references a node id absent from the node list.
    #[error("edge `{edge_id}` references unknown node `{node_id}`")]
    #[diagnostic(
        code(toposync::graph::dangling_edge),
        help("Every edge endpoint must name a node in the definition; only the `__end__` sentinel is synthesized.")
    )]
    DanglingEdge { edge_id: String, node_id: String },

    /// A node in the definition has an empty id.
    #[error("workflow definition contains a node with an empty id")]
    #[diagnostic(code(toposync::graph::empty_node_id))]
    EmptyNodeId,
}

/// A validated workflow topology: the input to the layout engine.
///
/// Node and edge vectors preserve the order of the wire arrays; the layout
/// algorithm relies on that order for deterministic tie-breaking, so the
/// graph never reorders them.
///
/// # Examples
///
/// ```rust
/// use toposync::graph::{EdgeSpec, NodeSpec, TopologyGraph};
/// use toposync::types::NodeKind;
///
/// let graph = TopologyGraph::from_parts(
///     vec![NodeSpec::new("root", NodeKind::Orchestrator, "Root")],
///     vec![EdgeSpec::new("e1", "root", "__end__")],
/// )
/// .unwrap();
///
/// // The terminal was synthesized for the sentinel target.
/// assert_eq!(graph.nodes().len(), 2);
/// assert!(graph.contains_node("__end__"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyGraph {
    nodes: Vec<NodeSpec>,
    edges: Vec<EdgeSpec>,
    index_of: FxHashMap<String, usize>,
}

impl TopologyGraph {
    /// Builds a validated graph from node and edge lists.
    ///
    /// Performs, in order:
    ///
    /// 1. **Provider classification**: every node with a non-empty
    ///    `model_id` gets a `model_provider` derived by
    ///    [`ModelProvider::classify`]; a provider already present on the
    ///    wire is kept.
    /// 2. **Terminal synthesis**: if at least one edge targets
    ///    [`TERMINAL_ID`] and no node carries that id, exactly one terminal
    ///    node is appended. Multiple sentinel edges never duplicate it.
    /// 3. **Validation**: every edge endpoint must name a node in the
    ///    final list; the sentinel id is exempt.
    ///
    /// # Errors
    ///
    /// [`GraphError::EmptyNodeId`] for a blank node id,
    /// [`GraphError::DanglingEdge`] for an edge referencing an unknown node.
    /// Both are fatal to the load.
    pub fn from_parts(
        mut nodes: Vec<NodeSpec>,
        edges: Vec<EdgeSpec>,
    ) -> Result<Self, GraphError> {
        for node in &mut nodes {
            if node.id.is_empty() {
                return Err(GraphError::EmptyNodeId);
            }
            if node.model_provider.is_none() {
                node.model_provider = node
                    .model_id
                    .as_deref()
                    .and_then(ModelProvider::classify);
            }
        }

        let mut ids: FxHashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
        if edges.iter().any(|e| e.target == TERMINAL_ID) && !ids.contains(TERMINAL_ID) {
            tracing::debug!("synthesizing terminal node for sentinel target");
            nodes.push(NodeSpec::terminal());
            ids.insert(TERMINAL_ID.to_string());
        }

        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if endpoint != TERMINAL_ID && !ids.contains(endpoint.as_str()) {
                    return Err(GraphError::DanglingEdge {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
        }

        let index_of = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        Ok(Self {
            nodes,
            edges,
            index_of,
        })
    }

    /// Builds the primary graph of a workflow definition.
    pub fn from_definition(def: &WorkflowDefinition) -> Result<Self, GraphError> {
        Self::from_parts(def.nodes.clone(), def.edges.clone())
    }

    /// Builds a graph from a named sub-graph's lists, with the same rules.
    pub fn from_subgraph(sub: &SubgraphSpec) -> Result<Self, GraphError> {
        Self::from_parts(sub.nodes.clone(), sub.edges.clone())
    }

    /// Nodes in wire order (including any synthesized terminal, last).
    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Edges in wire order.
    pub fn edges(&self) -> &[EdgeSpec] {
        &self.edges
    }

    /// Position of a node id in [`nodes`](Self::nodes), if present.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    /// Whether the graph contains a node with the given id.
    pub fn contains_node(&self, id: &str) -> bool {
        self.index_of.contains_key(id)
    }

    /// Node count.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
