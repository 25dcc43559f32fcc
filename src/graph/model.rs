//! Wire-facing workflow definition types and the validated topology graph.
//!
//! The admin console fetches a [`WorkflowDefinition`] as JSON from the
//! backend; [`TopologyGraph`](super::TopologyGraph) is the validated form the
//! layout engine consumes. Node and edge order is preserved from the wire
//! arrays because the layout algorithm breaks ties by input position.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::{ModelProvider, NodeId, NodeKind};

/// Sentinel target id implying a synthesized terminal node.
pub const TERMINAL_ID: &str = "__end__";

/// A single node of a workflow definition.
///
/// Identity is `id`; immutable once the definition is loaded. The
/// `model_provider` field is usually absent on the wire and filled in during
/// graph construction by classifying `model_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<ModelProvider>,
}

impl NodeSpec {
    /// Creates a node spec with the given identity, role, and display label.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            model_id: None,
            model_provider: None,
        }
    }

    /// Attach a model binding; the provider is derived at graph build time.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// The synthesized terminal spec for the `__end__` sentinel.
    pub(crate) fn terminal() -> Self {
        Self::new(TERMINAL_ID, NodeKind::Terminal, "end")
    }
}

/// A directed edge of a workflow definition.
///
/// Edges targeting [`TERMINAL_ID`] imply the terminal node; the builder
/// materializes it exactly once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub conditional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EdgeSpec {
    /// Creates an unconditional edge.
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            conditional: false,
            label: None,
        }
    }

    /// Marks this edge as conditional (rendered dashed on the canvas).
    #[must_use]
    pub fn conditional(mut self) -> Self {
        self.conditional = true;
        self
    }

    /// Attach a display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Node/edge lists of a named sub-graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubgraphSpec {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

/// The workflow definition as fetched from the backend.
///
/// ```rust
/// use toposync::graph::WorkflowDefinition;
///
/// let def: WorkflowDefinition = serde_json::from_str(
///     r#"{
///         "nodes": [{"id": "root", "kind": "orchestrator", "label": "Root"}],
///         "edges": [{"id": "e1", "source": "root", "target": "__end__"}]
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(def.nodes.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgraphs: Option<FxHashMap<String, SubgraphSpec>>,
}

impl WorkflowDefinition {
    /// Look up a named sub-graph, if the definition carries one.
    pub fn subgraph(&self, name: &str) -> Option<&SubgraphSpec> {
        self.subgraphs.as_ref().and_then(|map| map.get(name))
    }
}
