//! Workflow topology definition and validation.
//!
//! This module turns the backend's wire-level workflow definition into the
//! validated [`TopologyGraph`] the layout engine consumes. Construction
//! derives presentation hints (model provider classification), synthesizes
//! the `__end__` terminal node when edges target the sentinel, and rejects
//! definitions with dangling edge references. Failure is fatal: no partial graph
//! ever reaches the canvas.
//!
//! # Quick Start
//!
//! ```rust
//! use toposync::graph::{TopologyGraph, WorkflowDefinition};
//!
//! let def: WorkflowDefinition = serde_json::from_str(
//!     r#"{
//!         "nodes": [
//!             {"id": "root", "kind": "orchestrator", "label": "Root"},
//!             {"id": "coder", "kind": "agent", "label": "Coder", "modelId": "claude-sonnet-4-5"}
//!         ],
//!         "edges": [
//!             {"id": "e1", "source": "root", "target": "coder"},
//!             {"id": "e2", "source": "coder", "target": "__end__"}
//!         ]
//!     }"#,
//! )?;
//!
//! let graph = TopologyGraph::from_definition(&def)?;
//! assert_eq!(graph.len(), 3); // root, coder, synthesized __end__
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod digraph;
mod model;

pub use builder::{GraphError, TopologyGraph};
pub use digraph::{DiGraphView, TopologyDiGraph};
pub use model::{EdgeSpec, NodeSpec, SubgraphSpec, TERMINAL_ID, WorkflowDefinition};
