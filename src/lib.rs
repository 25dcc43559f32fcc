//! # Toposync: Topology Synchronization for Agent Workflow Canvases
//!
//! Toposync keeps a live workflow diagram consistent with three
//! independently-timed data sources: the static topology definition, a
//! push stream of execution events, and periodically-polled per-node
//! metadata. It does so without relaying out the graph on every tick and without
//! clobbering user-dragged positions.
//!
//! ## Core Concepts
//!
//! - **Topology graph**: validated node/edge definition, terminal synthesis,
//!   provider classification
//! - **Layout**: deterministic layered placement; independent sub-agent
//!   overlay, namespaced and offset beside the primary graph
//! - **Event ingestion**: bounded log + active-node set driven strictly in
//!   delivery order
//! - **Reconciliation**: diff-before-write merge of live state onto the
//!   existing diagram
//! - **Session**: generation-guarded owner tying the sources together
//!
//! ## Quick Start
//!
//! ```rust
//! use toposync::events::ExecutionEvent;
//! use toposync::graph::WorkflowDefinition;
//! use toposync::metadata::{MetadataMap, NodeMetadata};
//! use toposync::session::{CanvasSession, SessionOptions};
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
//! let mut session = CanvasSession::new(SessionOptions::default());
//! let generation = session.load(&def, None)?;
//!
//! // Live events flip activity; polls attach metadata; neither relayouts.
//! session.ingest(generation, ExecutionEvent::entered("coder", 1.0));
//!
//! let mut poll = MetadataMap::default();
//! poll.insert("coder".into(), NodeMetadata::new("ch-1").with_version(3));
//! session.apply_metadata(generation, poll);
//!
//! let coder = &session.diagram().nodes[1];
//! assert!(coder.is_active);
//! assert_eq!(coder.metadata.as_ref().unwrap().version, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## What the engine does **not** do
//!
//! It never decides which node runs next (that is the server-side
//! scheduler), persists nothing, and does not implement stream transport;
//! it consumes an ordered event sequence through a caller-owned
//! [`events::StreamHandle`].
//!
//! ## Module Guide
//!
//! - [`types`] - Render/canonical identity, node kinds, provider hints
//! - [`graph`] - Workflow definitions and validated topology graphs
//! - [`layout`] - Deterministic layered layout and the overlay transform
//! - [`events`] - Event vocabulary, ingestion state machine, stream handle
//! - [`metadata`] - Polled per-node metadata contract
//! - [`reconcile`] - Diff-aware merge of live state onto the diagram
//! - [`session`] - Generation-guarded orchestration

pub mod events;
pub mod graph;
pub mod layout;
pub mod metadata;
pub mod reconcile;
pub mod session;
pub mod types;
