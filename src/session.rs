//! Generation-guarded orchestration of one canvas's three data sources.
//!
//! A [`CanvasSession`] owns the positioned diagram, the event ingestion
//! state, and the latest metadata snapshot for the currently selected
//! workflow. Selecting a different workflow replaces everything wholesale
//! and bumps a monotonically increasing generation; callbacks tagged with a
//! superseded generation are discarded, which is what keeps a stale event
//! or late poll response from ever writing into a newer graph's nodes.
//!
//! The session is single-threaded and cooperative: each entry point runs to
//! completion, there are no locks, and the three sources only meet through
//! the reconciliation pass reading their latest state.
//!
//! # Examples
//!
//! ```rust
//! use toposync::events::ExecutionEvent;
//! use toposync::graph::WorkflowDefinition;
//! use toposync::session::{CanvasSession, SessionOptions};
//!
//! let def: WorkflowDefinition = serde_json::from_str(
//!     r#"{
//!         "nodes": [{"id": "root", "kind": "orchestrator", "label": "Root"}],
//!         "edges": []
//!     }"#,
//! )?;
//!
//! let mut session = CanvasSession::new(SessionOptions::default());
//! let generation = session.load(&def, None)?;
//!
//! let outcome = session
//!     .ingest(generation, ExecutionEvent::entered("root", 1.0))
//!     .expect("current generation");
//! assert_eq!(outcome.changed_count(), 1);
//! assert!(session.diagram().nodes[0].is_active);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use miette::Diagnostic;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use thiserror::Error;

use crate::events::{EventIngestion, ExecutionEvent, IngestionOptions, LogEntry, StreamSignal};
use crate::graph::{GraphError, TopologyGraph, WorkflowDefinition};
use crate::layout::{Diagram, LayoutError, LayoutOptions, layout};
use crate::metadata::MetadataMap;
use crate::reconcile::{ReconcileOutcome, reconcile};
use crate::types::{NodeId, RenderId};

/// Monotonically increasing id tagging each loaded graph.
pub type Generation = u64;

/// Errors raised while (re)loading a session's workflow.
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),
}

/// Configuration for a [`CanvasSession`].
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Layout options for the primary graph.
    pub layout: LayoutOptions,
    /// Independent layout options for the sub-agent overlay.
    pub overlay_layout: LayoutOptions,
    /// Horizontal gap between the primary bounding box and the overlay.
    pub overlay_margin: f64,
    /// Event log bounds.
    pub ingestion: IngestionOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            overlay_layout: LayoutOptions::default(),
            overlay_margin: 300.0,
            ingestion: IngestionOptions::default(),
        }
    }
}

/// Owner of one canvas's diagram and its synchronization state.
#[derive(Debug)]
pub struct CanvasSession {
    generation: Generation,
    diagram: Diagram,
    ingestion: EventIngestion,
    metadata: MetadataMap,
    options: SessionOptions,
}

impl CanvasSession {
    /// Creates an empty session; nothing renders until [`load`](Self::load).
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self {
            generation: 0,
            diagram: Diagram::default(),
            ingestion: EventIngestion::new(options.ingestion.clone()),
            metadata: MetadataMap::default(),
            options,
        }
    }

    /// Replace the session's workflow wholesale.
    ///
    /// Builds and lays out the definition's primary graph, attaches the
    /// named sub-graph as the overlay when `overlay` is given and present,
    /// resets ingestion and metadata state, and bumps the generation. The
    /// returned generation is the tag callers must attach to subsequent
    /// event/metadata callbacks.
    ///
    /// A definition naming an absent overlay renders primary-only (with a
    /// warning); that is a display toggle, not an error.
    ///
    /// # Errors
    ///
    /// On a graph or layout failure the session falls back to an **empty**
    /// diagram (never a partial one) and still bumps the generation so
    /// in-flight callbacks for the failed load are discarded.
    pub fn load(
        &mut self,
        def: &WorkflowDefinition,
        overlay: Option<&str>,
    ) -> Result<Generation, SessionError> {
        let built = self.build_diagram(def, overlay);
        self.generation += 1;
        self.ingestion.clear();
        self.metadata.clear();
        match built {
            Ok(diagram) => {
                tracing::debug!(
                    generation = self.generation,
                    nodes = diagram.nodes.len(),
                    edges = diagram.edges.len(),
                    "loaded workflow topology"
                );
                self.diagram = diagram;
                Ok(self.generation)
            }
            Err(err) => {
                self.diagram = Diagram::default();
                Err(err)
            }
        }
    }

    fn build_diagram(
        &self,
        def: &WorkflowDefinition,
        overlay: Option<&str>,
    ) -> Result<Diagram, SessionError> {
        let graph = TopologyGraph::from_definition(def)?;
        let mut diagram = layout(&graph, &self.options.layout)?;

        if let Some(name) = overlay {
            match def.subgraph(name) {
                Some(sub) => {
                    let overlay_graph = TopologyGraph::from_subgraph(sub)?;
                    let side = layout(&overlay_graph, &self.options.overlay_layout)?;
                    diagram.attach_overlay(side, self.options.overlay_margin);
                }
                None => {
                    tracing::warn!(overlay = name, "definition has no such sub-graph; rendering primary only");
                }
            }
        }
        Ok(diagram)
    }

    /// The generation of the currently loaded graph.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The diagram handed to the render surface.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Transport connectivity as last signaled.
    pub fn connected(&self) -> bool {
        self.ingestion.connected()
    }

    /// Currently active canonical node ids.
    pub fn active_nodes(&self) -> &FxHashSet<NodeId> {
        self.ingestion.active()
    }

    /// The bounded event log, oldest first.
    pub fn event_log(&self) -> &VecDeque<LogEntry> {
        self.ingestion.log()
    }

    /// Apply one execution event and reconcile.
    ///
    /// Returns `None`, leaving all state untouched, when `generation` has
    /// been superseded by a newer [`load`](Self::load).
    pub fn ingest(
        &mut self,
        generation: Generation,
        event: ExecutionEvent,
    ) -> Option<ReconcileOutcome> {
        if !self.is_current(generation) {
            return None;
        }
        self.ingestion.apply(event);
        Some(self.reconcile_pass())
    }

    /// Replace the metadata snapshot and reconcile.
    ///
    /// The map replaces the previous snapshot wholesale; per-node staleness
    /// handling (missing entries keep their displayed values) happens inside
    /// the reconciliation pass. Returns `None` for a superseded generation.
    pub fn apply_metadata(
        &mut self,
        generation: Generation,
        metadata: MetadataMap,
    ) -> Option<ReconcileOutcome> {
        if !self.is_current(generation) {
            return None;
        }
        self.metadata = metadata;
        Some(self.reconcile_pass())
    }

    /// Route one stream signal: events reconcile, connectivity edges only
    /// flip the `connected` flag.
    pub fn handle_signal(
        &mut self,
        generation: Generation,
        signal: StreamSignal,
    ) -> Option<ReconcileOutcome> {
        match signal {
            StreamSignal::Event(event) => self.ingest(generation, event),
            StreamSignal::Connected => self.set_connected(generation, true),
            StreamSignal::Disconnected => self.set_connected(generation, false),
        }
    }

    /// Write back a user-dragged position.
    ///
    /// Returns `false` if no node renders under the given id. The new
    /// position survives every subsequent reconciliation pass.
    pub fn move_node(&mut self, render_id: &RenderId, x: f64, y: f64) -> bool {
        match self.diagram.node_mut(render_id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    /// Explicitly clear activity state after a reconnect without replay.
    ///
    /// Clears the event log and active set, then reconciles so previously
    /// active nodes dim. Metadata is untouched.
    pub fn clear_activity(&mut self) -> ReconcileOutcome {
        self.ingestion.clear();
        self.reconcile_pass()
    }

    fn set_connected(
        &mut self,
        generation: Generation,
        connected: bool,
    ) -> Option<ReconcileOutcome> {
        if !self.is_current(generation) {
            return None;
        }
        self.ingestion.set_connected(connected);
        // Connectivity never changes derived node state on its own.
        Some(ReconcileOutcome::default())
    }

    fn is_current(&self, generation: Generation) -> bool {
        if generation != self.generation {
            tracing::debug!(
                received = generation,
                current = self.generation,
                "discarding callback for superseded generation"
            );
            return false;
        }
        true
    }

    fn reconcile_pass(&mut self) -> ReconcileOutcome {
        reconcile(
            &mut self.diagram.nodes,
            self.ingestion.active(),
            &self.metadata,
        )
    }
}
