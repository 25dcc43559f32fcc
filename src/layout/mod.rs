//! Deterministic layered layout for topology graphs.
//!
//! The layout engine is a pure function from a validated
//! [`TopologyGraph`] to a [`Diagram`]: positioned nodes and edges ready for
//! the render surface. The algorithm is rank-based (longest path from
//! sources, top to bottom) with barycenter crossing reduction and fixed node
//! box dimensions.
//!
//! # Determinism
//!
//! Identical graph + identical options produce bit-identical positions. All
//! tie-breaks follow the input arrays' order; nothing iterates a hash map.
//! This is load-bearing: the reconciliation layer patches the diagram in
//! place, so layout must never shuffle nodes between runs.
//!
//! # Sub-agent overlay
//!
//! The overlay graph is laid out independently with its own options, then
//! namespaced into the [`RenderId::Overlay`](crate::types::RenderId)
//! namespace and translated to sit beside the primary graph's bounding box:
//!
//! ```rust
//! use toposync::graph::{EdgeSpec, NodeSpec, TopologyGraph};
//! use toposync::layout::{LayoutOptions, layout};
//! use toposync::types::NodeKind;
//!
//! let primary = TopologyGraph::from_parts(
//!     vec![NodeSpec::new("root", NodeKind::Orchestrator, "Root")],
//!     vec![],
//! )?;
//! let overlay = TopologyGraph::from_parts(
//!     vec![NodeSpec::new("helper", NodeKind::SubAgent, "Helper")],
//!     vec![],
//! )?;
//!
//! let mut diagram = layout(&primary, &LayoutOptions::default())?;
//! let side = layout(&overlay, &LayoutOptions::default())?;
//! diagram.attach_overlay(side, 300.0);
//!
//! assert_eq!(diagram.nodes[1].render_id.encode(), "sub_helper");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod rank;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{EdgeSpec, NodeSpec, TopologyGraph};
use crate::metadata::NodeMetadata;
use crate::types::RenderId;

/// Spacing and box-dimension options for one layout run.
///
/// The primary graph and the sub-agent overlay are laid out with independent
/// option sets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
    /// Vertical gap between consecutive ranks.
    pub rank_separation: f64,
    /// Horizontal gap between nodes within a rank.
    pub node_separation: f64,
    /// Fixed node box width.
    pub node_width: f64,
    /// Fixed node box height.
    pub node_height: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            rank_separation: 110.0,
            node_separation: 60.0,
            node_width: 180.0,
            node_height: 64.0,
        }
    }
}

impl LayoutOptions {
    #[must_use]
    pub fn with_rank_separation(mut self, rank_separation: f64) -> Self {
        self.rank_separation = rank_separation;
        self
    }

    #[must_use]
    pub fn with_node_separation(mut self, node_separation: f64) -> Self {
        self.node_separation = node_separation;
        self
    }
}

/// Errors raised by the layout engine.
///
/// Propagated to the caller, never swallowed: the canvas falls back to an
/// empty diagram rather than rendering a partially laid-out one.
#[derive(Debug, Error, Diagnostic)]
pub enum LayoutError {
    /// An edge references a node the graph does not contain.
    ///
    /// Unreachable for graphs built through [`TopologyGraph::from_parts`]
    /// unless an edge names the `__end__` sentinel as a source without any
    /// edge targeting it.
    #[error("edge `{edge_id}` references node `{node_id}` missing from the graph")]
    #[diagnostic(
        code(toposync::layout::unknown_endpoint),
        help("Build graphs through TopologyGraph so edge references are validated before layout.")
    )]
    UnknownEndpoint { edge_id: String, node_id: String },
}

/// A node with canvas geometry and live derived state.
///
/// `render_id` is the only field the render surface keys on. `is_active` and
/// `metadata` are owned by the reconciliation layer; `x`/`y` are written by
/// layout and by explicit user drags, never by reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    #[serde(flatten)]
    pub spec: NodeSpec,
    pub render_id: RenderId,
    pub x: f64,
    pub y: f64,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

/// An edge with render-surface identities for both endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedEdge {
    #[serde(flatten)]
    pub spec: EdgeSpec,
    pub render_id: RenderId,
    pub source_render: RenderId,
    pub target_render: RenderId,
}

/// The laid-out node/edge collection handed to the render surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
}

impl Diagram {
    /// Largest node x coordinate, `0.0` for an empty diagram.
    ///
    /// This is the primary graph's contribution to overlay translation.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.nodes.iter().map(|n| n.x).fold(0.0, f64::max)
    }

    /// Find a node by render id.
    pub fn node(&self, render_id: &RenderId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| &n.render_id == render_id)
    }

    /// Find a node by render id, mutably.
    pub fn node_mut(&mut self, render_id: &RenderId) -> Option<&mut PositionedNode> {
        self.nodes.iter_mut().find(|n| &n.render_id == render_id)
    }

    /// Namespace an independently laid-out overlay and append it beside this
    /// diagram.
    ///
    /// Every overlay node/edge render id moves into the overlay namespace
    /// (`sub_` string form) and every x coordinate is translated by
    /// `self.max_x() + margin`; y coordinates keep the shared vertical
    /// origin. The overlay may be structurally disjoint from the primary
    /// graph; translation only reads this diagram's bounding box.
    pub fn attach_overlay(&mut self, overlay: Diagram, margin: f64) {
        let dx = self.max_x() + margin;
        for mut node in overlay.nodes {
            node.render_id = node.render_id.into_overlay();
            node.x += dx;
            self.nodes.push(node);
        }
        for mut edge in overlay.edges {
            edge.render_id = edge.render_id.into_overlay();
            edge.source_render = edge.source_render.into_overlay();
            edge.target_render = edge.target_render.into_overlay();
            self.edges.push(edge);
        }
    }
}

/// Lay out a topology graph.
///
/// Pure and deterministic: identical `graph` and `options` yield
/// bit-identical output. Nodes and edges appear in the output in the same
/// order as in the input graph. An empty graph produces an empty diagram.
///
/// # Errors
///
/// [`LayoutError::UnknownEndpoint`] if an edge references a node the graph
/// does not contain (see the variant docs for when that can happen).
pub fn layout(graph: &TopologyGraph, options: &LayoutOptions) -> Result<Diagram, LayoutError> {
    for edge in graph.edges() {
        for endpoint in [&edge.source, &edge.target] {
            if !graph.contains_node(endpoint) {
                return Err(LayoutError::UnknownEndpoint {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }

    let layering = rank::layer(graph);

    let nodes = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, spec)| PositionedNode {
            spec: spec.clone(),
            render_id: RenderId::primary(spec.id.clone()),
            x: layering.slot[i] as f64 * (options.node_width + options.node_separation),
            y: layering.rank[i] as f64 * (options.node_height + options.rank_separation),
            is_active: false,
            metadata: None,
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .map(|spec| PositionedEdge {
            spec: spec.clone(),
            render_id: RenderId::primary(spec.id.clone()),
            source_render: RenderId::primary(spec.source.clone()),
            target_render: RenderId::primary(spec.target.clone()),
        })
        .collect();

    Ok(Diagram { nodes, edges })
}

/// Lay out a primary graph and attach its sub-agent overlay in one call.
///
/// Equivalent to two independent [`layout`] runs followed by
/// [`Diagram::attach_overlay`].
pub fn layout_with_overlay(
    primary: &TopologyGraph,
    overlay: &TopologyGraph,
    options: &LayoutOptions,
    overlay_options: &LayoutOptions,
    margin: f64,
) -> Result<Diagram, LayoutError> {
    let mut diagram = layout(primary, options)?;
    let side = layout(overlay, overlay_options)?;
    diagram.attach_overlay(side, margin);
    Ok(diagram)
}
