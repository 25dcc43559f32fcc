//! Core identity types for the toposync engine.
//!
//! This module defines the fundamental types used throughout the engine for
//! identifying nodes on the topology canvas. These are the core domain
//! concepts the rest of the crate is built on.
//!
//! # Key Types
//!
//! - [`RenderId`]: Tagged identifier keying a node within the single render
//!   surface, distinguishing primary-graph nodes from sub-agent overlay nodes
//! - [`NodeKind`]: Classifies the role a node plays in a workflow topology
//! - [`ModelProvider`]: Presentation hint derived from a node's model id
//!
//! # Canonical vs. render identity
//!
//! The backend and its execution engine only ever speak *canonical* node ids.
//! The canvas renders the primary graph and the sub-agent overlay side by
//! side on one surface, so overlay nodes need a namespaced render identity to
//! avoid key collisions. [`RenderId`] makes that split a typed pattern match
//! instead of a string-prefix convention every caller has to remember:
//!
//! ```rust
//! use toposync::types::RenderId;
//!
//! let primary = RenderId::primary("planner");
//! let overlay = RenderId::overlay("planner");
//!
//! // Both resolve to the same backend identity.
//! assert_eq!(primary.canonical(), "planner");
//! assert_eq!(overlay.canonical(), "planner");
//!
//! // Only the string form carries the namespace.
//! assert_eq!(primary.encode(), "planner");
//! assert_eq!(overlay.encode(), "sub_planner");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical node identifier as known to the backend and execution engine.
pub type NodeId = String;

/// String prefix carried by the wire/render form of overlay identifiers.
pub const OVERLAY_PREFIX: &str = "sub_";

/// Identifier keying a node (or edge) within the diagramming surface.
///
/// Primary-graph elements render under their canonical id; sub-agent overlay
/// elements render under a namespaced twin so both can coexist on the single
/// surface. The namespace lives in the type, not in the string: callers
/// extract the canonical id with [`canonical`](Self::canonical) rather than
/// slicing a prefix.
///
/// # Serialization
///
/// `RenderId` serializes to (and deserializes from) its string form, because
/// that is the shape the render surface keys on: `"planner"` for a primary
/// node, `"sub_planner"` for its overlay twin.
///
/// ```rust
/// use toposync::types::RenderId;
///
/// let id = RenderId::overlay("planner");
/// let json = serde_json::to_string(&id).unwrap();
/// assert_eq!(json, "\"sub_planner\"");
/// assert_eq!(serde_json::from_str::<RenderId>(&json).unwrap(), id);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RenderId {
    /// A primary-graph element; renders under the canonical id itself.
    Canonical(NodeId),
    /// A sub-agent overlay element; renders as `"sub_" + id`.
    Overlay(NodeId),
}

impl RenderId {
    /// Builds the render id of a primary-graph element.
    #[must_use]
    pub fn primary(id: impl Into<NodeId>) -> Self {
        RenderId::Canonical(id.into())
    }

    /// Builds the render id of a sub-agent overlay element.
    #[must_use]
    pub fn overlay(id: impl Into<NodeId>) -> Self {
        RenderId::Overlay(id.into())
    }

    /// The canonical (backend) id, independent of rendering namespace.
    #[must_use]
    pub fn canonical(&self) -> &str {
        match self {
            RenderId::Canonical(id) | RenderId::Overlay(id) => id,
        }
    }

    /// Returns `true` for sub-agent overlay elements.
    #[must_use]
    pub fn is_overlay(&self) -> bool {
        matches!(self, RenderId::Overlay(_))
    }

    /// Encode into the string form the render surface keys on.
    ///
    /// ```rust
    /// # use toposync::types::RenderId;
    /// assert_eq!(RenderId::primary("a").encode(), "a");
    /// assert_eq!(RenderId::overlay("a").encode(), "sub_a");
    /// ```
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode the string form back into a render id.
    ///
    /// Total: a `sub_` prefix selects the overlay namespace, anything else is
    /// canonical.
    ///
    /// ```rust
    /// # use toposync::types::RenderId;
    /// assert_eq!(RenderId::decode("sub_a"), RenderId::overlay("a"));
    /// assert_eq!(RenderId::decode("a"), RenderId::primary("a"));
    /// ```
    pub fn decode(s: &str) -> Self {
        match s.strip_prefix(OVERLAY_PREFIX) {
            Some(rest) => RenderId::Overlay(rest.to_string()),
            None => RenderId::Canonical(s.to_string()),
        }
    }

    /// Re-tag this id into the overlay namespace, keeping the canonical id.
    #[must_use]
    pub fn into_overlay(self) -> Self {
        match self {
            RenderId::Canonical(id) | RenderId::Overlay(id) => RenderId::Overlay(id),
        }
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderId::Canonical(id) => write!(f, "{id}"),
            RenderId::Overlay(id) => write!(f, "{OVERLAY_PREFIX}{id}"),
        }
    }
}

impl From<RenderId> for String {
    fn from(id: RenderId) -> Self {
        id.encode()
    }
}

impl From<String> for RenderId {
    fn from(s: String) -> Self {
        RenderId::decode(&s)
    }
}

impl From<&str> for RenderId {
    fn from(s: &str) -> Self {
        RenderId::decode(s)
    }
}

/// The role a node plays within a workflow topology.
///
/// Kinds drive presentation (icon, color band) on the canvas; they have no
/// effect on layout or reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root coordinator dispatching work to agents.
    Orchestrator,
    /// A primary-graph agent.
    Agent,
    /// An agent rendered in the sub-agent overlay.
    SubAgent,
    /// Error-handling branch target.
    ErrorHandler,
    /// Synthesized terminal marking workflow completion.
    Terminal,
}

impl NodeKind {
    /// Returns `true` for the synthesized terminal node.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orchestrator => write!(f, "orchestrator"),
            Self::Agent => write!(f, "agent"),
            Self::SubAgent => write!(f, "sub_agent"),
            Self::ErrorHandler => write!(f, "error_handler"),
            Self::Terminal => write!(f, "terminal"),
        }
    }
}

/// Provider classification derived from a node's model id.
///
/// Purely a presentation hint (badge on the node card). The classification
/// is total over non-empty model ids: anything not recognized as a hosted
/// provider is treated as self-hosted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProvider {
    OpenAi,
    Anthropic,
    SelfHosted,
}

impl ModelProvider {
    /// Classify a model id by substring, case-insensitively.
    ///
    /// Returns `None` only for empty ids; every non-empty id maps to exactly
    /// one provider, with unrecognized ids defaulting to
    /// [`SelfHosted`](Self::SelfHosted).
    ///
    /// ```rust
    /// use toposync::types::ModelProvider;
    ///
    /// assert_eq!(ModelProvider::classify("gpt-4o"), Some(ModelProvider::OpenAi));
    /// assert_eq!(ModelProvider::classify("claude-sonnet-4"), Some(ModelProvider::Anthropic));
    /// assert_eq!(ModelProvider::classify("llama3:70b"), Some(ModelProvider::SelfHosted));
    /// assert_eq!(ModelProvider::classify(""), None);
    /// ```
    pub fn classify(model_id: &str) -> Option<Self> {
        if model_id.is_empty() {
            return None;
        }
        let id = model_id.to_ascii_lowercase();
        if id.contains("gpt") || id.contains("o1") {
            Some(Self::OpenAi)
        } else if ["claude", "opus", "sonnet", "haiku"]
            .iter()
            .any(|needle| id.contains(needle))
        {
            Some(Self::Anthropic)
        } else {
            Some(Self::SelfHosted)
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::SelfHosted => write!(f, "self_hosted"),
        }
    }
}
