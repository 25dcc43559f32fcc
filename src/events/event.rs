//! Execution event vocabulary consumed from the live stream.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::NodeId;

/// One execution event as delivered by the backend's push channel.
///
/// Events are totally ordered by **arrival**; `timestamp` is the server
/// clock (seconds, possibly skewed) and is only ever used for display. State
/// transitions in [`EventIngestion`](super::EventIngestion) trust delivery
/// order exclusively.
///
/// # Wire format
///
/// Tagged JSON, one object per stream message:
///
/// ```rust
/// use toposync::events::ExecutionEvent;
///
/// let event: ExecutionEvent = serde_json::from_str(
///     r#"{"type": "node_error", "node": "coder", "error": "tool timeout", "timestamp": 1723111462.5}"#,
/// )
/// .unwrap();
/// assert_eq!(event.node_id(), Some("coder"));
/// assert_eq!(event.error(), Some("tool timeout"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// A node began executing.
    NodeEntered { node: NodeId, timestamp: f64 },
    /// A node finished executing.
    NodeExited { node: NodeId, timestamp: f64 },
    /// A node failed; removes it from the active set like an exit.
    NodeError {
        node: NodeId,
        error: String,
        timestamp: f64,
    },
    /// Model invocation started within a node.
    LlmStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
        timestamp: f64,
    },
    /// Model invocation finished.
    LlmEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
        timestamp: f64,
    },
    /// Tool call started within a node.
    ToolStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        timestamp: f64,
    },
    /// Tool call finished.
    ToolEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        timestamp: f64,
    },
    /// Transport-level status heartbeat from the event bridge.
    BridgeStatus { timestamp: f64 },
}

impl ExecutionEvent {
    /// A `node_entered` event.
    #[must_use]
    pub fn entered(node: impl Into<NodeId>, timestamp: f64) -> Self {
        Self::NodeEntered {
            node: node.into(),
            timestamp,
        }
    }

    /// A `node_exited` event.
    #[must_use]
    pub fn exited(node: impl Into<NodeId>, timestamp: f64) -> Self {
        Self::NodeExited {
            node: node.into(),
            timestamp,
        }
    }

    /// A `node_error` event carrying the failure description.
    #[must_use]
    pub fn errored(node: impl Into<NodeId>, error: impl Into<String>, timestamp: f64) -> Self {
        Self::NodeError {
            node: node.into(),
            error: error.into(),
            timestamp,
        }
    }

    /// The canonical node id this event refers to, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::NodeEntered { node, .. }
            | Self::NodeExited { node, .. }
            | Self::NodeError { node, .. } => Some(node),
            Self::LlmStart { node, .. }
            | Self::LlmEnd { node, .. }
            | Self::ToolStart { node, .. }
            | Self::ToolEnd { node, .. } => node.as_deref(),
            Self::BridgeStatus { .. } => None,
        }
    }

    /// The error description for `node_error` events.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::NodeError { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Convert to the tagged JSON value matching the wire format.
    ///
    /// ```rust
    /// use toposync::events::ExecutionEvent;
    ///
    /// let json = ExecutionEvent::entered("coder", 1.5).to_json_value();
    /// assert_eq!(json["type"], "node_entered");
    /// assert_eq!(json["node"], "coder");
    /// ```
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("event serialization is infallible")
    }

    /// Convert to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Server-clock timestamp in seconds. Display only; may be skewed.
    #[must_use]
    pub fn timestamp(&self) -> f64 {
        match self {
            Self::NodeEntered { timestamp, .. }
            | Self::NodeExited { timestamp, .. }
            | Self::NodeError { timestamp, .. }
            | Self::LlmStart { timestamp, .. }
            | Self::LlmEnd { timestamp, .. }
            | Self::ToolStart { timestamp, .. }
            | Self::ToolEnd { timestamp, .. }
            | Self::BridgeStatus { timestamp } => *timestamp,
        }
    }
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeEntered { node, .. } => write!(f, "[{node}] entered"),
            Self::NodeExited { node, .. } => write!(f, "[{node}] exited"),
            Self::NodeError { node, error, .. } => write!(f, "[{node}] error: {error}"),
            Self::LlmStart { node, .. } => match node {
                Some(node) => write!(f, "[{node}] llm start"),
                None => write!(f, "llm start"),
            },
            Self::LlmEnd { node, .. } => match node {
                Some(node) => write!(f, "[{node}] llm end"),
                None => write!(f, "llm end"),
            },
            Self::ToolStart { node, tool, .. } => {
                let tool = tool.as_deref().unwrap_or("tool");
                match node {
                    Some(node) => write!(f, "[{node}] {tool} start"),
                    None => write!(f, "{tool} start"),
                }
            }
            Self::ToolEnd { node, tool, .. } => {
                let tool = tool.as_deref().unwrap_or("tool");
                match node {
                    Some(node) => write!(f, "[{node}] {tool} end"),
                    None => write!(f, "{tool} end"),
                }
            }
            Self::BridgeStatus { .. } => write!(f, "bridge status"),
        }
    }
}
