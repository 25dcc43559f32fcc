//! Per-node runtime metadata, as polled from the control plane.
//!
//! The poller itself is an external collaborator: the page fetches
//! `{ nodeId: NodeMetadata }` on its own cadence and hands the decoded map
//! to the session. This module only defines the consumed shape. Absent
//! entries mean "no metadata", never an error; the reconciliation layer
//! keeps previously displayed values rather than blanking them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Runtime metadata for one node, keyed by canonical id.
///
/// Treated as a whole value: a poll replaces a node's metadata entirely,
/// there is no per-field merge.
///
/// ```rust
/// use toposync::metadata::NodeMetadata;
///
/// let meta: NodeMetadata = serde_json::from_str(
///     r#"{"channelId": "ch-7", "pFail": 0.02, "lastLatencyMs": 840.5, "toolCount": 3, "version": 12}"#,
/// )
/// .unwrap();
/// assert_eq!(meta.version, 12);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Backend channel the node communicates on.
    pub channel_id: String,
    /// Estimated failure probability, when the control plane has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_fail: Option<f64>,
    /// Latency of the node's most recent step, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_latency_ms: Option<f64>,
    /// Number of tools currently bound to the node.
    #[serde(default)]
    pub tool_count: u32,
    /// Configuration version the node is running.
    #[serde(default)]
    pub version: u32,
}

impl NodeMetadata {
    /// Metadata carrying only the channel binding.
    #[must_use]
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_latency_ms(mut self, latency_ms: f64) -> Self {
        self.last_latency_ms = Some(latency_ms);
        self
    }
}

/// The polled metadata snapshot: canonical node id → metadata.
///
/// May be empty, may miss entries for some or all nodes, and entries may
/// disappear between polls.
pub type MetadataMap = FxHashMap<NodeId, NodeMetadata>;
