//! The event ingestion state machine.
//!
//! [`EventIngestion`] owns the two pieces of state derived from the live
//! stream: a capacity-bounded append-only log (oldest entries evicted first)
//! and the active-node set. The transition function is pure over its own
//! state and idempotent for replays of an identical event, beyond the log
//! append the caller avoids by not re-delivering.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use super::event::ExecutionEvent;
use crate::types::NodeId;

/// Default log capacity when no option or environment override is present.
const DEFAULT_LOG_CAPACITY: usize = 512;

/// Configuration for an [`EventIngestion`] instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestionOptions {
    /// Maximum retained log entries; oldest are evicted once exceeded.
    pub log_capacity: usize,
}

impl Default for IngestionOptions {
    /// Resolves the capacity from `TOPOSYNC_EVENT_LOG_CAPACITY` (via
    /// `.env`/environment), falling back to 512.
    fn default() -> Self {
        Self {
            log_capacity: Self::resolve_log_capacity(None),
        }
    }
}

impl IngestionOptions {
    /// Options with an explicit log capacity (clamped to at least 1).
    #[must_use]
    pub fn with_log_capacity(capacity: usize) -> Self {
        Self {
            log_capacity: capacity.max(1),
        }
    }

    fn resolve_log_capacity(provided: Option<usize>) -> usize {
        if let Some(capacity) = provided {
            return capacity.max(1);
        }
        dotenvy::dotenv().ok();
        std::env::var("TOPOSYNC_EVENT_LOG_CAPACITY")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_LOG_CAPACITY)
            .max(1)
    }
}

/// A retained log entry: the event plus its local arrival stamp.
///
/// `received_at` is assigned from the local clock at ingestion and exists
/// for display alongside the (possibly skewed) server `timestamp`.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub event: ExecutionEvent,
    pub received_at: DateTime<Utc>,
}

/// Derived state over the execution event stream.
///
/// # Invariant
///
/// A node id is in the active set iff the most recent `node_entered` for
/// that id has not been followed by a `node_exited` or `node_error` for the
/// same id, judged by delivery order, never by event timestamps.
///
/// # Examples
///
/// ```rust
/// use toposync::events::{EventIngestion, ExecutionEvent, IngestionOptions};
///
/// let mut ingestion = EventIngestion::new(IngestionOptions::with_log_capacity(64));
/// ingestion.apply(ExecutionEvent::entered("coder", 1.0));
/// assert!(ingestion.is_active("coder"));
///
/// ingestion.apply(ExecutionEvent::exited("coder", 2.0));
/// assert!(!ingestion.is_active("coder"));
/// assert_eq!(ingestion.log().len(), 2);
/// ```
#[derive(Debug)]
pub struct EventIngestion {
    log: VecDeque<LogEntry>,
    active: FxHashSet<NodeId>,
    connected: bool,
    options: IngestionOptions,
}

impl Default for EventIngestion {
    fn default() -> Self {
        Self::new(IngestionOptions::default())
    }
}

impl EventIngestion {
    /// Creates an ingestion instance with the given options.
    #[must_use]
    pub fn new(options: IngestionOptions) -> Self {
        Self {
            log: VecDeque::with_capacity(options.log_capacity.min(1024)),
            active: FxHashSet::default(),
            connected: false,
            options,
        }
    }

    /// Apply one event in delivery order.
    ///
    /// `node_entered` adds to the active set (idempotently; re-entry on a
    /// loop is a no-op add); `node_exited` and `node_error` remove; all
    /// other event types only append to the log.
    pub fn apply(&mut self, event: ExecutionEvent) {
        match &event {
            ExecutionEvent::NodeEntered { node, .. } => {
                self.active.insert(node.clone());
            }
            ExecutionEvent::NodeExited { node, .. } | ExecutionEvent::NodeError { node, .. } => {
                self.active.remove(node);
            }
            _ => {}
        }

        let capacity = self.options.log_capacity.max(1);
        while self.log.len() >= capacity {
            tracing::debug!(capacity, "evicting oldest log entry");
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            event,
            received_at: Utc::now(),
        });
    }

    /// Reset the log and the active set.
    ///
    /// This is the only path besides matching exit/error events that removes
    /// active nodes. A dropped connection gives no guarantee that in-flight
    /// `node_entered` events will ever see their closing event, so the owner
    /// of the transport must be able to clear explicitly after a reconnect.
    pub fn clear(&mut self) {
        tracing::debug!(
            log = self.log.len(),
            active = self.active.len(),
            "clearing ingestion state"
        );
        self.log.clear();
        self.active.clear();
    }

    /// The currently active node ids (canonical).
    pub fn active(&self) -> &FxHashSet<NodeId> {
        &self.active
    }

    /// Whether the given canonical id is currently active.
    pub fn is_active(&self, node: &str) -> bool {
        self.active.contains(node)
    }

    /// The retained log, oldest first.
    pub fn log(&self) -> &VecDeque<LogEntry> {
        &self.log
    }

    /// Transport connectivity as last reported by the stream owner.
    ///
    /// The flag is never computed here; the transport's owner forwards
    /// connect/disconnect signals. Disconnect is not an error and does not
    /// clear state.
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Record a connectivity transition reported by the transport owner.
    pub fn set_connected(&mut self, connected: bool) {
        if self.connected != connected {
            tracing::debug!(connected, "stream connectivity changed");
        }
        self.connected = connected;
    }
}
