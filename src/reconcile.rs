//! Diff-aware reconciliation of live state onto the positioned diagram.
//!
//! One reconciliation pass applies the latest active-node set and metadata
//! snapshot to the existing node collection, never a fresh layout. The
//! pass writes a node's `is_active`/`metadata` only when the incoming value
//! actually differs, and reports which render ids changed so the caller can
//! skip re-rendering entirely on a quiet tick. Positions (`x`/`y`) belong
//! to layout and to user drags; reconciliation never touches them.
//!
//! This explicit diff-before-write rule replaces the implicit
//! re-render-on-every-write behavior of reactive UI stores, and it is the
//! invariant the idempotence tests pin down: a second pass with unchanged
//! inputs must change zero nodes.

use rustc_hash::FxHashSet;

use crate::layout::PositionedNode;
use crate::metadata::{MetadataMap, NodeMetadata};
use crate::types::{NodeId, RenderId};

/// Render ids whose derived fields were written by a reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub changed: Vec<RenderId>,
}

impl ReconcileOutcome {
    /// `true` when the pass wrote nothing: the render surface can skip the
    /// frame.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty()
    }

    /// Number of nodes written.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }
}

/// Apply the latest active set and metadata snapshot to the diagram nodes.
///
/// For each node:
///
/// 1. The canonical id comes from a pattern match on its [`RenderId`].
/// 2. Activity is checked under both the canonical id and the full render
///    string. The server reports against canonical ids, but a primary node
///    and its overlay twin must each reflect activity reported under either
///    key.
/// 3. Metadata is looked up canonical-first, then by render string. A
///    **missing** entry is "no new information": the previously displayed
///    value is kept, not cleared (entries routinely disappear between
///    polls; blanking them would flicker stale-but-valid data away).
/// 4. Fields are written only when the incoming value differs (`PartialEq`).
///
/// Runs in O(n) over the node count with O(1) average lookups; performs no
/// I/O. Call it on every ingestion tick and every poll tick, not on an
/// independent timer.
pub fn reconcile(
    nodes: &mut [PositionedNode],
    active: &FxHashSet<NodeId>,
    metadata: &MetadataMap,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for node in nodes.iter_mut() {
        let canonical = node.render_id.canonical();
        let render_key = node.render_id.encode();

        let next_active = active.contains(canonical) || active.contains(render_key.as_str());
        let next_metadata: Option<&NodeMetadata> = metadata
            .get(canonical)
            .or_else(|| metadata.get(render_key.as_str()));

        let mut touched = false;
        if node.is_active != next_active {
            node.is_active = next_active;
            touched = true;
        }
        if let Some(incoming) = next_metadata {
            if node.metadata.as_ref() != Some(incoming) {
                node.metadata = Some(incoming.clone());
                touched = true;
            }
        }

        if touched {
            outcome.changed.push(node.render_id.clone());
        }
    }

    if !outcome.is_clean() {
        tracing::debug!(changed = outcome.changed_count(), "reconciliation wrote nodes");
    }
    outcome
}
