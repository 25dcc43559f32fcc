//! Rank assignment and within-rank ordering.
//!
//! Layering follows the classic Sugiyama pipeline restricted to what a
//! topology canvas needs: longest-path ranks from sources, then a barycenter
//! ordering sweep to reduce crossings. Back edges (retry loops between
//! agents) are identified by depth-first search and excluded from ranking,
//! so the algorithm terminates on arbitrary directed input.
//!
//! Every tie is broken by input-array position. No step consults hash-map
//! iteration order, which is what makes identical input produce bit-identical
//! output.

use petgraph::graph::NodeIndex;
use petgraph::visit::{Control, DfsEvent, depth_first_search};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use crate::graph::TopologyGraph;

/// Result of the layering pass.
pub(super) struct Layering {
    /// Rank per node, indexed by input position.
    pub rank: Vec<usize>,
    /// Horizontal slot per node within its rank, indexed by input position.
    pub slot: Vec<usize>,
}

/// Assign ranks and slots to every node of the graph.
pub(super) fn layer(graph: &TopologyGraph) -> Layering {
    let n = graph.len();
    if n == 0 {
        return Layering {
            rank: Vec::new(),
            slot: Vec::new(),
        };
    }

    let view = graph.to_digraph();
    let back = back_edge_pairs(&view.graph);

    // Forward adjacency in input edge order, back edges dropped.
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_deg: Vec<usize> = vec![0; n];
    for edge in graph.edges() {
        let (Some(u), Some(v)) = (graph.node_index(&edge.source), graph.node_index(&edge.target))
        else {
            continue;
        };
        if back.contains(&(u, v)) {
            tracing::debug!(edge = %edge.id, "excluding back edge from ranking");
            continue;
        }
        out[u].push(v);
        preds[v].push(u);
        in_deg[v] += 1;
    }

    // Longest-path ranking over the acyclic remainder, sources first.
    // The queue is seeded and drained in input order.
    let mut rank = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_deg[i] == 0).collect();
    while let Some(u) = queue.pop_front() {
        for &v in &out[u] {
            rank[v] = rank[v].max(rank[u] + 1);
            in_deg[v] -= 1;
            if in_deg[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    let slot = order_within_ranks(n, &rank, &preds);
    Layering { rank, slot }
}

/// Edge endpoint pairs classified as back edges by DFS from input order.
fn back_edge_pairs(
    graph: &petgraph::graph::DiGraph<usize, usize>,
) -> FxHashSet<(usize, usize)> {
    let mut back: FxHashSet<(usize, usize)> = FxHashSet::default();
    let roots: Vec<NodeIndex> = graph.node_indices().collect();
    depth_first_search(graph, roots, |event| {
        if let DfsEvent::BackEdge(u, v) = event {
            back.insert((u.index(), v.index()));
        }
        Control::<()>::Continue
    });
    back
}

/// Barycenter ordering: two top-down sweeps, ties broken by input position.
fn order_within_ranks(n: usize, rank: &[usize], preds: &[Vec<usize>]) -> Vec<usize> {
    let max_rank = rank.iter().copied().max().unwrap_or(0);
    let mut order: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for i in 0..n {
        order[rank[i]].push(i);
    }

    let mut slot = vec![0usize; n];
    let assign_slots = |order: &[Vec<usize>], slot: &mut [usize]| {
        for members in order {
            for (pos, &i) in members.iter().enumerate() {
                slot[i] = pos;
            }
        }
    };
    assign_slots(&order, &mut slot);

    for _ in 0..2 {
        for r in 1..=max_rank {
            let mut keyed: Vec<(f64, usize)> = order[r]
                .iter()
                .map(|&i| {
                    let upstream: Vec<usize> = preds[i]
                        .iter()
                        .copied()
                        .filter(|&p| rank[p] == r - 1)
                        .collect();
                    let bary = if upstream.is_empty() {
                        slot[i] as f64
                    } else {
                        upstream.iter().map(|&p| slot[p] as f64).sum::<f64>()
                            / upstream.len() as f64
                    };
                    (bary, i)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            order[r] = keyed.into_iter().map(|(_, i)| i).collect();
            assign_slots(&order, &mut slot);
        }
    }

    slot
}
