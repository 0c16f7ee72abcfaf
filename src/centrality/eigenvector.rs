//! Eigenvector centrality by power iteration.

use std::collections::BTreeMap;

use petgraph::Direction;

use super::{CentralityConfig, FallbackReason, MetricOutcome};
use crate::graph::MentionGraph;

/// Power iteration on the in-edge adjacency with an identity shift.
///
/// Each round every node keeps its own score and absorbs its
/// in-neighbors', then the vector is L2-normalized. Converged when the L1
/// step change drops below `n * tolerance`. Converged scores below the
/// tolerance, and scores of nodes with no incident edges at all, are
/// reported as exactly 0. Non-convergence within the iteration budget
/// yields the all-zero fallback instead of an error.
pub(crate) fn eigenvector_centrality(
    graph: &MentionGraph,
    config: &CentralityConfig,
) -> MetricOutcome {
    let g = graph.as_petgraph();
    let n = g.node_count();
    if n == 0 {
        return MetricOutcome::Computed(BTreeMap::new());
    }

    let nf = n as f64;
    let mut scores = vec![1.0 / nf; n];

    for _ in 0..config.max_iterations {
        let last = scores.clone();
        for node in g.node_indices() {
            let mut acc = last[node.index()];
            for pred in g.neighbors_directed(node, Direction::Incoming) {
                acc += last[pred.index()];
            }
            scores[node.index()] = acc;
        }

        let norm = scores.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        for value in &mut scores {
            *value /= norm;
        }

        let step: f64 = scores
            .iter()
            .zip(&last)
            .map(|(a, b)| (a - b).abs())
            .sum();
        if step < nf * config.tolerance {
            let snapped = g
                .node_indices()
                .map(|node| {
                    let value = scores[node.index()];
                    let isolated = g
                        .neighbors_directed(node, Direction::Incoming)
                        .next()
                        .is_none()
                        && g.neighbors_directed(node, Direction::Outgoing)
                            .next()
                            .is_none();
                    let value = if isolated || value.abs() < config.tolerance {
                        0.0
                    } else {
                        value
                    };
                    (g[node].id.clone(), value)
                })
                .collect();
            return MetricOutcome::Computed(snapped);
        }
    }

    let zeros = g.node_indices().map(|i| (g[i].id.clone(), 0.0)).collect();
    MetricOutcome::Fallback {
        scores: zeros,
        reason: FallbackReason::NotConverged {
            iterations: config.max_iterations,
        },
    }
}
