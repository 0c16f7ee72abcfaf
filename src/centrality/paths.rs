//! Shortest-path centralities over unweighted BFS distances.

use std::collections::{BTreeMap, VecDeque};

use petgraph::Direction;

use super::{FallbackReason, MetricOutcome};
use crate::entity::FigureId;
use crate::graph::MentionGraph;

const UNVISITED: usize = usize::MAX;

/// Directed closeness centrality.
///
/// Each node is scored from the distances of the nodes that can reach it
/// (incoming direction). With `r` nodes reaching the target (itself
/// included) at total distance `t`, the score is
/// `((r - 1) / t) * ((r - 1) / (n - 1))`; nodes nothing reaches score 0.
/// An edgeless graph has no finite distance at all and degrades to the
/// all-zero fallback.
pub(crate) fn closeness_centrality(graph: &MentionGraph) -> MetricOutcome {
    let g = graph.as_petgraph();
    let n = g.node_count();

    if g.edge_count() == 0 {
        let scores = g.node_indices().map(|i| (g[i].id.clone(), 0.0)).collect();
        return MetricOutcome::Fallback {
            scores,
            reason: FallbackReason::NoFinitePaths,
        };
    }

    let mut scores = BTreeMap::new();
    for node in g.node_indices() {
        let mut dist = vec![UNVISITED; n];
        dist[node.index()] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(node);

        let mut reachable = 1usize;
        let mut total = 0usize;
        while let Some(current) = queue.pop_front() {
            let d = dist[current.index()];
            for pred in g.neighbors_directed(current, Direction::Incoming) {
                if dist[pred.index()] == UNVISITED {
                    dist[pred.index()] = d + 1;
                    reachable += 1;
                    total += d + 1;
                    queue.push_back(pred);
                }
            }
        }

        let score = if total > 0 && n > 1 {
            let r = reachable as f64;
            ((r - 1.0) / total as f64) * ((r - 1.0) / (n - 1) as f64)
        } else {
            0.0
        };
        scores.insert(g[node].id.clone(), score);
    }
    MetricOutcome::Computed(scores)
}

/// Betweenness centrality by Brandes' algorithm.
///
/// Exact over all ordered pairs, endpoints excluded, scaled by
/// `1 / ((n - 1) (n - 2))` when `n > 2`. Smaller graphs keep the raw
/// sums, which are all zero.
pub(crate) fn betweenness_centrality(graph: &MentionGraph) -> BTreeMap<FigureId, f64> {
    let g = graph.as_petgraph();
    let n = g.node_count();
    let mut centrality = vec![0.0f64; n];

    for s in g.node_indices() {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![UNVISITED; n];
        sigma[s.index()] = 1.0;
        dist[s.index()] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v.index()];
            for w in g.neighbors_directed(v, Direction::Outgoing) {
                let wi = w.index();
                if dist[wi] == UNVISITED {
                    dist[wi] = dv + 1;
                    queue.push_back(w);
                }
                if dist[wi] == dv + 1 {
                    sigma[wi] += sigma[v.index()];
                    preds[wi].push(v.index());
                }
            }
        }

        // Dependency accumulation in reverse BFS order.
        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            let wi = w.index();
            for &vi in &preds[wi] {
                delta[vi] += sigma[vi] / sigma[wi] * (1.0 + delta[wi]);
            }
            if w != s {
                centrality[wi] += delta[wi];
            }
        }
    }

    let scale = if n > 2 {
        1.0 / ((n - 1) as f64 * (n - 2) as f64)
    } else {
        1.0
    };
    g.node_indices()
        .map(|i| (g[i].id.clone(), centrality[i.index()] * scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::tests::graph_of;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn test_closeness_on_directed_path() {
        let graph = graph_of(
            &["Alpha", "Beta", "Gamma"],
            &[("Alpha", "Beta"), ("Beta", "Gamma")],
        );
        let scores = match closeness_centrality(&graph) {
            MetricOutcome::Computed(scores) => scores,
            MetricOutcome::Fallback { .. } => panic!("unexpected fallback"),
        };

        approx(scores[&FigureId::new("Alpha")], 0.0);
        approx(scores[&FigureId::new("Beta")], 0.5);
        approx(scores[&FigureId::new("Gamma")], 2.0 / 3.0);
    }

    #[test]
    fn test_closeness_on_three_cycle() {
        let graph = graph_of(
            &["Alpha", "Beta", "Gamma"],
            &[("Alpha", "Beta"), ("Beta", "Gamma"), ("Gamma", "Alpha")],
        );
        let outcome = closeness_centrality(&graph);
        for (_, score) in outcome.scores() {
            approx(*score, 2.0 / 3.0);
        }
    }

    #[test]
    fn test_closeness_edgeless_fallback() {
        let graph = graph_of(&["Alpha", "Beta"], &[]);
        let outcome = closeness_centrality(&graph);
        assert!(matches!(
            outcome.fallback_reason(),
            Some(FallbackReason::NoFinitePaths)
        ));
        assert!(outcome.scores().values().all(|&s| s == 0.0));
    }

    #[test]
    fn test_betweenness_on_directed_path() {
        let graph = graph_of(
            &["Alpha", "Beta", "Gamma"],
            &[("Alpha", "Beta"), ("Beta", "Gamma")],
        );
        let scores = betweenness_centrality(&graph);

        approx(scores[&FigureId::new("Alpha")], 0.0);
        approx(scores[&FigureId::new("Beta")], 0.5);
        approx(scores[&FigureId::new("Gamma")], 0.0);
    }

    #[test]
    fn test_betweenness_on_three_cycle() {
        let graph = graph_of(
            &["Alpha", "Beta", "Gamma"],
            &[("Alpha", "Beta"), ("Beta", "Gamma"), ("Gamma", "Alpha")],
        );
        let scores = betweenness_centrality(&graph);
        for score in scores.values() {
            approx(*score, 0.5);
        }
    }

    #[test]
    fn test_betweenness_splits_between_parallel_routes() {
        let graph = graph_of(
            &["Entry", "Left", "Right", "Exit"],
            &[
                ("Entry", "Left"),
                ("Entry", "Right"),
                ("Left", "Exit"),
                ("Right", "Exit"),
            ],
        );
        let scores = betweenness_centrality(&graph);

        approx(scores[&FigureId::new("Left")], 0.5 / 6.0);
        approx(scores[&FigureId::new("Right")], 0.5 / 6.0);
        approx(scores[&FigureId::new("Entry")], 0.0);
        approx(scores[&FigureId::new("Exit")], 0.0);
    }

    #[test]
    fn test_betweenness_two_nodes_is_zero() {
        let graph = graph_of(&["Alpha", "Beta"], &[("Alpha", "Beta")]);
        let scores = betweenness_centrality(&graph);
        assert!(scores.values().all(|&s| s == 0.0));
    }
}
