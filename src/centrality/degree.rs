//! Degree centrality.

use std::collections::BTreeMap;

use petgraph::Direction;

use crate::entity::FigureId;
use crate::graph::MentionGraph;

/// In-degree and out-degree centrality for every node.
///
/// Each degree is divided by `n - 1`; a graph with one node or none
/// scores zero everywhere.
pub(crate) fn degree_centrality(
    graph: &MentionGraph,
) -> (BTreeMap<FigureId, f64>, BTreeMap<FigureId, f64>) {
    let g = graph.as_petgraph();
    let n = g.node_count();

    let mut in_scores = BTreeMap::new();
    let mut out_scores = BTreeMap::new();
    for node in g.node_indices() {
        let id = g[node].id.clone();
        if n <= 1 {
            in_scores.insert(id.clone(), 0.0);
            out_scores.insert(id, 0.0);
            continue;
        }
        let denom = (n - 1) as f64;
        let incoming = g.edges_directed(node, Direction::Incoming).count() as f64;
        let outgoing = g.edges_directed(node, Direction::Outgoing).count() as f64;
        in_scores.insert(id.clone(), incoming / denom);
        out_scores.insert(id, outgoing / denom);
    }
    (in_scores, out_scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::tests::graph_of;

    #[test]
    fn test_degree_centrality_on_star() {
        let graph = graph_of(
            &["Hub", "LeafA", "LeafB", "LeafC"],
            &[("LeafA", "Hub"), ("LeafB", "Hub"), ("LeafC", "Hub")],
        );
        let (in_scores, out_scores) = degree_centrality(&graph);

        assert_eq!(in_scores[&FigureId::new("Hub")], 1.0);
        assert_eq!(in_scores[&FigureId::new("LeafA")], 0.0);
        assert_eq!(out_scores[&FigureId::new("Hub")], 0.0);
        assert_eq!(out_scores[&FigureId::new("LeafA")], 1.0 / 3.0);
    }

    #[test]
    fn test_degree_centrality_single_node() {
        let graph = graph_of(&["Alone"], &[]);
        let (in_scores, out_scores) = degree_centrality(&graph);
        assert_eq!(in_scores[&FigureId::new("Alone")], 0.0);
        assert_eq!(out_scores[&FigureId::new("Alone")], 0.0);
    }
}
