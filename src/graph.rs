//! Mention graph construction.
//!
//! Builds a directed graph from the scanner's final state. Every counted
//! figure becomes a node (isolated zero-mention figures included), and the
//! edge set is the distinct ordered pairs from the edge list. Duplicate
//! edges collapse to one; repeat-mention frequency survives only in the
//! per-node raw mention count.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::entity::FigureId;
use crate::scan::ScanState;

/// Node payload: the figure and its cumulative raw mention count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Canonical figure id.
    pub id: FigureId,
    /// Total times the figure was mentioned across all scanned pages.
    pub raw_mentions: u64,
}

/// Directed mention graph with an id to node-index side map.
#[derive(Debug, Clone)]
pub struct MentionGraph {
    graph: DiGraph<NodeInfo, ()>,
    index: HashMap<FigureId, NodeIndex>,
}

impl MentionGraph {
    /// Builds the graph from scan results.
    ///
    /// Nodes are inserted in id order, so node indices are deterministic
    /// for a given state. Self-loops and edges with an endpoint missing
    /// from the count map are dropped.
    #[must_use]
    pub fn build(state: &ScanState) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for (id, &count) in state.counts() {
            let node = graph.add_node(NodeInfo {
                id: id.clone(),
                raw_mentions: count,
            });
            index.insert(id.clone(), node);
        }

        let mut seen = HashSet::new();
        for edge in state.edges() {
            let Some(&source) = index.get(&edge.source) else {
                continue;
            };
            let Some(&target) = index.get(&edge.target) else {
                continue;
            };
            if source == target {
                continue;
            }
            if seen.insert((source, target)) {
                graph.add_edge(source, target, ());
            }
        }

        Self { graph, index }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the figure is a node of the graph.
    #[must_use]
    pub fn contains(&self, id: &FigureId) -> bool {
        self.index.contains_key(id)
    }

    /// Internal node index for a figure.
    #[must_use]
    pub fn node_index(&self, id: &FigureId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Raw mention count carried on the figure's node.
    #[must_use]
    pub fn raw_mentions(&self, id: &FigureId) -> Option<u64> {
        self.index.get(id).map(|&node| self.graph[node].raw_mentions)
    }

    /// Number of distinct figures pointing at this one.
    #[must_use]
    pub fn in_degree(&self, id: &FigureId) -> Option<usize> {
        self.index
            .get(id)
            .map(|&node| self.graph.edges_directed(node, Direction::Incoming).count())
    }

    /// Number of distinct figures this one points at.
    #[must_use]
    pub fn out_degree(&self, id: &FigureId) -> Option<usize> {
        self.index
            .get(id)
            .map(|&node| self.graph.edges_directed(node, Direction::Outgoing).count())
    }

    /// Figure ids in node order (ascending by id).
    pub fn ids(&self) -> impl Iterator<Item = &FigureId> {
        self.graph.node_indices().map(|node| &self.graph[node].id)
    }

    /// Borrow of the underlying graph for metric computation.
    #[must_use]
    pub fn as_petgraph(&self) -> &DiGraph<NodeInfo, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Figure, Roster};

    fn figure(id: &str) -> Figure {
        Figure {
            id: FigureId::new(id),
            aliases: Vec::new(),
            date: String::new(),
            century: String::new(),
            source_locator: id.to_lowercase(),
            activity_year: None,
        }
    }

    fn state_of(names: &[&str], edges: &[(&str, &str)]) -> ScanState {
        let roster = Roster::from_figures(names.iter().map(|n| figure(n)).collect());
        let mut state = ScanState::new(&roster);
        for (source, target) in edges {
            state.record_mention(FigureId::new(*source), FigureId::new(*target));
        }
        state
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let state = state_of(&["Alpha", "Beta"], &[("Alpha", "Beta"), ("Alpha", "Beta")]);
        let graph = MentionGraph::build(&state);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.raw_mentions(&FigureId::new("Beta")), Some(2));
        assert_eq!(graph.in_degree(&FigureId::new("Beta")), Some(1));
    }

    #[test]
    fn test_isolated_nodes_are_kept() {
        let state = state_of(&["Alpha", "Beta", "Hermit"], &[("Alpha", "Beta")]);
        let graph = MentionGraph::build(&state);

        assert_eq!(graph.node_count(), 3);
        assert!(graph.contains(&FigureId::new("Hermit")));
        assert_eq!(graph.raw_mentions(&FigureId::new("Hermit")), Some(0));
        assert_eq!(graph.in_degree(&FigureId::new("Hermit")), Some(0));
    }

    #[test]
    fn test_self_loops_are_dropped() {
        let state = state_of(&["Alpha"], &[("Alpha", "Alpha")]);
        let graph = MentionGraph::build(&state);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edges_with_unknown_source_are_dropped() {
        let state = state_of(&["Alpha"], &[("Stranger", "Alpha")]);
        let graph = MentionGraph::build(&state);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        // The mention itself still counted.
        assert_eq!(graph.raw_mentions(&FigureId::new("Alpha")), Some(1));
        assert!(!graph.contains(&FigureId::new("Stranger")));
    }

    #[test]
    fn test_degrees() {
        let state = state_of(
            &["Alpha", "Beta", "Gamma"],
            &[("Alpha", "Beta"), ("Alpha", "Gamma"), ("Beta", "Gamma")],
        );
        let graph = MentionGraph::build(&state);

        assert_eq!(graph.out_degree(&FigureId::new("Alpha")), Some(2));
        assert_eq!(graph.in_degree(&FigureId::new("Alpha")), Some(0));
        assert_eq!(graph.in_degree(&FigureId::new("Gamma")), Some(2));
        assert_eq!(graph.out_degree(&FigureId::new("Gamma")), Some(0));
        assert_eq!(graph.in_degree(&FigureId::new("Missing")), None);
    }

    #[test]
    fn test_ids_iterate_in_sorted_order() {
        let state = state_of(&["Gamma", "Alpha", "Beta"], &[]);
        let graph = MentionGraph::build(&state);
        let ids: Vec<&str> = graph.ids().map(FigureId::as_str).collect();
        assert_eq!(ids, vec!["Alpha", "Beta", "Gamma"]);
    }
}
