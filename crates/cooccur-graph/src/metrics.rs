//! Exact structural metrics over a built graph.
//!
//! Edge weights are ignored here: reachability and distances count hops.
//! - components: BFS flood fill, isolated nodes are singleton components;
//! - clustering: local coefficient `2T(v) / (d(v)(d(v)-1))`, 0 when
//!   `d(v) < 2`, averaged over every node;
//! - diameter: largest BFS eccentricity, defined only on a connected graph.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::{CooccurrenceGraph, GraphError, NodeId};

// ============================================================================
// Connected components
// ============================================================================

/// Partition of the node set into connected components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Components {
    /// Component index per node.
    assignment: Vec<usize>,
    /// Members per component, in BFS order.
    members: Vec<Vec<NodeId>>,
}

impl Components {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[Vec<NodeId>] {
        &self.members
    }

    pub fn component_of(&self, id: NodeId) -> Option<usize> {
        self.assignment.get(id.index()).copied()
    }

    pub fn is_connected(&self) -> bool {
        self.members.len() == 1
    }

    /// Component sizes, largest first.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.members.iter().map(Vec::len).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }

    pub fn summary(&self) -> ComponentSummary {
        let sizes = self.sizes();
        let total: usize = sizes.iter().sum();
        let giant = sizes.first().copied().unwrap_or(0);
        ComponentSummary {
            component_count: sizes.len(),
            giant_component_size: giant,
            giant_component_ratio: if total == 0 {
                0.0
            } else {
                giant as f64 / total as f64
            },
            top_component_sizes: sizes.into_iter().take(25).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub component_count: usize,
    pub giant_component_size: usize,
    pub giant_component_ratio: f64,
    pub top_component_sizes: Vec<usize>,
}

pub fn connected_components(graph: &CooccurrenceGraph) -> Components {
    let n = graph.node_count();
    let mut assignment = vec![usize::MAX; n];
    let mut members: Vec<Vec<NodeId>> = Vec::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    for start in graph.nodes() {
        if assignment[start.index()] != usize::MAX {
            continue;
        }
        let cid = members.len();
        let mut component = Vec::new();
        assignment[start.index()] = cid;
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            component.push(node);
            for (next, _) in graph.neighbors(node) {
                if assignment[next.index()] == usize::MAX {
                    assignment[next.index()] = cid;
                    queue.push_back(next);
                }
            }
        }
        members.push(component);
    }

    tracing::debug!(components = members.len(), nodes = n, "connected components");
    Components {
        assignment,
        members,
    }
}

// ============================================================================
// Clustering
// ============================================================================

/// Number of edges among the neighbors of `id`.
pub fn triangles(graph: &CooccurrenceGraph, id: NodeId) -> usize {
    let mut links = 0usize;
    for (u, _) in graph.neighbors(id) {
        for (w, _) in graph.neighbors(u) {
            if w != id && graph.has_edge(id, w) {
                links += 1;
            }
        }
    }
    // Every neighbor-neighbor edge was seen from both ends.
    links / 2
}

pub fn local_clustering(graph: &CooccurrenceGraph, id: NodeId) -> f64 {
    let d = graph.degree(id);
    if d < 2 {
        return 0.0;
    }
    let t = triangles(graph, id);
    (2 * t) as f64 / (d * (d - 1)) as f64
}

/// Local coefficient per node, indexed by node id.
pub fn clustering_coefficients(graph: &CooccurrenceGraph) -> Vec<f64> {
    graph.nodes().map(|id| local_clustering(graph, id)).collect()
}

/// Mean local coefficient over all nodes; 0 for an empty graph.
pub fn average_clustering(graph: &CooccurrenceGraph) -> f64 {
    let n = graph.node_count();
    if n == 0 {
        return 0.0;
    }
    clustering_coefficients(graph).iter().sum::<f64>() / n as f64
}

// ============================================================================
// Distances
// ============================================================================

/// Hop distance from `source` to every node; `None` when unreachable.
pub fn bfs_distances(graph: &CooccurrenceGraph, source: NodeId) -> Vec<Option<usize>> {
    let mut dist: Vec<Option<usize>> = vec![None; graph.node_count()];
    if source.index() >= dist.len() {
        return dist;
    }
    dist[source.index()] = Some(0);

    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        let next_dist = dist[node.index()].map_or(0, |d| d + 1);
        for (next, _) in graph.neighbors(node) {
            if dist[next.index()].is_none() {
                dist[next.index()] = Some(next_dist);
                queue.push_back(next);
            }
        }
    }
    dist
}

/// Largest finite hop distance from `id`.
pub fn eccentricity(graph: &CooccurrenceGraph, id: NodeId) -> usize {
    bfs_distances(graph, id)
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
}

/// Exact diameter. Fails unless the graph has exactly one component.
pub fn diameter(graph: &CooccurrenceGraph) -> Result<usize, GraphError> {
    diameter_with(graph, &connected_components(graph))
}

fn diameter_with(graph: &CooccurrenceGraph, components: &Components) -> Result<usize, GraphError> {
    if !components.is_connected() {
        return Err(match components.count() {
            0 => GraphError::Empty,
            n => GraphError::Disconnected { components: n },
        });
    }
    let d = graph
        .nodes()
        .map(|id| eccentricity(graph, id))
        .max()
        .unwrap_or(0);
    tracing::debug!(diameter = d, nodes = graph.node_count(), "diameter");
    Ok(d)
}

// ============================================================================
// Bundle
// ============================================================================

/// The three statistics of a run, computed over one components pass.
#[derive(Debug, Clone)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub components: Components,
    pub average_clustering: f64,
    pub diameter: Result<usize, GraphError>,
}

impl GraphMetrics {
    pub fn compute(graph: &CooccurrenceGraph) -> Self {
        let components = connected_components(graph);
        let diameter = diameter_with(graph, &components);
        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            average_clustering: average_clustering(graph),
            components,
            diameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_cooccurrence_graph, BuildOptions, TermLists};
    use approx::assert_abs_diff_eq;

    fn graph_of(records: &[&[&str]]) -> CooccurrenceGraph {
        let lists: Vec<TermLists> = records
            .iter()
            .map(|terms| TermLists::controlled(terms.iter().copied()))
            .collect();
        build_cooccurrence_graph(&lists, &BuildOptions::new())
    }

    #[test]
    fn two_triangles_are_two_components_without_diameter() {
        let graph = graph_of(&[&["A", "B", "C"], &["D", "E", "F"]]);
        assert_eq!(graph.node_count(), 6);

        let components = connected_components(&graph);
        assert_eq!(components.count(), 2);
        assert_eq!(components.sizes(), vec![3, 3]);
        assert_eq!(
            diameter(&graph),
            Err(GraphError::Disconnected { components: 2 })
        );
        assert_abs_diff_eq!(average_clustering(&graph), 1.0);
    }

    #[test]
    fn four_cycle_metrics() {
        let graph = graph_of(&[&["A", "B"], &["B", "C"], &["C", "D"], &["D", "A"]]);

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(connected_components(&graph).count(), 1);
        assert_eq!(diameter(&graph), Ok(2));
        assert_abs_diff_eq!(average_clustering(&graph), 0.0);
        for id in graph.nodes() {
            assert_eq!(eccentricity(&graph, id), 2);
        }
    }

    #[test]
    fn path_graph_diameter_and_clustering() {
        // A - B - C - D plus the chord B - D.
        let graph = graph_of(&[&["A", "B"], &["B", "C"], &["C", "D"], &["B", "D"]]);
        let id = |t: &str| graph.node_id(t).expect("node");

        assert_eq!(diameter(&graph), Ok(2));
        assert_eq!(triangles(&graph, id("B")), 1);
        assert_abs_diff_eq!(local_clustering(&graph, id("B")), 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(local_clustering(&graph, id("C")), 1.0);
        assert_abs_diff_eq!(local_clustering(&graph, id("D")), 1.0);
        assert_abs_diff_eq!(local_clustering(&graph, id("A")), 0.0);
        assert_abs_diff_eq!(
            average_clustering(&graph),
            (0.0 + 1.0 / 3.0 + 1.0 + 1.0) / 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn empty_graph() {
        let graph = CooccurrenceGraph::default();
        assert_eq!(connected_components(&graph).count(), 0);
        assert_eq!(diameter(&graph), Err(GraphError::Empty));
        assert_abs_diff_eq!(average_clustering(&graph), 0.0);
    }

    #[test]
    fn single_edge_has_diameter_one() {
        let graph = graph_of(&[&["X", "Y"]]);
        assert_eq!(diameter(&graph), Ok(1));
        let summary = connected_components(&graph).summary();
        assert_eq!(summary.component_count, 1);
        assert_eq!(summary.giant_component_size, 2);
        assert_abs_diff_eq!(summary.giant_component_ratio, 1.0);
    }

    #[test]
    fn bfs_distances_mark_unreachable_nodes() {
        let graph = graph_of(&[&["A", "B"], &["C", "D"]]);
        let a = graph.node_id("A").expect("A");
        let dist = bfs_distances(&graph, a);
        assert_eq!(dist, vec![Some(0), Some(1), None, None]);
        assert_eq!(bfs_distances(&graph, NodeId::new(99)), vec![None; 4]);
    }

    #[test]
    fn isolated_repeated_term_disconnects_the_graph() {
        let lists = vec![
            TermLists::controlled(["A", "B"]),
            TermLists {
                controlled_vocabulary: vec!["X".to_string()],
                other_terms: vec!["X".to_string()],
                ..TermLists::default()
            },
        ];
        let graph = build_cooccurrence_graph(&lists, &BuildOptions::new());
        let metrics = GraphMetrics::compute(&graph);

        assert_eq!(metrics.node_count, 3);
        assert_eq!(metrics.components.count(), 2);
        assert_eq!(metrics.components.sizes(), vec![2, 1]);
        assert_eq!(
            metrics.diameter,
            Err(GraphError::Disconnected { components: 2 })
        );
        assert_abs_diff_eq!(metrics.average_clustering, 0.0);
    }

    #[test]
    fn single_isolated_node_has_diameter_zero() {
        let graph = graph_of(&[&["X", "X"]]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(diameter(&graph), Ok(0));
        assert_abs_diff_eq!(average_clustering(&graph), 0.0);
    }

    #[test]
    fn metrics_bundle_reuses_components() {
        let graph = graph_of(&[&["X", "Y"], &["X", "Y"], &["X", "Z"]]);
        let metrics = GraphMetrics::compute(&graph);
        assert_eq!(metrics.node_count, 3);
        assert_eq!(metrics.edge_count, 2);
        assert_eq!(metrics.components.count(), 1);
        assert_eq!(metrics.diameter, Ok(2));
        assert_abs_diff_eq!(metrics.average_clustering, 0.0);
    }
}
