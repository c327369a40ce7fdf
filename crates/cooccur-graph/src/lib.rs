//! Term co-occurrence graph
//!
//! Two terms are joined by an undirected edge when they appear together in
//! the selected term lists of a record; the edge weight counts how often that
//! happened across the corpus.
//!
//! Storage model:
//! 1. **Term interning**: every term label is stored once and addressed by a
//!    dense [`NodeId`] assigned in discovery order.
//! 2. **Adjacency maps**: node -> (neighbor -> edge slot), one map per node,
//!    symmetric by construction.
//! 3. **Edge records**: edges live in a single vector in discovery order and
//!    carry the weight, so `(a, b)` and `(b, a)` resolve to the same record.
//!
//! The graph is built once by [`builder`] and only read by [`metrics`].

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub mod builder;
pub mod metrics;

pub use builder::{
    build_cooccurrence_graph, BuildOptions, BuildStats, CategorySelection, CooccurrenceBuilder,
    DuplicatePolicy, TermLists, TermSource,
};
pub use metrics::{
    average_clustering, bfs_distances, clustering_coefficients, connected_components, diameter,
    eccentricity, local_clustering, triangles, ComponentSummary, Components, GraphMetrics,
};

// ============================================================================
// Node ids and term interning
// ============================================================================

/// Dense node id (position of the term in discovery order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Largest number of distinct terms a graph can hold; node ids are `u32`.
pub const MAX_TERMS: usize = u32::MAX as usize;

/// Term interner: maps labels to node ids and back.
#[derive(Debug, Clone, Default)]
pub struct TermInterner {
    str_to_id: AHashMap<String, NodeId>,
    id_to_str: Vec<String>,
}

impl TermInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a term, returning its id and whether it was new.
    pub fn intern(&mut self, term: &str) -> (NodeId, bool) {
        if let Some(&id) = self.str_to_id.get(term) {
            return (id, false);
        }
        debug_assert!(self.id_to_str.len() < MAX_TERMS, "term id space exhausted");
        let id = NodeId(self.id_to_str.len() as u32);
        self.str_to_id.insert(term.to_string(), id);
        self.id_to_str.push(term.to_string());
        (id, true)
    }

    /// Look up an existing id without inserting.
    pub fn id_of(&self, term: &str) -> Option<NodeId> {
        self.str_to_id.get(term).copied()
    }

    pub fn lookup(&self, id: NodeId) -> Option<&str> {
        self.id_to_str.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.id_to_str
            .iter()
            .enumerate()
            .map(|(i, s)| (NodeId(i as u32), s.as_str()))
    }
}

// ============================================================================
// Graph
// ============================================================================

/// An undirected weighted edge. `a` is the endpoint that was seen first in
/// the pair that created the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: u32,
}

/// An edge with its endpoint labels resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeightedTermPair<'g> {
    pub a: &'g str,
    pub b: &'g str,
    pub weight: u32,
}

/// Weighted undirected co-occurrence graph.
#[derive(Debug, Clone, Default)]
pub struct CooccurrenceGraph {
    terms: TermInterner,
    adjacency: Vec<AHashMap<NodeId, usize>>,
    edges: Vec<Edge>,
}

impl CooccurrenceGraph {
    pub fn node_count(&self) -> usize {
        self.terms.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn node_id(&self, term: &str) -> Option<NodeId> {
        self.terms.id_of(term)
    }

    pub fn term(&self, id: NodeId) -> Option<&str> {
        self.terms.lookup(id)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.id_of(term).is_some()
    }

    /// Node ids in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.terms.iter().map(|(id, _)| id)
    }

    /// `(id, label)` pairs in discovery order.
    pub fn terms(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.terms.iter()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(id.index()).map_or(0, |adj| adj.len())
    }

    /// `(neighbor, weight)` pairs of `id`. Order is unspecified.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.adjacency
            .get(id.index())
            .into_iter()
            .flat_map(move |adj| adj.iter().map(move |(&n, &slot)| (n, self.edges[slot].weight)))
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(a.index())
            .is_some_and(|adj| adj.contains_key(&b))
    }

    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        let slot = *self.adjacency.get(a.index())?.get(&b)?;
        Some(&self.edges[slot])
    }

    /// Weight of the edge between two labels, in either order.
    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let a = self.node_id(a)?;
        let b = self.node_id(b)?;
        self.edge_between(a, b).map(|e| e.weight)
    }

    /// Edges in discovery order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges by descending weight; equal weights keep discovery order.
    pub fn edges_by_weight(&self) -> Vec<&Edge> {
        let mut sorted: Vec<&Edge> = self.edges.iter().collect();
        sorted.sort_by_key(|e| Reverse(e.weight));
        sorted
    }

    /// Labeled edges by descending weight, the edge-list export order.
    pub fn labeled_edges_by_weight(&self) -> Vec<WeightedTermPair<'_>> {
        self.edges_by_weight()
            .into_iter()
            .filter_map(|e| {
                Some(WeightedTermPair {
                    a: self.term(e.a)?,
                    b: self.term(e.b)?,
                    weight: e.weight,
                })
            })
            .collect()
    }

    pub(crate) fn add_node(&mut self, term: &str) -> NodeId {
        let (id, fresh) = self.terms.intern(term);
        if fresh {
            self.adjacency.push(AHashMap::new());
        }
        id
    }

    /// Increment the weight of `{a, b}`, creating the edge at weight 1.
    /// Returns the new weight.
    pub(crate) fn bump_edge(&mut self, a: NodeId, b: NodeId) -> u32 {
        debug_assert_ne!(a, b, "self pairs never form edges");
        if let Some(&slot) = self.adjacency[a.index()].get(&b) {
            let edge = &mut self.edges[slot];
            edge.weight += 1;
            return edge.weight;
        }
        let slot = self.edges.len();
        self.edges.push(Edge { a, b, weight: 1 });
        self.adjacency[a.index()].insert(b, slot);
        self.adjacency[b.index()].insert(a, slot);
        1
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("graph is disconnected ({components} connected components); diameter is undefined")]
    Disconnected { components: usize },

    #[error("graph has no nodes; diameter is undefined")]
    Empty,
}
