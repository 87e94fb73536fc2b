//! In-memory weighted undirected graph with an adjacency index

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphError;

/// A graph node with its pass-through document attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Original string identifier from the input document
    pub id: String,

    /// Display label
    pub label: String,

    /// Attributes the analytics never interpret (sex, representative image, ...)
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

/// An undirected weighted edge between two node indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
    pub weight: f64,
    pub label: Option<String>,
}

/// Weighted undirected graph.
///
/// Edges are identified by the dense index they were added at; removal
/// leaves a hole so edge ids stay stable across a whole analysis run.
/// The adjacency index (node -> neighbor -> edge id) is kept in sync
/// with the edge set by every mutation.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    id_to_index: HashMap<String, u32>,
    edges: Vec<Option<Edge>>,
    // BTreeMap so neighbor iteration is ordered and runs are reproducible
    adjacency: Vec<BTreeMap<u32, usize>>,
    live_edges: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or return the index it already has
    pub fn add_node(&mut self, node: Node) -> u32 {
        if let Some(&idx) = self.id_to_index.get(&node.id) {
            return idx;
        }

        let idx = self.nodes.len() as u32;
        self.id_to_index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.adjacency.push(BTreeMap::new());
        idx
    }

    /// Add an undirected edge between two previously added nodes
    pub fn add_edge(
        &mut self,
        source_id: &str,
        target_id: &str,
        weight: f64,
        label: Option<String>,
    ) -> Result<usize, GraphError> {
        if !weight.is_finite() {
            return Err(GraphError::InvalidWeight {
                value: weight.to_string(),
            });
        }

        let source = self.require_index(source_id)?;
        let target = self.require_index(target_id)?;

        let edge_id = self.edges.len();
        self.edges.push(Some(Edge {
            source,
            target,
            weight,
            label,
        }));

        self.adjacency[source as usize].insert(target, edge_id);
        self.adjacency[target as usize].insert(source, edge_id);
        self.live_edges += 1;

        Ok(edge_id)
    }

    fn require_index(&self, id: &str) -> Result<u32, GraphError> {
        self.id_to_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::InvalidEdge {
                node: id.to_string(),
            })
    }

    /// Look up a node index by its string id
    pub fn node_index(&self, id: &str) -> Option<u32> {
        self.id_to_index.get(id).copied()
    }

    /// Node metadata by index
    pub fn node(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Live edges with their stable ids
    pub fn edges(&self) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|e| (id, e)))
    }

    /// Edge by id, if it has not been removed
    pub fn edge(&self, edge_id: usize) -> Option<&Edge> {
        self.edges.get(edge_id).and_then(|slot| slot.as_ref())
    }

    /// O(1) symmetric edge-presence check
    pub fn edge_exists(&self, u: u32, v: u32) -> bool {
        self.adjacency[u as usize].contains_key(&v)
    }

    /// Neighbors of `u` in ascending index order, with the joining edge id
    pub fn neighbors(&self, u: u32) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.adjacency[u as usize]
            .iter()
            .map(|(&neighbor, &edge_id)| (neighbor, edge_id))
    }

    pub fn degree(&self, u: u32) -> usize {
        self.adjacency[u as usize].len()
    }

    /// Remove an edge by id, keeping the adjacency index consistent
    pub fn remove_edge(&mut self, edge_id: usize) -> Option<Edge> {
        let edge = self.edges.get_mut(edge_id)?.take()?;
        self.adjacency[edge.source as usize].remove(&edge.target);
        self.adjacency[edge.target as usize].remove(&edge.source);
        self.live_edges -= 1;
        Some(edge)
    }

    /// Weights of all live edges
    pub fn edge_weights(&self) -> Vec<f64> {
        self.edges().map(|(_, e)| e.weight).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            label: id.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    fn triangle() -> Graph {
        let mut g = Graph::new();
        for id in ["a", "b", "c"] {
            g.add_node(node(id));
        }
        g.add_edge("a", "b", 1.0, None).unwrap();
        g.add_edge("b", "c", 2.0, None).unwrap();
        g.add_edge("c", "a", 3.0, None).unwrap();
        g
    }

    #[test]
    fn edge_presence_is_symmetric() {
        let g = triangle();
        for u in 0..3u32 {
            for v in 0..3u32 {
                assert_eq!(g.edge_exists(u, v), g.edge_exists(v, u));
            }
        }
        assert!(g.edge_exists(0, 1));
        assert!(!g.edge_exists(0, 0));
    }

    #[test]
    fn dangling_endpoint_is_rejected() {
        let mut g = triangle();
        let err = g.add_edge("a", "zz", 1.0, None).unwrap_err();
        assert!(matches!(err, GraphError::InvalidEdge { .. }));
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        let mut g = triangle();
        let err = g.add_edge("a", "b", f64::NAN, None).unwrap_err();
        assert!(matches!(err, GraphError::InvalidWeight { .. }));
    }

    #[test]
    fn removal_keeps_ids_stable_and_index_consistent() {
        let mut g = triangle();
        let removed = g.remove_edge(1).unwrap();
        assert_eq!((removed.source, removed.target), (1, 2));
        assert_eq!(g.edge_count(), 2);
        assert!(!g.edge_exists(1, 2));
        assert!(g.edge(1).is_none());
        // remaining edges keep their original ids
        let ids: Vec<usize> = g.edges().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 2]);
        // neighbor iteration is ascending
        let neighbors: Vec<u32> = g.neighbors(0).map(|(n, _)| n).collect();
        assert_eq!(neighbors, vec![1, 2]);
    }

    #[test]
    fn duplicate_node_ids_collapse() {
        let mut g = Graph::new();
        let first = g.add_node(node("a"));
        let second = g.add_node(node("a"));
        assert_eq!(first, second);
        assert_eq!(g.node_count(), 1);
    }
}
