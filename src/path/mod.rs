//! Weighted shortest-path search

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::GraphError;
use crate::graph::Graph;

/// A node on the search frontier, ordered as a min-heap on estimated
/// cost with the node index breaking ties so expansion order is fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    estimate: f64,
    node: u32,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A resolved path through the graph
#[derive(Debug, Clone)]
pub struct Path {
    /// Node indices from start to end inclusive
    pub nodes: Vec<u32>,

    /// Ids of the edges joining consecutive nodes
    pub edges: Vec<usize>,

    /// Total weight along the path
    pub cost: f64,
}

/// A* over the undirected weighted graph.
///
/// `heuristic` must never overestimate the remaining cost; passing a
/// constant zero degrades the search to plain Dijkstra, which is what
/// callers use since the graph carries no spatial coordinates.
pub fn astar<H>(graph: &Graph, start: u32, end: u32, heuristic: H) -> Option<Path>
where
    H: Fn(u32) -> f64,
{
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<(u32, usize)>> = vec![None; n];
    let mut settled = vec![false; n];

    let mut frontier = BinaryHeap::new();
    dist[start as usize] = 0.0;
    frontier.push(Frontier {
        estimate: heuristic(start),
        node: start,
    });

    while let Some(Frontier { node, .. }) = frontier.pop() {
        if settled[node as usize] {
            continue;
        }
        settled[node as usize] = true;

        if node == end {
            break;
        }

        for (neighbor, edge_id) in graph.neighbors(node) {
            let Some(edge) = graph.edge(edge_id) else {
                continue;
            };
            let candidate = dist[node as usize] + edge.weight;
            // strict improvement only, so the first path found wins ties
            if candidate < dist[neighbor as usize] {
                dist[neighbor as usize] = candidate;
                prev[neighbor as usize] = Some((node, edge_id));
                frontier.push(Frontier {
                    estimate: candidate + heuristic(neighbor),
                    node: neighbor,
                });
            }
        }
    }

    if !settled[end as usize] {
        return None;
    }

    let mut nodes = vec![end];
    let mut edges = Vec::new();
    let mut cursor = end;
    while let Some((parent, edge_id)) = prev[cursor as usize] {
        nodes.push(parent);
        edges.push(edge_id);
        cursor = parent;
    }
    nodes.reverse();
    edges.reverse();

    Some(Path {
        nodes,
        edges,
        cost: dist[end as usize],
    })
}

/// Shortest path between two nodes named by string id.
///
/// Fails with `NodeNotFound` for an unknown endpoint and `NoPathFound`
/// when the endpoints are disconnected.
pub fn shortest_path(graph: &Graph, start_id: &str, end_id: &str) -> Result<Vec<String>, GraphError> {
    let start = graph.node_index(start_id).ok_or_else(|| GraphError::NodeNotFound {
        id: start_id.to_string(),
    })?;
    let end = graph.node_index(end_id).ok_or_else(|| GraphError::NodeNotFound {
        id: end_id.to_string(),
    })?;

    let path = astar(graph, start, end, |_| 0.0).ok_or_else(|| GraphError::NoPathFound {
        start: start_id.to_string(),
        end: end_id.to_string(),
    })?;

    Ok(path
        .nodes
        .iter()
        .map(|&idx| graph.node(idx).id.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use std::collections::BTreeMap;

    fn build(ids: &[&str], edges: &[(&str, &str, f64)]) -> Graph {
        let mut g = Graph::new();
        for &id in ids {
            g.add_node(Node {
                id: id.to_string(),
                label: id.to_string(),
                attributes: BTreeMap::new(),
            });
        }
        for &(a, b, w) in edges {
            g.add_edge(a, b, w, None).unwrap();
        }
        g
    }

    #[test]
    fn chain_path_visits_every_node() {
        let g = build(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0)],
        );
        let path = shortest_path(&g, "A", "D").unwrap();
        assert_eq!(path, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn weights_steer_the_route() {
        // direct edge is heavier than the detour
        let g = build(
            &["A", "B", "C"],
            &[("A", "C", 10.0), ("A", "B", 1.0), ("B", "C", 1.0)],
        );
        let path = shortest_path(&g, "A", "C").unwrap();
        assert_eq!(path, vec!["A", "B", "C"]);
    }

    #[test]
    fn returned_path_is_a_valid_walk() {
        let g = build(
            &["A", "B", "C", "D", "E"],
            &[
                ("A", "B", 2.0),
                ("B", "C", 2.0),
                ("A", "D", 1.0),
                ("D", "E", 1.0),
                ("E", "C", 1.0),
            ],
        );
        let path = shortest_path(&g, "A", "C").unwrap();
        assert_eq!(path.first().map(String::as_str), Some("A"));
        assert_eq!(path.last().map(String::as_str), Some("C"));
        for pair in path.windows(2) {
            let u = g.node_index(&pair[0]).unwrap();
            let v = g.node_index(&pair[1]).unwrap();
            assert!(g.edge_exists(u, v));
        }
    }

    #[test]
    fn unknown_endpoint_is_an_error() {
        let g = build(&["A", "B"], &[("A", "B", 1.0)]);
        assert!(matches!(
            shortest_path(&g, "A", "zz"),
            Err(GraphError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn disconnected_endpoints_are_an_error() {
        let g = build(&["A", "B", "C"], &[("A", "B", 1.0)]);
        assert!(matches!(
            shortest_path(&g, "A", "C"),
            Err(GraphError::NoPathFound { .. })
        ));
    }
}
