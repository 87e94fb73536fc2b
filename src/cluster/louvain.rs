//! Greedy modularity-optimization community detection

use std::collections::BTreeMap;

use crate::cluster::{count_partitions, Partition};
use crate::graph::Graph;

/// Partitions recorded at each aggregation level.
///
/// Level 0 is the finest partition; higher levels are coarser. At least
/// one level is always present, even when no node ever moved (every
/// node then sits in its own community).
#[derive(Debug, Clone)]
pub struct Dendrogram {
    levels: Vec<Partition>,
}

impl Dendrogram {
    /// Partition at `level`, capped at the coarsest level recorded
    pub fn partition(&self, level: usize) -> &Partition {
        let capped = level.min(self.levels.len() - 1);
        &self.levels[capped]
    }

    /// Coarsest partition
    pub fn final_partition(&self) -> &Partition {
        &self.levels[self.levels.len() - 1]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Working graph for one aggregation level. Each undirected edge is
/// stored in both adjacency lists; intra-community weight collapses
/// into `self_loops` when levels aggregate.
struct LevelGraph {
    adjacency: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
    total_weight: f64,
}

impl LevelGraph {
    fn from_graph(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut adjacency = vec![Vec::new(); n];
        let mut self_loops = vec![0.0; n];
        let mut total_weight = 0.0;

        for (_, edge) in graph.edges() {
            total_weight += edge.weight;
            if edge.source == edge.target {
                self_loops[edge.source as usize] += edge.weight;
            } else {
                adjacency[edge.source as usize].push((edge.target as usize, edge.weight));
                adjacency[edge.target as usize].push((edge.source as usize, edge.weight));
            }
        }
        for list in &mut adjacency {
            list.sort_by_key(|&(neighbor, _)| neighbor);
        }

        Self {
            adjacency,
            self_loops,
            total_weight,
        }
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Weighted degree: incident edge weight, self-loops counted twice
    fn degrees(&self) -> Vec<f64> {
        (0..self.node_count())
            .map(|node| {
                let incident: f64 = self.adjacency[node].iter().map(|&(_, w)| w).sum();
                incident + 2.0 * self.self_loops[node]
            })
            .collect()
    }
}

/// One local-move pass: every node, in ascending index order, is moved
/// into the neighboring community with the largest strictly positive
/// modularity gain, repeated until a full sweep moves nothing.
///
/// Returns the dense local partition and whether any node moved.
fn one_level(graph: &LevelGraph) -> (Vec<usize>, bool) {
    let n = graph.node_count();
    let mut community: Vec<usize> = (0..n).collect();

    let two_m = 2.0 * graph.total_weight;
    if two_m == 0.0 {
        return (community, false);
    }

    let degree = graph.degrees();
    let mut sum_tot = degree.clone();
    let mut improved = false;

    loop {
        let mut moved = false;

        for node in 0..n {
            let current = community[node];
            sum_tot[current] -= degree[node];

            // weight from this node into each neighboring community;
            // BTreeMap fixes the candidate order, so ties resolve the
            // same way on every run
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for &(neighbor, weight) in &graph.adjacency[node] {
                if neighbor != node {
                    *links.entry(community[neighbor]).or_insert(0.0) += weight;
                }
            }

            let mut best = current;
            let mut best_gain = links.get(&current).copied().unwrap_or(0.0)
                - sum_tot[current] * degree[node] / two_m;

            for (&candidate, &weight_in) in &links {
                if candidate == current {
                    continue;
                }
                let gain = weight_in - sum_tot[candidate] * degree[node] / two_m;
                if gain > best_gain {
                    best_gain = gain;
                    best = candidate;
                }
            }

            sum_tot[best] += degree[node];
            if best != current {
                community[node] = best;
                moved = true;
                improved = true;
            }
        }

        if !moved {
            break;
        }
    }

    (renumber(community), improved)
}

/// Renumber community labels densely, by first appearance in node order
fn renumber(community: Vec<usize>) -> Vec<usize> {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0;
    community
        .into_iter()
        .map(|c| {
            *mapping.entry(c).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect()
}

/// Collapse each community into a meta-node: inter-community weights
/// are summed, intra-community weight is kept as a self-loop
fn aggregate(graph: &LevelGraph, partition: &[usize], communities: usize) -> LevelGraph {
    let mut merged: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); communities];
    let mut self_loops = vec![0.0; communities];

    for node in 0..graph.node_count() {
        let cu = partition[node];
        self_loops[cu] += graph.self_loops[node];
        for &(neighbor, weight) in &graph.adjacency[node] {
            let cv = partition[neighbor];
            if cu == cv {
                // each undirected edge shows up twice in the adjacency
                self_loops[cu] += weight / 2.0;
            } else {
                *merged[cu].entry(cv).or_insert(0.0) += weight;
            }
        }
    }

    let adjacency: Vec<Vec<(usize, f64)>> = merged
        .into_iter()
        .map(|links| links.into_iter().collect())
        .collect();

    LevelGraph {
        adjacency,
        self_loops,
        total_weight: graph.total_weight,
    }
}

/// Multi-level greedy modularity optimization.
///
/// Runs local moves on the graph, aggregates the resulting communities
/// into a weighted meta-graph, and repeats until a pass no longer
/// coarsens the partition. Every recorded level maps the original
/// nodes, level 0 being the finest.
pub fn detect(graph: &Graph) -> Dendrogram {
    let mut level_graph = LevelGraph::from_graph(graph);
    let mut assignment: Vec<usize> = (0..graph.node_count()).collect();
    let mut levels: Vec<Partition> = Vec::new();

    loop {
        let (local, moved) = one_level(&level_graph);
        let communities = local.iter().copied().max().map_or(0, |c| c + 1);

        for slot in assignment.iter_mut() {
            *slot = local[*slot];
        }

        if levels.is_empty() || moved {
            levels.push(assignment.iter().map(|&c| c as u32).collect());
        }

        if !moved || communities == level_graph.node_count() {
            break;
        }
        level_graph = aggregate(&level_graph, &local, communities);
    }

    let final_partition = &levels[levels.len() - 1];
    log::info!(
        "Community detection: {} levels, {} communities at the coarsest",
        levels.len(),
        count_partitions(final_partition)
    );

    Dendrogram { levels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::community_map;
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
    fn every_node_gets_exactly_one_community() {
        let g = build(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0)],
        );
        let dendrogram = detect(&g);
        let partition = dendrogram.final_partition();
        assert_eq!(partition.len(), g.node_count());
        assert!(count_partitions(partition) >= 1);
    }

    #[test]
    fn unit_chain_splits_into_two_pairs() {
        // deterministic outcome for the 4-node chain: {A,B} and {C,D}
        let g = build(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0)],
        );
        let dendrogram = detect(&g);
        let partition = dendrogram.final_partition();
        assert_eq!(count_partitions(partition), 2);
        assert_eq!(partition[0], partition[1]);
        assert_eq!(partition[2], partition[3]);
        assert_ne!(partition[0], partition[2]);
    }

    #[test]
    fn disjoint_triangles_become_two_communities() {
        let g = build(
            &["A", "B", "C", "D", "E", "F"],
            &[
                ("A", "B", 1.0),
                ("B", "C", 1.0),
                ("C", "A", 1.0),
                ("D", "E", 1.0),
                ("E", "F", 1.0),
                ("F", "D", 1.0),
            ],
        );
        let dendrogram = detect(&g);
        let partition = dendrogram.final_partition();
        assert_eq!(count_partitions(partition), 2);

        let map = community_map(partition);
        let mut groups: Vec<Vec<u32>> = map.into_values().collect();
        groups.sort();
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn edgeless_graph_keeps_singletons() {
        let g = build(&["A", "B", "C"], &[]);
        let dendrogram = detect(&g);
        let partition = dendrogram.final_partition();
        assert_eq!(count_partitions(partition), 3);
        assert_eq!(dendrogram.level_count(), 1);
    }

    #[test]
    fn level_requests_are_capped_at_the_coarsest() {
        let g = build(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0)],
        );
        let dendrogram = detect(&g);
        let last = dendrogram.level_count() - 1;
        assert_eq!(dendrogram.partition(usize::MAX), dendrogram.partition(last));
    }
}
