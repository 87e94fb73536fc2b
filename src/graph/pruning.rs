//! Weight-threshold edge pruning

use serde::Serialize;
use statrs::statistics::{Data, Max, Min, OrderStatistics};

use crate::error::GraphError;
use crate::graph::Graph;

/// How the pruning threshold is derived from the edge-weight distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrunePolicy {
    /// Use the given weight as the threshold directly
    Fixed(f64),

    /// Use the p-th percentile of the weight distribution (0-100)
    Percentile(f64),

    /// Use the first quartile of the weight distribution
    LowerQuartile,

    /// Use the median of the weight distribution
    Median,
}

impl Default for PrunePolicy {
    fn default() -> Self {
        PrunePolicy::LowerQuartile
    }
}

/// Result of a pruning pass
#[derive(Debug)]
pub struct PruneOutcome {
    /// The reduced graph: same nodes, edges at or above the threshold
    pub graph: Graph,

    /// The threshold the policy resolved to
    pub threshold: f64,

    pub node_count: usize,
    pub edges_before: usize,
    pub edges_after: usize,
}

/// Five-number summary of the live edge-weight distribution
#[derive(Debug, Clone, Serialize)]
pub struct WeightSummary {
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
}

/// Summarize the edge weights, or `None` for an edgeless graph
pub fn weight_summary(graph: &Graph) -> Option<WeightSummary> {
    let weights = graph.edge_weights();
    if weights.is_empty() {
        return None;
    }

    let mut data = Data::new(weights);
    Some(WeightSummary {
        min: data.min(),
        lower_quartile: data.lower_quartile(),
        median: data.median(),
        upper_quartile: data.upper_quartile(),
        max: data.max(),
    })
}

fn resolve_threshold(graph: &Graph, policy: &PrunePolicy) -> f64 {
    match *policy {
        PrunePolicy::Fixed(value) => value,
        _ if graph.edge_count() == 0 => 0.0,
        PrunePolicy::Percentile(p) => {
            let mut data = Data::new(graph.edge_weights());
            data.quantile(p / 100.0)
        }
        PrunePolicy::LowerQuartile => {
            let mut data = Data::new(graph.edge_weights());
            data.lower_quartile()
        }
        PrunePolicy::Median => {
            let mut data = Data::new(graph.edge_weights());
            data.median()
        }
    }
}

/// Drop every edge whose weight is strictly below the policy's threshold.
///
/// Nodes are never removed; the returned graph is rebuilt so its
/// adjacency index reflects the reduced edge set.
pub fn prune(graph: &Graph, policy: &PrunePolicy) -> Result<PruneOutcome, GraphError> {
    let threshold = resolve_threshold(graph, policy);
    let edges_before = graph.edge_count();

    log::info!(
        "Pruning graph: {} nodes, {} edges, threshold {:.4}",
        graph.node_count(),
        edges_before,
        threshold
    );

    let mut pruned = Graph::new();
    for node in graph.nodes() {
        pruned.add_node(node.clone());
    }

    for (_, edge) in graph.edges() {
        if edge.weight < threshold {
            continue;
        }
        pruned.add_edge(
            &graph.node(edge.source).id,
            &graph.node(edge.target).id,
            edge.weight,
            edge.label.clone(),
        )?;
    }

    let edges_after = pruned.edge_count();
    log::info!(
        "Pruned graph: {} nodes, {} edges ({} removed)",
        pruned.node_count(),
        edges_after,
        edges_before - edges_after
    );

    Ok(PruneOutcome {
        graph: pruned,
        threshold,
        node_count: graph.node_count(),
        edges_before,
        edges_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::store::Node;
    use std::collections::BTreeMap;

    fn weighted_chain(weights: &[f64]) -> Graph {
        let mut g = Graph::new();
        for i in 0..=weights.len() {
            g.add_node(Node {
                id: format!("n{i}"),
                label: format!("n{i}"),
                attributes: BTreeMap::new(),
            });
        }
        for (i, &w) in weights.iter().enumerate() {
            g.add_edge(&format!("n{i}"), &format!("n{}", i + 1), w, None)
                .unwrap();
        }
        g
    }

    #[test]
    fn fixed_threshold_drops_only_lighter_edges() {
        let g = weighted_chain(&[0.5, 1.0, 2.0, 3.0]);
        let outcome = prune(&g, &PrunePolicy::Fixed(1.0)).unwrap();
        assert_eq!(outcome.edges_before, 4);
        assert_eq!(outcome.edges_after, 3);
        assert_eq!(outcome.graph.node_count(), g.node_count());
        // the 0.5 edge between n0 and n1 is gone
        assert!(!outcome.graph.edge_exists(0, 1));
        assert!(outcome.graph.edge_exists(1, 2));
    }

    #[test]
    fn pruning_is_monotonic_and_keeps_nodes() {
        let g = weighted_chain(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        for policy in [
            PrunePolicy::LowerQuartile,
            PrunePolicy::Median,
            PrunePolicy::Percentile(90.0),
        ] {
            let outcome = prune(&g, &policy).unwrap();
            assert!(outcome.edges_after <= outcome.edges_before);
            assert_eq!(outcome.graph.node_count(), g.node_count());
        }
    }

    #[test]
    fn edgeless_graph_prunes_to_itself() {
        let g = weighted_chain(&[]);
        let outcome = prune(&g, &PrunePolicy::LowerQuartile).unwrap();
        assert_eq!(outcome.edges_after, 0);
        assert_eq!(outcome.graph.node_count(), 1);
    }

    #[test]
    fn weight_summary_orders_quartiles() {
        let g = weighted_chain(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let summary = weight_summary(&g).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert!(summary.lower_quartile <= summary.median);
        assert!(summary.median <= summary.upper_quartile);
        assert!(weight_summary(&weighted_chain(&[])).is_none());
    }
}
