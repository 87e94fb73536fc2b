//! Newman-Girvan divisive partitioning via edge betweenness

use std::collections::HashMap;

use itertools::Itertools;
use rayon::prelude::*;

use crate::error::GraphError;
use crate::graph::{Edge, Graph};
use crate::path;

/// Outcome of one divisive step
#[derive(Debug)]
pub struct BetweennessStep {
    /// Stable id of the edge that was removed
    pub removed_edge_id: usize,

    /// The removed edge itself
    pub removed_edge: Edge,

    /// Shortest paths that ran through the removed edge
    pub removed_score: u64,

    /// Accumulated shortest-path count per surviving edge id
    pub betweenness: HashMap<usize, u64>,

    /// Node pairs with no connecting path, skipped rather than fatal
    pub skipped_pairs: usize,
}

/// One Newman-Girvan iteration: count, over every unordered node pair,
/// the edges on the weighted shortest path between them (first-found
/// path only, no equal-path splitting), then remove the edge with the
/// highest accumulated count.
///
/// Ties go to the lowest edge id. Disconnected pairs are skipped and
/// tallied in the outcome. The pair loop runs on the rayon pool with a
/// per-worker accumulator merged by sum.
pub fn step(graph: &mut Graph) -> Result<BetweennessStep, GraphError> {
    if graph.edge_count() == 0 {
        return Err(GraphError::EdgelessGraph);
    }

    let n = graph.node_count() as u32;
    let pairs: Vec<(u32, u32)> = (0..n).tuple_combinations().collect();
    log::debug!("Accumulating edge betweenness over {} node pairs", pairs.len());

    let shared: &Graph = graph;
    let (betweenness, skipped_pairs) = pairs
        .par_iter()
        .fold(
            || (HashMap::<usize, u64>::new(), 0usize),
            |(mut counts, mut skipped), &(start, end)| {
                match path::astar(shared, start, end, |_| 0.0) {
                    Some(found) => {
                        for edge_id in found.edges {
                            *counts.entry(edge_id).or_insert(0) += 1;
                        }
                    }
                    None => skipped += 1,
                }
                (counts, skipped)
            },
        )
        .reduce(
            || (HashMap::new(), 0),
            |(mut left, skipped_left), (right, skipped_right)| {
                for (edge_id, count) in right {
                    *left.entry(edge_id).or_insert(0) += count;
                }
                (left, skipped_left + skipped_right)
            },
        );

    if skipped_pairs > 0 {
        log::debug!("Skipped {} disconnected node pairs", skipped_pairs);
    }

    // highest count wins; equal counts fall to the lowest edge id
    let (&removed_edge_id, &removed_score) = betweenness
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .ok_or(GraphError::EdgelessGraph)?;

    let removed_edge = graph
        .remove_edge(removed_edge_id)
        .ok_or(GraphError::EdgelessGraph)?;

    log::info!(
        "Removed edge {} ({} - {}) carrying {} shortest paths",
        removed_edge_id,
        graph.node(removed_edge.source).id,
        graph.node(removed_edge.target).id,
        removed_score
    );

    Ok(BetweennessStep {
        removed_edge_id,
        removed_edge,
        removed_score,
        betweenness,
        skipped_pairs,
    })
}
