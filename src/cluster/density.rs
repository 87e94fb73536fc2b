//! Internal and external density of a graph partition

use crate::cluster::{CommunityMap, DensityReport};
use crate::error::GraphError;
use crate::graph::Graph;

/// Evaluate intra- and inter-community edge density.
///
/// Pairs are unordered and self-pairs are excluded, so a community of
/// `n` members has `n(n-1)/2` potential internal edges. Communities
/// with fewer than 2 members carry no pairs and are left out of the
/// internal mean; if no community qualifies, or no inter-community
/// pair exists, the computation is degenerate and fails instead of
/// producing NaN.
pub fn densities(graph: &Graph, communities: &CommunityMap) -> Result<DensityReport, GraphError> {
    let mut internal_sum = 0.0;
    let mut qualifying = 0usize;
    let mut internal_edges = 0usize;
    let mut internal_pairs = 0usize;

    for members in communities.values() {
        let n = members.len();

        let mut intra = 0usize;
        for (i, &u) in members.iter().enumerate() {
            for &v in &members[i + 1..] {
                if graph.edge_exists(u, v) {
                    intra += 1;
                }
            }
        }
        internal_edges += intra;

        if n >= 2 {
            let possible = n * (n - 1) / 2;
            internal_sum += intra as f64 / possible as f64;
            internal_pairs += possible;
            qualifying += 1;
        }
    }

    if qualifying == 0 {
        return Err(GraphError::DegenerateDensity {
            reason: "no community has at least 2 members".to_string(),
        });
    }

    let node_count = graph.node_count();
    let total_pairs = node_count * (node_count - 1) / 2;
    let inter_pairs = total_pairs - internal_pairs;
    if inter_pairs == 0 {
        return Err(GraphError::DegenerateDensity {
            reason: "no inter-community pair exists".to_string(),
        });
    }

    let external_density = (graph.edge_count() - internal_edges) as f64 / inter_pairs as f64;

    Ok(DensityReport {
        internal_density: internal_sum / qualifying as f64,
        external_density,
        internal_edge_count: internal_edges,
    })
}
