//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty, Value};

use crate::cluster::betweenness::BetweennessStep;
use crate::cluster::louvain::Dendrogram;
use crate::cluster::{community_map, count_partitions, DensityReport, Partition};
use crate::graph::pruning::WeightSummary;
use crate::graph::Graph;
use crate::rank::HubAuthority;

/// Node and edge counts of the graph the analysis passes actually ran
/// on, captured before the divisive steps start thinning the edge set
#[derive(Debug, Clone, Copy)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}

impl GraphStats {
    pub fn capture(graph: &Graph) -> Self {
        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        }
    }
}

/// Save analysis results to the specified directory
#[allow(clippy::too_many_arguments)]
pub fn save_results(
    graph: &Graph,
    stats: GraphStats,
    scores: &[HubAuthority],
    top_authorities: &[u32],
    dendrogram: &Dendrogram,
    partition: &Partition,
    density: Option<&DensityReport>,
    weights: Option<&WeightSummary>,
    steps: &[BetweennessStep],
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving analysis results to {}", output_dir);

    fs::create_dir_all(output_dir)?;

    save_summary(
        graph,
        stats,
        top_authorities,
        dendrogram,
        partition,
        density,
        weights,
        output_dir,
    )?;
    save_nodes(graph, scores, partition, output_dir)?;
    save_communities(graph, partition, output_dir)?;
    save_betweenness(graph, steps, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}

/// Save summary information
fn save_summary(
    graph: &Graph,
    stats: GraphStats,
    top_authorities: &[u32],
    dendrogram: &Dendrogram,
    partition: &Partition,
    density: Option<&DensityReport>,
    weights: Option<&WeightSummary>,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving summary information");

    let summary = json!({
        "graph_stats": {
            "node_count": stats.node_count,
            "edge_count": stats.edge_count,
            "avg_degree": if stats.node_count == 0 { 0.0 } else {
                2.0 * stats.edge_count as f64 / stats.node_count as f64
            },
            "edges_after_removal": graph.edge_count(),
            "weight_summary": weights,
        },
        "community_stats": {
            "level_count": dendrogram.level_count(),
            "community_count": count_partitions(partition),
            "density": density,
        },
        "top_authorities": top_authorities.iter()
            .map(|&idx| graph.node(idx).id.clone())
            .collect::<Vec<_>>(),
    });

    write_json(&Path::new(output_dir).join("summary.json"), &summary)
}

/// Save the per-node join the UI colors by: community id plus
/// hub/authority scores, keyed by the original string ids
fn save_nodes(
    graph: &Graph,
    scores: &[HubAuthority],
    partition: &Partition,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving per-node results");

    let nodes = json!({
        "nodes": graph.nodes().iter().enumerate().map(|(idx, node)| {
            json!({
                "id": node.id,
                "label": node.label,
                "community": partition[idx],
                "hub": scores[idx].hub,
                "authority": scores[idx].authority,
            })
        }).collect::<Vec<_>>()
    });

    write_json(&Path::new(output_dir).join("nodes.json"), &nodes)
}

/// Save community membership resolved to string ids
fn save_communities(graph: &Graph, partition: &Partition, output_dir: &str) -> Result<()> {
    log::info!("Saving community membership");

    let map = community_map(partition);
    let communities = json!({
        "community_count": map.len(),
        "communities": map.iter().map(|(community, members)| {
            json!({
                "id": community,
                "size": members.len(),
                "members": members.iter()
                    .map(|&idx| graph.node(idx).id.clone())
                    .collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>()
    });

    write_json(&Path::new(output_dir).join("communities.json"), &communities)
}

/// Save the removed-edge trail from the divisive passes
fn save_betweenness(graph: &Graph, steps: &[BetweennessStep], output_dir: &str) -> Result<()> {
    log::info!("Saving edge betweenness results for {} steps", steps.len());

    let trail = json!({
        "steps": steps.iter().map(|step| {
            json!({
                "removed_edge": {
                    "id": step.removed_edge_id,
                    "source": graph.node(step.removed_edge.source).id,
                    "target": graph.node(step.removed_edge.target).id,
                    "weight": step.removed_edge.weight,
                },
                "shortest_paths": step.removed_score,
                "skipped_pairs": step.skipped_pairs,
                "betweenness": step.betweenness.iter()
                    .map(|(edge_id, count)| (edge_id.to_string(), *count))
                    .collect::<std::collections::BTreeMap<String, u64>>(),
            })
        }).collect::<Vec<_>>()
    });

    write_json(&Path::new(output_dir).join("betweenness.json"), &trail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::louvain;
    use crate::graph::Node;
    use crate::rank;
    use std::collections::BTreeMap;

    #[test]
    fn summary_reports_the_analyzed_edge_count() {
        let mut g = Graph::new();
        for id in ["a", "b", "c"] {
            g.add_node(Node {
                id: id.to_string(),
                label: id.to_string(),
                attributes: BTreeMap::new(),
            });
        }
        g.add_edge("a", "b", 1.0, None).unwrap();
        g.add_edge("b", "c", 1.0, None).unwrap();

        let scores = rank::hits(&g, 1e-8, 100);
        let dendrogram = louvain::detect(&g);
        let partition = dendrogram.final_partition().clone();

        // stats captured before an edge gets removed
        let stats = GraphStats::capture(&g);
        g.remove_edge(0).unwrap();

        let dir = std::env::temp_dir().join("gca_summary_edge_count");
        save_results(
            &g,
            stats,
            &scores,
            &[],
            &dendrogram,
            &partition,
            None,
            None,
            &[],
            dir.to_str().unwrap(),
        )
        .unwrap();

        let text = fs::read_to_string(dir.join("summary.json")).unwrap();
        let summary: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(summary["graph_stats"]["edge_count"], 2);
        assert_eq!(summary["graph_stats"]["edges_after_removal"], 1);
        fs::remove_dir_all(&dir).ok();
    }
}
