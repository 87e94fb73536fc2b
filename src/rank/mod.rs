//! HITS-style hub/authority ranking

use serde::Serialize;

use crate::graph::Graph;

/// Hub and authority scores for one node
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HubAuthority {
    pub hub: f64,
    pub authority: f64,
}

/// Which score `top_k` orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Authority,
    Hub,
}

fn normalize(scores: &mut [f64]) {
    let norm = scores.iter().map(|s| s * s).sum::<f64>().sqrt();
    if norm > 0.0 {
        for s in scores.iter_mut() {
            *s /= norm;
        }
    }
}

/// HITS fixed-point iteration over the undirected graph.
///
/// Scores start at 1.0; each pass recomputes authorities from hub
/// scores over the neighborhood, then hubs from the new authorities,
/// L2-normalizing after each sweep. Iteration stops once the authority
/// vector moves less than `epsilon` or after `max_iterations` passes,
/// so non-convergent inputs cannot spin forever.
pub fn hits(graph: &Graph, epsilon: f64, max_iterations: usize) -> Vec<HubAuthority> {
    let n = graph.node_count();
    let mut hub = vec![1.0_f64; n];
    let mut authority = vec![1.0_f64; n];

    for iteration in 0..max_iterations {
        let previous = authority.clone();

        for i in 0..n {
            authority[i] = graph
                .neighbors(i as u32)
                .map(|(j, _)| hub[j as usize])
                .sum();
        }
        normalize(&mut authority);

        for i in 0..n {
            hub[i] = graph
                .neighbors(i as u32)
                .map(|(j, _)| authority[j as usize])
                .sum();
        }
        normalize(&mut hub);

        let delta: f64 = authority
            .iter()
            .zip(&previous)
            .map(|(a, p)| (a - p).abs())
            .sum();
        if delta < epsilon {
            log::debug!("HITS converged after {} iterations", iteration + 1);
            break;
        }
    }

    hub.into_iter()
        .zip(authority)
        .map(|(hub, authority)| HubAuthority { hub, authority })
        .collect()
}

/// Top `k` node indices by the chosen score, highest first.
///
/// Ties are broken by ascending node string id so the selection is
/// reproducible.
pub fn top_k(graph: &Graph, scores: &[HubAuthority], k: usize, by: RankBy) -> Vec<u32> {
    let score = |idx: u32| -> f64 {
        let s = scores[idx as usize];
        match by {
            RankBy::Authority => s.authority,
            RankBy::Hub => s.hub,
        }
    };

    let mut order: Vec<u32> = (0..scores.len() as u32).collect();
    order.sort_by(|&a, &b| {
        score(b)
            .total_cmp(&score(a))
            .then_with(|| graph.node(a).id.cmp(&graph.node(b).id))
    });
    order.truncate(k);
    order
}

/// Top `k` node indices by degree, highest first, same tie-break as `top_k`
pub fn top_degree(graph: &Graph, k: usize) -> Vec<u32> {
    let mut order: Vec<u32> = (0..graph.node_count() as u32).collect();
    order.sort_by(|&a, &b| {
        graph
            .degree(b)
            .cmp(&graph.degree(a))
            .then_with(|| graph.node(a).id.cmp(&graph.node(b).id))
    });
    order.truncate(k);
    order
}
