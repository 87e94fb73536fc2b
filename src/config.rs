//! Configuration for the analysis pipeline

use crate::graph::pruning::PrunePolicy;

/// Tunable parameters for one analysis run
pub struct AnalysisConfig {
    /// How the pruning threshold is derived from the weight distribution
    pub prune_policy: PrunePolicy,

    /// Convergence threshold for the HITS authority vector
    pub hits_epsilon: f64,

    /// Hard cap on HITS passes, for non-convergent inputs
    pub hits_max_iterations: usize,

    /// How many top-authority nodes to report
    pub top_k: usize,

    /// How many divisive betweenness steps to run
    pub betweenness_steps: usize,

    /// Dendrogram level to report; `None` means the coarsest
    pub partition_level: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            prune_policy: PrunePolicy::default(),
            hits_epsilon: 1e-8,
            hits_max_iterations: 100,
            top_k: 5,
            betweenness_steps: 1,
            partition_level: None,
        }
    }
}
