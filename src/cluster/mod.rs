//! Community analysis module

pub mod betweenness;
pub mod density;
pub mod louvain;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Community assignment per node index; community ids are dense `0..K`
pub type Partition = Vec<u32>;

/// Community id to ordered member node indices, derived from a partition
pub type CommunityMap = BTreeMap<u32, Vec<u32>>;

/// Group a partition into its community member lists
pub fn community_map(partition: &Partition) -> CommunityMap {
    let mut map = CommunityMap::new();
    for (node, &community) in partition.iter().enumerate() {
        map.entry(community).or_default().push(node as u32);
    }
    map
}

/// Number of distinct community ids in a partition
pub fn count_partitions(partition: &Partition) -> usize {
    partition.iter().collect::<BTreeSet<_>>().len()
}

/// Internal and external edge density of a partition
#[derive(Debug, Clone, Serialize)]
pub struct DensityReport {
    /// Mean intra-community density over communities with >= 2 members
    pub internal_density: f64,

    /// Realized inter-community edges over possible inter-community pairs
    pub external_density: f64,

    /// Total intra-community edges observed
    pub internal_edge_count: usize,
}
