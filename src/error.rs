//! Error types for graph construction and analysis

use thiserror::Error;

/// Errors raised by the graph store and the analysis passes
#[derive(Debug, Error)]
pub enum GraphError {
    /// An edge references a node id that was never added to the graph
    #[error("edge references unknown node '{node}'")]
    InvalidEdge { node: String },

    /// An edge weight could not be coerced to a finite number
    #[error("invalid edge weight '{value}'")]
    InvalidWeight { value: String },

    /// A path query named a node that is not in the graph
    #[error("node '{id}' not found in graph")]
    NodeNotFound { id: String },

    /// No path exists between the two requested nodes
    #[error("no path between '{start}' and '{end}'")]
    NoPathFound { start: String, end: String },

    /// A density denominator came out zero
    #[error("degenerate density: {reason}")]
    DegenerateDensity { reason: String },

    /// A betweenness step was asked for on a graph with no edges left
    #[error("graph has no edges left to remove")]
    EdgelessGraph,
}
