//! JSON graph document loading

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::error::GraphError;
use crate::graph::{Graph, Node};

/// An edge weight as it arrives in the document: already numeric, or a
/// string still to be parsed
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WeightValue {
    Number(f64),
    Text(String),
}

impl WeightValue {
    fn normalize(&self) -> Result<f64, GraphError> {
        match self {
            WeightValue::Number(n) if n.is_finite() => Ok(*n),
            WeightValue::Number(n) => Err(GraphError::InvalidWeight {
                value: n.to_string(),
            }),
            WeightValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite())
                .ok_or_else(|| GraphError::InvalidWeight { value: s.clone() }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: String,

    #[serde(default)]
    label: Option<String>,

    /// Everything else (sex, representative image, layout hints)
    /// passes through untouched
    #[serde(flatten)]
    attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    source: String,
    target: String,
    weight: WeightValue,

    #[serde(default)]
    label: Option<String>,
}

/// The parsed input document: ordered node and edge sequences
#[derive(Debug, Deserialize)]
pub struct GraphDocument {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    /// Materialize the document into a graph store.
    ///
    /// Weight normalization and endpoint validation happen here; any
    /// failure is fatal to the whole load.
    pub fn into_graph(self) -> Result<Graph, GraphError> {
        let mut graph = Graph::new();

        for record in self.nodes {
            let label = record.label.unwrap_or_else(|| record.id.clone());
            graph.add_node(Node {
                id: record.id,
                label,
                attributes: record.attributes,
            });
        }

        for record in self.edges {
            let weight = record.weight.normalize()?;
            graph.add_edge(&record.source, &record.target, weight, record.label)?;
        }

        Ok(graph)
    }
}

/// Load a graph document from a JSON file
pub fn load_graph(path: &str) -> Result<Graph> {
    if !Path::new(path).exists() {
        return Err(anyhow::anyhow!("File not found: {}", path));
    }

    log::info!("Reading graph document: {}", path);
    let text = fs::read_to_string(path)?;
    let document: GraphDocument =
        serde_json::from_str(&text).context("malformed graph document")?;

    log::info!(
        "Document holds {} nodes and {} edges",
        document.nodes.len(),
        document.edges.len()
    );

    let graph = document.into_graph()?;
    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}
