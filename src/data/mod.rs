//! Input document handling

pub mod document;

pub use document::{load_graph, GraphDocument};
