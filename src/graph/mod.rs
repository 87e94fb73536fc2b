//! Graph representation and pruning module

pub mod pruning;
pub mod store;

pub use store::{Edge, Graph, Node};
