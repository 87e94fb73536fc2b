//! Core library functions for the graph community analyzer

pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod path;
pub mod rank;
pub mod storage;

pub use anyhow::{anyhow, Result};
pub use error::GraphError;
