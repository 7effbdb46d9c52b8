//! Core domain types for the propgraph property-graph engine.
//!
//! This crate defines the graph entities (nodes, edges, property maps)
//! shared by the storage engine and the CLI, plus the input validation
//! rules every entity must satisfy before it reaches storage.
//!
//! No I/O happens here; everything is plain data.

pub mod types;
pub mod validation;

pub use types::{Edge, EdgeEntry, Node, NodeEntry, PropertyMap};
pub use validation::ValidationError;
