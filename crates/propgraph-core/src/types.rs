//! Graph entity types.
//!
//! Nodes and edges carry a label and an open-ended string-to-string
//! property map. Property values are untyped: numeric comparisons are
//! byte comparisons, and callers normalize before ingest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property map attached to a node or edge.
///
/// `BTreeMap` keeps iteration in key order, which makes the stored value
/// encoding deterministic across runs.
pub type PropertyMap = BTreeMap<String, String>;

/// A labeled node.
///
/// # Fields
/// - `id`: non-empty identifier, globally unique across nodes
/// - `label`: node label; may be empty
/// - `props`: string-valued properties, keys unique per node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: String,

    /// Node label. May be empty.
    pub label: String,

    /// String-valued properties.
    pub props: PropertyMap,
}

impl Node {
    /// Create a node with no properties.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            props: PropertyMap::new(),
        }
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// A labeled edge between two node ids.
///
/// Endpoints are not required to reference existing nodes; the engine
/// enforces no referential integrity. When `directed` is false the edge
/// participates in adjacency from both endpoints equivalently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge identifier.
    pub id: String,

    /// Edge label.
    pub label: String,

    /// Source node id.
    pub src: String,

    /// Target node id.
    pub dst: String,

    /// True for a directed edge, false for undirected.
    pub directed: bool,

    /// String-valued properties.
    pub props: PropertyMap,
}

impl Edge {
    /// Create an edge with no properties.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        src: impl Into<String>,
        dst: impl Into<String>,
        directed: bool,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            src: src.into(),
            dst: dst.into(),
            directed,
            props: PropertyMap::new(),
        }
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// A node paired with its id, as yielded by node cursors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Node id (same as `node.id`; kept explicit for index-scan results).
    pub id: String,
    /// Decoded node payload.
    pub node: Node,
}

/// An edge paired with its id, as yielded by edge cursors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEntry {
    /// Edge id (same as `edge.id`).
    pub id: String,
    /// Decoded edge payload.
    pub edge: Edge,
}
