//! Read path: point lookups and cursor constructors.
//!
//! Multi-result queries return lazy cursors; nothing is materialized
//! up front. Range results come back in the byte-lexicographic order
//! of the underlying column family, and callers must not read any
//! semantic ordering into that.

use propgraph_core::validation::is_clean;
use propgraph_core::{Edge, Node};

use crate::codec;
use crate::cursor::{EdgeCursor, EdgeJoinCursor, NodeCursor, NodeJoinCursor};
use crate::error::{StoreError, StoreResult};

use super::GraphStore;

fn ensure_clean(what: &'static str, s: &str) -> StoreResult<()> {
    if is_clean(s) {
        Ok(())
    } else {
        Err(StoreError::UsageError(format!(
            "{what} contains the reserved NUL byte"
        )))
    }
}

impl GraphStore {
    /// Look up a node by id. `Ok(None)` when absent.
    pub fn get_node(&self, id: &str) -> StoreResult<Option<Node>> {
        ensure_clean("node id", id)?;
        match self.node_payload(id)? {
            Some(bytes) => Ok(Some(codec::decode_node(id, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Look up an edge by id. `Ok(None)` when absent.
    pub fn get_edge(&self, id: &str) -> StoreResult<Option<Edge>> {
        ensure_clean("edge id", id)?;
        match self.edge_payload(id)? {
            Some(bytes) => Ok(Some(codec::decode_edge(id, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Cursor over every node.
    pub fn iter_all_nodes(&self) -> StoreResult<NodeCursor<'_>> {
        NodeCursor::all(self)
    }

    /// Cursor over every edge.
    pub fn iter_all_edges(&self) -> StoreResult<EdgeCursor<'_>> {
        EdgeCursor::all(self)
    }

    /// Cursor over all edges with the given label, ordered by edge id.
    pub fn iter_edges_by_label(&self, label: &str) -> StoreResult<EdgeJoinCursor<'_>> {
        ensure_clean("label", label)?;
        EdgeJoinCursor::over_labels(self, codec::label_index_prefix(label))
    }

    /// Cursor over the edges incident to a node, one yield per
    /// adjacency row.
    ///
    /// Directed edges are indexed under their source only, so this
    /// returns outgoing directed edges plus undirected edges from
    /// either endpoint. An undirected self-loop has two adjacency rows
    /// and is yielded twice.
    pub fn iter_neighbours(&self, node_id: &str) -> StoreResult<EdgeJoinCursor<'_>> {
        ensure_clean("node id", node_id)?;
        EdgeJoinCursor::over_adjacency(self, codec::adjacency_prefix(node_id))
    }

    /// Cursor over nodes whose property `key` equals `value` exactly
    /// (byte equality).
    pub fn iter_nodes_by_property(
        &self,
        key: &str,
        value: &str,
    ) -> StoreResult<NodeJoinCursor<'_>> {
        ensure_clean("property key", key)?;
        ensure_clean("property value", value)?;
        NodeJoinCursor::over_props(self, codec::prop_index_prefix(key, value))
    }

    /// Cursor over edges whose property `key` equals `value` exactly.
    pub fn iter_edges_by_property(
        &self,
        key: &str,
        value: &str,
    ) -> StoreResult<EdgeJoinCursor<'_>> {
        ensure_clean("property key", key)?;
        ensure_clean("property value", value)?;
        EdgeJoinCursor::over_props(self, codec::prop_index_prefix(key, value))
    }
}
