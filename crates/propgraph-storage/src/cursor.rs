//! Lazy cursors over query results.
//!
//! A cursor wraps a RocksDB iterator and decodes one entry per advance.
//! Scan cursors ([`NodeCursor`], [`EdgeCursor`]) decode the primary
//! value directly; join cursors ([`NodeJoinCursor`], [`EdgeJoinCursor`])
//! walk a secondary index and fetch the primary row per element.
//!
//! Release is RAII: every cursor registers in the store's live-cursor
//! counter on creation and deregisters exactly once on `Drop`, on any
//! exit path. Cursors borrow the store, so a cursor cannot outlive it.
//! Iteration is a single forward pass; once drained a cursor stays
//! drained.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rocksdb::{DBIteratorWithThreadMode, Direction, IteratorMode, DB};

use propgraph_core::{EdgeEntry, NodeEntry};

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::store::GraphStore;

type RawIter<'a> = DBIteratorWithThreadMode<'a, DB>;

/// RAII registration in the store's live-cursor counter.
///
/// Dropping the guard decrements the counter exactly once.
struct CursorGuard {
    counter: Arc<AtomicUsize>,
}

impl CursorGuard {
    fn register(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

fn key_utf8<'k>(bytes: &'k [u8], what: &'static str) -> StoreResult<&'k str> {
    std::str::from_utf8(bytes)
        .map_err(|_| StoreError::Decode(format!("{what} key is not valid UTF-8")))
}

/// Cursor over every node, in id byte order.
pub struct NodeCursor<'a> {
    iter: RawIter<'a>,
    done: bool,
    _guard: CursorGuard,
}

impl<'a> NodeCursor<'a> {
    pub(crate) fn all(store: &'a GraphStore) -> StoreResult<Self> {
        let cf = store.cf_nodes()?;
        Ok(Self {
            iter: store.db.iterator_cf(cf, IteratorMode::Start),
            done: false,
            _guard: CursorGuard::register(store.open_cursors.clone()),
        })
    }
}

impl Iterator for NodeCursor<'_> {
    type Item = StoreResult<NodeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.iter.next() {
            None => {
                self.done = true;
                None
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            Some(Ok((key, value))) => Some(decode_node_entry(&key, &value)),
        }
    }
}

fn decode_node_entry(key: &[u8], value: &[u8]) -> StoreResult<NodeEntry> {
    let id = key_utf8(key, "node")?;
    let node = codec::decode_node(id, value)?;
    Ok(NodeEntry {
        id: id.to_string(),
        node,
    })
}

/// Cursor over every edge, in id byte order.
pub struct EdgeCursor<'a> {
    iter: RawIter<'a>,
    done: bool,
    _guard: CursorGuard,
}

impl<'a> EdgeCursor<'a> {
    pub(crate) fn all(store: &'a GraphStore) -> StoreResult<Self> {
        let cf = store.cf_edges()?;
        Ok(Self {
            iter: store.db.iterator_cf(cf, IteratorMode::Start),
            done: false,
            _guard: CursorGuard::register(store.open_cursors.clone()),
        })
    }
}

impl Iterator for EdgeCursor<'_> {
    type Item = StoreResult<EdgeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.iter.next() {
            None => {
                self.done = true;
                None
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            Some(Ok((key, value))) => Some(decode_edge_entry(&key, &value)),
        }
    }
}

fn decode_edge_entry(key: &[u8], value: &[u8]) -> StoreResult<EdgeEntry> {
    let id = key_utf8(key, "edge")?;
    let edge = codec::decode_edge(id, value)?;
    Ok(EdgeEntry {
        id: id.to_string(),
        edge,
    })
}

/// Cursor over a node index prefix, joining each hit against the
/// primary `nodes` family.
pub struct NodeJoinCursor<'a> {
    store: &'a GraphStore,
    iter: RawIter<'a>,
    prefix: Vec<u8>,
    index: &'static str,
    done: bool,
    _guard: CursorGuard,
}

impl<'a> NodeJoinCursor<'a> {
    pub(crate) fn over_props(store: &'a GraphStore, prefix: Vec<u8>) -> StoreResult<Self> {
        let cf = store.cf_node_props()?;
        let iter = store
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));
        Ok(Self {
            store,
            iter,
            prefix,
            index: "node_props",
            done: false,
            _guard: CursorGuard::register(store.open_cursors.clone()),
        })
    }

    fn join(&self, key: &[u8]) -> StoreResult<NodeEntry> {
        let id = key_utf8(&key[self.prefix.len()..], "node index")?;
        match self.store.node_payload(id)? {
            Some(bytes) => Ok(NodeEntry {
                id: id.to_string(),
                node: codec::decode_node(id, &bytes)?,
            }),
            None => Err(StoreError::IndexInconsistency {
                index: self.index,
                id: id.to_string(),
            }),
        }
    }
}

impl Iterator for NodeJoinCursor<'_> {
    type Item = StoreResult<NodeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.iter.next() {
            None => {
                self.done = true;
                None
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            Some(Ok((key, _value))) => {
                if !key.starts_with(&self.prefix) {
                    self.done = true;
                    return None;
                }
                Some(self.join(&key))
            }
        }
    }
}

/// Cursor over an edge index prefix (label, adjacency, or property),
/// joining each hit against the primary `edges` family.
pub struct EdgeJoinCursor<'a> {
    store: &'a GraphStore,
    iter: RawIter<'a>,
    prefix: Vec<u8>,
    /// Bytes after the edge id in each index key (adjacency keys end in
    /// a separator plus role byte; other indexes end at the id).
    suffix_trim: usize,
    index: &'static str,
    done: bool,
    _guard: CursorGuard,
}

impl<'a> EdgeJoinCursor<'a> {
    pub(crate) fn over_labels(store: &'a GraphStore, prefix: Vec<u8>) -> StoreResult<Self> {
        let cf = store.cf_edges_by_label()?;
        Self::new(store, cf, prefix, 0, "edges_by_label")
    }

    pub(crate) fn over_adjacency(store: &'a GraphStore, prefix: Vec<u8>) -> StoreResult<Self> {
        let cf = store.cf_adjacency()?;
        Self::new(store, cf, prefix, codec::ADJACENCY_SUFFIX_LEN, "adjacency")
    }

    pub(crate) fn over_props(store: &'a GraphStore, prefix: Vec<u8>) -> StoreResult<Self> {
        let cf = store.cf_edge_props()?;
        Self::new(store, cf, prefix, 0, "edge_props")
    }

    fn new(
        store: &'a GraphStore,
        cf: &rocksdb::ColumnFamily,
        prefix: Vec<u8>,
        suffix_trim: usize,
        index: &'static str,
    ) -> StoreResult<Self> {
        let iter = store
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));
        Ok(Self {
            store,
            iter,
            prefix,
            suffix_trim,
            index,
            done: false,
            _guard: CursorGuard::register(store.open_cursors.clone()),
        })
    }

    fn join(&self, key: &[u8]) -> StoreResult<EdgeEntry> {
        let id_end = key
            .len()
            .checked_sub(self.suffix_trim)
            .filter(|&end| end >= self.prefix.len())
            .ok_or_else(|| {
                StoreError::Decode(format!("malformed {} index key", self.index))
            })?;
        let id = key_utf8(&key[self.prefix.len()..id_end], "edge index")?;
        match self.store.edge_payload(id)? {
            Some(bytes) => Ok(EdgeEntry {
                id: id.to_string(),
                edge: codec::decode_edge(id, &bytes)?,
            }),
            None => Err(StoreError::IndexInconsistency {
                index: self.index,
                id: id.to_string(),
            }),
        }
    }
}

impl Iterator for EdgeJoinCursor<'_> {
    type Item = StoreResult<EdgeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.iter.next() {
            None => {
                self.done = true;
                None
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            Some(Ok((key, _value))) => {
                if !key.starts_with(&self.prefix) {
                    self.done = true;
                    return None;
                }
                Some(self.join(&key))
            }
        }
    }
}
