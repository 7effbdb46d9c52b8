//! Write path: single-entity inserts and bulk `.pgdf` loading.
//!
//! Every insert builds one `WriteBatch` spanning all column families
//! the entity touches (primary row, index rows, counters, schema sets)
//! and commits it atomically, so a crash between batches leaves the
//! counters and indexes consistent with whatever primary rows survive.
//!
//! Entities are append-only: a duplicate id rejects the whole batch.

use std::collections::BTreeSet;
use std::path::Path;

use rocksdb::WriteBatch;
use tracing::{info, trace, warn};

use propgraph_core::{Edge, Node, PropertyMap};

use crate::codec::{self, EndpointRole};
use crate::error::{StoreError, StoreResult};
use crate::pgdf::{PgdfReader, Record};

use super::GraphStore;

/// Options for [`GraphStore::load_pgdf`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Abort on the first bad record instead of skipping it.
    pub strict: bool,
}

/// Outcome of a bulk load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Nodes inserted.
    pub nodes: u64,
    /// Edges inserted.
    pub edges: u64,
    /// Records skipped as bad (lenient mode only).
    pub skipped: u64,
}

impl GraphStore {
    /// Insert a node.
    ///
    /// One atomic batch: primary row, one property-index row per
    /// property, node total, and the label's schema set. Fails with
    /// [`StoreError::BadRecord`] on validation failure or duplicate id,
    /// leaving the store untouched.
    pub fn insert_node(&self, node: &Node) -> StoreResult<()> {
        node.validate()?;

        let cf_nodes = self.cf_nodes()?;
        if self.db.get_cf(cf_nodes, node.id.as_bytes())?.is_some() {
            return Err(StoreError::BadRecord(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(cf_nodes, node.id.as_bytes(), codec::encode_node(node)?);

        let cf_props = self.cf_node_props()?;
        for (key, value) in &node.props {
            batch.put_cf(cf_props, codec::prop_index_key(key, value, &node.id), []);
        }

        let cf_meta = self.cf_meta()?;
        let total = self.read_meta_u64(codec::META_NODES_TOTAL)?;
        batch.put_cf(cf_meta, codec::META_NODES_TOTAL, codec::encode_u64(total + 1));

        let schema_key = codec::meta_label_key(codec::META_NODE_SCHEMA, &node.label);
        let schema_value = self.merged_schema_value(&schema_key, &node.props)?;
        batch.put_cf(cf_meta, schema_key, schema_value);

        self.db.write(batch)?;
        trace!(id = %node.id, label = %node.label, "node inserted");
        Ok(())
    }

    /// Insert an edge.
    ///
    /// One atomic batch: primary row, label-index row, adjacency rows
    /// (source always; target too when undirected), property-index
    /// rows, edge total, per-label count, and the label's schema set.
    pub fn insert_edge(&self, edge: &Edge) -> StoreResult<()> {
        edge.validate()?;

        let cf_edges = self.cf_edges()?;
        if self.db.get_cf(cf_edges, edge.id.as_bytes())?.is_some() {
            return Err(StoreError::BadRecord(format!(
                "duplicate edge id '{}'",
                edge.id
            )));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(cf_edges, edge.id.as_bytes(), codec::encode_edge(edge)?);

        let cf_labels = self.cf_edges_by_label()?;
        batch.put_cf(cf_labels, codec::label_index_key(&edge.label, &edge.id), []);

        let cf_adj = self.cf_adjacency()?;
        batch.put_cf(
            cf_adj,
            codec::adjacency_key(&edge.src, &edge.id, EndpointRole::Source),
            [],
        );
        if !edge.directed {
            batch.put_cf(
                cf_adj,
                codec::adjacency_key(&edge.dst, &edge.id, EndpointRole::Target),
                [],
            );
        }

        let cf_props = self.cf_edge_props()?;
        for (key, value) in &edge.props {
            batch.put_cf(cf_props, codec::prop_index_key(key, value, &edge.id), []);
        }

        let cf_meta = self.cf_meta()?;
        let total = self.read_meta_u64(codec::META_EDGES_TOTAL)?;
        batch.put_cf(cf_meta, codec::META_EDGES_TOTAL, codec::encode_u64(total + 1));

        let count_key = codec::meta_label_key(codec::META_EDGE_LABEL_COUNT, &edge.label);
        let label_count = self.read_meta_u64(&count_key)?;
        batch.put_cf(cf_meta, count_key, codec::encode_u64(label_count + 1));

        let schema_key = codec::meta_label_key(codec::META_EDGE_SCHEMA, &edge.label);
        let schema_value = self.merged_schema_value(&schema_key, &edge.props)?;
        batch.put_cf(cf_meta, schema_key, schema_value);

        self.db.write(batch)?;
        trace!(id = %edge.id, label = %edge.label, "edge inserted");
        Ok(())
    }

    /// Stream a `.pgdf` file into the store, one batch per record.
    ///
    /// Memory use is proportional to the largest record, not the file.
    /// In the default lenient mode a bad record is logged and counted
    /// in [`LoadReport::skipped`]; with [`IngestOptions::strict`] the
    /// first bad record aborts the load (previously committed batches
    /// remain).
    pub fn load_pgdf<P: AsRef<Path>>(
        &self,
        path: P,
        options: IngestOptions,
    ) -> StoreResult<LoadReport> {
        let path = path.as_ref();
        let reader = PgdfReader::open(path)?;
        let mut report = LoadReport::default();

        for record in reader {
            let outcome = match record {
                Ok(Record::Node(node)) => self.insert_node(&node).map(|()| {
                    report.nodes += 1;
                }),
                Ok(Record::Edge(edge)) => self.insert_edge(&edge).map(|()| {
                    report.edges += 1;
                }),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {}
                Err(StoreError::BadRecord(reason)) if !options.strict => {
                    warn!(file = %path.display(), %reason, "skipping bad record");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            file = %path.display(),
            nodes = report.nodes,
            edges = report.edges,
            skipped = report.skipped,
            "pgdf load finished"
        );
        Ok(report)
    }

    /// Current schema set under `key`, unioned with `props`' keys and
    /// re-encoded. Always returns a value, so a label appears in the
    /// schema even when none of its entities carry properties.
    fn merged_schema_value(&self, key: &[u8], props: &PropertyMap) -> StoreResult<Vec<u8>> {
        let cf = self.cf_meta()?;
        let mut set = match self.db.get_cf(cf, key)? {
            Some(bytes) => codec::decode_string_set(&bytes)?,
            None => BTreeSet::new(),
        };
        set.extend(props.keys().cloned());
        Ok(codec::encode_string_set(&set)?)
    }
}
