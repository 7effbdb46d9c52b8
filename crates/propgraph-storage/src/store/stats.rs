//! Metadata aggregation: totals, per-label counts, schemas.
//!
//! All of these read only the `meta` column family; nothing scans the
//! primary families. The ingest path keeps `meta` in lockstep with the
//! base data inside each batch.

use std::collections::{BTreeMap, BTreeSet};

use rocksdb::{Direction, IteratorMode};

use crate::codec;
use crate::error::{StoreError, StoreResult};

use super::GraphStore;

impl GraphStore {
    /// Total number of nodes.
    pub fn count_nodes(&self) -> StoreResult<u64> {
        self.read_meta_u64(codec::META_NODES_TOTAL)
    }

    /// Total number of edges.
    pub fn count_edges(&self) -> StoreResult<u64> {
        self.read_meta_u64(codec::META_EDGES_TOTAL)
    }

    /// Edge count per label.
    pub fn edge_count_by_label(&self) -> StoreResult<BTreeMap<String, u64>> {
        let cf = self.cf_meta()?;
        let prefix = codec::meta_label_prefix(codec::META_EDGE_LABEL_COUNT);
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut counts = BTreeMap::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let label = meta_label(&key, prefix.len())?;
            counts.insert(label, codec::decode_u64(&value)?);
        }
        Ok(counts)
    }

    /// Union of property keys per node label.
    pub fn node_schema(&self) -> StoreResult<BTreeMap<String, BTreeSet<String>>> {
        self.schema_map(codec::META_NODE_SCHEMA)
    }

    /// Union of property keys per edge label.
    pub fn edge_schema(&self) -> StoreResult<BTreeMap<String, BTreeSet<String>>> {
        self.schema_map(codec::META_EDGE_SCHEMA)
    }

    fn schema_map(&self, stem: &[u8]) -> StoreResult<BTreeMap<String, BTreeSet<String>>> {
        let cf = self.cf_meta()?;
        let prefix = codec::meta_label_prefix(stem);
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut schema = BTreeMap::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let label = meta_label(&key, prefix.len())?;
            schema.insert(label, codec::decode_string_set(&value)?);
        }
        Ok(schema)
    }
}

fn meta_label(key: &[u8], prefix_len: usize) -> StoreResult<String> {
    std::str::from_utf8(&key[prefix_len..])
        .map(str::to_string)
        .map_err(|_| StoreError::Decode("meta key label is not valid UTF-8".to_string()))
}
