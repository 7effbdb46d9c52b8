//! The database handle.
//!
//! [`GraphStore`] owns the RocksDB instance and all seven column
//! families. It is `Clone` (cheap `Arc` clone) and internally
//! thread-safe for concurrent readers; the engine is designed
//! single-writer and adds no locking of its own.
//!
//! Submodules split the impl by concern: [`ingest`] (write path),
//! [`query`] (read path), [`stats`] (metadata aggregation).

mod ingest;
mod query;
mod stats;

pub use ingest::{IngestOptions, LoadReport};

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rocksdb::{Cache, ColumnFamily, Options, DB};
use tracing::{debug, info};

use crate::column_families::{cf_names, get_column_family_descriptors};
use crate::error::{StoreError, StoreResult};

/// Default shared block cache size: 64 MiB.
pub const DEFAULT_CACHE_SIZE: usize = 64 * 1024 * 1024;

/// Default maximum open files.
pub const DEFAULT_MAX_OPEN_FILES: i32 = 1000;

/// Configuration for [`GraphStore::open_with_config`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Shared block cache size in bytes.
    pub block_cache_size: usize,
    /// Maximum open files handed to RocksDB.
    pub max_open_files: i32,
    /// Create the database directory if missing.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_cache_size: DEFAULT_CACHE_SIZE,
            max_open_files: DEFAULT_MAX_OPEN_FILES,
            create_if_missing: true,
        }
    }
}

/// RocksDB-backed property-graph store.
///
/// The database is a single directory; callers never touch individual
/// files. Cursors borrow the store, so the borrow checker prevents a
/// cursor from outliving it; closing is dropping the last clone.
#[derive(Clone)]
pub struct GraphStore {
    pub(crate) db: Arc<DB>,
    /// Shared block cache, kept alive for the DB lifetime.
    #[allow(dead_code)]
    cache: Cache,
    path: String,
    /// Live cursor count, shared across clones.
    pub(crate) open_cursors: Arc<AtomicUsize>,
}

impl GraphStore {
    /// Open (creating if missing) a graph database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open with explicit configuration.
    ///
    /// All column families are opened, creating any that are missing.
    /// Fails with [`StoreError::StorageOpen`] on any engine error.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StoreConfig) -> StoreResult<Self> {
        let path_str = path.as_ref().to_string_lossy().into_owned();

        let cache = Cache::new_lru_cache(config.block_cache_size);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(config.create_if_missing);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);

        let descriptors = get_column_family_descriptors(&cache);

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), descriptors).map_err(|e| {
            StoreError::StorageOpen {
                path: path_str.clone(),
                cause: e.to_string(),
            }
        })?;

        info!(path = %path_str, "graph store opened");

        Ok(Self {
            db: Arc::new(db),
            cache,
            path: path_str,
            open_cursors: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The database directory path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of cursors currently alive on this store.
    pub fn open_cursor_count(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Flush all column families to disk.
    pub fn flush(&self) -> StoreResult<()> {
        for name in cf_names::ALL {
            let cf = self.cf(name)?;
            self.db.flush_cf(cf)?;
        }
        debug!("flushed all column families");
        Ok(())
    }

    // ---------------- Column family accessors ----------------

    fn cf(&self, name: &str) -> StoreResult<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(name.to_string()))
    }

    pub(crate) fn cf_nodes(&self) -> StoreResult<&ColumnFamily> {
        self.cf(cf_names::NODES)
    }

    pub(crate) fn cf_edges(&self) -> StoreResult<&ColumnFamily> {
        self.cf(cf_names::EDGES)
    }

    pub(crate) fn cf_edges_by_label(&self) -> StoreResult<&ColumnFamily> {
        self.cf(cf_names::EDGES_BY_LABEL)
    }

    pub(crate) fn cf_adjacency(&self) -> StoreResult<&ColumnFamily> {
        self.cf(cf_names::ADJACENCY)
    }

    pub(crate) fn cf_node_props(&self) -> StoreResult<&ColumnFamily> {
        self.cf(cf_names::NODE_PROPS)
    }

    pub(crate) fn cf_edge_props(&self) -> StoreResult<&ColumnFamily> {
        self.cf(cf_names::EDGE_PROPS)
    }

    pub(crate) fn cf_meta(&self) -> StoreResult<&ColumnFamily> {
        self.cf(cf_names::META)
    }

    // ---------------- Shared low-level reads ----------------

    /// Raw node payload by id.
    pub(crate) fn node_payload(&self, id: &str) -> StoreResult<Option<Vec<u8>>> {
        let cf = self.cf_nodes()?;
        Ok(self.db.get_cf(cf, id.as_bytes())?)
    }

    /// Raw edge payload by id.
    pub(crate) fn edge_payload(&self, id: &str) -> StoreResult<Option<Vec<u8>>> {
        let cf = self.cf_edges()?;
        Ok(self.db.get_cf(cf, id.as_bytes())?)
    }

    /// Meta counter, 0 when absent.
    pub(crate) fn read_meta_u64(&self, key: &[u8]) -> StoreResult<u64> {
        let cf = self.cf_meta()?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(crate::codec::decode_u64(&bytes)?),
            None => Ok(0),
        }
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("path", &self.path)
            .field("open_cursors", &self.open_cursor_count())
            .finish()
    }
}
