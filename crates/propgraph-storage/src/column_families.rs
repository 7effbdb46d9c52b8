//! RocksDB column family definitions.
//!
//! Each logical keyspace of the engine maps to one column family, so a
//! single atomic `WriteBatch` can span all of them and every query
//! becomes a point get or a prefix range scan in exactly one family.
//!
//! | Name | Key | Value | Purpose |
//! |------|-----|-------|---------|
//! | `nodes` | node id | encoded `{label, props}` | point lookup, full scan |
//! | `edges` | edge id | encoded `{label, src, dst, directed, props}` | point lookup, full scan |
//! | `edges_by_label` | label ⟂ edge id | empty | edges of one label |
//! | `adjacency` | node id ⟂ edge id ⟂ role | empty | incident edges of a node |
//! | `node_props` | key ⟂ value ⟂ node id | empty | nodes matching (k, v) |
//! | `edge_props` | key ⟂ value ⟂ edge id | empty | edges matching (k, v) |
//! | `meta` | named keys | counters / schema sets | totals, per-label metadata |
//!
//! ⟂ is the `0x00` separator byte; user strings are validated NUL-free.
//! All families share a single LRU block cache.

use rocksdb::{BlockBasedOptions, Cache, ColumnFamilyDescriptor, Options};

/// Column family name constants.
pub mod cf_names {
    /// Primary node storage.
    pub const NODES: &str = "nodes";

    /// Primary edge storage.
    pub const EDGES: &str = "edges";

    /// Label index over edges.
    pub const EDGES_BY_LABEL: &str = "edges_by_label";

    /// Adjacency index: incident edges per node.
    pub const ADJACENCY: &str = "adjacency";

    /// Property-equality index over nodes.
    pub const NODE_PROPS: &str = "node_props";

    /// Property-equality index over edges.
    pub const EDGE_PROPS: &str = "edge_props";

    /// Counters and per-label metadata.
    pub const META: &str = "meta";

    /// All column family names, in descriptor order.
    pub const ALL: &[&str] = &[
        NODES,
        EDGES,
        EDGES_BY_LABEL,
        ADJACENCY,
        NODE_PROPS,
        EDGE_PROPS,
        META,
    ];
}

/// Options for the primary families (`nodes`, `edges`).
///
/// Dominated by point lookups during joins, so: bloom filter at 10 bits
/// per key, shared block cache, LZ4.
pub fn primary_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_bloom_filter(10.0, false);
    block_opts.set_cache_index_and_filter_blocks(true);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts.create_if_missing(true);

    opts
}

/// Options for the index families (`edges_by_label`, `adjacency`,
/// `node_props`, `edge_props`).
///
/// Read only by prefix range scans, which bloom filters cannot serve,
/// so none are built. Keys are variable-length composites, so no
/// fixed-prefix extractor is configured either; scans iterate from the
/// prefix and stop at the first non-matching key.
pub fn index_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_cache_index_and_filter_blocks(true);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts.create_if_missing(true);

    opts
}

/// Options for the `meta` family: tiny, uncompressed.
pub fn meta_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::None);
    opts.create_if_missing(true);

    opts
}

/// Descriptors for all column families, in `cf_names::ALL` order.
pub fn get_column_family_descriptors(cache: &Cache) -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(cf_names::NODES, primary_options(cache)),
        ColumnFamilyDescriptor::new(cf_names::EDGES, primary_options(cache)),
        ColumnFamilyDescriptor::new(cf_names::EDGES_BY_LABEL, index_options(cache)),
        ColumnFamilyDescriptor::new(cf_names::ADJACENCY, index_options(cache)),
        ColumnFamilyDescriptor::new(cf_names::NODE_PROPS, index_options(cache)),
        ColumnFamilyDescriptor::new(cf_names::EDGE_PROPS, index_options(cache)),
        ColumnFamilyDescriptor::new(cf_names::META, meta_options()),
    ]
}
