//! RocksDB-backed storage and query engine for property graphs.
//!
//! The engine maps labeled nodes and edges — each carrying a
//! string-to-string property map — onto seven RocksDB column families
//! so that every supported query is a point get or a prefix range scan:
//!
//! - point lookups ([`GraphStore::get_node`], [`GraphStore::get_edge`])
//! - property-equality scans ([`GraphStore::iter_nodes_by_property`],
//!   [`GraphStore::iter_edges_by_property`])
//! - adjacency traversal ([`GraphStore::iter_neighbours`])
//! - label scans ([`GraphStore::iter_edges_by_label`])
//! - metadata ([`GraphStore::count_nodes`], [`GraphStore::node_schema`], …)
//!
//! Writes are append-only and atomic per record: one `WriteBatch`
//! updates the primary row, every index row, and the metadata counters
//! together. Bulk ingestion streams the `.pgdf` exchange format
//! ([`GraphStore::load_pgdf`]).
//!
//! All operations are synchronous and run on the caller's thread; the
//! store supports concurrent readers and is designed single-writer.
//!
//! # Example
//!
//! ```rust,ignore
//! use propgraph_core::Node;
//! use propgraph_storage::GraphStore;
//!
//! let store = GraphStore::open("/data/graph")?;
//! store.insert_node(&Node::new("user_101", "User").with_prop("name", "Ana"))?;
//! for entry in store.iter_nodes_by_property("name", "Ana")? {
//!     println!("{}", entry?.id);
//! }
//! ```

pub mod codec;
pub mod column_families;
pub mod cursor;
pub mod error;
pub mod pgdf;
pub mod store;

pub use cursor::{EdgeCursor, EdgeJoinCursor, NodeCursor, NodeJoinCursor};
pub use error::{StoreError, StoreResult};
pub use pgdf::{PgdfReader, Record};
pub use store::{GraphStore, IngestOptions, LoadReport, StoreConfig};
