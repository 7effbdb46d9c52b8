//! Error types for storage and query operations.
//!
//! Every fallible operation in this crate returns [`StoreResult`]. The
//! variants map one-to-one onto the failure classes of the engine:
//! opening the database, talking to RocksDB, encoding/decoding stored
//! values, ingesting records, reading `.pgdf` files, index/primary
//! mismatches, and caller misuse.

use thiserror::Error;

use propgraph_core::ValidationError;

use crate::codec::CodecError;

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a storage, ingestion, or query operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database or one of its column families could not be opened.
    /// Fatal for the handle; the caller may retry with a different path.
    #[error("failed to open database at '{path}': {cause}")]
    StorageOpen { path: String, cause: String },

    /// A read or write against RocksDB failed.
    #[error("storage I/O error: {0}")]
    StorageIo(String),

    /// Column family missing at runtime. Indicates a bug or external
    /// tampering; every column family is created at open.
    #[error("column family not found: {0}")]
    ColumnFamilyNotFound(String),

    /// Value encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Stored bytes could not be decoded (corruption or version skew).
    #[error("decode error: {0}")]
    Decode(String),

    /// A malformed or rule-violating ingest record. The record's batch
    /// is rejected; lenient ingestion continues with the next record.
    #[error("bad record: {0}")]
    BadRecord(String),

    /// A `.pgdf` file could not be opened or read.
    #[error("file I/O error: {0}")]
    FileIo(#[from] std::io::Error),

    /// A secondary-index entry references a primary row that does not
    /// exist. Cannot occur under normal ingestion; indicates external
    /// tampering or a bug.
    #[error("index inconsistency: {index} entry references missing '{id}'")]
    IndexInconsistency {
        /// Which index held the dangling entry.
        index: &'static str,
        /// The referenced primary id.
        id: String,
    },

    /// Caller misuse, such as a query argument containing the reserved
    /// separator byte.
    #[error("usage error: {0}")]
    UsageError(String),
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::StorageIo(e.to_string())
    }
}

impl From<CodecError> for StoreError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::OversizeString { .. } => StoreError::Encode(e.to_string()),
            _ => StoreError::Decode(e.to_string()),
        }
    }
}

/// Validation failures reach storage only through the ingest path, where
/// they reject the offending record.
impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::BadRecord(e.to_string())
    }
}

static_assertions::assert_impl_all!(StoreError: Send, Sync, std::error::Error);
