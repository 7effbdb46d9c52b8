//! Key and value codec.
//!
//! # Keys
//!
//! Composite keys join their components with the `0x00` separator byte,
//! which validation bans from every user string, so prefix ranges are
//! unambiguous: scanning `label 0x00` in `edges_by_label` can never
//! match a longer label that merely starts with the same bytes.
//!
//! Adjacency keys carry one trailing role byte after a final separator
//! (`node 0x00 edge 0x00 role`): `0` indexes the edge under its source
//! endpoint, `1` under its target. Directed edges write only the source
//! row; undirected edges write both, which keeps the two rows of an
//! undirected self-loop distinct.
//!
//! # Values
//!
//! Stored values are length-prefixed binary, little-endian, behind a
//! 1-byte format-version header so a foreign format fails decoding
//! instead of being misread. Strings are `u32` length + UTF-8 bytes;
//! property maps are a `u32` pair count followed by key/value strings in
//! key order, making the encoding deterministic across runs.
//!
//! Counters in `meta` are bare little-endian `u64`, no header.

use std::collections::BTreeSet;

use thiserror::Error;

use propgraph_core::{Edge, Node, PropertyMap};

/// Version header written as the first byte of every encoded value.
pub const FORMAT_VERSION: u8 = 1;

/// Separator byte between composite key components.
pub const SEPARATOR: u8 = propgraph_core::validation::SEPARATOR;

/// Trailing bytes after the edge id in an adjacency key: separator plus
/// role byte.
pub const ADJACENCY_SUFFIX_LEN: usize = 2;

/// Meta key for the total node count.
pub const META_NODES_TOTAL: &[u8] = b"nodes_total";

/// Meta key for the total edge count.
pub const META_EDGES_TOTAL: &[u8] = b"edges_total";

/// Meta key family stem for per-label edge counts.
pub const META_EDGE_LABEL_COUNT: &[u8] = b"edge_label_count";

/// Meta key family stem for per-label node property-key sets.
pub const META_NODE_SCHEMA: &[u8] = b"node_label_schema";

/// Meta key family stem for per-label edge property-key sets.
pub const META_EDGE_SCHEMA: &[u8] = b"edge_label_schema";

/// Which endpoint of an edge an adjacency row indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    /// The edge's source node.
    Source = 0,
    /// The edge's target node.
    Target = 1,
}

impl EndpointRole {
    /// The role's key byte.
    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Codec failure.
///
/// Decode-side variants indicate corruption or version skew in stored
/// bytes; `OversizeString` is the only encode-side failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value's version byte is not [`FORMAT_VERSION`].
    #[error("unsupported value format version {found}")]
    UnsupportedVersion { found: u8 },

    /// The value ended before the named field was complete.
    #[error("truncated value while reading {0}")]
    Truncated(&'static str),

    /// A stored string is not valid UTF-8.
    #[error("invalid UTF-8 in stored {0}")]
    InvalidUtf8(&'static str),

    /// A counter value had the wrong width.
    #[error("counter value must be 8 bytes, got {actual}")]
    BadCounter { actual: usize },

    /// A string too long for its u32 length prefix.
    #[error("string of {len} bytes exceeds the encodable limit")]
    OversizeString { len: usize },

    /// Bytes left over after the value was fully read.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

// ---------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------

/// `edges_by_label` key: `label ⟂ edge_id`.
pub fn label_index_key(label: &str, edge_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(label.len() + 1 + edge_id.len());
    key.extend_from_slice(label.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(edge_id.as_bytes());
    key
}

/// Scan prefix for all edges with the given label.
pub fn label_index_prefix(label: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(label.len() + 1);
    prefix.extend_from_slice(label.as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// `adjacency` key: `node_id ⟂ edge_id ⟂ role`.
pub fn adjacency_key(node_id: &str, edge_id: &str, role: EndpointRole) -> Vec<u8> {
    let mut key = Vec::with_capacity(node_id.len() + edge_id.len() + 3);
    key.extend_from_slice(node_id.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(edge_id.as_bytes());
    key.push(SEPARATOR);
    key.push(role.as_byte());
    key
}

/// Scan prefix for all adjacency rows of a node.
pub fn adjacency_prefix(node_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(node_id.len() + 1);
    prefix.extend_from_slice(node_id.as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// Property-index key: `prop_key ⟂ prop_value ⟂ entity_id`.
///
/// Used for both `node_props` and `edge_props`.
pub fn prop_index_key(prop_key: &str, prop_value: &str, entity_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(prop_key.len() + prop_value.len() + entity_id.len() + 2);
    key.extend_from_slice(prop_key.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(prop_value.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(entity_id.as_bytes());
    key
}

/// Scan prefix for all entities carrying the `(key, value)` pair.
pub fn prop_index_prefix(prop_key: &str, prop_value: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(prop_key.len() + prop_value.len() + 2);
    prefix.extend_from_slice(prop_key.as_bytes());
    prefix.push(SEPARATOR);
    prefix.extend_from_slice(prop_value.as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// Per-label meta key: `stem ⟂ label`.
pub fn meta_label_key(stem: &[u8], label: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(stem.len() + 1 + label.len());
    key.extend_from_slice(stem);
    key.push(SEPARATOR);
    key.extend_from_slice(label.as_bytes());
    key
}

/// Scan prefix for a per-label meta key family.
pub fn meta_label_prefix(stem: &[u8]) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(stem.len() + 1);
    prefix.extend_from_slice(stem);
    prefix.push(SEPARATOR);
    prefix
}

// ---------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------

fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<(), CodecError> {
    let len = u32::try_from(s.len()).map_err(|_| CodecError::OversizeString { len: s.len() })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn put_props(buf: &mut Vec<u8>, props: &PropertyMap) -> Result<(), CodecError> {
    let count =
        u32::try_from(props.len()).map_err(|_| CodecError::OversizeString { len: props.len() })?;
    buf.extend_from_slice(&count.to_le_bytes());
    for (key, value) in props {
        put_str(buf, key)?;
        put_str(buf, value)?;
    }
    Ok(())
}

/// Encode a node's stored value (`label`, `props`; the id is the key).
pub fn encode_node(node: &Node) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(16 + node.label.len());
    buf.push(FORMAT_VERSION);
    put_str(&mut buf, &node.label)?;
    put_props(&mut buf, &node.props)?;
    Ok(buf)
}

/// Decode a node from its key (`id`) and stored value.
pub fn decode_node(id: &str, bytes: &[u8]) -> Result<Node, CodecError> {
    let mut reader = Reader::new(bytes);
    reader.check_version()?;
    let label = reader.read_str("node label")?;
    let props = reader.read_props("node property")?;
    reader.finish()?;
    Ok(Node {
        id: id.to_string(),
        label,
        props,
    })
}

/// Encode an edge's stored value (`label`, `src`, `dst`, `directed`,
/// `props`; the id is the key).
pub fn encode_edge(edge: &Edge) -> Result<Vec<u8>, CodecError> {
    let mut buf =
        Vec::with_capacity(24 + edge.label.len() + edge.src.len() + edge.dst.len());
    buf.push(FORMAT_VERSION);
    put_str(&mut buf, &edge.label)?;
    put_str(&mut buf, &edge.src)?;
    put_str(&mut buf, &edge.dst)?;
    buf.push(edge.directed as u8);
    put_props(&mut buf, &edge.props)?;
    Ok(buf)
}

/// Decode an edge from its key (`id`) and stored value.
pub fn decode_edge(id: &str, bytes: &[u8]) -> Result<Edge, CodecError> {
    let mut reader = Reader::new(bytes);
    reader.check_version()?;
    let label = reader.read_str("edge label")?;
    let src = reader.read_str("edge source")?;
    let dst = reader.read_str("edge target")?;
    let directed = reader.read_u8("edge direction flag")? != 0;
    let props = reader.read_props("edge property")?;
    reader.finish()?;
    Ok(Edge {
        id: id.to_string(),
        label,
        src,
        dst,
        directed,
        props,
    })
}

/// Encode a meta counter.
#[inline]
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Decode a meta counter.
pub fn decode_u64(bytes: &[u8]) -> Result<u64, CodecError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| CodecError::BadCounter {
            actual: bytes.len(),
        })?;
    Ok(u64::from_le_bytes(arr))
}

/// Encode a property-key set (schema entry). Members are written in
/// sorted order, so the encoding is deterministic.
pub fn encode_string_set(set: &BTreeSet<String>) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(8 + set.len() * 8);
    buf.push(FORMAT_VERSION);
    let count =
        u32::try_from(set.len()).map_err(|_| CodecError::OversizeString { len: set.len() })?;
    buf.extend_from_slice(&count.to_le_bytes());
    for member in set {
        put_str(&mut buf, member)?;
    }
    Ok(buf)
}

/// Decode a property-key set.
pub fn decode_string_set(bytes: &[u8]) -> Result<BTreeSet<String>, CodecError> {
    let mut reader = Reader::new(bytes);
    reader.check_version()?;
    let count = reader.read_u32("set size")?;
    let mut set = BTreeSet::new();
    for _ in 0..count {
        set.insert(reader.read_str("set member")?);
    }
    reader.finish()?;
    Ok(set)
}

/// Sequential reader over an encoded value.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn check_version(&mut self) -> Result<(), CodecError> {
        let found = self.read_u8("version header")?;
        if found != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion { found });
        }
        Ok(())
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(CodecError::Truncated(what))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self, what: &'static str) -> Result<u8, CodecError> {
        Ok(self.take(1, what)?[0])
    }

    fn read_u32(&mut self, what: &'static str) -> Result<u32, CodecError> {
        let bytes = self.take(4, what)?;
        Ok(u32::from_le_bytes(bytes.try_into().expect("4-byte slice")))
    }

    fn read_str(&mut self, what: &'static str) -> Result<String, CodecError> {
        let len = self.read_u32(what)? as usize;
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8(what))
    }

    fn read_props(&mut self, what: &'static str) -> Result<PropertyMap, CodecError> {
        let count = self.read_u32(what)?;
        let mut props = PropertyMap::new();
        for _ in 0..count {
            let key = self.read_str(what)?;
            let value = self.read_str(what)?;
            props.insert(key, value);
        }
        Ok(props)
    }

    fn finish(self) -> Result<(), CodecError> {
        let remaining = self.buf.len() - self.pos;
        if remaining != 0 {
            return Err(CodecError::TrailingBytes(remaining));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_value_roundtrip() {
        let node = Node::new("user_101", "User")
            .with_prop("name", "Ana")
            .with_prop("country", "Mexico");
        let bytes = encode_node(&node).unwrap();
        assert_eq!(bytes[0], FORMAT_VERSION);
        let decoded = decode_node("user_101", &bytes).unwrap();
        assert_eq!(decoded, node);
    }

    #[test]
    fn node_with_empty_label_and_props_roundtrip() {
        let node = Node::new("n", "");
        let decoded = decode_node("n", &encode_node(&node).unwrap()).unwrap();
        assert_eq!(decoded, node);
    }

    #[test]
    fn edge_value_roundtrip() {
        let edge = Edge::new("e1", "KNOWS", "user_101", "user_102", true)
            .with_prop("since", "2020");
        let decoded = decode_edge("e1", &encode_edge(&edge).unwrap()).unwrap();
        assert_eq!(decoded, edge);

        let undirected = Edge::new("e2", "NEAR", "a", "b", false);
        let decoded = decode_edge("e2", &encode_edge(&undirected).unwrap()).unwrap();
        assert!(!decoded.directed);
    }

    #[test]
    fn encoding_is_deterministic_regardless_of_insertion_order() {
        let a = Node::new("n", "L").with_prop("x", "1").with_prop("a", "2");
        let b = Node::new("n", "L").with_prop("a", "2").with_prop("x", "1");
        assert_eq!(encode_node(&a).unwrap(), encode_node(&b).unwrap());
    }

    #[test]
    fn foreign_version_rejected() {
        let node = Node::new("n", "L");
        let mut bytes = encode_node(&node).unwrap();
        bytes[0] = 9;
        assert_eq!(
            decode_node("n", &bytes),
            Err(CodecError::UnsupportedVersion { found: 9 })
        );
    }

    #[test]
    fn truncated_value_rejected() {
        let node = Node::new("n", "Label");
        let bytes = encode_node(&node).unwrap();
        let result = decode_node("n", &bytes[..bytes.len() - 2]);
        assert!(matches!(result, Err(CodecError::Truncated(_))));
    }

    #[test]
    fn trailing_garbage_rejected() {
        let node = Node::new("n", "L");
        let mut bytes = encode_node(&node).unwrap();
        bytes.push(0xFF);
        assert_eq!(decode_node("n", &bytes), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn counter_roundtrip_and_width_check() {
        assert_eq!(decode_u64(&encode_u64(42)).unwrap(), 42);
        assert_eq!(
            decode_u64(&[1, 2, 3]),
            Err(CodecError::BadCounter { actual: 3 })
        );
    }

    #[test]
    fn string_set_roundtrip_sorted() {
        let set: BTreeSet<String> = ["name", "country", "age"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let decoded = decode_string_set(&encode_string_set(&set).unwrap()).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn empty_string_set_roundtrip() {
        let set = BTreeSet::new();
        let decoded = decode_string_set(&encode_string_set(&set).unwrap()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn label_prefix_bounds_the_label() {
        // "KNOWS" scan prefix must not match "KNOWS_WELL" keys.
        let key = label_index_key("KNOWS_WELL", "e1");
        assert!(!key.starts_with(&label_index_prefix("KNOWS")));
        let key = label_index_key("KNOWS", "e1");
        assert!(key.starts_with(&label_index_prefix("KNOWS")));
    }

    #[test]
    fn adjacency_key_layout() {
        let key = adjacency_key("n1", "e1", EndpointRole::Target);
        assert!(key.starts_with(&adjacency_prefix("n1")));
        assert_eq!(key[key.len() - 1], 1);
        assert_eq!(key[key.len() - 2], SEPARATOR);

        let id_bytes = &key[adjacency_prefix("n1").len()..key.len() - ADJACENCY_SUFFIX_LEN];
        assert_eq!(id_bytes, b"e1");
    }

    #[test]
    fn adjacency_roles_are_distinct_keys() {
        let out = adjacency_key("n1", "e1", EndpointRole::Source);
        let inc = adjacency_key("n1", "e1", EndpointRole::Target);
        assert_ne!(out, inc);
    }

    #[test]
    fn prop_index_prefix_separates_key_and_value() {
        // (k="c", v="ab") must not collide with (k="ca", v="b").
        assert_ne!(prop_index_prefix("c", "ab"), prop_index_prefix("ca", "b"));
        let key = prop_index_key("country", "Chile", "user_103");
        assert!(key.starts_with(&prop_index_prefix("country", "Chile")));
        assert!(!key.starts_with(&prop_index_prefix("country", "Chi")));
    }

    #[test]
    fn meta_label_keys_share_family_prefix() {
        let key = meta_label_key(META_EDGE_LABEL_COUNT, "KNOWS");
        assert!(key.starts_with(&meta_label_prefix(META_EDGE_LABEL_COUNT)));
        // The two schema families must not collide.
        assert!(!meta_label_key(META_NODE_SCHEMA, "User")
            .starts_with(&meta_label_prefix(META_EDGE_SCHEMA)));
    }
}
