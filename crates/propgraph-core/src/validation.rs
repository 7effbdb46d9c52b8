//! Input validation for graph entities.
//!
//! The storage layer encodes composite keys with a `0x00` separator, so
//! no user-supplied string may contain a NUL byte. Identifiers must be
//! non-empty; edge labels must be non-empty (they key the label index);
//! node labels may be empty. Entities are validated before any write.

use thiserror::Error;

use crate::types::{Edge, Node, PropertyMap};

/// The byte reserved as the composite-key separator.
pub const SEPARATOR: u8 = 0x00;

/// Violation of an entity validation rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Entity id is empty.
    #[error("empty {entity} id")]
    EmptyId {
        /// "node" or "edge".
        entity: &'static str,
    },

    /// Edge label is empty.
    #[error("empty label on edge '{id}'")]
    EmptyEdgeLabel { id: String },

    /// Edge endpoint id is empty.
    #[error("empty {endpoint} node id on edge '{id}'")]
    EmptyEndpoint {
        id: String,
        /// "source" or "target".
        endpoint: &'static str,
    },

    /// A property key is empty.
    #[error("empty property key on {entity} '{id}'")]
    EmptyPropertyKey { entity: &'static str, id: String },

    /// A user string contains the reserved separator byte.
    #[error("{field} of {entity} '{id}' contains the reserved NUL byte")]
    SeparatorByte {
        entity: &'static str,
        id: String,
        /// Which field was rejected ("id", "label", "property key", ...).
        field: &'static str,
    },
}

/// True if the string is free of the separator byte.
#[inline]
pub fn is_clean(s: &str) -> bool {
    !s.as_bytes().contains(&SEPARATOR)
}

fn check_props(
    props: &PropertyMap,
    entity: &'static str,
    id: &str,
) -> Result<(), ValidationError> {
    for (key, value) in props {
        if key.is_empty() {
            return Err(ValidationError::EmptyPropertyKey {
                entity,
                id: id.to_string(),
            });
        }
        if !is_clean(key) {
            return Err(ValidationError::SeparatorByte {
                entity,
                id: id.to_string(),
                field: "property key",
            });
        }
        if !is_clean(value) {
            return Err(ValidationError::SeparatorByte {
                entity,
                id: id.to_string(),
                field: "property value",
            });
        }
    }
    Ok(())
}

impl Node {
    /// Validate this node against the storage input rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId { entity: "node" });
        }
        if !is_clean(&self.id) {
            return Err(ValidationError::SeparatorByte {
                entity: "node",
                id: self.id.clone(),
                field: "id",
            });
        }
        if !is_clean(&self.label) {
            return Err(ValidationError::SeparatorByte {
                entity: "node",
                id: self.id.clone(),
                field: "label",
            });
        }
        check_props(&self.props, "node", &self.id)
    }
}

impl Edge {
    /// Validate this edge against the storage input rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId { entity: "edge" });
        }
        if !is_clean(&self.id) {
            return Err(ValidationError::SeparatorByte {
                entity: "edge",
                id: self.id.clone(),
                field: "id",
            });
        }
        if self.label.is_empty() {
            return Err(ValidationError::EmptyEdgeLabel {
                id: self.id.clone(),
            });
        }
        if !is_clean(&self.label) {
            return Err(ValidationError::SeparatorByte {
                entity: "edge",
                id: self.id.clone(),
                field: "label",
            });
        }
        if self.src.is_empty() {
            return Err(ValidationError::EmptyEndpoint {
                id: self.id.clone(),
                endpoint: "source",
            });
        }
        if self.dst.is_empty() {
            return Err(ValidationError::EmptyEndpoint {
                id: self.id.clone(),
                endpoint: "target",
            });
        }
        if !is_clean(&self.src) {
            return Err(ValidationError::SeparatorByte {
                entity: "edge",
                id: self.id.clone(),
                field: "source id",
            });
        }
        if !is_clean(&self.dst) {
            return Err(ValidationError::SeparatorByte {
                entity: "edge",
                id: self.id.clone(),
                field: "target id",
            });
        }
        check_props(&self.props, "edge", &self.id)
    }
}
