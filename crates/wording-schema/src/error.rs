#![forbid(unsafe_code)]

//! Error type for schema validation and (de)serialization.

use std::fmt;

/// Errors surfaced at the persistence-validation boundary.
///
/// In-editor inconsistencies (dangling references, unresolved constants)
/// are deliberately **not** errors — the editor degrades softly and the
/// defect is reported through [`dangling_references`](crate::graph::dangling_references)
/// instead.
#[derive(Debug)]
pub enum SchemaError {
    /// A constant name violates the `[A-Z0-9_]+` naming constraint.
    InvalidConstantName {
        /// The offending name.
        name: String,
    },
    /// Two constants share a name.
    DuplicateConstantName {
        /// The duplicated name.
        name: String,
    },
    /// A node value in the store does not parse as a schema node.
    MalformedNode {
        /// Id of the offending node map entry.
        id: String,
        /// Underlying parse failure.
        source: serde_json::Error,
    },
    /// Wire-level (de)serialization failure.
    Serde(serde_json::Error),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::InvalidConstantName { name } => {
                write!(f, "invalid constant name {name:?}: must match [A-Z0-9_]+")
            }
            SchemaError::DuplicateConstantName { name } => {
                write!(f, "duplicate constant name {name:?}")
            }
            SchemaError::MalformedNode { id, source } => {
                write!(f, "malformed schema node {id:?}: {source}")
            }
            SchemaError::Serde(err) => write!(f, "serialization failure: {err}"),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::MalformedNode { source, .. } => Some(source),
            SchemaError::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Serde(err)
    }
}
