#![forbid(unsafe_code)]

//! Error type for session-level operations.

use std::fmt;

use wording_schema::SchemaError;

/// Errors surfaced by session load/save and structural edits.
///
/// Read-side misses inside a live session (an unresolved constant, a
/// dangling node reference) are not errors; those degrade softly and are
/// logged. This type covers the operations that must not silently
/// mangle state.
#[derive(Debug)]
pub enum StudioError {
    /// Schema-level failure (validation, node parse).
    Schema(SchemaError),
    /// Encoding or decoding between typed values and the store tree.
    Codec(serde_json::Error),
    /// A structural edit referenced a node id with no arena entry.
    MissingNode {
        /// The id that did not resolve.
        id: String,
    },
    /// A structural edit referenced a field index out of range.
    MissingField {
        /// Label of the owning fields list.
        owner: String,
        /// The out-of-range index.
        index: usize,
    },
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudioError::Schema(err) => write!(f, "schema error: {err}"),
            StudioError::Codec(err) => write!(f, "store codec failure: {err}"),
            StudioError::MissingNode { id } => write!(f, "no schema node with id {id:?}"),
            StudioError::MissingField { owner, index } => {
                write!(f, "no field at index {index} of {owner}")
            }
        }
    }
}

impl std::error::Error for StudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StudioError::Schema(err) => Some(err),
            StudioError::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for StudioError {
    fn from(err: SchemaError) -> Self {
        StudioError::Schema(err)
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        StudioError::Codec(err)
    }
}
