#![forbid(unsafe_code)]

//! Branch configuration: the persisted document an editing session
//! loads and saves.
//!
//! A branch bundles the project constants, the schema (node arena plus
//! the root object), and the locale list. The wire format is JSON; the
//! root is an object node inlined into the schema rather than an arena
//! entry, so it deserializes through the same tagged representation as
//! [`SchemaNode`] kinds.

use serde::{Deserialize, Serialize};

use crate::constants::{validate_constants, Constant};
use crate::error::SchemaError;
use crate::graph::{dangling_references, NodeMap};
use crate::node::{Field, NodeId};

/// The root of the schema tree. Always an object; modeled as a
/// single-variant tagged enum so the wire shape carries
/// `"type": "object"` like every other node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RootObject {
    Object {
        #[serde(default)]
        fields: Vec<Field>,
    },
}

impl RootObject {
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        RootObject::Object { fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        match self {
            RootObject::Object { fields } => fields,
        }
    }
}

impl Default for RootObject {
    fn default() -> Self {
        RootObject::Object { fields: Vec::new() }
    }
}

/// The schema half of a branch: the flat node arena and the root.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BranchSchema {
    #[serde(default)]
    pub nodes: NodeMap,
    #[serde(default)]
    pub root: RootObject,
}

/// A complete branch document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BranchConfig {
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub schema: BranchSchema,
    #[serde(default)]
    pub locales: Vec<String>,
}

impl BranchConfig {
    /// Parse a branch document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize back to pretty JSON text.
    pub fn to_json_string(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Persistence-boundary validation: constant names well-formed and
    /// unique. Dangling node references are reported separately (they
    /// are tolerated in live sessions).
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_constants(&self.constants)
    }

    /// Schema references that do not resolve.
    #[must_use]
    pub fn dangling(&self) -> Vec<(String, NodeId)> {
        dangling_references(&self.schema.nodes, self.schema.root.fields())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
