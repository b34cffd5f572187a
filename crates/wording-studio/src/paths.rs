#![forbid(unsafe_code)]

//! Store path layout of a loaded branch.
//!
//! One branch document occupies the whole store tree:
//!
//! ```text
//! constants                       -> [Constant, ...]
//! locales                         -> ["en", "fr", ...]
//! schema.nodes.{id}               -> SchemaNode body
//! schema.nodes.{id}.params        -> derived template params
//! schema.nodes.{id}.instances.{locale}[.one|.other]
//! schema.root.fields.{index}      -> Field entry
//! ```
//!
//! Every path used by the session is built here; call sites never
//! concatenate path strings themselves.

use std::fmt;

use wording_schema::{NodeId, PluralForm};
use wording_store::Path;

/// The constants list.
#[must_use]
pub fn constants() -> Path {
    Path::root().key("constants")
}

/// The locale list.
#[must_use]
pub fn locales() -> Path {
    Path::root().key("locales")
}

/// The node arena.
#[must_use]
pub fn nodes() -> Path {
    Path::root().key("schema").key("nodes")
}

/// One node's body.
#[must_use]
pub fn node(id: &NodeId) -> Path {
    nodes().key(id.as_str())
}

/// One node's derived parameter map.
#[must_use]
pub fn node_params(id: &NodeId) -> Path {
    node(id).key("params")
}

/// One node's per-locale instance map.
#[must_use]
pub fn node_instances(id: &NodeId) -> Path {
    node(id).key("instances")
}

/// One locale's instance value on a node.
#[must_use]
pub fn node_instance(id: &NodeId, locale: &str) -> Path {
    node_instances(id).key(locale)
}

/// One plural form of a pluralized instance.
#[must_use]
pub fn plural_instance(id: &NodeId, locale: &str, form: PluralForm) -> Path {
    node_instance(id, locale).key(form.key())
}

/// Which fields list a field-level path addresses: the schema root or
/// an object node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldsOwner {
    /// `schema.root.fields`
    Root,
    /// `schema.nodes.{id}.fields`
    Node(NodeId),
}

impl FieldsOwner {
    /// The owner's fields array.
    #[must_use]
    pub fn fields(&self) -> Path {
        match self {
            FieldsOwner::Root => Path::root().key("schema").key("root").key("fields"),
            FieldsOwner::Node(id) => node(id).key("fields"),
        }
    }
}

impl fmt::Display for FieldsOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldsOwner::Root => f.write_str("root"),
            FieldsOwner::Node(id) => write!(f, "{id}"),
        }
    }
}

/// One field entry.
#[must_use]
pub fn field_entry(owner: &FieldsOwner, index: usize) -> Path {
    owner.fields().index(index)
}

/// One field entry's name.
#[must_use]
pub fn field_name(owner: &FieldsOwner, index: usize) -> Path {
    field_entry(owner, index).key("name")
}

/// One field entry's derived parameter map.
#[must_use]
pub fn field_params(owner: &FieldsOwner, index: usize) -> Path {
    field_entry(owner, index).key("params")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_paths() {
        let id = NodeId::from("n3");
        assert_eq!(node(&id).to_string(), "schema.nodes.n3");
        assert_eq!(node_params(&id).to_string(), "schema.nodes.n3.params");
        assert_eq!(
            node_instance(&id, "en").to_string(),
            "schema.nodes.n3.instances.en"
        );
        assert_eq!(
            plural_instance(&id, "en", PluralForm::Other).to_string(),
            "schema.nodes.n3.instances.en.other"
        );
    }

    #[test]
    fn field_paths() {
        assert_eq!(
            field_name(&FieldsOwner::Root, 2).to_string(),
            "schema.root.fields.2.name"
        );
        assert_eq!(
            field_params(&FieldsOwner::Node(NodeId::from("n5")), 0).to_string(),
            "schema.nodes.n5.fields.0.params"
        );
    }

    #[test]
    fn top_level_paths() {
        assert_eq!(constants().to_string(), "constants");
        assert_eq!(locales().to_string(), "locales");
        assert_eq!(nodes().to_string(), "schema.nodes");
    }
}
