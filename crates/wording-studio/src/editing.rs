#![forbid(unsafe_code)]

//! Structural schema edits over the store.
//!
//! Field insertion, removal, and node type replacement all mutate
//! several paths (the fields array, the node arena, owned subtrees), so
//! each operation runs inside a batch scope: listeners observe one
//! coalesced notification wave per edit, never a half-applied state.
//!
//! The no-orphans rule is enforced here: removing a field or replacing
//! a node's type deletes the entire subtree the old value owned.

use tracing::info;

use wording_schema::{
    fresh_node_id, owned_subtree, Field, NodeId, NodeKind, NodeMap, NodeType, SchemaNode,
};
use wording_store::ObservableStore;

use crate::codec;
use crate::error::StudioError;
use crate::paths::{self, FieldsOwner};

/// Where a new field lands in its owner's field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before every existing field.
    Start,
    /// Immediately after the field at this index.
    After(usize),
    /// After every existing field.
    End,
}

/// The current node arena, decoded from the store.
pub(crate) fn read_nodes(store: &ObservableStore) -> Result<NodeMap, StudioError> {
    match store.get(&paths::nodes()) {
        Some(value) => codec::decode(&value),
        None => Ok(NodeMap::new()),
    }
}

/// The current field list of `owner`, decoded from the store.
pub(crate) fn read_fields(
    store: &ObservableStore,
    owner: &FieldsOwner,
) -> Result<Vec<Field>, StudioError> {
    match store.get(&owner.fields()) {
        Some(value) => codec::decode(&value),
        None => Ok(Vec::new()),
    }
}

fn write_fields(
    store: &ObservableStore,
    owner: &FieldsOwner,
    fields: &[Field],
) -> Result<(), StudioError> {
    store.set(&owner.fields(), Some(codec::encode(&fields)?));
    Ok(())
}

fn write_node(store: &ObservableStore, node: &SchemaNode) -> Result<(), StudioError> {
    store.set(&paths::node(&node.id), Some(node.to_store_value()?));
    Ok(())
}

/// A fresh empty node of `node_type`, allocating an item node first
/// when the kind needs one. Every allocated node is written to the
/// store and recorded in `nodes`.
fn create_node(
    store: &ObservableStore,
    nodes: &mut NodeMap,
    node_type: NodeType,
) -> Result<NodeId, StudioError> {
    let kind = match node_type {
        NodeType::StringTemplate => NodeKind::empty_string_template(),
        NodeType::Number => NodeKind::empty_number(),
        NodeType::Boolean => NodeKind::empty_boolean(),
        NodeType::Object => NodeKind::empty_object(),
        NodeType::Array => {
            // Arrays are never item-less; give them a string item.
            let item_id = create_node(store, nodes, NodeType::StringTemplate)?;
            NodeKind::empty_array(item_id)
        }
    };
    let id = fresh_node_id(nodes);
    let node = SchemaNode::new(id.clone(), kind);
    write_node(store, &node)?;
    nodes.insert(id.clone(), node);
    Ok(id)
}

/// Insert a new field into `owner`'s field list, backed by a fresh node
/// of `node_type`. Returns the new node's id.
pub fn insert_field(
    store: &ObservableStore,
    owner: &FieldsOwner,
    position: InsertPosition,
    node_type: NodeType,
) -> Result<NodeId, StudioError> {
    let mut nodes = read_nodes(store)?;
    let mut fields = read_fields(store, owner)?;

    let _batch = store.batch();
    let id = create_node(store, &mut nodes, node_type)?;

    let index = match position {
        InsertPosition::Start => 0,
        InsertPosition::After(i) => (i + 1).min(fields.len()),
        InsertPosition::End => fields.len(),
    };
    fields.insert(index, Field::new(id.clone()));
    write_fields(store, owner, &fields)?;

    info!(
        target: "wording.edit",
        owner = %owner,
        index,
        node_id = %id,
        node_type = ?node_type,
        "inserted field"
    );
    Ok(id)
}

/// Remove the field at `index` from `owner`'s field list, leaving its
/// type node in the arena. Returns the removed entry.
pub fn remove_field(
    store: &ObservableStore,
    owner: &FieldsOwner,
    index: usize,
) -> Result<Field, StudioError> {
    let mut fields = read_fields(store, owner)?;
    if index >= fields.len() {
        return Err(StudioError::MissingField {
            owner: owner.to_string(),
            index,
        });
    }
    let removed = fields.remove(index);
    write_fields(store, owner, &fields)?;
    Ok(removed)
}

/// Remove the field at `index` and every node its type transitively
/// owns. Returns the deleted node ids in depth-first preorder.
pub fn remove_field_recursive(
    store: &ObservableStore,
    owner: &FieldsOwner,
    index: usize,
) -> Result<Vec<NodeId>, StudioError> {
    let mut nodes = read_nodes(store)?;

    let _batch = store.batch();
    let removed_field = remove_field(store, owner, index)?;
    let removed_ids = wording_schema::remove_recursive(&mut nodes, &removed_field.type_id);
    for id in &removed_ids {
        store.set(&paths::node(id), None);
    }

    info!(
        target: "wording.edit",
        owner = %owner,
        index,
        field_name = %removed_field.name,
        nodes_removed = removed_ids.len(),
        "removed field recursively"
    );
    Ok(removed_ids)
}

/// Replace the type of node `id` with a fresh empty `new_type` body,
/// keeping the id so every field referencing it stays valid. The old
/// body's owned subtree is deleted. Replacing a node with its current
/// type is a no-op.
///
/// Returns the deleted descendant ids.
pub fn replace_node_type(
    store: &ObservableStore,
    id: &NodeId,
    new_type: NodeType,
) -> Result<Vec<NodeId>, StudioError> {
    let mut nodes = read_nodes(store)?;
    let Some(current) = nodes.get(id) else {
        return Err(StudioError::MissingNode {
            id: id.to_string(),
        });
    };
    if current.kind.node_type() == new_type {
        return Ok(Vec::new());
    }

    let _batch = store.batch();

    // The replaced node keeps its id; only its descendants go away.
    let owned = owned_subtree(&nodes, id);
    let removed: Vec<NodeId> = owned.into_iter().filter(|owned_id| owned_id != id).collect();
    for removed_id in &removed {
        nodes.remove(removed_id);
        store.set(&paths::node(removed_id), None);
    }
    nodes.remove(id);

    let kind = match new_type {
        NodeType::StringTemplate => NodeKind::empty_string_template(),
        NodeType::Number => NodeKind::empty_number(),
        NodeType::Boolean => NodeKind::empty_boolean(),
        NodeType::Object => NodeKind::empty_object(),
        NodeType::Array => {
            let item_id = create_node(store, &mut nodes, NodeType::StringTemplate)?;
            NodeKind::empty_array(item_id)
        }
    };
    let node = SchemaNode::new(id.clone(), kind);
    write_node(store, &node)?;

    info!(
        target: "wording.edit",
        node_id = %id,
        new_type = ?new_type,
        nodes_removed = removed.len(),
        "replaced node type"
    );
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
