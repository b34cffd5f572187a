#![forbid(unsafe_code)]

//! Ownership-aware operations on the flat node map.
//!
//! The node map is an arena keyed by [`NodeId`]; ownership flows through
//! exactly two reference kinds: `object.fields[].typeId` and
//! `array.itemTypeId`. The transitive ownership walk lives in one place
//! ([`owned_subtree`]) so the no-orphans invariant is enforced by a
//! single, testable traversal rather than scattered inline recursion.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::warn;

use crate::node::{Field, NodeId, NodeKind, SchemaNode};

/// The flat schema node arena.
pub type NodeMap = BTreeMap<NodeId, SchemaNode>;

/// Ids a node references directly (one hop).
fn direct_references(kind: &NodeKind) -> Vec<&NodeId> {
    match kind {
        NodeKind::Object { fields } => fields.iter().map(|field| &field.type_id).collect(),
        NodeKind::Array { item_type_id, .. } => vec![item_type_id],
        _ => Vec::new(),
    }
}

/// Every node transitively owned by `id`, including `id` itself when
/// present, in depth-first preorder. Cycle-safe: a node is visited once.
#[must_use]
pub fn owned_subtree(nodes: &NodeMap, id: &NodeId) -> Vec<NodeId> {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut out: Vec<NodeId> = Vec::new();
    let mut stack: Vec<NodeId> = vec![id.clone()];
    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        let Some(node) = nodes.get(&current) else {
            continue;
        };
        out.push(current);
        // Push in reverse so preorder matches field order.
        for child in direct_references(&node.kind).into_iter().rev() {
            stack.push(child.clone());
        }
    }
    out
}

/// Remove `id` and every node it transitively owns. Returns the removed
/// ids (depth-first preorder).
pub fn remove_recursive(nodes: &mut NodeMap, id: &NodeId) -> Vec<NodeId> {
    let removed = owned_subtree(nodes, id);
    for removed_id in &removed {
        nodes.remove(removed_id);
    }
    removed
}

/// References that do not resolve to a live node map entry. Each entry
/// pairs a human-readable owner label with the missing target id.
///
/// Dangling references are a defect but not a hard failure — in-flight
/// edits pass through transiently inconsistent states.
#[must_use]
pub fn dangling_references(nodes: &NodeMap, root_fields: &[Field]) -> Vec<(String, NodeId)> {
    let mut out: Vec<(String, NodeId)> = Vec::new();

    let mut check = |owner: String, target: &NodeId| {
        if !nodes.contains_key(target) {
            warn!(
                target: "wording.schema",
                owner = %owner,
                node_id = %target,
                "dangling schema node reference"
            );
            out.push((owner, target.clone()));
        }
    };

    for (index, field) in root_fields.iter().enumerate() {
        check(format!("root.fields[{index}]"), &field.type_id);
    }
    for (id, node) in nodes {
        match &node.kind {
            NodeKind::Object { fields } => {
                for (index, field) in fields.iter().enumerate() {
                    check(format!("{id}.fields[{index}]"), &field.type_id);
                }
            }
            NodeKind::Array { item_type_id, .. } => {
                check(format!("{id}.itemTypeId"), item_type_id);
            }
            _ => {}
        }
    }
    out
}

/// Allocate a node id not present in the map (`n1`, `n2`, ...).
#[must_use]
pub fn fresh_node_id(nodes: &NodeMap) -> NodeId {
    let mut next: u64 = nodes.len() as u64 + 1;
    loop {
        let candidate = NodeId::new(format!("n{next}"));
        if !nodes.contains_key(&candidate) {
            return candidate;
        }
        next += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn object_node(id: &str, field_types: &[&str]) -> SchemaNode {
        SchemaNode::new(
            id,
            NodeKind::Object {
                fields: field_types
                    .iter()
                    .map(|type_id| Field::new(NodeId::from(*type_id)))
                    .collect(),
            },
        )
    }

    fn sample_nodes() -> NodeMap {
        // parent(object) -> { X: string-template, Y: array(item Z) }
        let mut nodes = NodeMap::new();
        nodes.insert(NodeId::from("parent"), object_node("parent", &["X", "Y"]));
        nodes.insert(
            NodeId::from("X"),
            SchemaNode::new("X", NodeKind::empty_string_template()),
        );
        nodes.insert(
            NodeId::from("Y"),
            SchemaNode::new("Y", NodeKind::empty_array(NodeId::from("Z"))),
        );
        nodes.insert(
            NodeId::from("Z"),
            SchemaNode::new("Z", NodeKind::empty_string_template()),
        );
        nodes
    }

    #[test]
    fn owned_subtree_is_transitive_preorder() {
        let nodes = sample_nodes();
        let owned = owned_subtree(&nodes, &NodeId::from("parent"));
        assert_eq!(
            owned,
            vec![
                NodeId::from("parent"),
                NodeId::from("X"),
                NodeId::from("Y"),
                NodeId::from("Z"),
            ]
        );
    }

    #[test]
    fn remove_recursive_leaves_no_orphans() {
        let mut nodes = sample_nodes();
        nodes.insert(
            NodeId::from("unrelated"),
            SchemaNode::new("unrelated", NodeKind::empty_number()),
        );

        let removed = remove_recursive(&mut nodes, &NodeId::from("parent"));
        assert_eq!(removed.len(), 4);
        assert_eq!(nodes.len(), 1);
        assert!(nodes.contains_key(&NodeId::from("unrelated")));
    }

    #[test]
    fn removal_tolerates_missing_target() {
        let mut nodes = sample_nodes();
        let removed = remove_recursive(&mut nodes, &NodeId::from("ghost"));
        assert!(removed.is_empty());
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn cyclic_references_terminate() {
        let mut nodes = NodeMap::new();
        nodes.insert(NodeId::from("a"), object_node("a", &["b"]));
        nodes.insert(NodeId::from("b"), object_node("b", &["a"]));
        let owned = owned_subtree(&nodes, &NodeId::from("a"));
        assert_eq!(owned.len(), 2);
    }

    #[test]
    fn dangling_reference_detection() {
        let mut nodes = sample_nodes();
        nodes.remove(&NodeId::from("Z"));
        let root_fields = vec![Field::new(NodeId::from("parent")), Field::new(NodeId::from("gone"))];

        let dangling = dangling_references(&nodes, &root_fields);
        let targets: Vec<&NodeId> = dangling.iter().map(|(_, id)| id).collect();
        assert!(targets.contains(&&NodeId::from("Z")));
        assert!(targets.contains(&&NodeId::from("gone")));
        assert_eq!(dangling.len(), 2);
    }

    #[test]
    fn fresh_id_skips_existing() {
        let mut nodes = NodeMap::new();
        nodes.insert(
            NodeId::from("n1"),
            SchemaNode::new("n1", NodeKind::empty_number()),
        );
        nodes.insert(
            NodeId::from("n2"),
            SchemaNode::new("n2", NodeKind::empty_number()),
        );
        let id = fresh_node_id(&nodes);
        assert!(!nodes.contains_key(&id));
    }
}
