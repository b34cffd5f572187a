#![forbid(unsafe_code)]

//! Derivation of parameter maps from template text.
//!
//! Parameter maps are never hand-edited; they are a projection of the
//! `{name}` placeholders in the authoritative text. Template nodes
//! derive from the union of every locale's instance texts (both forms
//! for pluralized templates), field entries derive from the field name.
//! Existing definitions are reused by name so a user-chosen type
//! survives text edits; placeholders that disappear drop their
//! definition, with one exception: a pluralized template keeps
//! number-typed definitions even when no text mentions them, because
//! the count drives form selection without having to appear in the
//! singular text.
//!
//! The engine half watches store paths and schedules keyed
//! re-derivations. Derived writes go through the same store writes as
//! user edits; deep-equality no-op suppression is what makes the cycle
//! (text write, derive, params write) terminate.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, warn};

use wording_schema::{extract_placeholders, NodeId, NodeKind, ParamDef, SchemaNode};
use wording_store::{ObservableStore, Subscription};

use crate::codec;
use crate::paths::{self, FieldsOwner};
use crate::scheduler::IdleScheduler;

/// Rebuild a parameter map for `names`, reusing definitions from
/// `existing` by name and defaulting the rest. An empty map becomes
/// `None` (absent on the wire).
fn rebuild_params<F>(
    names: &[String],
    existing: Option<&BTreeMap<String, ParamDef>>,
    default_for: F,
) -> Option<BTreeMap<String, ParamDef>>
where
    F: Fn(&str) -> ParamDef,
{
    if names.is_empty() {
        return None;
    }
    let map: BTreeMap<String, ParamDef> = names
        .iter()
        .map(|name| {
            let def = existing
                .and_then(|map| map.get(name))
                .cloned()
                .unwrap_or_else(|| default_for(name));
            (name.clone(), def)
        })
        .collect();
    Some(map)
}

/// Derive the parameter map of a string-template node from its current
/// instance texts. Non-template kinds derive nothing.
#[must_use]
pub fn derive_template_params(kind: &NodeKind) -> Option<BTreeMap<String, ParamDef>> {
    let NodeKind::StringTemplate {
        params,
        variant,
        instances,
    } = kind
    else {
        return None;
    };

    let mut names: Vec<String> = Vec::new();
    if let Some(instances) = instances {
        for value in instances.values() {
            for text in value.texts() {
                for name in extract_placeholders(text) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
    }

    // A pluralized template's count parameter need not appear in any
    // text; keep number-typed definitions alive across text edits.
    if variant.is_some()
        && let Some(existing) = params
    {
        for (name, def) in existing {
            if matches!(def, ParamDef::Number) && !names.contains(name) {
                names.push(name.clone());
            }
        }
    }

    rebuild_params(&names, params.as_ref(), |_| ParamDef::String)
}

/// Derive the parameter map of a field entry from its name. Placeholder
/// names in field names default to constant references of the same
/// name.
#[must_use]
pub fn derive_field_name_params(
    name: &str,
    existing: Option<&BTreeMap<String, ParamDef>>,
) -> Option<BTreeMap<String, ParamDef>> {
    let names = extract_placeholders(name);
    rebuild_params(&names, existing, |placeholder| ParamDef::Constant {
        name: placeholder.to_string(),
    })
}

/// Watches template texts and field names, re-deriving parameter maps
/// off the hot path.
pub struct ParameterSyncEngine {
    store: ObservableStore,
    scheduler: Rc<dyn IdleScheduler>,
    watches: RefCell<Vec<Subscription>>,
}

impl ParameterSyncEngine {
    #[must_use]
    pub fn new(store: ObservableStore, scheduler: Rc<dyn IdleScheduler>) -> Self {
        Self {
            store,
            scheduler,
            watches: RefCell::new(Vec::new()),
        }
    }

    /// Drop every active watch.
    pub fn clear_watches(&self) {
        self.watches.borrow_mut().clear();
    }

    /// Number of active watches.
    #[must_use]
    pub fn watch_count(&self) -> usize {
        self.watches.borrow().len()
    }

    /// Watch a string-template node's instances and parameter map; a
    /// text edit or an out-of-band params write schedules a
    /// re-derivation of the node's parameter map.
    ///
    /// The derived write re-triggers the params watch once; the
    /// re-derivation then produces an equal map and the store suppresses
    /// the write, so the chain stops there.
    pub fn watch_template(&self, id: &NodeId) {
        let key = format!("params:{id}");
        for path in [paths::node_instances(id), paths::node_params(id)] {
            let store = self.store.clone();
            let scheduler = Rc::clone(&self.scheduler);
            let id = id.clone();
            let key = key.clone();

            let sub = self.store.subscribe_path(&path, move |_| {
                let store = store.clone();
                let id = id.clone();
                scheduler.schedule(&key, Box::new(move || sync_template_params(&store, &id)));
            });
            self.watches.borrow_mut().push(sub);
        }
    }

    /// Watch a field entry's name and parameter map; a rename or an
    /// out-of-band params write schedules a re-derivation of the
    /// entry's parameter map.
    pub fn watch_field(&self, owner: &FieldsOwner, index: usize) {
        let key = format!("field-params:{owner}:{index}");
        for path in [
            paths::field_name(owner, index),
            paths::field_params(owner, index),
        ] {
            let store = self.store.clone();
            let scheduler = Rc::clone(&self.scheduler);
            let owner = owner.clone();
            let key = key.clone();

            let sub = self.store.subscribe_path(&path, move |_| {
                let store = store.clone();
                let owner = owner.clone();
                scheduler.schedule(
                    &key,
                    Box::new(move || sync_field_params(&store, &owner, index)),
                );
            });
            self.watches.borrow_mut().push(sub);
        }
    }
}

impl std::fmt::Debug for ParameterSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSyncEngine")
            .field("watches", &self.watches.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Re-derive one template node's parameter map from live store state.
fn sync_template_params(store: &ObservableStore, id: &NodeId) {
    let Some(value) = store.get(&paths::node(id)) else {
        // Node deleted between the edit and the idle slot.
        debug!(target: "wording.sync", node_id = %id, "skipping sync of deleted node");
        return;
    };
    let node = match SchemaNode::from_store_value(id, &value) {
        Ok(node) => node,
        Err(err) => {
            warn!(
                target: "wording.sync",
                node_id = %id,
                error = %err,
                "skipping sync of malformed node"
            );
            return;
        }
    };

    let derived = derive_template_params(&node.kind);
    write_params(store, &paths::node_params(id), derived);
}

/// Re-derive one field entry's parameter map from live store state.
fn sync_field_params(store: &ObservableStore, owner: &FieldsOwner, index: usize) {
    let Some(name_value) = store.get(&paths::field_name(owner, index)) else {
        debug!(
            target: "wording.sync",
            owner = %owner,
            index,
            "skipping sync of removed field"
        );
        return;
    };
    let Some(name) = name_value.as_str() else {
        warn!(
            target: "wording.sync",
            owner = %owner,
            index,
            "field name is not a string, skipping sync"
        );
        return;
    };

    let existing: Option<BTreeMap<String, ParamDef>> = store
        .get(&paths::field_params(owner, index))
        .and_then(|value| codec::decode_soft(&value, "field params"));
    let derived = derive_field_name_params(name, existing.as_ref());
    write_params(store, &paths::field_params(owner, index), derived);
}

fn write_params(
    store: &ObservableStore,
    path: &wording_store::Path,
    derived: Option<BTreeMap<String, ParamDef>>,
) {
    let encoded = match derived {
        None => None,
        Some(map) => match codec::encode(&map) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    target: "wording.sync",
                    path = %path,
                    error = %err,
                    "derived params failed to encode"
                );
                return;
            }
        },
    };
    store.set(path, encoded);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
