#![forbid(unsafe_code)]

//! An editing session over one loaded branch.
//!
//! [`StudioSession`] seeds the store with a branch document, keeps the
//! parameter sync engine watching every template and field, and exposes
//! the edit operations the editor surface calls. Watches are rebuilt
//! after every structural edit because field indices shift and nodes
//! appear or disappear.

use std::rc::Rc;

use tracing::info;

use wording_schema::{
    coverage_report, BranchConfig, Constant, CoverageReport, NodeId, NodeKind, NodeType,
    PluralForm,
};
use wording_store::{ObservableStore, Value};

use crate::codec;
use crate::editing::{self, InsertPosition};
use crate::error::StudioError;
use crate::expansion::expand_field_name;
use crate::param_sync::ParameterSyncEngine;
use crate::paths::{self, FieldsOwner};
use crate::scheduler::IdleScheduler;

/// A live editing session: one store, one branch, one sync engine.
pub struct StudioSession {
    store: ObservableStore,
    sync: ParameterSyncEngine,
}

impl StudioSession {
    /// Load a branch into a fresh store and start watching it.
    pub fn load(
        branch: BranchConfig,
        scheduler: Rc<dyn IdleScheduler>,
    ) -> Result<Self, StudioError> {
        branch.validate()?;
        let store = ObservableStore::new(codec::encode(&branch)?);
        let session = Self {
            sync: ParameterSyncEngine::new(store.clone(), scheduler),
            store,
        };
        session.rewatch()?;
        info!(
            target: "wording.session",
            nodes = branch.schema.nodes.len(),
            locales = branch.locales.len(),
            "branch loaded"
        );
        Ok(session)
    }

    /// The underlying store. Reads and leaf writes go straight through;
    /// structural edits go through the session methods.
    #[must_use]
    pub fn store(&self) -> &ObservableStore {
        &self.store
    }

    /// Snapshot the store back into a branch document.
    pub fn save(&self) -> Result<BranchConfig, StudioError> {
        let branch: BranchConfig = codec::decode(&self.store.root())?;
        branch.validate()?;
        Ok(branch)
    }

    /// Rebuild every sync watch from current store state.
    pub fn rewatch(&self) -> Result<(), StudioError> {
        self.sync.clear_watches();

        let nodes = editing::read_nodes(&self.store)?;
        for (id, node) in &nodes {
            match &node.kind {
                NodeKind::StringTemplate { .. } => self.sync.watch_template(id),
                NodeKind::Object { fields } => {
                    let owner = FieldsOwner::Node(id.clone());
                    for index in 0..fields.len() {
                        self.sync.watch_field(&owner, index);
                    }
                }
                _ => {}
            }
        }
        let root_fields = editing::read_fields(&self.store, &FieldsOwner::Root)?;
        for index in 0..root_fields.len() {
            self.sync.watch_field(&FieldsOwner::Root, index);
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Leaf edits
    // -----------------------------------------------------------------

    /// Set a single-form template text for one locale.
    pub fn set_template_text(&self, id: &NodeId, locale: &str, text: &str) {
        self.store
            .set(&paths::node_instance(id, locale), Some(Value::from(text)));
    }

    /// Set one plural form of a pluralized template for one locale.
    pub fn set_plural_text(&self, id: &NodeId, locale: &str, form: PluralForm, text: &str) {
        self.store
            .set(&paths::plural_instance(id, locale, form), Some(Value::from(text)));
    }

    /// Rename a field.
    pub fn set_field_name(&self, owner: &FieldsOwner, index: usize, name: &str) {
        self.store
            .set(&paths::field_name(owner, index), Some(Value::from(name)));
    }

    // -----------------------------------------------------------------
    // Structural edits
    // -----------------------------------------------------------------

    /// Insert a new field backed by a fresh node. Returns the node id.
    pub fn insert_field(
        &self,
        owner: &FieldsOwner,
        position: InsertPosition,
        node_type: NodeType,
    ) -> Result<NodeId, StudioError> {
        let id = editing::insert_field(&self.store, owner, position, node_type)?;
        self.rewatch()?;
        Ok(id)
    }

    /// Remove a field and the subtree its type node owns.
    pub fn remove_field_recursive(
        &self,
        owner: &FieldsOwner,
        index: usize,
    ) -> Result<Vec<NodeId>, StudioError> {
        let removed = editing::remove_field_recursive(&self.store, owner, index)?;
        self.rewatch()?;
        Ok(removed)
    }

    /// Replace a node's type in place, keeping its id.
    pub fn replace_node_type(
        &self,
        id: &NodeId,
        new_type: NodeType,
    ) -> Result<Vec<NodeId>, StudioError> {
        let removed = editing::replace_node_type(&self.store, id, new_type)?;
        self.rewatch()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Per-locale instance coverage of the current schema.
    pub fn coverage(&self) -> Result<CoverageReport, StudioError> {
        let nodes = editing::read_nodes(&self.store)?;
        let root_fields = editing::read_fields(&self.store, &FieldsOwner::Root)?;
        let locales = self.read_locales()?;
        Ok(coverage_report(&nodes, &root_fields, &locales))
    }

    /// Concrete name possibilities of one field.
    pub fn field_name_possibilities(
        &self,
        owner: &FieldsOwner,
        index: usize,
    ) -> Result<Vec<String>, StudioError> {
        let fields = editing::read_fields(&self.store, owner)?;
        let Some(field) = fields.get(index) else {
            return Err(StudioError::MissingField {
                owner: owner.to_string(),
                index,
            });
        };
        let constants = self.read_constants()?;
        Ok(expand_field_name(
            &field.name,
            field.params.as_ref(),
            &constants,
        ))
    }

    fn read_constants(&self) -> Result<Vec<Constant>, StudioError> {
        match self.store.get(&paths::constants()) {
            Some(value) => codec::decode(&value),
            None => Ok(Vec::new()),
        }
    }

    fn read_locales(&self) -> Result<Vec<String>, StudioError> {
        match self.store.get(&paths::locales()) {
            Some(value) => codec::decode(&value),
            None => Ok(Vec::new()),
        }
    }
}

impl std::fmt::Debug for StudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioSession")
            .field("store", &self.store)
            .field("sync", &self.sync)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
