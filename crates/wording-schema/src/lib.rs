#![forbid(unsafe_code)]

//! Schema model for a localization project.
//!
//! A project's wording schema is a flat arena of typed nodes referenced
//! by id, rooted at an object whose fields name the top-level wordings.
//! This crate defines the node and constant wire types, placeholder
//! extraction from template text, the two-form plural model, the
//! ownership-aware graph operations (transitive subtree walks and
//! recursive deletion), per-locale coverage reporting, and the branch
//! document that persists all of it.
//!
//! # Design
//!
//! - Wire types are plain serde structs/enums; the arena is a
//!   `BTreeMap` so serialization order is stable.
//! - Graph operations never panic on missing ids. Dangling references
//!   are a reportable condition, not a hard error, because live editing
//!   passes through transiently inconsistent states.
//! - Validation is a persistence-boundary concern; in-session lookups
//!   fail soft.

pub mod branch;
pub mod constants;
pub mod coverage;
pub mod error;
pub mod graph;
pub mod node;
pub mod placeholder;
pub mod plural;

pub use branch::{BranchConfig, BranchSchema, RootObject};
pub use constants::{enum_options, find_constant, validate_constants, Constant};
pub use coverage::{coverage_report, CoverageReport, LocaleCoverage};
pub use error::SchemaError;
pub use graph::{
    dangling_references, fresh_node_id, owned_subtree, remove_recursive, NodeMap,
};
pub use node::{
    Field, NodeId, NodeKind, NodeType, ParamDef, SchemaNode, TemplateValue, TemplateVariant,
};
pub use placeholder::{extract_placeholders, placeholder_set};
pub use plural::{form_for, PluralForm, PluralForms};
