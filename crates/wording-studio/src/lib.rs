#![forbid(unsafe_code)]

//! Editing sessions for localization branches.
//!
//! This crate wires the observable store and the schema model into a
//! working editor core: a [`StudioSession`] loads a branch document
//! into the store, watches template texts and field names so parameter
//! maps stay derived, expands templated field names across enum
//! constants, and applies structural edits (field insertion, recursive
//! removal, node type replacement) as single coalesced notification
//! waves.
//!
//! # Design
//!
//! - The store is the single source of truth while a session is live;
//!   [`BranchConfig`](wording_schema::BranchConfig) is only the
//!   load/save snapshot.
//! - Derived writes (parameter sync) run through an [`IdleScheduler`]
//!   so bursts of typing coalesce into one re-derivation per node.
//! - Read paths fail soft and log; write paths return [`StudioError`].

pub mod codec;
pub mod editing;
pub mod error;
pub mod expansion;
pub mod param_sync;
pub mod paths;
pub mod scheduler;
pub mod session;

pub use editing::InsertPosition;
pub use error::StudioError;
pub use expansion::expand_field_name;
pub use param_sync::{derive_field_name_params, derive_template_params, ParameterSyncEngine};
pub use paths::FieldsOwner;
pub use scheduler::{CoalescingScheduler, IdleScheduler, ImmediateScheduler};
pub use session::StudioSession;
