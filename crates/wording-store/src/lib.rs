#![forbid(unsafe_code)]

//! Path-addressable observable store for Wording Studio.
//!
//! Holds one arbitrarily nested [`Value`] tree; supports reading and
//! writing at a typed key [`Path`], notifies exactly the listeners whose
//! registered path is an ancestor, the target, or a descendant of a
//! write, and guarantees that unrelated subtrees keep referential
//! identity across a write (copy-on-write spine rebuilds).
//!
//! # Role in Wording Studio
//!
//! The store is the single in-memory home of an editing session's schema
//! and locale data. Editors mutate it through [`ObservableStore::set`]
//! and friends; derivation engines subscribe to the paths they depend on
//! and rely on the store's deep-equality no-op suppression to terminate.
//!
//! # How it fits in the system
//!
//! This crate is schema-agnostic: it knows nothing about wording nodes or
//! locales. Type safety of paths is the consuming layer's responsibility
//! (see `wording-studio`'s typed path builders).

pub mod batch;
pub mod path;
pub mod store;
pub mod value;

pub use batch::BatchScope;
pub use path::{Path, PathSeg};
pub use store::{ObservableStore, Subscription};
pub use value::Value;
