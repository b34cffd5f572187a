#![forbid(unsafe_code)]

//! Path-addressable observable store with copy-on-write writes.
//!
//! # Design
//!
//! [`ObservableStore`] holds one [`Value`] tree behind an
//! `Rc<RefCell<..>>` handle; cloning the store clones the handle, not the
//! tree. Reads walk the tree and return shared `Rc<Value>` pointers.
//! Writes rebuild only the spine from the root to the written path
//! (shallow one-level clones), so every untouched subtree keeps
//! referential identity across a write and every ancestor of the write
//! gets a fresh reference.
//!
//! Listeners register on a path and live in a trie of path segments.
//! A write at path `p` notifies listeners registered at `p`, at every
//! ancestor prefix of `p`, and at every descendant of `p` (a subtree
//! replaced wholesale still reaches subscribers deep inside it). Trie
//! nodes are created lazily on subscribe and pruned once they hold no
//! live listeners and no children.
//!
//! # Invariants
//!
//! 1. A write whose computed value is deeply equal to the current value
//!    is a no-op: no clone, no version bump, no notification. Derived
//!    writes (parameter sync) rely on this to terminate.
//! 2. `version` increments by exactly 1 per accepted write.
//! 3. Within one call stack, writes and their notifications happen in
//!    program order; listeners within a trie node fire in registration
//!    order.
//! 4. Values handed out by [`get`](ObservableStore::get) are read-only
//!    snapshots; all mutation goes through
//!    [`set`](ObservableStore::set)/[`update`](ObservableStore::update).
//!
//! # Failure Modes
//!
//! - **Missing intermediates on read**: `get` returns `None` the instant
//!   any step fails to resolve; it never panics.
//! - **Missing intermediates on write**: containers are auto-created
//!   (objects for key segments, null-padded arrays for index segments).
//! - **Subscriber leak**: dead `Weak` callbacks are pruned lazily while
//!   notifying, as are trie nodes left empty by pruning.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use tracing::{info, info_span};
use web_time::Instant;

use crate::batch::BatchState;
use crate::path::{Path, PathSeg};
use crate::value::Value;

/// A listener callback. Receives the path of the accepted write.
pub(crate) type ListenerRc = Rc<dyn Fn(&Path)>;
type ListenerWeak = Weak<dyn Fn(&Path)>;

/// One node in the listener trie.
struct TrieNode {
    /// Listeners registered exactly at this path. Weak so that dropping
    /// the [`Subscription`] guard unsubscribes.
    listeners: Vec<ListenerWeak>,
    children: AHashMap<PathSeg, TrieNode>,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
            children: AHashMap::new(),
        }
    }

    /// True once the node holds no live listeners and no children.
    /// Callers prune listeners (retain on liveness) before asking.
    fn is_prunable(&self) -> bool {
        self.listeners.is_empty() && self.children.is_empty()
    }
}

pub(crate) struct StoreInner {
    root: Rc<Value>,
    version: u64,
    global: Vec<ListenerWeak>,
    trie: TrieNode,
    pub(crate) batch: Option<BatchState>,
}

/// A path-addressable observable value tree.
///
/// Cloning an `ObservableStore` creates a new handle to the **same**
/// state — both handles see the same tree and share subscribers.
pub struct ObservableStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl Clone for ObservableStore {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for ObservableStore {
    fn default() -> Self {
        Self::new(Value::object())
    }
}

impl std::fmt::Debug for ObservableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableStore")
            .field("version", &inner.version)
            .field("batching", &inner.batch.is_some())
            .finish_non_exhaustive()
    }
}

/// Outcome of a copy-on-write rebuild along a path.
enum Rebuilt {
    /// Computed value deeply equal to the current one; nothing cloned.
    Unchanged,
    /// New subtree for this level (`None` means the key was deleted).
    Changed(Option<Rc<Value>>),
}

/// Rebuild the spine from `existing` down `segs`, applying `f` at the
/// leaf. Only levels on the written path are cloned; siblings keep their
/// `Rc` identity.
fn rebuild<F>(existing: Option<&Rc<Value>>, segs: &[PathSeg], f: F) -> Rebuilt
where
    F: FnOnce(Option<&Value>) -> Option<Value>,
{
    let Some((seg, rest)) = segs.split_first() else {
        let next = f(existing.map(|rc| rc.as_ref()));
        return match (existing, next) {
            (Some(old), Some(ref new)) if old.as_ref() == new => Rebuilt::Unchanged,
            (None, None) => Rebuilt::Unchanged,
            (_, next) => Rebuilt::Changed(next.map(Rc::new)),
        };
    };

    let child = existing.and_then(|value| value.child(seg));
    let child_next = match rebuild(child, rest, f) {
        Rebuilt::Unchanged => return Rebuilt::Unchanged,
        Rebuilt::Changed(next) => next,
    };

    // Shallow-clone the matching container, or auto-create one whose
    // shape follows the segment kind.
    let mut container = match (existing.map(|rc| rc.as_ref()), seg) {
        (Some(Value::Object(map)), PathSeg::Key(_)) => Value::Object(map.clone()),
        (Some(Value::Array(items)), PathSeg::Index(_)) => Value::Array(items.clone()),
        (_, PathSeg::Key(_)) => Value::object(),
        (_, PathSeg::Index(_)) => Value::array(),
    };
    match (&mut container, seg, child_next) {
        (Value::Object(map), PathSeg::Key(key), Some(next)) => {
            map.insert(key.clone(), next);
        }
        (Value::Object(map), PathSeg::Key(key), None) => {
            map.remove(key);
        }
        (Value::Array(items), PathSeg::Index(index), Some(next)) => {
            if *index >= items.len() {
                items.resize_with(*index + 1, || Rc::new(Value::Null));
            }
            items[*index] = next;
        }
        (Value::Array(items), PathSeg::Index(index), None) => {
            if *index < items.len() {
                items.remove(*index);
            }
        }
        // Container shape always matches the segment kind by construction.
        _ => {}
    }
    Rebuilt::Changed(Some(Rc::new(container)))
}

/// Walk the trie along a written path: collect live listeners on every
/// node visited, then the entire subtree under the final node. Dead weak
/// refs and empty trie nodes are pruned on the way.
fn collect_along_path(node: &mut TrieNode, segs: &[PathSeg], out: &mut Vec<ListenerRc>) {
    node.listeners.retain(|weak| weak.strong_count() > 0);
    out.extend(node.listeners.iter().filter_map(Weak::upgrade));

    match segs.split_first() {
        None => {
            for child in node.children.values_mut() {
                collect_subtree(child, out);
            }
            node.children.retain(|_, child| !child.is_prunable());
        }
        Some((seg, rest)) => {
            let mut prune = false;
            if let Some(child) = node.children.get_mut(seg) {
                collect_along_path(child, rest, out);
                prune = child.is_prunable();
            }
            if prune {
                node.children.remove(seg);
            }
        }
    }
}

fn collect_subtree(node: &mut TrieNode, out: &mut Vec<ListenerRc>) {
    node.listeners.retain(|weak| weak.strong_count() > 0);
    out.extend(node.listeners.iter().filter_map(Weak::upgrade));
    for child in node.children.values_mut() {
        collect_subtree(child, out);
    }
    node.children.retain(|_, child| !child.is_prunable());
}

impl ObservableStore {
    /// Create a store seeded with `initial`.
    #[must_use]
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                root: Rc::new(initial),
                version: 0,
                global: Vec::new(),
                trie: TrieNode::new(),
                batch: None,
            })),
        }
    }

    /// The current root value.
    #[must_use]
    pub fn root(&self) -> Rc<Value> {
        Rc::clone(&self.inner.borrow().root)
    }

    /// Value at `path`, or `None` the instant any intermediate is
    /// missing. Never panics.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Rc<Value>> {
        let inner = self.inner.borrow();
        let mut current = &inner.root;
        for seg in path.segments() {
            current = current.child(seg)?;
        }
        Some(Rc::clone(current))
    }

    /// Dot-string convenience over [`get`](Self::get).
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<Rc<Value>> {
        self.get(&Path::parse(path))
    }

    /// Write `value` at `path`. `None` deletes the key rather than
    /// storing an explicit null. Writing a deeply-equal value is a
    /// no-op: no clone, no version bump, no notification.
    pub fn set(&self, path: &Path, value: Option<Value>) {
        self.update(path, move |_| value);
    }

    /// Dot-string convenience over [`set`](Self::set).
    pub fn set_str(&self, path: &str, value: Option<Value>) {
        self.set(&Path::parse(path), value);
    }

    /// Functional write: `f` receives the current value at `path` and
    /// returns the replacement (`None` deletes). Same no-op rules as
    /// [`set`](Self::set).
    pub fn update<F>(&self, path: &Path, f: F)
    where
        F: FnOnce(Option<&Value>) -> Option<Value>,
    {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            let next_root = match rebuild(Some(&inner.root), path.segments(), f) {
                Rebuilt::Unchanged => return,
                Rebuilt::Changed(Some(root)) => root,
                // Deleting the root leaves an explicit null in place.
                Rebuilt::Changed(None) => Rc::new(Value::Null),
            };
            inner.root = next_root;
            inner.version += 1;

            let mut out: Vec<ListenerRc> = Vec::new();
            inner.global.retain(|weak| weak.strong_count() > 0);
            out.extend(inner.global.iter().filter_map(Weak::upgrade));
            collect_along_path(&mut inner.trie, path.segments(), &mut out);
            out
        };
        self.dispatch(path, listeners);
    }

    /// Subscribe to every accepted write anywhere in the tree.
    ///
    /// Returns an RAII [`Subscription`]; dropping it unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&Path) + 'static) -> Subscription {
        let strong: ListenerRc = Rc::new(callback);
        self.inner.borrow_mut().global.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Subscribe to writes at `path`, at any ancestor of `path`, and at
    /// any descendant of `path`.
    ///
    /// Returns an RAII [`Subscription`]; dropping it unsubscribes (the
    /// trie node is pruned on a later notification pass).
    pub fn subscribe_path(&self, path: &Path, callback: impl Fn(&Path) + 'static) -> Subscription {
        let strong: ListenerRc = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        let mut node = &mut inner.trie;
        for seg in path.segments() {
            node = node.children.entry(seg.clone()).or_insert_with(TrieNode::new);
        }
        node.listeners.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of accepted writes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Fire (or defer, when a batch scope is active) the collected
    /// listeners for a write at `path`.
    fn dispatch(&self, path: &Path, listeners: Vec<ListenerRc>) {
        if listeners.is_empty() {
            return;
        }

        let deferred = {
            let mut inner = self.inner.borrow_mut();
            match inner.batch.as_mut() {
                Some(batch) => {
                    batch.absorb(path, &listeners);
                    true
                }
                None => false,
            }
        };
        if deferred {
            return;
        }

        let listeners_notified = listeners.len() as u64;
        let start = Instant::now();
        let _span = info_span!(
            "store.delta",
            path = %path,
            listeners_notified,
            duration_us = tracing::field::Empty
        )
        .entered();

        for listener in &listeners {
            listener(path);
        }

        let duration_us = start.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        info!(
            target: "wording.store",
            store_propagation_duration_us = duration_us,
            listeners_notified,
            "store propagation duration histogram"
        );
    }

    pub(crate) fn inner(&self) -> &Rc<RefCell<StoreInner>> {
        &self.inner
    }
}

/// RAII guard for a registered listener.
///
/// Dropping the guard drops the strong callback reference, so the `Weak`
/// in the store's listener lists fails to upgrade on the next
/// notification pass.
pub struct Subscription {
    /// Type-erased strong reference keeping the callback `Rc` alive.
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
