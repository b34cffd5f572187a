#![forbid(unsafe_code)]

//! Batch coalescing for store notifications.
//!
//! A structural edit is a chain of several store writes. Without
//! coalescing, a listener registered on an affected path fires once per
//! write. A [`BatchScope`] defers all notifications until the scope
//! exits, then fires each distinct listener at most once.
//!
//! # Invariants
//!
//! 1. Nested scopes are supported: only the outermost scope flushes.
//! 2. Within a batch, reads always see the latest written values —
//!    values apply immediately, only notifications defer.
//! 3. A listener collected by several writes fires once, with the path
//!    of the latest write that collected it, at its first-enqueue
//!    position.
//!
//! # Failure Modes
//!
//! - **Listener panics during flush**: remaining listeners still run;
//!   the first panic is re-raised after all have been attempted.

use std::rc::Rc;

use tracing::{info, info_span};
use web_time::Instant;

use crate::path::Path;
use crate::store::{ListenerRc, ObservableStore};

/// One deferred notification, keyed by callback identity.
struct QueuedNotify {
    key: usize,
    listener: ListenerRc,
    path: Path,
}

/// Per-store batch bookkeeping. Lives inside the store while at least
/// one [`BatchScope`] is open.
pub(crate) struct BatchState {
    depth: u32,
    queued: Vec<QueuedNotify>,
    writes: u64,
}

impl BatchState {
    fn new() -> Self {
        Self {
            depth: 1,
            queued: Vec::new(),
            writes: 0,
        }
    }

    /// Record one accepted write's listeners. A listener already queued
    /// keeps its position; its path is replaced so the latest write wins.
    pub(crate) fn absorb(&mut self, path: &Path, listeners: &[ListenerRc]) {
        self.writes += 1;
        for listener in listeners {
            let key = Rc::as_ptr(listener) as *const () as usize;
            if let Some(entry) = self.queued.iter_mut().find(|entry| entry.key == key) {
                entry.path = path.clone();
            } else {
                self.queued.push(QueuedNotify {
                    key,
                    listener: Rc::clone(listener),
                    path: path.clone(),
                });
            }
        }
    }
}

impl ObservableStore {
    /// Open a batch scope on this store. While the scope (or any nested
    /// scope) is alive, writes apply immediately but notifications are
    /// deferred and coalesced per listener.
    #[must_use]
    pub fn batch(&self) -> BatchScope {
        let is_root = {
            let mut inner = self.inner().borrow_mut();
            match inner.batch.as_mut() {
                Some(batch) => {
                    batch.depth += 1;
                    false
                }
                None => {
                    inner.batch = Some(BatchState::new());
                    true
                }
            }
        };
        BatchScope {
            store: self.clone(),
            is_root,
        }
    }

    fn flush_batch(&self) {
        let Some(state) = self.inner().borrow_mut().batch.take() else {
            return;
        };
        if state.queued.is_empty() {
            return;
        }

        let listeners_notified = state.queued.len() as u64;
        let writes_coalesced = state.writes;
        let start = Instant::now();
        let _span = info_span!(
            "store.delta",
            writes_coalesced,
            listeners_notified,
            duration_us = tracing::field::Empty
        )
        .entered();

        // Run every queued listener even if one panics; re-raise the
        // first panic afterwards.
        let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;
        for entry in state.queued {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                (entry.listener)(&entry.path);
            }));
            if let Err(payload) = result
                && first_panic.is_none()
            {
                first_panic = Some(payload);
            }
        }

        let duration_us = start.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        info!(
            target: "wording.store",
            store_propagation_duration_us = duration_us,
            writes_coalesced,
            listeners_notified,
            "batched store propagation duration histogram"
        );

        if let Some(payload) = first_panic {
            std::panic::resume_unwind(payload);
        }
    }
}

/// RAII guard for a batch scope. Dropping the outermost guard flushes
/// all deferred notifications.
pub struct BatchScope {
    store: ObservableStore,
    is_root: bool,
}

impl BatchScope {
    /// Number of distinct listeners queued so far.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.store
            .inner()
            .borrow()
            .batch
            .as_ref()
            .map_or(0, |batch| batch.queued.len())
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let should_flush = {
            let mut inner = self.store.inner().borrow_mut();
            match inner.batch.as_mut() {
                Some(batch) => {
                    batch.depth -= 1;
                    batch.depth == 0
                }
                None => false,
            }
        };
        if should_flush {
            self.store.flush_batch();
        }
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("is_root", &self.is_root)
            .field("pending", &self.pending_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
