#![forbid(unsafe_code)]

//! Idle-time work scheduling for derived writes.
//!
//! Parameter sync runs off the editing hot path: each dirty node
//! schedules a keyed re-derivation, and scheduling the same key again
//! before it runs replaces the pending work (latest wins) without
//! changing its position in the queue. The trait keeps the host's idea
//! of "idle" out of the engine; tests use [`ImmediateScheduler`], an
//! embedding host drains a [`CoalescingScheduler`] when it has a frame
//! to spare.

use std::cell::RefCell;

type Work = Box<dyn FnOnce()>;

/// Deferred keyed work.
pub trait IdleScheduler {
    /// Schedule `work` under `key`. A pending entry with the same key is
    /// replaced in place; its queue position is kept.
    fn schedule(&self, key: &str, work: Work);

    /// Drop pending work under `key`, if any.
    fn cancel(&self, key: &str);
}

/// Runs everything synchronously at the call site. For tests and hosts
/// without an idle phase.
#[derive(Debug, Default)]
pub struct ImmediateScheduler;

impl IdleScheduler for ImmediateScheduler {
    fn schedule(&self, _key: &str, work: Work) {
        work();
    }

    fn cancel(&self, _key: &str) {}
}

/// Queues keyed work until the host drains it.
#[derive(Default)]
pub struct CoalescingScheduler {
    pending: RefCell<Vec<(String, Work)>>,
}

impl CoalescingScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all pending work in first-enqueue order. Work scheduled by
    /// running work lands in the next drain.
    pub fn run_pending(&self) {
        let drained = std::mem::take(&mut *self.pending.borrow_mut());
        for (_, work) in drained {
            work();
        }
    }

    /// Number of distinct keys currently queued.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl IdleScheduler for CoalescingScheduler {
    fn schedule(&self, key: &str, work: Work) {
        let mut pending = self.pending.borrow_mut();
        if let Some(slot) = pending.iter_mut().find(|(k, _)| k == key) {
            slot.1 = work;
        } else {
            pending.push((key.to_string(), work));
        }
    }

    fn cancel(&self, key: &str) {
        self.pending.borrow_mut().retain(|(k, _)| k != key);
    }
}

impl std::fmt::Debug for CoalescingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoalescingScheduler")
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
