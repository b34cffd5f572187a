//! Property-based invariant tests for the observable store.
//!
//! Verifies structural guarantees of path writes and notification:
//!
//! 1. Write/read round-trip at arbitrary paths
//! 2. Deleting a written path makes it unreadable again
//! 3. Deep-equal writes never notify (no-op suppression)
//! 4. Writes leave unrelated subtrees referentially identical
//! 5. Ancestor subscribers fire on descendant writes; disjoint ones stay silent
//! 6. Version increments once per accepted write

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use wording_store::{ObservableStore, Path, Value};

// ── Helpers ──────────────────────────────────────────────────────────

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-d][a-z]{0,2}"
}

fn path_strategy() -> impl Strategy<Value = Path> {
    prop::collection::vec(key_strategy(), 1..=4)
        .prop_map(|keys| keys.into_iter().fold(Path::root(), Path::key))
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        (-1_000_000i64..=1_000_000).prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Write/read round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn write_read_round_trip(path in path_strategy(), value in scalar_strategy()) {
        let store = ObservableStore::default();
        store.set(&path, Some(value.clone()));
        let read = store.get(&path);
        prop_assert!(read.is_some(), "written path must be readable");
        let read = read.unwrap();
        prop_assert_eq!(read.as_ref(), &value);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Delete makes the path unreadable
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn delete_round_trip(path in path_strategy(), value in scalar_strategy()) {
        let store = ObservableStore::default();
        store.set(&path, Some(value));
        store.set(&path, None);
        prop_assert!(store.get(&path).is_none(), "deleted path must read as absent");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. No-op suppression
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn deep_equal_write_never_notifies(path in path_strategy(), value in scalar_strategy()) {
        let store = ObservableStore::default();
        store.set(&path, Some(value.clone()));

        let hits = Rc::new(Cell::new(0u32));
        let hits_clone = Rc::clone(&hits);
        let _sub = store.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));

        let version = store.version();
        store.set(&path, Some(value));
        prop_assert_eq!(hits.get(), 0, "equal write must not notify");
        prop_assert_eq!(store.version(), version, "equal write must not bump version");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Unrelated subtree reference stability
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn unrelated_subtree_keeps_identity(
        path in path_strategy(),
        value in scalar_strategy(),
        other in scalar_strategy(),
    ) {
        let store = ObservableStore::default();
        // "zz" is outside the [a-d]-prefixed key alphabet, so `path`
        // can never write under it.
        let stable = Path::root().key("zz").key("stable");
        store.set(&stable, Some(other));
        let before = store.get(&Path::root().key("zz")).unwrap();

        store.set(&path, Some(value));

        let after = store.get(&Path::root().key("zz")).unwrap();
        prop_assert!(Rc::ptr_eq(&before, &after), "unrelated subtree must keep identity");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Subscription scope
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ancestor_fires_disjoint_stays_silent(
        prefix in key_strategy(),
        rest in prop::collection::vec(key_strategy(), 0..=3),
        value in scalar_strategy(),
    ) {
        let store = ObservableStore::default();

        let ancestor_hits = Rc::new(Cell::new(0u32));
        let disjoint_hits = Rc::new(Cell::new(0u32));
        let a_clone = Rc::clone(&ancestor_hits);
        let d_clone = Rc::clone(&disjoint_hits);

        let _sa = store.subscribe_path(
            &Path::root().key(prefix.clone()),
            move |_| a_clone.set(a_clone.get() + 1),
        );
        let _sd = store.subscribe_path(
            &Path::root().key("zz"),
            move |_| d_clone.set(d_clone.get() + 1),
        );

        let written = rest.into_iter().fold(Path::root().key(prefix), Path::key);
        store.set(&written, Some(value));

        prop_assert_eq!(ancestor_hits.get(), 1, "ancestor subscriber must fire");
        prop_assert_eq!(disjoint_hits.get(), 0, "disjoint subscriber must stay silent");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Version increments once per accepted write
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn version_monotonic_per_accepted_write(
        writes in prop::collection::vec((path_strategy(), scalar_strategy()), 1..=8),
    ) {
        let store = ObservableStore::default();
        let mut expected = 0u64;
        for (path, value) in writes {
            let before = store.get(&path);
            let accepted = before.map_or(true, |current| current.as_ref() != &value);
            store.set(&path, Some(value));
            if accepted {
                expected += 1;
            }
            prop_assert_eq!(store.version(), expected);
        }
    }
}
