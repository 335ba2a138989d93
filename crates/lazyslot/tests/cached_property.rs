// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the unguarded accessor.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier, LazyLock};
use std::thread;

use lazyslot::{CachedProperty, Error, HasSlots, Slots};

type TestResult = Result<(), Error>;

#[derive(Debug, Default)]
struct Check {
    total: AtomicU32,
    slots: Slots,
}

impl Check {
    fn add(&self) -> u32 {
        self.total.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn total(&self) -> u32 {
        self.total.load(Ordering::SeqCst)
    }
}

impl HasSlots for Check {
    fn slots(&self) -> &Slots {
        &self.slots
    }
}

static ADD_CACHED: LazyLock<CachedProperty<Check, u32>> = LazyLock::new(|| CachedProperty::new("add_cached", Check::add));

#[test]
fn nothing_is_added_after_the_first_read() {
    let check = Check::default();

    assert_eq!(ADD_CACHED.get(&check), 1);
    assert_eq!(ADD_CACHED.get(&check), 1);
    assert_eq!(check.total(), 1);
}

#[test]
fn deleting_and_reading_recomputes() {
    let check = Check::default();

    // Deleting before the first read does nothing.
    ADD_CACHED.delete(&check);
    assert!(!ADD_CACHED.is_cached(&check));

    assert_eq!(ADD_CACHED.get(&check), 1);
    ADD_CACHED.delete(&check);
    assert_eq!(ADD_CACHED.get(&check), 2);
    assert_eq!(ADD_CACHED.get(&check), 2);
}

#[test]
fn set_replaces_value_without_computing() {
    let check = Check::default();

    ADD_CACHED.set(&check, 3);
    assert_eq!(ADD_CACHED.get(&check), 3);
    assert_eq!(check.total(), 0);

    ADD_CACHED.delete(&check);
    assert_eq!(ADD_CACHED.get(&check), 1);
}

#[test]
fn each_instance_has_its_own_value() {
    let first = Check::default();
    let second = Check::default();

    assert_eq!(ADD_CACHED.get(&first), 1);
    assert_eq!(ADD_CACHED.get(&first), 1);
    assert!(!ADD_CACHED.is_cached(&second));
    assert_eq!(ADD_CACHED.get(&second), 1);

    ADD_CACHED.delete(&first);
    assert!(ADD_CACHED.is_cached(&second));
}

#[test]
fn none_is_remembered() {
    let calls = Arc::new(AtomicU32::new(0));
    let counted = Arc::clone(&calls);
    let cached_total = CachedProperty::new("cached_total", move |_: &Check| {
        counted.fetch_add(1, Ordering::SeqCst);
        None::<u32>
    });
    let check = Check::default();

    assert_eq!(cached_total.get(&check), None);
    assert_eq!(cached_total.get(&check), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failure_leaves_no_value_behind() -> TestResult {
    let parsed = CachedProperty::builder("parsed").try_build(|check: &Check| {
        if check.add() < 2 {
            Err("not ready")
        } else {
            Ok(check.total() * 10)
        }
    })?;
    let check = Check::default();

    assert_eq!(parsed.try_get(&check), Err("not ready"));
    assert!(!parsed.is_cached(&check));
    assert_eq!(parsed.try_get(&check), Ok(20));
    assert_eq!(parsed.try_get(&check), Ok(20));
    assert_eq!(check.total(), 2);
    Ok(())
}

#[test]
fn panic_in_compute_leaves_no_value_behind() {
    let fragile = CachedProperty::new("fragile", |check: &Check| {
        assert!(check.add() > 1, "first computation panics");
        check.total()
    });
    let check = Check::default();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| fragile.get(&check)));
    assert!(outcome.is_err());
    assert!(!fragile.is_cached(&check));
    assert_eq!(fragile.get(&check), 2);
}

#[test]
fn racing_threads_without_guard_each_compute() {
    const THREADS: usize = 4;

    let start = Arc::new(Barrier::new(THREADS));
    let inside = Arc::clone(&start);
    let racy = CachedProperty::new("racy", move |check: &Check| {
        // Every thread enters the compute function before any of them stores a value.
        inside.wait();
        check.add()
    });
    let check = Check::default();

    let results: Vec<u32> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS).map(|_| scope.spawn(|| racy.get(&check))).collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(check.total(), 4);
    let stored = racy.get(&check);
    assert!(results.contains(&stored), "{stored} should be one of {results:?}");
    assert_eq!(check.total(), 4);
}
