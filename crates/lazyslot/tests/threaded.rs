// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the guarded accessor.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use lazyslot::{CachedProperty, HasSlots, Slots, ThreadedCachedProperty};

const THREADS: usize = 10;

#[derive(Debug, Default)]
struct Check {
    total: AtomicU32,
    slots: Slots,
}

impl Check {
    fn add_slowly(&self) -> u32 {
        thread::sleep(Duration::from_millis(1));
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

fn add_cached() -> ThreadedCachedProperty<Check, u32> {
    CachedProperty::new("add_cached", Check::add_slowly).threaded()
}

fn hammer(property: &ThreadedCachedProperty<Check, u32>, check: &Check) -> Vec<u32> {
    let start = Barrier::new(THREADS);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    start.wait();
                    property.get(check)
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    })
}

#[test]
fn concurrent_reads_compute_once() {
    let property = add_cached();
    let check = Check::default();

    let results = hammer(&property, &check);

    assert!(results.iter().all(|&value| value == 1), "{results:?}");
    assert_eq!(check.total(), 1);
}

#[test]
fn concurrent_reads_after_delete_compute_once_more() {
    let property = add_cached();
    let check = Check::default();

    assert_eq!(property.get(&check), 1);
    property.delete(&check);
    let results = hammer(&property, &check);

    assert!(results.iter().all(|&value| value == 2), "{results:?}");
    assert_eq!(check.total(), 2);
}

#[test]
fn instances_do_not_share_values() {
    let property = add_cached();
    let checks: Vec<Check> = (0..THREADS).map(|_| Check::default()).collect();

    thread::scope(|scope| {
        for check in &checks {
            let property = property.clone();
            scope.spawn(move || assert_eq!(property.get(check), 1));
        }
    });

    assert!(checks.iter().all(|check| check.total() == 1));
}

#[test]
fn compute_can_read_another_accessor_on_the_same_thread() {
    let base = add_cached();
    let reader = base.clone();
    let doubled = CachedProperty::new("doubled", move |check: &Check| reader.get(check) * 2).threaded();
    let check = Check::default();

    assert_eq!(doubled.get(&check), 2);
    assert_eq!(base.get(&check), 1);
    assert_eq!(check.total(), 1);
}

#[test]
fn panic_releases_guard_for_waiting_threads() {
    let attempts = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&attempts);
    let property = CachedProperty::new("fragile", move |_: &Check| {
        let attempt = seen.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(attempt > 1, "first computation panics");
        attempt
    })
    .threaded();
    let check = Check::default();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| property.get(&check)));
    assert!(outcome.is_err());
    assert!(!property.guard().is_locked());
    assert!(!property.is_cached(&check));

    let start = Barrier::new(THREADS);
    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                start.wait();
                assert_eq!(property.get(&check), 2);
            });
        }
    });
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
