// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Debug};

use parking_lot::ReentrantMutex;

/// A re-entrant lock that admits one computation at a time.
///
/// One guard belongs to one accessor and is shared by every instance the accessor serves, so
/// first computations for unrelated instances are serialized too. A compute function that reads
/// the same accessor again on the same thread re-enters the lock instead of deadlocking.
///
/// The lock does not poison: a compute function that panics releases it while unwinding.
#[derive(Default)]
pub struct ConcurrencyGuard {
    lock: ReentrantMutex<()>,
}

impl ConcurrencyGuard {
    /// Creates an unlocked guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _held = self.lock.lock();
        f()
    }

    /// Returns whether any thread currently holds the lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl Debug for ConcurrencyGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyGuard").field("locked", &self.is_locked()).finish()
    }
}
