// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::convert::Infallible;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::property::Lookup;
use crate::{CachedMember, CachedProperty, ConcurrencyGuard, InstanceRegistry, SlotKey};

/// A [`CachedProperty`] that runs at most one computation at a time.
///
/// A read that finds a fresh value returns it without locking. Otherwise the read takes the
/// accessor's [`ConcurrencyGuard`], looks again, and computes only if the value is still missing or
/// expired. Threads that lose the race wait for the winner and return its value.
///
/// The guard is re-entrant, so a compute function may read other accessors, or this one for a
/// different instance, on the same thread.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::thread;
///
/// use lazyslot::{CachedProperty, Slots};
///
/// let calls = Arc::new(AtomicU32::new(0));
/// let seen = Arc::clone(&calls);
/// let answer = CachedProperty::new("answer", move |_: &Slots| {
///     seen.fetch_add(1, Ordering::SeqCst);
///     42
/// })
/// .threaded();
///
/// let slots = Slots::new();
/// thread::scope(|scope| {
///     for _ in 0..8 {
///         scope.spawn(|| assert_eq!(answer.get(&slots), 42));
///     }
/// });
///
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub struct ThreadedCachedProperty<T: ?Sized, V, E = Infallible> {
    property: CachedProperty<T, V, E>,
    guard: Arc<ConcurrencyGuard>,
}

impl<T: ?Sized, V, E> CachedProperty<T, V, E> {
    /// Wraps the accessor so that concurrent first reads compute only once.
    #[must_use]
    pub fn threaded(self) -> ThreadedCachedProperty<T, V, E> {
        ThreadedCachedProperty {
            property: self,
            guard: Arc::new(ConcurrencyGuard::new()),
        }
    }
}

impl<T: ?Sized, V, E> ThreadedCachedProperty<T, V, E> {
    /// Returns the wrapped unguarded accessor.
    ///
    /// Reads through it share the stored values but skip the guard.
    #[must_use]
    pub fn property(&self) -> &CachedProperty<T, V, E> {
        &self.property
    }

    /// Returns the guard that serializes computations.
    #[must_use]
    pub fn guard(&self) -> &ConcurrencyGuard {
        &self.guard
    }

    /// Returns the name the accessor was defined with.
    #[must_use]
    pub fn name(&self) -> &str {
        self.property.name()
    }

    /// Returns the key under which values are stored in each instance.
    #[must_use]
    pub fn slot_key(&self) -> &SlotKey {
        self.property.slot_key()
    }
}

impl<T, V, E> ThreadedCachedProperty<T, V, E>
where
    T: InstanceRegistry + ?Sized,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the cached value, computing it under the guard if needed.
    ///
    /// # Errors
    ///
    /// Returns the compute function's error unchanged. Nothing is stored and the guard is
    /// released, so a waiting thread computes next.
    pub fn try_get(&self, instance: &T) -> Result<V, E> {
        let now = self.property.now();
        if let Lookup::Fresh(value) = self.property.lookup(instance, now) {
            return Ok(value);
        }

        self.guard.run(|| match self.property.lookup(instance, now) {
            Lookup::Fresh(value) => Ok(value),
            Lookup::Stale(activity) => self.property.fill(instance, now, activity),
        })
    }

    /// Stores `value` under the guard, without calling the compute function.
    pub fn set(&self, instance: &T, value: V) {
        self.guard.run(|| self.property.set(instance, value));
    }

    /// Removes the cached value under the guard.
    pub fn delete(&self, instance: &T) {
        self.guard.run(|| self.property.delete(instance));
    }

    /// Returns whether a value is stored for `instance`, expired or not.
    #[must_use]
    pub fn is_cached(&self, instance: &T) -> bool {
        self.property.is_cached(instance)
    }
}

impl<T, V> ThreadedCachedProperty<T, V>
where
    T: InstanceRegistry + ?Sized,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the cached value, computing it under the guard if needed.
    pub fn get(&self, instance: &T) -> V {
        let Ok(value) = self.try_get(instance);
        value
    }
}

impl<T: ?Sized, V, E> Clone for ThreadedCachedProperty<T, V, E> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<T: ?Sized, V, E> Debug for ThreadedCachedProperty<T, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadedCachedProperty")
            .field("property", &self.property)
            .field("guard", &self.guard)
            .finish()
    }
}

impl<T: ?Sized + 'static, V: 'static, E: 'static> CachedMember for ThreadedCachedProperty<T, V, E> {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn slot_key(&self) -> &SlotKey {
        Self::slot_key(self)
    }
}
