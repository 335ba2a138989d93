// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memoization of asynchronously produced values.

use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::future::{self, Future};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::builder::CachedPropertyBuilder;
use crate::property::Lookup;
use crate::telemetry::Activity;
use crate::ttl::TtlPolicy;
use crate::{CachedMember, CachedProperty, ConcurrencyGuard, InstanceRegistry, SlotKey};

/// The awaitable stored in an instance by [`AsyncCachedProperty`].
///
/// Every clone polls the same underlying computation and yields a clone of its output.
pub type SharedFuture<V> = Shared<BoxFuture<'static, V>>;

/// An accessor that caches the future returned by its compute function.
///
/// The first read calls the compute function and stores the returned future, before it has made
/// any progress. Every later read, including reads that happen while the computation is still
/// pending, returns a clone of the same [`SharedFuture`], so all awaiters share one computation.
///
/// The stored future is the cached value: its output, whether a success or a failure, stays cached
/// until [`delete`](Self::delete) removes it or its TTL runs out. Fallible computations should
/// produce a `Result` with a cloneable error.
///
/// # Examples
///
/// ```
/// use lazyslot::{AsyncCachedProperty, Slots};
///
/// # futures::executor::block_on(async {
/// let greeting = AsyncCachedProperty::new("greeting", |_: &Slots| async { String::from("hello") });
/// let slots = Slots::new();
///
/// let first = greeting.get(&slots);
/// let second = greeting.get(&slots);
///
/// assert_eq!(first.await, "hello");
/// assert_eq!(second.await, "hello");
/// # });
/// ```
pub struct AsyncCachedProperty<T: ?Sized, V> {
    property: CachedProperty<T, SharedFuture<V>>,
    guard: Option<Arc<ConcurrencyGuard>>,
}

impl<T: ?Sized, V> AsyncCachedProperty<T, V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an accessor for an asynchronous compute function, without a TTL.
    pub fn new<F, Fut>(name: impl Into<Cow<'static, str>>, compute: F) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = V> + Send + 'static,
    {
        Self::from_parts(name.into(), None, TtlPolicy::default(), compute)
    }

    pub(crate) fn from_parts<F, Fut>(
        name: Cow<'static, str>,
        owner: Option<Cow<'static, str>>,
        ttl: TtlPolicy,
        compute: F,
    ) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = V> + Send + 'static,
    {
        let compute = move |instance: &T| Ok(compute(instance).boxed().shared());
        Self {
            property: CachedProperty::from_parts(name, owner, ttl, Box::new(compute)),
            guard: None,
        }
    }
}

impl<T: ?Sized, V> AsyncCachedProperty<T, V> {
    /// Starts configuring an asynchronous accessor.
    ///
    /// Finish with [`CachedPropertyBuilder::build_async`].
    #[must_use]
    pub fn builder(name: impl Into<Cow<'static, str>>) -> CachedPropertyBuilder<T, V> {
        CachedPropertyBuilder::new(name.into())
    }

    /// Serializes the creation of futures through a [`ConcurrencyGuard`].
    ///
    /// Without the guard, threads that race on an empty slot may each create a future and the last
    /// one stored wins. With it, exactly one future is created per fill.
    #[must_use]
    pub fn threaded(mut self) -> Self {
        self.guard = Some(Arc::new(ConcurrencyGuard::new()));
        self
    }

    /// Returns whether creation of futures is serialized.
    #[must_use]
    pub fn is_threaded(&self) -> bool {
        self.guard.is_some()
    }

    /// Returns the name the accessor was defined with.
    #[must_use]
    pub fn name(&self) -> &str {
        self.property.name()
    }

    /// Returns the key under which futures are stored in each instance.
    #[must_use]
    pub fn slot_key(&self) -> &SlotKey {
        self.property.slot_key()
    }

    /// Returns the time-to-live, if stored futures expire.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.property.ttl()
    }
}

impl<T, V> AsyncCachedProperty<T, V>
where
    T: InstanceRegistry + ?Sized,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the stored future, creating and storing it first if needed.
    ///
    /// The returned future may already be complete. Awaiting it does not run the compute function
    /// again.
    pub fn get(&self, instance: &T) -> SharedFuture<V> {
        let now = self.property.now();
        let activity = match self.property.lookup(instance, now) {
            Lookup::Fresh(future) => return future,
            Lookup::Stale(activity) => activity,
        };

        let Some(guard) = &self.guard else {
            return self.fill(instance, now, activity);
        };

        guard.run(|| match self.property.lookup(instance, now) {
            Lookup::Fresh(future) => future,
            Lookup::Stale(activity) => self.fill(instance, now, activity),
        })
    }

    /// Stores an already completed future holding `value`.
    pub fn set(&self, instance: &T, value: V) {
        let ready = future::ready(value).boxed().shared();
        match &self.guard {
            Some(guard) => guard.run(|| self.property.set(instance, ready)),
            None => self.property.set(instance, ready),
        }
    }

    /// Removes the stored future, so that the next read calls the compute function again.
    ///
    /// Futures already handed out keep running and keep their output.
    pub fn delete(&self, instance: &T) {
        match &self.guard {
            Some(guard) => guard.run(|| self.property.delete(instance)),
            None => self.property.delete(instance),
        }
    }

    /// Returns whether a future is stored for `instance`, pending or complete.
    #[must_use]
    pub fn is_cached(&self, instance: &T) -> bool {
        self.property.is_cached(instance)
    }

    fn fill(&self, instance: &T, now: Option<SystemTime>, activity: Activity) -> SharedFuture<V> {
        let Ok(future) = self.property.fill(instance, now, activity);
        future
    }
}

impl<T: ?Sized, V> Clone for AsyncCachedProperty<T, V> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<T: ?Sized, V> Debug for AsyncCachedProperty<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCachedProperty")
            .field("property", &self.property)
            .field("threaded", &self.is_threaded())
            .finish()
    }
}

impl<T: ?Sized + 'static, V: 'static> CachedMember for AsyncCachedProperty<T, V> {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn slot_key(&self) -> &SlotKey {
        Self::slot_key(self)
    }
}
