// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The unguarded memoizing accessor.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::{self, Debug};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime};

use tick::Clock;

use crate::builder::CachedPropertyBuilder;
use crate::key::short_type_name;
use crate::telemetry::{self, Activity};
use crate::ttl::TtlPolicy;
use crate::{CachedMember, InstanceRegistry, Slot, SlotKey};

pub(crate) type ComputeFn<T, V, E> = dyn Fn(&T) -> Result<V, E> + Send + Sync;

/// A value computed at most once per instance, then served from the instance's storage.
///
/// The accessor is defined once per type and shared by all instances. It holds only
/// configuration: the compute function, the name, the optional TTL and clock. Every computed value
/// lives in the [`InstanceRegistry`] of the instance it was computed for.
///
/// Reads are not synchronized. Several threads that find the slot empty at the same time each run
/// the compute function and each write their result; the last write stays. Use
/// [`threaded`](Self::threaded) when at most one computation must run.
///
/// A compute function that fails leaves nothing behind, so the next read tries again.
///
/// Cloning is cheap and the clones share the definition.
///
/// # Examples
///
/// ```
/// use lazyslot::{CachedProperty, HasSlots, Slots};
///
/// #[derive(Debug, Default)]
/// struct Document {
///     text: String,
///     slots: Slots,
/// }
///
/// impl HasSlots for Document {
///     fn slots(&self) -> &Slots {
///         &self.slots
///     }
/// }
///
/// let words = CachedProperty::new("words", |doc: &Document| doc.text.split_whitespace().count());
/// let doc = Document { text: "lazy values are cached".into(), ..Document::default() };
///
/// assert!(!words.is_cached(&doc));
/// assert_eq!(words.get(&doc), 4);
/// assert!(words.is_cached(&doc));
///
/// words.set(&doc, 10);
/// assert_eq!(words.get(&doc), 10);
///
/// words.delete(&doc);
/// assert_eq!(words.get(&doc), 4);
/// ```
pub struct CachedProperty<T: ?Sized, V, E = Infallible> {
    definition: Arc<Definition<T, V, E>>,
}

struct Definition<T: ?Sized, V, E> {
    name: Cow<'static, str>,
    owner: Option<Cow<'static, str>>,
    key: OnceLock<SlotKey>,
    compute: Box<ComputeFn<T, V, E>>,
    ttl: TtlPolicy,
}

/// Outcome of reading a slot without computing.
pub(crate) enum Lookup<V> {
    Fresh(V),
    Stale(Activity),
}

impl<T: ?Sized, V> CachedProperty<T, V> {
    /// Creates an accessor with an infallible compute function and no TTL.
    ///
    /// Use [`builder`](Self::builder) for a TTL, an explicit owner name, or validated configuration.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, compute: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::from_parts(name.into(), None, TtlPolicy::default(), Box::new(move |instance: &T| Ok(compute(instance))))
    }
}

impl<T: ?Sized, V, E> CachedProperty<T, V, E> {
    /// Creates an accessor whose compute function may fail.
    ///
    /// A failure is returned from [`try_get`](Self::try_get) as is and nothing is cached.
    pub fn try_new<F>(name: impl Into<Cow<'static, str>>, compute: F) -> Self
    where
        F: Fn(&T) -> Result<V, E> + Send + Sync + 'static,
    {
        Self::from_parts(name.into(), None, TtlPolicy::default(), Box::new(compute))
    }

    /// Starts configuring an accessor.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use lazyslot::{CachedProperty, Slots};
    /// use tick::Clock;
    ///
    /// let uptime = CachedProperty::builder("uptime")
    ///     .ttl(Duration::from_secs(30))
    ///     .clock(Clock::new_frozen())
    ///     .build(|_: &Slots| 99_u64)?;
    ///
    /// assert_eq!(uptime.ttl(), Some(Duration::from_secs(30)));
    /// # Ok::<(), lazyslot::Error>(())
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<Cow<'static, str>>) -> CachedPropertyBuilder<T, V, E> {
        CachedPropertyBuilder::new(name.into())
    }

    pub(crate) fn from_parts(
        name: Cow<'static, str>,
        owner: Option<Cow<'static, str>>,
        ttl: TtlPolicy,
        compute: Box<ComputeFn<T, V, E>>,
    ) -> Self {
        Self {
            definition: Arc::new(Definition {
                name,
                owner,
                key: OnceLock::new(),
                compute,
                ttl,
            }),
        }
    }

    /// Returns the name the accessor was defined with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Returns the key under which values are stored in each instance.
    ///
    /// Private-style names are qualified with the owner, which defaults to the name of `T`. The
    /// key is resolved on first use and reused afterwards.
    #[must_use]
    pub fn slot_key(&self) -> &SlotKey {
        self.definition.key.get_or_init(|| {
            let owner = self
                .definition
                .owner
                .as_deref()
                .unwrap_or_else(|| short_type_name(std::any::type_name::<T>()));
            SlotKey::resolve(owner, &self.definition.name)
        })
    }

    /// Returns the time-to-live, if values expire.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.definition.ttl.ttl()
    }

    /// Returns the clock used to stamp and expire values.
    #[must_use]
    pub fn clock(&self) -> Option<&Clock> {
        self.definition.ttl.clock()
    }

    pub(crate) fn now(&self) -> Option<SystemTime> {
        self.definition.ttl.now()
    }
}

impl<T, V, E> CachedProperty<T, V, E>
where
    T: InstanceRegistry + ?Sized,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the cached value, computing and storing it first if needed.
    ///
    /// The clock is read once, before the slot is inspected, so a computation that outlasts the
    /// TTL is still stamped with the time the read started.
    ///
    /// # Errors
    ///
    /// Returns the compute function's error unchanged. Nothing is stored in that case.
    pub fn try_get(&self, instance: &T) -> Result<V, E> {
        let now = self.now();
        match self.lookup(instance, now) {
            Lookup::Fresh(value) => Ok(value),
            Lookup::Stale(activity) => self.fill(instance, now, activity),
        }
    }

    /// Stores `value` as if it had been computed, without calling the compute function.
    pub fn set(&self, instance: &T, value: V) {
        self.store(instance, value, self.now());
        telemetry::record(self.name(), Activity::Stored);
    }

    /// Removes the cached value so that the next read recomputes it.
    ///
    /// Deleting a value that was never computed does nothing.
    pub fn delete(&self, instance: &T) {
        if instance.remove_slot(self.slot_key()) {
            telemetry::record(self.name(), Activity::Cleared);
        }
    }

    /// Returns whether a value is stored for `instance`, expired or not.
    #[must_use]
    pub fn is_cached(&self, instance: &T) -> bool {
        instance.contains_slot(self.slot_key())
    }

    /// Reads the slot without computing anything.
    ///
    /// A slot holding a different value type than `V` is treated as missing and will be replaced.
    pub(crate) fn lookup(&self, instance: &T, now: Option<SystemTime>) -> Lookup<V> {
        let Some(erased) = instance.get_slot(self.slot_key()) else {
            return Lookup::Stale(Activity::Miss);
        };
        let Some(slot) = erased.downcast_ref::<Slot<V>>() else {
            return Lookup::Stale(Activity::Miss);
        };

        if self.definition.ttl.is_expired(slot.computed_at(), now) {
            return Lookup::Stale(Activity::Expired);
        }

        telemetry::record(self.name(), Activity::Hit);
        Lookup::Fresh(slot.value().clone())
    }

    /// Runs the compute function and stores its result, stamped with `now`.
    pub(crate) fn fill(&self, instance: &T, now: Option<SystemTime>, activity: Activity) -> Result<V, E> {
        telemetry::record(self.name(), activity);
        let value = (self.definition.compute)(instance)?;
        self.store(instance, value.clone(), now);
        Ok(value)
    }

    fn store(&self, instance: &T, value: V, computed_at: Option<SystemTime>) {
        instance.put_slot(self.slot_key().clone(), Arc::new(Slot::new(value, computed_at)));
    }
}

impl<T, V> CachedProperty<T, V>
where
    T: InstanceRegistry + ?Sized,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the cached value, computing and storing it first if needed.
    pub fn get(&self, instance: &T) -> V {
        let Ok(value) = self.try_get(instance);
        value
    }
}

impl<T: ?Sized, V, E> Clone for CachedProperty<T, V, E> {
    fn clone(&self) -> Self {
        Self {
            definition: Arc::clone(&self.definition),
        }
    }
}

impl<T: ?Sized, V, E> Debug for CachedProperty<T, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedProperty")
            .field("name", &self.definition.name)
            .field("owner", &self.definition.owner)
            .field("ttl", &self.definition.ttl.ttl())
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized + 'static, V: 'static, E: 'static> CachedMember for CachedProperty<T, V, E> {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn slot_key(&self) -> &SlotKey {
        Self::slot_key(self)
    }
}
