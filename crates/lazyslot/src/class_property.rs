// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Debug};

use parking_lot::RwLock;

use crate::telemetry::{self, Activity};

/// A value computed at most once per type and shared by every instance.
///
/// Where [`CachedProperty`](crate::CachedProperty) keeps one value per instance, this accessor keeps
/// a single value inside itself. It is meant to live in a `static` next to the type it describes.
///
/// Reads are not synchronized around the computation: threads that find the value missing at the
/// same time may each compute it, and the last write stays. The compute function runs without any
/// lock held.
///
/// # Examples
///
/// ```
/// use lazyslot::CachedClassProperty;
///
/// fn load_defaults() -> Vec<&'static str> {
///     vec!["en-US", "fr-FR"]
/// }
///
/// static LOCALES: CachedClassProperty<Vec<&'static str>> = CachedClassProperty::new("locales", load_defaults);
///
/// assert!(!LOCALES.is_cached());
/// assert_eq!(LOCALES.get(), ["en-US", "fr-FR"]);
/// assert!(LOCALES.is_cached());
/// ```
pub struct CachedClassProperty<V> {
    name: &'static str,
    compute: fn() -> V,
    value: RwLock<Option<V>>,
}

impl<V> CachedClassProperty<V> {
    /// Creates an empty accessor. Usable in `static` items.
    #[must_use]
    pub const fn new(name: &'static str, compute: fn() -> V) -> Self {
        Self {
            name,
            compute,
            value: parking_lot::const_rwlock(None),
        }
    }

    /// Returns the name the accessor was defined with.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Stores `value` without calling the compute function.
    pub fn set(&self, value: V) {
        *self.value.write() = Some(value);
        telemetry::record(self.name, Activity::Stored);
    }

    /// Removes the stored value so that the next read computes it again.
    ///
    /// Returns whether a value was stored.
    pub fn delete(&self) -> bool {
        let removed = self.value.write().take().is_some();
        if removed {
            telemetry::record(self.name, Activity::Cleared);
        }
        removed
    }

    /// Returns whether a value is stored.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.value.read().is_some()
    }
}

impl<V: Clone> CachedClassProperty<V> {
    /// Returns the stored value, computing and storing it first if needed.
    pub fn get(&self) -> V {
        let cached = self.value.read().clone();
        if let Some(value) = cached {
            telemetry::record(self.name, Activity::Hit);
            return value;
        }

        telemetry::record(self.name, Activity::Miss);
        let value = (self.compute)();
        *self.value.write() = Some(value.clone());
        value
    }
}

impl<V> Debug for CachedClassProperty<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedClassProperty")
            .field("name", &self.name)
            .field("cached", &self.is_cached())
            .finish()
    }
}
