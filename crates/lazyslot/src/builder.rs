// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validated construction of accessors.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::{self, Debug};
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use tick::Clock;

use crate::ttl::TtlPolicy;
use crate::{AsyncCachedProperty, CachedProperty, Error, Result};

/// Builder for [`CachedProperty`] and [`AsyncCachedProperty`].
///
/// Created by [`CachedProperty::builder`] or [`AsyncCachedProperty::builder`]. The configuration is
/// checked when the accessor is built:
///
/// - the name must not be empty,
/// - an explicit owner must not be empty,
/// - a nonzero TTL requires a clock.
///
/// A zero TTL is accepted and means the values never expire.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use lazyslot::{CachedProperty, Slots};
///
/// let missing_clock = CachedProperty::builder("rate")
///     .ttl(Duration::from_secs(5))
///     .build(|_: &Slots| 1.5_f64);
///
/// assert!(missing_clock.is_err());
/// ```
pub struct CachedPropertyBuilder<T: ?Sized, V, E = Infallible> {
    name: Cow<'static, str>,
    owner: Option<Cow<'static, str>>,
    ttl: Option<Duration>,
    clock: Option<Clock>,
    _accessor: PhantomData<fn(&T) -> std::result::Result<V, E>>,
}

impl<T: ?Sized, V, E> CachedPropertyBuilder<T, V, E> {
    pub(crate) fn new(name: Cow<'static, str>) -> Self {
        Self {
            name,
            owner: None,
            ttl: None,
            clock: None,
            _accessor: PhantomData,
        }
    }

    /// Sets the owner name used to qualify private-style names such as `__token`.
    ///
    /// Defaults to the unqualified name of the host type.
    #[must_use]
    pub fn owner(mut self, owner: impl Into<Cow<'static, str>>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Sets how long a computed value stays valid.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the clock used to stamp values and to decide when they expire.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds an accessor whose compute function may fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn try_build<F>(self, compute: F) -> Result<CachedProperty<T, V, E>>
    where
        F: Fn(&T) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        self.validate()?;
        Ok(CachedProperty::from_parts(
            self.name,
            self.owner,
            TtlPolicy::new(self.ttl, self.clock),
            Box::new(compute),
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_configuration("the name must not be empty"));
        }

        if self.owner.as_deref().is_some_and(str::is_empty) {
            return Err(Error::invalid_configuration("the owner must not be empty"));
        }

        if self.ttl.is_some_and(|ttl| !ttl.is_zero()) && self.clock.is_none() {
            return Err(Error::invalid_configuration("a time-to-live requires a clock"));
        }

        Ok(())
    }
}

impl<T: ?Sized, V> CachedPropertyBuilder<T, V> {
    /// Builds an accessor with an infallible compute function.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build<F>(self, compute: F) -> Result<CachedProperty<T, V>>
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.try_build(move |instance: &T| Ok(compute(instance)))
    }

    /// Builds an accessor that caches the future returned by `compute`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build_async<F, Fut>(self, compute: F) -> Result<AsyncCachedProperty<T, V>>
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = V> + Send + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.validate()?;
        Ok(AsyncCachedProperty::from_parts(
            self.name,
            self.owner,
            TtlPolicy::new(self.ttl, self.clock),
            compute,
        ))
    }
}

impl<T: ?Sized, V, E> Debug for CachedPropertyBuilder<T, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedPropertyBuilder")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("ttl", &self.ttl)
            .field("clock", &self.clock.is_some())
            .finish()
    }
}
