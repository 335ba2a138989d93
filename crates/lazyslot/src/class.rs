// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Enumeration and bulk invalidation of the accessors declared for a type.

use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;

use crate::telemetry::{self, Activity};
use crate::{InstanceRegistry, SlotKey};

/// An accessor as seen by a [`CachedClass`]: a name and the key of its slot.
///
/// Implemented by [`CachedProperty`](crate::CachedProperty),
/// [`ThreadedCachedProperty`](crate::ThreadedCachedProperty) and
/// [`AsyncCachedProperty`](crate::AsyncCachedProperty).
pub trait CachedMember: Debug + Send + Sync {
    /// Returns the name the accessor was defined with.
    fn name(&self) -> &str;

    /// Returns the key under which the accessor stores values in each instance.
    fn slot_key(&self) -> &SlotKey;
}

/// The cached accessors declared by a type, optionally extending those of a base type.
///
/// Rust has no reflection, so a type lists its accessors once, usually in a `static`, and hands the
/// list out through [`CachedType`]. The list is what [`cached_properties`](Self::cached_properties)
/// enumerates and what [`delete_cache`](Self::delete_cache) clears.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
///
/// use lazyslot::{CachedClass, CachedProperty, HasSlots, Slots};
///
/// #[derive(Default)]
/// struct Circle {
///     radius: f64,
///     slots: Slots,
/// }
///
/// impl HasSlots for Circle {
///     fn slots(&self) -> &Slots {
///         &self.slots
///     }
/// }
///
/// static AREA: LazyLock<CachedProperty<Circle, f64>> =
///     LazyLock::new(|| CachedProperty::new("area", |c: &Circle| std::f64::consts::PI * c.radius * c.radius));
/// static DIAMETER: LazyLock<CachedProperty<Circle, f64>> =
///     LazyLock::new(|| CachedProperty::new("diameter", |c: &Circle| 2.0 * c.radius));
///
/// let class = CachedClass::new("Circle")
///     .with_member(AREA.clone())
///     .with_member(DIAMETER.clone());
///
/// let circle = Circle { radius: 1.0, ..Circle::default() };
/// assert_eq!(DIAMETER.get(&circle), 2.0);
///
/// let cached: Vec<_> = class.cached_on(&circle).iter().map(|m| m.name()).collect();
/// assert_eq!(cached, ["diameter"]);
///
/// assert_eq!(class.delete_cache(&circle), 1);
/// assert!(!DIAMETER.is_cached(&circle));
/// ```
#[derive(Clone, Debug)]
pub struct CachedClass {
    name: Cow<'static, str>,
    base: Option<Arc<CachedClass>>,
    members: Vec<Arc<dyn CachedMember>>,
}

impl CachedClass {
    /// Creates a class with no accessors and no base.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            base: None,
            members: Vec::new(),
        }
    }

    /// Inherits the accessors of `base`.
    #[must_use]
    pub fn extends(mut self, base: impl Into<Arc<Self>>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Declares an accessor on this class.
    ///
    /// An accessor whose slot key matches one inherited from the base overrides it.
    #[must_use]
    pub fn with_member(mut self, member: impl CachedMember + 'static) -> Self {
        self.members.push(Arc::new(member));
        self
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the class this one extends, if any.
    #[must_use]
    pub fn base(&self) -> Option<&Self> {
        self.base.as_deref()
    }

    /// Looks an accessor up by name, searching this class before its bases.
    ///
    /// This is access through the type rather than an instance: it returns the accessor itself and
    /// never computes anything.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&dyn CachedMember> {
        self.members
            .iter()
            .rev()
            .find(|member| member.name() == name)
            .map(AsRef::as_ref)
            .or_else(|| self.base.as_ref().and_then(|base| base.member(name)))
    }

    /// Returns every accessor visible on this class, computed or not.
    ///
    /// Inherited accessors come first, in declaration order. An accessor that overrides an
    /// inherited one takes its place, and each slot key appears once.
    #[must_use]
    pub fn cached_properties(&self) -> Vec<&dyn CachedMember> {
        let mut all = self.base.as_ref().map(|base| base.cached_properties()).unwrap_or_default();

        for member in &self.members {
            let member = member.as_ref();
            match all.iter_mut().find(|known| known.slot_key() == member.slot_key()) {
                Some(known) => *known = member,
                None => all.push(member),
            }
        }

        all
    }

    /// Returns the accessors that currently hold a value for `instance`.
    #[must_use]
    pub fn cached_on<T: InstanceRegistry + ?Sized>(&self, instance: &T) -> Vec<&dyn CachedMember> {
        self.cached_properties()
            .into_iter()
            .filter(|member| instance.contains_slot(member.slot_key()))
            .collect()
    }

    /// Removes the value of every accessor from `instance`, returning how many were present.
    ///
    /// Accessors that hold nothing are skipped silently.
    pub fn delete_cache<T: InstanceRegistry + ?Sized>(&self, instance: &T) -> usize {
        let mut removed = 0;
        for member in self.cached_properties() {
            if instance.remove_slot(member.slot_key()) {
                telemetry::record(member.name(), Activity::Cleared);
                removed += 1;
            }
        }

        removed
    }
}

/// A host type that publishes its [`CachedClass`].
///
/// Needed by [`InvalidatingProperty`](crate::InvalidatingProperty), which clears every cached value
/// of the instance it writes to.
pub trait CachedType: InstanceRegistry {
    /// Returns the accessors declared for this type.
    fn cached_class(&self) -> &CachedClass;
}

/// Returns whether `instance` holds a value under `key`.
///
/// `key` is the slot key, which for private-style names is the qualified form.
#[must_use]
pub fn is_cached<T: InstanceRegistry + ?Sized>(instance: &T, key: &str) -> bool {
    instance.contains_slot(&SlotKey::new(key.to_owned()))
}

/// Removes the value stored under `key`, returning whether one was present.
///
/// Removing a value that is not there does nothing.
pub fn un_cache<T: InstanceRegistry + ?Sized>(instance: &T, key: &str) -> bool {
    instance.remove_slot(&SlotKey::new(key.to_owned()))
}
