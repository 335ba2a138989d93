// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::SystemTime;

/// A computed value together with the time it was stored.
///
/// A slot exists only once a value has been computed or explicitly set, so presence of the slot is
/// the "computed" flag. The value itself may be anything, including `None`.
///
/// # Examples
///
/// ```
/// use lazyslot::Slot;
///
/// let slot = Slot::new(Option::<u32>::None, None);
/// assert_eq!(*slot.value(), None);
/// assert!(slot.computed_at().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot<V> {
    value: V,
    computed_at: Option<SystemTime>,
}

impl<V> Slot<V> {
    /// Creates a slot holding `value`, stamped with `computed_at` when the accessor has a clock.
    pub fn new(value: V, computed_at: Option<SystemTime>) -> Self {
        Self { value, computed_at }
    }

    /// Returns a reference to the stored value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the slot and returns the stored value.
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the time the value was computed or set.
    ///
    /// `None` for accessors configured without a clock.
    #[must_use]
    pub fn computed_at(&self) -> Option<SystemTime> {
        self.computed_at
    }
}
