// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-instance slot storage.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::SlotKey;

/// A slot with its value type erased, as kept by an [`InstanceRegistry`].
///
/// Accessors store an `Arc<Slot<V>>` and downcast it back when reading.
pub type ErasedSlot = Arc<dyn Any + Send + Sync>;

/// Storage scoped to one instance, keyed by accessor.
///
/// This is the boundary between the accessors and the host type: an accessor never assumes
/// anything about an instance beyond these three operations. Most types embed a [`Slots`] and
/// implement [`HasSlots`], which provides this trait for free. Types with their own storage can
/// implement it directly.
///
/// Implementations must be safe to call from several threads at once. Concurrent `put_slot` calls
/// for one key must leave exactly one of the written slots in place.
pub trait InstanceRegistry {
    /// Returns the slot stored under `key`, if any.
    fn get_slot(&self, key: &SlotKey) -> Option<ErasedSlot>;

    /// Stores `slot` under `key`, replacing any previous slot.
    fn put_slot(&self, key: SlotKey, slot: ErasedSlot);

    /// Removes the slot stored under `key`, returning whether one was present.
    fn remove_slot(&self, key: &SlotKey) -> bool;

    /// Returns whether a slot is stored under `key`.
    fn contains_slot(&self, key: &SlotKey) -> bool {
        self.get_slot(key).is_some()
    }
}

/// The default [`InstanceRegistry`]: a lock-protected map from key to slot.
///
/// The lock is held only for the map operation itself, never while a value is being computed.
///
/// # Examples
///
/// ```
/// use lazyslot::{CachedProperty, HasSlots, Slots};
///
/// #[derive(Debug, Default)]
/// struct Order {
///     lines: Vec<u32>,
///     slots: Slots,
/// }
///
/// impl HasSlots for Order {
///     fn slots(&self) -> &Slots {
///         &self.slots
///     }
/// }
///
/// let total = CachedProperty::new("total", |order: &Order| order.lines.iter().sum::<u32>());
/// let order = Order { lines: vec![1, 2, 3], ..Order::default() };
///
/// assert_eq!(total.get(&order), 6);
/// assert_eq!(order.slots().len(), 1);
/// ```
#[derive(Default)]
pub struct Slots {
    map: RwLock<HashMap<SlotKey, ErasedSlot>>,
}

impl Slots {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Returns the keys of all stored slots, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<SlotKey> {
        self.map.read().keys().cloned().collect()
    }

    /// Removes every stored slot.
    pub fn clear(&self) {
        self.map.write().clear();
    }
}

impl Debug for Slots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slots").field("keys", &self.keys()).finish()
    }
}

impl InstanceRegistry for Slots {
    fn get_slot(&self, key: &SlotKey) -> Option<ErasedSlot> {
        self.map.read().get(key).map(Arc::clone)
    }

    fn put_slot(&self, key: SlotKey, slot: ErasedSlot) {
        self.map.write().insert(key, slot);
    }

    fn remove_slot(&self, key: &SlotKey) -> bool {
        self.map.write().remove(key).is_some()
    }

    fn contains_slot(&self, key: &SlotKey) -> bool {
        self.map.read().contains_key(key)
    }
}

/// Implemented by types that embed a [`Slots`] store.
///
/// Every `HasSlots` type is an [`InstanceRegistry`].
pub trait HasSlots {
    /// Returns the instance's slot storage.
    fn slots(&self) -> &Slots;
}

impl<T: HasSlots + ?Sized> InstanceRegistry for T {
    fn get_slot(&self, key: &SlotKey) -> Option<ErasedSlot> {
        self.slots().get_slot(key)
    }

    fn put_slot(&self, key: SlotKey, slot: ErasedSlot) {
        self.slots().put_slot(key, slot);
    }

    fn remove_slot(&self, key: &SlotKey) -> bool {
        self.slots().remove_slot(key)
    }

    fn contains_slot(&self, key: &SlotKey) -> bool {
        self.slots().contains_slot(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Slot;

    static_assertions::assert_impl_all!(Slots: Send, Sync);

    #[test]
    fn put_get_remove() {
        let slots = Slots::new();
        let key = SlotKey::from("answer");
        assert!(!slots.contains_slot(&key));

        slots.put_slot(key.clone(), Arc::new(Slot::new(42_u32, None)));
        let slot = slots.get_slot(&key).expect("slot should be present");
        let slot = slot.downcast_ref::<Slot<u32>>().expect("slot should hold a u32");
        assert_eq!(*slot.value(), 42);

        assert!(slots.remove_slot(&key));
        assert!(!slots.remove_slot(&key));
        assert!(slots.is_empty());
    }

    #[test]
    fn put_overwrites_previous_slot() {
        let slots = Slots::new();
        slots.put_slot("k".into(), Arc::new(Slot::new(1_u32, None)));
        slots.put_slot("k".into(), Arc::new(Slot::new(2_u32, None)));

        assert_eq!(slots.len(), 1);
        let slot = slots.get_slot(&"k".into()).expect("slot should be present");
        assert_eq!(*slot.downcast_ref::<Slot<u32>>().expect("u32 slot").value(), 2);
    }

    #[test]
    fn clear_and_keys() {
        let slots = Slots::new();
        slots.put_slot("a".into(), Arc::new(Slot::new((), None)));
        slots.put_slot("b".into(), Arc::new(Slot::new((), None)));

        let mut keys = slots.keys();
        keys.sort();
        assert_eq!(keys, vec![SlotKey::from("a"), SlotKey::from("b")]);
        assert!(format!("{slots:?}").contains("Slots"));

        slots.clear();
        assert!(slots.is_empty());
    }

    #[test]
    fn has_slots_delegates() {
        #[derive(Default)]
        struct Host {
            slots: Slots,
        }

        impl HasSlots for Host {
            fn slots(&self) -> &Slots {
                &self.slots
            }
        }

        let host = Host::default();
        host.put_slot("x".into(), Arc::new(Slot::new(1_u8, None)));
        assert!(host.contains_slot(&"x".into()));
        assert_eq!(host.slots().len(), 1);
        assert!(host.remove_slot(&"x".into()));
    }
}
