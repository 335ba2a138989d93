// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::key::short_type_name;
use crate::{CachedType, Slot, SlotKey};

type GetHook<T> = dyn Fn(&T) + Send + Sync;

/// A plain stored value whose writes invalidate every cached value of the instance.
///
/// Use it for the inputs that cached accessors derive from: assigning or deleting the input runs
/// [`CachedClass::delete_cache`](crate::CachedClass::delete_cache) on the instance first, so the
/// derived values are recomputed from the new input on their next read.
///
/// The value is stored in the instance's registry under its own key and is never cleared by the
/// invalidation it triggers.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
///
/// use lazyslot::{CachedClass, CachedProperty, CachedType, HasSlots, InvalidatingProperty, Slots};
///
/// #[derive(Default)]
/// struct Invoice {
///     slots: Slots,
/// }
///
/// impl HasSlots for Invoice {
///     fn slots(&self) -> &Slots {
///         &self.slots
///     }
/// }
///
/// impl CachedType for Invoice {
///     fn cached_class(&self) -> &CachedClass {
///         &INVOICE
///     }
/// }
///
/// static RATE: LazyLock<InvalidatingProperty<Invoice, u32>> = LazyLock::new(|| InvalidatingProperty::new("rate"));
/// static TAX: LazyLock<CachedProperty<Invoice, u32>> =
///     LazyLock::new(|| CachedProperty::new("tax", |invoice: &Invoice| RATE.get(invoice).unwrap_or(0) * 2));
/// static INVOICE: LazyLock<CachedClass> = LazyLock::new(|| CachedClass::new("Invoice").with_member(TAX.clone()));
///
/// let invoice = Invoice::default();
/// RATE.set(&invoice, 21);
/// assert_eq!(TAX.get(&invoice), 42);
///
/// RATE.set(&invoice, 25);
/// assert_eq!(TAX.get(&invoice), 50);
/// ```
pub struct InvalidatingProperty<T: ?Sized, V> {
    name: Cow<'static, str>,
    doc: Option<Cow<'static, str>>,
    key: OnceLock<SlotKey>,
    on_get: Option<Arc<GetHook<T>>>,
    _value: PhantomData<fn() -> V>,
}

impl<T: ?Sized, V> InvalidatingProperty<T, V> {
    /// Creates a property with the given name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            key: OnceLock::new(),
            on_get: None,
            _value: PhantomData,
        }
    }

    /// Attaches a description, readable through [`doc`](Self::doc).
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<Cow<'static, str>>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Runs `hook` for its side effects on every read, before the value is returned.
    #[must_use]
    pub fn on_get(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_get = Some(Arc::new(hook));
        self
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if one was attached.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Returns the key under which the value is stored in each instance.
    #[must_use]
    pub fn slot_key(&self) -> &SlotKey {
        self.key
            .get_or_init(|| SlotKey::resolve(short_type_name(type_name::<T>()), &self.name))
    }
}

impl<T, V> InvalidatingProperty<T, V>
where
    T: CachedType + ?Sized,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the stored value, or `None` if nothing was assigned.
    pub fn get(&self, instance: &T) -> Option<V> {
        if let Some(hook) = &self.on_get {
            hook(instance);
        }

        let erased = instance.get_slot(self.slot_key())?;
        erased.downcast_ref::<Slot<V>>().map(|slot| slot.value().clone())
    }

    /// Clears every cached value of `instance`, then stores `value`.
    pub fn set(&self, instance: &T, value: V) {
        instance.cached_class().delete_cache(instance);
        instance.put_slot(self.slot_key().clone(), Arc::new(Slot::new(value, None)));
    }

    /// Clears every cached value of `instance`, then removes the stored value.
    ///
    /// Returns whether a value was stored.
    pub fn delete(&self, instance: &T) -> bool {
        instance.cached_class().delete_cache(instance);
        instance.remove_slot(self.slot_key())
    }
}

impl<T: ?Sized, V> Clone for InvalidatingProperty<T, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            doc: self.doc.clone(),
            key: self.key.clone(),
            on_get: self.on_get.clone(),
            _value: PhantomData,
        }
    }
}

impl<T: ?Sized, V> Debug for InvalidatingProperty<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidatingProperty")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}
