// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Lazily computed, memoized per-instance values.
//!
//! An accessor is defined once per type and produces a value for each instance on first read. The
//! value is stored in the instance itself and returned from there afterwards, until it is deleted,
//! overwritten, or its time-to-live runs out.
//!
//! This crate provides:
//! - [`CachedProperty`], the unguarded accessor, with optional TTL driven by a [`tick::Clock`]
//! - [`ThreadedCachedProperty`], which lets at most one thread compute at a time
//! - [`AsyncCachedProperty`], which caches the future itself so concurrent awaiters share one computation
//! - [`CachedClass`] for enumerating the accessors of a type and clearing all of them at once
//! - [`InvalidatingProperty`] for inputs whose writes invalidate the values derived from them
//! - [`CachedClassProperty`] for one value shared by every instance of a type
//!
//! Instances hold their values in an [`InstanceRegistry`]. The usual way to provide one is to embed
//! [`Slots`] and implement [`HasSlots`].
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use lazyslot::{CachedProperty, HasSlots, Slots};
//! use tick::ClockControl;
//!
//! #[derive(Default)]
//! struct Sensor {
//!     slots: Slots,
//! }
//!
//! impl HasSlots for Sensor {
//!     fn slots(&self) -> &Slots {
//!         &self.slots
//!     }
//! }
//!
//! let control = ClockControl::new();
//! let reading = CachedProperty::builder("reading")
//!     .ttl(Duration::from_secs(60))
//!     .clock(control.to_clock())
//!     .build(|_: &Sensor| 21.5_f32)?;
//!
//! let sensor = Sensor::default();
//! assert_eq!(reading.get(&sensor), 21.5);
//! assert!(reading.is_cached(&sensor));
//!
//! // The stored value is kept until it is older than the TTL.
//! control.advance(Duration::from_secs(61));
//! assert_eq!(reading.get(&sensor), 21.5);
//! # Ok::<(), lazyslot::Error>(())
//! ```
//!
//! # Features
//!
//! - `logs`: emits `tracing` events at debug level for hits, misses, expirations, and explicit
//!   writes and deletes.

mod builder;
mod class;
mod class_property;
mod error;
mod future;
mod guard;
mod invalidating;
mod key;
mod property;
mod registry;
mod slot;
mod telemetry;
mod threaded;
mod ttl;

#[cfg(test)]
mod testing;

pub use builder::CachedPropertyBuilder;
pub use class::{CachedClass, CachedMember, CachedType, is_cached, un_cache};
pub use class_property::CachedClassProperty;
pub use error::{Error, Result};
pub use future::{AsyncCachedProperty, SharedFuture};
pub use guard::ConcurrencyGuard;
pub use invalidating::InvalidatingProperty;
pub use key::{SlotKey, is_private_name};
pub use property::CachedProperty;
pub use registry::{ErasedSlot, HasSlots, InstanceRegistry, Slots};
pub use slot::Slot;
pub use threaded::ThreadedCachedProperty;
