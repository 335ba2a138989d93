// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for accessor construction.

/// An error raised while configuring an accessor.
///
/// Errors are only produced when an accessor is built, never when it is read. Failures of the
/// compute function itself are returned to the caller unchanged and do not pass through this type.
///
/// # Example
///
/// ```
/// use lazyslot::{CachedProperty, Slots};
///
/// let result = CachedProperty::<Slots, u32>::builder("").build(|_| 42);
/// assert!(result.is_err());
/// ```
#[ohno::error]
pub struct Error {}

impl Error {
    pub(crate) fn invalid_configuration(reason: &'static str) -> Self {
        Self::caused_by(format!("invalid accessor configuration: {reason}"))
    }
}

/// A specialized [`Result`] type for accessor construction.
pub type Result<T> = std::result::Result<T, Error>;
