// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Storage keys and private-name qualification.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// The key under which an accessor keeps its slot inside an instance registry.
///
/// Public names are used verbatim. Private-style names (a leading double underscore without a
/// trailing one) are qualified with the owning type, so that a base type and a derived type that
/// share one registry can both declare `__secret` without overwriting each other.
///
/// # Examples
///
/// ```
/// use lazyslot::SlotKey;
///
/// assert_eq!(SlotKey::resolve("Base", "total").as_str(), "total");
/// assert_eq!(SlotKey::resolve("Base", "__secret").as_str(), "_Base__secret");
/// assert_eq!(SlotKey::resolve("Base", "__len__").as_str(), "__len__");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey(Cow<'static, str>);

impl SlotKey {
    /// Creates a key from a name, without any qualification.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Resolves the storage key for `name` declared on the type called `owner`.
    ///
    /// Leading underscores of the owner are ignored. An owner that consists only of underscores
    /// leaves the name unqualified.
    #[must_use]
    pub fn resolve(owner: &str, name: &str) -> Self {
        let owner = owner.trim_start_matches('_');
        if owner.is_empty() || !is_private_name(name) {
            return Self(Cow::Owned(name.to_owned()));
        }

        Self(Cow::Owned(format!("_{owner}{name}")))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for SlotKey {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SlotKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for SlotKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SlotKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns `true` for names that start with a double underscore but do not end with one.
///
/// ```
/// use lazyslot::is_private_name;
///
/// assert!(is_private_name("__cache"));
/// assert!(!is_private_name("__init__"));
/// assert!(!is_private_name("_single"));
/// ```
#[must_use]
pub fn is_private_name(name: &str) -> bool {
    name.len() > 2 && name.starts_with("__") && !name.ends_with("__")
}

/// Returns the last path segment of a Rust type name, without generic arguments.
pub(crate) fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}
