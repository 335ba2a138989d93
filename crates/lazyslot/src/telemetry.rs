// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured log events for accessor activity.
//!
//! Events are emitted only with the `logs` feature. Failures of compute functions are never logged:
//! they belong to the caller.

/// What an accessor did with a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Activity {
    /// A fresh slot was found and returned.
    Hit,
    /// No slot was present, so the value was computed.
    Miss,
    /// A slot was present but past its TTL, so the value was recomputed.
    Expired,
    /// A value was written explicitly.
    Stored,
    /// A slot was removed explicitly.
    Cleared,
}

impl Activity {
    #[cfg(any(feature = "logs", test))]
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Expired => "expired",
            Self::Stored => "stored",
            Self::Cleared => "cleared",
        }
    }
}

#[inline]
pub(crate) fn record(accessor: &str, activity: Activity) {
    #[cfg(any(feature = "logs", test))]
    tracing::debug!(
        lazyslot.accessor = accessor,
        lazyslot.activity = activity.as_str(),
        "lazyslot.event"
    );

    #[cfg(not(any(feature = "logs", test)))]
    let _ = (accessor, activity);
}
