// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, SystemTime};

use tick::Clock;

/// Expiry rule shared by every accessor flavor.
///
/// Expiry is evaluated only when a slot is read. Nothing is evicted in the background.
#[derive(Clone, Debug, Default)]
pub(crate) struct TtlPolicy {
    ttl: Option<Duration>,
    clock: Option<Clock>,
}

impl TtlPolicy {
    /// A zero TTL means "never expires".
    pub(crate) fn new(ttl: Option<Duration>, clock: Option<Clock>) -> Self {
        Self {
            ttl: ttl.filter(|ttl| !ttl.is_zero()),
            clock,
        }
    }

    pub(crate) fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub(crate) fn clock(&self) -> Option<&Clock> {
        self.clock.as_ref()
    }

    /// Reads the clock. Callers read it once per access and reuse the result.
    pub(crate) fn now(&self) -> Option<SystemTime> {
        self.clock.as_ref().map(Clock::system_time)
    }

    /// A slot is expired once strictly more than the TTL has elapsed since it was stored.
    ///
    /// A clock that moved backwards yields no elapsed time, so the slot stays fresh.
    pub(crate) fn is_expired(&self, computed_at: Option<SystemTime>, now: Option<SystemTime>) -> bool {
        let (Some(ttl), Some(computed_at), Some(now)) = (self.ttl, computed_at, now) else {
            return false;
        };

        now.duration_since(computed_at).is_ok_and(|elapsed| elapsed > ttl)
    }
}
