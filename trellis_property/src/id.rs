// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property handles and notification channels.

use core::fmt;

/// Identifier for a property in a [`PropertyGraph`](crate::PropertyGraph).
///
/// This is a small, copyable handle consisting of a slot index and a
/// generation counter. It stays stable for the property's lifetime and goes
/// dead — rather than aliasing a later occupant — when the property is
/// removed and its slot reused:
///
/// - On insert, a slot is allocated (or reused) and its current generation
///   is captured in the returned id.
/// - On remove, the slot's generation is bumped; every id previously handed
///   out for that slot stops matching.
///
/// Use [`PropertyGraph::is_alive`](crate::PropertyGraph::is_alive) to check
/// liveness. The rule engine relies on this scheme for its weak-subscription
/// guarantees: a subscription keyed by a stale id is simply never delivered
/// to.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PropertyId(pub(crate) u32, pub(crate) u32);

impl PropertyId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({}v{})", self.0, self.1)
    }
}

/// A property's two independent notification channels.
///
/// Value changes and read-only-flag changes are deliberately separate:
/// flipping read-only never alters the value, and committing a value never
/// silently alters the flag, so rules observing one cannot be re-triggered
/// through the other by accident.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The value-changed channel.
    Value,
    /// The read-only-flag-changed channel.
    ReadOnly,
}

/// One property's change signal on one channel.
///
/// This is the source key rules subscribe to through the broker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signal {
    /// The property raising the change.
    pub property: PropertyId,
    /// Which of its channels.
    pub channel: Channel,
}

impl Signal {
    /// The value-changed signal of `property`.
    #[must_use]
    #[inline]
    pub const fn value(property: PropertyId) -> Self {
        Self {
            property,
            channel: Channel::Value,
        }
    }

    /// The read-only-changed signal of `property`.
    #[must_use]
    #[inline]
    pub const fn read_only(property: PropertyId) -> Self {
        Self {
            property,
            channel: Channel::ReadOnly,
        }
    }
}
