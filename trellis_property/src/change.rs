// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change events raised by committed property mutations.

use crate::id::{PropertyId, Signal};
use crate::value::Value;

/// A committed change to one property, on one channel.
///
/// Carried through rule cascades so each rule can recompute from the
/// payload without re-reading state it already knows.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// The property's value was committed to a different value.
    Value {
        /// The property that changed.
        property: PropertyId,
        /// The value before the commit.
        old: Value,
        /// The value after the commit.
        new: Value,
    },
    /// The property's read-only flag flipped.
    ReadOnly {
        /// The property that changed.
        property: PropertyId,
        /// The flag after the commit.
        read_only: bool,
    },
}

impl Change {
    /// The property this change belongs to.
    #[must_use]
    pub fn property(&self) -> PropertyId {
        match self {
            Self::Value { property, .. } | Self::ReadOnly { property, .. } => *property,
        }
    }

    /// The signal this change is delivered on.
    #[must_use]
    pub fn signal(&self) -> Signal {
        match self {
            Self::Value { property, .. } => Signal::value(*property),
            Self::ReadOnly { property, .. } => Signal::read_only(*property),
        }
    }
}
