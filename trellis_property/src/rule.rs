// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative cross-property constraints.

use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::value::Value;

/// A declarative constraint recomputing one property's derived state from
/// another's current state.
///
/// Rules reference properties by name; the names are resolved — and the
/// referenced kinds checked — when the rule is added to its graph
/// ([`PropertyGraph::add_rule`](crate::PropertyGraph::add_rule)), so a
/// dangling or ill-typed rule is a configuration error long before any
/// evaluation. Evaluation itself lives in `trellis_rules`.
///
/// Each variant is idempotent by construction: recomputing with unchanged
/// inputs commits nothing, which is what terminates cascades.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    /// `target` is read-only exactly when the boolean `source` is true
    /// (`invert` flips the sense).
    ReadOnlyIfBool {
        /// The property whose read-only flag this rule owns.
        target: String,
        /// The boolean property driving the flag.
        source: String,
        /// Flip the computed flag.
        invert: bool,
    },
    /// `target` is read-only exactly when `source`'s value is one of
    /// `values` (`invert` flips the sense).
    ReadOnlyIfValueIn {
        /// The property whose read-only flag this rule owns.
        target: String,
        /// The property whose value is matched.
        source: String,
        /// The match set; must be non-empty and of the source's kind.
        values: Vec<Value>,
        /// Flip the computed flag.
        invert: bool,
    },
    /// `target` is read-only exactly when at least one named source
    /// currently equals its paired match value (`invert` flips the sense).
    /// Pairs that do not match contribute nothing.
    ReadOnlyIfAnyEquals {
        /// The property whose read-only flag this rule owns.
        target: String,
        /// `(source name, match value)` pairs; must be non-empty.
        pairs: Vec<(String, Value)>,
        /// Flip the computed flag.
        invert: bool,
    },
    /// The boolean `source` selects exactly one writable target: the first
    /// when true (XOR `invert`), the second when false; every other target
    /// is read-only in both states. Writes to a non-selected target are
    /// suppressed, not errors.
    SelectWritable {
        /// The linked targets, two or more.
        targets: SmallVec<[String; 2]>,
        /// The boolean property doing the selecting.
        source: String,
        /// Flip which target the boolean selects.
        invert: bool,
    },
    /// Keeps `min <= max` softly: setting `min` above `max` nudges `max` up
    /// to it (and vice versa), never rejecting the triggering edit. The
    /// nudge bypasses the counterpart's read-only gate so a disabled
    /// counterpart still follows.
    CoupleMinMax {
        /// The lower bound property.
        min: String,
        /// The upper bound property.
        max: String,
    },
}

impl Rule {
    /// `target` read-only while boolean `source` is true (or false, inverted).
    #[must_use]
    pub fn read_only_if_bool(
        target: impl Into<String>,
        source: impl Into<String>,
        invert: bool,
    ) -> Self {
        Self::ReadOnlyIfBool {
            target: target.into(),
            source: source.into(),
            invert,
        }
    }

    /// `target` read-only while `source`'s value is in `values`.
    #[must_use]
    pub fn read_only_if_value_in(
        target: impl Into<String>,
        source: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
        invert: bool,
    ) -> Self {
        Self::ReadOnlyIfValueIn {
            target: target.into(),
            source: source.into(),
            values: values.into_iter().collect(),
            invert,
        }
    }

    /// `target` read-only while any `(source, value)` pair matches.
    #[must_use]
    pub fn read_only_if_any_equals(
        target: impl Into<String>,
        pairs: impl IntoIterator<Item = (String, Value)>,
        invert: bool,
    ) -> Self {
        Self::ReadOnlyIfAnyEquals {
            target: target.into(),
            pairs: pairs.into_iter().collect(),
            invert,
        }
    }

    /// Boolean `source` selects which of `targets` is writable.
    #[must_use]
    pub fn select_writable<I, T>(targets: I, source: impl Into<String>, invert: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::SelectWritable {
            targets: targets.into_iter().map(Into::into).collect(),
            source: source.into(),
            invert,
        }
    }

    /// Soft mutual bound keeping `min <= max`.
    #[must_use]
    pub fn couple_min_max(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self::CoupleMinMax {
            min: min.into(),
            max: max.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn constructors_build_expected_variants() {
        let rule = Rule::read_only_if_bool("a", "b", true);
        assert_eq!(
            rule,
            Rule::ReadOnlyIfBool {
                target: "a".to_string(),
                source: "b".to_string(),
                invert: true,
            }
        );

        let rule = Rule::select_writable(["lo", "hi"], "locked", false);
        match rule {
            Rule::SelectWritable { targets, .. } => assert_eq!(targets.len(), 2),
            other => panic!("unexpected variant {other:?}"),
        }
    }
}
