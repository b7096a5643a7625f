// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Graph configuration errors and write failures.

use alloc::string::String;
use core::fmt;

use crate::value::ValueKind;

/// A configuration error in a [`PropertyGraph`](crate::PropertyGraph).
///
/// These are all detected eagerly — at insert or `add_rule` time — and are
/// never deferred to rule evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// A property with this name already exists in the graph.
    DuplicateName(String),
    /// A rule references a property name that does not resolve.
    UnknownProperty(String),
    /// A property or rule pairs a value with a kind it cannot have.
    KindMismatch {
        /// The property whose kind did not fit.
        name: String,
        /// The kind that was required.
        expected: ValueKind,
        /// The kind that was found.
        found: ValueKind,
    },
    /// A property's initial value lies outside its domain and its policy
    /// rejects instead of repairing.
    ValueRejected(String),
    /// A value-matching rule was declared with an empty match set.
    EmptyValueSet {
        /// The rule's target property.
        target: String,
    },
    /// A writable-selection rule needs at least two targets.
    TooFewTargets {
        /// The rule's selector property.
        source: String,
    },
    /// A min/max coupling references a property that is not an ordered
    /// scalar, or pairs two different scalar kinds.
    NotScalar(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => {
                write!(f, "property '{name}' is already declared")
            }
            Self::UnknownProperty(name) => {
                write!(f, "no property named '{name}' in this graph")
            }
            Self::KindMismatch {
                name,
                expected,
                found,
            } => {
                write!(f, "property '{name}' must be {expected}, found {found}")
            }
            Self::ValueRejected(name) => {
                write!(
                    f,
                    "initial value of '{name}' is outside its domain and its policy rejects"
                )
            }
            Self::EmptyValueSet { target } => {
                write!(f, "rule on '{target}' declares an empty match set")
            }
            Self::TooFewTargets { source } => {
                write!(
                    f,
                    "writable selection driven by '{source}' needs at least two targets"
                )
            }
            Self::NotScalar(name) => {
                write!(
                    f,
                    "property '{name}' must be an ordered scalar (int or real)"
                )
            }
        }
    }
}

impl core::error::Error for GraphError {}

/// A failed property write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteError {
    /// The id's slot has been reused or never existed.
    StaleHandle,
    /// The written value's kind does not match the property's kind.
    KindMismatch {
        /// The property's kind.
        expected: ValueKind,
        /// The written value's kind.
        found: ValueKind,
    },
    /// The value lies outside the domain and the policy is
    /// [`FailurePolicy::Reject`](crate::FailurePolicy::Reject).
    OutOfDomain,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle => f.write_str("property handle is stale"),
            Self::KindMismatch { expected, found } => {
                write!(f, "expected a {expected} value, found {found}")
            }
            Self::OutOfDomain => f.write_str("value is outside the property's domain"),
        }
    }
}

impl core::error::Error for WriteError {}
