// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attach-time and edit-time errors.

use alloc::string::String;
use core::fmt;

use trellis_property::{GraphError, WriteError};

/// A rule failed to bind at attach time.
///
/// Everything here is a configuration error: binding re-validates each
/// rule against the graph as it is *now*, so a property removed after
/// `add_rule` surfaces here rather than at first evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindError {
    /// Index of the offending rule in the graph's rule list.
    pub rule: usize,
    /// What was wrong with it.
    pub error: GraphError,
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule #{} failed to bind: {}", self.rule, self.error)
    }
}

impl core::error::Error for BindError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// A cascade exceeded the engine's nesting bound.
///
/// The rule set almost certainly contains a cycle that does not settle;
/// treat this as a configuration error in the document, not a transient
/// condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CascadeError {
    /// The bound that was hit.
    pub max_depth: u32,
}

impl fmt::Display for CascadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule cascade exceeded {} nested deliveries; the rule set likely cycles",
            self.max_depth
        )
    }
}

impl core::error::Error for CascadeError {}

/// An edit through the engine failed.
///
/// The triggering write and the whole cascade are one editing operation: an
/// error anywhere aborts it and is returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditError {
    /// No property with the given name.
    UnknownProperty(String),
    /// The write itself failed (stale handle, kind mismatch, rejected).
    Write(WriteError),
    /// The cascade hit the nesting bound.
    Cascade(CascadeError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProperty(name) => write!(f, "no property named '{name}'"),
            Self::Write(e) => write!(f, "{e}"),
            Self::Cascade(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for EditError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::UnknownProperty(_) => None,
            Self::Write(e) => Some(e),
            Self::Cascade(e) => Some(e),
        }
    }
}

impl From<WriteError> for EditError {
    fn from(error: WriteError) -> Self {
        Self::Write(error)
    }
}

impl From<CascadeError> for EditError {
    fn from(error: CascadeError) -> Self {
        Self::Cascade(error)
    }
}
