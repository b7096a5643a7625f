// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compile-time configuration errors.

use alloc::string::String;
use core::fmt;

use trellis_property::{GraphError, ValueKind};
use trellis_rules::{BindError, EditError};

/// A panel document failed to compile.
///
/// All of these are configuration errors in the document (or its
/// overrides), detected during the materialize or attach phase — nothing
/// here is deferred to first use.
#[derive(Clone, Debug, PartialEq)]
pub enum CompileError {
    /// Two controls declare the same property name.
    DuplicateControl(String),
    /// A chooser declared no choices, so no default can be synthesized.
    EmptyChoices {
        /// The offending control.
        control: String,
    },
    /// A constraint's literal list is empty.
    EmptyValueList {
        /// The annotated control.
        control: String,
    },
    /// A constraint literal does not parse as the source's kind.
    BadLiteral {
        /// The annotated control.
        control: String,
        /// The literal as written.
        literal: String,
        /// The kind it had to parse as.
        expected: ValueKind,
    },
    /// A graph-level configuration error (unknown source, kind mismatch,
    /// rejected declared value, ...).
    Graph(GraphError),
    /// A rule failed to bind when the engine attached.
    Bind(BindError),
    /// Establishing initial derived state failed — in practice, the rule
    /// set cycled past the cascade bound.
    Prime(EditError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateControl(name) => {
                write!(f, "control '{name}' is declared more than once")
            }
            Self::EmptyChoices { control } => {
                write!(f, "chooser '{control}' declares no choices")
            }
            Self::EmptyValueList { control } => {
                write!(f, "constraint on '{control}' has an empty value list")
            }
            Self::BadLiteral {
                control,
                literal,
                expected,
            } => {
                write!(
                    f,
                    "constraint on '{control}': '{literal}' is not a valid {expected} literal"
                )
            }
            Self::Graph(e) => write!(f, "{e}"),
            Self::Bind(e) => write!(f, "{e}"),
            Self::Prime(e) => write!(f, "initial rule evaluation failed: {e}"),
        }
    }
}

impl core::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Graph(e) => Some(e),
            Self::Bind(e) => Some(e),
            Self::Prime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GraphError> for CompileError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::DuplicateName(name) => Self::DuplicateControl(name),
            other => Self::Graph(other),
        }
    }
}

impl From<BindError> for CompileError {
    fn from(error: BindError) -> Self {
        Self::Bind(error)
    }
}
