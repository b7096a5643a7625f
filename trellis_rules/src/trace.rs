// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability hook for rule cascades.
//!
//! The engine intentionally stores no provenance for why a property ended
//! up with its current state. For embedders that need to answer "what did
//! that edit actually touch?", the traced entry points
//! ([`RuleEngine::set_value_with_trace`](crate::RuleEngine::set_value_with_trace))
//! accept a [`CascadeTrace`] observer and report every committed change
//! together with the delivery depth it was committed at.
//!
//! [`CascadeRecorder`] is a small ready-made recorder for tests and debug
//! tooling; recording *all* cause paths is out of scope here, as it can be
//! much more expensive in both time and memory.

use alloc::vec::Vec;

use trellis_property::Change;

/// A callback sink for cascade tracing.
pub trait CascadeTrace {
    /// Called once per committed change.
    ///
    /// `depth` is the delivery nesting at commit time: `0` for the edit
    /// that started the cascade, `1` for changes committed while its
    /// delivery was draining, and so on.
    fn committed(&mut self, change: &Change, depth: u32);
}

/// A trace that records nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullTrace;

impl CascadeTrace for NullTrace {
    #[inline]
    fn committed(&mut self, _change: &Change, _depth: u32) {}
}

/// Records every committed change with its depth, in commit order.
///
/// # Example
///
/// ```rust
/// use trellis_property::{Property, PropertyGraph, Rule, Value};
/// use trellis_rules::{CascadeRecorder, RuleEngine};
///
/// let mut graph = PropertyGraph::new();
/// let min = graph.insert(Property::new("min", Value::Int(0))).unwrap();
/// graph.insert(Property::new("max", Value::Int(10))).unwrap();
/// graph.add_rule(Rule::couple_min_max("min", "max")).unwrap();
///
/// let mut engine = RuleEngine::attach(&graph).unwrap();
/// let mut recorder = CascadeRecorder::default();
/// engine
///     .set_value_with_trace(&mut graph, min, Value::Int(15), &mut recorder)
///     .unwrap();
///
/// // The edit itself plus the nudged counterpart.
/// assert_eq!(recorder.commits().len(), 2);
/// assert_eq!(recorder.max_depth(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CascadeRecorder {
    commits: Vec<(u32, Change)>,
}

impl CascadeRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded `(depth, change)` pairs, in commit order.
    #[must_use]
    pub fn commits(&self) -> &[(u32, Change)] {
        &self.commits
    }

    /// The deepest nesting any commit happened at; `0` when nothing
    /// cascaded (or nothing was recorded).
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.commits.iter().map(|(d, _)| *d).max().unwrap_or(0)
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.commits.clear();
    }
}

impl CascadeTrace for CascadeRecorder {
    fn committed(&mut self, change: &Change, depth: u32) {
        self.commits.push((depth, change.clone()));
    }
}
