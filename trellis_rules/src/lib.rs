// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Rules: rule binding and change cascades.
//!
//! This crate is the live half of the Trellis constraint model. A
//! [`RuleEngine`] takes the declarative [`Rule`](trellis_property::Rule)s
//! owned by a [`PropertyGraph`](trellis_property::PropertyGraph), resolves
//! their names to property handles (eagerly — a dangling or ill-typed rule
//! fails at attach, never at evaluation), and subscribes one binding per
//! trigger signal through [`trellis_broker`]. From then on, every committed
//! edit runs a synchronous, depth-first cascade: the change is delivered to
//! the live bindings of its signal, each recomputes exactly the derived
//! fact its rule governs, and each commit that actually changed something
//! is delivered in turn.
//!
//! Cascades terminate in practice because every rule is idempotent —
//! recomputing from unchanged inputs commits nothing. They are not formally
//! cycle-proof, so the engine also counts delivery nesting and aborts the
//! whole edit with a [`CascadeError`] past a configurable bound.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_property::{Property, PropertyGraph, Rule, Value};
//! use trellis_rules::RuleEngine;
//!
//! let mut graph = PropertyGraph::new();
//! graph.insert(Property::new("locked", Value::Bool(false))).unwrap();
//! let gain = graph.insert(Property::new("gain", Value::Real(1.0))).unwrap();
//! graph.add_rule(Rule::read_only_if_bool("gain", "locked", false)).unwrap();
//!
//! let mut engine = RuleEngine::attach(&graph).unwrap();
//! engine.prime(&mut graph).unwrap();
//! assert!(!graph.get(gain).unwrap().is_read_only());
//!
//! engine.set_value_by_name(&mut graph, "locked", Value::Bool(true)).unwrap();
//! assert!(graph.get(gain).unwrap().is_read_only());
//! ```
//!
//! ## Ownership
//!
//! The engine owns its bindings (generation-tagged slots) and the broker
//! bookkeeping, nothing else. Dropping the engine — or releasing one rule
//! with [`RuleEngine::release`] — deterministically tears subscriptions
//! down; the generational liveness check is the safety net underneath.
//! The graph stays a plain value: clone it, attach a fresh engine to the
//! clone, and the two panels are fully independent.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod binding;
mod engine;
mod error;
mod trace;

pub use binding::BindingId;
pub use engine::{DEFAULT_MAX_DEPTH, RuleEngine};
pub use error::{BindError, CascadeError, EditError};
pub use trace::{CascadeRecorder, CascadeTrace, NullTrace};
