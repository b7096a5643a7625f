// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Property: the configuration-panel data model.
//!
//! This crate defines the model half of Trellis: named, typed, validated
//! settings ([`Property`]) collected into an ordered, uniquely-named
//! [`PropertyGraph`], plus the declarative cross-property constraints
//! ([`Rule`]) the graph owns. Evaluation lives in `trellis_rules`;
//! compiling declarative documents into graphs lives in `trellis_panel`.
//!
//! ## Core Concepts
//!
//! ### Values and domains
//!
//! [`Value`] is a closed set of value kinds (integer, real, boolean, text,
//! URI, 2-D/3-D vector, enumerated choice). Every property carries a
//! [`Domain`] (numeric range, componentwise vector range, or choice list)
//! and a [`FailurePolicy`] deciding what an out-of-domain write does:
//! reject, clamp, or fall back to the default.
//!
//! ### Handles and channels
//!
//! Properties are addressed by [`PropertyId`], a slot + generation handle:
//! removing a property bumps its slot's generation, so stale ids go dead
//! instead of aliasing a later occupant. Each property raises changes on
//! two independent [`Channel`]s — value changes and read-only-flag changes
//! — identified together by a [`Signal`].
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_property::{
//!     Domain, FailurePolicy, Property, PropertyGraph, Value, WriteOutcome,
//! };
//!
//! let mut graph = PropertyGraph::new();
//! let quality = graph
//!     .insert(Property::new("quality", Value::Int(3)).with_domain(Domain::int(1, 10)))
//!     .unwrap();
//!
//! // In-domain writes commit and report the old value.
//! let outcome = graph.set_value(quality, Value::Int(7)).unwrap();
//! assert_eq!(outcome, WriteOutcome::Committed { old: Value::Int(3) });
//!
//! // Out-of-domain writes follow the property's policy (clamp by default).
//! graph.set_value(quality, Value::Int(99)).unwrap();
//! assert_eq!(graph.get(quality).unwrap().value(), &Value::Int(10));
//!
//! // Rejecting properties error out instead, committing nothing.
//! let strict = graph
//!     .insert(
//!         Property::new("strict", Value::Int(0))
//!             .with_domain(Domain::int(0, 5))
//!             .with_policy(FailurePolicy::Reject),
//!     )
//!     .unwrap();
//! assert!(graph.set_value(strict, Value::Int(6)).is_err());
//! assert_eq!(graph.get(strict).unwrap().value(), &Value::Int(0));
//! ```
//!
//! ## Cloning
//!
//! [`PropertyGraph`] is deeply clonable: the clone duplicates properties
//! and rules but no live subscriptions — those belong to a
//! `trellis_rules` engine and are re-established by attaching a fresh
//! engine to the clone.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod change;
mod domain;
mod error;
mod graph;
mod id;
mod property;
mod rule;
mod value;

pub use change::Change;
pub use domain::{Domain, FailurePolicy};
pub use error::{GraphError, WriteError};
pub use graph::{PropertyGraph, WriteOutcome};
pub use id::{Channel, PropertyId, Signal};
pub use property::Property;
pub use rule::Rule;
pub use value::{Value, ValueKind, Vec3};
