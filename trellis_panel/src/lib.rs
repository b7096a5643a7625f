// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Panel: from declarative descriptions to live panels.
//!
//! This crate is the compiler at the top of the Trellis stack. It consumes
//! an already-parsed [`Document`] — a tree of typed control descriptors
//! with constraint annotations — and produces a [`Compiled`] panel: a
//! populated [`PropertyGraph`](trellis_property::PropertyGraph), an
//! attached [`RuleEngine`](trellis_rules::RuleEngine), and a [`Control`]
//! tree whose leaves are bound one-to-one to properties by name.
//!
//! ## Three phases, never interleaved
//!
//! 1. **Materialize** — depth-first over the document, one property per
//!    leaf control. A declared value is admitted through the control's
//!    failure policy (the default policy clamps, never rejects); an
//!    undeclared one is synthesized by clamping the kind's zero/empty
//!    value into the declared range. Sub-panels contribute their leaves to
//!    the same flat graph.
//! 2. **Attach** — a second walk turns every constraint annotation into a
//!    [`Rule`](trellis_property::Rule) and registers it. Forward references
//!    resolve because phase 1 has materialized every property; a constraint
//!    naming an unknown control, or carrying a malformed literal list, is a
//!    hard error here, never at evaluation time.
//! 3. **Build controls** — one [`LeafControl`] per property, assembled into
//!    panels. Two or more top-level panels become a tabbed root with one
//!    tab per panel in declaration order; a single panel is the root
//!    itself.
//!
//! Unrecognized control kinds cannot occur: [`WidgetDesc`] is a closed sum
//! matched exhaustively, so adding a kind is a compile-time change.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_panel::{
//!     compile, ConstraintDesc, ControlDesc, Document, PanelDesc, WidgetDesc,
//! };
//! use trellis_property::Value;
//!
//! let document = Document::new().with_panel(
//!     PanelDesc::new("audio", "Audio")
//!         .with_control(ControlDesc::new(
//!             "mute",
//!             "Mute",
//!             WidgetDesc::Toggle { value: Some(false) },
//!         ))
//!         .with_control(
//!             ControlDesc::new(
//!                 "volume",
//!                 "Volume",
//!                 WidgetDesc::Slider { value: Some(0.8), min: 0.0, max: 1.0, step: 0.05 },
//!             )
//!             .with_constraint(ConstraintDesc::ReadOnlyIfBool {
//!                 source: "mute".into(),
//!                 invert: false,
//!             }),
//!         ),
//! );
//!
//! let mut panel = compile(&document).unwrap();
//! let volume = panel.graph.by_name("volume").unwrap();
//!
//! // Muting locks the volume control.
//! panel.set_value_by_name("mute", Value::Bool(true)).unwrap();
//! assert!(panel.graph.get(volume).unwrap().is_read_only());
//! ```
//!
//! The UI layer renders [`Compiled::root`], pushes user edits through
//! [`Compiled::set_value_by_name`] (or the engine directly), and re-reads
//! property state for values, read-only flags, and ranges.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod compile;
mod controls;
mod describe;
mod error;

pub use compile::{Compiled, compile, compile_with};
pub use controls::{Control, ControlFlags, ControlNode, LeafControl, PanelControl, Widget};
pub use describe::{
    ConstraintDesc, ControlDesc, Document, ItemDesc, Overrides, PanelDesc, WidgetDesc,
};
pub use error::CompileError;
