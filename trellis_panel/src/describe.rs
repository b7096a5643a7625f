// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The descriptor document an upstream parser hands the compiler.
//!
//! Everything here is plain data: a [`Document`] of panels, panels of
//! controls and sub-panels, controls carrying a [`WidgetDesc`] (the closed
//! sum over supported control kinds) and zero or more [`ConstraintDesc`]
//! annotations. Match values in annotations are carried as literal text —
//! the compiler parses them against the named source's kind during the
//! attach phase, where a bad literal is a hard configuration error.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Vec2;

use trellis_property::{FailurePolicy, Value, Vec3};

/// A parsed panel document: the compiler's input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// Top-level panels, in declaration order. More than one yields a
    /// tabbed root.
    pub panels: Vec<PanelDesc>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level panel.
    #[must_use]
    pub fn with_panel(mut self, panel: PanelDesc) -> Self {
        self.panels.push(panel);
        self
    }
}

/// One panel: a named group of controls and nested sub-panels.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelDesc {
    /// Unique name (used for tab identity, not property binding).
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Children in declaration order.
    pub items: Vec<ItemDesc>,
}

impl PanelDesc {
    /// Creates an empty panel.
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Appends a leaf control.
    #[must_use]
    pub fn with_control(mut self, control: ControlDesc) -> Self {
        self.items.push(ItemDesc::Control(control));
        self
    }

    /// Appends a nested sub-panel.
    #[must_use]
    pub fn with_panel(mut self, panel: PanelDesc) -> Self {
        self.items.push(ItemDesc::Panel(panel));
        self
    }
}

/// A panel child: either a nested panel or a leaf control.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemDesc {
    /// A nested sub-panel; its leaves join the same flat property graph.
    Panel(PanelDesc),
    /// A leaf control, bound to exactly one property.
    Control(ControlDesc),
}

/// One leaf control descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlDesc {
    /// Property name; unique across the whole document.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Which control kind, with its declared value and range/choice data.
    pub widget: WidgetDesc,
    /// Initial read-only flag.
    pub read_only: bool,
    /// What an out-of-domain write does.
    pub policy: FailurePolicy,
    /// Constraint annotations targeting this control.
    pub constraints: Vec<ConstraintDesc>,
}

impl ControlDesc {
    /// Creates a control with the default (clamping) policy and no
    /// constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, widget: WidgetDesc) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            widget,
            read_only: false,
            policy: FailurePolicy::default(),
            constraints: Vec::new(),
        }
    }

    /// Sets the initial read-only flag.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the validation-failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Appends a constraint annotation.
    #[must_use]
    pub fn with_constraint(mut self, constraint: ConstraintDesc) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// The closed sum of supported control kinds.
///
/// Each variant carries the control's optionally-declared value plus the
/// range or choice data its property domain is built from. Adding a control
/// kind means adding a variant here and handling it in the compiler's
/// exhaustive matches.
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetDesc {
    /// Real-valued slider.
    Slider {
        /// Declared value, if any.
        value: Option<f64>,
        /// Range lower bound.
        min: f64,
        /// Range upper bound.
        max: f64,
        /// UI increment.
        step: f64,
    },
    /// Integer spin box.
    SpinBox {
        /// Declared value, if any.
        value: Option<i64>,
        /// Range lower bound.
        min: i64,
        /// Range upper bound.
        max: i64,
        /// UI increment.
        step: i64,
    },
    /// Boolean toggle.
    Toggle {
        /// Declared value, if any.
        value: Option<bool>,
    },
    /// Free-text box.
    TextBox {
        /// Declared value, if any.
        value: Option<String>,
    },
    /// URI box (rendered with a picker).
    UriBox {
        /// Declared value, if any.
        value: Option<String>,
    },
    /// 2-D vector input.
    Vec2Box {
        /// Declared value, if any.
        value: Option<Vec2>,
        /// Componentwise lower bound.
        min: Vec2,
        /// Componentwise upper bound.
        max: Vec2,
    },
    /// 3-D vector input.
    Vec3Box {
        /// Declared value, if any.
        value: Option<Vec3>,
        /// Componentwise lower bound.
        min: Vec3,
        /// Componentwise upper bound.
        max: Vec3,
    },
    /// Enumerated chooser.
    Chooser {
        /// Declared tag, if any.
        value: Option<String>,
        /// The choice set; must be non-empty.
        choices: Vec<String>,
    },
}

/// A constraint annotation on one control.
///
/// The annotated control is the constraint's target; sources are named.
/// Match values are literal text (single literals or comma-separated
/// lists), parsed against the source's kind at attach time.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintDesc {
    /// Target is read-only while the named boolean control is true
    /// (`invert` flips the sense).
    ReadOnlyIfBool {
        /// The boolean source control.
        source: String,
        /// Flip the sense.
        invert: bool,
    },
    /// Target is read-only while the source's value is in the literal list.
    ReadOnlyIfValueIn {
        /// The source control.
        source: String,
        /// Comma-separated literals of the source's kind; must be
        /// non-empty.
        values: String,
        /// Flip the sense.
        invert: bool,
    },
    /// Target is read-only while any `(source, literal)` pair matches.
    ReadOnlyIfAnyEquals {
        /// `(source control, literal)` pairs; must be non-empty.
        pairs: Vec<(String, String)>,
        /// Flip the sense.
        invert: bool,
    },
    /// The named boolean selects whether the target (true) or its partner
    /// (false) is the writable end of a linked pair; the other end is
    /// read-only and writes to it are ignored.
    LinkedPair {
        /// The partner controls, in selection order after the target.
        partners: Vec<String>,
        /// The boolean source control doing the selecting.
        source: String,
        /// Flip which end the boolean selects.
        invert: bool,
    },
    /// Soft mutual bound: the target is the minimum, the named control the
    /// maximum, and whichever is edited drags the other along rather than
    /// rejecting the edit.
    CoupleMinMax {
        /// The maximum-end control.
        max: String,
    },
}

/// Externally supplied defaults, overriding declared control values by
/// property name.
///
/// # Example
///
/// ```rust
/// use trellis_panel::Overrides;
/// use trellis_property::Value;
///
/// let overrides = Overrides::new().with("volume", Value::Real(0.25));
/// assert_eq!(overrides.get("volume"), Some(&Value::Real(0.25)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    values: HashMap<String, Value>,
}

impl Overrides {
    /// Creates an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an override for `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Returns the override for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns `true` if no overrides are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
