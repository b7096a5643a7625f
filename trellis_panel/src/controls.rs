// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bound control tree the compiler hands to the UI layer.
//!
//! These nodes are render-side configuration only: display text,
//! increments, accent colors, layout flags, and the property each leaf is
//! bound to. Current values, read-only flags, and ranges are *not* copied
//! here — the UI reads them from the graph through the leaf's
//! [`property`](LeafControl::property) handle, so rendered state can never
//! drift from model state.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Vec2;
use peniko::Color;

use trellis_property::{PropertyId, Vec3};

bitflags::bitflags! {
    /// Per-control display flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ControlFlags: u8 {
        /// Render the label next to the control.
        const SHOW_LABEL = 0b0000_0001;
        /// Render the current value next to the control.
        const SHOW_VALUE = 0b0000_0010;
        /// Stretch the control across the panel's width.
        const FULL_WIDTH = 0b0000_0100;
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self::SHOW_LABEL | Self::SHOW_VALUE
    }
}

/// Render-side parameters per control kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Widget {
    /// Real-valued slider.
    Slider {
        /// Track lower bound.
        min: f64,
        /// Track upper bound.
        max: f64,
        /// Drag/arrow increment.
        step: f64,
    },
    /// Integer spin box.
    SpinBox {
        /// Smallest value.
        min: i64,
        /// Largest value.
        max: i64,
        /// Arrow increment.
        step: i64,
    },
    /// Boolean toggle.
    Toggle,
    /// Free-text box.
    TextBox,
    /// URI box with a picker affordance.
    UriBox,
    /// 2-D vector input.
    Vec2Box {
        /// Componentwise lower bound.
        min: Vec2,
        /// Componentwise upper bound.
        max: Vec2,
    },
    /// 3-D vector input.
    Vec3Box {
        /// Componentwise lower bound.
        min: Vec3,
        /// Componentwise upper bound.
        max: Vec3,
    },
    /// Enumerated chooser.
    Chooser {
        /// Tags in declaration order.
        choices: Vec<String>,
    },
}

impl Widget {
    /// Default accent color for this control kind.
    ///
    /// Numeric inputs share one accent, toggles and choosers each get their
    /// own, so mixed panels read consistently without a theme layer.
    #[must_use]
    pub fn default_accent(&self) -> Color {
        match self {
            Self::Slider { .. } | Self::SpinBox { .. } => Color::from_rgb8(0x4f, 0x8c, 0xc9),
            Self::Toggle => Color::from_rgb8(0x5c, 0xb8, 0x5c),
            Self::TextBox | Self::UriBox => Color::from_rgb8(0x8a, 0x8a, 0x8a),
            Self::Vec2Box { .. } | Self::Vec3Box { .. } => Color::from_rgb8(0xc9, 0x8c, 0x4f),
            Self::Chooser { .. } => Color::from_rgb8(0x9c, 0x6b, 0xc9),
        }
    }
}

/// One leaf control, bound to exactly one property.
#[derive(Clone, Debug)]
pub struct LeafControl {
    /// The bound property's name (equals the descriptor's control name).
    pub name: String,
    /// Display label.
    pub label: String,
    /// Handle of the bound property in the compiled graph.
    pub property: PropertyId,
    /// Render parameters.
    pub widget: Widget,
    /// Accent color.
    pub accent: Color,
    /// Display flags.
    pub flags: ControlFlags,
}

/// A panel of controls and nested sub-panels.
#[derive(Clone, Debug)]
pub struct PanelControl {
    /// The panel's name (tab identity).
    pub name: String,
    /// Human-readable title (tab label).
    pub title: String,
    /// Children in declaration order.
    pub children: Vec<ControlNode>,
}

/// A node in a panel: a leaf control or a nested panel.
#[derive(Clone, Debug)]
pub enum ControlNode {
    /// A nested sub-panel.
    Panel(PanelControl),
    /// A leaf control.
    Leaf(LeafControl),
}

/// The root of a compiled control tree.
#[derive(Clone, Debug)]
pub enum Control {
    /// More than one top-level panel: a tabbed container, one tab per
    /// panel in declaration order.
    Tabs(Vec<PanelControl>),
    /// Exactly one top-level panel: the panel itself is the root.
    Panel(PanelControl),
}

impl Control {
    /// Finds a leaf control by name anywhere in the tree.
    #[must_use]
    pub fn leaf(&self, name: &str) -> Option<&LeafControl> {
        fn in_panel<'a>(panel: &'a PanelControl, name: &str) -> Option<&'a LeafControl> {
            panel.children.iter().find_map(|child| match child {
                ControlNode::Leaf(leaf) if leaf.name == name => Some(leaf),
                ControlNode::Leaf(_) => None,
                ControlNode::Panel(sub) => in_panel(sub, name),
            })
        }
        match self {
            Self::Tabs(panels) => panels.iter().find_map(|p| in_panel(p, name)),
            Self::Panel(panel) => in_panel(panel, name),
        }
    }

    /// The top-level panels: the tabs, or the single root panel.
    #[must_use]
    pub fn panels(&self) -> &[PanelControl] {
        match self {
            Self::Tabs(panels) => panels,
            Self::Panel(panel) => core::slice::from_ref(panel),
        }
    }
}
