// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The three-phase compiler: materialize, attach, build controls.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use trellis_property::{
    Domain, GraphError, Property, PropertyGraph, PropertyId, Rule, Value, ValueKind, WriteOutcome,
};
use trellis_rules::{EditError, RuleEngine};

use crate::controls::{Control, ControlFlags, ControlNode, LeafControl, PanelControl, Widget};
use crate::describe::{
    ConstraintDesc, ControlDesc, Document, ItemDesc, Overrides, PanelDesc, WidgetDesc,
};
use crate::error::CompileError;

/// A compiled, ready-to-use panel.
///
/// The graph holds the model, the engine keeps it consistent, and the root
/// control tree is what the UI renders. Leaves are bound to properties by
/// name and handle; the UI pushes edits through
/// [`Compiled::set_value_by_name`] (or the engine directly) and reads
/// current state back from the graph.
#[derive(Debug)]
pub struct Compiled {
    /// The materialized property graph, rules included.
    pub graph: PropertyGraph,
    /// The engine bound to `graph`, cascades primed.
    pub engine: RuleEngine,
    /// The bound control tree.
    pub root: Control,
}

impl Compiled {
    /// Writes a property by handle and runs the cascade.
    pub fn set_value(
        &mut self,
        id: PropertyId,
        value: Value,
    ) -> Result<WriteOutcome, EditError> {
        self.engine.set_value(&mut self.graph, id, value)
    }

    /// Writes a property by name and runs the cascade.
    pub fn set_value_by_name(
        &mut self,
        name: &str,
        value: Value,
    ) -> Result<WriteOutcome, EditError> {
        self.engine.set_value_by_name(&mut self.graph, name, value)
    }
}

/// Compiles a document with no external overrides.
pub fn compile(document: &Document) -> Result<Compiled, CompileError> {
    compile_with(document, &Overrides::new())
}

/// Compiles a document, with externally supplied defaults taking
/// precedence over declared control values.
///
/// Runs the three phases in order — materialize every property, attach
/// every rule (then bind an engine and prime it), build the control tree —
/// and never interleaves them, which is what lets constraints reference
/// controls declared later in the document.
pub fn compile_with(
    document: &Document,
    overrides: &Overrides,
) -> Result<Compiled, CompileError> {
    let mut graph = PropertyGraph::new();
    for panel in &document.panels {
        materialize_panel(panel, overrides, &mut graph)?;
    }
    for panel in &document.panels {
        attach_panel(panel, &mut graph)?;
    }
    let mut engine = RuleEngine::attach(&graph)?;
    engine.prime(&mut graph).map_err(CompileError::Prime)?;
    let root = build_root(document, &graph);
    Ok(Compiled {
        graph,
        engine,
        root,
    })
}

// =========================================================================
// Phase 1: materialize properties
// =========================================================================

fn materialize_panel(
    panel: &PanelDesc,
    overrides: &Overrides,
    graph: &mut PropertyGraph,
) -> Result<(), CompileError> {
    for item in &panel.items {
        match item {
            ItemDesc::Panel(sub) => materialize_panel(sub, overrides, graph)?,
            ItemDesc::Control(control) => materialize_control(control, overrides, graph)?,
        }
    }
    Ok(())
}

fn materialize_control(
    desc: &ControlDesc,
    overrides: &Overrides,
    graph: &mut PropertyGraph,
) -> Result<(), CompileError> {
    let (kind, declared, domain) = describe_property(desc)?;
    let default = overrides
        .get(&desc.name)
        .cloned()
        .or(declared)
        .unwrap_or_else(|| domain.clamp(Value::zero(kind)));
    let property = Property::new(desc.name.clone(), default)
        .with_domain(domain)
        .with_policy(desc.policy)
        .read_only(desc.read_only);
    graph.insert(property)?;
    Ok(())
}

/// Maps a widget descriptor to the property it implies: value kind,
/// declared value (if any), and domain.
fn describe_property(
    desc: &ControlDesc,
) -> Result<(ValueKind, Option<Value>, Domain), CompileError> {
    Ok(match &desc.widget {
        WidgetDesc::Slider {
            value, min, max, ..
        } => (
            ValueKind::Real,
            value.map(Value::Real),
            Domain::real(*min, *max),
        ),
        WidgetDesc::SpinBox {
            value, min, max, ..
        } => (
            ValueKind::Int,
            value.map(Value::Int),
            Domain::int(*min, *max),
        ),
        WidgetDesc::Toggle { value } => (ValueKind::Bool, value.map(Value::Bool), Domain::Full),
        WidgetDesc::TextBox { value } => (
            ValueKind::Text,
            value.clone().map(Value::Text),
            Domain::Full,
        ),
        WidgetDesc::UriBox { value } => {
            (ValueKind::Uri, value.clone().map(Value::Uri), Domain::Full)
        }
        WidgetDesc::Vec2Box { value, min, max } => (
            ValueKind::Vec2,
            value.map(Value::Vec2),
            Domain::vec2(*min, *max),
        ),
        WidgetDesc::Vec3Box { value, min, max } => (
            ValueKind::Vec3,
            value.map(Value::Vec3),
            Domain::vec3(*min, *max),
        ),
        WidgetDesc::Chooser { value, choices } => {
            if choices.is_empty() {
                return Err(CompileError::EmptyChoices {
                    control: desc.name.clone(),
                });
            }
            (
                ValueKind::Choice,
                value.clone().map(Value::Choice),
                Domain::choices(choices.iter().cloned()),
            )
        }
    })
}

// =========================================================================
// Phase 2: attach rules
// =========================================================================

fn attach_panel(panel: &PanelDesc, graph: &mut PropertyGraph) -> Result<(), CompileError> {
    for item in &panel.items {
        match item {
            ItemDesc::Panel(sub) => attach_panel(sub, graph)?,
            ItemDesc::Control(control) => attach_control(control, graph)?,
        }
    }
    Ok(())
}

fn attach_control(desc: &ControlDesc, graph: &mut PropertyGraph) -> Result<(), CompileError> {
    for constraint in &desc.constraints {
        let rule = match constraint {
            ConstraintDesc::ReadOnlyIfBool { source, invert } => {
                Rule::read_only_if_bool(desc.name.as_str(), source.as_str(), *invert)
            }
            ConstraintDesc::ReadOnlyIfValueIn {
                source,
                values,
                invert,
            } => {
                let parsed = parse_value_list(graph, &desc.name, source, values)?;
                Rule::read_only_if_value_in(desc.name.as_str(), source.as_str(), parsed, *invert)
            }
            ConstraintDesc::ReadOnlyIfAnyEquals { pairs, invert } => {
                if pairs.is_empty() {
                    return Err(CompileError::EmptyValueList {
                        control: desc.name.clone(),
                    });
                }
                let mut typed = Vec::with_capacity(pairs.len());
                for (source, literal) in pairs {
                    typed.push((source.clone(), parse_one(graph, &desc.name, source, literal)?));
                }
                Rule::read_only_if_any_equals(desc.name.as_str(), typed, *invert)
            }
            ConstraintDesc::LinkedPair {
                partners,
                source,
                invert,
            } => {
                let mut targets = vec![desc.name.clone()];
                targets.extend(partners.iter().cloned());
                Rule::select_writable(targets, source.as_str(), *invert)
            }
            ConstraintDesc::CoupleMinMax { max } => {
                Rule::couple_min_max(desc.name.as_str(), max.as_str())
            }
        };
        graph.add_rule(rule)?;
    }
    Ok(())
}

fn source_kind(graph: &PropertyGraph, source: &str) -> Result<ValueKind, CompileError> {
    let id = graph
        .by_name(source)
        .ok_or_else(|| CompileError::Graph(GraphError::UnknownProperty(source.to_string())))?;
    Ok(graph
        .get(id)
        .expect("resolved ids are live")
        .default_value()
        .kind())
}

fn parse_one(
    graph: &PropertyGraph,
    control: &str,
    source: &str,
    literal: &str,
) -> Result<Value, CompileError> {
    let kind = source_kind(graph, source)?;
    Value::parse_literal(kind, literal).ok_or_else(|| CompileError::BadLiteral {
        control: control.to_string(),
        literal: literal.trim().to_string(),
        expected: kind,
    })
}

fn parse_value_list(
    graph: &PropertyGraph,
    control: &str,
    source: &str,
    values: &str,
) -> Result<Vec<Value>, CompileError> {
    if values.trim().is_empty() {
        return Err(CompileError::EmptyValueList {
            control: control.to_string(),
        });
    }
    values
        .split(',')
        .map(|literal| parse_one(graph, control, source, literal))
        .collect()
}

// =========================================================================
// Phase 3: build the control tree
// =========================================================================

fn build_root(document: &Document, graph: &PropertyGraph) -> Control {
    let mut panels: Vec<PanelControl> = document
        .panels
        .iter()
        .map(|panel| build_panel(panel, graph))
        .collect();
    if panels.len() == 1 {
        Control::Panel(panels.remove(0))
    } else {
        Control::Tabs(panels)
    }
}

fn build_panel(panel: &PanelDesc, graph: &PropertyGraph) -> PanelControl {
    PanelControl {
        name: panel.name.clone(),
        title: panel.title.clone(),
        children: panel
            .items
            .iter()
            .map(|item| match item {
                ItemDesc::Panel(sub) => ControlNode::Panel(build_panel(sub, graph)),
                ItemDesc::Control(desc) => ControlNode::Leaf(build_leaf(desc, graph)),
            })
            .collect(),
    }
}

fn build_leaf(desc: &ControlDesc, graph: &PropertyGraph) -> LeafControl {
    let widget = match &desc.widget {
        WidgetDesc::Slider {
            min, max, step, ..
        } => Widget::Slider {
            min: *min,
            max: *max,
            step: *step,
        },
        WidgetDesc::SpinBox {
            min, max, step, ..
        } => Widget::SpinBox {
            min: *min,
            max: *max,
            step: *step,
        },
        WidgetDesc::Toggle { .. } => Widget::Toggle,
        WidgetDesc::TextBox { .. } => Widget::TextBox,
        WidgetDesc::UriBox { .. } => Widget::UriBox,
        WidgetDesc::Vec2Box { min, max, .. } => Widget::Vec2Box {
            min: *min,
            max: *max,
        },
        WidgetDesc::Vec3Box { min, max, .. } => Widget::Vec3Box {
            min: *min,
            max: *max,
        },
        WidgetDesc::Chooser { choices, .. } => Widget::Chooser {
            choices: choices.clone(),
        },
    };
    let accent = widget.default_accent();
    let mut flags = ControlFlags::default();
    if matches!(widget, Widget::TextBox | Widget::UriBox) {
        flags |= ControlFlags::FULL_WIDTH;
    }
    LeafControl {
        name: desc.name.clone(),
        label: desc.label.clone(),
        property: graph
            .by_name(&desc.name)
            .expect("phase 1 materialized every control"),
        widget,
        accent,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use trellis_property::FailurePolicy;

    fn slider(name: &str, value: Option<f64>, min: f64, max: f64) -> ControlDesc {
        ControlDesc::new(
            name,
            name.to_string(),
            WidgetDesc::Slider {
                value,
                min,
                max,
                step: 0.1,
            },
        )
    }

    fn single_panel(controls: impl IntoIterator<Item = ControlDesc>) -> Document {
        let mut panel = PanelDesc::new("main", "Main");
        for control in controls {
            panel = panel.with_control(control);
        }
        Document::new().with_panel(panel)
    }

    #[test]
    fn unset_default_is_synthesized_by_clamping_zero() {
        let compiled = compile(&single_panel([slider("level", None, 2.0, 5.0)])).unwrap();
        let id = compiled.graph.by_name("level").unwrap();
        assert_eq!(compiled.graph.get(id).unwrap().value(), &Value::Real(2.0));
    }

    #[test]
    fn declared_value_follows_policy() {
        // Default policy clamps the out-of-range declared value.
        let compiled = compile(&single_panel([slider("level", Some(9.0), 0.0, 1.0)])).unwrap();
        let id = compiled.graph.by_name("level").unwrap();
        assert_eq!(compiled.graph.get(id).unwrap().value(), &Value::Real(1.0));

        // A rejecting control refuses to compile instead.
        let err = compile(&single_panel([
            slider("level", Some(9.0), 0.0, 1.0).with_policy(FailurePolicy::Reject)
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::Graph(GraphError::ValueRejected("level".to_string()))
        );
    }

    #[test]
    fn overrides_win_over_declared_values() {
        let overrides = Overrides::new().with("level", Value::Real(0.25));
        let compiled = compile_with(
            &single_panel([slider("level", Some(0.9), 0.0, 1.0)]),
            &overrides,
        )
        .unwrap();
        let id = compiled.graph.by_name("level").unwrap();
        assert_eq!(compiled.graph.get(id).unwrap().value(), &Value::Real(0.25));
    }

    #[test]
    fn override_of_wrong_kind_is_a_compile_error() {
        let overrides = Overrides::new().with("level", Value::Bool(true));
        let err = compile_with(
            &single_panel([slider("level", None, 0.0, 1.0)]),
            &overrides,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CompileError::Graph(GraphError::KindMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_control_names_fail() {
        let err = compile(&single_panel([
            slider("level", None, 0.0, 1.0),
            slider("level", None, 0.0, 2.0),
        ]))
        .unwrap_err();
        assert_eq!(err, CompileError::DuplicateControl("level".to_string()));
    }

    #[test]
    fn chooser_defaults_to_first_choice() {
        let document = single_panel([ControlDesc::new(
            "mode",
            "Mode",
            WidgetDesc::Chooser {
                value: None,
                choices: vec!["auto".to_string(), "manual".to_string()],
            },
        )]);
        let compiled = compile(&document).unwrap();
        let id = compiled.graph.by_name("mode").unwrap();
        assert_eq!(
            compiled.graph.get(id).unwrap().value(),
            &Value::Choice("auto".to_string())
        );
    }

    #[test]
    fn chooser_without_choices_fails() {
        let document = single_panel([ControlDesc::new(
            "mode",
            "Mode",
            WidgetDesc::Chooser {
                value: None,
                choices: Vec::new(),
            },
        )]);
        assert_eq!(
            compile(&document).unwrap_err(),
            CompileError::EmptyChoices {
                control: "mode".to_string()
            }
        );
    }

    #[test]
    fn constraints_resolve_forward_references() {
        // "level" names "mute" before "mute" is declared.
        let document = single_panel([
            slider("level", None, 0.0, 1.0).with_constraint(ConstraintDesc::ReadOnlyIfBool {
                source: "mute".to_string(),
                invert: false,
            }),
            ControlDesc::new("mute", "Mute", WidgetDesc::Toggle { value: Some(true) }),
        ]);
        let compiled = compile(&document).unwrap();
        // Priming applied the rule to the declared-true toggle.
        let id = compiled.graph.by_name("level").unwrap();
        assert!(compiled.graph.get(id).unwrap().is_read_only());
    }

    #[test]
    fn unknown_constraint_source_fails_at_attach() {
        let document = single_panel([slider("level", None, 0.0, 1.0).with_constraint(
            ConstraintDesc::ReadOnlyIfBool {
                source: "ghost".to_string(),
                invert: false,
            },
        )]);
        assert_eq!(
            compile(&document).unwrap_err(),
            CompileError::Graph(GraphError::UnknownProperty("ghost".to_string()))
        );
    }

    #[test]
    fn malformed_literal_lists_fail_at_attach() {
        let spin = ControlDesc::new(
            "count",
            "Count",
            WidgetDesc::SpinBox {
                value: Some(1),
                min: 0,
                max: 9,
                step: 1,
            },
        );
        let gated = |values: &str| {
            single_panel([
                spin.clone(),
                slider("level", None, 0.0, 1.0).with_constraint(
                    ConstraintDesc::ReadOnlyIfValueIn {
                        source: "count".to_string(),
                        values: values.to_string(),
                        invert: false,
                    },
                ),
            ])
        };

        assert!(matches!(
            compile(&gated("1, two, 3")).unwrap_err(),
            CompileError::BadLiteral { expected: ValueKind::Int, .. }
        ));
        assert_eq!(
            compile(&gated("  ")).unwrap_err(),
            CompileError::EmptyValueList {
                control: "level".to_string()
            }
        );
        // A well-formed list compiles and binds.
        assert!(compile(&gated("1, 2, 3")).is_ok());
    }

    #[test]
    fn single_panel_is_the_root_directly() {
        let compiled = compile(&single_panel([slider("level", None, 0.0, 1.0)])).unwrap();
        match &compiled.root {
            Control::Panel(panel) => assert_eq!(panel.name, "main"),
            Control::Tabs(_) => panic!("single panel must not be wrapped in tabs"),
        }
    }

    #[test]
    fn two_panels_become_tabs_in_order() {
        let document = Document::new()
            .with_panel(PanelDesc::new("one", "One").with_control(slider("a", None, 0.0, 1.0)))
            .with_panel(PanelDesc::new("two", "Two").with_control(slider("b", None, 0.0, 1.0)));
        let compiled = compile(&document).unwrap();
        match &compiled.root {
            Control::Tabs(panels) => {
                assert_eq!(panels.len(), 2);
                assert_eq!(panels[0].name, "one");
                assert_eq!(panels[1].name, "two");
            }
            Control::Panel(_) => panic!("two panels must be wrapped in tabs"),
        }
    }

    #[test]
    fn leaves_bind_to_their_properties() {
        let document = single_panel([slider("level", None, 0.0, 1.0)]);
        let compiled = compile(&document).unwrap();
        let leaf = compiled.root.leaf("level").unwrap();
        assert_eq!(Some(leaf.property), compiled.graph.by_name("level"));
        assert!(matches!(leaf.widget, Widget::Slider { .. }));
        assert!(leaf.flags.contains(ControlFlags::SHOW_LABEL));
    }

    #[test]
    fn sub_panels_contribute_to_the_flat_graph() {
        let document = Document::new().with_panel(
            PanelDesc::new("main", "Main")
                .with_control(slider("outer", None, 0.0, 1.0))
                .with_panel(
                    PanelDesc::new("nested", "Nested")
                        .with_control(slider("inner", None, 0.0, 1.0)),
                ),
        );
        let compiled = compile(&document).unwrap();
        assert_eq!(compiled.graph.len(), 2);
        assert!(compiled.graph.by_name("inner").is_some());
        assert!(compiled.root.leaf("inner").is_some());
    }
}
