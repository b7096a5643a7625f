// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rule engine: binding, delivery, and cascades.

use core::cmp::Ordering;
use core::fmt;

use alloc::vec::Vec;
use smallvec::SmallVec;

use trellis_broker::{Delivery, EventBroker};
use trellis_property::{
    Change, PropertyGraph, PropertyId, Rule, Signal, Value, WriteError, WriteOutcome,
};

use crate::binding::{Binding, BindingArena, BindingId};
use crate::error::{BindError, CascadeError, EditError};
use crate::trace::{CascadeTrace, NullTrace};

/// Default bound on cascade nesting.
///
/// Honest rule sets settle within a handful of deliveries; hitting this
/// bound means the document wired rules into a cycle that does not.
pub const DEFAULT_MAX_DEPTH: u32 = 32;

/// A [`Rule`] with its names resolved to handles, ready to evaluate.
#[derive(Clone, Debug)]
enum ResolvedRule {
    ReadOnlyIfBool {
        target: PropertyId,
        source: PropertyId,
        invert: bool,
    },
    ReadOnlyIfValueIn {
        target: PropertyId,
        source: PropertyId,
        values: Vec<Value>,
        invert: bool,
    },
    ReadOnlyIfAnyEquals {
        target: PropertyId,
        pairs: SmallVec<[(PropertyId, Value); 2]>,
        invert: bool,
    },
    SelectWritable {
        targets: SmallVec<[PropertyId; 2]>,
        source: PropertyId,
        invert: bool,
    },
    CoupleMinMax {
        min: PropertyId,
        max: PropertyId,
    },
}

impl ResolvedRule {
    /// The signals whose changes re-evaluate this rule.
    fn triggers(&self) -> SmallVec<[Signal; 2]> {
        let mut triggers = SmallVec::new();
        let mut push = |signal: Signal| {
            if !triggers.contains(&signal) {
                triggers.push(signal);
            }
        };
        match self {
            Self::ReadOnlyIfBool { source, .. }
            | Self::ReadOnlyIfValueIn { source, .. }
            | Self::SelectWritable { source, .. } => push(Signal::value(*source)),
            Self::ReadOnlyIfAnyEquals { pairs, .. } => {
                for (source, _) in pairs {
                    push(Signal::value(*source));
                }
            }
            Self::CoupleMinMax { min, max } => {
                push(Signal::value(*min));
                push(Signal::value(*max));
            }
        }
        triggers
    }
}

/// Binds a graph's rules to its properties and drives change cascades.
///
/// An engine is attached to one graph and holds the live half of the model:
/// resolved rules, their bindings (the broker's handler keys), and the
/// broker bookkeeping itself. The graph stays plain data — cloning it and
/// attaching a fresh engine to the clone yields a fully independent panel.
///
/// All edits flow through [`RuleEngine::set_value`] (or its by-name and
/// traced variants): the write commits through the property's gate, domain
/// and policy, and every committed change is delivered synchronously,
/// depth-first, to the live bindings of its signal. See the
/// [crate docs](crate) for the full contract.
pub struct RuleEngine {
    broker: EventBroker<Signal, BindingId>,
    bindings: BindingArena,
    rules: Vec<ResolvedRule>,
    /// Per rule, the bindings it owns; emptied when the rule is released.
    rule_bindings: Vec<SmallVec<[BindingId; 2]>>,
    max_depth: u32,
    depth: u32,
}

impl RuleEngine {
    /// Resolves and binds every rule of `graph`, with the
    /// [default](DEFAULT_MAX_DEPTH) cascade bound.
    ///
    /// # Errors
    ///
    /// [`BindError`] when a rule references a property that is gone or
    /// ill-typed for it. Binding is all-or-nothing.
    pub fn attach(graph: &PropertyGraph) -> Result<Self, BindError> {
        Self::attach_with_max_depth(graph, DEFAULT_MAX_DEPTH)
    }

    /// Like [`RuleEngine::attach`], with an explicit cascade bound.
    pub fn attach_with_max_depth(
        graph: &PropertyGraph,
        max_depth: u32,
    ) -> Result<Self, BindError> {
        let mut engine = Self {
            broker: EventBroker::new(),
            bindings: BindingArena::default(),
            rules: Vec::new(),
            rule_bindings: Vec::new(),
            max_depth,
            depth: 0,
        };
        for (index, rule) in graph.rules().iter().enumerate() {
            engine.bind(graph, index, rule)?;
        }
        Ok(engine)
    }

    fn bind(&mut self, graph: &PropertyGraph, index: usize, rule: &Rule) -> Result<(), BindError> {
        graph
            .validate_rule(rule)
            .map_err(|error| BindError { rule: index, error })?;
        let resolve = |name: &str| {
            graph
                .by_name(name)
                .expect("validated rule names resolve")
        };
        let resolved = match rule {
            Rule::ReadOnlyIfBool {
                target,
                source,
                invert,
            } => ResolvedRule::ReadOnlyIfBool {
                target: resolve(target),
                source: resolve(source),
                invert: *invert,
            },
            Rule::ReadOnlyIfValueIn {
                target,
                source,
                values,
                invert,
            } => ResolvedRule::ReadOnlyIfValueIn {
                target: resolve(target),
                source: resolve(source),
                values: values.clone(),
                invert: *invert,
            },
            Rule::ReadOnlyIfAnyEquals {
                target,
                pairs,
                invert,
            } => ResolvedRule::ReadOnlyIfAnyEquals {
                target: resolve(target),
                pairs: pairs
                    .iter()
                    .map(|(source, value)| (resolve(source), value.clone()))
                    .collect(),
                invert: *invert,
            },
            Rule::SelectWritable {
                targets,
                source,
                invert,
            } => ResolvedRule::SelectWritable {
                targets: targets.iter().map(|t| resolve(t)).collect(),
                source: resolve(source),
                invert: *invert,
            },
            Rule::CoupleMinMax { min, max } => ResolvedRule::CoupleMinMax {
                min: resolve(min),
                max: resolve(max),
            },
        };

        let rule_index = self.rules.len();
        let mut ids = SmallVec::new();
        for trigger in resolved.triggers() {
            let id = self.bindings.insert(Binding {
                rule: rule_index,
                trigger,
            });
            self.broker.subscribe(trigger, id);
            ids.push(id);
        }
        self.rules.push(resolved);
        self.rule_bindings.push(ids);
        Ok(())
    }

    /// Evaluates every bound rule once, establishing the derived state the
    /// rules imply for the graph's current values.
    ///
    /// Freshly compiled panels call this so that, say, a checkbox declared
    /// `true` renders its dependents read-only before the first user edit.
    pub fn prime(&mut self, graph: &mut PropertyGraph) -> Result<(), EditError> {
        for index in 0..self.rules.len() {
            if self.rule_bindings[index].is_empty() {
                continue;
            }
            let Some(trigger) = self.rules[index].triggers().into_iter().next() else {
                continue;
            };
            self.evaluate(
                graph,
                Binding {
                    rule: index,
                    trigger,
                },
                &mut NullTrace,
            )?;
        }
        Ok(())
    }

    /// Writes a value and runs the resulting cascade.
    ///
    /// Returns the outcome of the triggering write itself; writes to
    /// read-only properties come back
    /// [`Suppressed`](WriteOutcome::Suppressed) without cascading.
    pub fn set_value(
        &mut self,
        graph: &mut PropertyGraph,
        id: PropertyId,
        value: Value,
    ) -> Result<WriteOutcome, EditError> {
        self.set_value_with_trace(graph, id, value, &mut NullTrace)
    }

    /// [`RuleEngine::set_value`] addressed by property name.
    pub fn set_value_by_name(
        &mut self,
        graph: &mut PropertyGraph,
        name: &str,
        value: Value,
    ) -> Result<WriteOutcome, EditError> {
        let id = graph
            .by_name(name)
            .ok_or_else(|| EditError::UnknownProperty(name.into()))?;
        self.set_value_with_trace(graph, id, value, &mut NullTrace)
    }

    /// [`RuleEngine::set_value`] reporting every commit to `trace`.
    pub fn set_value_with_trace(
        &mut self,
        graph: &mut PropertyGraph,
        id: PropertyId,
        value: Value,
        trace: &mut dyn CascadeTrace,
    ) -> Result<WriteOutcome, EditError> {
        let outcome = graph.set_value(id, value)?;
        if let WriteOutcome::Committed { old } = &outcome {
            let new = graph
                .get(id)
                .expect("a property written to is live")
                .value()
                .clone();
            let change = Change::Value {
                property: id,
                old: old.clone(),
                new,
            };
            self.notify(graph, &change, trace)?;
        }
        Ok(outcome)
    }

    /// Tears down one rule's subscriptions deterministically.
    ///
    /// The rule's bindings are retired (their ids go dead) and unsubscribed
    /// from the broker. The rule's slot stays so indices of later rules are
    /// unaffected; [`RuleEngine::prime`] skips released rules.
    pub fn release(&mut self, rule: usize) {
        let Some(ids) = self.rule_bindings.get_mut(rule) else {
            return;
        };
        for id in core::mem::take(ids) {
            if let Some(binding) = self.bindings.remove(id) {
                self.broker.unsubscribe(binding.trigger, id);
            }
        }
    }

    /// Returns the number of rules bound at attach (released ones included).
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if any binding is subscribed to `signal`.
    #[must_use]
    pub fn is_watching(&self, signal: Signal) -> bool {
        self.broker.has_subscribers(signal)
    }

    /// Returns the number of subscriptions recorded for `signal`.
    #[must_use]
    pub fn subscription_count(&self, signal: Signal) -> usize {
        self.broker.subscriber_count(signal)
    }

    /// Returns the cascade nesting bound.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Delivers one committed change and drains the resulting cascade.
    fn notify(
        &mut self,
        graph: &mut PropertyGraph,
        change: &Change,
        trace: &mut dyn CascadeTrace,
    ) -> Result<(), EditError> {
        trace.committed(change, self.depth);
        let signal = change.signal();
        let Some(mut delivery) = self.broker.deliver(signal) else {
            return Ok(());
        };
        if self.depth >= self.max_depth {
            return Err(CascadeError {
                max_depth: self.max_depth,
            }
            .into());
        }

        self.depth += 1;
        let result = self.drain(graph, &mut delivery, trace);
        self.depth -= 1;

        let stale = delivery.saw_stale();
        drop(delivery);
        if stale {
            let bindings = &self.bindings;
            self.broker.purge(signal, |id| bindings.is_alive(*id));
        }
        result
    }

    fn drain(
        &mut self,
        graph: &mut PropertyGraph,
        delivery: &mut Delivery<BindingId>,
        trace: &mut dyn CascadeTrace,
    ) -> Result<(), EditError> {
        loop {
            let next = {
                let bindings = &self.bindings;
                delivery.next(|id| bindings.is_alive(*id))
            };
            let Some(id) = next else {
                return Ok(());
            };
            let binding = *self.bindings.get(id).expect("cursor yields live bindings");
            self.evaluate(graph, binding, trace)?;
        }
    }

    /// Recomputes exactly the derived fact `binding`'s rule governs.
    ///
    /// A source or target that has died since attach makes the rule inert
    /// (skipped), matching the weak-subscription contract; the binding is
    /// reclaimed whenever its own side goes stale.
    fn evaluate(
        &mut self,
        graph: &mut PropertyGraph,
        binding: Binding,
        trace: &mut dyn CascadeTrace,
    ) -> Result<(), EditError> {
        let rule = self.rules[binding.rule].clone();
        match rule {
            ResolvedRule::ReadOnlyIfBool {
                target,
                source,
                invert,
            } => {
                let Some(flag) = graph.get(source).and_then(|p| p.value().as_bool()) else {
                    return Ok(());
                };
                self.commit_read_only(graph, target, flag ^ invert, trace)
            }
            ResolvedRule::ReadOnlyIfValueIn {
                target,
                source,
                values,
                invert,
            } => {
                let Some(hit) = graph.get(source).map(|p| values.contains(p.value())) else {
                    return Ok(());
                };
                self.commit_read_only(graph, target, hit ^ invert, trace)
            }
            ResolvedRule::ReadOnlyIfAnyEquals {
                target,
                pairs,
                invert,
            } => {
                let hit = pairs
                    .iter()
                    .any(|(source, value)| graph.get(*source).is_some_and(|p| p.value() == value));
                self.commit_read_only(graph, target, hit ^ invert, trace)
            }
            ResolvedRule::SelectWritable {
                targets,
                source,
                invert,
            } => {
                let Some(flag) = graph.get(source).and_then(|p| p.value().as_bool()) else {
                    return Ok(());
                };
                let selected = if flag ^ invert { 0 } else { 1 };
                for (index, target) in targets.iter().enumerate() {
                    self.commit_read_only(graph, *target, index != selected, trace)?;
                }
                Ok(())
            }
            ResolvedRule::CoupleMinMax { min, max } => {
                let leader_is_min = binding.trigger.property == min;
                let (leader, follower) = if leader_is_min { (min, max) } else { (max, min) };
                let (Some(lead), Some(follow)) = (
                    graph.get(leader).map(|p| p.value().clone()),
                    graph.get(follower).map(|p| p.value().clone()),
                ) else {
                    return Ok(());
                };
                let out_of_order = if leader_is_min {
                    follow.scalar_cmp(&lead) == Some(Ordering::Less)
                } else {
                    follow.scalar_cmp(&lead) == Some(Ordering::Greater)
                };
                if out_of_order {
                    self.commit_value_forced(graph, follower, lead, trace)?;
                }
                Ok(())
            }
        }
    }

    fn commit_read_only(
        &mut self,
        graph: &mut PropertyGraph,
        target: PropertyId,
        read_only: bool,
        trace: &mut dyn CascadeTrace,
    ) -> Result<(), EditError> {
        match graph.set_read_only(target, read_only) {
            Ok(true) => self.notify(
                graph,
                &Change::ReadOnly {
                    property: target,
                    read_only,
                },
                trace,
            ),
            Ok(false) => Ok(()),
            // The target died after attach; the rule is inert for it.
            Err(WriteError::StaleHandle) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    /// Commits a rule-driven value adjustment, bypassing the read-only
    /// gate (a disabled counterpart must still follow its partner). Domain
    /// and policy still apply, so the adjustment may itself be clamped.
    fn commit_value_forced(
        &mut self,
        graph: &mut PropertyGraph,
        target: PropertyId,
        value: Value,
        trace: &mut dyn CascadeTrace,
    ) -> Result<(), EditError> {
        match graph.set_value_forced(target, value) {
            Ok(WriteOutcome::Committed { old }) => {
                let new = graph
                    .get(target)
                    .expect("a property written to is live")
                    .value()
                    .clone();
                self.notify(
                    graph,
                    &Change::Value {
                        property: target,
                        old,
                        new,
                    },
                    trace,
                )
            }
            Ok(_) => Ok(()),
            Err(WriteError::StaleHandle) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rules.len())
            .field("broker", &self.broker)
            .field("max_depth", &self.max_depth)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;
    use crate::trace::CascadeRecorder;
    use trellis_property::{Channel, Domain, Property};

    fn bool_gate_graph(initial: bool, invert: bool) -> (PropertyGraph, PropertyId, PropertyId) {
        let mut graph = PropertyGraph::new();
        let locked = graph
            .insert(Property::new("locked", Value::Bool(initial)))
            .unwrap();
        let gain = graph
            .insert(Property::new("gain", Value::Real(1.0)).with_domain(Domain::real(0.0, 2.0)))
            .unwrap();
        graph
            .add_rule(Rule::read_only_if_bool("gain", "locked", invert))
            .unwrap();
        (graph, locked, gain)
    }

    #[test]
    fn bool_rule_flips_read_only_with_invert_matrix() {
        // (source, invert) -> expected read-only
        for (source, invert, expected) in [
            (false, false, false),
            (true, false, true),
            (false, true, true),
            (true, true, false),
        ] {
            let (mut graph, locked, gain) = bool_gate_graph(!source, invert);
            let mut engine = RuleEngine::attach(&graph).unwrap();
            engine
                .set_value(&mut graph, locked, Value::Bool(source))
                .unwrap();
            assert_eq!(
                graph.get(gain).unwrap().is_read_only(),
                expected,
                "source={source} invert={invert}"
            );
        }
    }

    #[test]
    fn prime_establishes_initial_derived_state() {
        let (mut graph, _, gain) = bool_gate_graph(true, false);
        let mut engine = RuleEngine::attach(&graph).unwrap();
        assert!(!graph.get(gain).unwrap().is_read_only());
        engine.prime(&mut graph).unwrap();
        assert!(graph.get(gain).unwrap().is_read_only());
    }

    #[test]
    fn read_only_commit_does_not_touch_value() {
        let (mut graph, locked, gain) = bool_gate_graph(false, false);
        let mut engine = RuleEngine::attach(&graph).unwrap();
        engine
            .set_value(&mut graph, locked, Value::Bool(true))
            .unwrap();
        assert_eq!(graph.get(gain).unwrap().value(), &Value::Real(1.0));
    }

    #[test]
    fn value_in_rule_matches_choice_source() {
        let mut graph = PropertyGraph::new();
        let mode = graph
            .insert(
                Property::new("mode", Value::Choice("auto".into()))
                    .with_domain(Domain::choices(["auto", "manual", "off"])),
            )
            .unwrap();
        let rate = graph
            .insert(Property::new("rate", Value::Int(5)).with_domain(Domain::int(0, 10)))
            .unwrap();
        graph
            .add_rule(Rule::read_only_if_value_in(
                "rate",
                "mode",
                [
                    Value::Choice("auto".into()),
                    Value::Choice("off".into()),
                ],
                false,
            ))
            .unwrap();

        let mut engine = RuleEngine::attach(&graph).unwrap();
        engine.prime(&mut graph).unwrap();
        assert!(graph.get(rate).unwrap().is_read_only());

        engine
            .set_value(&mut graph, mode, Value::Choice("manual".into()))
            .unwrap();
        assert!(!graph.get(rate).unwrap().is_read_only());

        engine
            .set_value(&mut graph, mode, Value::Choice("off".into()))
            .unwrap();
        assert!(graph.get(rate).unwrap().is_read_only());
    }

    #[test]
    fn any_equals_rule_ignores_unmatched_pairs() {
        let mut graph = PropertyGraph::new();
        let a = graph.insert(Property::new("a", Value::Int(0))).unwrap();
        let b = graph.insert(Property::new("b", Value::Int(0))).unwrap();
        let out = graph.insert(Property::new("out", Value::Real(0.0))).unwrap();
        graph
            .add_rule(Rule::read_only_if_any_equals(
                "out",
                [
                    ("a".to_string(), Value::Int(7)),
                    ("b".to_string(), Value::Int(9)),
                ],
                false,
            ))
            .unwrap();

        let mut engine = RuleEngine::attach(&graph).unwrap();
        engine.prime(&mut graph).unwrap();
        assert!(!graph.get(out).unwrap().is_read_only());

        // Non-matching edits never flip the flag.
        engine.set_value(&mut graph, a, Value::Int(3)).unwrap();
        assert!(!graph.get(out).unwrap().is_read_only());

        engine.set_value(&mut graph, b, Value::Int(9)).unwrap();
        assert!(graph.get(out).unwrap().is_read_only());

        engine.set_value(&mut graph, b, Value::Int(1)).unwrap();
        assert!(!graph.get(out).unwrap().is_read_only());
    }

    fn linked_pair_graph() -> (PropertyGraph, PropertyId, PropertyId, PropertyId) {
        let mut graph = PropertyGraph::new();
        let use_min = graph
            .insert(Property::new("use_min", Value::Bool(true)))
            .unwrap();
        let lo = graph
            .insert(Property::new("lo", Value::Int(0)).with_domain(Domain::int(-100, 100)))
            .unwrap();
        let hi = graph
            .insert(Property::new("hi", Value::Int(10)).with_domain(Domain::int(-100, 100)))
            .unwrap();
        graph
            .add_rule(Rule::select_writable(["lo", "hi"], "use_min", false))
            .unwrap();
        (graph, use_min, lo, hi)
    }

    #[test]
    fn select_writable_locks_the_unselected_target() {
        let (mut graph, use_min, lo, hi) = linked_pair_graph();
        let mut engine = RuleEngine::attach(&graph).unwrap();
        engine.prime(&mut graph).unwrap();

        // true selects the first target.
        assert!(!graph.get(lo).unwrap().is_read_only());
        assert!(graph.get(hi).unwrap().is_read_only());

        // Writes to the disabled target are suppressed, not errors.
        assert_eq!(
            engine.set_value(&mut graph, hi, Value::Int(42)).unwrap(),
            WriteOutcome::Suppressed
        );
        assert_eq!(graph.get(hi).unwrap().value(), &Value::Int(10));

        // Flipping the selector swaps the writable end.
        engine
            .set_value(&mut graph, use_min, Value::Bool(false))
            .unwrap();
        assert!(graph.get(lo).unwrap().is_read_only());
        assert!(!graph.get(hi).unwrap().is_read_only());
        assert_eq!(
            engine.set_value(&mut graph, hi, Value::Int(42)).unwrap(),
            WriteOutcome::Committed {
                old: Value::Int(10)
            }
        );
    }

    fn coupled_graph() -> (PropertyGraph, PropertyId, PropertyId) {
        let mut graph = PropertyGraph::new();
        let min = graph
            .insert(Property::new("min", Value::Int(0)).with_domain(Domain::int(-100, 100)))
            .unwrap();
        let max = graph
            .insert(Property::new("max", Value::Int(10)).with_domain(Domain::int(-100, 100)))
            .unwrap();
        graph.add_rule(Rule::couple_min_max("min", "max")).unwrap();
        (graph, min, max)
    }

    #[test]
    fn couple_min_max_nudges_the_counterpart() {
        let (mut graph, min, max) = coupled_graph();
        let mut engine = RuleEngine::attach(&graph).unwrap();

        // Setting min above max is accepted; max follows.
        assert_eq!(
            engine.set_value(&mut graph, min, Value::Int(15)).unwrap(),
            WriteOutcome::Committed {
                old: Value::Int(0)
            }
        );
        assert_eq!(graph.get(max).unwrap().value(), &Value::Int(15));

        // Setting max below min drags min down.
        engine.set_value(&mut graph, max, Value::Int(-5)).unwrap();
        assert_eq!(graph.get(min).unwrap().value(), &Value::Int(-5));

        // In-order edits leave the counterpart alone.
        engine.set_value(&mut graph, min, Value::Int(-7)).unwrap();
        assert_eq!(graph.get(max).unwrap().value(), &Value::Int(-5));
    }

    #[test]
    fn couple_min_max_follows_through_read_only_counterpart() {
        let (mut graph, min, max) = coupled_graph();
        graph
            .insert(Property::new("use_min", Value::Bool(true)))
            .unwrap();
        graph
            .add_rule(Rule::select_writable(["min", "max"], "use_min", false))
            .unwrap();

        let mut engine = RuleEngine::attach(&graph).unwrap();
        engine.prime(&mut graph).unwrap();
        assert!(graph.get(max).unwrap().is_read_only());

        // The disabled max still follows the writable min.
        engine.set_value(&mut graph, min, Value::Int(50)).unwrap();
        assert_eq!(graph.get(max).unwrap().value(), &Value::Int(50));
    }

    #[test]
    fn couple_min_max_settles_against_clamped_follower() {
        let mut graph = PropertyGraph::new();
        let min = graph
            .insert(Property::new("min", Value::Int(0)).with_domain(Domain::int(-100, 100)))
            .unwrap();
        let max = graph
            .insert(Property::new("max", Value::Int(5)).with_domain(Domain::int(0, 10)))
            .unwrap();
        graph.add_rule(Rule::couple_min_max("min", "max")).unwrap();

        let mut engine = RuleEngine::attach(&graph).unwrap();
        // min jumps past max's domain ceiling: max clamps to 10, whose
        // change drags min back down to 10. Two nudges, then quiet.
        engine.set_value(&mut graph, min, Value::Int(50)).unwrap();
        assert_eq!(graph.get(max).unwrap().value(), &Value::Int(10));
        assert_eq!(graph.get(min).unwrap().value(), &Value::Int(10));
    }

    #[test]
    fn cascade_depth_guard_aborts_runaway_chains() {
        let mut graph = PropertyGraph::new();
        let a = graph
            .insert(Property::new("a", Value::Int(0)).with_domain(Domain::int(-1000, 1000)))
            .unwrap();
        graph
            .insert(Property::new("b", Value::Int(10)).with_domain(Domain::int(-1000, 1000)))
            .unwrap();
        graph
            .insert(Property::new("c", Value::Int(20)).with_domain(Domain::int(-1000, 1000)))
            .unwrap();
        graph.add_rule(Rule::couple_min_max("a", "b")).unwrap();
        graph.add_rule(Rule::couple_min_max("b", "c")).unwrap();

        // Depth 1 allows the first nudge but not the chained second one.
        let mut engine = RuleEngine::attach_with_max_depth(&graph, 1).unwrap();
        let err = engine
            .set_value(&mut graph, a, Value::Int(500))
            .unwrap_err();
        assert_eq!(err, EditError::Cascade(CascadeError { max_depth: 1 }));

        // A generous bound lets the same chain settle.
        let mut graph2 = graph.clone();
        let mut engine = RuleEngine::attach(&graph2).unwrap();
        engine.set_value(&mut graph2, a, Value::Int(600)).unwrap();
        assert_eq!(
            graph2.get(graph2.by_name("c").unwrap()).unwrap().value(),
            &Value::Int(600)
        );
    }

    #[test]
    fn release_tears_subscriptions_down() {
        let (mut graph, locked, gain) = bool_gate_graph(false, false);
        let mut engine = RuleEngine::attach(&graph).unwrap();
        let signal = Signal::value(locked);
        assert!(engine.is_watching(signal));

        engine.release(0);
        assert!(!engine.is_watching(signal));

        // A released rule is never invoked again, including by prime.
        engine
            .set_value(&mut graph, locked, Value::Bool(true))
            .unwrap();
        engine.prime(&mut graph).unwrap();
        assert!(!graph.get(gain).unwrap().is_read_only());
    }

    #[test]
    fn rules_on_dead_properties_are_inert() {
        let (mut graph, locked, gain) = bool_gate_graph(false, false);
        let mut engine = RuleEngine::attach(&graph).unwrap();

        graph.remove(gain);
        // The source still delivers; the rule skips its dead target.
        engine
            .set_value(&mut graph, locked, Value::Bool(true))
            .unwrap();
        assert!(!graph.is_alive(gain));
    }

    #[test]
    fn attach_refuses_rules_whose_properties_died() {
        let (mut graph, _, gain) = bool_gate_graph(false, false);
        graph.remove(gain);
        let err = RuleEngine::attach(&graph).unwrap_err();
        assert_eq!(err.rule, 0);
        assert!(matches!(
            err.error,
            trellis_property::GraphError::UnknownProperty(_)
        ));
    }

    #[test]
    fn set_value_by_name_resolves_or_errors() {
        let (mut graph, _, gain) = bool_gate_graph(false, false);
        let mut engine = RuleEngine::attach(&graph).unwrap();
        engine
            .set_value_by_name(&mut graph, "gain", Value::Real(0.5))
            .unwrap();
        assert_eq!(graph.get(gain).unwrap().value(), &Value::Real(0.5));
        assert_eq!(
            engine
                .set_value_by_name(&mut graph, "nope", Value::Real(0.5))
                .unwrap_err(),
            EditError::UnknownProperty("nope".into())
        );
    }

    #[test]
    fn trace_records_commits_with_depths() {
        let (mut graph, min, _) = coupled_graph();
        let mut engine = RuleEngine::attach(&graph).unwrap();
        let mut recorder = CascadeRecorder::new();
        engine
            .set_value_with_trace(&mut graph, min, Value::Int(15), &mut recorder)
            .unwrap();

        let commits = recorder.commits();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].0, 0);
        assert_eq!(commits[1].0, 1);
        assert!(matches!(
            &commits[1].1,
            Change::Value { new: Value::Int(15), .. }
        ));
        assert_eq!(recorder.max_depth(), 1);
    }

    #[test]
    fn read_only_changes_deliver_on_their_own_channel() {
        let (mut graph, locked, gain) = bool_gate_graph(false, false);
        let mut engine = RuleEngine::attach(&graph).unwrap();
        let mut recorder = CascadeRecorder::new();
        engine
            .set_value_with_trace(&mut graph, locked, Value::Bool(true), &mut recorder)
            .unwrap();

        let channels: vec::Vec<Channel> = recorder
            .commits()
            .iter()
            .map(|(_, c)| c.signal().channel)
            .collect();
        assert_eq!(channels, vec![Channel::Value, Channel::ReadOnly]);
        assert_eq!(recorder.commits()[1].1.property(), gain);
    }

    #[test]
    fn cloned_graph_gets_independent_subscriptions() {
        let (mut graph, locked, gain) = bool_gate_graph(false, false);
        let mut engine = RuleEngine::attach(&graph).unwrap();

        let mut clone = graph.clone();
        let mut clone_engine = RuleEngine::attach(&clone).unwrap();

        // Ids resolve structurally in the clone.
        assert_eq!(clone.by_name("locked"), Some(locked));

        clone_engine
            .set_value(&mut clone, locked, Value::Bool(true))
            .unwrap();
        assert!(clone.get(gain).unwrap().is_read_only());
        // The original graph and engine never heard about it.
        assert!(!graph.get(gain).unwrap().is_read_only());

        engine
            .set_value(&mut graph, locked, Value::Bool(true))
            .unwrap();
        assert!(graph.get(gain).unwrap().is_read_only());
    }
}
