// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The property graph: an ordered, uniquely-named arena of properties plus
//! the rules that constrain them.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::{GraphError, WriteError};
use crate::id::PropertyId;
use crate::property::Property;
use crate::rule::Rule;
use crate::value::{Value, ValueKind};

/// What a property write ended up doing.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOutcome {
    /// The value changed; `old` is what it replaced.
    Committed {
        /// The value before the write.
        old: Value,
    },
    /// The admitted value equals the current one; nothing was raised.
    Unchanged,
    /// The property is read-only and the write was ignored.
    Suppressed,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    occupant: Option<Property>,
}

/// The owned set of properties and rules forming one panel's model.
///
/// Properties live in a generational slot arena: a [`PropertyId`] captures
/// its slot's generation, and removal bumps the generation, so stale ids go
/// dead instead of aliasing whatever reuses the slot. Lookup by name is
/// O(1) expected; iteration follows declaration order.
///
/// The graph owns its [`Rule`]s as plain data; adding one eagerly validates
/// every name and kind it references. Binding rules to change signals is
/// the `trellis_rules` engine's job.
///
/// Cloning a graph duplicates properties and rules but no live
/// subscriptions — those belong to an engine and are re-established by
/// attaching a fresh engine to the clone, so edits to the clone never leak
/// into the original's bound controls.
#[derive(Clone, Debug, Default)]
pub struct PropertyGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<PropertyId>,
    by_name: HashMap<String, PropertyId>,
    rules: Vec<Rule>,
}

impl PropertyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a property, admitting its declared value through its domain
    /// and policy.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateName`] when the name is taken,
    /// [`GraphError::KindMismatch`] when the default's kind does not fit
    /// the domain, and [`GraphError::ValueRejected`] when the declared
    /// value is out of domain under [`FailurePolicy::Reject`](crate::FailurePolicy::Reject).
    pub fn insert(&mut self, mut property: Property) -> Result<PropertyId, GraphError> {
        let name = property.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateName(name));
        }
        let kind = property.default_value().kind();
        if !property.domain().admits_kind(kind) {
            return Err(GraphError::KindMismatch {
                name,
                expected: property
                    .domain()
                    .value_kind()
                    .expect("a constrained domain has a kind"),
                found: kind,
            });
        }
        match property.normalize() {
            Ok(()) => {}
            Err(WriteError::OutOfDomain) => return Err(GraphError::ValueRejected(name)),
            Err(WriteError::KindMismatch { expected, found }) => {
                return Err(GraphError::KindMismatch {
                    name,
                    expected,
                    found,
                });
            }
            Err(WriteError::StaleHandle) => {
                unreachable!("normalizing an unattached property cannot see a stale handle")
            }
        }

        let id = match self.free.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.occupant = Some(property);
                PropertyId::new(idx, slot.generation)
            }
            None => {
                let idx =
                    u32::try_from(self.slots.len()).expect("property count exceeds u32 slots");
                self.slots.push(Slot {
                    generation: 1,
                    occupant: Some(property),
                });
                PropertyId::new(idx, 1)
            }
        };
        self.order.push(id);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Removes a property, returning it.
    ///
    /// The slot's generation is bumped, so every outstanding id for this
    /// property goes dead. Rules referencing the property by name are left
    /// in place; re-validating them is the embedder's concern (a fresh
    /// engine attach will refuse the dangling reference).
    pub fn remove(&mut self, id: PropertyId) -> Option<Property> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        let property = slot.occupant.take()?;
        slot.generation += 1;
        self.free.push(id.0);
        self.order.retain(|p| *p != id);
        self.by_name.remove(property.name());
        Some(property)
    }

    /// Returns `true` if `id` still refers to a live property.
    #[must_use]
    pub fn is_alive(&self, id: PropertyId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the property behind `id`, if it is live.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&Property> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.occupant.as_ref()
    }

    /// Looks up a property id by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// Returns the number of live properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the graph holds no properties.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates live properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &Property)> {
        self.order.iter().filter_map(|id| Some((*id, self.get(*id)?)))
    }

    /// Writes a value through the property's read-only gate, domain, and
    /// policy.
    ///
    /// A write to a read-only property is suppressed (ignored), not an
    /// error; linked-pair rules rely on this. An out-of-domain write under
    /// a repairing policy commits the repaired value. Committing raises no
    /// notification by itself — delivering the resulting
    /// [`Change`](crate::Change) is the engine's job.
    pub fn set_value(&mut self, id: PropertyId, value: Value) -> Result<WriteOutcome, WriteError> {
        self.write(id, value, true)
    }

    /// Writes a value, bypassing the read-only gate.
    ///
    /// Domain and policy still apply. This is the path rule evaluation uses
    /// to adjust a counterpart that is currently disabled for direct edits.
    pub fn set_value_forced(
        &mut self,
        id: PropertyId,
        value: Value,
    ) -> Result<WriteOutcome, WriteError> {
        self.write(id, value, false)
    }

    fn write(
        &mut self,
        id: PropertyId,
        value: Value,
        gated: bool,
    ) -> Result<WriteOutcome, WriteError> {
        let property = self.get_mut(id).ok_or(WriteError::StaleHandle)?;
        if gated && property.is_read_only() {
            return Ok(WriteOutcome::Suppressed);
        }
        let admitted = property.admit(value)?;
        if *property.value() == admitted {
            return Ok(WriteOutcome::Unchanged);
        }
        let old = property.commit_value(admitted);
        Ok(WriteOutcome::Committed { old })
    }

    /// Sets the read-only flag, returning `true` if it actually flipped.
    ///
    /// Never touches the value; the two channels are independent.
    pub fn set_read_only(&mut self, id: PropertyId, read_only: bool) -> Result<bool, WriteError> {
        let property = self.get_mut(id).ok_or(WriteError::StaleHandle)?;
        if property.is_read_only() == read_only {
            return Ok(false);
        }
        property.commit_read_only(read_only);
        Ok(true)
    }

    fn get_mut(&mut self, id: PropertyId) -> Option<&mut Property> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.occupant.as_mut()
    }

    /// Adds a rule after eagerly validating every reference it makes.
    ///
    /// Returns the rule's index in [`PropertyGraph::rules`].
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownProperty`] for a dangling name,
    /// [`GraphError::KindMismatch`]/[`GraphError::NotScalar`] for ill-typed
    /// references, [`GraphError::EmptyValueSet`] for an empty match list,
    /// and [`GraphError::TooFewTargets`] for a degenerate selection.
    pub fn add_rule(&mut self, rule: Rule) -> Result<usize, GraphError> {
        self.validate_rule(&rule)?;
        self.rules.push(rule);
        Ok(self.rules.len() - 1)
    }

    /// Returns the rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Validates a rule's references against this graph without adding it.
    ///
    /// [`PropertyGraph::add_rule`] runs this; the rule engine runs it again
    /// at attach time, because properties may have been removed since the
    /// rule was added.
    pub fn validate_rule(&self, rule: &Rule) -> Result<(), GraphError> {
        match rule {
            Rule::ReadOnlyIfBool { target, source, .. } => {
                self.resolve(target)?;
                self.expect_kind(source, ValueKind::Bool)?;
            }
            Rule::ReadOnlyIfValueIn {
                target,
                source,
                values,
                ..
            } => {
                self.resolve(target)?;
                let kind = self.kind_of(source)?;
                if values.is_empty() {
                    return Err(GraphError::EmptyValueSet {
                        target: target.clone(),
                    });
                }
                for value in values {
                    if value.kind() != kind {
                        return Err(GraphError::KindMismatch {
                            name: source.clone(),
                            expected: kind,
                            found: value.kind(),
                        });
                    }
                }
            }
            Rule::ReadOnlyIfAnyEquals { target, pairs, .. } => {
                self.resolve(target)?;
                if pairs.is_empty() {
                    return Err(GraphError::EmptyValueSet {
                        target: target.clone(),
                    });
                }
                for (source, value) in pairs {
                    let kind = self.kind_of(source)?;
                    if value.kind() != kind {
                        return Err(GraphError::KindMismatch {
                            name: source.clone(),
                            expected: kind,
                            found: value.kind(),
                        });
                    }
                }
            }
            Rule::SelectWritable {
                targets, source, ..
            } => {
                if targets.len() < 2 {
                    return Err(GraphError::TooFewTargets {
                        source: source.clone(),
                    });
                }
                self.expect_kind(source, ValueKind::Bool)?;
                for target in targets {
                    self.resolve(target)?;
                }
            }
            Rule::CoupleMinMax { min, max } => {
                let min_kind = self.kind_of(min)?;
                let max_kind = self.kind_of(max)?;
                if !matches!(min_kind, ValueKind::Int | ValueKind::Real) {
                    return Err(GraphError::NotScalar(min.clone()));
                }
                if max_kind != min_kind {
                    return Err(GraphError::NotScalar(max.clone()));
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<PropertyId, GraphError> {
        self.by_name(name)
            .ok_or_else(|| GraphError::UnknownProperty(name.to_string()))
    }

    fn kind_of(&self, name: &str) -> Result<ValueKind, GraphError> {
        let id = self.resolve(name)?;
        Ok(self
            .get(id)
            .expect("resolved ids are live")
            .default_value()
            .kind())
    }

    fn expect_kind(&self, name: &str, kind: ValueKind) -> Result<PropertyId, GraphError> {
        let id = self.resolve(name)?;
        let found = self
            .get(id)
            .expect("resolved ids are live")
            .default_value()
            .kind();
        if found != kind {
            return Err(GraphError::KindMismatch {
                name: name.to_string(),
                expected: kind,
                found,
            });
        }
        Ok(id)
    }
}
