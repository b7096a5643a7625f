// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule bindings: the handler side of the broker's weak subscriptions.

use alloc::vec::Vec;
use core::fmt;

use trellis_property::Signal;

/// Identifier for one rule binding inside a
/// [`RuleEngine`](crate::RuleEngine).
///
/// Slot + generation, like
/// [`PropertyId`](trellis_property::PropertyId): retiring a binding bumps
/// its slot's generation, so a stale id held by broker bookkeeping stops
/// matching and is skipped (then purged) instead of being delivered to.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct BindingId(pub(crate) u32, pub(crate) u32);

impl BindingId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingId({}v{})", self.0, self.1)
    }
}

/// One subscription of one rule to one trigger signal.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Binding {
    /// Index of the resolved rule this binding evaluates.
    pub(crate) rule: usize,
    /// The signal the binding is subscribed to.
    pub(crate) trigger: Signal,
}

#[derive(Clone, Debug)]
struct BindingSlot {
    generation: u32,
    occupant: Option<Binding>,
}

/// Generational arena of bindings.
#[derive(Clone, Debug, Default)]
pub(crate) struct BindingArena {
    slots: Vec<BindingSlot>,
    free: Vec<u32>,
}

impl BindingArena {
    pub(crate) fn insert(&mut self, binding: Binding) -> BindingId {
        match self.free.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.occupant = Some(binding);
                BindingId::new(idx, slot.generation)
            }
            None => {
                let idx = u32::try_from(self.slots.len()).expect("binding count exceeds u32 slots");
                self.slots.push(BindingSlot {
                    generation: 1,
                    occupant: Some(binding),
                });
                BindingId::new(idx, 1)
            }
        }
    }

    /// Retires a binding; its id (and every copy of it) goes dead.
    pub(crate) fn remove(&mut self, id: BindingId) -> Option<Binding> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        let binding = slot.occupant.take()?;
        slot.generation += 1;
        self.free.push(id.0);
        Some(binding)
    }

    pub(crate) fn get(&self, id: BindingId) -> Option<&Binding> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.occupant.as_ref()
    }

    pub(crate) fn is_alive(&self, id: BindingId) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_property::{PropertyGraph, Property, Value};

    fn any_signal() -> Signal {
        let mut graph = PropertyGraph::new();
        let id = graph.insert(Property::new("p", Value::Int(0))).unwrap();
        Signal::value(id)
    }

    #[test]
    fn arena_reuses_slots_without_aliasing() {
        let mut arena = BindingArena::default();
        let trigger = any_signal();
        let a = arena.insert(Binding { rule: 0, trigger });
        assert!(arena.is_alive(a));

        arena.remove(a);
        assert!(!arena.is_alive(a));
        assert!(arena.remove(a).is_none());

        let b = arena.insert(Binding { rule: 1, trigger });
        assert_eq!(a.idx(), b.idx());
        assert_ne!(a, b);
        assert!(!arena.is_alive(a));
        assert_eq!(arena.get(b).unwrap().rule, 1);
    }
}
