// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The broker: per-source subscriber lists with snapshot delivery.

use alloc::rc::Rc;
use core::cell::Cell;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::delivery::{Delivery, SubscriberList};

/// A weak-subscription publish/subscribe dispatcher.
///
/// `S` is the source key (what raises changes), `H` the handler key (who
/// observes them). Both are plain `Copy` values — typically generation-tagged
/// handles — so the broker never owns a source or a handler and can never
/// keep one alive. Whether a key still refers to something live is decided
/// by the embedder through the predicates passed to [`Delivery::next`] and
/// [`EventBroker::purge`].
///
/// A source has an entry here exactly while it has at least one subscriber;
/// [`EventBroker::has_subscribers`] is the embedder's cue for whether a
/// change to that source needs to be forwarded at all.
///
/// # Handler equality
///
/// Subscription is idempotent: a handler key equal (`PartialEq`) to one
/// already subscribed for the same source is not added again. Embedders that
/// want two distinct registrations to coalesce (for example, two bindings
/// recomputing the same target) make their keys compare equal.
///
/// # Example
///
/// ```rust
/// use trellis_broker::EventBroker;
///
/// let mut broker = EventBroker::<&str, u32>::new();
/// assert!(broker.subscribe("width", 1));
/// assert!(!broker.subscribe("width", 2));
/// assert!(broker.has_subscribers("width"));
///
/// // Unsubscribing the last handler drops the source entry.
/// broker.unsubscribe("width", 1);
/// assert!(broker.unsubscribe("width", 2));
/// assert!(!broker.has_subscribers("width"));
/// ```
pub struct EventBroker<S, H>
where
    S: Copy + Eq + Hash,
    H: Copy + PartialEq,
{
    topics: HashMap<S, Topic<H>>,
}

pub(crate) struct Topic<H> {
    /// Current subscriber list, shared with in-flight delivery snapshots.
    subscribers: Rc<SubscriberList<H>>,
    /// Number of deliveries currently draining this source. A counter, not
    /// a flag: deliveries nest when a handler re-raises the same source.
    active: Rc<Cell<u32>>,
}

impl<H: Copy + PartialEq> Topic<H> {
    fn new() -> Self {
        Self {
            subscribers: Rc::new(SubscriberList::new()),
            active: Rc::new(Cell::new(0)),
        }
    }

    /// Edits the subscriber list without disturbing in-flight snapshots.
    ///
    /// While a delivery is active the edit goes to a private copy which then
    /// replaces the shared list; active cursors keep their own snapshot.
    fn edit(&mut self, f: impl FnOnce(&mut SubscriberList<H>)) {
        if self.active.get() > 0 {
            let mut copy = (*self.subscribers).clone();
            f(&mut copy);
            self.subscribers = Rc::new(copy);
        } else {
            f(Rc::make_mut(&mut self.subscribers));
        }
    }
}

impl<S, H> EventBroker<S, H>
where
    S: Copy + Eq + Hash,
    H: Copy + PartialEq,
{
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: HashMap::new(),
        }
    }

    /// Registers `handler` as a subscriber of `source`.
    ///
    /// Returns `true` if this made `source` observed at all (it previously
    /// had no subscribers), which is the embedder's cue to start forwarding
    /// that source's native change signal.
    ///
    /// Subscribing a handler equal to one already present is a no-op apart
    /// from the return value.
    pub fn subscribe(&mut self, source: S, handler: H) -> bool {
        let first = !self.topics.contains_key(&source);
        let topic = self.topics.entry(source).or_insert_with(Topic::new);
        if !topic.subscribers.contains(&handler) {
            topic.edit(|subs| subs.push(handler));
        }
        first
    }

    /// Removes the subscription matching `handler` for `source`.
    ///
    /// Returns `true` if `source` is left with no subscribers (its entry is
    /// dropped and the embedder can stop forwarding its change signal).
    /// Removing a handler that was never subscribed is not an error.
    pub fn unsubscribe(&mut self, source: S, handler: H) -> bool {
        let Some(topic) = self.topics.get_mut(&source) else {
            return true;
        };
        if let Some(pos) = topic.subscribers.iter().position(|h| *h == handler) {
            topic.edit(|subs| {
                subs.remove(pos);
            });
        }
        if topic.subscribers.is_empty() {
            self.topics.remove(&source);
            true
        } else {
            false
        }
    }

    /// Begins a delivery for `source`.
    ///
    /// Returns `None` when `source` has no subscribers — delivering to
    /// nobody is not an error. Otherwise the returned cursor iterates a
    /// snapshot of the subscriber list taken now; see [`Delivery`].
    ///
    /// May be called again for the same source while an earlier cursor is
    /// still draining (reentrant delivery); each cursor keeps its own
    /// snapshot and the active counter tracks the nesting.
    #[must_use]
    pub fn deliver(&self, source: S) -> Option<Delivery<H>> {
        let topic = self.topics.get(&source)?;
        topic.active.set(topic.active.get() + 1);
        Some(Delivery::new(
            Rc::clone(&topic.subscribers),
            Rc::clone(&topic.active),
        ))
    }

    /// Removes every subscription of `source` whose handler fails `is_live`.
    ///
    /// This is the non-delivering sweep that reclaims bookkeeping for dead
    /// handlers; call it after a delivery whose cursor
    /// [saw stale entries](Delivery::saw_stale), and opportunistically after
    /// subscribe/unsubscribe. If a delivery is active for `source` the sweep
    /// edits a private copy, leaving in-flight snapshots untouched.
    ///
    /// Returns the number of entries removed.
    pub fn purge(&mut self, source: S, mut is_live: impl FnMut(&H) -> bool) -> usize {
        let Some(topic) = self.topics.get_mut(&source) else {
            return 0;
        };
        let before = topic.subscribers.len();
        topic.edit(|subs| subs.retain(|h| is_live(h)));
        let removed = before - topic.subscribers.len();
        if topic.subscribers.is_empty() {
            self.topics.remove(&source);
        }
        removed
    }

    /// Drops every subscription of `source` (the source itself has died).
    ///
    /// Returns the number of entries removed.
    pub fn remove_source(&mut self, source: S) -> usize {
        self.topics
            .remove(&source)
            .map_or(0, |topic| topic.subscribers.len())
    }

    /// Returns `true` if `source` currently has at least one subscriber.
    #[must_use]
    #[inline]
    pub fn has_subscribers(&self, source: S) -> bool {
        self.topics.contains_key(&source)
    }

    /// Returns the number of subscriptions recorded for `source`.
    ///
    /// Dead-but-unpurged entries are included; this is bookkeeping size,
    /// not live-handler count.
    #[must_use]
    pub fn subscriber_count(&self, source: S) -> usize {
        self.topics.get(&source).map_or(0, |t| t.subscribers.len())
    }

    /// Returns how many deliveries are currently draining `source`.
    #[must_use]
    pub fn delivery_depth(&self, source: S) -> u32 {
        self.topics.get(&source).map_or(0, |t| t.active.get())
    }

    /// Returns the number of sources with at least one subscriber.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Returns `true` if no source has any subscriber.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl<S, H> Default for EventBroker<S, H>
where
    S: Copy + Eq + Hash,
    H: Copy + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, H> core::fmt::Debug for EventBroker<S, H>
where
    S: Copy + Eq + Hash,
    H: Copy + PartialEq,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBroker")
            .field("sources", &self.topics.len())
            .field(
                "subscriptions",
                &self
                    .topics
                    .values()
                    .map(|t| t.subscribers.len())
                    .sum::<usize>(),
            )
            .finish()
    }
}
