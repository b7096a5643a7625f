// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Broker: weak-subscription event dispatch.
//!
//! This crate provides [`EventBroker`], the publish/subscribe mechanism that
//! connects change sources (properties) to change handlers (rule bindings)
//! without either side owning the other.
//!
//! ## Core Concepts
//!
//! ### Keys, not references
//!
//! The broker stores `Copy` keys on both sides: a source key `S` (what
//! changed) and a handler key `H` (who wants to know). Embedders hand out
//! generation-tagged handles for both, so a key whose slot has been reused
//! simply stops matching — the broker cannot keep anything alive, and a
//! stale entry is detected by a liveness predicate supplied at delivery and
//! purge time.
//!
//! ### Snapshot delivery
//!
//! [`EventBroker::deliver`] begins a delivery by snapshotting the current
//! subscriber list and bumping the source's delivery-active counter. The
//! returned [`Delivery`] cursor iterates that snapshot in subscription
//! order. A handler may re-enter the broker — subscribe, unsubscribe, purge,
//! or start a nested delivery for the same source — without disturbing the
//! in-flight cursor: mutations performed while a delivery is active edit a
//! private copy of the list which replaces the shared one, so they become
//! visible on the next delivery, never the current one.
//!
//! The active counter is a counter rather than a flag because deliveries
//! nest: a handler that commits a further change to the same source starts
//! a second delivery before the first has finished draining.
//!
//! ### Purge
//!
//! Dead entries are skipped during delivery and reported via
//! [`Delivery::saw_stale`]; they are physically removed by
//! [`EventBroker::purge`], which embedders call opportunistically after
//! subscribe/unsubscribe and after a delivery that observed stale entries.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_broker::EventBroker;
//!
//! let mut broker = EventBroker::<u32, u32>::new();
//!
//! // First subscriber for source 7.
//! assert!(broker.subscribe(7, 100));
//! assert!(!broker.subscribe(7, 101));
//!
//! // Deliver to every live subscriber, in subscription order.
//! let mut seen = Vec::new();
//! let mut delivery = broker.deliver(7).unwrap();
//! while let Some(handler) = delivery.next(|_| true) {
//!     seen.push(handler);
//! }
//! drop(delivery);
//! assert_eq!(seen, vec![100, 101]);
//!
//! // Handler 100 has died; it is skipped, then purged.
//! let mut delivery = broker.deliver(7).unwrap();
//! assert_eq!(delivery.next(|h| *h != 100), Some(101));
//! assert!(delivery.saw_stale());
//! drop(delivery);
//! assert_eq!(broker.purge(7, |h| *h != 100), 1);
//! assert_eq!(broker.subscriber_count(7), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`. It is single-threaded by
//! design: reentrancy is supported, parallelism is not.

#![no_std]

extern crate alloc;

mod broker;
mod delivery;

pub use broker::EventBroker;
pub use delivery::Delivery;
