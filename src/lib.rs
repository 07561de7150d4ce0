//! This crate is my take on an insertion-ordered dictionary: a map that remembers the order its
//! entries were added in and lets you address them by position as well as by key.
//!
//! # Purpose
//! I kept reaching for a dictionary that could answer both "what is the value for this key?" and
//! "what is the third entry?" without keeping a separate list in sync by hand. This crate is the
//! result of writing that structure properly, once.
//!
//! # Method
//! [`OrderedMap`](collections::ordered::OrderedMap) keeps its entries in a dense, ordered
//! sequence and indexes them with an open-addressing hash table that stores positions rather than
//! values. Positional access is a slice index, keyed access is a probe into the table followed by a
//! slice index, and every mutation updates both halves before returning.
//!
//! Key equality is pluggable through the [`Comparer`](collections::hash::Comparer) trait, so a map
//! can (for example) treat `"Key"` and `"KEY"` as the same key without wrapping every key in a
//! newtype.
//!
//! # Error Handling
//! When this crate employs errors via [`Result`]s, it does so in a method that is strongly typed,
//! using enums for static dispatch rather than dynamic, with structs (often ZSTs) that implement
//! [`Error`](std::error::Error). The [`Index`](std::ops::Index) implementations are the only
//! places where the map panics on a bad key or position, and they panic with the same typed error
//! that the fallible methods return.
//!
//! # Iteration and Mutation
//! Borrowed iterators and views can't outlive a mutation, which the borrow checker enforces for
//! free. For callers that need to walk a map while holding on to it mutably between steps,
//! [`Cursor`](collections::ordered::map::Cursor) tracks the map's version and reports a
//! [`ConcurrentModificationError`](collections::ordered::map::ConcurrentModificationError) rather
//! than yielding stale entries.
//!
//! # Dependencies
//! This crate depends on some derive macros because they're helpful and remove the need for some
//! very repetitive programming. Index table reallocations and snapshot restores are reported at
//! trace level through the `log` facade, for whoever installs a logger. Snapshots and map
//! (de)serialization sit behind the `serde` feature, and the shared
//! [`SyncRoot`](collections::ordered::map::SyncRoot) handle sits behind the `sync` feature. Both
//! are enabled by default.

// #![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod collections;

pub(crate) mod util;
