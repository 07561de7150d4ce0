//! Various general-purpose collection types.
//!
//! # Purpose
//! At the moment this is home to [`OrderedMap`](ordered::OrderedMap), along with the hashing
//! primitives it is built from and the capability traits it implements.
//!
//! # Method
//! Each collection lives in its own module with its iterators, errors and tests alongside it.
//! Shared behaviour that isn't specific to one collection is described by the traits in
//! [`traits`].

pub mod hash;
pub mod ordered;
pub mod traits;
