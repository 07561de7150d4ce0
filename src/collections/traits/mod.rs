//! Traits describing what a collection can do, so that code can be written against a capability
//! rather than a concrete type.

pub mod map;
