//! Insertion-ordered collection types. Namely [`OrderedMap`], which can be addressed both by key
//! and by position.

pub mod map;

#[doc(inline)]
pub use map::OrderedMap;
