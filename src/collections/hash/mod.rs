//! Hashing primitives for hash-based collections.
//!
//! [`Comparer`] decides how keys are hashed and compared, which is what lets a collection treat
//! two distinct key values as the same key. The index table that maps hashes to entry positions is
//! internal to the crate.

mod comparer;
pub(crate) mod index_table;

pub use comparer::*;
