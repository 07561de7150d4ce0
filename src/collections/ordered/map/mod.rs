//! A module containing [`OrderedMap`] and associated types.
//!
//! Alongside the map itself, this module provides:
//! - Borrowed and owned iteration over entries, keys or values, always in positional order.
//! - [`KeyView`] and [`ValueView`], read-only projections over a map's keys or values, and
//!   [`ReadOnly`], a read-only view of the whole map.
//! - [`Cursor`], which walks a map without borrowing it and reports a
//!   [`ConcurrentModificationError`] if the map changed structurally in the meantime.
//! - [`Snapshot`], the flat form used to save and restore a map.
//! - [`SyncRoot`], a lazily created handle for callers who want to lock around a shared map
//!   (requires the `sync` feature).
//!
//! As a note, there is no mutable iterator over keys because mutating the keys of a map in place
//! would cause a logic error.
//!
//! [`OrderedMap`] is also re-exported under the parent module.

mod cursor;
mod entry;
mod error;
mod iter;
mod ordered_map;
#[cfg(feature = "serde")]
mod serde_impl;
mod snapshot;
#[cfg(feature = "sync")]
mod sync;
mod tests;
mod view;

pub use cursor::*;
pub(crate) use entry::*;
pub use error::*;
pub use iter::*;
pub use ordered_map::*;
pub use snapshot::*;
#[cfg(feature = "sync")]
pub use sync::*;
pub use view::*;
