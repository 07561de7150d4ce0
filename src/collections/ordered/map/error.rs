use derive_more::{Display, Error, From, IsVariant, TryInto};

#[doc(inline)]
pub use crate::util::error::{CapacityOverflow, IndexOutOfBounds};

/// An entry with an equal key already exists in the map.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("An entry with the same key already exists at index {index}!")]
pub struct DuplicateKeyError {
    /// The position of the existing entry.
    pub index: usize,
}

/// No entry with the given key exists in the map.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("The given key was not present in the map!")]
pub struct KeyNotFoundError;

/// The map was structurally modified after a [`Cursor`](super::Cursor) was created.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("Map was modified during enumeration (expected version {expected}, found {found})!")]
pub struct ConcurrentModificationError {
    /// The version captured when the cursor was created or last reset.
    pub expected: u64,
    /// The live version of the map.
    pub found: u64,
}

/// A [`Snapshot`](super::Snapshot) didn't contain the entry list required to restore a map.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("Snapshot is missing its entries!")]
pub struct MissingEntriesError;

/// Errors which can occur when inserting at a position.
#[derive(Debug, Display, Error, From, TryInto, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    IndexOutOfBounds(IndexOutOfBounds),
    DuplicateKey(DuplicateKeyError),
}

/// Errors which can occur when restoring a map from a [`Snapshot`](super::Snapshot).
#[derive(Debug, Display, Error, From, TryInto, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    MissingEntries(MissingEntriesError),
    DuplicateKey(DuplicateKeyError),
    CapacityOverflow(CapacityOverflow),
}
