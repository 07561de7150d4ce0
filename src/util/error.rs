use derive_more::{Display, Error};

/// A positional operation was given an index outside the range the collection accepts.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("Index {index} out of bounds for collection with {len} elements!")]
pub struct IndexOutOfBounds {
    /// The index that was provided.
    pub index: usize,
    /// The length of the collection at the time.
    pub len: usize,
}

/// A requested capacity can't be represented or allocated.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("Capacity overflow!")]
pub struct CapacityOverflow;
