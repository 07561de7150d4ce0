#![warn(missing_docs)]

#[cfg(test)]
pub mod drop;
pub mod error;
pub mod fmt;
#[cfg(test)]
pub mod hash;
pub mod option;
pub mod panic;
pub mod result;
