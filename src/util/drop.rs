#![allow(missing_docs)]

use std::cell::Cell;
use std::rc::Rc;

/// A value which counts how many times it (or any clone of it) has been dropped. Used to check
/// that a collection drops each value exactly once.
#[derive(Debug, Clone)]
pub struct DropCounter(Rc<Cell<usize>>);

impl DropCounter {
    pub fn new() -> DropCounter {
        DropCounter(Rc::new(Cell::new(0)))
    }

    pub fn drops(&self) -> usize {
        self.0.get()
    }
}

impl PartialEq for DropCounter {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}
