use std::fmt::{self, Debug, Display, Formatter};

/// Debug formats the contained value with its [`Display`] implementation, so strings appear
/// without quotes.
#[derive(Clone, Copy)]
pub struct DebugRaw<T: Display>(pub T);

impl<T: Display> Debug for DebugRaw<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Displays an index table slot: its position, or `-` when empty.
#[derive(Clone, Copy)]
pub struct Slot(pub Option<usize>);

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(index) => write!(f, "{index}"),
            None => write!(f, "-"),
        }
    }
}
