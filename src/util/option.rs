pub(crate) trait OptionExtension<T> {
    fn unreachable(self) -> T;
}

impl<T> OptionExtension<T> for Option<T> {
    /// Acts similarly to [`Option::unwrap`] but with [`unreachable!`] in the none branch. Used
    /// where the two halves of a collection guarantee that the value exists, so None indicates a
    /// broken internal invariant rather than bad input.
    ///
    /// No panics annotation is used to allow it to pass the clippy lint. The whole semantics are
    /// that if used, the function indicates that None is impossible.
    fn unreachable(self) -> T {
        match self {
            Some(val) => val,
            None => unreachable!(),
        }
    }
}
