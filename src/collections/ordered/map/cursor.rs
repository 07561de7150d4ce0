use super::{ConcurrentModificationError, OrderedMap};

/// A detached position within an [`OrderedMap`], for walking the map while keeping the freedom to
/// mutate it between steps.
///
/// Unlike [`Iter`](super::Iter), a cursor doesn't borrow the map. Instead it records the map's
/// version when it is created, and every call to [`advance`](Cursor::advance) checks that version
/// against the map's current one. If the map was structurally modified in the meantime, the cursor
/// reports a [`ConcurrentModificationError`] and yields nothing further until it is
/// [`reset`](Cursor::reset).
///
/// A cursor should only be advanced with the map it was created from.
///
/// # Examples
/// ```
/// # use ordered_collections::collections::ordered::OrderedMap;
/// let mut map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
/// let mut cursor = map.cursor();
///
/// while let Some(Ok((key, value))) = cursor.advance(&map) {
///     println!("{key}: {value}");
/// }
///
/// map.set_at(0, 10).unwrap();
/// assert!(cursor.advance(&map).is_some_and(|r| r.is_err()));
///
/// cursor.reset(&map);
/// assert_eq!(cursor.advance(&map), Some(Ok((&"a", &10))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) version: u64,
    pub(crate) next: usize,
}

impl Cursor {
    /// Creates a cursor positioned before the first entry of a map at `version`.
    pub const fn new(version: u64) -> Cursor {
        Cursor {
            version,
            next: 0,
        }
    }

    /// Moves to the next entry of `map` and returns it.
    ///
    /// Returns `Some(Err(_))` if `map` has been structurally modified since this cursor was created
    /// or last reset, and None once every entry has been visited.
    pub fn advance<'a, K, V, C>(
        &mut self,
        map: &'a OrderedMap<K, V, C>,
    ) -> Option<Result<(&'a K, &'a V), ConcurrentModificationError>> {
        if self.version != map.version() {
            return Some(Err(ConcurrentModificationError {
                expected: self.version,
                found: map.version(),
            }));
        }

        let entry = map.get_index(self.next)?;
        self.next += 1;
        Some(Ok(entry))
    }

    /// Moves the cursor back before the first entry and adopts the current version of `map`.
    pub const fn reset<K, V, C>(&mut self, map: &OrderedMap<K, V, C>) {
        self.version = map.version();
        self.next = 0;
    }

    /// Returns the position of the entry most recently returned by
    /// [`advance`](Cursor::advance), or None if it hasn't returned one yet.
    pub const fn index(&self) -> Option<usize> {
        self.next.checked_sub(1)
    }

    /// Returns the version this cursor expects the map to be at.
    pub const fn version(&self) -> u64 {
        self.version
    }
}
