use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Index, IndexMut};
#[cfg(feature = "sync")]
use std::sync::OnceLock;

use super::{
    Bucket, Cursor, DuplicateKeyError, InsertError, IntoKeys, IntoValues, Iter, IterMut,
    KeyNotFoundError, KeyView, Keys, ReadOnly, ValueView, Values, ValuesMut,
};
#[cfg(feature = "sync")]
use super::SyncRoot;
use crate::collections::hash::index_table::IndexTable;
use crate::collections::hash::{Comparer, DefaultComparer};
use crate::util::error::{CapacityOverflow, IndexOutOfBounds};
use crate::util::option::OptionExtension;
use crate::util::result::ResultExtension;

/// A map which remembers the order that its entries were added in, allowing every entry to be
/// addressed either by its key or by its position.
///
/// Entries are kept in a dense sequence in positional order, and an index table maps each key's
/// hash to its position. Every mutating method updates both before returning, and validates its
/// input before touching either, so a failed call leaves the map unchanged.
///
/// Keys are hashed and compared through a [`Comparer`], which is fixed when the map is created.
/// The default, [`DefaultComparer`], uses the key's own [`Hash`] and [`Eq`] implementations.
///
/// Each structural change (adding, inserting, removing, clearing, reordering or replacing a value
/// through [`set`](OrderedMap::set) or [`set_at`](OrderedMap::set_at)) increments the map's
/// version. [`Cursor`]s compare against the version to detect changes made while they were walking
/// the map. Mutable references to values, such as those from [`get_mut`](OrderedMap::get_mut),
/// don't change the version.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of entries in the OrderedMap.
/// - `i`: The position of the entry in question.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `add` / `set` | `O(1)`*, `O(n)` |
/// | `get` / `contains_key` | `O(1)`* |
/// | `get_index` / `key_at` / `set_at` | `O(1)` |
/// | `insert_at` | `O(n)`** |
/// | `remove` / `remove_at` | `O(n)`** |
/// | `swap_remove` | `O(1)`* |
/// | `move_index` | `O(n)` |
/// | `contains_value` | `O(n)` |
/// | `reserve` | `O(n)`***, `O(1)` |
///
/// \* In the event of a hash collision, these functions will take additional time while the
/// correct entry is found. If the map doesn't have enough capacity for a new entry, adding takes
/// `O(n)` to reallocate.
///
/// \** Positions after `i` shift by one, and the index table is updated to match.
///
/// \*** If the map has enough capacity for the additional entries already, `reserve` is `O(1)`.
///
/// # Examples
/// ```
/// # use ordered_collections::collections::ordered::OrderedMap;
/// let mut map = OrderedMap::new();
/// map.add("a", 1).unwrap();
/// map.add("b", 2).unwrap();
/// map.insert_at(0, "c", 3).unwrap();
///
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["c", "a", "b"]);
/// assert_eq!(map["a"], 1);
/// assert_eq!(map[0], 3);
/// ```
pub struct OrderedMap<K, V, C = DefaultComparer> {
    pub(crate) entries: Vec<Bucket<K, V>>,
    pub(crate) indices: IndexTable,
    pub(crate) version: u64,
    pub(crate) comparer: C,
    pub(crate) cap_hint: usize,
    #[cfg(feature = "sync")]
    pub(crate) sync_root: OnceLock<SyncRoot>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates a new OrderedMap with capacity 0 and the [`DefaultComparer`]. Memory will be
    /// allocated when the first entry is added.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let map: OrderedMap<String, u8> = OrderedMap::new();
    /// assert_eq!(map.len(), 0);
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> OrderedMap<K, V> {
        OrderedMap::with_comparer(DefaultComparer::default())
    }

    /// Creates a new OrderedMap with the [`DefaultComparer`], which can hold at least `cap` entries
    /// without reallocating.
    ///
    /// # Panics
    /// Panics if the capacity can't be allocated. See [`OrderedMap::try_with_cap_and_comparer`] for
    /// a non-panicking alternative.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let map: OrderedMap<u32, u32> = OrderedMap::with_cap(10);
    /// assert!(map.cap() >= 10);
    /// ```
    pub fn with_cap(cap: usize) -> OrderedMap<K, V> {
        OrderedMap::with_cap_and_comparer(cap, DefaultComparer::default())
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Creates a new OrderedMap with capacity 0 which hashes and compares keys using `comparer`.
    pub fn with_comparer(comparer: C) -> OrderedMap<K, V, C> {
        OrderedMap::from_parts(Vec::new(), IndexTable::new(), comparer, 0)
    }

    /// Creates a new OrderedMap which can hold at least `cap` entries without reallocating, and
    /// hashes and compares keys using `comparer`.
    ///
    /// # Panics
    /// Panics if the capacity can't be allocated.
    pub fn with_cap_and_comparer(cap: usize, comparer: C) -> OrderedMap<K, V, C> {
        OrderedMap::try_with_cap_and_comparer(cap, comparer).throw()
    }

    /// Creates a new OrderedMap which can hold at least `cap` entries without reallocating, or
    /// returns an error if that capacity can't be represented or allocated.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::hash::DefaultComparer;
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let map = OrderedMap::<u8, u8>::try_with_cap_and_comparer(usize::MAX, DefaultComparer::default());
    /// assert!(map.is_err());
    /// ```
    pub fn try_with_cap_and_comparer(
        cap: usize,
        comparer: C,
    ) -> Result<OrderedMap<K, V, C>, CapacityOverflow> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(cap).map_err(|_| CapacityOverflow)?;
        let indices = IndexTable::try_with_cap(cap)?;

        Ok(OrderedMap::from_parts(entries, indices, comparer, cap))
    }

    /// Returns the number of entries in the OrderedMap.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the OrderedMap contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries the OrderedMap can hold before reallocating.
    pub fn cap(&self) -> usize {
        self.entries.capacity().min(self.indices.cap())
    }

    /// Returns the capacity that the map was originally created with. This is what a
    /// [`Snapshot`](super::Snapshot) records.
    pub const fn cap_hint(&self) -> usize {
        self.cap_hint
    }

    /// Returns the current version of the map, which changes every time the map is structurally
    /// modified.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns a reference to the [`Comparer`] used by this map.
    pub const fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Returns the entry at `index` as a key-value pair, or None if the index is out of bounds.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(Bucket::refs)
    }

    /// Returns the entry at `index` with a mutable reference to the value, or None if the index is
    /// out of bounds. Doesn't change the version.
    pub fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.entries.get_mut(index).map(Bucket::ref_mut)
    }

    /// Returns a reference to the value at `index`.
    pub fn get_at(&self, index: usize) -> Result<&V, IndexOutOfBounds> {
        self.check_index(index)?;
        Ok(&self.entries[index].value)
    }

    /// Returns a reference to the key at `index`.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let map = OrderedMap::try_from([("x", 1), ("y", 2)]).unwrap();
    /// assert_eq!(map.key_at(1), Ok(&"y"));
    /// assert!(map.key_at(2).is_err());
    /// ```
    pub fn key_at(&self, index: usize) -> Result<&K, IndexOutOfBounds> {
        self.check_index(index)?;
        Ok(&self.entries[index].key)
    }

    /// Replaces the value at `index`, returning the old one. The key and position are unchanged,
    /// but the version is incremented.
    pub fn set_at(&mut self, index: usize, value: V) -> Result<V, IndexOutOfBounds> {
        self.check_index(index)?;
        let old = mem::replace(&mut self.entries[index].value, value);
        self.touch();
        Ok(old)
    }

    /// Returns the first entry, if there is one.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.entries.first().map(Bucket::refs)
    }

    /// Returns the last entry, if there is one.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.entries.last().map(Bucket::refs)
    }

    /// Removes the entry at `index`, shifting all following entries down by one position.
    pub fn remove_at(&mut self, index: usize) -> Result<(K, V), IndexOutOfBounds> {
        self.check_index(index)?;

        self.erase_index(index);
        let removed = self.entries.remove(index);
        self.indices.remap(|i| if i > index { i - 1 } else { i });
        self.touch();

        Ok(removed.into_pair())
    }

    /// Removes the entry at `index` by moving the last entry into its place. This is `O(1)`, but
    /// doesn't preserve the order of the remaining entries.
    pub fn swap_remove_at(&mut self, index: usize) -> Result<(K, V), IndexOutOfBounds> {
        self.check_index(index)?;

        self.erase_index(index);
        let last = self.len() - 1;
        if index != last {
            // The erase may have shifted the last entry's slot, so it is found afterwards.
            let slot = self.indices.slot_of(self.entries[last].hash, last).unreachable();
            self.indices.replace(slot, index);
        }
        let removed = self.entries.swap_remove(index);
        self.touch();

        Ok(removed.into_pair())
    }

    /// Moves the entry at `from` to `to`, shifting the entries in between by one position.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let mut map = OrderedMap::try_from([('a', 0), ('b', 1), ('c', 2)]).unwrap();
    /// map.move_index(0, 2).unwrap();
    /// assert_eq!(map.keys().collect::<String>(), "bca");
    /// ```
    pub fn move_index(&mut self, from: usize, to: usize) -> Result<(), IndexOutOfBounds> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to { return Ok(()); }

        let slot = self.indices.slot_of(self.entries[from].hash, from).unreachable();
        if from < to {
            self.indices.remap(|i| if i > from && i <= to { i - 1 } else { i });
            self.entries[from..=to].rotate_left(1);
        } else {
            self.indices.remap(|i| if i >= to && i < from { i + 1 } else { i });
            self.entries[to..=from].rotate_right(1);
        }
        self.indices.replace(slot, to);
        self.touch();

        Ok(())
    }

    /// Swaps the positions of the entries at `a` and `b`.
    pub fn swap_indices(&mut self, a: usize, b: usize) -> Result<(), IndexOutOfBounds> {
        self.check_index(a)?;
        self.check_index(b)?;
        if a == b { return Ok(()); }

        let slot_a = self.indices.slot_of(self.entries[a].hash, a).unreachable();
        let slot_b = self.indices.slot_of(self.entries[b].hash, b).unreachable();
        self.indices.replace(slot_a, b);
        self.indices.replace(slot_b, a);
        self.entries.swap(a, b);
        self.touch();

        Ok(())
    }

    /// Retains only the entries for which `f` returns true, preserving their order.
    ///
    /// If `f` panics, the entries visited so far keep their verdict and the rest are kept. The map
    /// stays usable either way.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        let before = self.len();
        let guard = Reindex(self);
        guard.0.entries.retain_mut(|b| f(&b.key, &mut b.value));

        if guard.0.len() == before {
            // Nothing was removed, so every position is still where the index table says it is.
            mem::forget(guard);
        }
    }

    /// Sorts the entries with a comparison function over both keys and values.
    ///
    /// If `compare` panics, the entries are left in an unspecified order but the map stays usable.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&K, &V, &K, &V) -> Ordering) {
        let guard = Reindex(self);
        guard.0.entries.sort_by(|a, b| compare(&a.key, &a.value, &b.key, &b.value));
    }

    /// Sorts the entries by key.
    pub fn sort_keys(&mut self)
    where
        K: Ord,
    {
        self.sort_by(|k1, _, k2, _| k1.cmp(k2));
    }

    /// Reverses the order of the entries.
    pub fn reverse(&mut self) {
        self.entries.reverse();
        let last = self.len().saturating_sub(1);
        self.indices.remap(|i| last - i);
        self.touch();
    }

    /// Removes all entries. The allocated capacity is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.indices.clear();
        self.touch();
    }

    /// Returns true if any entry has a value equal to `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.entries.iter().any(|b| b.value == *value)
    }

    /// Increases the capacity of the map to ensure that len + `extra` entries will fit without
    /// reallocating.
    ///
    /// # Panics
    /// Panics if the new capacity can't be allocated.
    pub fn reserve(&mut self, extra: usize) {
        self.try_reserve(extra).throw()
    }

    /// Increases the capacity of the map to ensure that len + `extra` entries will fit without
    /// reallocating, or returns an error if that isn't possible.
    pub fn try_reserve(&mut self, extra: usize) -> Result<(), CapacityOverflow> {
        self.entries.try_reserve(extra).map_err(|_| CapacityOverflow)?;
        let entries = &self.entries;
        self.indices.try_reserve(extra, |i| entries[i].hash)
    }

    /// Shrinks the map's capacity as close to its length as possible.
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
        let entries = &self.entries;
        self.indices.shrink_to_fit(|i| entries[i].hash);
    }

    /// Returns an iterator over all entries in positional order, as references.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.into_iter()
    }

    /// Returns an iterator over all entries in positional order, with mutable references to the
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.into_iter()
    }

    /// Returns an iterator over all keys in positional order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Consumes self and returns an iterator over all keys in positional order.
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys(self.into_iter())
    }

    /// Returns an iterator over all values in positional order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Returns an iterator over all values in positional order, as mutable references.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }

    /// Consumes self and returns an iterator over all values in positional order.
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues(self.into_iter())
    }

    /// Returns a read-only view over the keys of the map.
    pub const fn key_view(&self) -> KeyView<'_, K, V, C> {
        KeyView { map: self }
    }

    /// Returns a read-only view over the values of the map.
    pub const fn value_view(&self) -> ValueView<'_, K, V, C> {
        ValueView { map: self }
    }

    /// Returns a read-only view over the whole map.
    pub const fn as_read_only(&self) -> ReadOnly<'_, K, V, C> {
        ReadOnly { map: self }
    }

    /// Returns a [`Cursor`] positioned before the first entry, which records the current version.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let mut map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
    /// let mut cursor = map.cursor();
    /// assert_eq!(cursor.advance(&map), Some(Ok((&"a", &1))));
    ///
    /// map.add("c", 3).unwrap();
    /// assert!(cursor.advance(&map).is_some_and(|r| r.is_err()));
    /// ```
    pub const fn cursor(&self) -> Cursor {
        Cursor::new(self.version)
    }

    /// Returns the handle that callers sharing this map can lock around their accesses. The handle
    /// is created on first use. Concurrent first calls all receive the same handle.
    ///
    /// The map itself does no locking; the handle is purely a convention between callers.
    #[cfg(feature = "sync")]
    pub fn sync_root(&self) -> &SyncRoot {
        self.sync_root.get_or_init(SyncRoot::new)
    }
}

impl<K, V, C: Comparer<K>> OrderedMap<K, V, C> {
    /// Appends a new entry to the end of the map. If an entry with an equal key already exists,
    /// the map is left unchanged and the existing entry's position is reported in the error.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let mut map = OrderedMap::new();
    /// assert!(map.add("a", 1).is_ok());
    /// assert_eq!(map.add("a", 2).map_err(|e| e.index), Err(0));
    /// assert_eq!(map["a"], 1);
    /// ```
    pub fn add(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError> {
        let hash = self.comparer.hash_key(&key);

        if let Some(index) = self.find_hashed(hash, &key) {
            return Err(DuplicateKeyError { index });
        }

        self.push_hashed(hash, key, value);
        Ok(())
    }

    /// Sets the value for `key`. If an entry with an equal key exists, its value is replaced in
    /// place and the old value is returned; the entry keeps its position (and key). Otherwise a
    /// new entry is appended to the end of the map. Both cases change the version, just like
    /// [`set_at`](OrderedMap::set_at).
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let mut map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
    /// assert_eq!(map.set("a", 9), Some(1));
    /// assert_eq!(map.get_index(0), Some((&"a", &9)));
    /// assert_eq!(map.set("c", 3), None);
    /// assert_eq!(map.get_index(2), Some((&"c", &3)));
    /// ```
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.comparer.hash_key(&key);

        match self.find_hashed(hash, &key) {
            // The index table already knows the position, so the entry is updated where it is.
            Some(index) => {
                self.touch();
                Some(mem::replace(&mut self.entries[index].value, value))
            },
            None => {
                self.push_hashed(hash, key, value);
                None
            },
        }
    }

    /// Inserts a new entry at `index`, shifting all following entries up by one position. `index`
    /// may be equal to the length of the map, which appends.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::{OrderedMap, map::InsertError};
    /// let mut map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
    /// map.insert_at(1, "c", 3).unwrap();
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["a", "c", "b"]);
    /// assert!(matches!(map.insert_at(4, "d", 4), Err(InsertError::IndexOutOfBounds(_))));
    /// assert!(matches!(map.insert_at(0, "b", 4), Err(InsertError::DuplicateKey(_))));
    /// ```
    pub fn insert_at(&mut self, index: usize, key: K, value: V) -> Result<(), InsertError> {
        if index > self.len() {
            return Err(IndexOutOfBounds {
                index,
                len: self.len(),
            }.into());
        }

        let hash = self.comparer.hash_key(&key);
        if let Some(existing) = self.find_hashed(hash, &key) {
            return Err(DuplicateKeyError { index: existing }.into());
        }

        self.indices.remap(|i| if i >= index { i + 1 } else { i });
        self.entries.insert(index, Bucket { hash, key, value });
        let entries = &self.entries;
        self.indices.insert_unique(hash, index, |i| entries[i].hash);
        self.touch();

        Ok(())
    }

    /// Creates a map from `iter` using `comparer`, adding each entry in turn. Fails on the first
    /// key that is equal to one already added.
    pub fn try_from_iter_with_comparer<I: IntoIterator<Item = (K, V)>>(
        iter: I,
        comparer: C,
    ) -> Result<OrderedMap<K, V, C>, DuplicateKeyError> {
        let iter = iter.into_iter();
        let mut map = OrderedMap::with_cap_and_comparer(iter.size_hint().0, comparer);

        for (key, value) in iter {
            map.add(key, value)?;
        }

        Ok(map)
    }

    /// Appends a new entry with a pre-computed hash, assuming that the key isn't present.
    pub(crate) fn push_hashed(&mut self, hash: u64, key: K, value: V) {
        let index = self.entries.len();
        self.entries.push(Bucket { hash, key, value });

        let entries = &self.entries;
        self.indices.insert_unique(hash, index, |i| entries[i].hash);
        self.touch();
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Returns a reference to the value associated with `key`, or None if the map contains no
    /// entry for it.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        // We're introducing a new type parameter here, Q which represents a borrowed version of K
        // where hashing and equality through the comparer carry over the borrow.
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        let index = self.get_index_of(key)?;
        Some(&self.entries[index].value)
    }

    /// Returns a reference to the value associated with `key`, or a [`KeyNotFoundError`].
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, KeyNotFoundError>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.get(key).ok_or(KeyNotFoundError)
    }

    /// Returns a mutable reference to the value associated with `key`. Doesn't change the version.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        let index = self.get_index_of(key)?;
        Some(&mut self.entries[index].value)
    }

    /// Returns the position, key and value of the entry for `key`.
    pub fn get_full<Q>(&self, key: &Q) -> Option<(usize, &K, &V)>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        let index = self.get_index_of(key)?;
        let (k, v) = self.entries[index].refs();
        Some((index, k, v))
    }

    /// Returns the position of the entry for `key`.
    pub fn get_index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        if self.is_empty() { return None; }

        let hash = self.comparer.hash_key(key);
        self.find_hashed(hash, key)
    }

    /// Returns true if the map contains an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.get_index_of(key).is_some()
    }

    /// Removes the entry for `key`, returning it if it existed. All following entries shift down
    /// by one position. Removing a key that isn't present does nothing.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        let index = self.get_index_of(key)?;
        self.remove_at(index).ok()
    }

    /// Removes the entry for `key`, returning the value if it existed. All following entries shift
    /// down by one position. Removing a key that isn't present does nothing.
    ///
    /// # Examples
    /// ```
    /// # use ordered_collections::collections::ordered::OrderedMap;
    /// let mut map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
    /// assert_eq!(map.remove("a"), Some(1));
    /// assert_eq!(map.remove("a"), None);
    /// assert_eq!(map.key_at(0), Ok(&"b"));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes the entry for `key` by moving the last entry into its place, returning the value if
    /// it existed.
    pub fn swap_remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        let index = self.get_index_of(key)?;
        self.swap_remove_at(index).ok().map(|(_, v)| v)
    }

    /// Looks up the position of `key` with a pre-computed hash.
    pub(crate) fn find_hashed<Q>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        let entries = &self.entries;
        let comparer = &self.comparer;

        self.indices.find(hash, |i| {
            entries[i].hash == hash && comparer.key_eq(entries[i].key.borrow(), key)
        })
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Assembles a map from its parts with a fresh version.
    pub(crate) fn from_parts(
        entries: Vec<Bucket<K, V>>,
        indices: IndexTable,
        comparer: C,
        cap_hint: usize,
    ) -> OrderedMap<K, V, C> {
        OrderedMap {
            entries,
            indices,
            version: 0,
            comparer,
            cap_hint,
            #[cfg(feature = "sync")]
            sync_root: OnceLock::new(),
        }
    }

    /// Checks that the provided index is within the bounds of self.
    pub(crate) fn check_index(&self, index: usize) -> Result<(), IndexOutOfBounds> {
        if index >= self.len() {
            Err(IndexOutOfBounds {
                index,
                len: self.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Removes the index table's slot for the entry at `index`, leaving the entry itself alone.
    pub(crate) fn erase_index(&mut self, index: usize) {
        // UNREACHABLE: Every valid position has exactly one slot in the index table.
        let slot = self.indices.slot_of(self.entries[index].hash, index).unreachable();
        let entries = &self.entries;
        self.indices.erase(slot, |i| entries[i].hash);
    }

    /// Rebuilds the index table from the current order of the entries.
    pub(crate) fn rebuild_indices(&mut self) {
        let entries = &self.entries;
        self.indices.rebuild(entries.len(), |i| entries[i].hash);
    }

    /// Marks the map as structurally modified.
    pub(crate) const fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Rebuilds the index table and bumps the version when dropped. Held across calls into user
/// closures that reorder or drop entries, so the table catches up even if the closure unwinds.
struct Reindex<'a, K, V, C>(&'a mut OrderedMap<K, V, C>);

impl<K, V, C> Drop for Reindex<'_, K, V, C> {
    fn drop(&mut self) {
        self.0.rebuild_indices();
        self.0.touch();
    }
}

impl<K, V, C: Comparer<K>> Extend<(K, V)> for OrderedMap<K, V, C> {
    /// Sets each entry in turn, so later entries for an existing key replace its value in place.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);

        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V, C: Comparer<K> + Default> FromIterator<(K, V)> for OrderedMap<K, V, C> {
    /// Collects entries with the same semantics as [`Extend`]: the first occurrence of a key fixes
    /// its position and the last one fixes its value. See
    /// [`try_from_iter_with_comparer`](OrderedMap::try_from_iter_with_comparer) to reject
    /// duplicates instead.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::with_comparer(C::default());
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V, const N: usize> TryFrom<[(K, V); N]> for OrderedMap<K, V> {
    type Error = DuplicateKeyError;

    /// Adds each entry in turn, failing on the first duplicate key.
    fn try_from(value: [(K, V); N]) -> Result<Self, Self::Error> {
        OrderedMap::try_from_iter_with_comparer(value, DefaultComparer::default())
    }
}

impl<K: Hash + Eq, V> TryFrom<Vec<(K, V)>> for OrderedMap<K, V> {
    type Error = DuplicateKeyError;

    /// Adds each entry in turn, failing on the first duplicate key.
    fn try_from(value: Vec<(K, V)>) -> Result<Self, Self::Error> {
        OrderedMap::try_from_iter_with_comparer(value, DefaultComparer::default())
    }
}

impl<K, V, C: Default> Default for OrderedMap<K, V, C> {
    fn default() -> Self {
        OrderedMap::with_comparer(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OrderedMap<K, V, C> {
    /// Clones the entries, index and comparer. The clone starts with a fresh version and its own
    /// (not yet created) sync root.
    fn clone(&self) -> Self {
        OrderedMap::from_parts(
            self.entries.clone(),
            self.indices.clone(),
            self.comparer.clone(),
            self.cap_hint,
        )
    }
}

impl<K, V, C, Q> Index<&Q> for OrderedMap<K, V, C>
where
    K: Borrow<Q>,
    C: Comparer<Q>,
    Q: ?Sized,
{
    type Output = V;

    /// # Panics
    /// Panics with a [`KeyNotFoundError`] if the map contains no entry for `key`.
    #[track_caller]
    fn index(&self, key: &Q) -> &Self::Output {
        self.try_get(key).throw()
    }
}

impl<K, V, C> Index<usize> for OrderedMap<K, V, C> {
    type Output = V;

    /// # Panics
    /// Panics with an [`IndexOutOfBounds`] if `index` is out of bounds.
    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        self.get_at(index).throw()
    }
}

impl<K, V, C> IndexMut<usize> for OrderedMap<K, V, C> {
    /// Provides mutable access to the value at `index`. Like the other forms of mutable value
    /// access, this doesn't change the version; use [`set_at`](OrderedMap::set_at) to replace a
    /// value as a structural change.
    ///
    /// # Panics
    /// Panics with an [`IndexOutOfBounds`] if `index` is out of bounds.
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.check_index(index).throw();
        &mut self.entries[index].value
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for OrderedMap<K, V, C> {
    /// Two maps are equal if they contain equal entries in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for OrderedMap<K, V, C> {}

impl<K: Hash, V: Hash, C> Hash for OrderedMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for (key, value) in self.iter() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: Debug, V: Debug, C: Debug> Debug for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedMap")
            .field("entries", &DebugEntries(self))
            .field("indices", &self.indices)
            .field("version", &self.version)
            .field("comparer", &self.comparer)
            .finish()
    }
}

struct DebugEntries<'a, K, V, C>(&'a OrderedMap<K, V, C>);

impl<K: Debug, V: Debug, C> Debug for DebugEntries<'_, K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Debug, V: Debug, C> Display for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "%")?;
        f.debug_map().entries(self.iter()).finish()
    }
}
