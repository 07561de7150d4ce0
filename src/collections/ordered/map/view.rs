use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::ops::Index;

use super::{Iter, KeyNotFoundError, Keys, OrderedMap, Values};
use crate::collections::hash::Comparer;
use crate::util::error::IndexOutOfBounds;
use crate::util::result::ResultExtension;

/// A read-only view over the keys of an [`OrderedMap`], in positional order.
///
/// The view borrows the map, so it always reflects the map's current contents and can't be used
/// to modify it. See [`OrderedMap::key_view`].
///
/// # Examples
/// ```
/// # use ordered_collections::collections::ordered::OrderedMap;
/// let map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
/// let keys = map.key_view();
/// assert_eq!(keys.len(), 2);
/// assert_eq!(keys[1], "b");
/// assert!(keys.contains("a"));
/// ```
pub struct KeyView<'a, K, V, C> {
    pub(crate) map: &'a OrderedMap<K, V, C>,
}

impl<'a, K, V, C> KeyView<'a, K, V, C> {
    /// Returns the number of keys in the view.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the view contains no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the key at `index`, or None if the index is out of bounds.
    pub fn get(&self, index: usize) -> Option<&'a K> {
        self.map.get_index(index).map(|(k, _)| k)
    }

    /// Returns the first key, if there is one.
    pub fn first(&self) -> Option<&'a K> {
        self.map.first().map(|(k, _)| k)
    }

    /// Returns the last key, if there is one.
    pub fn last(&self) -> Option<&'a K> {
        self.map.last().map(|(k, _)| k)
    }

    /// Returns true if the underlying map contains `key`, using the map's comparer.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Returns the position of `key` in the underlying map.
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.map.get_index_of(key)
    }

    /// Returns an iterator over the keys in positional order.
    pub fn iter(&self) -> Keys<'a, K, V> {
        self.map.keys()
    }
}

impl<K, V, C> Clone for KeyView<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for KeyView<'_, K, V, C> {}

impl<K, V, C> Index<usize> for KeyView<'_, K, V, C> {
    type Output = K;

    /// # Panics
    /// Panics with an [`IndexOutOfBounds`] if `index` is out of bounds.
    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        self.map.key_at(index).throw()
    }
}

impl<'a, K, V, C> IntoIterator for KeyView<'a, K, V, C> {
    type Item = &'a K;

    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.keys()
    }
}

impl<K: Debug, V, C> Debug for KeyView<'_, K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.map.keys()).finish()
    }
}

/// A read-only view over the values of an [`OrderedMap`], in positional order. See
/// [`OrderedMap::value_view`].
pub struct ValueView<'a, K, V, C> {
    pub(crate) map: &'a OrderedMap<K, V, C>,
}

impl<'a, K, V, C> ValueView<'a, K, V, C> {
    /// Returns the number of values in the view.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the view contains no values.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the value at `index`, or None if the index is out of bounds.
    pub fn get(&self, index: usize) -> Option<&'a V> {
        self.map.get_index(index).map(|(_, v)| v)
    }

    /// Returns the first value, if there is one.
    pub fn first(&self) -> Option<&'a V> {
        self.map.first().map(|(_, v)| v)
    }

    /// Returns the last value, if there is one.
    pub fn last(&self) -> Option<&'a V> {
        self.map.last().map(|(_, v)| v)
    }

    /// Returns true if any value is equal to `value`. This is a linear search.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    /// Returns an iterator over the values in positional order.
    pub fn iter(&self) -> Values<'a, K, V> {
        self.map.values()
    }
}

impl<K, V, C> Clone for ValueView<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for ValueView<'_, K, V, C> {}

impl<K, V, C> Index<usize> for ValueView<'_, K, V, C> {
    type Output = V;

    /// # Panics
    /// Panics with an [`IndexOutOfBounds`] if `index` is out of bounds.
    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        self.map.get_at(index).throw()
    }
}

impl<'a, K, V, C> IntoIterator for ValueView<'a, K, V, C> {
    type Item = &'a V;

    type IntoIter = Values<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.values()
    }
}

impl<K, V: Debug, C> Debug for ValueView<'_, K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.map.values()).finish()
    }
}

/// A read-only view over a whole [`OrderedMap`]. Every read operation of the map is available, but
/// none of the mutating ones. See [`OrderedMap::as_read_only`].
///
/// # Examples
/// ```
/// # use ordered_collections::collections::ordered::OrderedMap;
/// let map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
/// let view = map.as_read_only();
/// assert_eq!(view.get("b"), Some(&2));
/// assert_eq!(view.get_index(0), Some((&"a", &1)));
/// ```
pub struct ReadOnly<'a, K, V, C> {
    pub(crate) map: &'a OrderedMap<K, V, C>,
}

impl<'a, K, V, C> ReadOnly<'a, K, V, C> {
    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the version of the underlying map.
    pub const fn version(&self) -> u64 {
        self.map.version()
    }

    /// Returns the entry at `index`, or None if the index is out of bounds.
    pub fn get_index(&self, index: usize) -> Option<(&'a K, &'a V)> {
        self.map.get_index(index)
    }

    /// Returns a reference to the value at `index`.
    pub fn get_at(&self, index: usize) -> Result<&'a V, IndexOutOfBounds> {
        self.map.get_at(index)
    }

    /// Returns a reference to the key at `index`.
    pub fn key_at(&self, index: usize) -> Result<&'a K, IndexOutOfBounds> {
        self.map.key_at(index)
    }

    /// Returns a reference to the value associated with `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&'a V>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.map.get(key)
    }

    /// Returns a reference to the value associated with `key`, or a [`KeyNotFoundError`].
    pub fn try_get<Q>(&self, key: &Q) -> Result<&'a V, KeyNotFoundError>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.map.try_get(key)
    }

    /// Returns the position of the entry for `key`.
    pub fn get_index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.map.get_index_of(key)
    }

    /// Returns true if the map contains an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Comparer<Q>,
        Q: ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Returns true if any entry has a value equal to `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    /// Returns an iterator over all entries in positional order.
    pub fn iter(&self) -> Iter<'a, K, V> {
        self.map.iter()
    }

    /// Returns a view over the keys of the map.
    pub const fn keys(&self) -> KeyView<'a, K, V, C> {
        self.map.key_view()
    }

    /// Returns a view over the values of the map.
    pub const fn values(&self) -> ValueView<'a, K, V, C> {
        self.map.value_view()
    }
}

impl<K, V, C> Clone for ReadOnly<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for ReadOnly<'_, K, V, C> {}

impl<'a, K, V, C> IntoIterator for ReadOnly<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl<K: Debug, V: Debug, C> Debug for ReadOnly<'_, K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}
